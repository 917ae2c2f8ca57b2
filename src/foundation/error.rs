pub type WavebandsResult<T> = Result<T, WavebandsError>;

#[derive(thiserror::Error, Debug)]
pub enum WavebandsError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WavebandsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }
}
