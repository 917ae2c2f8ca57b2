use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::WavebandsResult;

/// A finished, downloadable output: still image, vector document or video clip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write under `dir` using the suggested file name.
    pub fn save_in(&self, dir: &Path) -> WavebandsResult<PathBuf> {
        let path = dir.join(&self.file_name);
        self.save_as(&path)?;
        Ok(path)
    }

    /// Write to an explicit path, creating parent directories.
    pub fn save_as(&self, path: &Path) -> WavebandsResult<()> {
        ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> WavebandsResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
