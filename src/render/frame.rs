use crate::foundation::core::Rgb8;
use crate::foundation::error::{WavebandsError, WavebandsResult};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. Pattern frames always start from an opaque background, so in
/// practice every pixel has `a == 255` and the bytes are also valid straight-alpha RGBA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Frame filled with an opaque color.
    pub fn filled(width: u32, height: u32, color: Rgb8) -> WavebandsResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| WavebandsError::render("frame size overflows usize"))?;
        let mut data = vec![0u8; len];
        let px = color.to_rgba8();
        for d in data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// RGBA bytes at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> WavebandsResult<Vec<u8>> {
        use std::io::Cursor;

        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| WavebandsError::encode("frame byte length does not match its size"))?;
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| WavebandsError::encode(format!("png encode failed: {e}")))?;
        Ok(buf)
    }
}
