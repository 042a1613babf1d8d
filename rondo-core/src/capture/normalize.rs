//! Frame normalization to the encoder's fixed input format
//!
//! The encoder is spawned for an exact rawvideo geometry; every frame written
//! to its pipe must match it byte for byte. Captured frames can differ from
//! the note size when display scaling is in play, so each one is resized to
//! the fixed square before it reaches the pipe.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::{Result, RondoError};
use crate::types::RawFrame;

/// Converts raw captured frames into fixed-size RGBA encoder input
#[derive(Debug, Clone, Copy)]
pub struct FrameNormalizer {
    size: u32,
}

impl FrameNormalizer {
    /// Create a normalizer targeting a `size`x`size` square
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Target edge length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Byte length of one normalized RGBA frame
    pub fn frame_len(&self) -> usize {
        (self.size as usize) * (self.size as usize) * 4
    }

    /// Normalize a captured frame into encoder-ready RGBA bytes
    pub fn normalize(&self, frame: RawFrame) -> Result<Vec<u8>> {
        if frame.width == self.size && frame.height == self.size {
            return Ok(frame.rgba);
        }

        let image: RgbaImage = RgbaImage::from_raw(frame.width, frame.height, frame.rgba)
            .ok_or_else(|| {
                RondoError::capture(format!(
                    "captured buffer does not match {}x{}",
                    frame.width, frame.height
                ))
            })?;

        let resized = imageops::resize(&image, self.size, self.size, FilterType::Triangle);
        Ok(resized.into_raw())
    }
}
