//! Screen frame acquisition
//!
//! This module handles:
//! - Grabbing one raster frame of the overlay's rectangle per tick
//! - Normalizing raw frames to the exact format the encoder expects

pub mod normalize;
pub mod screen;

pub use normalize::FrameNormalizer;
pub use screen::ScreenGrabSource;

use crate::error::Result;
use crate::types::{CaptureRegion, RawFrame};

/// Pulls one raster frame of the given rectangle from the screen.
///
/// Implementations may fail per call (region off-screen, display gone); the
/// capture loop treats those failures as transient and skips the tick.
pub trait FrameSource: Send {
    /// Acquire a single frame for the region
    fn acquire(&mut self, region: &CaptureRegion) -> Result<RawFrame>;
}
