//! Core types for Rondo
//!
//! These types flow through the capture, encode and delivery pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, RondoError};

/// Global handle counter for unique session IDs
static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque handle for a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(u64);

impl SessionHandle {
    /// Create a new unique handle
    pub fn new() -> Self {
        Self(HANDLE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw handle value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

/// The on-screen rectangle to capture, in device pixels.
///
/// The UI thread recomputes this from the overlay position and the display's
/// device-pixel-ratio whenever the overlay is dragged; the capture loop takes
/// a fresh snapshot every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    /// Left edge in device pixels
    pub left: i32,
    /// Top edge in device pixels
    pub top: i32,
    /// Width in device pixels
    pub width: u32,
    /// Height in device pixels
    pub height: u32,
}

impl CaptureRegion {
    /// Create a new capture region
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A square region of `size` device pixels with its top-left at (left, top)
    pub fn square(left: i32, top: i32, size: u32) -> Self {
        Self::new(left, top, size, size)
    }

    /// Expected RGBA byte length of a frame grabbed from this region
    pub fn frame_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Check that the region has usable dimensions
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RondoError::capture(format!(
                "degenerate capture region {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.left, self.top
        )
    }
}

/// One raw RGBA frame as grabbed from the screen
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Tightly packed RGBA bytes, row-major
    pub rgba: Vec<u8>,
}

impl RawFrame {
    /// Create a frame, checking that the buffer matches the dimensions
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if rgba.len() != expected {
            return Err(RondoError::capture(format!(
                "frame buffer is {} bytes, expected {} for {}x{}",
                rgba.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

/// The finalized media file produced by one recording session.
///
/// Only constructed after the encoder process has exited successfully and the
/// output file exists with non-zero size. Deleted after any delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    /// Path to the finished media file
    pub path: PathBuf,
    /// Size of the file in bytes
    pub byte_size: u64,
}

impl EncodedArtifact {
    /// Construct from a path, verifying the file exists with non-zero size
    pub fn from_path(path: PathBuf) -> Result<Self> {
        let meta = std::fs::metadata(&path)
            .map_err(|_| RondoError::ArtifactMissing(path.clone()))?;
        if meta.len() == 0 {
            return Err(RondoError::ArtifactMissing(path));
        }
        Ok(Self {
            path,
            byte_size: meta.len(),
        })
    }

    /// Delete the underlying file, logging rather than failing on error
    pub fn discard(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove artifact {:?}: {}", self.path, e);
            }
        }
    }
}

/// A messaging destination the user may send a video note to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRef {
    /// Opaque chat identifier
    pub id: i64,
    /// Human-readable name
    pub name: String,
}

impl DestinationRef {
    /// Create a new destination reference
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for DestinationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Counters from one finished capture loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames written to the encoder
    pub frames_written: u64,
    /// Ticks skipped due to transient capture errors
    pub frames_skipped: u64,
    /// Whether the loop aborted early on a broken encoder pipe
    pub pipe_broken: bool,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames written, {} skipped{}",
            self.frames_written,
            self.frames_skipped,
            if self.pipe_broken { ", pipe broken" } else { "" }
        )
    }
}
