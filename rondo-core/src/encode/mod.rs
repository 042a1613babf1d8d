//! Streaming video encoding via a spawned ffmpeg process
//!
//! The encoder is a child process fed raw RGBA frames over stdin, one frame
//! per write, in capture order. Closing the pipe finalizes the container and
//! the finished file becomes the session's artifact.

pub mod ffmpeg;

pub use ffmpeg::{build_ffmpeg_args, EncoderSpec, FfmpegEncoder};

use std::time::Duration;

use crate::error::Result;
use crate::types::EncodedArtifact;

/// Destination for normalized frames, finalized into an artifact.
///
/// The capture loop drives this through a dyn reference so tests can swap in
/// an in-memory sink.
pub trait VideoSink: Send {
    /// Write one frame's bytes to the encoder input, in capture order
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Close the input stream and wait (bounded) for the finished artifact
    fn finish(&mut self, timeout: Duration) -> Result<EncodedArtifact>;

    /// Kill the encoder and remove any partial output (cancel path)
    fn abort(&mut self);
}

/// Check if ffmpeg is available on this system
pub fn ffmpeg_available() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
