//! ffmpeg child process management
//!
//! One encoder process per recording session: rawvideo RGBA in over stdin,
//! H.264 yuv420p mp4 out. The invocation is fixed at spawn time; a frame that
//! does not match the declared geometry is undefined behavior in the encoder,
//! so normalization happens strictly before the pipe.

use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::encode::VideoSink;
use crate::error::{Result, RondoError};
use crate::types::EncodedArtifact;

/// How often the bounded finalize wait polls the child for exit
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Fixed encoder invocation for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSpec {
    /// Input/output frame width in pixels
    pub width: u32,
    /// Input/output frame height in pixels
    pub height: u32,
    /// Input frame rate
    pub fps: u32,
    /// x264 CRF quality (lower = better, larger file)
    pub crf: u8,
    /// x264 preset (ultrafast for low-latency capture)
    pub preset: String,
    /// Output file path
    pub output: PathBuf,
}

impl EncoderSpec {
    /// Byte length of one rawvideo RGBA input frame
    pub fn frame_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Check the spec for values the encoder would reject
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RondoError::encoder("zero frame dimensions"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(RondoError::encoder(format!(
                "yuv420p requires even dimensions, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(RondoError::encoder("zero frame rate"));
        }
        if self.crf > 51 {
            return Err(RondoError::encoder(format!("CRF {} out of range", self.crf)));
        }
        Ok(())
    }
}

/// Build the fixed ffmpeg argument list for a spec
pub fn build_ffmpeg_args(spec: &EncoderSpec) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pixel_format".to_string(),
        "rgba".to_string(),
        "-video_size".to_string(),
        format!("{}x{}", spec.width, spec.height),
        "-framerate".to_string(),
        spec.fps.to_string(),
        "-i".to_string(),
        "-".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-preset".to_string(),
        spec.preset.clone(),
        "-crf".to_string(),
        spec.crf.to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        "-y".to_string(),
        spec.output.display().to_string(),
    ]
}

/// Streaming encoder backed by an ffmpeg child process
pub struct FfmpegEncoder {
    child: Child,
    writer: Option<BufWriter<ChildStdin>>,
    output: PathBuf,
    finished: bool,
}

impl FfmpegEncoder {
    /// Spawn the encoder process for a session
    pub fn spawn(spec: &EncoderSpec) -> Result<Self> {
        spec.validate()?;

        let args = build_ffmpeg_args(spec);
        debug!("Spawning ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RondoError::encoder(format!("failed to start ffmpeg: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RondoError::encoder("failed to open ffmpeg stdin"))?;

        Ok(Self {
            child,
            writer: Some(BufWriter::with_capacity(8 * 1024 * 1024, stdin)),
            output: spec.output.clone(),
            finished: false,
        })
    }

    fn remove_partial_output(&self) {
        if let Err(e) = std::fs::remove_file(&self.output) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove partial output {:?}: {}", self.output, e);
            }
        }
    }

    /// Wait for the child to exit, bounded by `timeout`; kills on expiry
    fn wait_bounded(&mut self, timeout: Duration) -> Result<std::process::ExitStatus> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!("Encoder did not exit within {:?}, killing it", timeout);
                        let _ = self.child.kill();
                        let _ = self.child.wait();
                        self.remove_partial_output();
                        return Err(RondoError::EncoderTimeout(timeout));
                    }
                    std::thread::sleep(EXIT_POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = self.child.kill();
                    let _ = self.child.wait();
                    self.remove_partial_output();
                    return Err(RondoError::encoder(format!("wait on encoder failed: {}", e)));
                }
            }
        }
    }
}

impl VideoSink for FfmpegEncoder {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| RondoError::EncoderPipeBroken("input already closed".to_string()))?;
        writer
            .write_all(frame)
            .map_err(|e| RondoError::EncoderPipeBroken(e.to_string()))
    }

    fn finish(&mut self, timeout: Duration) -> Result<EncodedArtifact> {
        self.finished = true;

        // Closing stdin is the encoder's end-of-stream signal. Flush errors
        // are expected when the pipe already broke; the exit status decides.
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                debug!("Flush on encoder input failed: {}", e);
            }
        }

        let status = self.wait_bounded(timeout)?;
        if !status.success() {
            self.remove_partial_output();
            return Err(RondoError::encode_failed(format!(
                "ffmpeg exited with {}",
                status
            )));
        }

        EncodedArtifact::from_path(self.output.clone()).map_err(|_| {
            RondoError::encode_failed("ffmpeg exited cleanly but produced no output")
        })
    }

    fn abort(&mut self) {
        self.finished = true;
        self.writer = None;
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.remove_partial_output();
        debug!("Encoder aborted, partial output removed");
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        // No dangling encoder process or partial file on any exit path
        if !self.finished {
            self.abort();
        }
    }
}
