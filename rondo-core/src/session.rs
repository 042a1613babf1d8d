//! The timed capture loop and its worker thread
//!
//! One session = one worker thread driving FrameSource -> FrameNormalizer ->
//! VideoSink at a fixed cadence until the duration cap lands, the stop flag is
//! raised, or the encoder pipe breaks. The loop never exits mid-frame-write;
//! stop latency is bounded by roughly one frame interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::capture::{FrameNormalizer, FrameSource};
use crate::encode::VideoSink;
use crate::error::{Result, RondoError};
use crate::events::EngineEvent;
use crate::region::RegionSource;
use crate::types::{EncodedArtifact, SessionHandle, SessionSummary};

/// Time source for the loop, swappable in tests
pub trait Clock: Send {
    /// Current instant
    fn now(&self) -> Instant;
    /// Block for the pacing sleep
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation used in production
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Timing parameters for one capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLoopConfig {
    /// Ideal spacing between captured frames (1 / target fps)
    pub frame_interval: Duration,
    /// Hard wall-clock cap on the session
    pub duration_cap: Duration,
    /// Bounded wait for the encoder to exit after the input closes
    pub finish_timeout: Duration,
}

/// Drive the capture loop until the cap, the stop flag, or a broken pipe.
///
/// Each tick snapshots the live region, acquires one frame for it, normalizes
/// it and writes it to the sink. Transient acquire/normalize failures skip the
/// tick; a sink write failure is fatal and aborts the remaining ticks. Pacing
/// subtracts the tick's work from the frame interval and never sleeps when the
/// work overran it (frames drop under load, no catch-up).
pub fn run_capture_loop(
    cfg: &CaptureLoopConfig,
    region: &dyn RegionSource,
    source: &mut dyn FrameSource,
    normalizer: &FrameNormalizer,
    sink: &mut dyn VideoSink,
    stop: &AtomicBool,
    clock: &dyn Clock,
) -> SessionSummary {
    let started = clock.now();
    let mut summary = SessionSummary::default();

    loop {
        let tick_start = clock.now();

        if tick_start.duration_since(started) >= cfg.duration_cap {
            info!("Duration cap reached after {} frames", summary.frames_written);
            break;
        }
        if stop.load(Ordering::SeqCst) {
            debug!("Stop requested, exiting at tick boundary");
            break;
        }

        // Snapshot once per tick so capture tracks the live overlay position
        let rect = region.region();
        match source
            .acquire(&rect)
            .and_then(|frame| normalizer.normalize(frame))
        {
            Ok(bytes) => {
                if let Err(e) = sink.write_frame(&bytes) {
                    warn!("Encoder write failed, aborting session: {}", e);
                    summary.pipe_broken = true;
                    break;
                }
                summary.frames_written += 1;
            }
            Err(e) => {
                warn!("Skipping tick: {}", e);
                summary.frames_skipped += 1;
            }
        }

        let work = clock.now().duration_since(tick_start);
        if work < cfg.frame_interval {
            clock.sleep(cfg.frame_interval - work);
        }
    }

    summary
}

/// Run one full session: the capture loop plus encoder finalization
pub fn run_session(
    cfg: &CaptureLoopConfig,
    region: &dyn RegionSource,
    source: &mut dyn FrameSource,
    normalizer: &FrameNormalizer,
    sink: &mut dyn VideoSink,
    stop: &AtomicBool,
    clock: &dyn Clock,
) -> Result<EncodedArtifact> {
    let summary = run_capture_loop(cfg, region, source, normalizer, sink, stop, clock);
    info!("Capture loop done: {}", summary);

    if summary.frames_written == 0 {
        sink.abort();
        return Err(RondoError::encode_failed("no frames captured"));
    }

    sink.finish(cfg.finish_timeout)
}

/// Handle to the worker thread running one capture session.
///
/// The controller's state machine guarantees at most one of these exists at a
/// time. Completion is posted back to the engine queue as
/// [`EngineEvent::SessionFinished`], never joined from the UI path.
pub struct SessionWorker {
    handle: SessionHandle,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SessionWorker {
    /// Spawn the worker thread for one session
    pub fn spawn<S, K, R>(
        cfg: CaptureLoopConfig,
        region: R,
        mut source: S,
        mut sink: K,
        note_size: u32,
        events: Sender<EngineEvent>,
    ) -> Result<Self>
    where
        S: FrameSource + 'static,
        K: VideoSink + 'static,
        R: RegionSource + 'static,
    {
        let handle = SessionHandle::new();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let normalizer = FrameNormalizer::new(note_size);

        let thread = std::thread::Builder::new()
            .name("rondo-capture".to_string())
            .spawn(move || {
                let result = run_session(
                    &cfg,
                    &region,
                    &mut source,
                    &normalizer,
                    &mut sink,
                    &stop_flag,
                    &SystemClock,
                );
                if events.send(EngineEvent::SessionFinished(handle, result)).is_err() {
                    debug!("Engine queue closed before session completion");
                }
            })
            .map_err(|e| RondoError::encoder(format!("failed to spawn capture thread: {}", e)))?;

        info!("{} capture worker started", handle);
        Ok(Self {
            handle,
            stop,
            thread: Some(thread),
        })
    }

    /// The session's unique handle
    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    /// Raise the cooperative stop flag; the loop exits on its next tick
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Block until the worker thread exits (engine teardown only)
    pub fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        // The thread posts its completion event and exits on its own;
        // teardown paths that must wait call join() explicitly.
        self.request_stop();
    }
}
