//! Mock infrastructure for testing
//!
//! Deterministic stand-ins for the screen, the encoder process, the wall
//! clock and the messaging client. Shared by every suite, so each binary
//! uses a different subset.
#![allow(dead_code)]

use async_trait::async_trait;
use std::cell::Cell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rondo_core::capture::FrameSource;
use rondo_core::controller::SessionLauncher;
use rondo_core::encode::VideoSink;
use rondo_core::error::{Result, RondoError};
use rondo_core::events::EngineEvent;
use rondo_core::messenger::Messenger;
use rondo_core::region::{RegionSource, SharedRegion};
use rondo_core::session::{CaptureLoopConfig, Clock, SessionWorker};
use rondo_core::types::{CaptureRegion, DestinationRef, EncodedArtifact, RawFrame};

/// Simulated clock: sleeping advances time, nothing else does
pub struct TestClock {
    now: Cell<Instant>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

/// Region source that replays a script, then repeats the last entry
pub struct ScriptedRegion {
    script: Mutex<Vec<CaptureRegion>>,
    last: Mutex<CaptureRegion>,
}

impl ScriptedRegion {
    pub fn new(script: Vec<CaptureRegion>) -> Self {
        let last = *script.first().expect("script must not be empty");
        Self {
            script: Mutex::new(script),
            last: Mutex::new(last),
        }
    }
}

impl RegionSource for ScriptedRegion {
    fn region(&self) -> CaptureRegion {
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            *self.last.lock().unwrap()
        } else {
            let region = script.remove(0);
            *self.last.lock().unwrap() = region;
            region
        }
    }
}

/// Frame source producing solid frames, with scriptable failures
pub struct MockFrameSource {
    size: u32,
    acquires: u64,
    fail_on: HashSet<u64>,
    stop_after: Option<(u64, Arc<AtomicBool>)>,
    pub seen_regions: Arc<Mutex<Vec<CaptureRegion>>>,
}

impl MockFrameSource {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            acquires: 0,
            fail_on: HashSet::new(),
            stop_after: None,
            seen_regions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the given 0-based acquire indices with a transient capture error
    pub fn failing_on(mut self, ticks: impl IntoIterator<Item = u64>) -> Self {
        self.fail_on = ticks.into_iter().collect();
        self
    }

    /// Raise `stop` once `count` frames have been served
    pub fn stopping_after(mut self, count: u64, stop: Arc<AtomicBool>) -> Self {
        self.stop_after = Some((count, stop));
        self
    }
}

impl FrameSource for MockFrameSource {
    fn acquire(&mut self, region: &CaptureRegion) -> Result<RawFrame> {
        self.seen_regions.lock().unwrap().push(*region);
        let tick = self.acquires;
        self.acquires += 1;

        if self.fail_on.contains(&tick) {
            return Err(RondoError::capture(format!("scripted failure at {}", tick)));
        }

        let frame = RawFrame::new(
            self.size,
            self.size,
            vec![0x7f; (self.size * self.size * 4) as usize],
        )?;

        if let Some((count, stop)) = &self.stop_after {
            if self.acquires >= *count {
                stop.store(true, Ordering::SeqCst);
            }
        }

        Ok(frame)
    }
}

/// What the mock sink does when finished
#[derive(Debug, Clone)]
pub enum FinishBehavior {
    /// Write the artifact file and return it
    Succeed(PathBuf),
    /// Non-zero exit / empty output
    FailEncode,
    /// Simulated hung encoder
    Timeout,
}

/// In-memory encoder sink with scriptable write/finish behavior
pub struct MockSink {
    behavior: FinishBehavior,
    fail_write_at: Option<u64>,
    writes: u64,
    pub frames_written: Arc<Mutex<Vec<usize>>>,
    pub finish_timeout: Arc<Mutex<Option<Duration>>>,
    pub aborted: Arc<AtomicBool>,
}

impl MockSink {
    pub fn new(behavior: FinishBehavior) -> Self {
        Self {
            behavior,
            fail_write_at: None,
            writes: 0,
            frames_written: Arc::new(Mutex::new(Vec::new())),
            finish_timeout: Arc::new(Mutex::new(None)),
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Break the pipe on the given 0-based write index
    pub fn breaking_pipe_at(mut self, write: u64) -> Self {
        self.fail_write_at = Some(write);
        self
    }
}

impl VideoSink for MockSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let write = self.writes;
        self.writes += 1;
        if self.fail_write_at == Some(write) {
            return Err(RondoError::EncoderPipeBroken("scripted pipe break".to_string()));
        }
        self.frames_written.lock().unwrap().push(frame.len());
        Ok(())
    }

    fn finish(&mut self, timeout: Duration) -> Result<EncodedArtifact> {
        *self.finish_timeout.lock().unwrap() = Some(timeout);
        match &self.behavior {
            FinishBehavior::Succeed(path) => {
                std::fs::write(path, b"mock video note")?;
                EncodedArtifact::from_path(path.clone())
            }
            FinishBehavior::FailEncode => {
                Err(RondoError::encode_failed("mock encoder exited with 1"))
            }
            FinishBehavior::Timeout => Err(RondoError::EncoderTimeout(timeout)),
        }
    }

    fn abort(&mut self) {
        self.aborted.store(true, Ordering::SeqCst);
    }
}

/// Launcher wiring mock sources and sinks into real worker threads
pub struct MockLauncher {
    pub loop_config: CaptureLoopConfig,
    pub note_size: u32,
    pub behavior: FinishBehavior,
    pub launches: Arc<AtomicUsize>,
}

impl MockLauncher {
    pub fn new(loop_config: CaptureLoopConfig, note_size: u32, behavior: FinishBehavior) -> Self {
        Self {
            loop_config,
            note_size,
            behavior,
            launches: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SessionLauncher for MockLauncher {
    fn launch(&self, region: SharedRegion, events: Sender<EngineEvent>) -> Result<SessionWorker> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        SessionWorker::spawn(
            self.loop_config,
            region,
            MockFrameSource::new(self.note_size),
            MockSink::new(self.behavior.clone()),
            self.note_size,
            events,
        )
    }
}

/// Messaging client recording every call
pub struct MockMessenger {
    pub fail_send: bool,
    pub sent: Mutex<Vec<(i64, PathBuf)>>,
    pub disconnected: AtomicBool,
    pub destinations: Vec<DestinationRef>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self {
            fail_send: false,
            sent: Mutex::new(Vec::new()),
            disconnected: AtomicBool::new(false),
            destinations: vec![
                DestinationRef::new(42, "Ada"),
                DestinationRef::new(-100, "Team"),
            ],
        }
    }

    pub fn failing_sends() -> Self {
        Self {
            fail_send: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn authenticate(&self) -> Result<()> {
        Ok(())
    }

    async fn list_destinations(&self, limit: usize) -> Result<Vec<DestinationRef>> {
        Ok(self.destinations.iter().take(limit).cloned().collect())
    }

    async fn send_video_note(&self, destination: i64, path: &Path) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((destination, path.to_path_buf()));
        if self.fail_send {
            Err(RondoError::delivery("mock network failure"))
        } else {
            Ok(())
        }
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnected.store(true, Ordering::SeqCst);
        Ok(())
    }
}
