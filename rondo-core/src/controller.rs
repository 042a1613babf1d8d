//! Recording state machine
//!
//! Coordinates UI visibility, the capture worker's lifecycle and the handoff
//! to delivery. All input arrives as queued events on the engine thread; only
//! one toggle intent is honored per state, so a double-press during a
//! mid-flight transition is ignored until the state settles.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::capture::ScreenGrabSource;
use crate::config::RondoConfig;
use crate::delivery::DeliveryCoordinator;
use crate::encode::{EncoderSpec, FfmpegEncoder};
use crate::error::{Result, RondoError};
use crate::events::{EngineEvent, UiCommand, UiIntent};
use crate::region::SharedRegion;
use crate::session::{CaptureLoopConfig, SessionWorker};
use crate::types::{DestinationRef, EncodedArtifact, SessionHandle};

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Overlay hidden, nothing in flight
    Hidden,
    /// Overlay visible, not recording
    Idle,
    /// Capture worker running
    Recording,
    /// Stop flag raised, waiting for the worker's result
    Finalizing,
    /// Artifact ready, destination picker shown
    SelectingDestination,
    /// Delivery task in flight on the network thread
    Delivering,
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Hidden => "Hidden",
            Self::Idle => "Idle",
            Self::Recording => "Recording",
            Self::Finalizing => "Finalizing",
            Self::SelectingDestination => "SelectingDestination",
            Self::Delivering => "Delivering",
        };
        write!(f, "{}", name)
    }
}

/// Starts one capture worker per recording session.
///
/// The seam lets tests drive the state machine with mock sources and sinks
/// instead of a live screen and an ffmpeg process.
pub trait SessionLauncher: Send {
    /// Spawn the worker for a new session
    fn launch(&self, region: SharedRegion, events: Sender<EngineEvent>) -> Result<SessionWorker>;
}

/// Production launcher: screen grab source into an ffmpeg encoder
pub struct CaptureSessionLauncher {
    loop_config: CaptureLoopConfig,
    encoder_spec: EncoderSpec,
    note_size: u32,
}

impl CaptureSessionLauncher {
    /// Build the launcher from the application config
    pub fn from_config(config: &RondoConfig) -> Self {
        Self {
            loop_config: config.capture_loop(),
            encoder_spec: config.encoder_spec(),
            note_size: config.note_size,
        }
    }
}

impl SessionLauncher for CaptureSessionLauncher {
    fn launch(&self, region: SharedRegion, events: Sender<EngineEvent>) -> Result<SessionWorker> {
        let sink = FfmpegEncoder::spawn(&self.encoder_spec)?;
        SessionWorker::spawn(
            self.loop_config,
            region,
            ScreenGrabSource::new(),
            sink,
            self.note_size,
            events,
        )
    }
}

/// The recording state machine
pub struct RecordingController {
    state: ControllerState,
    region: SharedRegion,
    ui_tx: Sender<UiCommand>,
    events_tx: Sender<EngineEvent>,
    launcher: Box<dyn SessionLauncher>,
    delivery: Arc<DeliveryCoordinator>,
    runtime: tokio::runtime::Handle,
    destinations: Vec<DestinationRef>,
    worker: Option<SessionWorker>,
    pending_artifact: Option<EncodedArtifact>,
}

impl RecordingController {
    /// Create the controller in the `Hidden` state
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        region: SharedRegion,
        ui_tx: Sender<UiCommand>,
        events_tx: Sender<EngineEvent>,
        launcher: Box<dyn SessionLauncher>,
        delivery: Arc<DeliveryCoordinator>,
        runtime: tokio::runtime::Handle,
        destinations: Vec<DestinationRef>,
    ) -> Self {
        Self {
            state: ControllerState::Hidden,
            region,
            ui_tx,
            events_tx,
            launcher,
            delivery,
            runtime,
            destinations,
            worker: None,
            pending_artifact: None,
        }
    }

    /// Current state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Cached destination list
    pub fn destinations(&self) -> &[DestinationRef] {
        &self.destinations
    }

    /// Handle one user intent
    pub fn handle_intent(&mut self, intent: UiIntent) {
        match intent {
            UiIntent::ToggleRecording => self.handle_toggle(),
            UiIntent::CancelAll => self.cancel_all(),
            UiIntent::DestinationChosen(id) => self.handle_destination_chosen(id),
            UiIntent::RegionChanged(region) => self.region.set(region),
        }
    }

    fn handle_toggle(&mut self) {
        match self.state {
            ControllerState::Hidden => {
                self.state = ControllerState::Idle;
                self.send_ui(UiCommand::Show);
            }
            ControllerState::Idle => self.start_recording(),
            ControllerState::Recording => {
                if let Some(worker) = &self.worker {
                    worker.request_stop();
                }
                self.state = ControllerState::Finalizing;
                debug!("Stop requested, finalizing");
            }
            ControllerState::Finalizing
            | ControllerState::SelectingDestination
            | ControllerState::Delivering => {
                debug!("Toggle ignored in {}", self.state);
            }
        }
    }

    fn start_recording(&mut self) {
        if self.worker.is_some() {
            // The state machine makes this unreachable; keep the invariant loud
            warn!("{}", RondoError::SessionAlreadyRunning);
            return;
        }

        match self
            .launcher
            .launch(self.region.clone(), self.events_tx.clone())
        {
            Ok(worker) => {
                info!("{} recording started", worker.handle());
                self.worker = Some(worker);
                self.state = ControllerState::Recording;
                self.send_ui(UiCommand::SetRecordingMode(true));
            }
            Err(e) => {
                error!("Failed to start recording: {}", e);
                if let Some(hint) = e.user_hint() {
                    error!("{}", hint);
                }
                self.state = ControllerState::Hidden;
                self.send_ui(UiCommand::Hide);
            }
        }
    }

    fn handle_destination_chosen(&mut self, destination: i64) {
        if self.state != ControllerState::SelectingDestination {
            debug!("Destination chosen ignored in {}", self.state);
            return;
        }
        let Some(artifact) = self.pending_artifact.take() else {
            warn!("No pending artifact for chosen destination");
            self.state = ControllerState::Hidden;
            self.send_ui(UiCommand::Hide);
            return;
        };

        info!("Delivering note to destination {}", destination);
        self.state = ControllerState::Delivering;
        self.delivery.clone().dispatch(
            &self.runtime,
            artifact,
            destination,
            self.events_tx.clone(),
        );
    }

    /// Handle the capture worker's completion event
    pub fn handle_session_finished(
        &mut self,
        handle: SessionHandle,
        result: Result<EncodedArtifact>,
    ) {
        let is_current = self
            .worker
            .as_ref()
            .map(|w| w.handle() == handle)
            .unwrap_or(false);
        if is_current {
            if let Some(mut worker) = self.worker.take() {
                worker.join();
            }
        }

        let in_flight = matches!(
            self.state,
            ControllerState::Recording | ControllerState::Finalizing
        );
        if !is_current || !in_flight {
            // Cancelled or superseded session; nothing may leak
            if let Ok(artifact) = result {
                debug!("{} finished after cancel, discarding artifact", handle);
                artifact.discard();
            }
            return;
        }

        self.send_ui(UiCommand::SetRecordingMode(false));
        match result {
            Ok(artifact) => {
                info!("{} produced {} bytes", handle, artifact.byte_size);
                self.pending_artifact = Some(artifact);
                self.state = ControllerState::SelectingDestination;
                self.send_ui(UiCommand::SetDestinations(self.destinations.clone()));
            }
            Err(e) => {
                error!("{} failed: {}", handle, e);
                if let Some(hint) = e.user_hint() {
                    error!("{}", hint);
                }
                self.state = ControllerState::Hidden;
                self.send_ui(UiCommand::Hide);
            }
        }
    }

    /// Handle the delivery task's completion event
    pub fn handle_delivery_finished(&mut self, result: Result<()>) {
        match &result {
            Ok(()) => info!("Delivery complete"),
            Err(e) => {
                error!("Delivery failed: {}", e);
                if let Some(hint) = e.user_hint() {
                    error!("{}", hint);
                }
            }
        }

        if self.state == ControllerState::Delivering {
            // Hide regardless of outcome; the artifact is already cleaned up
            self.state = ControllerState::Hidden;
            self.send_ui(UiCommand::Hide);
        } else {
            debug!("Delivery finished after cancel");
        }
    }

    /// Force everything back to hidden.
    ///
    /// An in-flight recording gets the stop flag and its late completion is
    /// discarded; an in-flight delivery completes or fails on its own.
    pub fn cancel_all(&mut self) {
        if self.state == ControllerState::Hidden && self.worker.is_none() {
            return;
        }
        info!("Cancel: returning to hidden from {}", self.state);

        if let Some(worker) = &self.worker {
            worker.request_stop();
        }
        if let Some(artifact) = self.pending_artifact.take() {
            artifact.discard();
        }

        self.state = ControllerState::Hidden;
        self.send_ui(UiCommand::SetRecordingMode(false));
        self.send_ui(UiCommand::Hide);
    }

    /// Teardown: stop and reap any worker, discard any pending artifact
    pub fn shutdown(&mut self) {
        self.cancel_all();
        if let Some(mut worker) = self.worker.take() {
            worker.request_stop();
            worker.join();
        }
    }

    fn send_ui(&self, command: UiCommand) {
        if self.ui_tx.send(command).is_err() {
            debug!("UI queue closed");
        }
    }
}
