//! Process-wide engine context
//!
//! Owns the tokio runtime hosting the messaging client, the controller, and
//! the engine event queue. Explicit init and teardown; no ambient globals.
//! The engine thread is the UI-owning context: it alone mutates controller
//! state, driven by queued events from the hotkey thread, the capture worker
//! and the network thread.

use screenshots::Screen;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RondoConfig;
use crate::controller::{CaptureSessionLauncher, RecordingController};
use crate::delivery::DeliveryCoordinator;
use crate::error::{Result, RondoError, ResultExt};
use crate::events::{EngineEvent, UiCommand};
use crate::hotkeys::HotkeyListener;
use crate::messenger::Messenger;
use crate::region::SharedRegion;
use crate::types::{CaptureRegion, DestinationRef};

/// The running engine: runtime + controller + event queue
pub struct Engine {
    runtime: tokio::runtime::Runtime,
    messenger: Arc<dyn Messenger>,
    controller: RecordingController,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,
    hotkeys: Option<HotkeyListener>,
    region: SharedRegion,
}

impl Engine {
    /// Initialize the engine: authenticate, cache destinations, wire queues.
    ///
    /// Authentication failure is fatal; nothing else starts without it.
    pub fn start(
        config: RondoConfig,
        messenger: Arc<dyn Messenger>,
        ui_tx: Sender<UiCommand>,
    ) -> Result<Self> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("rondo-net")
            .enable_all()
            .build()
            .map_err(|e| RondoError::config(format!("failed to build runtime: {}", e)))?;

        runtime
            .block_on(messenger.authenticate())
            .context("Startup authentication failed")?;
        let destinations = runtime
            .block_on(messenger.list_destinations(config.destination_limit))
            .context("Destination listing failed")?;
        info!("Cached {} destinations", destinations.len());

        let (events_tx, events_rx) = mpsc::channel();
        let region = SharedRegion::new(initial_region(config.note_size));

        // Ctrl-C becomes an orderly shutdown event
        let shutdown_tx = events_tx.clone();
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(EngineEvent::Shutdown);
            }
        });

        let delivery = Arc::new(DeliveryCoordinator::new(
            messenger.clone(),
            config.settle_delay(),
        ));
        let launcher = Box::new(CaptureSessionLauncher::from_config(&config));
        let controller = RecordingController::new(
            region.clone(),
            ui_tx,
            events_tx.clone(),
            launcher,
            delivery,
            runtime.handle().clone(),
            destinations,
        );

        let mut hotkeys = HotkeyListener::from_config(&config.hotkeys, events_tx.clone())?;
        hotkeys.start()?;

        Ok(Self {
            runtime,
            messenger,
            controller,
            events_tx,
            events_rx,
            hotkeys: Some(hotkeys),
            region,
        })
    }

    /// Sender for posting events into the engine queue (UI intents, shutdown)
    pub fn events_sender(&self) -> Sender<EngineEvent> {
        self.events_tx.clone()
    }

    /// Handle to the live capture region
    pub fn region(&self) -> SharedRegion {
        self.region.clone()
    }

    /// The destination cache built at startup
    pub fn destinations(&self) -> &[DestinationRef] {
        self.controller.destinations()
    }

    /// Drain the event queue until shutdown, then tear everything down
    pub fn run(&mut self) -> Result<()> {
        info!("Engine running");
        loop {
            match self.events_rx.recv() {
                Ok(EngineEvent::Intent(intent)) => self.controller.handle_intent(intent),
                Ok(EngineEvent::SessionFinished(handle, result)) => {
                    self.controller.handle_session_finished(handle, result)
                }
                Ok(EngineEvent::DeliveryFinished(result)) => {
                    self.controller.handle_delivery_finished(result)
                }
                Ok(EngineEvent::Shutdown) => break,
                Err(_) => {
                    debug!("All event senders dropped");
                    break;
                }
            }
        }
        self.teardown();
        Ok(())
    }

    fn teardown(&mut self) {
        info!("Engine shutting down");
        if let Some(mut hotkeys) = self.hotkeys.take() {
            hotkeys.stop();
        }
        self.controller.shutdown();
        if let Err(e) = self.runtime.block_on(self.messenger.disconnect()) {
            warn!("Messenger disconnect failed: {}", e);
        }
    }
}

/// Start the capture circle centered on the primary display
fn initial_region(note_size: u32) -> CaptureRegion {
    let centered = Screen::all().ok().and_then(|screens| {
        screens
            .iter()
            .find(|s| s.display_info.is_primary)
            .or_else(|| screens.first())
            .map(|s| {
                let info = s.display_info;
                CaptureRegion::square(
                    info.x + (info.width as i32 - note_size as i32) / 2,
                    info.y + (info.height as i32 - note_size as i32) / 2,
                    note_size,
                )
            })
    });

    centered.unwrap_or_else(|| {
        warn!("No display found, starting region at origin");
        CaptureRegion::square(0, 0, note_size)
    })
}
