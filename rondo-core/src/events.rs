//! One-way event signals between the engine, UI and worker contexts
//!
//! Contexts never mutate each other's state directly: the worker thread and
//! the network thread post `EngineEvent`s to the engine queue, the engine
//! posts `UiCommand`s to the UI queue, and each owner drains its queue at its
//! own cadence. The shared capture region is the single exception, handled by
//! [`crate::region::SharedRegion`].

use crate::error::RondoError;
use crate::types::{CaptureRegion, DestinationRef, EncodedArtifact, SessionHandle};

/// Commands consumed by the UI presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    /// Show the overlay
    Show,
    /// Hide the overlay and any open picker
    Hide,
    /// Switch the overlay between idle and recording rendering
    SetRecordingMode(bool),
    /// Populate the destination picker
    SetDestinations(Vec<DestinationRef>),
}

/// Intents produced by the UI layer or the hotkey listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiIntent {
    /// Show the overlay / start recording / stop recording
    ToggleRecording,
    /// Force everything back to hidden
    CancelAll,
    /// The user picked a destination for the finished note
    DestinationChosen(i64),
    /// The overlay was dragged; the capture rectangle moved
    RegionChanged(CaptureRegion),
}

/// Events drained by the engine thread
#[derive(Debug)]
pub enum EngineEvent {
    /// A user intent from the UI or a hotkey
    Intent(UiIntent),
    /// The capture worker finished (cap reached, stop requested, or failed)
    SessionFinished(SessionHandle, Result<EncodedArtifact, RondoError>),
    /// A delivery attempt completed on the network thread
    DeliveryFinished(Result<(), RondoError>),
    /// Tear the engine down and exit the event loop
    Shutdown,
}
