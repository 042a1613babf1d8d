//! Rondo Core Library
//!
//! Hotkey-driven circular video notes for Telegram.
//!
//! This library provides:
//! - A real-time region capture loop feeding a streaming ffmpeg encoder
//! - The recording state machine coordinating UI, worker and network threads
//! - Delivery of finished notes through the Telegram Bot API
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐    ┌───────────────┐    ┌──────────────────┐
//! │ Region Capture │───▶│ ffmpeg Encode │───▶│ Telegram Deliver │
//! │ (worker thread)│    │ (child process)│   │ (tokio runtime)  │
//! └────────────────┘    └───────────────┘    └──────────────────┘
//! ```

pub mod capture;
pub mod config;
pub mod controller;
pub mod delivery;
pub mod encode;
pub mod engine;
pub mod error;
pub mod events;
pub mod hotkeys;
pub mod messenger;
pub mod region;
pub mod session;
pub mod types;

pub use config::RondoConfig;
pub use controller::{ControllerState, RecordingController};
pub use engine::Engine;
pub use error::{Result, RondoError};
pub use events::{EngineEvent, UiCommand, UiIntent};
pub use messenger::{Credentials, Messenger, TelegramClient};
pub use region::SharedRegion;
pub use types::{CaptureRegion, DestinationRef, EncodedArtifact, SessionHandle};
