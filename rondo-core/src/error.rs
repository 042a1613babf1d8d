//! Error types for Rondo

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using RondoError
pub type Result<T> = std::result::Result<T, RondoError>;

/// Main error type for Rondo operations
#[derive(Debug, Error)]
pub enum RondoError {
    /// Transient frame capture error (per tick, skip and continue)
    #[error("Capture error: {0}")]
    Capture(String),

    /// Encoder setup or configuration error
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// The encoder's input pipe broke mid-session
    #[error("Encoder pipe broken: {0}")]
    EncoderPipeBroken(String),

    /// The encoder process did not exit within the finalize timeout
    #[error("Encoder did not exit within {0:?}")]
    EncoderTimeout(std::time::Duration),

    /// The encoder exited abnormally or produced no usable output
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),

    /// The artifact vanished before delivery could send it
    #[error("Artifact missing or empty: {0}")]
    ArtifactMissing(PathBuf),

    /// Messaging client / network error during delivery
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Startup authentication error (missing or rejected credentials)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Recording session not active
    #[error("No active recording session")]
    NoActiveSession,

    /// Recording session already running
    #[error("Recording session already running")]
    SessionAlreadyRunning,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<RondoError>,
    },
}

impl RondoError {
    /// Create a capture error
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Create an encoder error
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Create an encode-failed error
    pub fn encode_failed(msg: impl Into<String>) -> Self {
        Self::EncodeFailed(msg.into())
    }

    /// Create a delivery error
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error ends the current recording session.
    ///
    /// Capture errors are absorbed per tick; everything else tears the
    /// session down and returns the controller to `Hidden`.
    pub fn is_fatal_to_session(&self) -> bool {
        match self {
            Self::Capture(_) => false,
            Self::WithContext { source, .. } => source.is_fatal_to_session(),
            _ => true,
        }
    }

    /// A short actionable hint for the user, when one exists
    pub fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Encoder(_) | Self::EncodeFailed(_) => {
                Some("Check that ffmpeg is installed and on PATH (try `rondo check`)")
            }
            Self::EncoderTimeout(_) => {
                Some("The encoder hung and was killed; re-record and try again")
            }
            Self::Capture(_) => {
                Some("Make sure the overlay circle is fully on screen")
            }
            Self::Auth(_) => {
                Some("Set RONDO_API_ID and RONDO_API_HASH in the environment")
            }
            Self::Delivery(_) => {
                Some("Check network connectivity; the note must be re-recorded")
            }
            Self::Config(_) => Some("Check ~/.config/rondo/config.toml"),
            Self::WithContext { source, .. } => source.user_hint(),
            _ => None,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

// Conversions from external error types

impl From<reqwest::Error> for RondoError {
    fn from(err: reqwest::Error) -> Self {
        Self::Delivery(err.to_string())
    }
}

impl From<toml::de::Error> for RondoError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
