//! Messaging client contract
//!
//! The core only needs four operations from the messaging backend; transport
//! mechanics live behind this trait. The shipped implementation talks to the
//! Telegram Bot API over HTTPS, see [`telegram`].

pub mod telegram;

pub use telegram::TelegramClient;

use async_trait::async_trait;
use std::path::Path;

use crate::error::{Result, RondoError};
use crate::types::DestinationRef;

/// Messaging backend the engine delivers video notes through
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Verify credentials against the backend; fatal at startup on failure
    async fn authenticate(&self) -> Result<()>;

    /// Destinations the user may send to, newest first, capped at `limit`
    async fn list_destinations(&self, limit: usize) -> Result<Vec<DestinationRef>>;

    /// Upload the finished note to a destination
    async fn send_video_note(&self, destination: i64, path: &Path) -> Result<()>;

    /// Release any backend session state
    async fn disconnect(&self) -> Result<()>;
}

/// Messaging credentials, read once from the environment at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Numeric API identifier
    pub api_id: String,
    /// API secret hash
    pub api_hash: String,
}

/// Environment variable holding the API identifier
pub const API_ID_VAR: &str = "RONDO_API_ID";
/// Environment variable holding the API hash
pub const API_HASH_VAR: &str = "RONDO_API_HASH";

impl Credentials {
    /// Read credentials from the environment; absence is a fatal startup error
    pub fn from_env() -> Result<Self> {
        let api_id = std::env::var(API_ID_VAR)
            .map_err(|_| RondoError::auth(format!("{} is not set", API_ID_VAR)))?;
        let api_hash = std::env::var(API_HASH_VAR)
            .map_err(|_| RondoError::auth(format!("{} is not set", API_HASH_VAR)))?;
        Self::new(api_id, api_hash)
    }

    /// Build credentials from explicit values
    pub fn new(api_id: impl Into<String>, api_hash: impl Into<String>) -> Result<Self> {
        let api_id = api_id.into();
        let api_hash = api_hash.into();
        if api_id.trim().is_empty() || api_hash.trim().is_empty() {
            return Err(RondoError::auth("empty API credentials"));
        }
        Ok(Self { api_id, api_hash })
    }

    /// The bot token form the HTTP API expects: `<id>:<hash>`
    pub fn bot_token(&self) -> String {
        format!("{}:{}", self.api_id, self.api_hash)
    }
}
