//! Telegram Bot API client
//!
//! A thin reqwest client over `api.telegram.org`. The Bot API cannot
//! enumerate dialogs the way a user session can, so the destination list is
//! derived from the chats seen in recent updates and cached by the engine
//! once per process.

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Result, RondoError};
use crate::messenger::{Credentials, Messenger};
use crate::types::DestinationRef;

const API_BASE: &str = "https://api.telegram.org";
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Generic Bot API envelope
#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiReply<T> {
    fn into_result(self, method: &str) -> Result<T> {
        if !self.ok {
            return Err(RondoError::delivery(format!(
                "{} failed: {}",
                method,
                self.description.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        self.result
            .ok_or_else(|| RondoError::delivery(format!("{} returned no result", method)))
    }
}

#[derive(Debug, Deserialize)]
struct TgUser {
    id: i64,
    first_name: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgUpdate {
    #[allow(dead_code)]
    update_id: i64,
    #[serde(default)]
    message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    chat: TgChat,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

impl TgChat {
    fn display_name(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self
                .username
                .clone()
                .unwrap_or_else(|| self.id.to_string()),
        }
    }

    fn is_sendable(&self) -> bool {
        matches!(self.kind.as_str(), "private" | "group" | "supergroup" | "channel")
    }
}

/// Bot API implementation of [`Messenger`]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Build a client from credentials
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| RondoError::delivery(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", API_BASE, credentials.bot_token()),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn authenticate(&self) -> Result<()> {
        let reply: ApiReply<TgUser> = self
            .http
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| RondoError::auth(format!("getMe request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| RondoError::auth(format!("getMe returned invalid JSON: {}", e)))?;

        let me = reply
            .into_result("getMe")
            .map_err(|e| RondoError::auth(e.to_string()))?;
        info!(
            "Authenticated as {} (@{}, id {})",
            me.first_name,
            me.username.as_deref().unwrap_or("-"),
            me.id
        );
        Ok(())
    }

    async fn list_destinations(&self, limit: usize) -> Result<Vec<DestinationRef>> {
        let reply: ApiReply<Vec<TgUpdate>> = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[("limit", "100")])
            .send()
            .await?
            .json()
            .await?;
        let updates = reply.into_result("getUpdates")?;

        // Newest chats first, deduplicated by id
        let mut destinations: Vec<DestinationRef> = Vec::new();
        for update in updates.into_iter().rev() {
            let Some(message) = update.message else {
                continue;
            };
            if !message.chat.is_sendable() {
                continue;
            }
            if destinations.iter().any(|d| d.id == message.chat.id) {
                continue;
            }
            destinations.push(DestinationRef::new(message.chat.id, message.chat.display_name()));
            if destinations.len() >= limit {
                break;
            }
        }

        debug!("Discovered {} sendable destinations", destinations.len());
        Ok(destinations)
    }

    async fn send_video_note(&self, destination: i64, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|_| RondoError::ArtifactMissing(path.to_path_buf()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video_note.mp4".to_string());

        let form = multipart::Form::new()
            .text("chat_id", destination.to_string())
            .part(
                "video_note",
                multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str("video/mp4")
                    .map_err(|e| RondoError::delivery(e.to_string()))?,
            );

        let reply: ApiReply<serde_json::Value> = self
            .http
            .post(self.method_url("sendVideoNote"))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;
        reply.into_result("sendVideoNote")?;

        info!("Video note delivered to chat {}", destination);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        // The Bot API is stateless over HTTP; nothing to tear down
        debug!("Messenger disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_display_name_prefers_title() {
        let chat = TgChat {
            id: 1,
            kind: "group".to_string(),
            title: Some("Team".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: None,
            username: None,
        };
        assert_eq!(chat.display_name(), "Team");
    }

    #[test]
    fn chat_display_name_falls_back_to_person_then_id() {
        let chat = TgChat {
            id: 7,
            kind: "private".to_string(),
            title: None,
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            username: None,
        };
        assert_eq!(chat.display_name(), "Ada Lovelace");

        let bare = TgChat {
            id: 7,
            kind: "private".to_string(),
            title: None,
            first_name: None,
            last_name: None,
            username: None,
        };
        assert_eq!(bare.display_name(), "7");
    }

    #[test]
    fn sendable_kinds() {
        for kind in ["private", "group", "supergroup", "channel"] {
            let chat = TgChat {
                id: 1,
                kind: kind.to_string(),
                title: None,
                first_name: None,
                last_name: None,
                username: None,
            };
            assert!(chat.is_sendable(), "{} should be sendable", kind);
        }
    }

    #[test]
    fn api_reply_error_carries_description() {
        let reply: ApiReply<TgUser> = ApiReply {
            ok: false,
            result: None,
            description: Some("Unauthorized".to_string()),
        };
        let err = reply.into_result("getMe").unwrap_err();
        assert!(err.to_string().contains("Unauthorized"));
    }
}
