//! Delivery of the finished artifact to the messaging backend
//!
//! Runs on the engine's tokio runtime, fire-and-forget from the controller's
//! perspective. Whatever the outcome, the artifact file is removed and a
//! completion event is posted so the UI always returns to hidden.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, RondoError};
use crate::events::EngineEvent;
use crate::messenger::Messenger;
use crate::types::EncodedArtifact;

/// Hands finished artifacts to the messaging client
pub struct DeliveryCoordinator {
    messenger: Arc<dyn Messenger>,
    settle_delay: Duration,
}

impl DeliveryCoordinator {
    /// Create a coordinator over a messaging client
    pub fn new(messenger: Arc<dyn Messenger>, settle_delay: Duration) -> Self {
        Self {
            messenger,
            settle_delay,
        }
    }

    /// Send one artifact to a destination.
    ///
    /// A short settling delay absorbs filesystem-visibility lag from the
    /// just-exited encoder process before the defensive re-check; it is a
    /// single deliberate wait, not a retry loop. The artifact file is removed
    /// after the attempt regardless of outcome.
    pub async fn deliver(&self, artifact: EncodedArtifact, destination: i64) -> Result<()> {
        tokio::time::sleep(self.settle_delay).await;

        // Re-validate: the file was produced by a racing finalize step
        match tokio::fs::metadata(&artifact.path).await {
            Ok(meta) if meta.len() > 0 => {}
            Ok(_) => {
                remove_artifact(&artifact).await;
                return Err(RondoError::ArtifactMissing(artifact.path));
            }
            Err(_) => {
                return Err(RondoError::ArtifactMissing(artifact.path));
            }
        }

        info!(
            "Sending {} byte note to destination {}",
            artifact.byte_size, destination
        );
        let result = self
            .messenger
            .send_video_note(destination, &artifact.path)
            .await;

        remove_artifact(&artifact).await;
        result
    }

    /// Spawn a delivery task on the runtime, posting completion to the engine
    pub fn dispatch(
        self: Arc<Self>,
        runtime: &tokio::runtime::Handle,
        artifact: EncodedArtifact,
        destination: i64,
        events: Sender<EngineEvent>,
    ) {
        runtime.spawn(async move {
            let result = self.deliver(artifact, destination).await;
            if let Err(e) = &result {
                warn!("Delivery failed: {}", e);
            }
            if events.send(EngineEvent::DeliveryFinished(result)).is_err() {
                debug!("Engine queue closed before delivery completion");
            }
        });
    }
}

async fn remove_artifact(artifact: &EncodedArtifact) {
    if let Err(e) = tokio::fs::remove_file(&artifact.path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove artifact {:?}: {}", artifact.path, e);
        }
    } else {
        debug!("Artifact {:?} removed", artifact.path);
    }
}
