//! Integration tests for delivery coordination

mod mocks;

use std::sync::Arc;
use std::time::Duration;

use mocks::MockMessenger;
use rondo_core::delivery::DeliveryCoordinator;
use rondo_core::error::RondoError;
use rondo_core::types::EncodedArtifact;

const SETTLE: Duration = Duration::from_millis(1);

fn artifact_in(dir: &tempfile::TempDir) -> EncodedArtifact {
    let path = dir.path().join("note.mp4");
    std::fs::write(&path, b"finished note").unwrap();
    EncodedArtifact::from_path(path).unwrap()
}

#[tokio::test]
async fn successful_delivery_deletes_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = artifact_in(&dir);
    let path = artifact.path.clone();

    let messenger = Arc::new(MockMessenger::new());
    let coordinator = DeliveryCoordinator::new(messenger.clone(), SETTLE);

    coordinator.deliver(artifact, 42).await.unwrap();

    let sent = messenger.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], (42, path.clone()));
    assert!(!path.exists());
}

#[tokio::test]
async fn failed_send_still_deletes_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = artifact_in(&dir);
    let path = artifact.path.clone();

    let messenger = Arc::new(MockMessenger::failing_sends());
    let coordinator = DeliveryCoordinator::new(messenger.clone(), SETTLE);

    let result = coordinator.deliver(artifact, 42).await;

    assert!(matches!(result, Err(RondoError::Delivery(_))));
    assert_eq!(messenger.sent.lock().unwrap().len(), 1);
    assert!(!path.exists(), "no orphaned files after a failed send");
}

#[tokio::test]
async fn missing_artifact_fails_fast_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = EncodedArtifact {
        path: dir.path().join("vanished.mp4"),
        byte_size: 1,
    };

    let messenger = Arc::new(MockMessenger::new());
    let coordinator = DeliveryCoordinator::new(messenger.clone(), SETTLE);

    let result = coordinator.deliver(artifact, 42).await;

    assert!(matches!(result, Err(RondoError::ArtifactMissing(_))));
    assert!(messenger.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_artifact_is_rejected_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.mp4");
    std::fs::write(&path, b"").unwrap();
    let artifact = EncodedArtifact {
        path: path.clone(),
        byte_size: 0,
    };

    let messenger = Arc::new(MockMessenger::new());
    let coordinator = DeliveryCoordinator::new(messenger.clone(), SETTLE);

    let result = coordinator.deliver(artifact, 42).await;

    assert!(matches!(result, Err(RondoError::ArtifactMissing(_))));
    assert!(messenger.sent.lock().unwrap().is_empty());
    assert!(!path.exists());
}
