//! Integration tests for error handling

use std::path::PathBuf;
use std::time::Duration;

use rondo_core::error::{ResultExt, RondoError};

#[test]
fn test_error_context_chaining() {
    let base_error = RondoError::encoder("Codec not found");
    let with_context = base_error.with_context("Failed to start encoder");

    let msg = format!("{}", with_context);
    assert!(msg.contains("Failed to start encoder"));
    assert!(msg.contains("Codec not found"));
}

#[test]
fn test_error_context_preserves_hint() {
    let base_error = RondoError::auth("credentials rejected");
    let hint_before = base_error.user_hint();

    let with_context = base_error.with_context("During startup");
    let hint_after = with_context.user_hint();

    assert_eq!(hint_before, hint_after);
}

#[test]
fn test_result_ext_context() {
    let result: Result<(), RondoError> = Err(RondoError::delivery("connection reset"));
    let with_context = result.context("Sending video note");

    assert!(with_context.is_err());
    let err = with_context.unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Sending video note"));
}

#[test]
fn test_user_hints() {
    // Encoder problems point at ffmpeg
    let err = RondoError::encoder("test");
    assert!(err.user_hint().is_some());
    assert!(err.user_hint().unwrap().contains("ffmpeg"));

    // Auth problems point at the environment variables
    let err = RondoError::auth("test");
    assert!(err.user_hint().is_some());
    assert!(err.user_hint().unwrap().contains("RONDO_API_ID"));

    // Config problems point at the config file
    let err = RondoError::config("test");
    assert!(err.user_hint().is_some());
    assert!(err.user_hint().unwrap().contains("config.toml"));
}

#[test]
fn test_session_fatality() {
    // Per-tick capture errors are absorbed, the session continues
    assert!(!RondoError::capture("region off screen").is_fatal_to_session());
    assert!(!RondoError::capture("x")
        .with_context("tick 12")
        .is_fatal_to_session());

    // Everything else ends the session
    assert!(RondoError::EncoderPipeBroken("broken".into()).is_fatal_to_session());
    assert!(RondoError::EncoderTimeout(Duration::from_secs(5)).is_fatal_to_session());
    assert!(RondoError::encode_failed("exit 1").is_fatal_to_session());
    assert!(RondoError::ArtifactMissing(PathBuf::from("/tmp/x")).is_fatal_to_session());
}

#[test]
fn test_error_display_format() {
    let err = RondoError::capture("region off screen");
    assert_eq!(format!("{}", err), "Capture error: region off screen");

    let err = RondoError::encode_failed("exit 1");
    assert_eq!(format!("{}", err), "Encoding failed: exit 1");

    let err = RondoError::NoActiveSession;
    assert_eq!(format!("{}", err), "No active recording session");

    let err = RondoError::SessionAlreadyRunning;
    assert_eq!(format!("{}", err), "Recording session already running");
}

#[test]
fn test_nested_context() {
    let err = RondoError::delivery("send failed")
        .with_context("Uploading note")
        .with_context("During delivery");

    let msg = format!("{}", err);
    assert!(msg.contains("During delivery"));
    assert!(err.user_hint().is_some());
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let rondo_err: RondoError = io_err.into();

    let msg = format!("{}", rondo_err);
    assert!(msg.contains("I/O error"));
    assert!(msg.contains("File not found"));
}
