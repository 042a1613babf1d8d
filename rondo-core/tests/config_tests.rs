//! Integration tests for configuration loading and validation

use std::time::Duration;

use rondo_core::RondoConfig;

#[test]
fn defaults_match_the_note_format() {
    let config = RondoConfig::default();

    assert_eq!(config.note_size, 400);
    assert_eq!(config.fps, 25);
    assert_eq!(config.max_duration_secs, 60);
    assert_eq!(config.crf, 26);
    assert_eq!(config.preset, "ultrafast");
    assert_eq!(config.destination_limit, 60);
    assert_eq!(config.hotkeys.toggle, "f10");
    assert_eq!(config.hotkeys.cancel, "esc");
    assert!(config.validate().is_ok());
}

#[test]
fn frame_interval_derives_from_fps() {
    let config = RondoConfig::default();
    assert_eq!(config.frame_interval(), Duration::from_millis(40));

    let mut faster = config.clone();
    faster.fps = 50;
    assert_eq!(faster.frame_interval(), Duration::from_millis(20));
}

#[test]
fn validation_rejects_unusable_values() {
    let mut config = RondoConfig::default();
    config.note_size = 0;
    assert!(config.validate().is_err());

    let mut config = RondoConfig::default();
    config.note_size = 401;
    assert!(config.validate().is_err(), "odd sizes break the encoder");

    let mut config = RondoConfig::default();
    config.fps = 0;
    assert!(config.validate().is_err());

    let mut config = RondoConfig::default();
    config.fps = 120;
    assert!(config.validate().is_err());

    let mut config = RondoConfig::default();
    config.max_duration_secs = 0;
    assert!(config.validate().is_err());

    let mut config = RondoConfig::default();
    config.crf = 52;
    assert!(config.validate().is_err());
}

#[test]
fn partial_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "fps = 30\n\n[hotkeys]\ntoggle = \"f9\"\n").unwrap();

    let config = RondoConfig::load_from(&path).unwrap();
    assert_eq!(config.fps, 30);
    assert_eq!(config.hotkeys.toggle, "f9");
    // Everything else keeps its default
    assert_eq!(config.note_size, 400);
    assert_eq!(config.hotkeys.cancel, "esc");
}

#[test]
fn invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "fps = 0\n").unwrap();
    assert!(RondoConfig::load_from(&path).is_err());

    std::fs::write(&path, "not toml at all {{{").unwrap();
    assert!(RondoConfig::load_from(&path).is_err());
}

#[test]
fn capture_loop_settings_mirror_the_config() {
    let config = RondoConfig::default();
    let loop_config = config.capture_loop();

    assert_eq!(loop_config.frame_interval, Duration::from_millis(40));
    assert_eq!(loop_config.duration_cap, Duration::from_secs(60));
    assert_eq!(loop_config.finish_timeout, Duration::from_secs(5));
}

#[test]
fn encoder_spec_mirrors_the_config() {
    let config = RondoConfig::default();
    let spec = config.encoder_spec();

    assert_eq!(spec.width, 400);
    assert_eq!(spec.height, 400);
    assert_eq!(spec.fps, 25);
    assert_eq!(spec.crf, 26);
    assert_eq!(spec.preset, "ultrafast");
    assert!(spec.validate().is_ok());
}

#[test]
fn settle_delay_is_bounded_not_a_retry_loop() {
    let config = RondoConfig::default();
    assert_eq!(config.settle_delay(), Duration::from_millis(500));
}
