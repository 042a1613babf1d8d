//! Environment diagnostics

use anyhow::Result;

use rondo_core::capture::screen;
use rondo_core::encode;
use rondo_core::messenger::{API_HASH_VAR, API_ID_VAR};
use rondo_core::RondoConfig;

/// Report on everything `rondo run` needs
pub fn check() -> Result<()> {
    println!("Rondo environment check");
    println!();

    // Encoder
    if encode::ffmpeg_available() {
        println!("  ffmpeg:      ok");
    } else {
        println!("  ffmpeg:      NOT FOUND (install ffmpeg and put it on PATH)");
    }

    // Credentials
    let id_set = std::env::var(API_ID_VAR).is_ok();
    let hash_set = std::env::var(API_HASH_VAR).is_ok();
    println!(
        "  credentials: {} ({}, {})",
        if id_set && hash_set { "ok" } else { "MISSING" },
        API_ID_VAR,
        API_HASH_VAR
    );

    // Displays
    println!("  displays:    {}", screen::display_summary());

    // Config
    let config = RondoConfig::load()?;
    println!();
    println!(
        "  note: {0}x{0} @ {1} fps, cap {2}s, output {3:?}",
        config.note_size, config.fps, config.max_duration_secs, config.output_path
    );
    println!(
        "  hotkeys: toggle={} cancel={}",
        config.hotkeys.toggle, config.hotkeys.cancel
    );
    match RondoConfig::config_path() {
        Some(path) if path.exists() => println!("  config file: {:?}", path),
        Some(path) => println!("  config file: {:?} (not present, defaults in use)", path),
        None => println!("  config file: no config directory"),
    }

    Ok(())
}
