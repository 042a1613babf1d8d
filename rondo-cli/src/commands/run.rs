//! The main record-and-deliver loop

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::info;

use rondo_core::encode;
use rondo_core::{
    Credentials, Engine, EngineEvent, RondoConfig, TelegramClient, UiCommand, UiIntent,
};

/// Start the engine and serve hotkey-driven recordings until interrupted
pub fn run() -> Result<()> {
    let config = RondoConfig::load().context("Failed to load configuration")?;

    if !encode::ffmpeg_available() {
        bail!("ffmpeg not found in PATH; install it and try again");
    }

    let credentials = Credentials::from_env().context("Missing messaging credentials")?;
    let client = Arc::new(TelegramClient::new(&credentials)?);

    let (ui_tx, ui_rx) = mpsc::channel();
    let mut engine = Engine::start(config.clone(), client, ui_tx)
        .context("Engine startup failed")?;
    let intents = engine.events_sender();

    // Overlay rendering lives outside this crate; the headless presenter
    // narrates state changes and turns the picker into a stdin prompt.
    let presenter = std::thread::Builder::new()
        .name("rondo-presenter".to_string())
        .spawn(move || presenter_loop(ui_rx, intents))?;

    println!(
        "Rondo ready. {} toggles the circle and recording, {} cancels, Ctrl-C quits.",
        config.hotkeys.toggle, config.hotkeys.cancel
    );

    engine.run()?;
    drop(engine);
    let _ = presenter.join();
    Ok(())
}

fn presenter_loop(ui_rx: Receiver<UiCommand>, intents: Sender<EngineEvent>) {
    for command in ui_rx {
        match command {
            UiCommand::Show => {
                info!("Overlay visible; press the toggle hotkey to start recording")
            }
            UiCommand::Hide => info!("Overlay hidden"),
            UiCommand::SetRecordingMode(true) => info!("Recording..."),
            UiCommand::SetRecordingMode(false) => info!("Recording stopped"),
            UiCommand::SetDestinations(destinations) => {
                if destinations.is_empty() {
                    println!("No destinations known yet; message the bot first.");
                    let _ = intents.send(EngineEvent::Intent(UiIntent::CancelAll));
                    continue;
                }

                println!("Send the note to:");
                for (index, destination) in destinations.iter().enumerate() {
                    println!("  [{}] {}", index, destination.name);
                }
                print!("Choice (empty cancels): ");
                let _ = std::io::stdout().flush();

                let mut line = String::new();
                let intent = match std::io::stdin().read_line(&mut line) {
                    Ok(_) => match line.trim().parse::<usize>().ok() {
                        Some(index) if index < destinations.len() => {
                            UiIntent::DestinationChosen(destinations[index].id)
                        }
                        _ => UiIntent::CancelAll,
                    },
                    Err(_) => UiIntent::CancelAll,
                };
                let _ = intents.send(EngineEvent::Intent(intent));
            }
        }
    }
}
