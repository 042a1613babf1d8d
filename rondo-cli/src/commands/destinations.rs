//! List destinations the messaging client can send to

use anyhow::{Context, Result};

use rondo_core::messenger::Messenger;
use rondo_core::{Credentials, RondoConfig, TelegramClient};

/// Print the destinations the bot currently knows about
pub fn destinations() -> Result<()> {
    let config = RondoConfig::load()?;
    let credentials = Credentials::from_env().context("Missing messaging credentials")?;
    let client = TelegramClient::new(&credentials)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(client.authenticate())?;
    let destinations = runtime.block_on(client.list_destinations(config.destination_limit))?;

    if destinations.is_empty() {
        println!("No destinations yet. Send the bot a message and try again.");
        return Ok(());
    }

    println!("{} destination(s):", destinations.len());
    for destination in destinations {
        println!("  {:>14}  {}", destination.id, destination.name);
    }

    Ok(())
}
