//! Simulated instrument
//!
//! Connects to a hub as an instrument, emits a random weight reading
//! on an interval, and logs forwarded commands. Locate commands are
//! dispatched the way a real agent would hand them to its status LED.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glint_client::InstrumentLink;
use glint_core::LocateCommand;
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn run(hub: &str, id: Uuid, interval_ms: u64) -> Result<()> {
    let mut link = InstrumentLink::connect(hub, id)
        .await
        .with_context(|| format!("connecting to {}", hub))?;

    info!("Simulated instrument {} connected to {}", id, hub);

    let interval = Duration::from_millis(interval_ms);
    loop {
        let reading: f64 = (rand::thread_rng().gen_range(50.0_f64..100.0) * 100.0).round() / 100.0;
        link.send_reading(reading)
            .await
            .context("hub connection lost")?;
        info!("Sent reading: {} kg", reading);

        // Drain commands until the next reading is due
        let deadline = Instant::now() + interval;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match tokio::time::timeout(remaining, link.next_command()).await {
                Ok(Some(command)) => handle_command(&command),
                Ok(None) => {
                    warn!("Hub connection closed");
                    return Ok(());
                }
                Err(_) => break,
            }
        }
    }
}

fn handle_command(command: &str) {
    match LocateCommand::parse(command) {
        Some(locate) => info!(
            "Blinking {} LED {} times, {}s each",
            locate.color, locate.count, locate.duration_secs
        ),
        None => info!("Driver would execute: {}", command),
    }
}
