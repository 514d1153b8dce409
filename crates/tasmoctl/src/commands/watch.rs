//! Live monitoring: poll all registered devices and stream changes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use tasmo_core::{DeviceFleet, MonitorPhase, PollScheduler};

use crate::cli::GlobalOpts;
use crate::commands::Settings;
use crate::error::CliError;
use crate::output;

use super::{power, util};

/// Attach every registered device, start the scheduler, and print state
/// changes until interrupted.
pub async fn run(
    settings: &Settings,
    global: &GlobalOpts,
    interval: Option<u64>,
) -> Result<(), CliError> {
    let store = util::open_store(settings);
    let devices: Vec<Arc<tasmo_core::Device>> = store
        .registry()
        .iter_devices()
        .map(|(_, d)| Arc::new(d.clone()))
        .collect();

    if devices.is_empty() {
        if !global.quiet {
            eprintln!("No devices registered; nothing to watch.");
        }
        return Ok(());
    }

    let fleet = Arc::new(DeviceFleet::new(Arc::new(power::build_client(settings)?)));
    let mut events = fleet.subscribe();
    let color = output::should_color(&global.color);

    for device in devices {
        fleet.attach(device).await;
    }

    let period = interval.map_or(settings.poll_interval, Duration::from_secs);
    let mut scheduler = PollScheduler::new(Arc::clone(&fleet), period);
    scheduler.start();

    if !global.quiet {
        eprintln!(
            "Watching {} devices every {}s (ctrl-c to stop)",
            fleet.len(),
            period.as_secs()
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => print_event(&event, color),
                // Lagged subscriber: skip what was lost and keep going.
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    scheduler.stop().await;
    Ok(())
}

fn print_event(event: &tasmo_core::MonitorEvent, color: bool) {
    if event.snapshot.busy {
        return;
    }

    let stamp = Local::now().format("%H:%M:%S");
    let state = match event.snapshot.phase {
        MonitorPhase::Loading => return,
        MonitorPhase::Ready => output::power_label(Some(event.snapshot.displayed_on), color),
        MonitorPhase::Degraded => output::power_label(None, color),
    };
    println!("{stamp}  {:<20} {state}", event.device.name);
}
