//! Live power commands: status, toggle, web.

use std::sync::Arc;

use futures_util::future::join_all;

use tasmo_api::{TasmotaClient, TransportConfig, web_ui_url};
use tasmo_core::{DeviceFleet, MonitorPhase, PowerControl};

use crate::cli::GlobalOpts;
use crate::commands::Settings;
use crate::error::CliError;
use crate::output::{self, StatusListing, StatusRow};

use super::util;

pub(super) fn build_client(settings: &Settings) -> Result<TasmotaClient, CliError> {
    Ok(TasmotaClient::new(&TransportConfig {
        timeout: settings.timeout,
    })?)
}

/// Query live power for one device or the whole registry.
pub async fn status(
    settings: &Settings,
    global: &GlobalOpts,
    name: Option<&str>,
    group: Option<&str>,
) -> Result<(), CliError> {
    let store = util::open_store(settings);
    let registry = store.registry();

    let targets: Vec<(String, String, String)> = match name {
        Some(name) => {
            let (group_name, device) = util::find_device(registry, name, group)?;
            vec![(group_name, device.name, device.address)]
        }
        None => {
            if let Some(group_name) = group {
                let matched = registry
                    .group(group_name)
                    .ok_or_else(|| CliError::GroupNotFound {
                        name: group_name.into(),
                    })?;
                matched
                    .devices
                    .iter()
                    .map(|d| (matched.name.clone(), d.name.clone(), d.address.clone()))
                    .collect()
            } else {
                registry
                    .iter_devices()
                    .map(|(g, d)| (g.name.clone(), d.name.clone(), d.address.clone()))
                    .collect()
            }
        }
    };

    if targets.is_empty() {
        if !global.quiet {
            eprintln!("No devices registered.");
        }
        return Ok(());
    }

    let client = build_client(settings)?;
    let listings: Vec<StatusListing> = join_all(targets.into_iter().map(
        |(group, name, address)| {
            let client = &client;
            async move {
                let power = PowerControl::query_power(client, &address)
                    .await
                    .map(|state| state.is_on());
                StatusListing {
                    group,
                    name,
                    address,
                    power,
                }
            }
        },
    ))
    .await;

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &listings,
        |l| StatusRow::new(l, color),
        |l| {
            let state = match l.power {
                Some(true) => "on",
                Some(false) => "off",
                None => "unknown",
            };
            format!("{} {state}", l.name)
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Toggle one device, confirming the resulting state with a poll.
pub async fn toggle(
    settings: &Settings,
    global: &GlobalOpts,
    name: &str,
    group: Option<&str>,
) -> Result<(), CliError> {
    let store = util::open_store(settings);
    let (_, device) = util::find_device(store.registry(), name, group)?;
    let address = device.address.clone();

    let fleet = DeviceFleet::new(Arc::new(build_client(settings)?));
    let device = Arc::new(device);
    fleet.attach(Arc::clone(&device)).await;

    let snapshot = fleet.snapshot(device.id).await;
    if snapshot.is_none_or(|s| s.phase != MonitorPhase::Ready) {
        return Err(CliError::DeviceUnreachable {
            name: name.into(),
            address,
        });
    }

    match fleet.toggle(device.id).await {
        Some(true) => {
            if !global.quiet {
                let on = fleet
                    .snapshot(device.id)
                    .await
                    .is_some_and(|s| s.displayed_on);
                let color = output::should_color(&global.color);
                eprintln!("{name} is now {}", output::power_label(Some(on), color));
            }
            Ok(())
        }
        _ => Err(CliError::ToggleFailed {
            name: name.into(),
            address,
        }),
    }
}

/// Print a device's web UI address.
pub fn web(settings: &Settings, name: &str, group: Option<&str>) -> Result<(), CliError> {
    let store = util::open_store(settings);
    let (_, device) = util::find_device(store.registry(), name, group)?;

    let url = web_ui_url(&device.address).map_err(|_| CliError::InvalidAddress {
        address: device.address.clone(),
    })?;
    println!("{url}");
    Ok(())
}
