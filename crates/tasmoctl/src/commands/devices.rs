//! Registry CRUD command handlers.

use tasmo_core::Device;

use crate::cli::GlobalOpts;
use crate::commands::Settings;
use crate::error::CliError;
use crate::output::{self, DeviceListing, DeviceRow};

use super::util;

pub fn list(settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    let store = util::open_store(settings);

    let listings: Vec<DeviceListing> = store
        .registry()
        .iter_devices()
        .map(|(group, device)| DeviceListing::new(group, device))
        .collect();

    if listings.is_empty() {
        if !global.quiet {
            eprintln!("No devices registered. Add one with: tasmoctl add <name> <address> -g <group>");
        }
        return Ok(());
    }

    let out = output::render_list(
        &global.output,
        &listings,
        |l| DeviceRow::from(l),
        |l| format!("{}/{}", l.group, l.name),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn add(
    settings: &Settings,
    global: &GlobalOpts,
    name: &str,
    address: &str,
    group: &str,
) -> Result<(), CliError> {
    validate_name(name, "name")?;
    validate_name(group, "group")?;
    if address.trim().is_empty() {
        return Err(CliError::Validation {
            field: "address".into(),
            reason: "must not be empty".into(),
        });
    }

    let mut store = util::open_store(settings);
    store.add_device(Device::new(name, address), group);

    if !global.quiet {
        eprintln!("Added '{name}' ({address}) to group '{group}'");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    settings: &Settings,
    global: &GlobalOpts,
    name: &str,
    group: &str,
    new_name: Option<String>,
    new_address: Option<String>,
    new_group: Option<String>,
) -> Result<(), CliError> {
    if new_name.is_none() && new_address.is_none() && new_group.is_none() {
        return Err(CliError::Validation {
            field: "edit".into(),
            reason: "pass at least one of --new-name, --new-address, --new-group".into(),
        });
    }

    let mut store = util::open_store(settings);
    let (_, device) = util::find_device(store.registry(), name, Some(group))?;

    let replacement = Device::new(
        new_name.unwrap_or_else(|| device.name.clone()),
        new_address.unwrap_or_else(|| device.address.clone()),
    );
    let target_group = new_group.unwrap_or_else(|| group.to_owned());

    store.edit_device(device.id, replacement, &target_group);

    if !global.quiet {
        eprintln!("Updated '{name}' in group '{group}'");
    }
    Ok(())
}

pub fn delete(
    settings: &Settings,
    global: &GlobalOpts,
    name: &str,
    group: &str,
) -> Result<(), CliError> {
    let mut store = util::open_store(settings);
    let (group_name, device) = util::find_device(store.registry(), name, Some(group))?;

    if !util::confirm(&format!("Delete '{name}' from '{group_name}'?"), global.yes)? {
        return Ok(());
    }

    store.delete_device(device.id, &group_name);

    if !global.quiet {
        eprintln!("Deleted '{name}' from group '{group_name}'");
    }
    Ok(())
}

fn validate_name(value: &str, field: &str) -> Result<(), CliError> {
    if value.trim().is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}
