//! Shared helpers for command handlers.

use tasmo_core::{Device, Registry, RegistryStore};

use crate::commands::Settings;
use crate::error::CliError;

/// Open the registry store at the configured path.
pub fn open_store(settings: &Settings) -> RegistryStore {
    RegistryStore::open(&settings.registry_path)
}

/// Look up a device by name, optionally scoped to a group. Returns the
/// owning group's name and a clone of the device record.
pub fn find_device(
    registry: &Registry,
    name: &str,
    group: Option<&str>,
) -> Result<(String, Device), CliError> {
    if let Some(group_name) = group {
        if registry.group(group_name).is_none() {
            return Err(CliError::GroupNotFound {
                name: group_name.into(),
            });
        }
    }

    registry
        .find_device_by_name(name, group)
        .map(|(g, d)| (g.name.clone(), d.clone()))
        .ok_or_else(|| CliError::DeviceNotFound {
            name: name.into(),
            group: group.map(Into::into),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
