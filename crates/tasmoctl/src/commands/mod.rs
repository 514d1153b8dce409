//! Command dispatch: bridges CLI args -> core operations -> output.

pub mod devices;
pub mod power;
pub mod registry_io;
pub mod util;
pub mod watch;

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Effective settings after merging config file and CLI flags.
pub struct Settings {
    pub registry_path: PathBuf,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::List => devices::list(settings, global),
        Command::Add {
            name,
            address,
            group,
        } => devices::add(settings, global, &name, &address, &group),
        Command::Edit {
            name,
            group,
            new_name,
            new_address,
            new_group,
        } => devices::edit(settings, global, &name, &group, new_name, new_address, new_group),
        Command::Delete { name, group } => devices::delete(settings, global, &name, &group),
        Command::Status { name, group } => {
            power::status(settings, global, name.as_deref(), group.as_deref()).await
        }
        Command::Toggle { name, group } => {
            power::toggle(settings, global, &name, group.as_deref()).await
        }
        Command::Import { file } => registry_io::import(settings, global, file.as_deref()),
        Command::Export { file } => registry_io::export(settings, file.as_deref()),
        Command::Watch { interval } => watch::run(settings, global, interval).await,
        Command::Web { name, group } => power::web(settings, &name, group.as_deref()),
    }
}
