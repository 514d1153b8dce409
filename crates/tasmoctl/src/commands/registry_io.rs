//! Bulk import/export of the registry document.

use std::io::Read;
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::commands::Settings;
use crate::error::CliError;

use super::util;

/// Replace the whole registry from a document. This is not a merge;
/// everything currently registered goes away.
pub fn import(
    settings: &Settings,
    global: &GlobalOpts,
    file: Option<&Path>,
) -> Result<(), CliError> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut store = util::open_store(settings);

    if !store.registry().is_empty() {
        let count = store.registry().device_count();
        if !util::confirm(
            &format!("Replace the current registry ({count} devices)?"),
            global.yes,
        )? {
            return Ok(());
        }
    }

    store.import(&text)?;

    if !global.quiet {
        eprintln!(
            "Imported {} devices in {} groups",
            store.registry().device_count(),
            store.registry().groups().len()
        );
    }
    Ok(())
}

/// Write the registry document to a file or stdout.
pub fn export(settings: &Settings, file: Option<&Path>) -> Result<(), CliError> {
    let store = util::open_store(settings);
    let document = store.export();

    match file {
        Some(path) => std::fs::write(path, document)?,
        None => println!("{document}"),
    }
    Ok(())
}
