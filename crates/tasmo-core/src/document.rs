// ── Bulk registry document codec ──
//
// The persisted format (and the paste-import format -- they are the same)
// maps group name → { device name → address }:
//
//   { "living_room": { "lamp": "192.168.1.50", "fan": "192.168.1.51" } }
//
// Ids are not persisted; fresh ones are minted on every parse.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{Device, DeviceGroup, Registry};

/// Wire shape of the document. `BTreeMap` keeps output key order stable.
type RawDocument = BTreeMap<String, BTreeMap<String, String>>;

/// Rejection of a bulk document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The text was not valid JSON, or its top level was not an object
    /// of string → (object of string → string).
    #[error("invalid registry document: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Parse a bulk document into a registry.
///
/// Devices are rebuilt with fresh ids; device lists and the group list
/// come out sorted by name. The input is validated strictly -- any value
/// that is not a string address fails the whole parse, and the caller's
/// current registry must be left untouched on failure.
pub fn parse(text: &str) -> Result<Registry, DocumentError> {
    let raw: RawDocument = serde_json::from_str(text)?;

    let groups = raw
        .into_iter()
        .map(|(name, devices)| {
            let mut group = DeviceGroup::new(name);
            group.devices = devices
                .into_iter()
                .map(|(device_name, address)| Device::new(device_name, address))
                .collect();
            group
        })
        .collect();

    Ok(Registry::from_groups(groups))
}

/// Serialize a registry to the persisted document format, pretty-printed.
///
/// Ids are dropped and regenerated on the next load. Same-named devices
/// within a group collide on the name key; the last one wins -- a known
/// limitation of the data shape, inherited from the document format.
pub fn serialize(registry: &Registry) -> String {
    let raw: RawDocument = registry
        .groups()
        .iter()
        .map(|group| {
            let devices = group
                .devices
                .iter()
                .map(|d| (d.name.clone(), d.address.clone()))
                .collect();
            (group.name.clone(), devices)
        })
        .collect();

    serde_json::to_string_pretty(&raw).expect("registry document serialization should not fail")
}
