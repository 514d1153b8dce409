// ── Device identity and grouping ──
//
// DeviceId is the identity anchor: equality and hashing for Device are
// id-only, so a record survives name and address edits. Ids are never
// persisted -- the registry document keys devices by name, and fresh ids
// are minted on every load.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── DeviceId ────────────────────────────────────────────────────────

/// Opaque unique identifier for a device record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(Uuid);

impl DeviceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Device ──────────────────────────────────────────────────────────

/// A registered smart-plug device.
///
/// `name` is the sort key and the persisted document key; `address` is a
/// host or host:port on the local network. Two `Device`s are the same
/// record iff their ids match -- name and address carry no identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub address: String,
}

impl Device {
    /// Create a device with a fresh id.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: DeviceId::new(),
            name: name.into(),
            address: address.into(),
        }
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Device {}

impl Hash for Device {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ── DeviceGroup ─────────────────────────────────────────────────────

/// A named collection of devices (a room or category).
///
/// The device list is kept sorted by name (case-sensitive ordinal) after
/// every mutation; `Registry` enforces that an emptied group is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub name: String,
    pub devices: Vec<Device>,
}

impl DeviceGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            devices: Vec::new(),
        }
    }

    /// Restore the by-name ordering after a mutation.
    pub(crate) fn sort_devices(&mut self) {
        self.devices.sort_by(|a, b| a.name.cmp(&b.name));
    }
}
