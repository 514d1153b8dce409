// ── Persistent registry store ──
//
// Owns the in-memory Registry, persists it as a whole-document JSON file,
// and publishes a snapshot to subscribers after every mutation.
//
// Persistence is fail-soft in both directions: a missing or corrupt file
// yields an empty registry, and a failed write is logged without touching
// in-memory state. Writes always replace the whole document, so the file
// on disk is never a partial state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::document::{self, DocumentError};
use crate::model::{Device, DeviceId, Registry};

/// The registry plus its backing document.
///
/// Every CRUD mutation and import persists immediately. Poll results never
/// come through here -- observed power state is ephemeral reconciler state,
/// not registry data.
pub struct RegistryStore {
    registry: Registry,
    path: PathBuf,
    snapshot: watch::Sender<Arc<Registry>>,
}

impl RegistryStore {
    /// Open a store backed by `path`, loading the registry if the
    /// document exists. Absence or corruption means starting empty; this
    /// never fails.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let registry = load_document(&path);
        let (snapshot, _) = watch::channel(Arc::new(registry.clone()));
        Self {
            registry,
            path,
            snapshot,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subscribe to registry snapshots; a new one is published after
    /// every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Registry>> {
        self.snapshot.subscribe()
    }

    // ── Mutations (each persists immediately) ────────────────────────

    pub fn add_device(&mut self, device: Device, group_name: &str) {
        self.registry.add_device(device, group_name);
        self.commit();
    }

    /// Edit the device carrying `old_id`. An unknown id still ends in an
    /// unconditional save, matching the whole-document write discipline.
    pub fn edit_device(&mut self, old_id: DeviceId, new_device: Device, new_group_name: &str) {
        self.registry.edit_device(old_id, new_device, new_group_name);
        self.commit();
    }

    pub fn delete_device(&mut self, id: DeviceId, group_name: &str) {
        self.registry.delete_device(id, group_name);
        self.commit();
    }

    /// Replace the entire registry from a bulk document (not a merge).
    ///
    /// On parse failure the current registry is left untouched and the
    /// error is returned for the caller to surface.
    pub fn import(&mut self, text: &str) -> Result<(), DocumentError> {
        let registry = document::parse(text)?;
        self.registry = registry;
        self.commit();
        Ok(())
    }

    /// The current registry as a bulk document string.
    pub fn export(&self) -> String {
        document::serialize(&self.registry)
    }

    /// Write the whole document, overwriting the previous one. Fail-soft:
    /// an I/O error is logged and in-memory state stands.
    pub fn save(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), error = %e, "cannot create registry directory");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, document::serialize(&self.registry)) {
            warn!(path = %self.path.display(), error = %e, "failed to save registry");
        }
    }

    /// Persist and publish the current registry.
    fn commit(&mut self) {
        self.save();
        let registry = self.registry.clone();
        self.snapshot.send_modify(|snap| *snap = Arc::new(registry));
    }
}

/// Read and parse the document at `path`, degrading every failure to an
/// empty registry with a log line.
fn load_document(path: &Path) -> Registry {
    if !path.exists() {
        debug!(path = %path.display(), "no registry document; starting empty");
        return Registry::new();
    }

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read registry; starting empty");
            return Registry::new();
        }
    };

    match document::parse(&text) {
        Ok(registry) => {
            debug!(devices = registry.device_count(), "registry loaded");
            registry
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed registry document; starting empty");
            Registry::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, RegistryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::open(dir.path().join("devices.json"));
        (dir, store)
    }

    #[test]
    fn open_missing_file_starts_empty() {
        let (_dir, store) = temp_store();
        assert!(store.registry().is_empty());
        // Opening never creates the file by itself.
        assert!(!store.path().exists());
    }

    #[test]
    fn open_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        std::fs::write(&path, "{ definitely not json").unwrap();

        let store = RegistryStore::open(&path);
        assert!(store.registry().is_empty());
    }

    #[test]
    fn open_wrong_schema_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        std::fs::write(&path, r#"{"group": ["not", "a", "map"]}"#).unwrap();

        let store = RegistryStore::open(&path);
        assert!(store.registry().is_empty());
    }

    #[test]
    fn add_device_persists_and_reloads() {
        let (dir, mut store) = temp_store();
        store.add_device(Device::new("lamp", "192.168.1.50"), "living_room");

        let reopened = RegistryStore::open(dir.path().join("devices.json"));
        let group = reopened.registry().group("living_room").unwrap();
        assert_eq!(group.devices[0].name, "lamp");
        assert_eq!(group.devices[0].address, "192.168.1.50");
    }

    #[test]
    fn delete_last_device_persists_group_removal() {
        let (dir, mut store) = temp_store();
        store.add_device(Device::new("lamp", "192.168.1.50"), "living_room");
        let id = store.registry().iter_devices().next().unwrap().1.id;

        store.delete_device(id, "living_room");

        let reopened = RegistryStore::open(dir.path().join("devices.json"));
        assert!(reopened.registry().is_empty());
    }

    #[test]
    fn import_replaces_everything() {
        let (_dir, mut store) = temp_store();
        store.add_device(Device::new("old", "10.0.0.1"), "garage");

        store
            .import(r#"{"kitchen":{"bulb":"10.0.0.5"}}"#)
            .unwrap();

        assert!(store.registry().group("garage").is_none());
        let group = store.registry().group("kitchen").unwrap();
        assert_eq!(group.devices[0].name, "bulb");

        // And the persisted document matches exactly, modulo formatting.
        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        let expected: serde_json::Value =
            serde_json::from_str(r#"{"kitchen":{"bulb":"10.0.0.5"}}"#).unwrap();
        assert_eq!(on_disk, expected);
    }

    #[test]
    fn failed_import_leaves_registry_untouched() {
        let (_dir, mut store) = temp_store();
        store.add_device(Device::new("lamp", "10.0.0.1"), "garage");

        let result = store.import("{ broken");
        assert!(result.is_err());
        assert_eq!(store.registry().device_count(), 1);
        assert!(store.registry().group("garage").is_some());
    }

    #[test]
    fn subscribers_see_mutations() {
        let (_dir, mut store) = temp_store();
        let mut rx = store.subscribe();
        assert!(rx.borrow().is_empty());

        store.add_device(Device::new("lamp", "10.0.0.1"), "garage");

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().device_count(), 1);
    }
}
