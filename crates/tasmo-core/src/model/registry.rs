// ── In-memory registry with sort invariants ──
//
// Pure data operations; persistence and change notification live in
// `store::RegistryStore`. Invariants held after every mutation:
// groups sorted by name, each group's devices sorted by name, and no
// empty groups.

use serde::Serialize;

use super::{Device, DeviceGroup, DeviceId};

/// The full collection of device groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Registry {
    groups: Vec<DeviceGroup>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from arbitrary groups, establishing the sort
    /// invariants and dropping empty groups. Used by the document codec.
    pub(crate) fn from_groups(groups: Vec<DeviceGroup>) -> Self {
        let mut groups: Vec<DeviceGroup> =
            groups.into_iter().filter(|g| !g.devices.is_empty()).collect();
        for group in &mut groups {
            group.sort_devices();
        }
        let mut registry = Self { groups };
        registry.sort_groups();
        registry
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn groups(&self) -> &[DeviceGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn device_count(&self) -> usize {
        self.groups.iter().map(|g| g.devices.len()).sum()
    }

    /// All devices paired with their owning group, in display order.
    pub fn iter_devices(&self) -> impl Iterator<Item = (&DeviceGroup, &Device)> {
        self.groups
            .iter()
            .flat_map(|g| g.devices.iter().map(move |d| (g, d)))
    }

    /// Look up a group by exact (case-sensitive) name.
    pub fn group(&self, name: &str) -> Option<&DeviceGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Locate a device by id, with its owning group.
    pub fn find_device(&self, id: DeviceId) -> Option<(&DeviceGroup, &Device)> {
        self.iter_devices().find(|(_, d)| d.id == id)
    }

    /// First device matching `name` in display order, optionally scoped
    /// to one group. Names are not unique; callers wanting a specific
    /// record should scope by group.
    pub fn find_device_by_name(
        &self,
        name: &str,
        group: Option<&str>,
    ) -> Option<(&DeviceGroup, &Device)> {
        self.iter_devices()
            .filter(|(g, _)| group.is_none_or(|wanted| g.name == wanted))
            .find(|(_, d)| d.name == name)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Add a device to the named group, creating the group if no exact
    /// name match exists.
    pub fn add_device(&mut self, device: Device, group_name: &str) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.name == group_name) {
            group.devices.push(device);
            group.sort_devices();
        } else {
            let mut group = DeviceGroup::new(group_name);
            group.devices.push(device);
            self.groups.push(group);
            self.sort_groups();
        }
    }

    /// Replace the device carrying `old_id` with `new_device`'s fields,
    /// possibly moving it to another group.
    ///
    /// The stored record keeps `old_id` -- the id is the join key, not
    /// name or address. An unknown id is a no-op.
    pub fn edit_device(&mut self, old_id: DeviceId, new_device: Device, new_group_name: &str) {
        let Some(group_idx) = self
            .groups
            .iter()
            .position(|g| g.devices.iter().any(|d| d.id == old_id))
        else {
            return;
        };

        let replacement = Device {
            id: old_id,
            name: new_device.name,
            address: new_device.address,
        };

        if self.groups[group_idx].name == new_group_name {
            let group = &mut self.groups[group_idx];
            if let Some(device) = group.devices.iter_mut().find(|d| d.id == old_id) {
                *device = replacement;
            }
            group.sort_devices();
        } else {
            let old_group_name = self.groups[group_idx].name.clone();
            self.delete_device(old_id, &old_group_name);
            self.add_device(replacement, new_group_name);
        }
    }

    /// Remove every device with this id from the named group; the group
    /// itself is removed if that empties it.
    pub fn delete_device(&mut self, id: DeviceId, group_name: &str) {
        if let Some(idx) = self.groups.iter().position(|g| g.name == group_name) {
            self.groups[idx].devices.retain(|d| d.id != id);
            if self.groups[idx].devices.is_empty() {
                self.groups.remove(idx);
            }
        }
    }

    fn sort_groups(&mut self) {
        self.groups.sort_by(|a, b| a.name.cmp(&b.name));
    }
}
