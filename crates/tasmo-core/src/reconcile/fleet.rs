// ── Active monitor collection ──
//
// One `DeviceMonitor` per attached device, keyed by id. Attach/detach
// follow the registry's display set; the scheduler calls `refresh_all`
// on its cadence. Each monitor sits behind its own async mutex so a
// user toggle and a background poll for the same device serialize,
// while different devices proceed concurrently.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::future::join_all;
use tokio::sync::{Mutex, broadcast, watch};
use tracing::debug;

use crate::model::{Device, DeviceId};

use super::monitor::{DeviceMonitor, MonitorEvent, MonitorSnapshot, ToggleOrigin};
use super::PowerControl;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The set of devices currently being monitored and controlled.
pub struct DeviceFleet<C: PowerControl> {
    client: Arc<C>,
    monitors: DashMap<DeviceId, Arc<Mutex<DeviceMonitor>>>,
    events: broadcast::Sender<MonitorEvent>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl<C: PowerControl> DeviceFleet<C> {
    pub fn new(client: Arc<C>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (last_refresh, _) = watch::channel(None);
        Self {
            client,
            monitors: DashMap::new(),
            events,
            last_refresh,
        }
    }

    /// Subscribe to per-device state-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    /// When the last full refresh pass completed.
    pub fn last_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Start monitoring a device: create its monitor and run the initial
    /// load to establish a baseline. Re-attaching an already-attached
    /// device restarts the load, which is how a degraded device gets
    /// another chance.
    pub async fn attach(&self, device: Arc<Device>) {
        let monitor = Arc::new(Mutex::new(DeviceMonitor::new(
            Arc::clone(&device),
            self.events.clone(),
        )));
        self.monitors.insert(device.id, Arc::clone(&monitor));
        monitor.lock().await.load_initial(self.client.as_ref()).await;
    }

    /// Stop monitoring a device. An in-flight request for it finishes
    /// against the detached monitor and is then dropped with it.
    pub fn detach(&self, id: DeviceId) {
        if self.monitors.remove(&id).is_some() {
            debug!(%id, "monitor detached");
        }
    }

    /// Current snapshot of one attached device.
    pub async fn snapshot(&self, id: DeviceId) -> Option<MonitorSnapshot> {
        let monitor = self.monitor(id)?;
        let snapshot = monitor.lock().await.snapshot();
        Some(snapshot)
    }

    /// User toggle of one device. Returns `Some(true)` when the toggle
    /// was delivered, `Some(false)` when refused or failed, `None` for
    /// an unattached id.
    pub async fn toggle(&self, id: DeviceId) -> Option<bool> {
        let monitor = self.monitor(id)?;
        let delivered = monitor.lock().await.toggle(self.client.as_ref()).await;
        Some(delivered)
    }

    /// Route a displayed-state write to one device's monitor.
    pub async fn set_displayed(&self, id: DeviceId, on: bool, origin: ToggleOrigin) {
        if let Some(monitor) = self.monitor(id) {
            monitor
                .lock()
                .await
                .set_displayed(on, origin, self.client.as_ref())
                .await;
        }
    }

    /// Poll every attached device concurrently, then stamp the refresh
    /// time. Degraded monitors skip their poll internally.
    pub async fn refresh_all(&self) {
        let monitors: Vec<Arc<Mutex<DeviceMonitor>>> = self
            .monitors
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        join_all(monitors.iter().map(|monitor| async {
            monitor.lock().await.poll(self.client.as_ref()).await;
        }))
        .await;

        self.last_refresh.send_replace(Some(Utc::now()));
    }

    #[cfg(test)]
    pub(crate) fn control(&self) -> &C {
        &self.client
    }

    fn monitor(&self, id: DeviceId) -> Option<Arc<Mutex<DeviceMonitor>>> {
        // Clone the Arc out so the map shard lock is not held across awaits.
        self.monitors.get(&id).map(|entry| Arc::clone(entry.value()))
    }
}
