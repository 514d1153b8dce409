// tasmo-core: registry, persistence, and device-state reconciliation
// between tasmo-api and consumers (CLI).

pub mod document;
pub mod model;
pub mod reconcile;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use document::DocumentError;
pub use model::{Device, DeviceGroup, DeviceId, Registry};
pub use reconcile::{
    DEFAULT_POLL_INTERVAL, DeviceFleet, DeviceMonitor, MonitorEvent, MonitorPhase, MonitorSnapshot,
    PollScheduler, PowerControl, ToggleOrigin,
};
pub use store::RegistryStore;
