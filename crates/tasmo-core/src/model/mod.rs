// ── Domain model ──

mod device;
mod registry;

pub use device::{Device, DeviceGroup, DeviceId};
pub use registry::Registry;
