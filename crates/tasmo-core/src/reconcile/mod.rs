// ── Device-state reconciliation ──
//
// Coordinates optimistic user toggles with poll-driven ground truth.
// Each displayed device gets a `DeviceMonitor` state machine; the
// `DeviceFleet` is the explicit collection of active monitors that the
// `PollScheduler` drives on a fixed cadence.
//
// Remote failures never surface as errors here. The `PowerControl` seam
// collapses every transport problem into "state unknown" / "toggle not
// delivered", and the monitors degrade accordingly: a control stays
// disabled until a baseline exists, and a failed toggle reverts.

mod fleet;
mod monitor;
mod scheduler;

pub use fleet::DeviceFleet;
pub use monitor::{DeviceMonitor, MonitorEvent, MonitorPhase, MonitorSnapshot, ToggleOrigin};
pub use scheduler::{DEFAULT_POLL_INTERVAL, PollScheduler};

use std::future::Future;

use tracing::warn;

use tasmo_api::{PowerState, TasmotaClient};

/// Seam between the reconciler and the device protocol.
///
/// Implementations must not fail: `None` / `false` are the only error
/// signals, and callers treat them as "leave state alone" / "revert".
pub trait PowerControl: Send + Sync {
    /// Current relay state, or `None` when the device cannot be read
    /// (unreachable, non-200, malformed body).
    fn query_power(&self, address: &str) -> impl Future<Output = Option<PowerState>> + Send;

    /// Fire a toggle. `true` means delivered (HTTP 200), nothing more --
    /// the resulting relay value must be learned by a follow-up query.
    fn toggle_power(&self, address: &str) -> impl Future<Output = bool> + Send;
}

impl PowerControl for TasmotaClient {
    async fn query_power(&self, address: &str) -> Option<PowerState> {
        match TasmotaClient::query_power(self, address).await {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(address, error = %e, "power query failed");
                None
            }
        }
    }

    async fn toggle_power(&self, address: &str) -> bool {
        match TasmotaClient::toggle_power(self, address).await {
            Ok(()) => true,
            Err(e) => {
                warn!(address, error = %e, "power toggle failed");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted `PowerControl` fakes shared by the reconciler tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tasmo_api::PowerState;

    use super::PowerControl;

    /// Replays scripted responses; falls back to the last entry when the
    /// script runs dry so long-running tests stay deterministic.
    #[derive(Default)]
    pub(crate) struct ScriptedControl {
        queries: Mutex<VecDeque<Option<PowerState>>>,
        toggles: Mutex<VecDeque<bool>>,
        pub(crate) query_calls: AtomicUsize,
        pub(crate) toggle_calls: AtomicUsize,
    }

    impl ScriptedControl {
        pub(crate) fn new(
            queries: impl IntoIterator<Item = Option<PowerState>>,
            toggles: impl IntoIterator<Item = bool>,
        ) -> Self {
            Self {
                queries: Mutex::new(queries.into_iter().collect()),
                toggles: Mutex::new(toggles.into_iter().collect()),
                query_calls: AtomicUsize::new(0),
                toggle_calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn queries_made(&self) -> usize {
            self.query_calls.load(Ordering::SeqCst)
        }

        pub(crate) fn toggles_made(&self) -> usize {
            self.toggle_calls.load(Ordering::SeqCst)
        }
    }

    impl PowerControl for ScriptedControl {
        async fn query_power(&self, _address: &str) -> Option<PowerState> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            let mut queries = self.queries.lock().expect("lock poisoned");
            if queries.len() > 1 {
                queries.pop_front().flatten()
            } else {
                queries.front().copied().flatten()
            }
        }

        async fn toggle_power(&self, _address: &str) -> bool {
            self.toggle_calls.fetch_add(1, Ordering::SeqCst);
            let mut toggles = self.toggles.lock().expect("lock poisoned");
            if toggles.len() > 1 {
                toggles.pop_front().unwrap_or(false)
            } else {
                toggles.front().copied().unwrap_or(false)
            }
        }
    }
}
