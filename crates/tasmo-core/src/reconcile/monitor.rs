// ── Per-device state machine ──
//
// Loading → Ready (baseline established, control interactive)
//         → Degraded (initial read failed, control stays disabled)
//
// `busy` is an orthogonal in-flight flag, not a phase. A device whose
// true state is unknown is never controllable: toggling it blind could
// land the relay in an unintended state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

use crate::model::Device;

use super::PowerControl;

/// How long to wait after a delivered toggle before polling for the
/// resulting relay value. Delivery success confirms nothing else.
const TOGGLE_CONFIRM_DELAY: Duration = Duration::from_millis(500);

/// Lifecycle phase of a monitored device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    /// Initial query still in flight.
    Loading,
    /// Baseline established; the control is interactive.
    Ready,
    /// Initial query failed. The control stays disabled; a fresh attach
    /// retries the load.
    Degraded,
}

/// Who asked for a displayed-state change.
///
/// Only `User` writes reach the device. `System` writes carry poll
/// results and initial loads into the displayed state without
/// re-triggering a remote toggle -- the explicit tag replaces the
/// timing-based suppression flag a UI binding would otherwise need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOrigin {
    User,
    System,
}

/// Point-in-time view of a monitor, published after every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSnapshot {
    pub phase: MonitorPhase,
    /// What the user sees and can flip.
    pub displayed_on: bool,
    /// Last confirmed remote state.
    pub observed_on: bool,
    /// Request in flight for this device.
    pub busy: bool,
}

impl MonitorSnapshot {
    /// Whether the toggle control should accept input right now.
    pub fn interactive(self) -> bool {
        self.phase == MonitorPhase::Ready && !self.busy
    }
}

/// State-change notification for one device.
#[derive(Debug, Clone)]
pub struct MonitorEvent {
    pub device: Arc<Device>,
    pub snapshot: MonitorSnapshot,
}

/// Per-device reconciliation state machine.
///
/// All methods take `&mut self`; the fleet serializes access behind a
/// per-device lock, so a toggle and a poll never interleave for the same
/// device.
pub struct DeviceMonitor {
    device: Arc<Device>,
    phase: MonitorPhase,
    observed_on: bool,
    displayed_on: bool,
    busy: bool,
    events: broadcast::Sender<MonitorEvent>,
}

impl DeviceMonitor {
    pub(crate) fn new(device: Arc<Device>, events: broadcast::Sender<MonitorEvent>) -> Self {
        Self {
            device,
            phase: MonitorPhase::Loading,
            observed_on: false,
            displayed_on: false,
            busy: false,
            events,
        }
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            phase: self.phase,
            displayed_on: self.displayed_on,
            observed_on: self.observed_on,
            busy: self.busy,
        }
    }

    /// Initial load: establish the baseline from a first query.
    ///
    /// Success seeds both observed and displayed state and unlocks the
    /// control. Failure leaves the monitor `Degraded` -- and the control
    /// disabled -- rather than guessing at a state.
    pub async fn load_initial<C: PowerControl>(&mut self, client: &C) {
        self.phase = MonitorPhase::Loading;
        self.busy = true;
        self.publish();

        match client.query_power(&self.device.address).await {
            Some(state) => {
                self.observed_on = state.is_on();
                self.displayed_on = state.is_on();
                self.phase = MonitorPhase::Ready;
                debug!(device = %self.device.name, on = state.is_on(), "baseline established");
            }
            None => {
                self.phase = MonitorPhase::Degraded;
                debug!(device = %self.device.name, "baseline unavailable; control disabled");
            }
        }

        self.busy = false;
        self.publish();
    }

    /// Entry point for displayed-state changes.
    ///
    /// `System` writes only update what is shown. `User` writes run the
    /// optimistic toggle flow, and are ignored unless the monitor is
    /// `Ready` and idle.
    pub async fn set_displayed<C: PowerControl>(
        &mut self,
        on: bool,
        origin: ToggleOrigin,
        client: &C,
    ) {
        match origin {
            ToggleOrigin::System => {
                self.displayed_on = on;
                self.publish();
            }
            ToggleOrigin::User => {
                if on != self.displayed_on {
                    self.toggle(client).await;
                }
            }
        }
    }

    /// User toggle: optimistic flip, fire the toggle, then confirm with
    /// a poll. Returns whether the toggle was initiated and delivered.
    ///
    /// A failed delivery reverts the displayed state and never touches
    /// `observed_on`. No toggle is initiated without a baseline.
    pub async fn toggle<C: PowerControl>(&mut self, client: &C) -> bool {
        if self.phase != MonitorPhase::Ready || self.busy {
            return false;
        }

        let previous = self.displayed_on;
        self.displayed_on = !previous;
        self.busy = true;
        self.publish();

        if client.toggle_power(&self.device.address).await {
            self.busy = false;
            self.publish();
            // Delivery confirmed, value unknown: give the relay a moment,
            // then learn the true state.
            tokio::time::sleep(TOGGLE_CONFIRM_DELAY).await;
            self.poll(client).await;
            true
        } else {
            self.displayed_on = previous;
            self.busy = false;
            self.publish();
            false
        }
    }

    /// Poll the device and fold the result into displayed state.
    ///
    /// Skipped without a baseline. An unreadable device keeps its last
    /// known state -- a dropped poll never demotes a `Ready` monitor.
    /// A result equal to the current observed state changes nothing and
    /// emits nothing.
    pub async fn poll<C: PowerControl>(&mut self, client: &C) {
        if self.phase != MonitorPhase::Ready {
            return;
        }

        let Some(state) = client.query_power(&self.device.address).await else {
            return;
        };

        if state.is_on() != self.observed_on {
            debug!(
                device = %self.device.name,
                was = self.observed_on,
                now = state.is_on(),
                "poll corrected state"
            );
            self.observed_on = state.is_on();
            // System-origin write: carries the correction to the display
            // without re-triggering a toggle.
            self.displayed_on = state.is_on();
            self.publish();
        }
    }

    fn publish(&self) {
        let _ = self.events.send(MonitorEvent {
            device: Arc::clone(&self.device),
            snapshot: self.snapshot(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tasmo_api::PowerState;
    use tokio::sync::broadcast;

    use super::super::testing::ScriptedControl;
    use super::*;

    fn monitor() -> (DeviceMonitor, broadcast::Receiver<MonitorEvent>) {
        let (tx, rx) = broadcast::channel(64);
        let device = Arc::new(Device::new("lamp", "192.168.1.50"));
        (DeviceMonitor::new(device, tx), rx)
    }

    fn drain(rx: &mut broadcast::Receiver<MonitorEvent>) -> Vec<MonitorSnapshot> {
        let mut snapshots = Vec::new();
        while let Ok(event) = rx.try_recv() {
            snapshots.push(event.snapshot);
        }
        snapshots
    }

    #[tokio::test]
    async fn initial_load_establishes_baseline() {
        let (mut monitor, _rx) = monitor();
        let client = ScriptedControl::new([Some(PowerState::On)], []);

        monitor.load_initial(&client).await;

        let snap = monitor.snapshot();
        assert_eq!(snap.phase, MonitorPhase::Ready);
        assert!(snap.displayed_on);
        assert!(snap.observed_on);
        assert!(snap.interactive());
    }

    #[tokio::test]
    async fn failed_initial_load_keeps_control_disabled() {
        let (mut monitor, _rx) = monitor();
        let client = ScriptedControl::new([None], []);

        monitor.load_initial(&client).await;

        let snap = monitor.snapshot();
        assert_eq!(snap.phase, MonitorPhase::Degraded);
        assert!(!snap.interactive());
    }

    #[tokio::test]
    async fn toggle_without_baseline_never_calls_the_device() {
        let (mut monitor, _rx) = monitor();
        let client = ScriptedControl::new([None], [true]);
        monitor.load_initial(&client).await;

        let delivered = monitor.toggle(&client).await;

        assert!(!delivered);
        assert_eq!(client.toggles_made(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_toggle_confirms_with_a_poll() {
        let (mut monitor, _rx) = monitor();
        // Baseline OFF, then the post-toggle confirmation reads ON.
        let client = ScriptedControl::new([Some(PowerState::Off), Some(PowerState::On)], [true]);
        monitor.load_initial(&client).await;

        let delivered = monitor.toggle(&client).await;

        assert!(delivered);
        assert_eq!(client.toggles_made(), 1);
        assert_eq!(client.queries_made(), 2, "baseline + confirmation poll");
        let snap = monitor.snapshot();
        assert!(snap.displayed_on);
        assert!(snap.observed_on, "confirmation poll updates observed state");
        assert!(!snap.busy);
    }

    #[tokio::test]
    async fn failed_toggle_reverts_and_skips_the_poll() {
        let (mut monitor, mut rx) = monitor();
        let client = ScriptedControl::new([Some(PowerState::Off)], [false]);
        monitor.load_initial(&client).await;
        drain(&mut rx);

        let delivered = monitor.toggle(&client).await;

        assert!(!delivered);
        let snap = monitor.snapshot();
        assert!(!snap.displayed_on, "optimistic flip reverted");
        assert!(!snap.observed_on, "observed state untouched");
        assert_eq!(client.queries_made(), 1, "no confirmation poll");

        // The optimistic flip and the revert were both published.
        let snapshots = drain(&mut rx);
        assert!(snapshots.first().is_some_and(|s| s.displayed_on && s.busy));
        assert!(snapshots.last().is_some_and(|s| !s.displayed_on && !s.busy));
    }

    #[tokio::test]
    async fn poll_with_equal_state_emits_nothing() {
        let (mut monitor, mut rx) = monitor();
        let client = ScriptedControl::new([Some(PowerState::On)], []);
        monitor.load_initial(&client).await;
        drain(&mut rx);

        monitor.poll(&client).await;

        let snap = monitor.snapshot();
        assert!(snap.displayed_on);
        assert!(drain(&mut rx).is_empty(), "no user-visible change");
    }

    #[tokio::test]
    async fn poll_folds_remote_change_into_display() {
        let (mut monitor, _rx) = monitor();
        // Baseline ON, later the wall switch turned it OFF.
        let client = ScriptedControl::new([Some(PowerState::On), Some(PowerState::Off)], []);
        monitor.load_initial(&client).await;

        monitor.poll(&client).await;

        let snap = monitor.snapshot();
        assert!(!snap.displayed_on);
        assert!(!snap.observed_on);
        assert_eq!(snap.phase, MonitorPhase::Ready);
    }

    #[tokio::test]
    async fn dropped_poll_leaves_state_alone() {
        let (mut monitor, _rx) = monitor();
        let client = ScriptedControl::new([Some(PowerState::On), None], []);
        monitor.load_initial(&client).await;

        monitor.poll(&client).await;

        let snap = monitor.snapshot();
        assert_eq!(snap.phase, MonitorPhase::Ready, "not demoted");
        assert!(snap.displayed_on);
    }

    #[tokio::test]
    async fn poll_on_degraded_monitor_is_skipped() {
        let (mut monitor, _rx) = monitor();
        let client = ScriptedControl::new([None], []);
        monitor.load_initial(&client).await;
        assert_eq!(client.queries_made(), 1);

        monitor.poll(&client).await;

        assert_eq!(client.queries_made(), 1, "degraded devices are not polled");
    }

    #[tokio::test]
    async fn system_writes_never_toggle_the_device() {
        let (mut monitor, _rx) = monitor();
        let client = ScriptedControl::new([Some(PowerState::Off)], [true]);
        monitor.load_initial(&client).await;

        monitor
            .set_displayed(true, ToggleOrigin::System, &client)
            .await;

        assert!(monitor.snapshot().displayed_on);
        assert_eq!(client.toggles_made(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn user_writes_run_the_toggle_flow() {
        let (mut monitor, _rx) = monitor();
        let client = ScriptedControl::new([Some(PowerState::Off), Some(PowerState::On)], [true]);
        monitor.load_initial(&client).await;

        monitor
            .set_displayed(true, ToggleOrigin::User, &client)
            .await;

        assert_eq!(client.toggles_made(), 1);
        assert!(monitor.snapshot().displayed_on);
    }

    #[tokio::test]
    async fn user_write_matching_display_is_a_noop() {
        let (mut monitor, _rx) = monitor();
        let client = ScriptedControl::new([Some(PowerState::On)], [true]);
        monitor.load_initial(&client).await;

        monitor
            .set_displayed(true, ToggleOrigin::User, &client)
            .await;

        assert_eq!(client.toggles_made(), 0);
    }
}
