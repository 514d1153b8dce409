// ── Poll cadence driver ──
//
// Owns the background task that calls `DeviceFleet::refresh_all` on a
// fixed interval. Explicit start/stop; stopping cancels the task and
// waits for it, so no poll pass outlives the scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::PowerControl;
use super::fleet::DeviceFleet;

/// Default cadence for background polling.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(8);

/// Drives periodic fleet refreshes while running.
pub struct PollScheduler<C: PowerControl + 'static> {
    fleet: Arc<DeviceFleet<C>>,
    interval: Duration,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl<C: PowerControl + 'static> PollScheduler<C> {
    pub fn new(fleet: Arc<DeviceFleet<C>>, interval: Duration) -> Self {
        Self {
            fleet,
            interval,
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start polling: one immediate pass, then one per interval.
    /// Starting an already-running scheduler does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        self.cancel = CancellationToken::new();
        let fleet = Arc::clone(&self.fleet);
        let cancel = self.cancel.clone();
        let period = self.interval;

        self.handle = Some(tokio::spawn(async move {
            info!(period = ?period, "poll scheduler started");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => fleet.refresh_all().await,
                }
            }
            debug!("poll scheduler stopped");
        }));
    }

    /// Stop polling and wait for the in-flight pass, if any, to finish.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl<C: PowerControl + 'static> Drop for PollScheduler<C> {
    fn drop(&mut self) {
        // Best effort; `stop` is the orderly path.
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tasmo_api::PowerState;

    use super::super::testing::ScriptedControl;
    use super::*;
    use crate::model::Device;

    fn ready_fleet() -> Arc<DeviceFleet<ScriptedControl>> {
        Arc::new(DeviceFleet::new(Arc::new(ScriptedControl::new(
            [Some(PowerState::On)],
            [],
        ))))
    }

    #[tokio::test(start_paused = true)]
    async fn polls_immediately_and_then_on_cadence() {
        let fleet = ready_fleet();
        fleet.attach(Arc::new(Device::new("lamp", "192.168.1.50"))).await;
        let baseline = 1;

        let mut scheduler = PollScheduler::new(Arc::clone(&fleet), Duration::from_secs(8));
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        let after_start = fleet.control().queries_made();
        assert!(after_start >= baseline + 1, "immediate pass ran");

        tokio::time::sleep(Duration::from_secs(17)).await;
        assert!(
            fleet.control().queries_made() >= after_start + 2,
            "two more cadence passes ran"
        );

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_polling() {
        let fleet = ready_fleet();
        fleet.attach(Arc::new(Device::new("lamp", "192.168.1.50"))).await;

        let mut scheduler = PollScheduler::new(Arc::clone(&fleet), Duration::from_secs(8));
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop().await;
        assert!(!scheduler.is_running());

        let at_stop = fleet.control().queries_made();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(fleet.control().queries_made(), at_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_keeps_one_task() {
        let fleet = ready_fleet();
        fleet.attach(Arc::new(Device::new("lamp", "192.168.1.50"))).await;

        let mut scheduler = PollScheduler::new(Arc::clone(&fleet), Duration::from_secs(8));
        scheduler.start();
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        let after_start = fleet.control().queries_made();
        tokio::time::sleep(Duration::from_secs(8)).await;
        // One cadence pass, not two.
        assert_eq!(fleet.control().queries_made(), after_start + 1);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_works() {
        let fleet = ready_fleet();
        fleet.attach(Arc::new(Device::new("lamp", "192.168.1.50"))).await;

        let mut scheduler = PollScheduler::new(Arc::clone(&fleet), Duration::from_secs(8));
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop().await;

        let at_stop = fleet.control().queries_made();
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(fleet.control().queries_made() > at_stop);
        scheduler.stop().await;
    }
}
