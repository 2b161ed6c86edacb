//! Background tick scheduler.
//!
//! Drives a [`FleetMonitor`] on a fixed interval from a single tokio task and
//! publishes an immutable [`FleetSnapshot`] after every tick and every write.
//!
//! ## Usage
//!
//! ```no_run
//! use harbor_config::HarborConfig;
//! use harbor_sim::{FleetMonitor, TickScheduler};
//!
//! #[tokio::main]
//! async fn main() -> harbor_core::Result<()> {
//!     let config = HarborConfig::load()?;
//!     let scheduler = TickScheduler::from_config(&config.simulation);
//!     let handle = scheduler.start(FleetMonitor::new(config)?);
//!
//!     let mut snapshots = handle.subscribe();
//!     while snapshots.changed().await.is_ok() {
//!         let snapshot = snapshots.borrow().clone();
//!         println!("tick {}: {}", snapshot.tick, snapshot.summary.format_compact());
//!     }
//!
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use harbor_config::SimulationConfig;
use harbor_core::{HarborError, Result};
use tokio::sync::{Mutex, broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::monitor::{FleetMonitor, FleetSnapshot, TickReport};

/// Tick reports buffered per subscriber before the oldest are dropped.
const REPORT_BUFFER: usize = 64;

/// Fixed-interval driver for a [`FleetMonitor`].
#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    interval: Duration,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.tick_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the tick task. Must be called from within a tokio runtime.
    ///
    /// The first tick fires one interval after this call. Ticks that fall
    /// behind are skipped rather than run back to back.
    pub fn start(self, monitor: FleetMonitor) -> SchedulerHandle {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "starting tick scheduler"
        );

        let (snapshot_tx, _) = watch::channel(Arc::new(monitor.snapshot()));
        let (report_tx, _) = broadcast::channel(REPORT_BUFFER);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let monitor = Arc::new(Mutex::new(monitor));

        let task = tokio::spawn(run_loop(
            self.interval,
            Arc::clone(&monitor),
            snapshot_tx.clone(),
            report_tx.clone(),
            shutdown_rx,
        ));

        SchedulerHandle {
            monitor,
            snapshots: snapshot_tx,
            reports: report_tx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

async fn run_loop(
    period: Duration,
    monitor: Arc<Mutex<FleetMonitor>>,
    snapshots: watch::Sender<Arc<FleetSnapshot>>,
    reports: broadcast::Sender<TickReport>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("tick scheduler received shutdown");
                break;
            }
            _ = ticker.tick() => {
                let (report, snapshot) = {
                    let mut monitor = monitor.lock().await;
                    let report = monitor.tick();
                    let expired = monitor.expire_notifications(Utc::now());
                    if expired > 0 {
                        debug!(expired, "notifications expired");
                    }
                    (report, Arc::new(monitor.snapshot()))
                };
                snapshots.send_replace(snapshot);
                // No subscribers is fine.
                let _ = reports.send(report);
            }
        }
    }
}

/// Handle to a running scheduler.
///
/// Dropping the handle aborts the tick task.
#[derive(Debug)]
pub struct SchedulerHandle {
    monitor: Arc<Mutex<FleetMonitor>>,
    snapshots: watch::Sender<Arc<FleetSnapshot>>,
    reports: broadcast::Sender<TickReport>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<FleetSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<FleetSnapshot>> {
        self.snapshots.subscribe()
    }

    /// Receiver for per-tick reports.
    pub fn reports(&self) -> broadcast::Receiver<TickReport> {
        self.reports.subscribe()
    }

    /// Apply a write to the monitor between ticks and publish the result.
    pub async fn update<T>(&self, f: impl FnOnce(&mut FleetMonitor) -> T) -> T {
        let (out, snapshot) = {
            let mut monitor = self.monitor.lock().await;
            let out = f(&mut *monitor);
            (out, Arc::new(monitor.snapshot()))
        };
        self.snapshots.send_replace(snapshot);
        out
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop ticking, wait for the task to exit and return the final snapshot.
    pub async fn shutdown(mut self) -> Result<Arc<FleetSnapshot>> {
        if let Some(tx) = self.shutdown.take() {
            // The task may already be gone.
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| HarborError::internal(format!("tick task failed: {e}")))?;
        }
        info!("tick scheduler stopped");
        Ok(self.snapshot())
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_config::HarborConfig;
    use harbor_core::rule::{HealthThreshold, RuleCondition, RuleDefinition, RuleTarget};

    fn monitor() -> FleetMonitor {
        harbor_core::logging::init_test_logging();
        let mut config = HarborConfig::default();
        config.simulation.seed = Some(5);
        FleetMonitor::new(config).unwrap()
    }

    #[test]
    fn test_from_config() {
        let scheduler = TickScheduler::from_config(&SimulationConfig::default());
        assert_eq!(scheduler.interval(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let handle = TickScheduler::new(Duration::from_secs(2)).start(monitor());
        assert_eq!(handle.snapshot().tick, 0);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(handle.snapshot().tick, 0);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(handle.snapshot().tick, 3);
        assert!(handle.is_running());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_ticks() {
        let handle = TickScheduler::new(Duration::from_secs(2)).start(monitor());
        let rx = handle.subscribe();

        tokio::time::sleep(Duration::from_millis(4500)).await;
        let last = handle.shutdown().await.unwrap();
        assert_eq!(last.tick, 2);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(rx.borrow().tick, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_publishes_immediately() {
        let handle = TickScheduler::new(Duration::from_secs(2)).start(monitor());
        let mut rx = handle.subscribe();

        let rule = handle
            .update(|m| {
                m.create_alert_rule(RuleDefinition::new(
                    RuleTarget::All,
                    RuleCondition::Health {
                        threshold: HealthThreshold::Error,
                    },
                )).unwrap()
            })
            .await;

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.rules.len(), 1);
        assert_eq!(snapshot.rules[0].id, rule.id);
        assert_eq!(snapshot.tick, 0);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_follow_ticks() {
        let handle = TickScheduler::new(Duration::from_millis(500)).start(monitor());
        let mut reports = handle.reports();

        let first = reports.recv().await.unwrap();
        let second = reports.recv().await.unwrap();
        assert_eq!(first.tick, 1);
        assert_eq!(second.tick, 2);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_task() {
        let handle = TickScheduler::new(Duration::from_secs(1)).start(monitor());
        let rx = handle.subscribe();
        drop(handle);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.borrow().tick, 0);
    }
}
