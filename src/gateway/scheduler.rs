//! Timer-driven inventory sync.

use super::guard::{SchedulerGuard, Skip};
use super::pipeline::Pipeline;
use super::Gateway;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

impl Gateway {
    /// Background task: try to start a sync on every tick.
    ///
    /// Each run is spawned with its permit so the timer keeps ticking (and
    /// skipping) while a slow run is in flight.
    pub(super) async fn scheduler_loop(pipeline: Arc<Pipeline>, guard: SchedulerGuard, tick: Duration) {
        info!("scheduler: ticking every {}s", tick.as_secs());
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let permit = match guard.try_acquire(Instant::now().into_std()) {
                Ok(permit) => permit,
                Err(Skip::Running) => {
                    debug!("scheduler: previous sync still running, skipping tick");
                    continue;
                }
                Err(Skip::TooSoon { remaining }) => {
                    debug!(
                        "scheduler: last sync too recent, next in {}s",
                        remaining.as_secs()
                    );
                    continue;
                }
            };

            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                let _permit = permit;
                pipeline.run_scheduled().await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::broadcast::Broadcaster;
    use crate::gateway::testing::{RecordingChannel, StubSource};
    use invbot_inventory::{filter::AcceptAll, Formatter, NoHighlight};
    use invbot_memory::{SnapshotStore, SubscriberStore};

    // The stub source is empty, so every run fails fast without touching disk.
    fn failing_pipeline(dir: &std::path::Path, source: Arc<StubSource>) -> Arc<Pipeline> {
        Arc::new(Pipeline {
            source,
            snapshots: SnapshotStore::new(dir.join("inventory.json")),
            subscribers: SubscriberStore::new(dir.join("members.json")),
            broadcaster: Broadcaster::new(Arc::new(RecordingChannel::default()), Duration::ZERO),
            formatter: Arc::new(Formatter::new(Box::new(NoHighlight), "TL", "u", 10)),
            filter: Box::new(AcceptAll),
            admins: Vec::new(),
            fetch_timeout: Duration::from_secs(30),
            alert_on_failure: false,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_spacing_thins_out_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(StubSource::default());
        let pipeline = failing_pipeline(dir.path(), source.clone());
        let guard = SchedulerGuard::new(Duration::from_secs(240));

        // Ticks every 60s for just under ten minutes: runs start at 0, 240 and 480.
        let _ = tokio::time::timeout(
            Duration::from_secs(599),
            Gateway::scheduler_loop(pipeline, guard.clone(), Duration::from_secs(60)),
        )
        .await;

        assert_eq!(source.timeouts().await.len(), 3);
        assert!(!guard.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_run_skips_overlapping_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(StubSource::slow(Duration::from_secs(150)));
        let pipeline = failing_pipeline(dir.path(), source.clone());
        let guard = SchedulerGuard::new(Duration::ZERO);

        // Ten ticks (0..=540s); each run holds the permit for 150s, so the two
        // ticks after every start find it busy. Runs start at 0, 180, 360, 540.
        let _ = tokio::time::timeout(
            Duration::from_secs(599),
            Gateway::scheduler_loop(pipeline, guard.clone(), Duration::from_secs(60)),
        )
        .await;

        assert_eq!(source.timeouts().await.len(), 4);
        assert_eq!(source.peak_in_flight(), 1);
        // The run started at 540s is still in flight.
        assert!(guard.is_running());
        assert!(matches!(
            guard.try_acquire(tokio::time::Instant::now().into_std()),
            Err(Skip::Running)
        ));
    }
}
