//! One inventory sync cycle: fetch, persist, diff, notify.

use super::broadcast::{BroadcastReport, Broadcaster};
use chrono::Utc;
use invbot_core::{error::FetchError, message::OutgoingMessage, model::Snapshot};
use invbot_inventory::{
    diff, filter::RecordFilter, format::format_fetch_failure, Formatter, InventorySource,
};
use invbot_memory::{SnapshotStore, SubscriberStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What a successful cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No snapshot existed; the fetch was stored and admins were told.
    Initialized { vehicles: usize },
    /// Nothing new, or everything new was filtered out.
    Unchanged { detected: usize },
    /// Subscribers were notified.
    Notified {
        new: usize,
        price_changes: usize,
        report: BroadcastReport,
    },
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { vehicles } => write!(f, "initialized with {vehicles} vehicles"),
            Self::Unchanged { detected } => write!(f, "nothing to send ({detected} detected)"),
            Self::Notified {
                new,
                price_changes,
                report,
            } => write!(
                f,
                "{new} new, {price_changes} price changes, {} sent, {} failed",
                report.sent,
                report.failed.len()
            ),
        }
    }
}

/// Everything one cycle needs. Shared between the scheduler and the gateway.
pub struct Pipeline {
    pub(super) source: Arc<dyn InventorySource>,
    pub(super) snapshots: SnapshotStore,
    pub(super) subscribers: SubscriberStore,
    pub(super) broadcaster: Broadcaster,
    pub(super) formatter: Arc<Formatter>,
    pub(super) filter: Box<dyn RecordFilter>,
    pub(super) admins: Vec<i64>,
    pub(super) fetch_timeout: Duration,
    pub(super) alert_on_failure: bool,
}

impl Pipeline {
    /// Scheduled entry point: run a cycle and report a failure instead of returning it.
    pub async fn run_scheduled(&self) -> Option<CycleOutcome> {
        match self.run_cycle().await {
            Ok(outcome) => {
                debug!("pipeline: cycle finished: {outcome}");
                Some(outcome)
            }
            Err(e) => {
                error!("pipeline: cycle failed: {e}");
                if self.alert_on_failure {
                    let alert = OutgoingMessage::html(0, format_fetch_failure(&e));
                    self.broadcaster.broadcast(&alert, &self.admins).await;
                }
                None
            }
        }
    }

    /// Run one cycle.
    ///
    /// Only the fetch can fail the cycle. Store errors degrade: an unreadable
    /// snapshot counts as absent and a failed save is logged and skipped.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, FetchError> {
        let results = self.source.fetch(self.fetch_timeout).await?;

        let previous = match self.snapshots.load().await {
            Ok(previous) => previous,
            Err(e) => {
                warn!("pipeline: treating snapshot as absent: {e}");
                None
            }
        };

        let changes = diff(
            previous.as_ref().map_or(&[][..], |s| s.vehicles.as_slice()),
            &results.records,
        );

        let snapshot = Snapshot::capture(results.records, results.total_matches_found);
        if let Err(e) = self.snapshots.save(&snapshot).await {
            warn!("pipeline: snapshot not saved this cycle: {e}");
        }

        if previous.is_none() {
            let vehicles = snapshot.vehicles.len();
            info!("pipeline: first run, stored {vehicles} vehicles");
            let text = self.formatter.format_initialized(vehicles, Utc::now());
            self.broadcaster
                .broadcast(&OutgoingMessage::html(0, text), &self.admins)
                .await;
            return Ok(CycleOutcome::Initialized { vehicles });
        }

        let detected = changes.new.len() + changes.price_changes.len();
        let notify = changes.filtered(self.filter.as_ref());
        if notify.is_empty() {
            info!("pipeline: no notifiable changes ({detected} detected)");
            return Ok(CycleOutcome::Unchanged { detected });
        }

        let recipients = match self.subscribers.ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("pipeline: cannot read subscribers, nobody notified: {e}");
                Vec::new()
            }
        };

        info!(
            "pipeline: {} new, {} price changes -> {} subscribers",
            notify.new.len(),
            notify.price_changes.len(),
            recipients.len()
        );
        let text = self.formatter.format_changes(&notify, Utc::now());
        let report = self
            .broadcaster
            .broadcast(&OutgoingMessage::html(0, text), &recipients)
            .await;

        Ok(CycleOutcome::Notified {
            new: notify.new.len(),
            price_changes: notify.price_changes.len(),
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{record, RecordingChannel, StubSource};
    use invbot_core::model::Subscriber;
    use invbot_inventory::filter::{AcceptAll, PriceCeiling};
    use invbot_inventory::NoHighlight;

    const ADMIN: i64 = 100;

    struct Harness {
        _dir: tempfile::TempDir,
        source: Arc<StubSource>,
        channel: Arc<RecordingChannel>,
        snapshots: SnapshotStore,
        pipeline: Pipeline,
    }

    async fn harness(filter: Box<dyn RecordFilter>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(StubSource::default());
        let channel = Arc::new(RecordingChannel::failing_for(&[2]));
        let snapshots = SnapshotStore::new(dir.path().join("inventory.json"));
        let subscribers = SubscriberStore::new(dir.path().join("members.json"));
        for id in [1, 2, 3] {
            subscribers.register(Subscriber::new(id)).await.unwrap();
        }

        let pipeline = Pipeline {
            source: source.clone(),
            snapshots: snapshots.clone(),
            subscribers,
            broadcaster: Broadcaster::new(channel.clone(), Duration::ZERO),
            formatter: Arc::new(Formatter::new(
                Box::new(NoHighlight),
                "TL",
                "https://example.test",
                10,
            )),
            filter,
            admins: vec![ADMIN],
            fetch_timeout: Duration::from_secs(30),
            alert_on_failure: false,
        };

        Harness {
            _dir: dir,
            source,
            channel,
            snapshots,
            pipeline,
        }
    }

    fn stored_vins(snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .vehicles
            .iter()
            .filter_map(|v| v.vin.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_first_run_initializes_without_fanout() {
        let h = harness(Box::new(AcceptAll)).await;
        h.source.push_ok(&["VIN1", "VIN2"]).await;

        let outcome = h.pipeline.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Initialized { vehicles: 2 });

        // Only the admin hears about it.
        assert_eq!(h.channel.attempted().await, vec![ADMIN]);
        assert!(h.channel.sent().await[0].text.contains("initialized"));

        let saved = h.snapshots.load().await.unwrap().unwrap();
        assert_eq!(stored_vins(&saved), vec!["VIN1", "VIN2"]);
        assert_eq!(h.source.timeouts().await, vec![Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn test_new_vehicles_are_broadcast_and_saved() {
        let h = harness(Box::new(AcceptAll)).await;
        h.source.push_ok(&["VIN1", "VIN2"]).await;
        h.source.push_ok(&["VIN2", "VIN3", "VIN4"]).await;

        h.pipeline.run_cycle().await.unwrap();
        let outcome = h.pipeline.run_cycle().await.unwrap();

        match outcome {
            CycleOutcome::Notified {
                new,
                price_changes,
                report,
            } => {
                assert_eq!(new, 2);
                assert_eq!(price_changes, 0);
                assert_eq!(report.sent, 2);
                assert_eq!(report.failed, vec![2]);
            }
            other => panic!("expected Notified, got {other:?}"),
        }

        let saved = h.snapshots.load().await.unwrap().unwrap();
        assert_eq!(stored_vins(&saved), vec!["VIN2", "VIN3", "VIN4"]);

        let sent = h.channel.sent().await;
        let broadcast = sent.last().unwrap();
        assert!(broadcast.text.contains("VIN3"));
        assert!(broadcast.text.contains("VIN4"));
        assert!(!broadcast.text.contains("VIN1"));
        assert_eq!(h.channel.attempted().await, vec![ADMIN, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_error_leaves_store_untouched() {
        let h = harness(Box::new(AcceptAll)).await;
        h.source.push_ok(&["VIN1"]).await;
        h.source
            .push_err(FetchError::Transport("HTTP 500 Internal Server Error".into()))
            .await;

        h.pipeline.run_cycle().await.unwrap();
        let before = h.snapshots.load().await.unwrap().unwrap();

        let err = h.pipeline.run_cycle().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));

        let after = h.snapshots.load().await.unwrap().unwrap();
        assert_eq!(before, after);
        assert_eq!(h.channel.attempted().await, vec![ADMIN]);
    }

    #[tokio::test]
    async fn test_scheduled_failure_alerts_admins_when_enabled() {
        let mut h = harness(Box::new(AcceptAll)).await;
        h.source
            .push_err(FetchError::Timeout(Duration::from_secs(30)))
            .await;
        assert!(h.pipeline.run_scheduled().await.is_none());
        assert!(h.channel.attempted().await.is_empty());

        h.pipeline.alert_on_failure = true;
        h.source.push_err(FetchError::Parse("no results".into())).await;
        assert!(h.pipeline.run_scheduled().await.is_none());
        assert_eq!(h.channel.attempted().await, vec![ADMIN]);
        assert!(h.channel.sent().await[0].text.contains("failed"));
        assert!(h.snapshots.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mistyped_upstream_field_is_not_reannounced() {
        use invbot_inventory::fetcher::parse_response;

        let h = harness(Box::new(AcceptAll)).await;
        let clean = r#"{"results": [{"VIN": "VIN1", "Price": 2199000}]}"#;
        let mistyped = r#"{"results": [{"VIN": "VIN1", "Price": "2199000", "WHEELS": "NINETEEN"}]}"#;
        for body in [clean, mistyped, clean] {
            h.source.queue_result(parse_response(body).unwrap()).await;
        }

        h.pipeline.run_cycle().await.unwrap();
        for _ in 0..2 {
            let outcome = h.pipeline.run_cycle().await.unwrap();
            assert_eq!(outcome, CycleOutcome::Unchanged { detected: 0 });
            let saved = h.snapshots.load().await.unwrap().unwrap();
            assert_eq!(stored_vins(&saved), vec!["VIN1"]);
        }

        // Only the first-run acknowledgement went out.
        assert_eq!(h.channel.attempted().await, vec![ADMIN]);
    }

    #[tokio::test]
    async fn test_unchanged_inventory_sends_nothing() {
        let h = harness(Box::new(AcceptAll)).await;
        h.source.push_ok(&["VIN1"]).await;
        h.source.push_ok(&["VIN1"]).await;

        h.pipeline.run_cycle().await.unwrap();
        let outcome = h.pipeline.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Unchanged { detected: 0 });
        assert_eq!(h.channel.attempted().await, vec![ADMIN]);
    }

    #[tokio::test]
    async fn test_filtered_out_changes_still_update_snapshot() {
        let h = harness(Box::new(PriceCeiling::new(1_000_000.0))).await;
        h.source.push_ok(&["VIN1"]).await;
        h.source.push_ok(&["VIN1", "VIN2"]).await;

        h.pipeline.run_cycle().await.unwrap();
        let outcome = h.pipeline.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Unchanged { detected: 1 });

        let saved = h.snapshots.load().await.unwrap().unwrap();
        assert_eq!(stored_vins(&saved), vec!["VIN1", "VIN2"]);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_counts_as_first_run() {
        let h = harness(Box::new(AcceptAll)).await;
        tokio::fs::write(h.snapshots.path(), "{not json").await.unwrap();
        h.source.push_ok(&["VIN1"]).await;

        let outcome = h.pipeline.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Initialized { vehicles: 1 });
        assert!(h.snapshots.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_price_change_is_notified() {
        let h = harness(Box::new(AcceptAll)).await;
        h.source.push_ok(&["VIN1"]).await;
        h.pipeline.run_cycle().await.unwrap();

        let mut cheaper = record("VIN1");
        cheaper.inventory_price = Some(1_899_000.0);
        h.source
            .queue_result(invbot_core::model::ResultSet {
                records: vec![cheaper],
                total_matches_found: None,
            })
            .await;

        match h.pipeline.run_cycle().await.unwrap() {
            CycleOutcome::Notified {
                new, price_changes, ..
            } => {
                assert_eq!(new, 0);
                assert_eq!(price_changes, 1);
            }
            other => panic!("expected Notified, got {other:?}"),
        }
        assert!(h.channel.sent().await.last().unwrap().text.contains("1.899.000 TL"));
    }
}
