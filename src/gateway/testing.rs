//! Test doubles for the gateway: a recording channel and a canned inventory source.

use async_trait::async_trait;
use invbot_core::{
    error::{BotError, FetchError},
    message::{IncomingMessage, OutgoingMessage},
    model::{InventoryRecord, ResultSet},
    traits::Channel,
};
use invbot_inventory::InventorySource;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// Records every send; fails delivery for the configured chats.
#[derive(Default)]
pub(crate) struct RecordingChannel {
    failing: HashSet<i64>,
    attempts: Mutex<Vec<i64>>,
    sent: Mutex<Vec<OutgoingMessage>>,
}

impl RecordingChannel {
    pub fn failing_for(chat_ids: &[i64]) -> Self {
        Self {
            failing: chat_ids.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub async fn attempted(&self) -> Vec<i64> {
        self.attempts.lock().await.clone()
    }

    pub async fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn delivered_to(&self) -> Vec<i64> {
        self.sent.lock().await.iter().map(|m| m.chat_id).collect()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, BotError> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), BotError> {
        self.attempts.lock().await.push(message.chat_id);
        if self.failing.contains(&message.chat_id) {
            return Err(BotError::Channel(format!(
                "chat {} blocked the bot",
                message.chat_id
            )));
        }
        self.sent.lock().await.push(message);
        Ok(())
    }

    async fn stop(&self) -> Result<(), BotError> {
        Ok(())
    }
}

/// Replays queued fetch results in order, then keeps failing.
#[derive(Default)]
pub(crate) struct StubSource {
    queue: Mutex<VecDeque<Result<ResultSet, FetchError>>>,
    calls: Mutex<Vec<Duration>>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubSource {
    /// Every fetch takes `latency` before answering.
    pub fn slow(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    /// Most fetches ever running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub async fn push_ok(&self, vins: &[&str]) {
        self.queue_result(result_set(vins)).await;
    }

    pub async fn queue_result(&self, results: ResultSet) {
        self.queue.lock().await.push_back(Ok(results));
    }

    pub async fn push_err(&self, err: FetchError) {
        self.queue.lock().await.push_back(Err(err));
    }

    /// Timeouts passed to each fetch, in call order.
    pub async fn timeouts(&self) -> Vec<Duration> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl InventorySource for StubSource {
    async fn fetch(&self, timeout: Duration) -> Result<ResultSet, FetchError> {
        self.calls.lock().await.push(timeout);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.queue
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("stub exhausted".into())))
    }
}

/// A priced record with the given VIN.
pub(crate) fn record(vin: &str) -> InventoryRecord {
    serde_json::from_value(serde_json::json!({
        "VIN": vin,
        "TrimName": "Model Y Long Range",
        "InventoryPrice": 1_999_000,
    }))
    .unwrap()
}

pub(crate) fn result_set(vins: &[&str]) -> ResultSet {
    ResultSet {
        records: vins.iter().map(|v| record(v)).collect(),
        total_matches_found: Some(vins.len().to_string()),
    }
}
