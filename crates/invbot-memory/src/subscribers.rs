//! Subscriber list persisted as `members.json`.

use crate::json_file::{read_json, write_json_atomic};
use invbot_core::{error::StoreError, model::Subscriber};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Accepted on-disk shapes: `{ "members": [...] }` or a legacy bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SubscriberFile {
    Wrapped { members: Vec<Subscriber> },
    Bare(Vec<Subscriber>),
}

#[derive(Serialize)]
struct SubscriberFileOut<'a> {
    members: &'a [Subscriber],
}

/// Chats that receive inventory notifications.
#[derive(Clone)]
pub struct SubscriberStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl SubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All subscribers with unique ids. A missing file is an empty list.
    pub async fn list(&self) -> Result<Vec<Subscriber>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Chat ids to broadcast to.
    pub async fn ids(&self) -> Result<Vec<i64>, StoreError> {
        Ok(self.list().await?.into_iter().map(|s| s.id).collect())
    }

    /// Add `subscriber` unless its id is already known.
    ///
    /// Returns `true` when the subscriber was newly added.
    pub async fn register(&self, subscriber: Subscriber) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut members = self.read_unlocked().await?;
        if members.iter().any(|m| m.id == subscriber.id) {
            return Ok(false);
        }

        info!("subscribers: registering chat {}", subscriber.id);
        members.push(subscriber);
        write_json_atomic(&self.path, &SubscriberFileOut { members: &members }).await?;
        Ok(true)
    }

    async fn read_unlocked(&self) -> Result<Vec<Subscriber>, StoreError> {
        let members = match read_json::<SubscriberFile>(&self.path).await? {
            None => return Ok(Vec::new()),
            Some(SubscriberFile::Wrapped { members }) => members,
            Some(SubscriberFile::Bare(members)) => members,
        };
        Ok(dedupe(members, &self.path))
    }
}

fn dedupe(members: Vec<Subscriber>, path: &Path) -> Vec<Subscriber> {
    let mut seen = HashSet::new();
    let before = members.len();
    let unique: Vec<Subscriber> = members.into_iter().filter(|m| seen.insert(m.id)).collect();
    if unique.len() != before {
        warn!(
            "subscribers: dropped {} duplicate ids from {}",
            before - unique.len(),
            path.display()
        );
    }
    unique
}
