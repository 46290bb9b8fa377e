//! Single-slot snapshot register.

use crate::json_file::{read_json, write_json_atomic};
use invbot_core::{error::StoreError, model::Snapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Holds the last observed inventory in one JSON file.
///
/// Clones share the same writer lock, so the scheduled sync and an
/// interactive trigger never interleave writes.
#[derive(Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted snapshot, or `None` if nothing has been written yet.
    pub async fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        read_json(&self.path).await
    }

    /// Replace the persisted snapshot.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        write_json_atomic(&self.path, snapshot).await?;
        debug!(
            "snapshot: saved {} vehicles to {}",
            snapshot.vehicles.len(),
            self.path.display()
        );
        Ok(())
    }
}
