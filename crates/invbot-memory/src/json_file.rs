//! Whole-document JSON persistence with write-to-temp-then-rename.

use invbot_core::error::StoreError;
use serde::{de::DeserializeOwned, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Read and parse `path`. A missing file is `Ok(None)`.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(read_error(path, e)),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| read_error(path, e))
}

/// Serialize `value` and atomically replace `path` with it.
///
/// The previous content stays intact unless the final rename succeeds.
pub(crate) async fn write_json_atomic<T: Serialize>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_error(path, e))?;
    }

    let json = serde_json::to_vec_pretty(value).map_err(|e| write_error(path, e))?;
    let temp_path = temp_path_for(path);

    let result = write_and_sync(&temp_path, &json).await;
    let result = match result {
        Ok(()) => tokio::fs::rename(&temp_path, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(write_error(path, e));
    }
    Ok(())
}

async fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// `inventory.json` -> `inventory.json.tmp`, in the same directory so the rename stays atomic.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_error(path: &Path, e: impl std::fmt::Display) -> StoreError {
    StoreError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> StoreError {
    StoreError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        n: u32,
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let p = temp_path_for(Path::new("/data/inventory.json"));
        assert_eq!(p, PathBuf::from("/data/inventory.json.tmp"));
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let got: Option<Doc> = read_json(&dir.path().join("absent.json")).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parent_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/doc.json");
        write_json_atomic(&path, &Doc { n: 3 }).await.unwrap();

        let got: Option<Doc> = read_json(&path).await.unwrap();
        assert_eq!(got, Some(Doc { n: 3 }));
        assert!(!temp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        write_json_atomic(&path, &Doc { n: 1 }).await.unwrap();

        // A directory squatting on the temp path makes the temp write fail.
        std::fs::create_dir(temp_path_for(&path)).unwrap();
        let err = write_json_atomic(&path, &Doc { n: 2 }).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));

        let got: Option<Doc> = read_json(&path).await.unwrap();
        assert_eq!(got, Some(Doc { n: 1 }));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_json::<Doc>(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }
}
