//! Durable copy of the last successfully parsed data pack.
//!
//! The file holds the fetched document unchanged plus an injected `meta`
//! object. It is written to a temporary sibling and renamed over the target,
//! so a crash mid-write leaves the previous snapshot in place.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

use super::models::SnapshotMeta;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn write_error(&self, e: impl std::fmt::Display) -> AppError {
        AppError::snapshot_write(self.display_path(), e.to_string())
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }

    /// Reads and decodes the snapshot document.
    ///
    /// # Errors
    /// `AppError::SnapshotLoad` when the file is missing, unreadable or not JSON.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn read(&self) -> Result<Value, AppError> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| AppError::snapshot_load(self.display_path(), e.to_string()))?;
        debug!("Read snapshot of {} bytes", content.len());

        serde_json::from_str(&content)
            .map_err(|e| AppError::snapshot_load(self.display_path(), format!("invalid JSON: {e}")))
    }

    /// Writes `document` as pretty-printed JSON, creating parent directories
    /// on demand.
    ///
    /// # Errors
    /// `AppError::SnapshotWrite` on any serialization or filesystem failure.
    #[instrument(skip(self, document), fields(path = %self.path.display()))]
    pub async fn write(&self, document: &Value) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| self.write_error(e))?;
        }

        let content = serde_json::to_string_pretty(document).map_err(|e| self.write_error(e))?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, content.as_bytes())
            .await
            .map_err(|e| self.write_error(e))?;
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(self.write_error(e));
        }

        info!("Mapping snapshot saved to {}", self.path.display());
        Ok(())
    }
}

/// Injects `meta` into a fetched document, replacing any existing one.
///
/// # Errors
/// `AppError::MissingPackData` when the document is not a JSON object.
pub fn attach_meta(
    mut document: Value,
    meta: &SnapshotMeta,
    source_name: &str,
) -> Result<Value, AppError> {
    let meta_value = serde_json::to_value(meta)?;
    match document.as_object_mut() {
        Some(object) => {
            object.insert("meta".to_string(), meta_value);
            Ok(document)
        }
        None => Err(AppError::missing_pack_data(source_name)),
    }
}
