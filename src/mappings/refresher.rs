//! Refresh policy for the name tables.
//!
//! `MappingRefresher` owns the [`MappingStore`], the remote source and the
//! durable snapshot. It loads the snapshot at startup, refreshes when the
//! data is older than a week, and lets only one refresh run at a time.
//! Callers that arrive while a refresh is in flight wait for it and share
//! its outcome instead of starting a second download.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::models::{DataPack, SnapshotMeta};
use super::snapshot::{SnapshotFile, attach_meta};
use super::source::RemoteDataSource;
use super::store::MappingStore;
use super::tables::TableCounts;
use crate::config::Config;
use crate::constants::refresh::MAX_AGE_DAYS;
use crate::error::AppError;

/// Observable state of the refresher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// No snapshot load or refresh has completed yet
    Uninitialized,
    /// Serving the tables promoted at `last_update` (`None` when unknown)
    Ready { last_update: Option<DateTime<Utc>> },
    /// A fetch is in flight; lookups still see the previous tables
    Refreshing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    pub counts: TableCounts,
    pub last_update: Option<DateTime<Utc>>,
    pub next_update: Option<DateTime<Utc>>,
}

/// Outcome of the most recent refresh, shared with callers that waited on it
#[derive(Debug, Default)]
struct RefreshLedger {
    completed: u64,
    last_failure: Option<String>,
}

/// Clears the refreshing flag even when the refresh future is dropped
struct RefreshingGuard<'a>(&'a AtomicBool);

impl<'a> RefreshingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct MappingRefresher {
    store: Arc<MappingStore>,
    source: RemoteDataSource,
    snapshot_file: SnapshotFile,
    refresh_gate: Mutex<RefreshLedger>,
    completed_attempts: AtomicU64,
    refreshing: AtomicBool,
    initialized: AtomicBool,
}

impl MappingRefresher {
    pub fn new(
        store: Arc<MappingStore>,
        source: RemoteDataSource,
        snapshot_file: SnapshotFile,
    ) -> Self {
        Self {
            store,
            source,
            snapshot_file,
            refresh_gate: Mutex::new(RefreshLedger::default()),
            completed_attempts: AtomicU64::new(0),
            refreshing: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
        }
    }

    /// Builds a refresher with a fresh store from the configured URL,
    /// timeout and snapshot location.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let source =
            RemoteDataSource::new(config.data_pack_url.clone(), config.http_timeout_seconds)?;
        let snapshot_file = SnapshotFile::new(config.resolved_snapshot_path());
        Ok(Self::new(
            Arc::new(MappingStore::new()),
            source,
            snapshot_file,
        ))
    }

    /// Shared handle to the live tables, for injection into readers
    pub fn store(&self) -> Arc<MappingStore> {
        Arc::clone(&self.store)
    }

    pub fn snapshot_file(&self) -> &SnapshotFile {
        &self.snapshot_file
    }

    pub fn source(&self) -> &RemoteDataSource {
        &self.source
    }

    pub fn phase(&self) -> RefreshPhase {
        if self.refreshing.load(Ordering::Acquire) {
            RefreshPhase::Refreshing
        } else if !self.initialized.load(Ordering::Acquire) {
            RefreshPhase::Uninitialized
        } else {
            RefreshPhase::Ready {
                last_update: self.store.last_update(),
            }
        }
    }

    /// Startup sequence: load the persisted snapshot, then either refresh it
    /// when stale or, when it could not be loaded, force a refresh right away.
    /// Failures are logged and never fatal.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> RefreshPhase {
        match self.load_persisted_snapshot().await {
            Ok(last_update) => {
                match last_update {
                    Some(at) => info!("Loaded mapping snapshot from {at}"),
                    None => warn!("Mapping snapshot has no update time, treating it as stale"),
                }
                self.check_and_refresh_if_stale().await;
            }
            Err(e) => {
                warn!("No usable mapping snapshot ({e}), forcing a refresh");
                if let Err(e) = self.force_refresh().await {
                    error!("Initial mapping refresh failed, serving fallback names: {e}");
                }
            }
        }
        self.initialized.store(true, Ordering::Release);
        self.phase()
    }

    /// Loads the snapshot file into the store.
    ///
    /// Returns the snapshot's update time, `None` when its metadata is
    /// missing or unreadable.
    ///
    /// # Errors
    /// `SnapshotLoad` for a missing or corrupt file, `MissingPackData` when the
    /// document has no `PackData` object. The store is left untouched.
    #[instrument(skip(self), fields(path = %self.snapshot_file.path().display()))]
    pub async fn load_persisted_snapshot(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let document = self.snapshot_file.read().await?;
        let source_name = self.snapshot_file.path().display().to_string();
        let pack = DataPack::from_document(&document, &source_name)?;
        self.store.rebuild_from(&pack);
        self.initialized.store(true, Ordering::Release);
        Ok(self.store.last_update())
    }

    /// True when the tables have no known update time or are older than the
    /// maximum age.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match self.store.last_update() {
            None => true,
            Some(last_update) => now - last_update > TimeDelta::days(MAX_AGE_DAYS),
        }
    }

    /// Refreshes when stale. Failures are logged and swallowed.
    ///
    /// Returns whether a refresh was attempted.
    pub async fn check_and_refresh_if_stale(&self) -> bool {
        self.check_and_refresh_if_stale_at(Utc::now()).await
    }

    pub async fn check_and_refresh_if_stale_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_stale_at(now) {
            debug!("Mapping tables are fresh, no refresh needed");
            return false;
        }

        info!("Mapping tables are stale, refreshing");
        if let Err(e) = self.force_refresh().await {
            warn!("Stale mapping refresh failed, keeping current tables: {e}");
        }
        true
    }

    /// Fetches, rebuilds and persists regardless of age.
    ///
    /// A caller that arrives while another refresh is running waits for it
    /// and receives its outcome; no second fetch happens.
    ///
    /// # Errors
    /// Transport and `MissingPackData` failures leave the tables and the
    /// snapshot file untouched. `SnapshotWrite` is returned after the tables
    /// were already promoted. A joined caller sees `RefreshFailed`.
    #[instrument(skip(self))]
    pub async fn force_refresh(&self) -> Result<MappingStats, AppError> {
        let ticket = self.completed_attempts.load(Ordering::Acquire);
        let mut ledger = self.refresh_gate.lock().await;

        if ledger.completed > ticket {
            debug!("Joined a mapping refresh that finished while waiting");
            return match &ledger.last_failure {
                None => Ok(self.stats()),
                Some(message) => Err(AppError::refresh_failed(message.clone())),
            };
        }

        let outcome = {
            let _refreshing = RefreshingGuard::enter(&self.refreshing);
            self.run_refresh().await
        };

        ledger.completed += 1;
        ledger.last_failure = outcome.as_ref().err().map(ToString::to_string);
        self.completed_attempts
            .store(ledger.completed, Ordering::Release);
        self.initialized.store(true, Ordering::Release);

        match &outcome {
            Ok(stats) => info!("Mapping refresh complete: {}", stats.counts),
            Err(e) if e.is_persistence_failure() => {
                error!("Mapping tables updated but the snapshot could not be saved: {e}")
            }
            Err(e) => error!("Mapping refresh failed, previous tables kept: {e}"),
        }
        outcome
    }

    /// Entry point for the weekly trigger: forced, errors logged only.
    pub async fn scheduled_refresh(&self) -> bool {
        info!("Running scheduled mapping refresh");
        match self.force_refresh().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Scheduled mapping refresh failed: {e}");
                false
            }
        }
    }

    async fn run_refresh(&self) -> Result<MappingStats, AppError> {
        let source_name = self.source.url();
        let document = self.source.fetch_document().await?;

        let meta = SnapshotMeta::new(Utc::now(), source_name);
        let document = attach_meta(document, &meta, source_name)?;
        let pack = DataPack::from_document(&document, source_name)?;

        self.store.rebuild_from(&pack);
        self.snapshot_file.write(&document).await?;

        Ok(self.stats())
    }

    pub fn stats(&self) -> MappingStats {
        let snapshot = self.store.snapshot();
        let last_update = snapshot.last_update();
        MappingStats {
            counts: snapshot.tables.counts(),
            last_update,
            next_update: last_update.map(|at| at + TimeDelta::days(MAX_AGE_DAYS)),
        }
    }
}
