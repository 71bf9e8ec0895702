//! In-memory name tables with atomic swap-on-complete rebuilds.
//!
//! Readers take an `Arc` to the current [`MappingSnapshot`] without locking.
//! A rebuild decodes into a fresh snapshot and swaps it in only once it is
//! complete, so a reader never observes tables from two different packs.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::decode::build_tables;
use super::models::{DataPack, SnapshotMeta};
use super::tables::{
    LeagueKey, NameTables, TableCounts, club_fallback, cup_fallback, league_fallback,
    league_id_placeholder, player_fallback, stadium_fallback,
};

/// One fully built generation of the five name tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingSnapshot {
    pub tables: NameTables,
    pub meta: Option<SnapshotMeta>,
}

impl MappingSnapshot {
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.meta.as_ref().map(|meta| meta.last_update)
    }

    pub fn club_name(&self, id: i64) -> String {
        self.tables
            .clubs
            .get(&id)
            .cloned()
            .unwrap_or_else(|| club_fallback(id))
    }

    pub fn player_name(&self, id: i64) -> String {
        self.tables
            .players
            .get(&id)
            .cloned()
            .unwrap_or_else(|| player_fallback(id))
    }

    pub fn league_name(&self, country_code: &str, division_index: u32) -> String {
        let key = LeagueKey::from_division_index(country_code, division_index);
        self.tables
            .leagues
            .get(&key)
            .cloned()
            .unwrap_or_else(|| league_fallback(country_code, division_index))
    }

    pub fn stadium_name(&self, id: i64) -> String {
        self.tables
            .stadiums
            .get(&id)
            .cloned()
            .unwrap_or_else(|| stadium_fallback(id))
    }

    pub fn cup_name(&self, id: &str) -> String {
        self.tables
            .cups
            .get(id)
            .cloned()
            .unwrap_or_else(|| cup_fallback(id))
    }
}

/// A club returned by [`MappingStore::search_clubs_by_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClubMatch {
    pub id: i64,
    pub name: String,
}

/// Holder of the live name tables.
///
/// Lookups never block and never perform I/O. `rebuild_from` is the only
/// mutation and replaces every table at once.
#[derive(Debug)]
pub struct MappingStore {
    current: ArcSwap<MappingSnapshot>,
}

impl Default for MappingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingStore {
    /// Creates a store with five empty tables. Every lookup falls back until
    /// the first rebuild.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(MappingSnapshot::default()),
        }
    }

    /// Current generation. Hold on to it to read several tables consistently.
    pub fn snapshot(&self) -> Arc<MappingSnapshot> {
        self.current.load_full()
    }

    /// Decodes `pack` into a scratch snapshot and promotes it.
    ///
    /// Returns the number of malformed records skipped per table.
    pub fn rebuild_from(&self, pack: &DataPack) -> TableCounts {
        let (tables, skipped) = build_tables(&pack.pack_data);
        let counts = tables.counts();
        self.promote(MappingSnapshot {
            tables,
            meta: pack.meta.clone(),
        });
        info!("Mapping tables rebuilt: {counts}");
        if skipped.total() > 0 {
            debug!("Skipped records during rebuild: {skipped}");
        }
        skipped
    }

    /// Replaces the live snapshot wholesale.
    pub fn promote(&self, snapshot: MappingSnapshot) {
        self.current.store(Arc::new(snapshot));
    }

    pub fn resolve_club_name(&self, id: i64) -> String {
        self.current.load().club_name(id)
    }

    pub fn resolve_player_name(&self, id: i64) -> String {
        self.current.load().player_name(id)
    }

    /// Resolves a league from its country code and 0-based division index.
    pub fn resolve_league_name(&self, country_code: &str, division_index: u32) -> String {
        self.current.load().league_name(country_code, division_index)
    }

    /// Leagues are only keyed by country and division, so a bare id always
    /// yields the placeholder.
    pub fn resolve_league_name_by_id(&self, id: i64) -> String {
        league_id_placeholder(id)
    }

    pub fn resolve_stadium_name(&self, id: i64) -> String {
        self.current.load().stadium_name(id)
    }

    pub fn resolve_cup_name(&self, id: &str) -> String {
        self.current.load().cup_name(id)
    }

    /// Case-insensitive substring search over club names in table order.
    /// Stops as soon as `limit` matches are collected.
    pub fn search_clubs_by_name(&self, term: &str, limit: usize) -> Vec<ClubMatch> {
        let needle = term.to_lowercase();
        let snapshot = self.current.load();
        snapshot
            .tables
            .clubs
            .iter()
            .filter(|(_, name)| name.to_lowercase().contains(&needle))
            .take(limit)
            .map(|(id, name)| ClubMatch {
                id: *id,
                name: name.clone(),
            })
            .collect()
    }

    /// Stored club name, `None` when the club is unknown.
    pub fn club_details(&self, id: i64) -> Option<ClubMatch> {
        self.current.load().tables.clubs.get(&id).map(|name| ClubMatch {
            id,
            name: name.clone(),
        })
    }

    pub fn counts(&self) -> TableCounts {
        self.current.load().tables.counts()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.current.load().last_update()
    }
}
