//! Per-record decoding of the data pack sub-tables.
//!
//! Every list entry is decoded into a [`Decoded`] value: either a table entry
//! or a malformed record with the reason it was rejected. Malformed records
//! are counted and logged once per table. A sub-table that is missing or not
//! shaped like `{<list key>: [...]}` yields an empty table without affecting
//! the others.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::hash::Hash;
use tracing::{debug, warn};

use super::models::{ClubRecord, CupRecord, LeagueRecord, PackData, PlayerRecord, StadiumRecord};
use super::tables::{LeagueKey, NameTable, NameTables, TableCounts};

/// Outcome of decoding one list entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<K> {
    Entry(K, String),
    Malformed(&'static str),
}

/// A data pack record type that maps to one name table entry.
pub trait PackRecord: DeserializeOwned {
    type Key: Hash + Eq;

    /// Table name used in log lines
    const TABLE: &'static str;

    /// Key of the list inside the sub-table object (`C`, `P`, `L`, `S`)
    const LIST_KEY: &'static str;

    fn into_entry(self) -> Result<(Self::Key, String), &'static str>;
}

fn non_blank(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| name.to_string())
}

impl PackRecord for ClubRecord {
    type Key = i64;
    const TABLE: &'static str = "clubs";
    const LIST_KEY: &'static str = "C";

    fn into_entry(self) -> Result<(i64, String), &'static str> {
        let id = self.id.as_i64().ok_or("club id is not an integer")?;
        let name = non_blank(&self.n).ok_or("club name is empty")?;
        Ok((id, name))
    }
}

impl PackRecord for PlayerRecord {
    type Key = i64;
    const TABLE: &'static str = "players";
    const LIST_KEY: &'static str = "P";

    fn into_entry(self) -> Result<(i64, String), &'static str> {
        let id = self.id.as_i64().ok_or("player id is not an integer")?;
        let full_name = format!(
            "{} {}",
            self.f.as_deref().unwrap_or(""),
            self.s.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();
        if full_name.is_empty() {
            return Err("player has neither first nor last name");
        }
        Ok((id, full_name))
    }
}

impl PackRecord for LeagueRecord {
    type Key = LeagueKey;
    const TABLE: &'static str = "leagues";
    const LIST_KEY: &'static str = "L";

    fn into_entry(self) -> Result<(LeagueKey, String), &'static str> {
        let country_code = self.c.trim();
        if country_code.is_empty() {
            return Err("league country code is empty");
        }
        let division = self
            .d
            .as_i64()
            .and_then(|d| u32::try_from(d).ok())
            .filter(|d| *d >= 1)
            .ok_or("league division is not a positive integer")?;
        let name = non_blank(&self.n).ok_or("league name is empty")?;
        Ok((LeagueKey::from_pack_division(country_code, division), name))
    }
}

impl PackRecord for StadiumRecord {
    type Key = i64;
    const TABLE: &'static str = "stadiums";
    const LIST_KEY: &'static str = "S";

    fn into_entry(self) -> Result<(i64, String), &'static str> {
        let id = self.id.as_i64().ok_or("stadium id is not an integer")?;
        let name = non_blank(&self.n).ok_or("stadium name is empty")?;
        Ok((id, name))
    }
}

impl PackRecord for CupRecord {
    type Key = String;
    const TABLE: &'static str = "cups";
    const LIST_KEY: &'static str = "C";

    fn into_entry(self) -> Result<(String, String), &'static str> {
        let id = self.id.as_key().ok_or("cup id is empty")?;
        let name = non_blank(&self.n).ok_or("cup name is empty")?;
        Ok((id, name))
    }
}

/// Decodes a single list entry.
pub fn decode_entry<R: PackRecord>(raw: &Value) -> Decoded<R::Key> {
    match R::deserialize(raw) {
        Ok(record) => match record.into_entry() {
            Ok((key, name)) => Decoded::Entry(key, name),
            Err(reason) => Decoded::Malformed(reason),
        },
        Err(_) => Decoded::Malformed("missing or mistyped fields"),
    }
}

/// Decodes a whole sub-table, returning the table and the number of skipped
/// records.
pub fn decode_table<R: PackRecord>(section: Option<&Value>) -> (NameTable<R::Key>, usize) {
    let mut table = NameTable::new();

    let Some(section) = section else {
        debug!("No {} section in data pack", R::TABLE);
        return (table, 0);
    };
    let Some(entries) = section.get(R::LIST_KEY).and_then(Value::as_array) else {
        warn!(
            "Data pack {} section has no '{}' list, using an empty table",
            R::TABLE,
            R::LIST_KEY
        );
        return (table, 0);
    };

    let mut skipped = 0usize;
    for raw in entries {
        match decode_entry::<R>(raw) {
            Decoded::Entry(key, name) => {
                table.insert(key, name);
            }
            Decoded::Malformed(reason) => {
                skipped += 1;
                debug!("Skipping malformed {} record ({reason}): {raw}", R::TABLE);
            }
        }
    }

    if skipped > 0 {
        warn!(
            "Skipped {skipped} malformed {} record(s) out of {}",
            R::TABLE,
            entries.len()
        );
    }

    (table, skipped)
}

/// Builds all five tables from a `PackData` section.
pub fn build_tables(pack: &PackData) -> (NameTables, TableCounts) {
    let (clubs, skipped_clubs) = decode_table::<ClubRecord>(pack.club_data.as_ref());
    let (players, skipped_players) = decode_table::<PlayerRecord>(pack.player_data.as_ref());
    let (leagues, skipped_leagues) = decode_table::<LeagueRecord>(pack.league_data.as_ref());
    let (stadiums, skipped_stadiums) = decode_table::<StadiumRecord>(pack.stadium_data.as_ref());
    let (cups, skipped_cups) = decode_table::<CupRecord>(pack.cup_data.as_ref());

    let tables = NameTables {
        clubs,
        players,
        leagues,
        stadiums,
        cups,
    };
    let skipped = TableCounts {
        clubs: skipped_clubs,
        players: skipped_players,
        leagues: skipped_leagues,
        stadiums: skipped_stadiums,
        cups: skipped_cups,
    };
    (tables, skipped)
}
