//! The five name tables and the composite league key.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Immutable id → display name table. Iteration follows insertion order,
/// which is the order of the data pack.
pub type NameTable<K> = IndexMap<K, String>;

/// Composite league identity `"{countryCode}_{division}"`.
///
/// The data pack numbers divisions from 1 while the game API reports a
/// 0-based division index, hence the two constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeagueKey(String);

impl LeagueKey {
    /// Key for a data pack entry whose division number is already 1-based.
    pub fn from_pack_division(country_code: &str, division: u32) -> Self {
        Self(format!("{country_code}_{division}"))
    }

    /// Key for a 0-based division index as reported by the game API.
    pub fn from_division_index(country_code: &str, division_index: u32) -> Self {
        Self::from_pack_division(country_code, division_index.saturating_add(1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeagueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub clubs: usize,
    pub players: usize,
    pub leagues: usize,
    pub stadiums: usize,
    pub cups: usize,
}

impl TableCounts {
    pub fn total(&self) -> usize {
        self.clubs + self.players + self.leagues + self.stadiums + self.cups
    }
}

impl fmt::Display for TableCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} clubs, {} players, {} leagues, {} stadiums, {} cups",
            self.clubs, self.players, self.leagues, self.stadiums, self.cups
        )
    }
}

/// All five tables of one data pack generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameTables {
    pub clubs: NameTable<i64>,
    pub players: NameTable<i64>,
    pub leagues: NameTable<LeagueKey>,
    pub stadiums: NameTable<i64>,
    pub cups: NameTable<String>,
}

impl NameTables {
    pub fn counts(&self) -> TableCounts {
        TableCounts {
            clubs: self.clubs.len(),
            players: self.players.len(),
            leagues: self.leagues.len(),
            stadiums: self.stadiums.len(),
            cups: self.cups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }
}

pub fn club_fallback(id: impl fmt::Display) -> String {
    format!("Club #{id}")
}

pub fn player_fallback(id: impl fmt::Display) -> String {
    format!("Joueur #{id}")
}

pub fn league_fallback(country_code: &str, division_index: u32) -> String {
    format!("Ligue {country_code} D{}", division_index.saturating_add(1))
}

/// Placeholder for a bare numeric league id. The data pack only keys leagues
/// by country and division, so such ids never resolve.
pub fn league_id_placeholder(id: impl fmt::Display) -> String {
    format!("Ligue #{id}")
}

pub fn stadium_fallback(id: impl fmt::Display) -> String {
    format!("Stade #{id}")
}

pub fn cup_fallback(id: impl fmt::Display) -> String {
    format!("Coupe #{id}")
}
