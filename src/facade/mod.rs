//! Read-only name resolution and presentation helpers for command code.
//!
//! The facade never triggers a refresh; it only reads the live
//! [`MappingStore`] generation.

pub mod formatting;
pub mod time_formatting;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::mappings::{ClubMatch, MappingStore};

pub use formatting::{
    competition_type, format_capacity_change, format_country_name, format_fans_change,
    format_form, format_money, format_percentage_change, match_outcome,
};

/// A fixture as reported by the game's schedule endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub home_club: i64,
    pub away_club: i64,
    #[serde(default)]
    pub home_goals: i64,
    #[serde(default)]
    pub away_goals: i64,
    #[serde(default)]
    pub played: i64,
    #[serde(default)]
    pub stadium_id: i64,
    #[serde(default)]
    pub country_id: String,
    #[serde(default)]
    pub comp_type: i64,
    /// Kickoff as a unix timestamp
    #[serde(default)]
    pub date: i64,
}

impl Fixture {
    pub fn is_played(&self) -> bool {
        self.played == 1
    }
}

/// Display names attached to a fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureNames {
    pub home_club_name: String,
    pub away_club_name: String,
    pub stadium_name: String,
    pub country_name: String,
    pub competition_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct NameResolutionFacade {
    store: Arc<MappingStore>,
    offset: FixedOffset,
}

impl NameResolutionFacade {
    /// `offset` is the timezone dates are rendered in.
    pub fn new(store: Arc<MappingStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    pub fn from_config(store: Arc<MappingStore>, config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(store, config.schedule_offset()?))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn club_name(&self, id: i64) -> String {
        self.store.resolve_club_name(id)
    }

    pub fn player_name(&self, id: i64) -> String {
        self.store.resolve_player_name(id)
    }

    pub fn league_name(&self, country_code: &str, division_index: u32) -> String {
        self.store.resolve_league_name(country_code, division_index)
    }

    pub fn league_name_by_id(&self, id: i64) -> String {
        self.store.resolve_league_name_by_id(id)
    }

    pub fn stadium_name(&self, id: i64) -> String {
        self.store.resolve_stadium_name(id)
    }

    pub fn cup_name(&self, id: &str) -> String {
        self.store.resolve_cup_name(id)
    }

    pub fn search_clubs(&self, term: &str, limit: usize) -> Vec<ClubMatch> {
        self.store.search_clubs_by_name(term, limit)
    }

    pub fn club_details(&self, id: i64) -> Option<ClubMatch> {
        self.store.club_details(id)
    }

    /// Resolves every name shown for a fixture from a single table generation.
    pub fn name_fixture(&self, fixture: &Fixture) -> FixtureNames {
        let snapshot = self.store.snapshot();
        FixtureNames {
            home_club_name: snapshot.club_name(fixture.home_club),
            away_club_name: snapshot.club_name(fixture.away_club),
            stadium_name: snapshot.stadium_name(fixture.stadium_id),
            country_name: format_country_name(&fixture.country_id),
            competition_type: competition_type(fixture.comp_type),
        }
    }

    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        time_formatting::format_date(at, self.offset)
    }

    pub fn format_relative_timestamp(&self, unix: i64) -> String {
        self.format_relative_timestamp_with_time(unix, Utc::now())
    }

    pub fn format_relative_timestamp_with_time(&self, unix: i64, now: DateTime<Utc>) -> String {
        time_formatting::format_relative_timestamp_with_time(unix, now, self.offset)
    }

    pub fn format_match_date(&self, unix: i64) -> String {
        self.format_match_date_with_time(unix, Utc::now())
    }

    pub fn format_match_date_with_time(&self, unix: i64, now: DateTime<Utc>) -> String {
        time_formatting::format_match_date_with_time(unix, now, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing_utils::DataPackBuilder;
    use chrono::TimeZone;

    fn facade() -> NameResolutionFacade {
        let store = Arc::new(MappingStore::new());
        store.rebuild_from(
            &DataPackBuilder::new()
                .club("10", "FC Home")
                .club("20", "Away United")
                .stadium("5", "Grand Stade")
                .league("FRA", 1, "Ligue 1")
                .player("3", None, Some("Zidane"))
                .cup("CUP_FRA", "Coupe de France")
                .build_pack(),
        );
        NameResolutionFacade::new(store, FixedOffset::east_opt(3600).unwrap())
    }

    #[test]
    fn test_delegated_lookups() {
        let facade = facade();
        assert_eq!(facade.club_name(10), "FC Home");
        assert_eq!(facade.club_name(99), "Club #99");
        assert_eq!(facade.player_name(3), "Zidane");
        assert_eq!(facade.league_name("FRA", 0), "Ligue 1");
        assert_eq!(facade.league_name_by_id(4), "Ligue #4");
        assert_eq!(facade.stadium_name(5), "Grand Stade");
        assert_eq!(facade.cup_name("CUP_FRA"), "Coupe de France");
        assert_eq!(facade.search_clubs("united", 10).len(), 1);
        assert_eq!(facade.club_details(20).map(|c| c.name), Some("Away United".to_string()));
    }

    #[test]
    fn test_name_fixture() {
        let fixture: Fixture = serde_json::from_value(serde_json::json!({
            "home_club": 10,
            "away_club": 77,
            "stadium_id": 5,
            "country_id": "FRA",
            "comp_type": 1,
            "date": 1741600000
        }))
        .unwrap();

        let names = facade().name_fixture(&fixture);
        assert_eq!(
            names,
            FixtureNames {
                home_club_name: "FC Home".to_string(),
                away_club_name: "Club #77".to_string(),
                stadium_name: "Grand Stade".to_string(),
                country_name: "🇫🇷 France".to_string(),
                competition_type: "🏅 Coupe",
            }
        );
        assert!(!fixture.is_played());
    }

    #[test]
    fn test_time_helpers_use_offset() {
        let facade = facade();
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(
            facade.format_date(Utc.with_ymd_and_hms(2025, 3, 9, 23, 30, 0).unwrap()),
            "10/03/2025"
        );
        assert_eq!(
            facade.format_relative_timestamp_with_time(now.timestamp() - 7200, now),
            "Il y a 2h"
        );
        assert_eq!(
            facade.format_match_date_with_time(now.timestamp() + 7200, now),
            "Dans 2h"
        );
        assert_eq!(facade.format_relative_timestamp(0), "Jamais");
    }
}
