//! Serde models for the community data pack and the persisted snapshot metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::constants::snapshot::FORMAT_VERSION;
use crate::error::AppError;

/// Metadata injected into every persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    #[serde(rename = "lastUpdate")]
    pub last_update: DateTime<Utc>,
    pub source: String,
    pub version: String,
}

impl SnapshotMeta {
    pub fn new(last_update: DateTime<Utc>, source: impl Into<String>) -> Self {
        Self {
            last_update,
            source: source.into(),
            version: FORMAT_VERSION.to_string(),
        }
    }
}

/// The `PackData` section of a data pack.
///
/// Sub-tables are kept as raw JSON so that a broken one only empties its own
/// table; see [`crate::mappings::decode`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackData {
    #[serde(rename = "ClubData", default)]
    pub club_data: Option<Value>,
    #[serde(rename = "PlayerData", default)]
    pub player_data: Option<Value>,
    #[serde(rename = "LeagueData", default)]
    pub league_data: Option<Value>,
    #[serde(rename = "StadiumData", default)]
    pub stadium_data: Option<Value>,
    #[serde(rename = "CupData", default)]
    pub cup_data: Option<Value>,
}

/// A data pack document reduced to what the name tables are built from.
#[derive(Debug, Clone, Default)]
pub struct DataPack {
    pub pack_data: PackData,
    pub meta: Option<SnapshotMeta>,
}

impl DataPack {
    /// Extracts `PackData` (and `meta`, when present) from a fetched or persisted
    /// document.
    ///
    /// # Errors
    /// `AppError::MissingPackData` when the document has no `PackData` object.
    /// A missing or unreadable `meta` is not an error; it only leaves
    /// `meta` empty.
    pub fn from_document(document: &Value, source_name: &str) -> Result<Self, AppError> {
        let pack_value = document
            .get("PackData")
            .filter(|value| value.is_object())
            .ok_or_else(|| AppError::missing_pack_data(source_name))?;
        let pack_data = PackData::deserialize(pack_value)?;

        let meta = match document.get("meta") {
            Some(raw_meta) => match SnapshotMeta::deserialize(raw_meta) {
                Ok(meta) => Some(meta),
                Err(e) => {
                    warn!("Ignoring unreadable snapshot metadata from {source_name}: {e}");
                    None
                }
            },
            None => None,
        };

        Ok(Self { pack_data, meta })
    }
}

/// Identifier as it appears in the data pack: usually a string holding an
/// integer, occasionally a bare JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    /// Numeric value of the id, `None` when the text is not an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawId::Text(text) => text.trim().parse().ok(),
            RawId::Number(number) => Some(*number),
        }
    }

    /// Id as a string key, `None` when blank.
    pub fn as_key(&self) -> Option<String> {
        match self {
            RawId::Text(text) if text.trim().is_empty() => None,
            RawId::Text(text) => Some(text.trim().to_string()),
            RawId::Number(number) => Some(number.to_string()),
        }
    }
}

/// `{id, n}` entry of `ClubData.C`
#[derive(Debug, Clone, Deserialize)]
pub struct ClubRecord {
    pub id: RawId,
    pub n: String,
}

/// `{id, f, s}` entry of `PlayerData.P`
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRecord {
    pub id: RawId,
    #[serde(default)]
    pub f: Option<String>,
    #[serde(default)]
    pub s: Option<String>,
}

/// `{c, d, n}` entry of `LeagueData.L`; `d` is the 1-based division number.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueRecord {
    pub c: String,
    pub d: RawId,
    pub n: String,
}

/// `{id, n}` entry of `StadiumData.S`
#[derive(Debug, Clone, Deserialize)]
pub struct StadiumRecord {
    pub id: RawId,
    pub n: String,
}

/// `{id, n}` entry of `CupData.C`; cup ids stay strings.
#[derive(Debug, Clone, Deserialize)]
pub struct CupRecord {
    pub id: RawId,
    pub n: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_from_document_requires_pack_data() {
        let result = DataPack::from_document(&json!({"Other": {}}), "test");
        assert!(matches!(result, Err(AppError::MissingPackData { .. })));

        let result = DataPack::from_document(&json!({"PackData": null}), "test");
        assert!(matches!(result, Err(AppError::MissingPackData { .. })));

        let result = DataPack::from_document(&json!({"PackData": 12}), "test");
        assert!(matches!(result, Err(AppError::MissingPackData { .. })));
    }

    #[test]
    fn test_from_document_keeps_sections_raw() {
        let document = json!({
            "PackData": {
                "ClubData": {"C": [{"id": "1", "n": "A"}]},
                "LeagueData": "not a table"
            }
        });
        let pack = DataPack::from_document(&document, "test").unwrap();
        assert!(pack.pack_data.club_data.is_some());
        assert_eq!(pack.pack_data.league_data, Some(json!("not a table")));
        assert!(pack.pack_data.player_data.is_none());
        assert!(pack.meta.is_none());
    }

    #[test]
    fn test_from_document_reads_meta() {
        let document = json!({
            "PackData": {},
            "meta": {
                "lastUpdate": "2025-03-02T02:00:00.000Z",
                "source": "https://example.com/pack.json",
                "version": "3.0"
            }
        });
        let pack = DataPack::from_document(&document, "test").unwrap();
        let meta = pack.meta.unwrap();
        assert_eq!(
            meta.last_update,
            Utc.with_ymd_and_hms(2025, 3, 2, 2, 0, 0).unwrap()
        );
        assert_eq!(meta.source, "https://example.com/pack.json");
    }

    #[test]
    fn test_from_document_ignores_broken_meta() {
        let document = json!({
            "PackData": {},
            "meta": {"lastUpdate": "yesterday"}
        });
        let pack = DataPack::from_document(&document, "test").unwrap();
        assert!(pack.meta.is_none());
    }

    #[test]
    fn test_raw_id_parsing() {
        assert_eq!(RawId::Text("2180".to_string()).as_i64(), Some(2180));
        assert_eq!(RawId::Text(" 42 ".to_string()).as_i64(), Some(42));
        assert_eq!(RawId::Number(7).as_i64(), Some(7));
        assert_eq!(RawId::Text("abc".to_string()).as_i64(), None);
        assert_eq!(RawId::Text("".to_string()).as_key(), None);
        assert_eq!(RawId::Number(3).as_key(), Some("3".to_string()));
    }

    #[test]
    fn test_snapshot_meta_serialization() {
        let meta = SnapshotMeta::new(
            Utc.with_ymd_and_hms(2025, 1, 5, 2, 0, 0).unwrap(),
            "https://example.com/pack.json",
        );
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["version"], "3.0");
        assert_eq!(value["source"], "https://example.com/pack.json");
        assert!(value["lastUpdate"].as_str().unwrap().starts_with("2025-01-05T02:00:00"));
    }
}
