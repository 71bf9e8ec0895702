use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use crate::mappings::models::{DataPack, SnapshotMeta};

/// Builds data pack documents in the community pack layout for tests
#[derive(Debug, Clone, Default)]
pub struct DataPackBuilder {
    clubs: Vec<Value>,
    players: Vec<Value>,
    leagues: Vec<Value>,
    stadiums: Vec<Value>,
    cups: Vec<Value>,
    meta: Option<SnapshotMeta>,
}

impl DataPackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `{id, n}` club entry
    pub fn club(mut self, id: &str, name: &str) -> Self {
        self.clubs.push(json!({"id": id, "n": name}));
        self
    }

    /// Adds an arbitrary club entry, typically a malformed one
    pub fn raw_club(mut self, entry: Value) -> Self {
        self.clubs.push(entry);
        self
    }

    /// Adds a `{id, f, s}` player entry; `None` leaves the field out
    pub fn player(mut self, id: &str, first: Option<&str>, last: Option<&str>) -> Self {
        let mut entry = Map::new();
        entry.insert("id".to_string(), json!(id));
        if let Some(first) = first {
            entry.insert("f".to_string(), json!(first));
        }
        if let Some(last) = last {
            entry.insert("s".to_string(), json!(last));
        }
        self.players.push(Value::Object(entry));
        self
    }

    /// Adds a `{c, d, n}` league entry; `division` is the pack's 1-based number
    pub fn league(mut self, country_code: &str, division: u32, name: &str) -> Self {
        self.leagues
            .push(json!({"c": country_code, "d": division, "n": name}));
        self
    }

    pub fn stadium(mut self, id: &str, name: &str) -> Self {
        self.stadiums.push(json!({"id": id, "n": name}));
        self
    }

    pub fn cup(mut self, id: &str, name: &str) -> Self {
        self.cups.push(json!({"id": id, "n": name}));
        self
    }

    /// Attaches snapshot metadata with the given update time
    pub fn last_update(mut self, last_update: DateTime<Utc>) -> Self {
        self.meta = Some(SnapshotMeta::new(last_update, "https://example.com/pack.json"));
        self
    }

    /// Builds the JSON document. Empty tables are left out entirely.
    pub fn build_document(&self) -> Value {
        let mut pack = Map::new();
        let sections = [
            ("ClubData", "C", &self.clubs),
            ("PlayerData", "P", &self.players),
            ("LeagueData", "L", &self.leagues),
            ("StadiumData", "S", &self.stadiums),
            ("CupData", "C", &self.cups),
        ];
        for (section, list_key, entries) in sections {
            if !entries.is_empty() {
                let mut table = Map::new();
                table.insert(list_key.to_string(), Value::Array(entries.clone()));
                pack.insert(section.to_string(), Value::Object(table));
            }
        }

        let mut document = Map::new();
        document.insert("PackData".to_string(), Value::Object(pack));
        if let Some(meta) = &self.meta {
            document.insert(
                "meta".to_string(),
                json!({
                    "lastUpdate": meta.last_update.to_rfc3339(),
                    "source": meta.source,
                    "version": meta.version,
                }),
            );
        }
        Value::Object(document)
    }

    /// Builds the parsed pack as the store consumes it
    pub fn build_pack(&self) -> DataPack {
        DataPack::from_document(&self.build_document(), "test")
            .unwrap_or_else(|e| panic!("builder produced an invalid pack: {e}"))
    }
}

/// Consistency checks for persisted snapshot documents
pub struct PropertyTesting;

impl PropertyTesting {
    /// Validates that a snapshot document has a `PackData` object and complete metadata
    pub fn validate_snapshot_document(document: &Value) -> Result<(), String> {
        if !document.get("PackData").is_some_and(Value::is_object) {
            return Err("Snapshot has no PackData object".to_string());
        }

        let meta = document
            .get("meta")
            .and_then(Value::as_object)
            .ok_or_else(|| "Snapshot has no meta object".to_string())?;

        for field in ["lastUpdate", "source", "version"] {
            match meta.get(field).and_then(Value::as_str) {
                Some(value) if !value.is_empty() => {}
                _ => return Err(format!("Snapshot meta field '{field}' is missing or empty")),
            }
        }

        if let Some(last_update) = meta.get("lastUpdate").and_then(Value::as_str)
            && DateTime::parse_from_rfc3339(last_update).is_err()
        {
            return Err(format!("Snapshot lastUpdate '{last_update}' is not ISO-8601"));
        }

        Ok(())
    }
}
