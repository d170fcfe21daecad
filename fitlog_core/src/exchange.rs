//! Export/import exchange format for backup and restore.
//!
//! Exports produce a versioned transport payload; imports validate the
//! payload structurally, filter out malformed records, and hand the
//! survivors to the store for id-based merge deduplication. A CSV report
//! writer is also provided for flat, spreadsheet-friendly output (export
//! only, not an import format).

use crate::{Error, Exercise, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format version tag stamped into every export
pub const EXPORT_VERSION: &str = "1.0";

/// The versioned export/import document
///
/// On import the `version` field is accepted regardless of value; only the
/// `exercises` list is validated.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportPayload {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
}

/// Serialize the full collection to the transport payload, verbatim
pub fn export_json(exercises: &[Exercise], now: DateTime<Utc>) -> Result<String> {
    let payload = TransportPayload {
        version: EXPORT_VERSION.to_string(),
        export_date: now,
        exercises: exercises.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Parse a transport payload into structurally valid records
///
/// Fails with [`Error::ImportFormat`] when the input is not JSON or lacks
/// a list-shaped `exercises` field, and with [`Error::ImportEmpty`] when
/// no record survives validation. Individual malformed records are
/// dropped with a warning rather than failing the whole import.
pub fn parse_payload(payload: &str) -> Result<Vec<Exercise>> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| Error::ImportFormat(format!("invalid JSON: {}", e)))?;

    let entries = value
        .get("exercises")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::ImportFormat("exercises array not found".into()))?;

    let mut exercises = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<Exercise>(entry.clone()) {
            Ok(exercise) if is_structurally_valid(&exercise) => exercises.push(exercise),
            Ok(exercise) => {
                tracing::warn!("Dropping structurally invalid record {}", exercise.id);
            }
            Err(e) => {
                tracing::warn!("Dropping unparseable record: {}", e);
            }
        }
    }

    if exercises.is_empty() {
        return Err(Error::ImportEmpty);
    }

    tracing::debug!("Parsed {} valid records from payload", exercises.len());
    Ok(exercises)
}

/// Structural checks beyond what deserialization already enforces
///
/// Enum membership and date shape are checked by serde; what remains is a
/// non-empty name and a positive duration.
fn is_structurally_valid(exercise: &Exercise) -> bool {
    !exercise.name.trim().is_empty() && exercise.duration > 0
}

/// A row in the CSV report
#[derive(Debug, Serialize)]
struct CsvRow {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    duration: u32,
    intensity_level: String,
    calories_burned: Option<u32>,
    date: String,
    notes: Option<String>,
}

impl From<&Exercise> for CsvRow {
    fn from(exercise: &Exercise) -> Self {
        CsvRow {
            id: exercise.id.to_string(),
            name: exercise.name.clone(),
            kind: exercise.kind.as_str().to_string(),
            duration: exercise.duration,
            intensity_level: exercise.intensity_level.as_str().to_string(),
            calories_burned: exercise.calories_burned,
            date: exercise.date.to_rfc3339(),
            notes: exercise.notes.clone(),
        }
    }
}

/// Write the collection as a flat CSV report with a header row
pub fn write_csv<W: std::io::Write>(exercises: &[Exercise], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for exercise in exercises {
        csv_writer.serialize(CsvRow::from(exercise))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExerciseDraft, ExerciseStore, ExerciseType, IntensityLevel, JsonSlot};
    use uuid::Uuid;

    fn draft(name: &str) -> ExerciseDraft {
        ExerciseDraft {
            name: name.into(),
            kind: ExerciseType::Cycling,
            duration: 40,
            intensity_level: IntensityLevel::High,
            calories_burned: Some(320),
            date: Utc::now(),
            notes: None,
        }
    }

    fn record_json(id: Uuid, name: &str, duration: u32) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "type": "running",
            "duration": duration,
            "intensityLevel": "moderate",
            "date": "2024-01-03T08:00:00Z",
            "createdAt": "2024-01-03T08:05:00Z",
            "updatedAt": "2024-01-03T08:05:00Z",
        })
    }

    fn payload_with(records: Vec<serde_json::Value>) -> String {
        serde_json::json!({
            "version": "1.0",
            "exportDate": "2024-01-04T00:00:00Z",
            "exercises": records,
        })
        .to_string()
    }

    #[test]
    fn test_export_import_round_trip_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ExerciseStore::open(JsonSlot::new(dir.path().join("exercises.json")));
        store.create(draft("Hill ride")).unwrap();
        store.create(draft("Recovery spin")).unwrap();

        let exported = store.export(Utc::now()).unwrap();
        let imported = store.import(&exported).unwrap();

        assert_eq!(imported, 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_merge_deduplicates_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ExerciseStore::open(JsonSlot::new(dir.path().join("exercises.json")));
        let existing = store.create(draft("Existing")).unwrap();

        let novel_id = Uuid::new_v4();
        let payload = payload_with(vec![
            record_json(existing.id, "Duplicate", 30),
            record_json(novel_id, "Novel", 30),
        ]);

        let imported = store.import(&payload).unwrap();
        assert_eq!(imported, 1);
        assert_eq!(store.len(), 2);
        // The record sharing an id was dropped, not overwritten
        assert_eq!(store.get(existing.id).unwrap().name, "Existing");
        assert_eq!(store.get(novel_id).unwrap().name, "Novel");
    }

    #[test]
    fn test_import_preserves_foreign_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ExerciseStore::open(JsonSlot::new(dir.path().join("exercises.json")));

        let id = Uuid::new_v4();
        store.import(&payload_with(vec![record_json(id, "Imported", 30)])).unwrap();

        let record = store.get(id).unwrap();
        assert_eq!(record.created_at.to_rfc3339(), "2024-01-03T08:05:00+00:00");
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_malformed_payload_is_format_error() {
        assert!(matches!(
            parse_payload("not json at all"),
            Err(Error::ImportFormat(_))
        ));
        assert!(matches!(
            parse_payload(r#"{"version": "1.0"}"#),
            Err(Error::ImportFormat(_))
        ));
        assert!(matches!(
            parse_payload(r#"{"exercises": "nope"}"#),
            Err(Error::ImportFormat(_))
        ));
    }

    #[test]
    fn test_malformed_payload_leaves_store_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ExerciseStore::open(JsonSlot::new(dir.path().join("exercises.json")));
        store.create(draft("Kept")).unwrap();

        assert!(store.import("{broken").is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalid_records_filtered_valid_kept() {
        let valid_id = Uuid::new_v4();
        let payload = payload_with(vec![
            record_json(valid_id, "Valid", 30),
            record_json(Uuid::new_v4(), "", 30),           // empty name
            record_json(Uuid::new_v4(), "Zero", 0),        // non-positive duration
            serde_json::json!({"name": "missing fields"}), // unparseable
        ]);

        let parsed = parse_payload(&payload).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, valid_id);
    }

    #[test]
    fn test_all_invalid_is_empty_error() {
        let payload = payload_with(vec![record_json(Uuid::new_v4(), "", 30)]);
        assert!(matches!(parse_payload(&payload), Err(Error::ImportEmpty)));

        let payload = payload_with(vec![]);
        assert!(matches!(parse_payload(&payload), Err(Error::ImportEmpty)));
    }

    #[test]
    fn test_version_field_accepted_regardless_of_value() {
        let payload = serde_json::json!({
            "version": "999.0",
            "exercises": [record_json(Uuid::new_v4(), "Future", 30)],
        })
        .to_string();

        assert_eq!(parse_payload(&payload).unwrap().len(), 1);
    }

    #[test]
    fn test_export_payload_shape() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ExerciseStore::open(JsonSlot::new(dir.path().join("exercises.json")));
        store.create(draft("Ride")).unwrap();

        let exported = store.export(Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();

        assert_eq!(value["version"], EXPORT_VERSION);
        assert!(value.get("exportDate").is_some());
        assert_eq!(value["exercises"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_csv_report_has_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ExerciseStore::open(JsonSlot::new(dir.path().join("exercises.json")));
        store.create(draft("Ride")).unwrap();

        let mut out = Vec::new();
        write_csv(&store.list(None), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("id,name,type,duration"));
        assert!(text.contains("Ride"));
        assert!(text.contains("cycling"));
    }
}
