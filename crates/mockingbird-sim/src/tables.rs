//! Inbound tables and their schema checks.
//!
//! Scenario collaborators hand over plain JSON records. Each record's field
//! set must match the expected set exactly before it is decoded into a typed
//! entity.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use mockingbird_domain::{ActionRequest, Aircraft, Fix, SectorDefinition};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, SimError};

/// One row of an inbound table.
pub type Record = serde_json::Map<String, Value>;

pub const FIX_FIELDS: &[&str] = &["name", "lat", "lon"];

pub const SECTOR_FIELDS: &[&str] = &["agent", "vols"];

pub const VOLUME_FIELDS: &[&str] = &["min", "max", "boundary"];

pub const AIRCRAFT_FIELDS: &[&str] = &[
    "callsign",
    "type",
    "agent",
    "bay",
    "lat",
    "lon",
    "flight_level",
    "target_flight_level",
    "heading",
    "target_heading",
    "speed",
    "target_speed",
    "rise",
    "max_rise_rate",
    "turn",
    "max_turn_rate",
    "acceleration",
    "max_acceleration",
    "route",
];

pub const ACTION_FIELDS: &[&str] = &["time", "agent", "callsign", "kind", "subkind", "value"];

/// Everything needed to build an initial simulation state.
#[derive(Debug, Clone)]
pub struct ScenarioTables {
    pub start_time: NaiveDateTime,
    pub bay_names: Vec<String>,
    pub fixes: Vec<Record>,
    /// Sector name → `{agent, vols}`
    pub sectors: Record,
    pub aircraft: Vec<Record>,
    pub actions: Vec<Record>,
}

/// Compare a record's fields with the expected set.
///
/// # Errors
///
/// `SchemaMismatch` naming the missing and unexpected fields.
pub fn check_fields(table: &str, record: &Record, expected: &[&str]) -> Result<()> {
    let expected: BTreeSet<&str> = expected.iter().copied().collect();
    let given: BTreeSet<&str> = record.keys().map(String::as_str).collect();
    if given == expected {
        return Ok(());
    }

    Err(SimError::SchemaMismatch {
        table: table.to_string(),
        missing: expected.difference(&given).map(ToString::to_string).collect(),
        unexpected: given.difference(&expected).map(ToString::to_string).collect(),
    })
}

/// Check and decode every record of a table.
///
/// # Errors
///
/// `SchemaMismatch` on the first record with the wrong field set, `Decode`
/// if a field has the wrong type.
pub fn decode_records<T: DeserializeOwned>(
    table: &str,
    records: Vec<Record>,
    expected: &[&str],
) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|record| {
            check_fields(table, &record, expected)?;
            Ok(serde_json::from_value(Value::Object(record))?)
        })
        .collect()
}

pub fn decode_fixes(records: Vec<Record>) -> Result<Vec<Fix>> {
    decode_records("fixes", records, FIX_FIELDS)
}

pub fn decode_aircraft(records: Vec<Record>) -> Result<Vec<Aircraft>> {
    decode_records("aircraft", records, AIRCRAFT_FIELDS)
}

pub fn decode_actions(records: Vec<Record>) -> Result<Vec<ActionRequest>> {
    decode_records("actions", records, ACTION_FIELDS)
}

/// Decode the sector table, checking both sector and volume field sets.
///
/// # Errors
///
/// `SchemaMismatch` for a sector or volume with the wrong fields,
/// `InvalidArgument` if an entry is not an object, `Decode` for wrong types.
pub fn decode_sectors(sectors: Record) -> Result<Vec<(String, SectorDefinition)>> {
    sectors
        .into_iter()
        .map(|(name, value)| {
            let Value::Object(sector) = value else {
                return Err(SimError::InvalidArgument(format!(
                    "sector '{name}' must be an object"
                )));
            };
            check_fields("sectors", &sector, SECTOR_FIELDS)?;
            if let Some(Value::Array(vols)) = sector.get("vols") {
                for vol in vols {
                    match vol {
                        Value::Object(vol) => check_fields("volumes", vol, VOLUME_FIELDS)?,
                        _ => {
                            return Err(SimError::InvalidArgument(format!(
                                "volumes of sector '{name}' must be objects"
                            )));
                        }
                    }
                }
            }
            let definition = serde_json::from_value(Value::Object(sector))?;
            Ok((name, definition))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_matching_fields() {
        let fix = record(json!({"name": "ABC", "lat": 51.0, "lon": -1.0}));
        assert!(check_fields("fixes", &fix, FIX_FIELDS).is_ok());
    }

    #[test]
    fn test_mismatch_names_fields() {
        let fix = record(json!({"name": "ABC", "latitude": 51.0, "lon": -1.0}));
        match check_fields("fixes", &fix, FIX_FIELDS).unwrap_err() {
            SimError::SchemaMismatch {
                table,
                missing,
                unexpected,
            } => {
                assert_eq!(table, "fixes");
                assert_eq!(missing, ["lat"]);
                assert_eq!(unexpected, ["latitude"]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_fixes() {
        let fixes = decode_fixes(vec![
            record(json!({"name": "ABC", "lat": 51.0, "lon": -1.0})),
            record(json!({"name": "DEF", "lat": 52.0, "lon": 0.5})),
        ])
        .unwrap();
        assert_eq!(fixes[1], Fix::new("DEF", 52.0, 0.5));
    }

    #[test]
    fn test_decode_wrong_type() {
        let err = decode_fixes(vec![record(json!({"name": "ABC", "lat": "north", "lon": -1.0}))])
            .unwrap_err();
        assert!(matches!(err, SimError::Decode(_)));
    }

    #[test]
    fn test_decode_actions() {
        let requests = decode_actions(vec![record(json!({
            "time": "2023-06-01 12:00:02", "agent": "EXC", "callsign": "BAW123",
            "kind": "heading", "subkind": "relative", "value": -30
        }))])
        .unwrap();
        assert_eq!(requests[0].value.as_f64(), Some(-30.0));
    }

    #[test]
    fn test_decode_sectors_checks_volumes() {
        let sectors = record(json!({
            "LON": {"agent": "EXC", "vols": [{"min": 0, "max": 245, "boundary": ["A", "B", "C"]}]}
        }));
        let decoded = decode_sectors(sectors).unwrap();
        assert_eq!(decoded[0].0, "LON");
        assert_eq!(decoded[0].1.vols[0].max, 245.0);

        let bad = record(json!({
            "LON": {"agent": "EXC", "vols": [{"min": 0, "top": 245, "boundary": ["A", "B", "C"]}]}
        }));
        match decode_sectors(bad).unwrap_err() {
            SimError::SchemaMismatch { table, missing, unexpected } => {
                assert_eq!(table, "volumes");
                assert_eq!(missing, ["max"]);
                assert_eq!(unexpected, ["top"]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }
}
