//! # Mockingbird - Domain Model
//!
//! Value types and entities shared by the simulation engine and its
//! collaborators: navigational fixes, aircraft records, operator actions and
//! the raw sector definitions they are loaded from. These types are the
//! single source of truth for field names across loading, simulation and
//! snapshot rendering.

use std::fmt;

use chrono::{NaiveDateTime, ParseError};
use serde::{Deserialize, Serialize};

/// Format of every time string supplied by scenario files and operators.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used when rendering simulated time, which carries sub-second ticks.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Parse a `YYYY-MM-DD HH:MM:SS` string into a timestamp.
///
/// # Errors
///
/// Returns the underlying chrono error when the string does not match
/// [`TIME_FORMAT`].
pub fn parse_time(value: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), TIME_FORMAT)
}

/// Render a timestamp with millisecond precision.
#[must_use]
pub fn format_time(time: &NaiveDateTime) -> String {
    time.format(DISPLAY_TIME_FORMAT).to_string()
}

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Named navigational point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub name: String,
    /// Degrees North/South
    pub lat: f64,
    /// Degrees East/West
    pub lon: f64,
}

impl Fix {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// Raw altitude-banded volume, bounded by a ring of fix names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeDefinition {
    pub min: f64,
    pub max: f64,
    pub boundary: Vec<String>,
}

/// Raw sector definition as supplied by a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorDefinition {
    pub agent: String,
    pub vols: Vec<VolumeDefinition>,
}

// =============================================================================
// ACTION ENUMS
// =============================================================================

/// Which aircraft property an action addresses.
///
/// Unrecognised names are preserved in `Other` so a typo in a scenario is
/// reported by name when the action is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    FlightLevel,
    Heading,
    Speed,
    Bay,
    SelectAircraft,
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::FlightLevel => "flight_level",
            Self::Heading => "heading",
            Self::Speed => "speed",
            Self::Bay => "bay",
            Self::SelectAircraft => "select_aircraft",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "flight_level" => Self::FlightLevel,
            "heading" => Self::Heading,
            "speed" => Self::Speed,
            "bay" => Self::Bay,
            "select_aircraft" => Self::SelectAircraft,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ActionKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ActionKind> for String {
    fn from(value: ActionKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an action's value is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionSubkind {
    Absolute,
    Relative,
    Move,
    Other(String),
}

impl ActionSubkind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Absolute => "absolute",
            Self::Relative => "relative",
            Self::Move => "move",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ActionSubkind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "absolute" => Self::Absolute,
            "relative" => Self::Relative,
            "move" => Self::Move,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ActionSubkind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ActionSubkind> for String {
    fn from(value: ActionSubkind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActionSubkind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action payload: a number for target changes, a name for bay moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionValue {
    Number(f64),
    Text(String),
}

impl ActionValue {
    /// Numeric view of the value. Text that parses as a number counts.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Textual view of the value.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<f64> for ActionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ActionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for ActionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// Aircraft entity - one flying machine and its commanded targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub callsign: String,
    /// Airframe type
    #[serde(rename = "type")]
    pub aircraft_type: String,
    /// Agent controlling the aircraft
    pub agent: String,
    /// Bay holding the aircraft strip
    pub bay: String,

    // Position
    pub lat: f64,
    pub lon: f64,
    pub flight_level: f64,
    pub target_flight_level: f64,

    /// Degrees clockwise from North, in [0, 360)
    pub heading: f64,
    pub target_heading: f64,

    /// Knots
    pub speed: f64,
    pub target_speed: f64,

    // Rates, recomputed every tick
    /// Flight levels per second (signed)
    pub rise: f64,
    /// Degrees clockwise per second (signed)
    pub turn: f64,
    /// Knots per second (signed)
    pub acceleration: f64,

    // Physical limits
    pub max_rise_rate: f64,
    pub max_turn_rate: f64,
    pub max_acceleration: f64,

    /// Fixes to route through
    pub route: Vec<String>,
}

/// Action entity - an operator command due at a simulated instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub due_time: NaiveDateTime,
    /// Agent issuing the command
    pub agent: String,
    pub callsign: String,
    pub kind: ActionKind,
    pub subkind: ActionSubkind,
    pub value: ActionValue,
}

/// Action as supplied from outside, with its time still a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub time: String,
    pub agent: String,
    pub callsign: String,
    pub kind: ActionKind,
    pub subkind: ActionSubkind,
    pub value: ActionValue,
}

impl ActionRequest {
    /// Convert into an [`Action`], parsing the command time.
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error for a malformed time string.
    pub fn into_action(self) -> Result<Action, ParseError> {
        Ok(Action {
            due_time: parse_time(&self.time)?,
            agent: self.agent,
            callsign: self.callsign,
            kind: self.kind,
            subkind: self.subkind,
            value: self.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        let time = parse_time("2023-06-01 12:30:05").unwrap();
        assert_eq!(time.format(TIME_FORMAT).to_string(), "2023-06-01 12:30:05");
        assert!(parse_time("2023-06-01T12:30:05").is_err());
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn test_action_kind_names() {
        assert_eq!(ActionKind::from("flight_level"), ActionKind::FlightLevel);
        assert_eq!(ActionKind::from("select_aircraft"), ActionKind::SelectAircraft);
        assert_eq!(
            ActionKind::from("flightlevel"),
            ActionKind::Other("flightlevel".to_string())
        );
        assert_eq!(ActionSubkind::from("move"), ActionSubkind::Move);
        assert_eq!(ActionKind::Other("squawk".into()).to_string(), "squawk");
    }

    #[test]
    fn test_action_request_from_json() {
        let request: ActionRequest = serde_json::from_str(
            r#"{"time": "2023-06-01 12:00:02", "agent": "EXC", "callsign": "BAW123",
                "kind": "flight_level", "subkind": "absolute", "value": 400}"#,
        )
        .unwrap();
        assert_eq!(request.kind, ActionKind::FlightLevel);
        assert_eq!(request.value.as_f64(), Some(400.0));

        let action = request.into_action().unwrap();
        assert_eq!(action.due_time, parse_time("2023-06-01 12:00:02").unwrap());
    }

    #[test]
    fn test_action_value_views() {
        assert_eq!(ActionValue::from("250").as_f64(), Some(250.0));
        assert_eq!(ActionValue::from("INCOMM").as_f64(), None);
        assert_eq!(ActionValue::from("INCOMM").as_text(), "INCOMM");
    }

    #[test]
    fn test_aircraft_type_field_name() {
        let json = serde_json::json!({
            "callsign": "BAW123", "type": "A320", "agent": "EXC", "bay": "INCOMM",
            "lat": 51.0, "lon": -1.0, "flight_level": 350.0, "target_flight_level": 350.0,
            "heading": 90.0, "target_heading": 90.0, "speed": 250.0, "target_speed": 250.0,
            "rise": 0.0, "turn": 0.0, "acceleration": 0.0,
            "max_rise_rate": 1.0, "max_turn_rate": 3.0, "max_acceleration": 1.0,
            "route": ["ABC", "DEF"]
        });
        let aircraft: Aircraft = serde_json::from_value(json).unwrap();
        assert_eq!(aircraft.aircraft_type, "A320");
        assert_eq!(aircraft.route.len(), 2);
    }
}
