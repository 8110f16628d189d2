//! Time-ordered action queue and command dispatch.
//!
//! Pending actions are kept sorted by due time, ties in arrival order. Each
//! tick drains the actions due before the end of its window; once taken an
//! action moves to the applied or rejected history and is never re-applied.

use chrono::NaiveDateTime;
use mockingbird_domain::{Action, ActionKind, ActionRequest, ActionSubkind, Aircraft};
use serde::Serialize;

use crate::control::normalize_heading;
use crate::error::{Result, SimError};
use crate::fleet::Fleet;

/// An action that failed dispatch, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedAction {
    pub action: Action,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    pending: Vec<Action>,
    applied: Vec<Action>,
    rejected: Vec<RejectedAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one action after any already queued for the same instant.
    pub fn push(&mut self, action: Action) {
        let at = self
            .pending
            .partition_point(|queued| queued.due_time <= action.due_time);
        self.pending.insert(at, action);
    }

    /// Parse and queue a batch of externally supplied actions. The batch is
    /// all-or-nothing: nothing is queued if any time string is malformed.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed time string.
    pub fn enqueue(&mut self, requests: impl IntoIterator<Item = ActionRequest>) -> Result<usize> {
        let actions = requests
            .into_iter()
            .map(|request| request.into_action().map_err(SimError::from))
            .collect::<Result<Vec<_>>>()?;

        let count = actions.len();
        for action in actions {
            self.push(action);
        }
        Ok(count)
    }

    /// Remove and return every pending action due strictly before `end`.
    pub fn take_due(&mut self, end: NaiveDateTime) -> Vec<Action> {
        let split = self.pending.partition_point(|action| action.due_time < end);
        self.pending.drain(..split).collect()
    }

    pub(crate) fn record_applied(&mut self, action: Action) {
        self.applied.push(action);
    }

    pub(crate) fn record_rejected(&mut self, action: Action, err: &SimError) {
        self.rejected.push(RejectedAction {
            action,
            reason: err.to_string(),
        });
    }

    pub fn pending(&self) -> &[Action] {
        &self.pending
    }

    pub fn applied(&self) -> &[Action] {
        &self.applied
    }

    pub fn rejected(&self) -> &[RejectedAction] {
        &self.rejected
    }
}

/// Apply one action to the fleet.
///
/// # Errors
///
/// - `UnsupportedAction` for a `(kind, subkind)` pair with no dispatch rule
/// - `NotFound` if the action names an aircraft that does not exist
/// - `InvalidArgument` for a non-numeric target value or an unknown bay
pub fn dispatch(action: &Action, fleet: &mut Fleet, bay_names: &[String]) -> Result<()> {
    match (&action.kind, &action.subkind) {
        // UI-only selection signal
        (ActionKind::SelectAircraft, _) => Ok(()),

        (
            ActionKind::FlightLevel | ActionKind::Heading | ActionKind::Speed,
            ActionSubkind::Absolute | ActionSubkind::Relative,
        ) => {
            let value = action
                .value
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    SimError::InvalidArgument(format!(
                        "{} action for '{}' needs a numeric value, got '{}'",
                        action.kind, action.callsign, action.value
                    ))
                })?;
            let aircraft = fleet.get_mut(&action.callsign)?;
            set_target(aircraft, &action.kind, &action.subkind, value);
            Ok(())
        }

        (ActionKind::Bay, ActionSubkind::Move) => {
            let bay = action.value.as_text();
            if !bay_names.contains(&bay) {
                return Err(SimError::InvalidArgument(format!(
                    "unknown bay '{bay}' for aircraft '{}'",
                    action.callsign
                )));
            }
            fleet.get_mut(&action.callsign)?.bay = bay;
            Ok(())
        }

        (kind, subkind) => Err(SimError::UnsupportedAction {
            kind: kind.to_string(),
            subkind: subkind.to_string(),
            callsign: action.callsign.clone(),
        }),
    }
}

fn set_target(aircraft: &mut Aircraft, kind: &ActionKind, subkind: &ActionSubkind, value: f64) {
    let target = match kind {
        ActionKind::FlightLevel => &mut aircraft.target_flight_level,
        ActionKind::Heading => &mut aircraft.target_heading,
        ActionKind::Speed => &mut aircraft.target_speed,
        _ => return,
    };

    *target = match subkind {
        ActionSubkind::Relative => *target + value,
        _ => value,
    };

    if *kind == ActionKind::Heading {
        *target = normalize_heading(*target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::tests::aircraft;
    use mockingbird_domain::{parse_time, ActionValue};

    fn bays() -> Vec<String> {
        vec!["INCOMM".to_string(), "OUTCOMM".to_string()]
    }

    fn fleet() -> Fleet {
        let mut fleet = Fleet::new();
        fleet.add(aircraft("BAW123")).unwrap();
        fleet
    }

    fn action(time: &str, kind: &str, subkind: &str, value: ActionValue) -> Action {
        Action {
            due_time: parse_time(time).unwrap(),
            agent: "EXC".to_string(),
            callsign: "BAW123".to_string(),
            kind: kind.into(),
            subkind: subkind.into(),
            value,
        }
    }

    fn at(kind: &str, subkind: &str, value: ActionValue) -> Action {
        action("2023-06-01 12:00:00", kind, subkind, value)
    }

    #[test]
    fn test_absolute_targets() {
        let mut fleet = fleet();
        dispatch(&at("flight_level", "absolute", 400.0.into()), &mut fleet, &bays()).unwrap();
        dispatch(&at("speed", "absolute", 300.0.into()), &mut fleet, &bays()).unwrap();
        dispatch(&at("heading", "absolute", 270.0.into()), &mut fleet, &bays()).unwrap();

        let a = fleet.get("BAW123").unwrap();
        assert_eq!(a.target_flight_level, 400.0);
        assert_eq!(a.target_speed, 300.0);
        assert_eq!(a.target_heading, 270.0);
        // Only targets change on dispatch
        assert_eq!(a.flight_level, 350.0);
    }

    #[test]
    fn test_relative_targets_accumulate() {
        let mut fleet = fleet();
        dispatch(&at("flight_level", "relative", (-20.0).into()), &mut fleet, &bays()).unwrap();
        dispatch(&at("flight_level", "relative", (-20.0).into()), &mut fleet, &bays()).unwrap();
        dispatch(&at("speed", "relative", "15".into()), &mut fleet, &bays()).unwrap();

        let a = fleet.get("BAW123").unwrap();
        assert_eq!(a.target_flight_level, 310.0);
        assert_eq!(a.target_speed, 265.0);
    }

    #[test]
    fn test_relative_heading_wraps_negative() {
        let mut fleet = fleet();
        dispatch(&at("heading", "relative", (-120.0).into()), &mut fleet, &bays()).unwrap();
        assert_eq!(fleet.get("BAW123").unwrap().target_heading, 330.0);

        dispatch(&at("heading", "relative", 40.0.into()), &mut fleet, &bays()).unwrap();
        assert_eq!(fleet.get("BAW123").unwrap().target_heading, 10.0);
    }

    #[test]
    fn test_bay_move() {
        let mut fleet = fleet();
        dispatch(&at("bay", "move", "OUTCOMM".into()), &mut fleet, &bays()).unwrap();
        assert_eq!(fleet.get("BAW123").unwrap().bay, "OUTCOMM");

        let err = dispatch(&at("bay", "move", "NOWHERE".into()), &mut fleet, &bays()).unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(_)));
        assert_eq!(fleet.get("BAW123").unwrap().bay, "OUTCOMM");
    }

    #[test]
    fn test_select_aircraft_has_no_effect() {
        let mut fleet = fleet();
        let before = fleet.get("BAW123").unwrap().clone();
        dispatch(&at("select_aircraft", "absolute", "".into()), &mut fleet, &bays()).unwrap();
        assert_eq!(fleet.get("BAW123").unwrap(), &before);
    }

    #[test]
    fn test_unknown_pairs_are_unsupported() {
        let mut fleet = fleet();
        for (kind, subkind) in [
            ("bay", "absolute"),
            ("heading", "move"),
            ("squawk", "absolute"),
            ("flight_level", "relativ"),
        ] {
            let err = dispatch(&at(kind, subkind, 1.0.into()), &mut fleet, &bays()).unwrap_err();
            match err {
                SimError::UnsupportedAction {
                    kind: k,
                    subkind: s,
                    callsign,
                } => {
                    assert_eq!((k.as_str(), s.as_str()), (kind, subkind));
                    assert_eq!(callsign, "BAW123");
                }
                other => panic!("expected UnsupportedAction, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_aircraft() {
        let mut fleet = Fleet::new();
        let err = dispatch(&at("speed", "absolute", 200.0.into()), &mut fleet, &bays()).unwrap_err();
        assert!(matches!(err, SimError::NotFound { .. }));
    }

    #[test]
    fn test_non_numeric_value() {
        let mut fleet = fleet();
        let err = dispatch(&at("speed", "absolute", "fast".into()), &mut fleet, &bays()).unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(_)));
    }

    #[test]
    fn test_queue_orders_by_due_time_then_arrival() {
        let mut queue = ActionQueue::new();
        queue.push(action("2023-06-01 12:00:05", "speed", "absolute", 1.0.into()));
        queue.push(action("2023-06-01 12:00:01", "speed", "absolute", 2.0.into()));
        queue.push(action("2023-06-01 12:00:05", "speed", "absolute", 3.0.into()));
        queue.push(action("2023-06-01 12:00:03", "speed", "absolute", 4.0.into()));

        let values: Vec<_> = queue.pending().iter().filter_map(|a| a.value.as_f64()).collect();
        assert_eq!(values, [2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn test_take_due_is_half_open() {
        let mut queue = ActionQueue::new();
        queue.push(action("2023-06-01 12:00:01", "speed", "absolute", 1.0.into()));
        queue.push(action("2023-06-01 12:00:02", "speed", "absolute", 2.0.into()));

        let due = queue.take_due(parse_time("2023-06-01 12:00:02").unwrap());
        assert_eq!(due.len(), 1);
        assert_eq!(queue.pending().len(), 1);

        let due = queue.take_due(parse_time("2023-06-01 12:00:03").unwrap());
        assert_eq!(due.len(), 1);
        assert!(queue.pending().is_empty());
        assert!(queue.take_due(parse_time("2023-06-01 13:00:00").unwrap()).is_empty());
    }

    #[test]
    fn test_enqueue_rejects_malformed_batch() {
        let request = |time: &str| ActionRequest {
            time: time.to_string(),
            agent: "EXC".into(),
            callsign: "BAW123".into(),
            kind: ActionKind::Speed,
            subkind: ActionSubkind::Absolute,
            value: 200.0.into(),
        };

        let mut queue = ActionQueue::new();
        let err = queue
            .enqueue(vec![request("2023-06-01 12:00:01"), request("12:00:02")])
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(_)));
        assert!(queue.pending().is_empty());

        assert_eq!(queue.enqueue(vec![request("2023-06-01 12:00:01")]).unwrap(), 1);
        assert_eq!(queue.enqueue(Vec::new()).unwrap(), 0);
        assert_eq!(queue.pending().len(), 1);
    }
}
