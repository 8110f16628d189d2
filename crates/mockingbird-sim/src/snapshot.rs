//! Serialisable views of the simulation for outer surfaces.
//!
//! Static data changes only when a scenario is loaded; dynamic data is
//! rendered after every evolve.

use std::collections::BTreeMap;

use mockingbird_domain::{format_time, Action, Aircraft};
use serde::Serialize;

use crate::actions::RejectedAction;
use crate::airspace::VolumeOutline;
use crate::state::SimulationState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorView {
    pub agent: String,
    pub volumes: Vec<VolumeOutline>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixView {
    pub id: usize,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Scenario geometry and vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticData {
    pub scenario_name: String,
    pub bay_names: Vec<String>,
    pub sectors: BTreeMap<String, SectorView>,
    /// Sorted by name
    pub fixes: Vec<FixView>,
}

impl StaticData {
    pub fn capture(scenario_name: &str, state: &SimulationState) -> Self {
        let sectors = state
            .sectors()
            .values()
            .map(|sector| {
                (
                    sector.name.clone(),
                    SectorView {
                        agent: sector.agent.clone(),
                        volumes: sector.outline(),
                    },
                )
            })
            .collect();

        let mut fixes: Vec<_> = state.fixes().values().collect();
        fixes.sort_by(|a, b| a.name.cmp(&b.name));
        let fixes = fixes
            .into_iter()
            .enumerate()
            .map(|(id, fix)| FixView {
                id,
                name: fix.name.clone(),
                lat: fix.lat,
                lon: fix.lon,
            })
            .collect();

        Self {
            scenario_name: scenario_name.to_string(),
            bay_names: state.bay_names().to_vec(),
            sectors,
            fixes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionView {
    pub id: usize,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftView {
    pub id: usize,
    #[serde(flatten)]
    pub aircraft: Aircraft,
    /// Sectors containing the aircraft
    pub sectors: Vec<String>,
}

/// Moving parts: clock, queue and fleet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicData {
    pub time: String,
    pub tick: u64,
    pub pending_actions: Vec<ActionView>,
    pub applied_actions: Vec<ActionView>,
    pub rejected_actions: Vec<RejectedAction>,
    pub aircraft: Vec<AircraftView>,
}

fn action_views(actions: &[Action]) -> Vec<ActionView> {
    actions
        .iter()
        .enumerate()
        .map(|(id, action)| ActionView {
            id,
            action: action.clone(),
        })
        .collect()
}

impl DynamicData {
    pub fn capture(state: &SimulationState) -> Self {
        let aircraft = state
            .fleet()
            .iter()
            .enumerate()
            .map(|(id, aircraft)| AircraftView {
                id,
                sectors: state
                    .sectors_containing(aircraft.lat, aircraft.lon, aircraft.flight_level)
                    .into_iter()
                    .map(ToString::to_string)
                    .collect(),
                aircraft: aircraft.clone(),
            })
            .collect();

        Self {
            time: format_time(&state.current_time()),
            tick: state.tick_count(),
            pending_actions: action_views(state.actions().pending()),
            applied_actions: action_views(state.actions().applied()),
            rejected_actions: state.actions().rejected().to_vec(),
            aircraft,
        }
    }
}
