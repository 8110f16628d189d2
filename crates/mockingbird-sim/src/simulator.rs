//! Simulator facade: one scenario's state behind the operations an outer
//! surface calls.

use chrono::TimeDelta;
use mockingbird_domain::ActionRequest;
use tracing::info;

use crate::error::{Result, SimError};
use crate::scenario::ScenarioCatalog;
use crate::snapshot::{DynamicData, StaticData};
use crate::state::SimulationState;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

#[derive(Debug, Clone)]
pub struct Simulator {
    scenario_name: String,
    state: SimulationState,
}

impl Simulator {
    /// Load a scenario from the catalog.
    ///
    /// # Errors
    ///
    /// Any catalog or state-building error.
    pub fn open(
        catalog: &ScenarioCatalog,
        category: &str,
        scenario: &str,
        time_step: TimeDelta,
    ) -> Result<Self> {
        let tables = catalog.load(category, scenario)?;
        let state = SimulationState::from_tables(tables, time_step)?;
        info!(category, scenario, "Opened scenario");
        Ok(Self::from_state(scenario, state))
    }

    pub fn from_state(scenario_name: impl Into<String>, state: SimulationState) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            state,
        }
    }

    /// Advance simulated time by `seconds`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `seconds` is not a finite positive number, then
    /// anything [`SimulationState::advance`] returns.
    pub fn evolve(&mut self, seconds: f64) -> Result<u64> {
        self.state.advance(seconds_to_duration(seconds)?)
    }

    /// # Errors
    ///
    /// `InvalidArgument` for a malformed time string.
    pub fn action(&mut self, requests: Vec<ActionRequest>) -> Result<usize> {
        self.state.enqueue(requests)
    }

    pub fn static_data(&self) -> StaticData {
        StaticData::capture(&self.scenario_name, &self.state)
    }

    pub fn dynamic_data(&self) -> DynamicData {
        DynamicData::capture(&self.state)
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    pub const fn state(&self) -> &SimulationState {
        &self.state
    }
}

#[allow(clippy::cast_possible_truncation)]
fn seconds_to_duration(seconds: f64) -> Result<TimeDelta> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(SimError::InvalidArgument(format!(
            "evolve duration must be a positive number of seconds, got {seconds}"
        )));
    }
    let nanos = (seconds * NANOS_PER_SECOND).round();
    if nanos >= 9.0e18 {
        return Err(SimError::InvalidArgument(format!(
            "evolve duration {seconds}s is too large"
        )));
    }
    Ok(TimeDelta::nanoseconds(nanos as i64))
}
