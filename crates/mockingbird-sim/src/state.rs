//! Complete world state at a single instant, and the tick loop that evolves
//! it.
//!
//! Each tick runs, in order: dispatch of actions due in the tick window,
//! the kinematic integrator over the whole fleet, then the clock step.

use std::collections::HashMap;

use chrono::{NaiveDateTime, TimeDelta};
use mockingbird_domain::{Action, ActionRequest, Aircraft, Fix, SectorDefinition};
use tracing::{debug, info, warn};

use crate::actions::{dispatch, ActionQueue};
use crate::airspace::{Airspace, Sector};
use crate::clock::TickClock;
use crate::error::{Result, SimError};
use crate::fleet::Fleet;
use crate::kinematics::integrate;
use crate::tables::{decode_actions, decode_aircraft, decode_fixes, decode_sectors, ScenarioTables};

/// Bay vocabulary used when a scenario does not supply one.
pub const DEFAULT_BAY_NAMES: &[&str] = &["INCOMM", "OUTCOMM"];

/// Sole owner of all simulation data.
#[derive(Debug, Clone)]
pub struct SimulationState {
    clock: TickClock,
    bay_names: Vec<String>,
    fixes: HashMap<String, Fix>,
    sectors: HashMap<String, Sector>,
    fleet: Fleet,
    actions: ActionQueue,
}

impl SimulationState {
    /// Create an empty state.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `time_step` is not strictly positive.
    pub fn new(
        start_time: NaiveDateTime,
        time_step: TimeDelta,
        bay_names: Vec<String>,
    ) -> Result<Self> {
        Ok(Self {
            clock: TickClock::new(start_time, time_step)?,
            bay_names,
            fixes: HashMap::new(),
            sectors: HashMap::new(),
            fleet: Fleet::new(),
            actions: ActionQueue::new(),
        })
    }

    /// Build a state from inbound scenario tables. Fixes are loaded first so
    /// sector boundaries can refer to them.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` for any record with the wrong field set, plus every
    /// error of the individual `add_*` and `enqueue` operations.
    pub fn from_tables(tables: ScenarioTables, time_step: TimeDelta) -> Result<Self> {
        let mut state = Self::new(tables.start_time, time_step, tables.bay_names)?;

        for fix in decode_fixes(tables.fixes)? {
            state.add_fix(fix)?;
        }
        for (name, definition) in decode_sectors(tables.sectors)? {
            state.add_sector(name, definition)?;
        }
        for aircraft in decode_aircraft(tables.aircraft)? {
            state.add_aircraft(aircraft)?;
        }
        state.enqueue(decode_actions(tables.actions)?)?;

        info!(
            start_time = %state.current_time(),
            fixes = state.fixes.len(),
            sectors = state.sectors.len(),
            aircraft = state.fleet.len(),
            actions = state.actions.pending().len(),
            "Loaded simulation state"
        );

        Ok(state)
    }

    /// # Errors
    ///
    /// `DuplicateEntity` if a fix with this name exists.
    pub fn add_fix(&mut self, fix: Fix) -> Result<()> {
        if self.fixes.contains_key(&fix.name) {
            return Err(SimError::duplicate("fix", fix.name));
        }
        self.fixes.insert(fix.name.clone(), fix);
        Ok(())
    }

    /// Add a sector whose volume boundaries name existing fixes.
    ///
    /// # Errors
    ///
    /// `DuplicateEntity` for a repeated name, otherwise the errors of
    /// [`Airspace::from_definitions`].
    pub fn add_sector(&mut self, name: String, definition: SectorDefinition) -> Result<()> {
        if self.sectors.contains_key(&name) {
            return Err(SimError::duplicate("sector", name));
        }
        let airspace = Airspace::from_definitions(&definition.vols, &self.fixes)?;
        self.sectors.insert(
            name.clone(),
            Sector {
                name,
                agent: definition.agent,
                airspace,
            },
        );
        Ok(())
    }

    /// # Errors
    ///
    /// `DuplicateEntity` if the callsign exists, `InvalidArgument` if the bay
    /// is not in the bay vocabulary.
    pub fn add_aircraft(&mut self, aircraft: Aircraft) -> Result<()> {
        if !self.bay_names.contains(&aircraft.bay) {
            return Err(SimError::InvalidArgument(format!(
                "aircraft '{}' is in unknown bay '{}'",
                aircraft.callsign, aircraft.bay
            )));
        }
        self.fleet.add(aircraft)
    }

    /// # Errors
    ///
    /// `NotFound` if no aircraft has this callsign.
    pub fn remove_aircraft(&mut self, callsign: &str) -> Result<Aircraft> {
        self.fleet.remove(callsign)
    }

    /// Queue externally supplied actions.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed time string; nothing is queued.
    pub fn enqueue(&mut self, requests: impl IntoIterator<Item = ActionRequest>) -> Result<usize> {
        let count = self.actions.enqueue(requests)?;
        debug!(count, pending = self.actions.pending().len(), "Queued actions");
        Ok(count)
    }

    /// Queue an already-parsed action.
    pub fn queue_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Advance the simulation by `requested`, running whole ticks and
    /// carrying any remainder into the next call. Returns the ticks run.
    ///
    /// Every scheduled tick runs even if an action fails to dispatch; failed
    /// actions are moved to the rejected history and the first failure is
    /// returned once all ticks are done.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a non-positive duration (nothing runs), or the
    /// first dispatch failure (`UnsupportedAction`, `NotFound`,
    /// `InvalidArgument`).
    pub fn advance(&mut self, requested: TimeDelta) -> Result<u64> {
        let steps = self.clock.schedule(requested)?;

        let mut first_error = None;
        for _ in 0..steps {
            if let Some(err) = self.tick() {
                first_error.get_or_insert(err);
            }
        }

        debug!(
            steps,
            tick = self.clock.tick_count(),
            leftover_ms = self.clock.leftover().num_milliseconds(),
            "Advanced simulation"
        );

        first_error.map_or(Ok(steps), Err)
    }

    fn tick(&mut self) -> Option<SimError> {
        let (start, end) = self.clock.window();
        let mut first_error = None;

        for action in self.actions.take_due(end) {
            if action.due_time < start {
                warn!(
                    callsign = %action.callsign,
                    due_time = %action.due_time,
                    now = %start,
                    "Applying overdue action"
                );
            }
            match dispatch(&action, &mut self.fleet, &self.bay_names) {
                Ok(()) => {
                    debug!(
                        callsign = %action.callsign,
                        kind = %action.kind,
                        subkind = %action.subkind,
                        value = %action.value,
                        "Applied action"
                    );
                    self.actions.record_applied(action);
                }
                Err(err) => {
                    warn!(
                        callsign = %action.callsign,
                        code = err.error_code(),
                        error = %err,
                        "Rejected action"
                    );
                    self.actions.record_rejected(action, &err);
                    first_error.get_or_insert(err);
                }
            }
        }

        integrate(self.fleet.as_mut_slice(), self.clock.step_seconds());
        self.clock.tick();

        first_error
    }

    pub const fn current_time(&self) -> NaiveDateTime {
        self.clock.current_time()
    }

    pub const fn tick_count(&self) -> u64 {
        self.clock.tick_count()
    }

    pub fn leftover_time(&self) -> TimeDelta {
        self.clock.leftover()
    }

    pub fn time_step(&self) -> TimeDelta {
        self.clock.step()
    }

    pub fn bay_names(&self) -> &[String] {
        &self.bay_names
    }

    pub const fn fixes(&self) -> &HashMap<String, Fix> {
        &self.fixes
    }

    /// # Errors
    ///
    /// `NotFound` if no fix has this name.
    pub fn fix(&self, name: &str) -> Result<&Fix> {
        self.fixes
            .get(name)
            .ok_or_else(|| SimError::not_found("fix", name))
    }

    pub const fn sectors(&self) -> &HashMap<String, Sector> {
        &self.sectors
    }

    /// # Errors
    ///
    /// `NotFound` if no sector has this name.
    pub fn sector(&self, name: &str) -> Result<&Sector> {
        self.sectors
            .get(name)
            .ok_or_else(|| SimError::not_found("sector", name))
    }

    pub const fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// # Errors
    ///
    /// `NotFound` if no aircraft has this callsign.
    pub fn aircraft(&self, callsign: &str) -> Result<&Aircraft> {
        self.fleet.get(callsign)
    }

    pub const fn actions(&self) -> &ActionQueue {
        &self.actions
    }

    /// Names of every sector containing the point, sorted.
    pub fn sectors_containing(&self, lat: f64, lon: f64, level: f64) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .sectors
            .values()
            .filter(|sector| sector.contains(lat, lon, level))
            .map(|sector| sector.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Sectors containing an aircraft's current position.
    ///
    /// # Errors
    ///
    /// `NotFound` if no aircraft has this callsign.
    pub fn aircraft_sectors(&self, callsign: &str) -> Result<Vec<&str>> {
        let aircraft = self.fleet.get(callsign)?;
        Ok(self.sectors_containing(aircraft.lat, aircraft.lon, aircraft.flight_level))
    }
}
