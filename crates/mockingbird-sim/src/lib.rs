//! # Mockingbird Simulator
//!
//! Fixed-step kinematic simulation engine for procedural ATC training
//! scenarios.
//!
//! ## Features
//!
//! - Fixed-timestep clock with leftover carry across advances
//! - Time-ordered operator action queue and dispatch
//! - Saturating rate law for turn, climb and speed, WGS84 forward projection
//! - Altitude-banded polygon airspace and sector containment queries
//! - Scenario catalog, JSON snapshots and a single-owner async handle

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod actions;
pub mod airspace;
pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod fleet;
pub mod handle;
pub mod kinematics;
pub mod scenario;
pub mod simulator;
pub mod snapshot;
pub mod state;
pub mod tables;

pub use actions::{dispatch, ActionQueue, RejectedAction};
pub use airspace::{Airspace, Sector, Volume};
pub use clock::TickClock;
pub use config::Config;
pub use error::{Result, SimError};
pub use fleet::Fleet;
pub use handle::SimulatorHandle;
pub use scenario::{ScenarioCatalog, ScenarioInfo};
pub use simulator::Simulator;
pub use snapshot::{DynamicData, StaticData};
pub use state::SimulationState;
pub use tables::ScenarioTables;
