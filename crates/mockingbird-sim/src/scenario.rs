//! Scenario catalog: a directory tree of `<category>/<scenario>/` folders,
//! each holding `meta.json` and the four inbound tables as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use mockingbird_domain::parse_time;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SimError};
use crate::state::DEFAULT_BAY_NAMES;
use crate::tables::{Record, ScenarioTables};

/// Name reported in scenario info.
pub const SIMULATOR_NAME: &str = "Mockingbird";

const META_FILE: &str = "meta.json";
const FIXES_FILE: &str = "fixes.json";
const SECTORS_FILE: &str = "sectors.json";
const AIRCRAFT_FILE: &str = "aircraft.json";
const ACTIONS_FILE: &str = "actions.json";

fn default_bay_names() -> Vec<String> {
    DEFAULT_BAY_NAMES.iter().map(ToString::to_string).collect()
}

/// Contents of `meta.json`. Unrecognised keys are kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMeta {
    pub start_time: String,
    #[serde(default = "default_bay_names")]
    pub bay_names: Vec<String>,
    #[serde(flatten)]
    pub extra: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioInfo {
    pub simulator: String,
    pub category: String,
    pub scenario_name: String,
    pub meta: ScenarioMeta,
}

#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    root: PathBuf,
}

impl ScenarioCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.scenario_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// # Errors
    ///
    /// `NotFound` if the catalog root does not exist, `Io` if it cannot be
    /// read.
    pub fn list_categories(&self) -> Result<Vec<String>> {
        subdirectories(&self.root, "scenario root")
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown category.
    pub fn list_scenarios(&self, category: &str) -> Result<Vec<String>> {
        subdirectories(&self.root.join(category), "category")
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown scenario, `Decode` for a malformed
    /// `meta.json`.
    pub fn info(&self, category: &str, scenario: &str) -> Result<ScenarioInfo> {
        let dir = self.scenario_dir(category, scenario)?;
        Ok(ScenarioInfo {
            simulator: SIMULATOR_NAME.to_string(),
            category: category.to_string(),
            scenario_name: scenario.to_string(),
            meta: read_json(&dir.join(META_FILE))?,
        })
    }

    /// Read a scenario into inbound tables. Field sets are checked later,
    /// when the tables are decoded into a state.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown scenario, `InvalidArgument` for a malformed
    /// start time, `Io` or `Decode` for unreadable files.
    pub fn load(&self, category: &str, scenario: &str) -> Result<ScenarioTables> {
        let dir = self.scenario_dir(category, scenario)?;
        debug!(path = %dir.display(), "Loading scenario");

        let meta: ScenarioMeta = read_json(&dir.join(META_FILE))?;
        Ok(ScenarioTables {
            start_time: parse_time(&meta.start_time)?,
            bay_names: meta.bay_names,
            fixes: read_json(&dir.join(FIXES_FILE))?,
            sectors: read_json(&dir.join(SECTORS_FILE))?,
            aircraft: read_json(&dir.join(AIRCRAFT_FILE))?,
            actions: read_json(&dir.join(ACTIONS_FILE))?,
        })
    }

    fn scenario_dir(&self, category: &str, scenario: &str) -> Result<PathBuf> {
        let category_dir = self.root.join(category);
        if !category_dir.is_dir() {
            return Err(SimError::not_found("category", category));
        }
        let dir = category_dir.join(scenario);
        if !dir.is_dir() {
            return Err(SimError::not_found("scenario", format!("{category}/{scenario}")));
        }
        Ok(dir)
    }
}

fn subdirectories(dir: &Path, entity_type: &str) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(SimError::not_found(entity_type, dir.display().to_string()));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
