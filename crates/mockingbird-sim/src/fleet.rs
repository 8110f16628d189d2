//! Aircraft collection keyed by callsign.
//!
//! Aircraft are stored contiguously so the integrator can sweep the whole
//! fleet in one pass; a callsign index is rebuilt whenever the set changes.

use std::collections::HashMap;

use mockingbird_domain::Aircraft;

use crate::control::normalize_heading;
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Default)]
pub struct Fleet {
    aircraft: Vec<Aircraft>,
    index: HashMap<String, usize>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an aircraft, normalising its heading into [0, 360).
    ///
    /// # Errors
    ///
    /// `DuplicateEntity` if the callsign is already present.
    pub fn add(&mut self, mut aircraft: Aircraft) -> Result<()> {
        if self.index.contains_key(&aircraft.callsign) {
            return Err(SimError::duplicate("aircraft", aircraft.callsign));
        }
        aircraft.heading = normalize_heading(aircraft.heading);
        self.index
            .insert(aircraft.callsign.clone(), self.aircraft.len());
        self.aircraft.push(aircraft);
        Ok(())
    }

    /// Remove and return an aircraft, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// `NotFound` if no aircraft has this callsign.
    pub fn remove(&mut self, callsign: &str) -> Result<Aircraft> {
        let position = self
            .index
            .get(callsign)
            .copied()
            .ok_or_else(|| SimError::not_found("aircraft", callsign))?;
        let removed = self.aircraft.remove(position);
        self.rebuild_index();
        Ok(removed)
    }

    /// # Errors
    ///
    /// `NotFound` if no aircraft has this callsign.
    pub fn get(&self, callsign: &str) -> Result<&Aircraft> {
        self.index
            .get(callsign)
            .map(|&i| &self.aircraft[i])
            .ok_or_else(|| SimError::not_found("aircraft", callsign))
    }

    /// # Errors
    ///
    /// `NotFound` if no aircraft has this callsign.
    pub fn get_mut(&mut self, callsign: &str) -> Result<&mut Aircraft> {
        match self.index.get(callsign) {
            Some(&i) => Ok(&mut self.aircraft[i]),
            None => Err(SimError::not_found("aircraft", callsign)),
        }
    }

    pub fn contains(&self, callsign: &str) -> bool {
        self.index.contains_key(callsign)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Aircraft> {
        self.aircraft.iter()
    }

    /// Whole fleet as a mutable slice, for batch updates. Callsigns must not
    /// be changed through it.
    pub fn as_mut_slice(&mut self) -> &mut [Aircraft] {
        &mut self.aircraft
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .aircraft
            .iter()
            .enumerate()
            .map(|(i, aircraft)| (aircraft.callsign.clone(), i))
            .collect();
    }
}

impl<'a> IntoIterator for &'a Fleet {
    type Item = &'a Aircraft;
    type IntoIter = std::slice::Iter<'a, Aircraft>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
