//! Three-dimensional airspace: altitude-banded polygons composed into
//! sectors.

use std::collections::HashMap;

use geo::{Coord, Intersects, LineString, Point, Polygon};
use mockingbird_domain::{Fix, VolumeDefinition};
use serde::Serialize;

use crate::error::{Result, SimError};

/// One altitude band over a lateral (lon, lat) polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub min_level: f64,
    pub max_level: f64,
    pub boundary: Polygon<f64>,
}

impl Volume {
    /// # Errors
    ///
    /// `InvalidArgument` if `min_level > max_level`.
    pub fn new(min_level: f64, max_level: f64, boundary: Polygon<f64>) -> Result<Self> {
        if min_level > max_level {
            return Err(SimError::InvalidArgument(format!(
                "volume band is inverted: min {min_level} > max {max_level}"
            )));
        }
        Ok(Self {
            min_level,
            max_level,
            boundary,
        })
    }

    /// Inclusive on both the altitude band and the polygon edge.
    pub fn contains(&self, lat: f64, lon: f64, level: f64) -> bool {
        (self.min_level..=self.max_level).contains(&level)
            && self.boundary.intersects(&Point::new(lon, lat))
    }
}

/// Ordered, possibly overlapping, collection of volumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Airspace {
    volumes: Vec<Volume>,
}

impl Airspace {
    /// # Errors
    ///
    /// `InvalidArgument` if `volumes` is empty.
    pub fn new(volumes: Vec<Volume>) -> Result<Self> {
        if volumes.is_empty() {
            return Err(SimError::InvalidArgument(
                "airspace must contain at least one volume".to_string(),
            ));
        }
        Ok(Self { volumes })
    }

    /// Build an airspace from raw definitions whose boundaries name fixes.
    ///
    /// # Errors
    ///
    /// `NotFound` for a boundary fix missing from `fixes`, `InvalidArgument`
    /// for a boundary of fewer than three fixes, an inverted band or an empty
    /// definition list.
    pub fn from_definitions(
        definitions: &[VolumeDefinition],
        fixes: &HashMap<String, Fix>,
    ) -> Result<Self> {
        let volumes = definitions
            .iter()
            .map(|definition| {
                if definition.boundary.len() < 3 {
                    return Err(SimError::InvalidArgument(format!(
                        "volume boundary needs at least three fixes, got {}",
                        definition.boundary.len()
                    )));
                }
                let ring = definition
                    .boundary
                    .iter()
                    .map(|name| {
                        fixes
                            .get(name)
                            .map(|fix| Coord { x: fix.lon, y: fix.lat })
                            .ok_or_else(|| SimError::not_found("fix", name))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Volume::new(
                    definition.min,
                    definition.max,
                    Polygon::new(LineString::from(ring), Vec::new()),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(volumes)
    }

    /// True iff some volume contains the point. Linear scan; volume counts
    /// are small.
    pub fn contains(&self, lat: f64, lon: f64, level: f64) -> bool {
        self.volumes
            .iter()
            .any(|volume| volume.contains(lat, lon, level))
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }
}

/// Named controlled airspace with its controlling agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub name: String,
    pub agent: String,
    pub airspace: Airspace,
}

impl Sector {
    pub fn contains(&self, lat: f64, lon: f64, level: f64) -> bool {
        self.airspace.contains(lat, lon, level)
    }

    /// Render-ready view of the sector's volumes.
    pub fn outline(&self) -> Vec<VolumeOutline> {
        self.airspace
            .volumes()
            .iter()
            .map(|volume| VolumeOutline {
                min: volume.min_level,
                max: volume.max_level,
                boundary: volume
                    .boundary
                    .exterior()
                    .coords()
                    .map(|c| [c.y, c.x])
                    .collect(),
            })
            .collect()
    }
}

/// Volume band with its closed boundary ring as `[lat, lon]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeOutline {
    pub min: f64,
    pub max: f64,
    pub boundary: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            Vec::new(),
        )
    }

    fn square_airspace() -> Airspace {
        Airspace::new(vec![Volume::new(0.0, 100.0, unit_square()).unwrap()]).unwrap()
    }

    fn fixes() -> HashMap<String, Fix> {
        [
            Fix::new("SW", 50.0, -1.0),
            Fix::new("SE", 50.0, 1.0),
            Fix::new("NE", 52.0, 1.0),
            Fix::new("NW", 52.0, -1.0),
        ]
        .into_iter()
        .map(|fix| (fix.name.clone(), fix))
        .collect()
    }

    #[test]
    fn test_edge_points_are_contained() {
        let airspace = square_airspace();
        assert!(airspace.contains(0.0, 0.5, 50.0));
        assert!(airspace.contains(0.5, 1.0, 50.0));
        assert!(airspace.contains(1.0, 1.0, 50.0));
        assert!(airspace.contains(0.5, 0.5, 50.0));
    }

    #[test]
    fn test_altitude_band_is_inclusive() {
        let airspace = square_airspace();
        assert!(airspace.contains(0.5, 0.5, 0.0));
        assert!(airspace.contains(0.5, 0.5, 100.0));
        assert!(!airspace.contains(0.5, 0.5, 150.0));
        assert!(!airspace.contains(0.0, 0.5, 150.0));
        assert!(!airspace.contains(0.5, 0.5, -1.0));
    }

    #[test]
    fn test_outside_polygon() {
        let airspace = square_airspace();
        assert!(!airspace.contains(1.5, 0.5, 50.0));
        assert!(!airspace.contains(0.5, -0.001, 50.0));
    }

    #[test]
    fn test_overlapping_volumes_any_match() {
        let lower = Volume::new(0.0, 100.0, unit_square()).unwrap();
        let upper = Volume::new(
            200.0,
            300.0,
            Polygon::new(
                LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]),
                Vec::new(),
            ),
        )
        .unwrap();
        let airspace = Airspace::new(vec![lower, upper]).unwrap();
        assert!(airspace.contains(1.5, 1.5, 250.0));
        assert!(!airspace.contains(1.5, 1.5, 50.0));
        assert!(!airspace.contains(0.5, 0.5, 150.0));
    }

    #[test]
    fn test_empty_airspace_rejected() {
        assert!(matches!(
            Airspace::new(Vec::new()),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(matches!(
            Airspace::from_definitions(&[], &fixes()),
            Err(SimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_inverted_band_rejected() {
        assert!(Volume::new(100.0, 0.0, unit_square()).is_err());
    }

    #[test]
    fn test_from_definitions_uses_fix_positions() {
        let definition = VolumeDefinition {
            min: 0.0,
            max: 245.0,
            boundary: vec!["SW".into(), "SE".into(), "NE".into(), "NW".into()],
        };
        let airspace = Airspace::from_definitions(&[definition], &fixes()).unwrap();
        assert!(airspace.contains(51.0, 0.0, 100.0));
        assert!(airspace.contains(52.0, 0.0, 245.0));
        assert!(!airspace.contains(53.0, 0.0, 100.0));
    }

    #[test]
    fn test_from_definitions_unknown_fix() {
        let definition = VolumeDefinition {
            min: 0.0,
            max: 245.0,
            boundary: vec!["SW".into(), "SE".into(), "XYZ".into()],
        };
        let err = Airspace::from_definitions(&[definition], &fixes()).unwrap_err();
        assert!(matches!(err, SimError::NotFound { ref key, .. } if key == "XYZ"));
    }

    #[test]
    fn test_from_definitions_degenerate_boundary() {
        let definition = VolumeDefinition {
            min: 0.0,
            max: 245.0,
            boundary: vec!["SW".into(), "SE".into()],
        };
        assert!(Airspace::from_definitions(&[definition], &fixes()).is_err());
    }

    #[test]
    fn test_sector_outline_is_closed_ring() {
        let sector = Sector {
            name: "LON".into(),
            agent: "EXC".into(),
            airspace: square_airspace(),
        };
        let outline = sector.outline();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].boundary.len(), 5);
        assert_eq!(outline[0].boundary.first(), outline[0].boundary.last());
    }
}
