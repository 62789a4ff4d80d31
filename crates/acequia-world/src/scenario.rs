//! Scenario descriptions and the built-in starting network.
//!
//! A [`ScenarioSpec`] is the serializable description of a network: regions
//! with their starting quantities and canals referring to regions by name.
//! Declaration order becomes collection order, which the allocation passes
//! use for tie-breaking.
//!
//! [`create_default_scenario`] builds the four-region network used when no
//! scenario file is configured. It starts with one region of each kind the
//! allocation loop reacts to: a donor with surplus, a region in drought, a
//! flooded region, and a stable region just short of its target.

use serde::{Deserialize, Serialize};

use acequia_types::RegionId;

use crate::error::WorldError;
use crate::network::WaterNetwork;

/// A region entry in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Unique region name.
    pub name: String,
    /// Starting water level.
    pub level: f64,
    /// Baseline requirement.
    pub need: f64,
    /// Maximum sustainable volume.
    pub capacity: f64,
}

/// A canal entry in a scenario, by region name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanalSpec {
    /// Source region name.
    pub from: String,
    /// Destination region name.
    pub to: String,
}

/// A full scenario: regions first, then canals between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Regions in collection order.
    #[serde(default)]
    pub regions: Vec<RegionSpec>,
    /// Canals in collection order.
    #[serde(default)]
    pub canals: Vec<CanalSpec>,
}

impl ScenarioSpec {
    /// Build a [`WaterNetwork`] from this description.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownRegionName`] if a canal names an
    /// undeclared region, or any error from
    /// [`WaterNetwork::add_region`] / [`WaterNetwork::add_canal`].
    pub fn build(&self) -> Result<WaterNetwork, WorldError> {
        let mut network = WaterNetwork::new();
        for r in &self.regions {
            network.add_region(&r.name, r.level, r.need, r.capacity)?;
        }
        for c in &self.canals {
            let from = lookup(&network, &c.from)?;
            let to = lookup(&network, &c.to)?;
            network.add_canal(from, to)?;
        }
        Ok(network)
    }
}

fn lookup(network: &WaterNetwork, name: &str) -> Result<RegionId, WorldError> {
    network
        .region_by_name(name)
        .map(|r| r.id)
        .ok_or_else(|| WorldError::UnknownRegionName(name.to_owned()))
}

/// Handles of the regions in the built-in scenario.
#[derive(Debug, Clone, Copy)]
pub struct DefaultRegionIds {
    /// Upstream donor with surplus.
    pub north: RegionId,
    /// Starts in drought.
    pub south: RegionId,
    /// Starts flooded.
    pub east: RegionId,
    /// Stable, just below its target.
    pub west: RegionId,
}

/// Build the default four-region network.
///
/// Every pair of neighbouring regions is joined by a canal in each
/// direction: North-South, North-East, South-West, East-West.
///
/// # Errors
///
/// Returns [`WorldError`] only if the hard-coded description is invalid.
pub fn create_default_scenario() -> Result<(WaterNetwork, DefaultRegionIds), WorldError> {
    let mut network = WaterNetwork::new();
    let ids = DefaultRegionIds {
        north: network.add_region("North", 20.0, 10.0, 30.0)?,
        south: network.add_region("South", 3.0, 8.0, 25.0)?,
        east: network.add_region("East", 35.0, 12.0, 30.0)?,
        west: network.add_region("West", 9.0, 9.0, 28.0)?,
    };

    for (a, b) in [
        (ids.north, ids.south),
        (ids.north, ids.east),
        (ids.south, ids.west),
        (ids.east, ids.west),
    ] {
        network.add_canal(a, b)?;
        network.add_canal(b, a)?;
    }

    Ok((network, ids))
}
