//! Core entity structs for the Acequia simulation.

use serde::{Deserialize, Serialize};

use crate::enums::RegionStatus;
use crate::ids::{CanalId, RegionId};

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A node in the water network holding a volume of water.
///
/// `water_need` and `water_capacity` are fixed for a run. `water_level`
/// changes every hour through canal transfers, weather and drought
/// buffering. The two status flags are refreshed by the manager after each
/// hour and are read-only to the allocation passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Arena handle of this region.
    pub id: RegionId,
    /// Human-readable name, unique within a network.
    pub name: String,
    /// Current volume of water.
    pub water_level: f64,
    /// Baseline requirement.
    pub water_need: f64,
    /// Maximum sustainable volume.
    pub water_capacity: f64,
    /// Whether the level is above capacity.
    pub is_flooded: bool,
    /// Whether the level is below the drought threshold.
    pub is_in_drought: bool,
}

impl Region {
    /// Return the combined status derived from the flags.
    pub const fn status(&self) -> RegionStatus {
        RegionStatus::from_flags(self.is_flooded, self.is_in_drought)
    }
}

// ---------------------------------------------------------------------------
// Canal
// ---------------------------------------------------------------------------

/// A directed conduit carrying water from one region to another.
///
/// Endpoints never change. Flow rate and open state are recomputed every
/// hour; a closed canal moves no water regardless of its flow rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canal {
    /// Arena handle of this canal.
    pub id: CanalId,
    /// Region the water leaves.
    pub source: RegionId,
    /// Region the water enters.
    pub destination: RegionId,
    /// Flow rate assigned for the current hour.
    pub flow_rate: f64,
    /// Whether the canal carries water this hour.
    pub is_open: bool,
}

impl Canal {
    /// Whether this canal runs directly from `source` to `destination`.
    pub fn connects(&self, source: RegionId, destination: RegionId) -> bool {
        self.source == source && self.destination == destination
    }
}
