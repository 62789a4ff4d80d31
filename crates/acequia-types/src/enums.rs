//! Enumeration types for the Acequia simulation.

use serde::{Deserialize, Serialize};

/// Hydrological status of a region, derived from its flood and drought flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStatus {
    /// Neither flooded nor in drought.
    Stable,
    /// Water level above capacity.
    Flooded,
    /// Water level below the drought threshold.
    Drought,
}

impl RegionStatus {
    /// Derive the status from the two raw flags.
    ///
    /// A region carrying both flags is reported as flooded; the flood is the
    /// condition the allocation loop reacts to first.
    pub const fn from_flags(is_flooded: bool, is_in_drought: bool) -> Self {
        if is_flooded {
            Self::Flooded
        } else if is_in_drought {
            Self::Drought
        } else {
            Self::Stable
        }
    }
}

/// Weather rolled for a simulated hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    /// No change to water levels.
    Clear,
    /// Every region gains a fixed amount of water.
    Rain,
    /// Every region loses a fixed amount of water to evaporation.
    Heat,
}
