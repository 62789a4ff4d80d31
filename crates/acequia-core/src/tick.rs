//! The hour cycle: allocation passes followed by one manager advance.
//!
//! [`run_hour`] executes exactly one simulated hour:
//!
//! 1. **Allocate** -- the seven allocation passes decide which canals are
//!    open and at what flow.
//! 2. **Advance** -- the manager moves water through open canals, applies
//!    weather, refreshes flood and drought flags, advances the clock, and
//!    re-evaluates the solved flag.
//!
//! [`SimulationState`] is the production [`Manager`]. The hour cycle is
//! deterministic given the same initial state and weather seed.

use acequia_types::{RegionId, Weather};
use acequia_world::{WaterNetwork, WeatherSystem};
use serde::Serialize;
use tracing::info;

use crate::allocation::{self, AllocationReport, DoneSet};
use crate::clock::SimulationClock;
use crate::manager::{AdvanceOutcome, Manager};

/// Errors that can occur during an hour.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: crate::clock::ClockError,
    },

    /// A network operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: acequia_world::WorldError,
    },
}

/// Summary of a single hour's execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourSummary {
    /// The hour the allocation passes ran in.
    pub hour: u64,
    /// Weather applied after transfers, if enabled.
    pub weather: Option<Weather>,
    /// What each allocation pass did.
    pub allocation: AllocationReport,
    /// Canals open when the hour was advanced.
    pub open_canals: usize,
    /// Volume carried by open canals.
    pub volume_moved: f64,
    /// Regions flooded at the end of the hour.
    pub flooded: Vec<RegionId>,
    /// Regions in drought at the end of the hour.
    pub in_drought: Vec<RegionId>,
    /// Size of the done set at the end of the hour.
    pub done_count: usize,
    /// Sum of all levels at the end of the hour.
    pub total_water: f64,
    /// Solved flag after advancing.
    pub solved: bool,
}

/// The mutable simulation state driven by the hour cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The simulation clock.
    pub clock: SimulationClock,
    /// The region/canal arena.
    pub network: WaterNetwork,
    /// Hourly weather, when enabled.
    pub weather: Option<WeatherSystem>,
    /// Set by [`Manager::advance_hour`] once every region is stable and at
    /// or above its need.
    pub solved: bool,
}

impl SimulationState {
    /// Create a state that has not yet been evaluated as solved.
    pub const fn new(
        clock: SimulationClock,
        network: WaterNetwork,
        weather: Option<WeatherSystem>,
    ) -> Self {
        Self {
            clock,
            network,
            weather,
            solved: false,
        }
    }
}

impl Manager for SimulationState {
    fn network(&self) -> &WaterNetwork {
        &self.network
    }

    fn network_mut(&mut self) -> &mut WaterNetwork {
        &mut self.network
    }

    fn hour(&self) -> u64 {
        self.clock.hour()
    }

    fn max_hour(&self) -> u64 {
        self.clock.max_hour()
    }

    fn is_solved(&self) -> bool {
        self.solved
    }

    fn advance_hour(&mut self) -> Result<AdvanceOutcome, TickError> {
        let volume_moved = self.network.transfer_open_canals()?;
        let weather = match &self.weather {
            Some(system) => Some(system.apply(self.clock.hour(), &mut self.network)),
            None => None,
        };
        self.network.refresh_statuses();
        let hour = self.clock.advance()?;
        self.solved = self.network.all_satisfied();

        Ok(AdvanceOutcome {
            hour,
            weather,
            volume_moved,
        })
    }
}

/// Execute one simulated hour: all allocation passes, then exactly one
/// advance.
///
/// `done` is owned by the caller and carried across hours.
///
/// # Errors
///
/// Returns [`TickError`] if the manager fails to advance.
pub fn run_hour(manager: &mut dyn Manager, done: &mut DoneSet) -> Result<HourSummary, TickError> {
    let window = manager.window();
    let allocation = allocation::allocate_hour(manager.network_mut(), window, done);
    let open_canals = manager.network().open_canal_count();

    let advance = manager.advance_hour()?;

    let network = manager.network();
    let flooded: Vec<RegionId> = network
        .regions()
        .iter()
        .filter(|r| r.is_flooded)
        .map(|r| r.id)
        .collect();
    let in_drought: Vec<RegionId> = network
        .regions()
        .iter()
        .filter(|r| r.is_in_drought)
        .map(|r| r.id)
        .collect();
    let total_water = network.total_water();
    let solved = manager.is_solved();

    info!(
        hour = window.hour,
        weather = ?advance.weather,
        open_canals,
        volume_moved = advance.volume_moved,
        flooded = flooded.len(),
        in_drought = in_drought.len(),
        done = done.len(),
        total_water,
        solved,
        "Hour complete"
    );

    Ok(HourSummary {
        hour: window.hour,
        weather: advance.weather,
        allocation,
        open_canals,
        volume_moved: advance.volume_moved,
        flooded,
        in_drought,
        done_count: done.len(),
        total_water,
        solved,
    })
}
