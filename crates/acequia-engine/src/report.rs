//! Final JSON report of a run.
//!
//! The report pairs the runner's [`SimulationResult`] with the final state
//! of every region, resolved to names, so it can be read without the
//! scenario file at hand.

use std::path::Path;

use acequia_core::manager::Manager;
use acequia_core::runner::{SimulationEndReason, SimulationResult};
use acequia_core::tick::HourSummary;
use acequia_types::RegionStatus;
use acequia_world::region;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::EngineError;

/// Final state of one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    /// Region name.
    pub name: String,
    /// Level at the end of the run.
    pub water_level: f64,
    /// Baseline requirement.
    pub water_need: f64,
    /// Maximum sustainable volume.
    pub water_capacity: f64,
    /// Status at the end of the run.
    pub status: RegionStatus,
    /// Whether the region is stable and at or above its need.
    pub satisfied: bool,
    /// Whether the region reached exact fill during the run.
    pub done: bool,
}

/// Everything written to the report file.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Simulation name from the config.
    pub name: String,
    /// Why the run stopped.
    pub end_reason: SimulationEndReason,
    /// Hours executed.
    pub hours_run: u64,
    /// Clock hour when the run stopped.
    pub final_hour: u64,
    /// Terminal hour.
    pub max_hour: u64,
    /// Sum of all levels at the end of the run.
    pub total_water: f64,
    /// Regions that reached exact fill, by name, in the order they did.
    pub done_regions: Vec<String>,
    /// Final region states in collection order.
    pub regions: Vec<RegionReport>,
    /// Per-hour summaries.
    pub hours: Vec<HourSummary>,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the run.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Assemble the report from the runner result and the final manager
    /// state.
    pub fn build(
        name: &str,
        result: &SimulationResult,
        manager: &dyn Manager,
        hours: Vec<HourSummary>,
    ) -> Self {
        let network = manager.network();
        let regions = network
            .regions()
            .iter()
            .map(|r| RegionReport {
                name: r.name.clone(),
                water_level: r.water_level,
                water_need: r.water_need,
                water_capacity: r.water_capacity,
                status: r.status(),
                satisfied: region::is_satisfied(r),
                done: result.done_regions.contains(&r.id),
            })
            .collect();
        let done_regions = result
            .done_regions
            .iter()
            .filter_map(|id| network.region(*id).map(|r| r.name.clone()))
            .collect();

        Self {
            name: name.to_owned(),
            end_reason: result.end_reason,
            hours_run: result.hours_run,
            final_hour: manager.hour(),
            max_hour: manager.max_hour(),
            total_water: network.total_water(),
            done_regions,
            regions,
            hours,
            started_at: result.started_at,
            finished_at: result.finished_at,
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_to(&self, path: &Path) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Report written");
        Ok(())
    }
}
