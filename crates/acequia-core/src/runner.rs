//! Bounded simulation loop.
//!
//! [`run_simulation`] drives [`run_hour`] until the manager reports the
//! network solved or the clock reaches its terminal hour, whichever comes
//! first. It owns the [`DoneSet`] for the whole run and reports why the
//! loop stopped; running out of hours is a normal outcome, not an error.
//!
//! [`run_hour`]: crate::tick::run_hour

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use acequia_types::RegionId;

use crate::allocation::DoneSet;
use crate::manager::Manager;
use crate::tick::{self, HourSummary, TickError};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// An hour failed to execute.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Reason the simulation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// The manager reported every region satisfied.
    Solved,
    /// The clock reached its terminal hour first.
    MaxHoursReached,
}

/// Result of the simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// Why the loop stopped.
    pub end_reason: SimulationEndReason,
    /// Number of hours executed by this call.
    pub hours_run: u64,
    /// Summary of the last hour, if any hour ran.
    pub final_summary: Option<HourSummary>,
    /// Regions that reached exact fill, in the order they did.
    pub done_regions: Vec<RegionId>,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the run.
    pub finished_at: DateTime<Utc>,
}

/// Callback invoked after each hour completes.
pub trait HourCallback {
    /// Called after an hour completes successfully.
    fn on_hour(&mut self, summary: &HourSummary, manager: &dyn Manager);
}

/// A no-op hour callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl HourCallback for NoOpCallback {
    fn on_hour(&mut self, _summary: &HourSummary, _manager: &dyn Manager) {}
}

/// Run hours until the manager is solved or the terminal hour is reached.
///
/// If the manager is already solved or already at its terminal hour, no
/// hour runs.
///
/// # Errors
///
/// Returns [`RunnerError`] if an hour fails to execute.
pub fn run_simulation(
    manager: &mut dyn Manager,
    callback: &mut dyn HourCallback,
) -> Result<SimulationResult, RunnerError> {
    let started_at = Utc::now();
    let mut done = DoneSet::new();
    let mut final_summary: Option<HourSummary> = None;
    let mut hours_run: u64 = 0;

    info!(
        hour = manager.hour(),
        max_hour = manager.max_hour(),
        regions = manager.network().region_count(),
        canals = manager.network().canal_count(),
        "Simulation starting"
    );

    while !manager.is_solved() && manager.hour() != manager.max_hour() {
        let summary = tick::run_hour(manager, &mut done)?;
        hours_run = hours_run.saturating_add(1);
        callback.on_hour(&summary, manager);
        final_summary = Some(summary);
    }

    let end_reason = if manager.is_solved() {
        SimulationEndReason::Solved
    } else {
        SimulationEndReason::MaxHoursReached
    };

    Ok(SimulationResult {
        end_reason,
        hours_run,
        final_summary,
        done_regions: done.as_slice().to_vec(),
        started_at,
        finished_at: Utc::now(),
    })
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    match result.end_reason {
        SimulationEndReason::Solved => info!(
            hours_run = result.hours_run,
            done = result.done_regions.len(),
            "Simulation solved"
        ),
        SimulationEndReason::MaxHoursReached => warn!(
            hours_run = result.hours_run,
            done = result.done_regions.len(),
            flooded = result.final_summary.as_ref().map(|s| s.flooded.len()),
            in_drought = result.final_summary.as_ref().map(|s| s.in_drought.len()),
            "Simulation ended unsolved at the hour limit"
        ),
    }
}
