//! Hour callback that logs per-region detail and keeps the run history.
//!
//! After each hour, this callback emits a debug line per region and keeps
//! the [`HourSummary`] so the final report can include the full timeline.

use acequia_core::manager::Manager;
use acequia_core::runner::HourCallback;
use acequia_core::tick::HourSummary;
use tracing::debug;

/// Callback that records every hour of the run.
#[derive(Debug, Default)]
pub struct HistoryCallback {
    hours: Vec<HourSummary>,
}

impl HistoryCallback {
    /// Create an empty history.
    pub const fn new() -> Self {
        Self { hours: Vec::new() }
    }

    /// Hours recorded so far, in execution order.
    pub fn hours(&self) -> &[HourSummary] {
        &self.hours
    }

    /// Consume the callback and return the recorded hours.
    pub fn into_hours(self) -> Vec<HourSummary> {
        self.hours
    }
}

impl HourCallback for HistoryCallback {
    fn on_hour(&mut self, summary: &HourSummary, manager: &dyn Manager) {
        for r in manager.network().regions() {
            debug!(
                hour = summary.hour,
                region = %r.name,
                level = r.water_level,
                need = r.water_need,
                capacity = r.water_capacity,
                status = ?r.status(),
                "Region state"
            );
        }
        self.hours.push(summary.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use acequia_core::clock::SimulationClock;
    use acequia_core::runner;
    use acequia_core::tick::SimulationState;

    use super::*;

    #[test]
    fn records_one_summary_per_hour() {
        let (network, _) = acequia_world::create_default_scenario().unwrap();
        let clock = SimulationClock::from_parts(0, 4).unwrap();
        let mut state = SimulationState::new(clock, network, None);
        let mut callback = HistoryCallback::new();

        let result = runner::run_simulation(&mut state, &mut callback).unwrap();
        assert_eq!(callback.hours().len() as u64, result.hours_run);
        let hours: Vec<u64> = callback.into_hours().iter().map(|s| s.hour).collect();
        assert_eq!(hours.first(), Some(&0));
    }
}
