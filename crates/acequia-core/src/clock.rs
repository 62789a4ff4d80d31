//! Simulation clock for the Acequia simulation.
//!
//! The clock counts simulated hours from a start hour up to a terminal
//! hour. The allocation loop reads it through an [`HourWindow`] to decide
//! whether the endgame override applies and which donor floor to use.

use crate::config::SimulationBoundsConfig;

/// Hours before the terminal hour during which the endgame override runs.
pub const ENDGAME_HOURS: u64 = 5;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Hour counter would overflow.
    #[error("hour counter overflow: cannot advance beyond u64::MAX")]
    HourOverflow,

    /// Invalid clock configuration.
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// A read-only view of the current hour against the terminal hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    /// Current hour.
    pub hour: u64,
    /// Terminal hour.
    pub max_hour: u64,
}

impl HourWindow {
    /// Hours left before the terminal hour (zero once reached).
    pub const fn hours_remaining(&self) -> u64 {
        self.max_hour.saturating_sub(self.hour)
    }

    /// Whether the endgame override applies (`max - hour <= 5`).
    pub const fn is_endgame(&self) -> bool {
        self.hours_remaining() <= ENDGAME_HOURS
    }

    /// Whether this is the last hour (`max - hour <= 1`).
    pub const fn is_final_hour(&self) -> bool {
        self.hours_remaining() <= 1
    }
}

/// Hour counter with a fixed terminal hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationClock {
    /// Current hour.
    hour: u64,
    /// Terminal hour; the runner stops when `hour == max_hour`.
    max_hour: u64,
}

impl SimulationClock {
    /// Create a clock from the simulation bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `max_hours` is zero or the
    /// start hour is not before it.
    pub fn new(config: &SimulationBoundsConfig) -> Result<Self, ClockError> {
        Self::from_parts(config.start_hour, config.max_hours)
    }

    /// Create a clock from explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `max_hour` is zero or
    /// `hour > max_hour`.
    pub fn from_parts(hour: u64, max_hour: u64) -> Result<Self, ClockError> {
        if max_hour == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "max_hours must be at least 1".to_owned(),
            });
        }
        if hour > max_hour {
            return Err(ClockError::InvalidConfig {
                reason: format!("start hour {hour} is past max hour {max_hour}"),
            });
        }
        Ok(Self { hour, max_hour })
    }

    /// Advance by one hour. Returns the new hour.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::HourOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.hour = self.hour.checked_add(1).ok_or(ClockError::HourOverflow)?;
        Ok(self.hour)
    }

    /// Return the current hour.
    pub const fn hour(&self) -> u64 {
        self.hour
    }

    /// Return the terminal hour.
    pub const fn max_hour(&self) -> u64 {
        self.max_hour
    }

    /// Whether the terminal hour has been reached.
    pub const fn is_finished(&self) -> bool {
        self.hour == self.max_hour
    }

    /// Return the current [`HourWindow`].
    pub const fn window(&self) -> HourWindow {
        HourWindow {
            hour: self.hour,
            max_hour: self.max_hour,
        }
    }
}
