//! The manager seam between the allocation loop and the simulation it
//! drives.
//!
//! The hour cycle only needs a narrow view of its environment: the ordered
//! region and canal collections, the current and terminal hour, the solved
//! flag, and a way to advance one hour. [`Manager`] captures exactly that,
//! so the loop can be driven by [`SimulationState`] in production or by a
//! scripted manager in tests.
//!
//! [`SimulationState`]: crate::tick::SimulationState

use acequia_types::Weather;
use acequia_world::WaterNetwork;

use crate::clock::HourWindow;
use crate::tick::TickError;

/// What advancing one hour did to the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvanceOutcome {
    /// The hour after advancing.
    pub hour: u64,
    /// Weather applied during the hour, if weather is enabled.
    pub weather: Option<Weather>,
    /// Total volume carried by open canals.
    pub volume_moved: f64,
}

/// The environment the hourly allocation loop runs against.
pub trait Manager {
    /// The region/canal arena, in collection order.
    fn network(&self) -> &WaterNetwork;

    /// Mutable access to the arena for the allocation passes.
    fn network_mut(&mut self) -> &mut WaterNetwork;

    /// Current hour.
    fn hour(&self) -> u64;

    /// Terminal hour.
    fn max_hour(&self) -> u64;

    /// Whether the simulation has been marked solved.
    fn is_solved(&self) -> bool;

    /// Apply the hour's canal flows and move the clock forward by one.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] if the network or clock cannot be advanced.
    fn advance_hour(&mut self) -> Result<AdvanceOutcome, TickError>;

    /// Current hour against the terminal hour.
    fn window(&self) -> HourWindow {
        HourWindow {
            hour: self.hour(),
            max_hour: self.max_hour(),
        }
    }
}
