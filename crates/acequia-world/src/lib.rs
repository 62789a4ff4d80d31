//! Regions, canals, weather, and scenarios for the Acequia simulation.
//!
//! This crate models the physical side of the simulation: an arena of
//! regions connected by directed canals, the water-level predicates the
//! allocation passes are written against, hourly canal transfers, and the
//! deterministic weather that perturbs levels between hours.
//!
//! # Modules
//!
//! - [`canal`] -- Flow bookkeeping and the flow-rate-to-volume conversion.
//! - [`environment`] -- Deterministic hourly weather and its effect on levels.
//! - [`error`] -- Error types for network operations.
//! - [`network`] -- [`WaterNetwork`], the insertion-ordered region/canal arena.
//! - [`region`] -- Exact-fill, stability, surplus and status predicates.
//! - [`scenario`] -- Scenario descriptions and the built-in four-region network.

pub mod canal;
pub mod environment;
pub mod error;
pub mod network;
pub mod region;
pub mod scenario;

// Re-export primary types at crate root.
pub use environment::{WeatherEffects, WeatherSystem};
pub use error::WorldError;
pub use network::WaterNetwork;
pub use scenario::{CanalSpec, DefaultRegionIds, RegionSpec, ScenarioSpec, create_default_scenario};
