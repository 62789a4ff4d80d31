//! Shared type definitions for the Acequia water allocation simulation.
//!
//! This crate is the single source of truth for the data model shared
//! across the workspace: regions (nodes holding water) and canals (directed
//! conduits between them), plus the handles used to refer to them.
//!
//! # Modules
//!
//! - [`ids`] -- Arena handles for regions and canals
//! - [`enums`] -- Region status and hourly weather
//! - [`structs`] -- The [`Region`] and [`Canal`] records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{RegionStatus, Weather};
pub use ids::{CanalId, RegionId};
pub use structs::{Canal, Region};
