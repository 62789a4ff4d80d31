//! Error types for the `acequia-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`].

use acequia_types::RegionId;

/// Errors that can occur during water network operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A region handle does not refer to any region in the network.
    #[error("region not found: {0}")]
    UnknownRegion(RegionId),

    /// A scenario referenced a region name that was never declared.
    #[error("region name not found: {0}")]
    UnknownRegionName(String),

    /// A canal was declared with the same region at both ends.
    #[error("canal from region {0} back to itself")]
    SelfLoop(RegionId),

    /// A region name was declared twice.
    #[error("duplicate region name: {0}")]
    DuplicateRegionName(String),

    /// A region quantity is negative, NaN or infinite.
    #[error("region {region} has invalid {field}: {value}")]
    InvalidQuantity {
        /// The region's name.
        region: String,
        /// The offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The arena cannot hold more entities than fit in a `u32` handle.
    #[error("water network is full")]
    ArenaFull,
}
