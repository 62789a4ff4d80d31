//! Water-level predicates for regions.
//!
//! Every allocation decision is phrased in terms of a handful of derived
//! quantities: the fill target (`need + 1.0`), whether a region sits within
//! tolerance of that target, whether it is stable, and how much water it
//! can spare as a donor. They are collected here so the passes and the
//! manager agree on the exact thresholds.

use acequia_types::Region;

/// Margin above `water_need` that counts as the filled state.
pub const FILL_MARGIN: f64 = 1.0;

/// Absolute tolerance around the fill target for the exact-fill test.
pub const EXACT_FILL_TOLERANCE: f64 = 0.1;

/// Fraction of capacity below which a region is in drought.
pub const DROUGHT_THRESHOLD: f64 = 0.2;

/// Fraction of need a donor keeps back when computing its surplus.
pub const LOW_DONOR_THRESHOLD: f64 = 0.45;

/// The level a region is driven towards: `need + 1.0`.
pub fn fill_target(region: &Region) -> f64 {
    region.water_need + FILL_MARGIN
}

/// Whether the level is strictly within 0.1 of the fill target.
pub fn is_exactly_filled(region: &Region) -> bool {
    (region.water_level - fill_target(region)).abs() < EXACT_FILL_TOLERANCE
}

/// Whether the region is neither flooded nor in drought.
pub const fn is_stable(region: &Region) -> bool {
    !region.is_flooded && !region.is_in_drought
}

/// Water a donor can spare: `max(0, level - need * 0.45)`.
#[allow(clippy::suboptimal_flops)]
pub fn available_surplus(region: &Region) -> f64 {
    (region.water_level - region.water_need * LOW_DONOR_THRESHOLD).max(0.0)
}

/// Level below which the region is in drought: `capacity * 0.2`.
pub fn drought_level(region: &Region) -> f64 {
    region.water_capacity * DROUGHT_THRESHOLD
}

/// Apply a relative change to the level. Levels never drop below zero.
pub fn adjust_level(region: &mut Region, delta: f64) {
    region.water_level = (region.water_level + delta).max(0.0);
}

/// Recompute the flood and drought flags from the current level.
///
/// Flooded means strictly above capacity; drought means strictly below
/// [`drought_level`].
pub fn refresh_status(region: &mut Region) {
    region.is_flooded = region.water_level > region.water_capacity;
    region.is_in_drought = region.water_level < drought_level(region);
}

/// Whether the region counts towards a solved network: stable and at or
/// above its need.
pub fn is_satisfied(region: &Region) -> bool {
    is_stable(region) && region.water_level >= region.water_need
}
