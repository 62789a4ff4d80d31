//! Canal flow bookkeeping.
//!
//! A canal's flow rate is expressed per unit of time; one simulated hour
//! moves `flow_rate * 3.6` units of volume. The same factor converts a
//! volume shortfall back into a rate when the allocation passes size flows.

use acequia_types::Canal;

/// Conversion between a flow rate and the volume it moves in one hour.
pub const HOURLY_VOLUME_FACTOR: f64 = 3.6;

/// Smallest flow an opened canal may carry.
pub const MINIMUM_FLOW: f64 = 0.25;

/// Volume moved in one hour at the given flow rate.
pub fn hourly_volume(flow_rate: f64) -> f64 {
    flow_rate * HOURLY_VOLUME_FACTOR
}

/// Flow rate that moves the given volume in one hour.
pub fn rate_for_volume(volume: f64) -> f64 {
    volume / HOURLY_VOLUME_FACTOR
}

/// Clamp `value` into `[low, high]` as `max(low, min(high, value))`.
///
/// Unlike [`f64::clamp`] this does not panic when `high < low`; the lower
/// bound wins, so an opened canal always carries at least [`MINIMUM_FLOW`].
pub const fn clamp_flow(value: f64, low: f64, high: f64) -> f64 {
    value.min(high).max(low)
}

/// Assign a flow rate and open the canal.
pub const fn open_with_flow(canal: &mut Canal, flow_rate: f64) {
    canal.flow_rate = flow_rate;
    canal.is_open = true;
}

/// Close the canal. The stale flow rate is kept but moves no water.
pub const fn close(canal: &mut Canal) {
    canal.is_open = false;
}

#[cfg(test)]
mod tests {
    use acequia_types::{CanalId, RegionId};

    use super::*;

    #[test]
    fn clamp_flow_respects_bounds() {
        assert!((clamp_flow(1.0, 0.25, 5.0) - 1.0).abs() < 1e-9);
        assert!((clamp_flow(-3.0, 0.25, 5.0) - 0.25).abs() < 1e-9);
        assert!((clamp_flow(9.0, 0.25, 5.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_flow_floor_wins_when_bounds_cross() {
        assert!((clamp_flow(2.0, 0.25, 0.1) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn volume_and_rate_are_inverse() {
        assert!((hourly_volume(rate_for_volume(7.2)) - 7.2).abs() < 1e-9);
        assert!((hourly_volume(0.25) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn open_then_close() {
        let mut canal = Canal {
            id: CanalId::new(0),
            source: RegionId::new(0),
            destination: RegionId::new(1),
            flow_rate: 0.0,
            is_open: false,
        };
        open_with_flow(&mut canal, 1.5);
        assert!(canal.is_open);
        assert!((canal.flow_rate - 1.5).abs() < 1e-9);
        close(&mut canal);
        assert!(!canal.is_open);
    }
}
