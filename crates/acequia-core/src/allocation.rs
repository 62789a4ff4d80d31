//! The hourly allocation loop: seven ordered passes over regions and canals.
//!
//! Each simulated hour the passes run strictly in this order:
//!
//! 1. **Drought buffering** -- regions in drought and within 5 of the
//!    drought level are nudged up by a fixed 5.0.
//! 2. **Canal reset** -- every canal is closed.
//! 3. **Crisis relief** -- stable donors send water to flooded or
//!    drought-stricken regions; flooded regions drain into stable
//!    neighbours.
//! 4. **Completion marking** -- exactly filled regions join the [`DoneSet`].
//! 5. **Targeted fill** -- stable, not-done regions below target pull from
//!    stable, not-done donors, greedily in collection order.
//! 6. **Overflow drain** -- regions more than 1.1 over need push their
//!    excess into stable regions that are not exactly filled.
//! 7. **Endgame override** -- in the last five hours, every donor's surplus
//!    is pointed at the single region closest to its target.
//!
//! Passes 3 through 7 only touch canals; later passes overwrite flows set
//! by earlier ones on the same canal. Iteration is always in collection
//! order, which decides which donor or canal is used first.
//!
//! Every flow is `max(0.25, min(bound, rate))`, so an opened canal always
//! carries at least [`MINIMUM_FLOW`]. Candidates whose surplus, excess or
//! remaining need is not positive are skipped before any canal is opened.

use std::collections::BTreeSet;

use acequia_types::{Region, RegionId};
use acequia_world::canal::{self, MINIMUM_FLOW};
use acequia_world::region;
use acequia_world::WaterNetwork;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::HourWindow;

/// Fixed upward nudge applied to regions close to the drought level.
pub const DROUGHT_BUFFER: f64 = 5.0;

/// Drought relief aims this far above the drought level.
pub const DROUGHT_RELIEF_MARGIN: f64 = 1.0;

/// A region is drained once its level exceeds `need + 1.1`.
pub const OVERFLOW_MARGIN: f64 = 1.1;

/// Donor floor during the endgame, and the whole floor in the final hour.
pub const ENDGAME_DONOR_FLOOR: f64 = 1.0;

// ---------------------------------------------------------------------------
// Done set
// ---------------------------------------------------------------------------

/// Regions that have reached exact fill during the current run.
///
/// Append-only: a region enters at most once and never leaves. The caller
/// owns the set across hours and threads it through each hour's passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoneSet {
    /// Membership lookup.
    members: BTreeSet<RegionId>,
    /// Members in the order they were marked.
    order: Vec<RegionId>,
}

impl DoneSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self {
            members: BTreeSet::new(),
            order: Vec::new(),
        }
    }

    /// Whether the region has been marked done.
    pub fn contains(&self, id: RegionId) -> bool {
        self.members.contains(&id)
    }

    /// Mark a region done. Returns `false` if it already was.
    pub fn insert(&mut self, id: RegionId) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    /// Number of regions marked done.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no region has been marked done.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Members in the order they were marked.
    pub fn as_slice(&self) -> &[RegionId] {
        &self.order
    }
}

// ---------------------------------------------------------------------------
// Hour report
// ---------------------------------------------------------------------------

/// What each pass did during one hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Regions nudged up by drought buffering.
    pub buffered: Vec<RegionId>,
    /// Canal assignments made by crisis relief.
    pub crisis_assignments: usize,
    /// Regions newly added to the done set this hour.
    pub newly_done: Vec<RegionId>,
    /// Canal assignments made by targeted fill.
    pub fill_assignments: usize,
    /// Canal assignments made by overflow drain.
    pub drain_assignments: usize,
    /// Endgame target and its assignment count, when the override ran.
    pub endgame: Option<EndgameOutcome>,
}

/// Result of the endgame override for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndgameOutcome {
    /// The single region resources were concentrated on.
    pub target: RegionId,
    /// Canal assignments made towards it.
    pub assignments: usize,
}

/// Run all seven passes for one hour.
///
/// Does not advance the clock; the hour cycle does that exactly once after
/// this returns.
pub fn allocate_hour(
    network: &mut WaterNetwork,
    window: HourWindow,
    done: &mut DoneSet,
) -> AllocationReport {
    let buffered = buffer_droughts(network);
    reset_canals(network);
    let crisis_assignments = relieve_crises(network);
    let newly_done = mark_completed(network, done);
    let fill_assignments = fill_targets(network, done);
    let drain_assignments = drain_overflow(network);
    let endgame = endgame_override(network, window);

    debug!(
        hour = window.hour,
        buffered = buffered.len(),
        crisis_assignments,
        newly_done = newly_done.len(),
        fill_assignments,
        drain_assignments,
        endgame_target = ?endgame.map(|e| e.target),
        open_canals = network.open_canal_count(),
        "Allocation passes complete"
    );

    AllocationReport {
        buffered,
        crisis_assignments,
        newly_done,
        fill_assignments,
        drain_assignments,
        endgame,
    }
}

// ---------------------------------------------------------------------------
// Pass 1: drought buffering
// ---------------------------------------------------------------------------

/// Raise every drought region whose level is below `capacity * 0.2 + 5` by
/// [`DROUGHT_BUFFER`]. Returns the regions that were raised.
pub fn buffer_droughts(network: &mut WaterNetwork) -> Vec<RegionId> {
    let mut buffered = Vec::new();
    for r in network.regions_mut() {
        if r.is_in_drought && r.water_level < region::drought_level(r) + DROUGHT_BUFFER {
            region::adjust_level(r, DROUGHT_BUFFER);
            buffered.push(r.id);
        }
    }
    buffered
}

// ---------------------------------------------------------------------------
// Pass 2: canal reset
// ---------------------------------------------------------------------------

/// Close every canal so no flow carries over from the previous hour.
pub fn reset_canals(network: &mut WaterNetwork) {
    network.close_all_canals();
}

// ---------------------------------------------------------------------------
// Pass 3: crisis relief
// ---------------------------------------------------------------------------

/// Route surplus into flooded and drought regions, and drain floods.
///
/// For each region `r` in crisis, the relief target is `need + 1.0` when
/// flooded and `capacity * 0.2 + 1` when in drought. Every other stable
/// region with positive surplus opens each direct canal into `r` at
/// `clamp(delta / 3.6, 0.25, surplus)`. A flooded `r` also opens each
/// direct canal to those same donors at `clamp(excess / 3.6, 0.25, excess)`,
/// draining while it receives. Returns the number of canal assignments.
pub fn relieve_crises(network: &mut WaterNetwork) -> usize {
    let (regions, canals) = network.split_mut();
    let mut assignments: usize = 0;

    for r in regions.iter().filter(|r| !region::is_stable(r)) {
        let relief_target = if r.is_flooded {
            region::fill_target(r)
        } else {
            region::drought_level(r) + DROUGHT_RELIEF_MARGIN
        };
        let delta = relief_target - r.water_level;
        let flood_excess = r.water_level - region::fill_target(r);
        let drains = r.is_flooded && flood_excess > 0.0;

        for other in regions {
            if other.id == r.id || !region::is_stable(other) {
                continue;
            }
            let surplus = region::available_surplus(other);
            if surplus <= 0.0 {
                continue;
            }

            for c in canals.iter_mut() {
                if c.connects(other.id, r.id) {
                    let flow = canal::clamp_flow(canal::rate_for_volume(delta), MINIMUM_FLOW, surplus);
                    canal::open_with_flow(c, flow);
                    assignments = assignments.saturating_add(1);
                }
                if drains && c.connects(r.id, other.id) {
                    let flow = canal::clamp_flow(
                        canal::rate_for_volume(flood_excess),
                        MINIMUM_FLOW,
                        flood_excess,
                    );
                    canal::open_with_flow(c, flow);
                    assignments = assignments.saturating_add(1);
                }
            }
        }
    }

    assignments
}

// ---------------------------------------------------------------------------
// Pass 4: completion marking
// ---------------------------------------------------------------------------

/// Add every exactly filled region to the done set. Returns the regions
/// that were newly added; running it twice in the same hour adds nothing
/// the second time.
pub fn mark_completed(network: &WaterNetwork, done: &mut DoneSet) -> Vec<RegionId> {
    network
        .regions()
        .iter()
        .filter(|r| region::is_exactly_filled(r))
        .filter_map(|r| done.insert(r.id).then_some(r.id))
        .collect()
}

// ---------------------------------------------------------------------------
// Pass 5: targeted fill
// ---------------------------------------------------------------------------

/// Greedily satisfy stable, not-done regions below their target.
///
/// Donors are tried in collection order. Each direct donor-to-target canal
/// gets `clamp(needed / 3.6, 0.25, surplus)` and reduces `needed` by the
/// volume it will carry; the target stops pulling as soon as `needed`
/// reaches zero. Returns the number of canal assignments.
pub fn fill_targets(network: &mut WaterNetwork, done: &DoneSet) -> usize {
    let (regions, canals) = network.split_mut();
    let mut assignments: usize = 0;

    for target in regions {
        if done.contains(target.id) || !region::is_stable(target) {
            continue;
        }
        let mut needed = region::fill_target(target) - target.water_level;
        if needed <= 0.0 {
            continue;
        }

        'donors: for donor in regions {
            if donor.id == target.id || !region::is_stable(donor) || done.contains(donor.id) {
                continue;
            }
            let surplus = region::available_surplus(donor);
            if surplus <= 0.0 {
                continue;
            }

            for c in canals.iter_mut().filter(|c| c.connects(donor.id, target.id)) {
                let flow = canal::clamp_flow(canal::rate_for_volume(needed), MINIMUM_FLOW, surplus);
                canal::open_with_flow(c, flow);
                assignments = assignments.saturating_add(1);
                needed -= canal::hourly_volume(flow);
                if needed <= 0.0 {
                    break 'donors;
                }
            }
        }
    }

    assignments
}

// ---------------------------------------------------------------------------
// Pass 6: overflow drain
// ---------------------------------------------------------------------------

/// Push excess out of every region whose level exceeds `need + 1.1`.
///
/// Each direct canal into a stable, not exactly filled region gets
/// `clamp(excess / 3.6, 0.25, excess)`. The excess is not reduced between
/// destinations: every destination is sized against the full excess.
/// Returns the number of canal assignments.
pub fn drain_overflow(network: &mut WaterNetwork) -> usize {
    let (regions, canals) = network.split_mut();
    let mut assignments: usize = 0;

    for source in regions {
        if source.water_level <= source.water_need + OVERFLOW_MARGIN {
            continue;
        }
        let excess = source.water_level - region::fill_target(source);

        for destination in regions {
            if destination.id == source.id
                || !region::is_stable(destination)
                || region::is_exactly_filled(destination)
            {
                continue;
            }
            for c in canals.iter_mut().filter(|c| c.connects(source.id, destination.id)) {
                let flow = canal::clamp_flow(canal::rate_for_volume(excess), MINIMUM_FLOW, excess);
                canal::open_with_flow(c, flow);
                assignments = assignments.saturating_add(1);
            }
        }
    }

    assignments
}

// ---------------------------------------------------------------------------
// Pass 7: endgame override
// ---------------------------------------------------------------------------

/// The not exactly filled region with the smallest `need - level`; the
/// first in collection order on ties.
pub fn endgame_target(regions: &[Region]) -> Option<&Region> {
    regions
        .iter()
        .filter(|r| !region::is_exactly_filled(r))
        .min_by(|a, b| {
            (a.water_need - a.water_level).total_cmp(&(b.water_need - b.water_level))
        })
}

/// Level a donor keeps back during the endgame: 1.0 in the final hour,
/// otherwise `max(1.0, need * 0.2 + 1)`.
pub fn endgame_donor_floor(donor: &Region, window: HourWindow) -> f64 {
    if window.is_final_hour() {
        ENDGAME_DONOR_FLOOR
    } else {
        ENDGAME_DONOR_FLOOR.max(donor.water_need * region::DROUGHT_THRESHOLD + 1.0)
    }
}

/// Concentrate every donor on the single region closest to completion.
///
/// Runs only when `max_hour - hour <= 5`. Donors are any region other than
/// the target that is not exactly filled, with usable surplus
/// `level - floor`. Each direct donor-to-target canal gets
/// `clamp(needed / 3.6, 0.25, surplus)` until `needed` is met. Returns
/// `None` outside the endgame or when every region is exactly filled.
pub fn endgame_override(network: &mut WaterNetwork, window: HourWindow) -> Option<EndgameOutcome> {
    if !window.is_endgame() {
        return None;
    }

    let (regions, canals) = network.split_mut();
    let target = endgame_target(regions)?;
    let mut outcome = EndgameOutcome {
        target: target.id,
        assignments: 0,
    };

    let mut needed = region::fill_target(target) - target.water_level;
    if needed <= 0.0 {
        return Some(outcome);
    }

    'donors: for donor in regions {
        if donor.id == target.id || region::is_exactly_filled(donor) {
            continue;
        }
        let surplus = donor.water_level - endgame_donor_floor(donor, window);
        if surplus <= 0.0 {
            continue;
        }

        for c in canals.iter_mut().filter(|c| c.connects(donor.id, target.id)) {
            let flow = canal::clamp_flow(canal::rate_for_volume(needed), MINIMUM_FLOW, surplus);
            canal::open_with_flow(c, flow);
            outcome.assignments = outcome.assignments.saturating_add(1);
            needed -= canal::hourly_volume(flow);
            if needed <= 0.0 {
                break 'donors;
            }
        }
    }

    Some(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use acequia_types::CanalId;

    use super::*;

    const EARLY: HourWindow = HourWindow {
        hour: 0,
        max_hour: 24,
    };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn canal_state(network: &WaterNetwork, id: CanalId) -> (bool, f64) {
        let c = network.canal(id).unwrap();
        (c.is_open, c.flow_rate)
    }

    // --- Done set ---

    #[test]
    fn done_set_is_append_only() {
        let mut done = DoneSet::new();
        assert!(done.is_empty());
        assert!(done.insert(RegionId::new(2)));
        assert!(!done.insert(RegionId::new(2)));
        assert!(done.insert(RegionId::new(0)));
        assert_eq!(done.len(), 2);
        assert_eq!(done.as_slice(), &[RegionId::new(2), RegionId::new(0)]);
    }

    // --- Pass 1 ---

    #[test]
    fn drought_buffer_raises_regions_near_threshold() {
        let mut network = WaterNetwork::new();
        let dry = network.add_region("Dry", 2.0, 10.0, 30.0).unwrap();
        let fine = network.add_region("Fine", 15.0, 10.0, 30.0).unwrap();

        let buffered = buffer_droughts(&mut network);
        assert_eq!(buffered, vec![dry]);
        assert!(approx(network.region(dry).unwrap().water_level, 7.0));
        assert!(approx(network.region(fine).unwrap().water_level, 15.0));
    }

    #[test]
    fn drought_buffer_ignores_flag_without_drought() {
        let mut network = WaterNetwork::new();
        let id = network.add_region("Low", 8.0, 10.0, 30.0).unwrap();
        // Below capacity * 0.2 + 5 but not flagged.
        assert!(buffer_droughts(&mut network).is_empty());
        assert!(approx(network.region(id).unwrap().water_level, 8.0));
    }

    // --- Pass 2 ---

    #[test]
    fn reset_closes_every_canal() {
        let mut network = WaterNetwork::new();
        let a = network.add_region("A", 10.0, 5.0, 30.0).unwrap();
        let b = network.add_region("B", 10.0, 5.0, 30.0).unwrap();
        let ab = network.add_canal(a, b).unwrap();
        let ba = network.add_canal(b, a).unwrap();
        canal::open_with_flow(network.canal_mut(ab).unwrap(), 2.0);
        canal::open_with_flow(network.canal_mut(ba).unwrap(), 2.0);

        reset_canals(&mut network);
        assert!(network.canals().iter().all(|c| !c.is_open));
    }

    #[test]
    fn hourly_allocation_closes_stale_canals() {
        // Both regions sit exactly at target: no pass reopens either canal.
        let mut network = WaterNetwork::new();
        let a = network.add_region("A", 11.0, 10.0, 30.0).unwrap();
        let b = network.add_region("B", 11.0, 10.0, 30.0).unwrap();
        let ab = network.add_canal(a, b).unwrap();
        let ba = network.add_canal(b, a).unwrap();
        canal::open_with_flow(network.canal_mut(ab).unwrap(), 2.0);
        canal::open_with_flow(network.canal_mut(ba).unwrap(), 2.0);

        let mut done = DoneSet::new();
        let report = allocate_hour(&mut network, EARLY, &mut done);
        assert_eq!(report.fill_assignments, 0);
        assert_eq!(report.drain_assignments, 0);
        assert!(!canal_state(&network, ab).0);
        assert!(!canal_state(&network, ba).0);
        assert_eq!(network.open_canal_count(), 0);
    }

    // --- Pass 3 ---

    #[test]
    fn crisis_relief_feeds_drought_region() {
        let mut network = WaterNetwork::new();
        let a = network.add_region("A", 2.0, 10.0, 30.0).unwrap();
        let b = network.add_region("B", 20.0, 10.0, 30.0).unwrap();
        let ba = network.add_canal(b, a).unwrap();
        let ab = network.add_canal(a, b).unwrap();

        let assignments = relieve_crises(&mut network);
        assert_eq!(assignments, 1);

        // delta = (30 * 0.2 + 1) - 2 = 5; 5 / 3.6 is within [0.25, 15.5].
        let (open, flow) = canal_state(&network, ba);
        assert!(open);
        assert!(approx(flow, 5.0 / 3.6));
        assert!(!canal_state(&network, ab).0);
    }

    #[test]
    fn crisis_relief_flooded_region_receives_and_drains() {
        let mut network = WaterNetwork::new();
        let wet = network.add_region("Wet", 40.0, 10.0, 30.0).unwrap();
        let donor = network.add_region("Donor", 20.0, 10.0, 30.0).unwrap();
        let inbound = network.add_canal(donor, wet).unwrap();
        let outbound = network.add_canal(wet, donor).unwrap();

        relieve_crises(&mut network);

        // Relief delta is negative, so the inbound flow sits on the floor.
        let (open_in, flow_in) = canal_state(&network, inbound);
        assert!(open_in);
        assert!(approx(flow_in, MINIMUM_FLOW));

        // Drain: excess = 40 - 11 = 29.
        let (open_out, flow_out) = canal_state(&network, outbound);
        assert!(open_out);
        assert!(approx(flow_out, 29.0 / 3.6));
    }

    #[test]
    fn crisis_relief_skips_donor_without_surplus() {
        let mut network = WaterNetwork::new();
        let a = network.add_region("A", 2.0, 10.0, 30.0).unwrap();
        // Surplus = 9 - 20 * 0.45 = 0 exactly.
        let b = network.add_region("B", 9.0, 20.0, 30.0).unwrap();
        let ba = network.add_canal(b, a).unwrap();

        assert_eq!(relieve_crises(&mut network), 0);
        assert!(!canal_state(&network, ba).0);
    }

    #[test]
    fn crisis_relief_ignores_unstable_donors() {
        let mut network = WaterNetwork::new();
        let a = network.add_region("A", 2.0, 10.0, 30.0).unwrap();
        let b = network.add_region("B", 40.0, 10.0, 30.0).unwrap();
        let ba = network.add_canal(b, a).unwrap();

        relieve_crises(&mut network);
        assert!(!canal_state(&network, ba).0);
    }

    // --- Pass 4 ---

    #[test]
    fn completion_marking_is_idempotent() {
        let mut network = WaterNetwork::new();
        let filled = network.add_region("Filled", 11.05, 10.0, 30.0).unwrap();
        let _short = network.add_region("Short", 8.0, 10.0, 30.0).unwrap();

        let mut done = DoneSet::new();
        assert_eq!(mark_completed(&network, &mut done), vec![filled]);
        let snapshot = done.clone();
        assert!(mark_completed(&network, &mut done).is_empty());
        assert_eq!(done, snapshot);
    }

    #[test]
    fn done_regions_stay_done_after_drifting() {
        let mut network = WaterNetwork::new();
        let id = network.add_region("R", 11.0, 10.0, 30.0).unwrap();
        let mut done = DoneSet::new();
        mark_completed(&network, &mut done);

        network.region_mut(id).unwrap().water_level = 3.0;
        mark_completed(&network, &mut done);
        assert!(done.contains(id));
        assert_eq!(done.len(), 1);
    }

    // --- Pass 5 ---

    #[test]
    fn targeted_fill_uses_first_donor_in_order() {
        let mut network = WaterNetwork::new();
        let target = network.add_region("Target", 10.5, 10.0, 30.0).unwrap();
        let first = network.add_region("First", 20.0, 10.0, 30.0).unwrap();
        let second = network.add_region("Second", 20.0, 10.0, 30.0).unwrap();
        let from_first = network.add_canal(first, target).unwrap();
        let from_second = network.add_canal(second, target).unwrap();

        let assignments = fill_targets(&mut network, &DoneSet::new());
        assert_eq!(assignments, 1);

        // needed = 0.5; the floor flow of 0.25 carries 0.9 and satisfies it.
        let (open, flow) = canal_state(&network, from_first);
        assert!(open);
        assert!(approx(flow, MINIMUM_FLOW));
        assert!(!canal_state(&network, from_second).0);
    }

    #[test]
    fn targeted_fill_moves_on_when_first_donor_is_capped() {
        let mut network = WaterNetwork::new();
        let target = network.add_region("Target", 6.0, 10.0, 30.0).unwrap();
        // Surplus = 5 - 4.5 = 0.5.
        let small = network.add_region("Small", 5.0, 10.0, 20.0).unwrap();
        let large = network.add_region("Large", 20.0, 10.0, 30.0).unwrap();
        let from_small = network.add_canal(small, target).unwrap();
        let from_large = network.add_canal(large, target).unwrap();

        assert_eq!(fill_targets(&mut network, &DoneSet::new()), 2);

        // needed = 5: the small donor gives 0.5 (1.8 volume), leaving 3.2.
        let (open_small, flow_small) = canal_state(&network, from_small);
        assert!(open_small);
        assert!(approx(flow_small, 0.5));
        let (open_large, flow_large) = canal_state(&network, from_large);
        assert!(open_large);
        assert!(approx(flow_large, 3.2 / 3.6));
    }

    #[test]
    fn targeted_fill_skips_done_regions() {
        let mut network = WaterNetwork::new();
        let target = network.add_region("Target", 9.0, 10.0, 30.0).unwrap();
        let donor = network.add_region("Donor", 20.0, 10.0, 30.0).unwrap();
        let c = network.add_canal(donor, target).unwrap();

        let mut done = DoneSet::new();
        done.insert(target);
        assert_eq!(fill_targets(&mut network, &done), 0);
        assert!(!canal_state(&network, c).0);

        let mut done = DoneSet::new();
        done.insert(donor);
        assert_eq!(fill_targets(&mut network, &done), 0);
    }

    // --- Pass 6 ---

    #[test]
    fn overflow_drain_sizes_every_destination_against_full_excess() {
        let mut network = WaterNetwork::new();
        let full = network.add_region("Full", 20.0, 10.0, 30.0).unwrap();
        let a = network.add_region("A", 5.0, 10.0, 20.0).unwrap();
        let b = network.add_region("B", 5.0, 10.0, 20.0).unwrap();
        let to_a = network.add_canal(full, a).unwrap();
        let to_b = network.add_canal(full, b).unwrap();

        assert_eq!(drain_overflow(&mut network), 2);
        // excess = 20 - 11 = 9 for both canals.
        assert!(approx(canal_state(&network, to_a).1, 9.0 / 3.6));
        assert!(approx(canal_state(&network, to_b).1, 9.0 / 3.6));
    }

    #[test]
    fn overflow_drain_leaves_near_equilibrium_alone() {
        let mut network = WaterNetwork::new();
        let near = network.add_region("Near", 11.1, 10.0, 30.0).unwrap();
        let low = network.add_region("Low", 7.0, 10.0, 30.0).unwrap();
        let c = network.add_canal(near, low).unwrap();
        assert_eq!(drain_overflow(&mut network), 0);
        assert!(!canal_state(&network, c).0);
    }

    #[test]
    fn overflow_drain_skips_exactly_filled_destinations() {
        let mut network = WaterNetwork::new();
        let full = network.add_region("Full", 20.0, 10.0, 30.0).unwrap();
        let filled = network.add_region("Filled", 11.0, 10.0, 30.0).unwrap();
        let c = network.add_canal(full, filled).unwrap();
        assert_eq!(drain_overflow(&mut network), 0);
        assert!(!canal_state(&network, c).0);
    }

    // --- Pass 7 ---

    #[test]
    fn endgame_inactive_early() {
        let mut network = WaterNetwork::new();
        network.add_region("A", 5.0, 10.0, 30.0).unwrap();
        assert!(endgame_override(&mut network, EARLY).is_none());
    }

    #[test]
    fn endgame_target_is_closest_with_first_tie_winning() {
        let mut network = WaterNetwork::new();
        let _far = network.add_region("Far", 2.0, 10.0, 30.0).unwrap();
        let tie_one = network.add_region("TieOne", 8.0, 10.0, 30.0).unwrap();
        let _tie_two = network.add_region("TieTwo", 8.0, 10.0, 30.0).unwrap();
        let _filled = network.add_region("Filled", 11.0, 10.0, 30.0).unwrap();

        let target = endgame_target(network.regions()).unwrap();
        assert_eq!(target.id, tie_one);
    }

    #[test]
    fn endgame_concentrates_donors_on_target() {
        let mut network = WaterNetwork::new();
        let target = network.add_region("Target", 9.0, 10.0, 30.0).unwrap();
        let donor = network.add_region("Donor", 3.5, 10.0, 30.0).unwrap();
        let far = network.add_region("Far", 1.0, 20.0, 60.0).unwrap();
        let c = network.add_canal(donor, target).unwrap();
        let other = network.add_canal(donor, far).unwrap();

        let window = HourWindow {
            hour: 20,
            max_hour: 24,
        };
        let outcome = endgame_override(&mut network, window).unwrap();
        assert_eq!(outcome.target, target);
        assert_eq!(outcome.assignments, 1);

        // floor = max(1, 10 * 0.2 + 1) = 3, so the donor is capped at 0.5.
        let (open, flow) = canal_state(&network, c);
        assert!(open);
        assert!(approx(flow, 0.5));
        assert!(!canal_state(&network, other).0);
    }

    #[test]
    fn endgame_final_hour_lowers_donor_floor() {
        let mut network = WaterNetwork::new();
        let target = network.add_region("Target", 9.0, 10.0, 30.0).unwrap();
        let donor = network.add_region("Donor", 2.5, 10.0, 30.0).unwrap();
        let c = network.add_canal(donor, target).unwrap();

        let before_final = HourWindow {
            hour: 21,
            max_hour: 24,
        };
        endgame_override(&mut network, before_final);
        assert!(!canal_state(&network, c).0);

        let final_hour = HourWindow {
            hour: 23,
            max_hour: 24,
        };
        endgame_override(&mut network, final_hour);
        // floor 1.0 -> surplus 1.5; needed 2 / 3.6 = 0.55..
        let (open, flow) = canal_state(&network, c);
        assert!(open);
        assert!(approx(flow, 2.0 / 3.6));
    }

    #[test]
    fn endgame_overfilled_target_opens_nothing() {
        let mut network = WaterNetwork::new();
        let over = network.add_region("Over", 25.0, 10.0, 30.0).unwrap();
        let donor = network.add_region("Donor", 20.0, 10.0, 30.0).unwrap();
        let c = network.add_canal(donor, over).unwrap();

        let window = HourWindow {
            hour: 22,
            max_hour: 24,
        };
        let outcome = endgame_override(&mut network, window).unwrap();
        assert_eq!(outcome.target, over);
        assert_eq!(outcome.assignments, 0);
        assert!(!canal_state(&network, c).0);
    }

    // --- Full hour ---

    #[test]
    fn allocate_hour_reports_each_pass() {
        let (mut network, ids) = acequia_world::create_default_scenario().unwrap();
        let mut done = DoneSet::new();
        let report = allocate_hour(&mut network, EARLY, &mut done);

        assert_eq!(report.buffered, vec![ids.south]);
        assert!(report.crisis_assignments > 0);
        assert!(report.endgame.is_none());
        for c in network.canals().iter().filter(|c| c.is_open) {
            assert!(c.flow_rate >= MINIMUM_FLOW);
        }
    }
}
