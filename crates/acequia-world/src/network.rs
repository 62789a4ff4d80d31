//! The water network: regions as nodes, canals as directed edges.
//!
//! [`WaterNetwork`] owns both arenas. Handles are arena positions, so
//! iteration order is insertion order everywhere. Canals store handle pairs
//! rather than references, which lets the allocation passes read regions
//! while rewriting canals through [`WaterNetwork::split_mut`].

use acequia_types::{Canal, CanalId, Region, RegionId};
use tracing::trace;

use crate::canal;
use crate::error::WorldError;
use crate::region;

/// The region/canal arena for one simulation run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaterNetwork {
    /// All regions in insertion order; `regions[i].id == RegionId(i)`.
    regions: Vec<Region>,
    /// All canals in insertion order; `canals[i].id == CanalId(i)`.
    canals: Vec<Canal>,
}

impl WaterNetwork {
    /// Create an empty network.
    pub const fn new() -> Self {
        Self {
            regions: Vec::new(),
            canals: Vec::new(),
        }
    }

    // -------------------------------------------------------------------
    // Region operations
    // -------------------------------------------------------------------

    /// Add a region. Its flood and drought flags are derived from the
    /// starting level.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateRegionName`] if the name is taken,
    /// [`WorldError::InvalidQuantity`] if a quantity is negative or not
    /// finite, or [`WorldError::ArenaFull`] if no handle is left.
    pub fn add_region(
        &mut self,
        name: &str,
        water_level: f64,
        water_need: f64,
        water_capacity: f64,
    ) -> Result<RegionId, WorldError> {
        if self.region_by_name(name).is_some() {
            return Err(WorldError::DuplicateRegionName(name.to_owned()));
        }
        for (field, value) in [
            ("water_level", water_level),
            ("water_need", water_need),
            ("water_capacity", water_capacity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(WorldError::InvalidQuantity {
                    region: name.to_owned(),
                    field,
                    value,
                });
            }
        }

        let id = RegionId::new(u32::try_from(self.regions.len()).map_err(|_err| WorldError::ArenaFull)?);
        let mut new_region = Region {
            id,
            name: name.to_owned(),
            water_level,
            water_need,
            water_capacity,
            is_flooded: false,
            is_in_drought: false,
        };
        region::refresh_status(&mut new_region);
        trace!(%id, name, status = ?new_region.status(), "Region added");
        self.regions.push(new_region);
        Ok(id)
    }

    /// Get a region by handle.
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    /// Get a region mutably by handle.
    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(id.index())
    }

    /// Find a region by name.
    pub fn region_by_name(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// All regions in collection order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// All regions, mutably, in collection order.
    pub fn regions_mut(&mut self) -> &mut [Region] {
        &mut self.regions
    }

    /// Return the number of regions.
    pub const fn region_count(&self) -> usize {
        self.regions.len()
    }

    // -------------------------------------------------------------------
    // Canal operations
    // -------------------------------------------------------------------

    /// Add a closed canal from `source` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownRegion`] if either endpoint is missing,
    /// [`WorldError::SelfLoop`] if both endpoints are the same region, or
    /// [`WorldError::ArenaFull`] if no handle is left.
    pub fn add_canal(&mut self, source: RegionId, destination: RegionId) -> Result<CanalId, WorldError> {
        if self.region(source).is_none() {
            return Err(WorldError::UnknownRegion(source));
        }
        if self.region(destination).is_none() {
            return Err(WorldError::UnknownRegion(destination));
        }
        if source == destination {
            return Err(WorldError::SelfLoop(source));
        }

        let id = CanalId::new(u32::try_from(self.canals.len()).map_err(|_err| WorldError::ArenaFull)?);
        self.canals.push(Canal {
            id,
            source,
            destination,
            flow_rate: 0.0,
            is_open: false,
        });
        trace!(%id, %source, %destination, "Canal added");
        Ok(id)
    }

    /// Get a canal by handle.
    pub fn canal(&self, id: CanalId) -> Option<&Canal> {
        self.canals.get(id.index())
    }

    /// Get a canal mutably by handle.
    pub fn canal_mut(&mut self, id: CanalId) -> Option<&mut Canal> {
        self.canals.get_mut(id.index())
    }

    /// All canals in collection order.
    pub fn canals(&self) -> &[Canal] {
        &self.canals
    }

    /// Return the number of canals.
    pub const fn canal_count(&self) -> usize {
        self.canals.len()
    }

    /// Handles of every canal running directly from `source` to
    /// `destination`, in collection order.
    pub fn canals_between(&self, source: RegionId, destination: RegionId) -> Vec<CanalId> {
        self.canals
            .iter()
            .filter(|c| c.connects(source, destination))
            .map(|c| c.id)
            .collect()
    }

    /// Borrow the regions immutably and the canals mutably at once.
    pub fn split_mut(&mut self) -> (&[Region], &mut [Canal]) {
        (&self.regions, &mut self.canals)
    }

    // -------------------------------------------------------------------
    // Batch operations
    // -------------------------------------------------------------------

    /// Close every canal.
    pub fn close_all_canals(&mut self) {
        self.canals.iter_mut().for_each(canal::close);
    }

    /// Number of canals currently open.
    pub fn open_canal_count(&self) -> usize {
        self.canals.iter().filter(|c| c.is_open).count()
    }

    /// Move water through every open canal, in collection order.
    ///
    /// Each open canal moves `flow_rate * 3.6` from its source to its
    /// destination, capped by what the source holds at that moment.
    /// Returns the total volume moved.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownRegion`] if a canal points outside the
    /// region arena.
    pub fn transfer_open_canals(&mut self) -> Result<f64, WorldError> {
        let mut moved = 0.0;
        for c in self.canals.iter().filter(|c| c.is_open) {
            let available = self
                .regions
                .get(c.source.index())
                .ok_or(WorldError::UnknownRegion(c.source))?
                .water_level;
            let volume = canal::hourly_volume(c.flow_rate).min(available).max(0.0);

            let source = self
                .regions
                .get_mut(c.source.index())
                .ok_or(WorldError::UnknownRegion(c.source))?;
            region::adjust_level(source, -volume);
            let destination = self
                .regions
                .get_mut(c.destination.index())
                .ok_or(WorldError::UnknownRegion(c.destination))?;
            region::adjust_level(destination, volume);

            trace!(canal = %c.id, volume, "Canal transfer");
            moved += volume;
        }
        Ok(moved)
    }

    /// Add the same delta to every region's level (floored at zero).
    pub fn adjust_all_levels(&mut self, delta: f64) {
        for r in &mut self.regions {
            region::adjust_level(r, delta);
        }
    }

    /// Recompute every region's flood and drought flags.
    pub fn refresh_statuses(&mut self) {
        self.regions.iter_mut().for_each(region::refresh_status);
    }

    /// Whether every region is stable and at or above its need.
    pub fn all_satisfied(&self) -> bool {
        self.regions.iter().all(region::is_satisfied)
    }

    /// Sum of all region levels.
    pub fn total_water(&self) -> f64 {
        self.regions.iter().map(|r| r.water_level).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn make_network() -> (WaterNetwork, RegionId, RegionId) {
        let mut network = WaterNetwork::new();
        let a = network.add_region("Upper", 20.0, 10.0, 30.0).unwrap();
        let b = network.add_region("Lower", 8.0, 10.0, 30.0).unwrap();
        (network, a, b)
    }

    #[test]
    fn handles_follow_insertion_order() {
        let (network, a, b) = make_network();
        assert_eq!(a, RegionId::new(0));
        assert_eq!(b, RegionId::new(1));
        assert_eq!(network.region(b).unwrap().name, "Lower");
        assert_eq!(network.region_by_name("Upper").unwrap().id, a);
    }

    #[test]
    fn add_region_derives_flags() {
        let mut network = WaterNetwork::new();
        let dry = network.add_region("Dry", 2.0, 10.0, 30.0).unwrap();
        let wet = network.add_region("Wet", 40.0, 10.0, 30.0).unwrap();
        assert!(network.region(dry).unwrap().is_in_drought);
        assert!(network.region(wet).unwrap().is_flooded);
    }

    #[test]
    fn duplicate_names_rejected() {
        let (mut network, _, _) = make_network();
        let result = network.add_region("Upper", 1.0, 1.0, 1.0);
        assert!(matches!(result, Err(WorldError::DuplicateRegionName(_))));
    }

    #[test]
    fn invalid_quantities_rejected() {
        let mut network = WaterNetwork::new();
        assert!(matches!(
            network.add_region("Bad", -1.0, 1.0, 1.0),
            Err(WorldError::InvalidQuantity { field: "water_level", .. })
        ));
        assert!(matches!(
            network.add_region("Nan", 1.0, f64::NAN, 1.0),
            Err(WorldError::InvalidQuantity { field: "water_need", .. })
        ));
    }

    #[test]
    fn canal_endpoints_validated() {
        let (mut network, a, _) = make_network();
        assert!(matches!(network.add_canal(a, a), Err(WorldError::SelfLoop(_))));
        assert!(matches!(
            network.add_canal(a, RegionId::new(9)),
            Err(WorldError::UnknownRegion(_))
        ));
    }

    #[test]
    fn canals_between_is_directional_and_ordered() {
        let (mut network, a, b) = make_network();
        let first = network.add_canal(a, b).unwrap();
        let _reverse = network.add_canal(b, a).unwrap();
        let second = network.add_canal(a, b).unwrap();
        assert_eq!(network.canals_between(a, b), vec![first, second]);
    }

    #[test]
    fn transfer_moves_volume_for_open_canals_only() {
        let (mut network, a, b) = make_network();
        let open = network.add_canal(a, b).unwrap();
        let closed = network.add_canal(b, a).unwrap();
        canal::open_with_flow(network.canal_mut(open).unwrap(), 1.0);
        network.canal_mut(closed).unwrap().flow_rate = 5.0;

        let moved = network.transfer_open_canals().unwrap();
        assert!((moved - 3.6).abs() < 1e-9);
        assert!((network.region(a).unwrap().water_level - 16.4).abs() < 1e-9);
        assert!((network.region(b).unwrap().water_level - 11.6).abs() < 1e-9);
        assert!((network.total_water() - 28.0).abs() < 1e-9);
    }

    #[test]
    fn transfer_capped_by_source_level() {
        let mut network = WaterNetwork::new();
        let a = network.add_region("Small", 1.0, 10.0, 30.0).unwrap();
        let b = network.add_region("Big", 10.0, 10.0, 30.0).unwrap();
        let id = network.add_canal(a, b).unwrap();
        canal::open_with_flow(network.canal_mut(id).unwrap(), 10.0);

        let moved = network.transfer_open_canals().unwrap();
        assert!((moved - 1.0).abs() < 1e-9);
        assert!(network.region(a).unwrap().water_level.abs() < 1e-9);
    }

    #[test]
    fn close_all_canals_closes_everything() {
        let (mut network, a, b) = make_network();
        let id = network.add_canal(a, b).unwrap();
        canal::open_with_flow(network.canal_mut(id).unwrap(), 1.0);
        assert_eq!(network.open_canal_count(), 1);
        network.close_all_canals();
        assert_eq!(network.open_canal_count(), 0);
    }

    #[test]
    fn all_satisfied_checks_every_region() {
        let (mut network, _, b) = make_network();
        assert!(!network.all_satisfied());
        network.region_mut(b).unwrap().water_level = 10.0;
        network.refresh_statuses();
        assert!(network.all_satisfied());
    }
}
