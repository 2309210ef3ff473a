//! Stops, buses, and the road-distance table.
//!
//! Every cross-entity reference is a stable index (`StopId`/`BusId`) into an
//! append-only `Vec` rather than a borrowed reference, so ids taken during
//! build remain valid once the catalogue is frozen and serialized.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{CatalogueError, CatalogueResult};
use crate::geo::Coordinates;

pub type StopId = u32;
pub type BusId = u32;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct Stop {
    pub name: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct Bus {
    pub name: String,
    pub is_ring: bool,
    /// Adjacent stop-id pairs forming the outbound traversal.
    pub keys_for_distance: Vec<(StopId, StopId)>,
    pub geo_distance: f64,
}

impl Bus {
    /// The full ordered stop-id list, reconstructed from `keys_for_distance`.
    pub fn stops(&self) -> Vec<StopId> {
        let mut out = Vec::with_capacity(self.keys_for_distance.len() + 1);
        if let Some((first, _)) = self.keys_for_distance.first() {
            out.push(*first);
        }
        for &(_, second) in &self.keys_for_distance {
            out.push(second);
        }
        out
    }

    pub fn unique_stops(&self) -> BTreeSet<StopId> {
        self.stops().into_iter().collect()
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct RoutingSettings {
    pub bus_wait_time: f64,
    pub bus_velocity: f64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self { bus_wait_time: 0.0, bus_velocity: 1.0 }
    }
}

pub struct BusInfo {
    pub stops_count: usize,
    pub unique_stops_count: usize,
    pub route_length: f64,
    pub curvature: f64,
}

/// Append-only store of stops, buses, and the road-distance table.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct Catalogue {
    stops: Vec<Stop>,
    stop_index: HashMap<String, StopId>,
    buses: Vec<Bus>,
    bus_index: HashMap<String, BusId>,
    /// Road distance in metres, keyed by (from, to).
    distances: BTreeMap<(StopId, StopId), f64>,
    stop_to_buses: HashMap<StopId, BTreeSet<BusId>>,
    pub routing_settings: RoutingSettings,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stop(&mut self, name: &str, coordinates: Coordinates) -> CatalogueResult<StopId> {
        if self.stop_index.contains_key(name) {
            return Err(CatalogueError::DuplicateStop(name.to_string()));
        }
        let id = self.stops.len() as StopId;
        self.stops.push(Stop { name: name.to_string(), coordinates });
        self.stop_index.insert(name.to_string(), id);
        self.stop_to_buses.entry(id).or_default();
        Ok(id)
    }

    /// Sets the forward distance `from -> to` unconditionally; sets the
    /// reverse distance `to -> from` only if it is not already present.
    pub fn add_distance(&mut self, from: &str, to: &str, metres: f64) -> CatalogueResult<()> {
        let from_id = self.stop_id(from)?;
        let to_id = self.stop_id(to)?;
        self.distances.insert((from_id, to_id), metres);
        self.distances.entry((to_id, from_id)).or_insert(metres);
        Ok(())
    }

    pub fn add_bus(&mut self, name: &str, stop_names: &[String], is_ring: bool) -> CatalogueResult<BusId> {
        let stop_ids: Vec<StopId> = stop_names.iter().map(|n| self.stop_id(n)).collect::<CatalogueResult<_>>()?;

        let mut keys_for_distance = Vec::new();
        let mut geo_distance = 0.0;
        for pair in stop_ids.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            keys_for_distance.push((a, b));
            geo_distance += self.coordinates(a).distance(self.coordinates(b));
        }
        if !is_ring {
            geo_distance *= 2.0;
        }

        let id = self.buses.len() as BusId;
        for &stop_id in &stop_ids {
            self.stop_to_buses.entry(stop_id).or_default().insert(id);
        }
        self.buses.push(Bus { name: name.to_string(), is_ring, keys_for_distance, geo_distance });
        self.bus_index.insert(name.to_string(), id);
        Ok(id)
    }

    fn stop_id(&self, name: &str) -> CatalogueResult<StopId> {
        self.stop_index.get(name).copied().ok_or_else(|| CatalogueError::UnknownStop(name.to_string()))
    }

    fn coordinates(&self, id: StopId) -> Coordinates {
        self.stops[id as usize].coordinates
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn stop_by_name(&self, name: &str) -> Option<(StopId, &Stop)> {
        self.stop_index.get(name).map(|&id| (id, &self.stops[id as usize]))
    }

    pub fn bus_by_name(&self, name: &str) -> Option<(BusId, &Bus)> {
        self.bus_index.get(name).map(|&id| (id, &self.buses[id as usize]))
    }

    fn distance(&self, from: StopId, to: StopId) -> f64 {
        self.distances.get(&(from, to)).copied().unwrap_or(0.0)
    }

    pub fn road_distance(&self, from: StopId, to: StopId) -> Option<f64> {
        self.distances.get(&(from, to)).copied()
    }

    pub fn bus_info(&self, name: &str) -> Option<BusInfo> {
        let (_, bus) = self.bus_by_name(name)?;
        let hops = bus.keys_for_distance.len();
        let stops_count = if bus.is_ring { hops + 1 } else { hops * 2 + 1 };

        let mut route_length = 0.0;
        for &(a, b) in &bus.keys_for_distance {
            route_length += self.distance(a, b);
            if !bus.is_ring {
                route_length += self.distance(b, a);
            }
        }

        let curvature = if bus.geo_distance > 0.0 { route_length / bus.geo_distance } else { 1.0 };

        Some(BusInfo {
            stops_count,
            unique_stops_count: bus.unique_stops().len(),
            route_length,
            curvature,
        })
    }

    /// Returns the sorted set of bus names touching this stop, or `None` if
    /// the stop itself is unknown.
    pub fn buses_by_stop(&self, name: &str) -> Option<BTreeSet<&str>> {
        let (id, _) = self.stop_by_name(name)?;
        let ids = self.stop_to_buses.get(&id)?;
        Some(ids.iter().map(|&bus_id| self.buses[bus_id as usize].name.as_str()).collect())
    }
}
