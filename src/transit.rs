//! The routing core: a doubled-vertex graph encoding the wait/ride passenger
//! cost model, built over a frozen [`Catalogue`], plus itinerary
//! reconstruction.

use std::collections::HashMap;
use std::ops::Add;

use crate::catalogue::{Catalogue, StopId};
use crate::graph::{AdditiveWeight, DirectedWeightedGraph};
use crate::router::AllPairsRouter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub enum ActivityKind {
    Wait,
    Bus,
    Mixed,
}

/// The transit graph's edge and path weight: a cost in minutes carrying
/// enough provenance (stop or bus name, span count) to render an itinerary.
///
/// Addition absorbs the identity element exactly: `zero + x == x`. This is
/// load-bearing — the all-pairs router seeds every vertex's self-distance
/// with the identity, and absorption is what keeps that seed from clobbering
/// a real edge's name and kind once a path is summed through it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct RouteWeight {
    pub kind: ActivityKind,
    pub weight: f64,
    pub name: String,
    pub span_count: u32,
}

impl RouteWeight {
    pub fn wait(stop_name: &str, minutes: f64) -> Self {
        Self { kind: ActivityKind::Wait, weight: minutes, name: stop_name.to_string(), span_count: 0 }
    }

    pub fn bus(bus_name: &str, minutes: f64, span_count: u32) -> Self {
        Self { kind: ActivityKind::Bus, weight: minutes, name: bus_name.to_string(), span_count }
    }
}

// Comparisons look only at the numeric weight, matching how paths are
// ranked by the all-pairs router; kind, name and span count are provenance,
// not ordering keys.
impl PartialEq for RouteWeight {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight
    }
}

impl PartialOrd for RouteWeight {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.weight.partial_cmp(&other.weight)
    }
}

impl Add for RouteWeight {
    type Output = RouteWeight;

    fn add(self, other: RouteWeight) -> RouteWeight {
        let zero = RouteWeight::identity();
        if self == zero {
            return other;
        }
        if other == zero {
            return self;
        }
        RouteWeight {
            kind: ActivityKind::Mixed,
            weight: self.weight + other.weight,
            name: String::new(),
            span_count: self.span_count + other.span_count,
        }
    }
}

impl AdditiveWeight for RouteWeight {
    fn identity() -> Self {
        RouteWeight { kind: ActivityKind::Wait, weight: 0.0, name: String::new(), span_count: 0 }
    }
}

/// Converts a road distance in metres and a bus velocity in km/h into a ride
/// time in minutes. Named for what it computes; the arithmetic (divide by
/// 1000 to get kilometres, then by velocity, then to minutes) is preserved
/// from the system this was ported from.
fn metres_to_kilometres(metres: f64) -> f64 {
    metres / 1000.0
}

fn bus_ride_time(metres: f64, bus_velocity_kmh: f64) -> f64 {
    (metres_to_kilometres(metres) / bus_velocity_kmh) * 60.0
}

pub enum ItineraryItem {
    Wait { stop_name: String, time: f64 },
    Bus { bus_name: String, span_count: u32, time: f64 },
}

pub struct Itinerary {
    pub total_time: f64,
    pub items: Vec<ItineraryItem>,
}

/// Wraps an [`AllPairsRouter`] over the doubled-vertex transit graph.
pub struct TransitRouter {
    graph: DirectedWeightedGraph<RouteWeight>,
    all_pairs: AllPairsRouter<RouteWeight>,
    stop_name_to_id: HashMap<String, StopId>,
}

/// The raw parts of a [`TransitRouter`], as persisted in a bundle. Re-assembled
/// directly on load rather than rebuilt, per the persisted format's
/// no-recomputation guarantee.
pub struct TransitRouterParts {
    pub graph: DirectedWeightedGraph<RouteWeight>,
    pub all_pairs: AllPairsRouter<RouteWeight>,
    pub stop_name_to_id: HashMap<String, StopId>,
}

impl TransitRouter {
    /// Reassembles a router from its persisted parts, re-interning each
    /// edge's stop/bus name against the reloaded catalogue's owned strings
    /// so no dangling borrows survive the round trip.
    pub fn from_parts(mut parts: TransitRouterParts, catalogue: &Catalogue) -> Self {
        for edge in parts.graph.edges_mut() {
            match edge.weight.kind {
                ActivityKind::Wait => {
                    if let Some((_, stop)) = catalogue.stop_by_name(&edge.weight.name) {
                        edge.weight.name = stop.name.clone();
                    }
                }
                ActivityKind::Bus => {
                    if let Some((_, bus)) = catalogue.bus_by_name(&edge.weight.name) {
                        edge.weight.name = bus.name.clone();
                    }
                }
                ActivityKind::Mixed => {}
            }
        }
        Self { graph: parts.graph, all_pairs: parts.all_pairs, stop_name_to_id: parts.stop_name_to_id }
    }

    pub fn into_parts(self) -> TransitRouterParts {
        TransitRouterParts { graph: self.graph, all_pairs: self.all_pairs, stop_name_to_id: self.stop_name_to_id }
    }

    /// Clones out the parts needed to serialize a bundle without consuming
    /// the router.
    pub fn to_parts_ref(&self) -> TransitRouterParts {
        TransitRouterParts {
            graph: self.graph.clone(),
            all_pairs: self.all_pairs.clone(),
            stop_name_to_id: self.stop_name_to_id.clone(),
        }
    }

    pub fn build(catalogue: &Catalogue) -> Self {
        let stop_count = catalogue.stops().len();
        let mut graph: DirectedWeightedGraph<RouteWeight> = DirectedWeightedGraph::new(stop_count * 2);
        let mut stop_name_to_id = HashMap::new();

        let wait_time = catalogue.routing_settings.bus_wait_time;
        for (id, stop) in catalogue.stops().iter().enumerate() {
            let id = id as StopId;
            graph.add_edge(wait_port(id), ride_port(id), RouteWeight::wait(&stop.name, wait_time));
            stop_name_to_id.insert(stop.name.clone(), id);
        }

        let velocity = catalogue.routing_settings.bus_velocity;
        for bus in catalogue.buses() {
            let stops = bus.stops();
            Self::add_ride_edges(&mut graph, catalogue, &stops, &bus.name, velocity);
            if !bus.is_ring {
                let reversed: Vec<StopId> = stops.into_iter().rev().collect();
                Self::add_ride_edges(&mut graph, catalogue, &reversed, &bus.name, velocity);
            }
        }

        let all_pairs = AllPairsRouter::build(&graph);
        Self { graph, all_pairs, stop_name_to_id }
    }

    /// For every starting position along `stops`, adds a ride edge to every
    /// later stop in the same direction.
    fn add_ride_edges(
        graph: &mut DirectedWeightedGraph<RouteWeight>,
        catalogue: &Catalogue,
        stops: &[StopId],
        bus_name: &str,
        velocity: f64,
    ) {
        for start in 0..stops.len() {
            let mut cumulative = 0.0;
            for span in start + 1..stops.len() {
                let metres = catalogue.road_distance(stops[span - 1], stops[span]).unwrap_or(0.0);
                cumulative += bus_ride_time(metres, velocity);
                let span_count = (span - start) as u32;
                graph.add_edge(
                    ride_port(stops[start]),
                    wait_port(stops[span]),
                    RouteWeight::bus(bus_name, cumulative, span_count),
                );
            }
        }
    }

    pub fn stop_id(&self, name: &str) -> Option<StopId> {
        self.stop_name_to_id.get(name).copied()
    }

    /// Builds the minimum-time itinerary between two stops. `None` if there
    /// is no path; the same-stop case is handled before consulting the table.
    pub fn build_route(&self, from: StopId, to: StopId) -> Option<Itinerary> {
        if from == to {
            return Some(Itinerary { total_time: 0.0, items: Vec::new() });
        }

        let route = self.all_pairs.build_route(&self.graph, wait_port(from), wait_port(to))?;
        let items = route
            .edges
            .iter()
            .map(|&edge_id| {
                let weight = &self.graph.edge(edge_id).weight;
                match weight.kind {
                    ActivityKind::Wait => ItineraryItem::Wait { stop_name: weight.name.clone(), time: weight.weight },
                    ActivityKind::Bus => {
                        ItineraryItem::Bus { bus_name: weight.name.clone(), span_count: weight.span_count, time: weight.weight }
                    }
                    ActivityKind::Mixed => unreachable!("a Mixed edge can only arise as a path sum, never as a stored edge"),
                }
            })
            .collect();

        Some(Itinerary { total_time: route.total_weight.weight, items })
    }
}

fn wait_port(stop_id: StopId) -> usize {
    stop_id as usize * 2
}

fn ride_port(stop_id: StopId) -> usize {
    stop_id as usize * 2 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn coord(lat: f64, lon: f64) -> Coordinates {
        Coordinates { latitude: lat, longitude: lon }
    }

    fn build_e1() -> Catalogue {
        let mut c = Catalogue::new();
        c.add_stop("A", coord(55.0, 37.0)).unwrap();
        c.add_stop("B", coord(55.1, 37.1)).unwrap();
        c.add_distance("A", "B", 1000.0).unwrap();
        c.add_distance("B", "A", 1000.0).unwrap();
        c.add_bus("X", &["A".to_string(), "B".to_string()], false).unwrap();
        c.routing_settings.bus_wait_time = 6.0;
        c.routing_settings.bus_velocity = 40.0;
        c
    }

    #[test]
    fn identity_absorption_holds() {
        let zero = RouteWeight::identity();
        let w = RouteWeight::wait("A", 6.0);

        let left = zero.clone() + w.clone();
        assert_eq!(left.kind, w.kind);
        assert_eq!(left.name, w.name);
        assert_eq!(left.weight, w.weight);

        let right = w.clone() + zero;
        assert_eq!(right.kind, w.kind);
        assert_eq!(right.name, w.name);
    }

    #[test]
    fn non_identity_addition_produces_mixed() {
        let a = RouteWeight::wait("A", 6.0);
        let b = RouteWeight::bus("X", 1.5, 1);
        let sum = a + b;
        assert_eq!(sum.kind, ActivityKind::Mixed);
        assert!((sum.weight - 7.5).abs() < 1e-9);
        assert_eq!(sum.span_count, 1);
    }

    #[test]
    fn vertex_count_is_double_stop_count() {
        let c = build_e1();
        let router = TransitRouter::build(&c);
        assert_eq!(router.graph.vertex_count(), 4);
    }

    #[test]
    fn matches_e4_wait_plus_ride() {
        let c = build_e1();
        let router = TransitRouter::build(&c);
        let a = router.stop_id("A").unwrap();
        let b = router.stop_id("B").unwrap();
        let itinerary = router.build_route(a, b).unwrap();
        assert!((itinerary.total_time - 7.5).abs() < 1e-9);
        assert_eq!(itinerary.items.len(), 2);
        match &itinerary.items[0] {
            ItineraryItem::Wait { stop_name, time } => {
                assert_eq!(stop_name, "A");
                assert!((time - 6.0).abs() < 1e-9);
            }
            _ => panic!("expected wait item first"),
        }
        match &itinerary.items[1] {
            ItineraryItem::Bus { bus_name, span_count, time } => {
                assert_eq!(bus_name, "X");
                assert_eq!(*span_count, 1);
                assert!((time - 1.5).abs() < 1e-9);
            }
            _ => panic!("expected bus item second"),
        }
    }

    #[test]
    fn matches_e5_same_stop_is_zero() {
        let c = build_e1();
        let router = TransitRouter::build(&c);
        let a = router.stop_id("A").unwrap();
        let itinerary = router.build_route(a, a).unwrap();
        assert_eq!(itinerary.total_time, 0.0);
        assert!(itinerary.items.is_empty());
    }

    #[test]
    fn matches_e6_unreachable_is_none() {
        let mut c = build_e1();
        c.add_stop("Z", coord(56.0, 38.0)).unwrap();
        let router = TransitRouter::build(&c);
        let a = router.stop_id("A").unwrap();
        let z = router.stop_id("Z").unwrap();
        assert!(router.build_route(a, z).is_none());
    }
}
