//! Binary persistence of a fully-built network: catalogue, render settings,
//! transit graph, and all-pairs table, in one version-tagged file.
//!
//! Encoding uses `bitcode`'s derive-based `Encode`/`Decode` traits over a
//! plain-data bundle. Nothing is recomputed on load: the graph and all-pairs
//! table are restored directly, and only the transit router's edge names are
//! re-interned against the reloaded catalogue's owned strings.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bitcode::{Decode, Encode};

use crate::catalogue::Catalogue;
use crate::error::{PersistenceError, PersistenceResult};
use crate::graph::DirectedWeightedGraph;
use crate::render::RenderSettings;
use crate::router::AllPairsRouter;
use crate::transit::{RouteWeight, TransitRouter, TransitRouterParts};

pub const BUNDLE_VERSION: u32 = 1;

#[derive(Encode, Decode)]
struct Bundle {
    version: u32,
    catalogue: Catalogue,
    render_settings: RenderSettings,
    graph: DirectedWeightedGraph<RouteWeight>,
    all_pairs: AllPairsRouter<RouteWeight>,
    stop_name_to_id: std::collections::HashMap<String, u32>,
}

pub struct Network {
    pub catalogue: Catalogue,
    pub render_settings: RenderSettings,
    pub router: TransitRouter,
}

pub fn save(network: &Network, path: impl AsRef<Path>) -> PersistenceResult<()> {
    log::info!(
        "serializing network: {} stops, {} buses",
        network.catalogue.stops().len(),
        network.catalogue.buses().len()
    );

    // `into_parts`/`from_parts` take TransitRouter by value; clone the parts
    // we need out rather than consuming the caller's network.
    let router_parts = clone_router_parts(&network.router);

    let bundle = Bundle {
        version: BUNDLE_VERSION,
        catalogue: network.catalogue.clone(),
        render_settings: network.render_settings.clone(),
        graph: router_parts.graph,
        all_pairs: router_parts.all_pairs,
        stop_name_to_id: router_parts.stop_name_to_id,
    };

    let bytes = bitcode::encode(&bundle);
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> PersistenceResult<Network> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let bundle: Bundle = bitcode::decode(&bytes).map_err(|e| PersistenceError::Decode(e.to_string()))?;
    if bundle.version != BUNDLE_VERSION {
        return Err(PersistenceError::VersionMismatch { expected: BUNDLE_VERSION, found: bundle.version });
    }

    log::info!(
        "deserializing network: {} stops, {} buses",
        bundle.catalogue.stops().len(),
        bundle.catalogue.buses().len()
    );

    let parts = TransitRouterParts { graph: bundle.graph, all_pairs: bundle.all_pairs, stop_name_to_id: bundle.stop_name_to_id };
    let router = TransitRouter::from_parts(parts, &bundle.catalogue);

    Ok(Network { catalogue: bundle.catalogue, render_settings: bundle.render_settings, router })
}

/// `TransitRouter` does not implement `Clone` (the all-pairs table can be
/// large); serialization instead borrows a shallow copy of just the fields
/// a bundle needs.
fn clone_router_parts(router: &TransitRouter) -> TransitRouterParts {
    router.to_parts_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::svg::Color;

    fn coord(lat: f64, lon: f64) -> Coordinates {
        Coordinates { latitude: lat, longitude: lon }
    }

    fn sample_network() -> Network {
        let mut catalogue = Catalogue::new();
        catalogue.add_stop("A", coord(55.0, 37.0)).unwrap();
        catalogue.add_stop("B", coord(55.1, 37.1)).unwrap();
        catalogue.add_distance("A", "B", 1000.0).unwrap();
        catalogue.add_distance("B", "A", 1000.0).unwrap();
        catalogue.add_bus("X", &["A".to_string(), "B".to_string()], false).unwrap();
        catalogue.routing_settings.bus_wait_time = 6.0;
        catalogue.routing_settings.bus_velocity = 40.0;

        let router = TransitRouter::build(&catalogue);
        let render_settings = RenderSettings {
            width: 600.0,
            height: 400.0,
            padding: 50.0,
            line_width: 14.0,
            stop_radius: 5.0,
            bus_label_font_size: 20,
            bus_label_offset: (7.0, 15.0),
            stop_label_font_size: 18,
            stop_label_offset: (7.0, -3.0),
            underlayer_color: Color::Named("white".to_string()),
            underlayer_width: 3.0,
            color_palette: vec![Color::Named("green".to_string())],
        };

        Network { catalogue, render_settings, router }
    }

    #[test]
    fn round_trip_preserves_route_query() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("transit_router_test_{}.bundle", std::process::id()));

        let network = sample_network();
        let a = network.router.stop_id("A").unwrap();
        let b = network.router.stop_id("B").unwrap();
        let before = network.router.build_route(a, b).unwrap();

        save(&network, &path).unwrap();
        let reloaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let a2 = reloaded.router.stop_id("A").unwrap();
        let b2 = reloaded.router.stop_id("B").unwrap();
        let after = reloaded.router.build_route(a2, b2).unwrap();

        assert_eq!(before.total_time, after.total_time);
        assert_eq!(before.items.len(), after.items.len());
        assert_eq!(reloaded.catalogue.bus_info("X").unwrap().route_length, network.catalogue.bus_info("X").unwrap().route_length);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut catalogue = Catalogue::new();
        catalogue.add_stop("A", coord(55.0, 37.0)).unwrap();
        let router = TransitRouter::build(&catalogue);
        let render_settings = RenderSettings {
            width: 100.0,
            height: 100.0,
            padding: 10.0,
            line_width: 1.0,
            stop_radius: 1.0,
            bus_label_font_size: 10,
            bus_label_offset: (0.0, 0.0),
            stop_label_font_size: 10,
            stop_label_offset: (0.0, 0.0),
            underlayer_color: Color::None,
            underlayer_width: 1.0,
            color_palette: vec![],
        };
        let network = Network { catalogue, render_settings, router };
        let router_parts = clone_router_parts(&network.router);
        let bad_bundle = Bundle {
            version: BUNDLE_VERSION + 1,
            catalogue: network.catalogue.clone(),
            render_settings: network.render_settings.clone(),
            graph: router_parts.graph,
            all_pairs: router_parts.all_pairs,
            stop_name_to_id: router_parts.stop_name_to_id,
        };
        let bytes = bitcode::encode(&bad_bundle);
        let dir = std::env::temp_dir();
        let path = dir.join(format!("transit_router_test_bad_{}.bundle", std::process::id()));
        std::fs::write(&path, bytes).unwrap();

        let err = load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, PersistenceError::VersionMismatch { .. }));
    }
}
