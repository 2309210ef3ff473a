//! JSON request front-end: parses a request document, fills the catalogue
//! in the order build mode requires, and dispatches stat requests to the
//! catalogue, renderer, or transit router.

use std::collections::HashMap;

use rgb::RGB8;
use serde::Deserialize;
use serde_json::Value;

use crate::catalogue::{Catalogue, RoutingSettings};
use crate::error::{RequestError, RequestResult};
use crate::geo::Coordinates;
use crate::persistence::Network;
use crate::render::{MapRenderer, RenderSettings};
use crate::svg::Color;
use crate::transit::{ItineraryItem, TransitRouter};

#[derive(Deserialize)]
struct BaseRequest {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    // Stop fields.
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    road_distances: HashMap<String, f64>,
    // Bus fields.
    #[serde(default)]
    stops: Vec<String>,
    is_roundtrip: Option<bool>,
}

#[derive(Deserialize)]
struct StatRequest {
    id: Value,
    #[serde(rename = "type")]
    kind: String,
    name: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

#[derive(Deserialize)]
struct RawRenderSettings {
    width: f64,
    height: f64,
    padding: f64,
    line_width: f64,
    stop_radius: f64,
    bus_label_font_size: u32,
    bus_label_offset: [f64; 2],
    stop_label_font_size: u32,
    stop_label_offset: [f64; 2],
    underlayer_color: Value,
    underlayer_width: f64,
    color_palette: Vec<Value>,
}

#[derive(Deserialize)]
struct SerializationSettings {
    file: String,
}

#[derive(Deserialize)]
struct BuildDocument {
    base_requests: Vec<BaseRequest>,
    routing_settings: RoutingSettings,
    render_settings: RawRenderSettings,
    serialization_settings: SerializationSettings,
}

#[derive(Deserialize)]
struct QueryDocument {
    serialization_settings: SerializationSettings,
    stat_requests: Vec<StatRequest>,
}

/// Parses a color node per the original three shapes: a bare string, a
/// 3-entry array of ints (RGB), or a 4-entry array of 3 ints plus an opacity
/// number (RGBA).
fn color_from_value(value: &Value) -> RequestResult<Color> {
    match value {
        Value::String(s) => Ok(Color::Named(s.clone())),
        Value::Array(arr) if arr.len() == 3 => {
            let rgb = parse_rgb8(arr)?;
            Ok(Color::from_rgb8(rgb))
        }
        Value::Array(arr) if arr.len() == 4 => {
            let rgb = parse_rgb8(&arr[..3])?;
            let opacity = arr[3].as_f64().ok_or_else(|| RequestError::Malformed("color opacity must be a number".into()))?;
            Ok(Color::Rgba(rgb.r, rgb.g, rgb.b, opacity))
        }
        _ => Err(RequestError::Malformed("color must be a string or a 3- or 4-entry array".into())),
    }
}

fn parse_rgb8(arr: &[Value]) -> RequestResult<RGB8> {
    let component = |v: &Value| -> RequestResult<u8> {
        v.as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| RequestError::Malformed("color component must be an integer in 0..=255".into()))
    };
    Ok(RGB8 { r: component(&arr[0])?, g: component(&arr[1])?, b: component(&arr[2])? })
}

fn render_settings_from_raw(raw: RawRenderSettings) -> RequestResult<RenderSettings> {
    Ok(RenderSettings {
        width: raw.width,
        height: raw.height,
        padding: raw.padding,
        line_width: raw.line_width,
        stop_radius: raw.stop_radius,
        bus_label_font_size: raw.bus_label_font_size,
        bus_label_offset: (raw.bus_label_offset[0], raw.bus_label_offset[1]),
        stop_label_font_size: raw.stop_label_font_size,
        stop_label_offset: (raw.stop_label_offset[0], raw.stop_label_offset[1]),
        underlayer_color: color_from_value(&raw.underlayer_color)?,
        underlayer_width: raw.underlayer_width,
        color_palette: raw.color_palette.iter().map(color_from_value).collect::<RequestResult<Vec<_>>>()?,
    })
}

/// Builds a catalogue, transit router, and render settings from a build-mode
/// document, then serializes the result to the configured file.
pub fn run_make_base(input: &str) -> RequestResult<()> {
    let document: BuildDocument = serde_json::from_str(input)?;

    let mut catalogue = Catalogue::new();
    catalogue.routing_settings = document.routing_settings;

    // Ingestion order is fixed: stops, then distances, then buses.
    for request in document.base_requests.iter().filter(|r| r.kind == "Stop") {
        let lat = request.latitude.ok_or_else(|| RequestError::Malformed(format!("stop {} missing latitude", request.name)))?;
        let lon = request.longitude.ok_or_else(|| RequestError::Malformed(format!("stop {} missing longitude", request.name)))?;
        catalogue.add_stop(&request.name, Coordinates { latitude: lat, longitude: lon })?;
    }
    for request in document.base_requests.iter().filter(|r| r.kind == "Stop") {
        for (neighbour, &metres) in &request.road_distances {
            catalogue.add_distance(&request.name, neighbour, metres)?;
        }
    }
    for request in document.base_requests.iter().filter(|r| r.kind == "Bus") {
        let is_ring = request.is_roundtrip.unwrap_or(false);
        catalogue.add_bus(&request.name, &request.stops, is_ring)?;
    }

    log::info!("built catalogue: {} stops, {} buses", catalogue.stops().len(), catalogue.buses().len());

    let router = TransitRouter::build(&catalogue);
    let render_settings = render_settings_from_raw(document.render_settings)?;
    let network = Network { catalogue, render_settings, router };

    crate::persistence::save(&network, &document.serialization_settings.file)?;
    Ok(())
}

/// Deserializes the bundle named in the document and answers every stat
/// request, returning the JSON array of responses as text.
pub fn run_process_requests(input: &str) -> RequestResult<String> {
    let document: QueryDocument = serde_json::from_str(input)?;
    let network = crate::persistence::load(&document.serialization_settings.file)?;

    let mut responses = Vec::with_capacity(document.stat_requests.len());
    for request in &document.stat_requests {
        log::debug!("answering stat request {:?} ({})", request.id, request.kind);
        let response = answer_stat_request(&network, request)?;
        responses.push(response);
    }

    Ok(serde_json::to_string(&responses)?)
}

fn answer_stat_request(network: &Network, request: &StatRequest) -> RequestResult<Value> {
    let mut response = match request.kind.as_str() {
        "Stop" => answer_stop_request(network, request)?,
        "Bus" => answer_bus_request(network, request)?,
        "Map" => answer_map_request(network),
        "Route" => answer_route_request(network, request)?,
        other => return Err(RequestError::UnknownType(other.to_string())),
    };
    response["request_id"] = request.id.clone();
    Ok(response)
}

fn answer_stop_request(network: &Network, request: &StatRequest) -> RequestResult<Value> {
    let name = request.name.as_deref().ok_or_else(|| RequestError::Malformed("Stop request missing name".into()))?;
    match network.catalogue.buses_by_stop(name) {
        None => Ok(serde_json::json!({ "error_message": "not found" })),
        Some(buses) => Ok(serde_json::json!({ "buses": buses.into_iter().collect::<Vec<_>>() })),
    }
}

fn answer_bus_request(network: &Network, request: &StatRequest) -> RequestResult<Value> {
    let name = request.name.as_deref().ok_or_else(|| RequestError::Malformed("Bus request missing name".into()))?;
    match network.catalogue.bus_info(name) {
        None => Ok(serde_json::json!({ "error_message": "not found" })),
        Some(info) => Ok(serde_json::json!({
            "curvature": info.curvature,
            "route_length": info.route_length,
            "stop_count": info.stops_count,
            "unique_stop_count": info.unique_stops_count,
        })),
    }
}

fn answer_map_request(network: &Network) -> Value {
    let renderer = MapRenderer::new(&network.catalogue, &network.render_settings);
    serde_json::json!({ "map": renderer.render() })
}

fn answer_route_request(network: &Network, request: &StatRequest) -> RequestResult<Value> {
    let from = request.from.as_deref().ok_or_else(|| RequestError::Malformed("Route request missing from".into()))?;
    let to = request.to.as_deref().ok_or_else(|| RequestError::Malformed("Route request missing to".into()))?;

    let (Some(from_id), Some(to_id)) = (network.router.stop_id(from), network.router.stop_id(to)) else {
        return Ok(serde_json::json!({ "error_message": "not found" }));
    };

    match network.router.build_route(from_id, to_id) {
        None => Ok(serde_json::json!({ "error_message": "not found" })),
        Some(itinerary) => {
            let items: Vec<Value> = itinerary
                .items
                .iter()
                .map(|item| match item {
                    ItineraryItem::Wait { stop_name, time } => {
                        serde_json::json!({ "type": "Wait", "stop_name": stop_name, "time": time })
                    }
                    ItineraryItem::Bus { bus_name, span_count, time } => {
                        serde_json::json!({ "type": "Bus", "bus": bus_name, "span_count": span_count, "time": time })
                    }
                })
                .collect();
            Ok(serde_json::json!({ "total_time": itinerary.total_time, "items": items }))
        }
    }
}
