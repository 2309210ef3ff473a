//! Map rendering: projects stop coordinates onto the SVG canvas and emits
//! route/stop layers in a fixed z-order.

use std::collections::BTreeMap;

use crate::catalogue::Catalogue;
use crate::geo::Coordinates;
use crate::svg::{Circle, Color, Document, Object, PathProps, Point, Polyline, Text};

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub line_width: f64,
    pub stop_radius: f64,
    pub bus_label_font_size: u32,
    pub bus_label_offset: (f64, f64),
    pub stop_label_font_size: u32,
    pub stop_label_offset: (f64, f64),
    pub underlayer_color: Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<Color>,
}

/// Projects geographic coordinates onto the canvas. The zoom factor is the
/// minimum of the width- and height-derived factors; an axis whose
/// coordinate range is (near-)zero contributes no factor at all, rather than
/// forcing a division by zero.
struct SphereProjector {
    min_lon: f64,
    max_lat: f64,
    zoom: f64,
    padding: f64,
}

impl SphereProjector {
    fn build(points: &[Coordinates], width: f64, height: f64, padding: f64) -> Self {
        let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_lon = min_lon.min(p.longitude);
            max_lon = max_lon.max(p.longitude);
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
        }

        let width_zoom = if (max_lon - min_lon).abs() > EPSILON {
            Some((width - 2.0 * padding) / (max_lon - min_lon))
        } else {
            None
        };
        let height_zoom = if (max_lat - min_lat).abs() > EPSILON {
            Some((height - 2.0 * padding) / (max_lat - min_lat))
        } else {
            None
        };

        let zoom = match (width_zoom, height_zoom) {
            (Some(w), Some(h)) => w.min(h),
            (Some(w), None) => w,
            (None, Some(h)) => h,
            (None, None) => 0.0,
        };

        Self { min_lon: if min_lon.is_finite() { min_lon } else { 0.0 }, max_lat: if max_lat.is_finite() { max_lat } else { 0.0 }, zoom, padding }
    }

    fn project(&self, p: Coordinates) -> Point {
        Point { x: (p.longitude - self.min_lon) * self.zoom + self.padding, y: (self.max_lat - p.latitude) * self.zoom + self.padding }
    }
}

pub struct MapRenderer<'a> {
    catalogue: &'a Catalogue,
    settings: &'a RenderSettings,
}

impl<'a> MapRenderer<'a> {
    pub fn new(catalogue: &'a Catalogue, settings: &'a RenderSettings) -> Self {
        Self { catalogue, settings }
    }

    /// Stops touched by at least one bus, in lexicographic order.
    fn rendered_stops(&self) -> BTreeMap<&str, Coordinates> {
        let mut stops = BTreeMap::new();
        for bus in self.catalogue.buses() {
            for stop_id in bus.unique_stops() {
                let stop = &self.catalogue.stops()[stop_id as usize];
                stops.insert(stop.name.as_str(), stop.coordinates);
            }
        }
        stops
    }

    fn buses_sorted(&self) -> BTreeMap<&str, &crate::catalogue::Bus> {
        self.catalogue.buses().iter().map(|b| (b.name.as_str(), b)).collect()
    }

    pub fn render(&self) -> String {
        let stops = self.rendered_stops();
        let all_coords: Vec<Coordinates> = stops.values().copied().collect();
        let projector = SphereProjector::build(&all_coords, self.settings.width, self.settings.height, self.settings.padding);

        let mut doc = Document::new();
        self.render_route_lines(&mut doc, &projector);
        self.render_route_names(&mut doc, &projector);
        self.render_stop_circles(&mut doc, &projector, &stops);
        self.render_stop_names(&mut doc, &projector, &stops);
        doc.render()
    }

    fn bus_coordinates(&self, bus: &crate::catalogue::Bus) -> Vec<Coordinates> {
        bus.stops().iter().map(|&id| self.catalogue.stops()[id as usize].coordinates).collect()
    }

    fn palette_color(&self, index: usize) -> Color {
        if self.settings.color_palette.is_empty() {
            return Color::None;
        }
        self.settings.color_palette[index % self.settings.color_palette.len()].clone()
    }

    fn render_route_lines(&self, doc: &mut Document, projector: &SphereProjector) {
        for (index, (_, bus)) in self.buses_sorted().into_iter().enumerate() {
            if bus.stops().is_empty() {
                continue;
            }
            let color = self.palette_color(index);
            let coords = self.bus_coordinates(bus);
            let mut points: Vec<Point> = coords.iter().map(|&c| projector.project(c)).collect();
            if !bus.is_ring {
                let mut back: Vec<Point> = coords.iter().rev().skip(1).map(|&c| projector.project(c)).collect();
                points.append(&mut back);
            }
            doc.add(Object::Polyline(Polyline {
                points,
                props: PathProps {
                    fill: Some(Color::None),
                    stroke: Some(color),
                    stroke_width: Some(self.settings.line_width),
                    stroke_linecap: Some("round"),
                    stroke_linejoin: Some("round"),
                },
            }));
        }
    }

    fn label_pair(&self, position: Point, bus_name: &str, color: Color) -> [Object; 2] {
        let underlayer = Text {
            position,
            offset: Point { x: self.settings.bus_label_offset.0, y: self.settings.bus_label_offset.1 },
            font_size: self.settings.bus_label_font_size,
            font_family: Some("Verdana".to_string()),
            font_weight: Some("bold".to_string()),
            data: bus_name.to_string(),
            props: PathProps {
                fill: Some(self.settings.underlayer_color.clone()),
                stroke: Some(self.settings.underlayer_color.clone()),
                stroke_width: Some(self.settings.underlayer_width),
                stroke_linecap: Some("round"),
                stroke_linejoin: Some("round"),
            },
        };
        let foreground = Text {
            position,
            offset: Point { x: self.settings.bus_label_offset.0, y: self.settings.bus_label_offset.1 },
            font_size: self.settings.bus_label_font_size,
            font_family: Some("Verdana".to_string()),
            font_weight: Some("bold".to_string()),
            data: bus_name.to_string(),
            props: PathProps { fill: Some(color), ..Default::default() },
        };
        [Object::Text(underlayer), Object::Text(foreground)]
    }

    fn render_route_names(&self, doc: &mut Document, projector: &SphereProjector) {
        for (index, (_, bus)) in self.buses_sorted().into_iter().enumerate() {
            let coords = self.bus_coordinates(bus);
            let (Some(&first), Some(&last)) = (coords.first(), coords.last()) else { continue };
            let color = self.palette_color(index);

            let [under, fore] = self.label_pair(projector.project(first), &bus.name, color.clone());
            doc.add(under);
            doc.add(fore);

            if first.latitude != last.latitude || first.longitude != last.longitude {
                let [under, fore] = self.label_pair(projector.project(last), &bus.name, color);
                doc.add(under);
                doc.add(fore);
            }
        }
    }

    fn render_stop_circles(&self, doc: &mut Document, projector: &SphereProjector, stops: &BTreeMap<&str, Coordinates>) {
        for &coords in stops.values() {
            doc.add(Object::Circle(Circle {
                center: projector.project(coords),
                radius: self.settings.stop_radius,
                props: PathProps { fill: Some(Color::Named("white".to_string())), ..Default::default() },
            }));
        }
    }

    fn render_stop_names(&self, doc: &mut Document, projector: &SphereProjector, stops: &BTreeMap<&str, Coordinates>) {
        for (&name, &coords) in stops {
            let position = projector.project(coords);
            let offset = Point { x: self.settings.stop_label_offset.0, y: self.settings.stop_label_offset.1 };
            doc.add(Object::Text(Text {
                position,
                offset,
                font_size: self.settings.stop_label_font_size,
                font_family: Some("Verdana".to_string()),
                font_weight: None,
                data: name.to_string(),
                props: PathProps {
                    fill: Some(self.settings.underlayer_color.clone()),
                    stroke: Some(self.settings.underlayer_color.clone()),
                    stroke_width: Some(self.settings.underlayer_width),
                    stroke_linecap: Some("round"),
                    stroke_linejoin: Some("round"),
                },
            }));
            doc.add(Object::Text(Text {
                position,
                offset,
                font_size: self.settings.stop_label_font_size,
                font_family: Some("Verdana".to_string()),
                font_weight: None,
                data: name.to_string(),
                props: PathProps { fill: Some(Color::Named("black".to_string())), ..Default::default() },
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn coord(lat: f64, lon: f64) -> Coordinates {
        Coordinates { latitude: lat, longitude: lon }
    }

    #[test]
    fn projector_falls_back_when_longitude_range_is_zero() {
        let points = vec![coord(0.0, 10.0), coord(1.0, 10.0)];
        let projector = SphereProjector::build(&points, 100.0, 100.0, 10.0);
        assert!(projector.zoom > 0.0);
    }

    #[test]
    fn projector_is_zero_when_all_points_coincide() {
        let points = vec![coord(5.0, 5.0)];
        let projector = SphereProjector::build(&points, 100.0, 100.0, 10.0);
        assert_eq!(projector.zoom, 0.0);
    }

    #[test]
    fn svg_output_contains_declaration_and_root_tag() {
        let mut catalogue = Catalogue::new();
        catalogue.add_stop("A", coord(55.0, 37.0)).unwrap();
        catalogue.add_stop("B", coord(55.1, 37.1)).unwrap();
        catalogue.add_distance("A", "B", 1000.0).unwrap();
        catalogue.add_distance("B", "A", 1000.0).unwrap();
        catalogue.add_bus("X", &["A".to_string(), "B".to_string()], false).unwrap();

        let settings = RenderSettings {
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
        let renderer = MapRenderer::new(&catalogue, &settings);
        let svg = renderer.render();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("<circle"));
    }
}
