use transit_router::catalogue::Catalogue;
use transit_router::geo::Coordinates;
use transit_router::svg::Color;
use transit_router::render::RenderSettings;
use transit_router::transit::TransitRouter;

// Common example data for the examples and benchmarks.

/// Builds a small network with a linear bus and a ring bus sharing one stop,
/// used by benches and integration tests in place of a real dataset.
pub fn build_example_catalogue() -> Catalogue {
    let mut catalogue = Catalogue::new();
    catalogue.add_stop("Tolstopaltsevo", Coordinates { latitude: 55.611087, longitude: 37.20829 }).unwrap();
    catalogue.add_stop("Marushkino", Coordinates { latitude: 55.595884, longitude: 37.209755 }).unwrap();
    catalogue.add_stop("Rasskazovka", Coordinates { latitude: 55.632761, longitude: 37.333324 }).unwrap();
    catalogue.add_stop("Biryulyovo Zapadnoye", Coordinates { latitude: 55.574371, longitude: 37.6517 }).unwrap();
    catalogue.add_stop("Biryusinka", Coordinates { latitude: 55.581065, longitude: 37.64839 }).unwrap();
    catalogue.add_stop("Universam", Coordinates { latitude: 55.587655, longitude: 37.645687 }).unwrap();

    catalogue.add_distance("Tolstopaltsevo", "Marushkino", 3900.0).unwrap();
    catalogue.add_distance("Marushkino", "Rasskazovka", 9900.0).unwrap();
    catalogue.add_distance("Biryulyovo Zapadnoye", "Biryusinka", 1800.0).unwrap();
    catalogue.add_distance("Biryusinka", "Universam", 1600.0).unwrap();
    catalogue.add_distance("Universam", "Biryulyovo Zapadnoye", 1500.0).unwrap();

    catalogue
        .add_bus("750", &["Tolstopaltsevo".to_string(), "Marushkino".to_string(), "Rasskazovka".to_string()], false)
        .unwrap();
    catalogue
        .add_bus(
            "256",
            &[
                "Biryulyovo Zapadnoye".to_string(),
                "Biryusinka".to_string(),
                "Universam".to_string(),
                "Biryulyovo Zapadnoye".to_string(),
            ],
            true,
        )
        .unwrap();

    catalogue.routing_settings.bus_wait_time = 6.0;
    catalogue.routing_settings.bus_velocity = 40.0;
    catalogue
}

pub fn build_example_router() -> (Catalogue, TransitRouter) {
    let catalogue = build_example_catalogue();
    let router = TransitRouter::build(&catalogue);
    (catalogue, router)
}

pub fn example_render_settings() -> RenderSettings {
    RenderSettings {
        width: 600.0,
        height: 400.0,
        padding: 50.0,
        line_width: 14.0,
        stop_radius: 5.0,
        bus_label_font_size: 20,
        bus_label_offset: (7.0, 15.0),
        stop_label_font_size: 18,
        stop_label_offset: (7.0, -3.0),
        underlayer_color: Color::Rgba(255, 255, 255, 0.85),
        underlayer_width: 3.0,
        color_palette: vec![Color::Named("green".to_string()), Color::Rgb(255, 160, 0), Color::Named("red".to_string())],
    }
}

pub fn example_query_pair() -> (&'static str, &'static str) {
    ("Tolstopaltsevo", "Rasskazovka")
}
