//! Drive a map session with a canned directions response and print the
//! commands a platform map would execute.
//!
//! Run with: cargo run --example route_from_response

use shelter_router::{GpsPoint, MapCommand, RouteStyle, Shelter, ShelterMapSession};

const RESPONSE: &str = r#"{
    "status": "OK",
    "routes": [{
        "summary": "Ibn Gabirol St",
        "legs": [{
            "distance": {"text": "1.6 km", "value": 1620},
            "duration": {"text": "5 mins", "value": 312},
            "steps": [
                {"polyline": {"points": "ctybEgihsEkCoF_Doi@"}},
                {"polyline": {"points": "o}ybEg{isEj}AfO"}}
            ]
        }]
    }]
}"#;

fn print_commands(label: &str, commands: &[MapCommand]) {
    println!("{}:", label);
    for command in commands {
        match command {
            MapCommand::AddMarker { marker: m } => println!("   marker {:?} '{}' at ({}, {})", m.hue, m.title, m.position.latitude, m.position.longitude),
            MapCommand::DrawRoute { overlay: r } => println!("   route with {} points, width {}", r.points.len(), r.width),
            other => println!("   {:?}", other),
        }
    }
    println!();
}

fn main() {
    let shelters = vec![
        Shelter::new("Rabin Square", 32.0809, 34.7806),
        Shelter::new("Sarona", 32.0717, 34.7872),
    ];
    let style = RouteStyle { mark_endpoints: true, ..RouteStyle::default() };
    let mut session = ShelterMapSession::new(shelters, style);

    print_commands("start", &session.start());
    print_commands("location", &session.on_location(Some(GpsPoint::new(32.0853, 34.7818))));
    print_commands("map ready", &session.on_map_ready());
    print_commands("directions", &session.on_directions_response(RESPONSE));

    if let Some(route) = session.route() {
        println!(
            "Route: {}m reported, {:.0}m decoded, {}s",
            route.distance_meters,
            route.path_length(),
            route.duration_seconds
        );
    }
}
