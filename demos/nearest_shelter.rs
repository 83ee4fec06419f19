//! Find the nearest bundled shelter to a coordinate.
//!
//! Run with: cargo run --example nearest_shelter -- 32.0720 34.7870

use shelter_router::{find_nearest_shelter, geo_utils, load_shelters_from_path, GpsPoint};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let user = match args.as_slice() {
        [lat, lng] => GpsPoint::new(lat.parse()?, lng.parse()?),
        _ => GpsPoint::new(32.0853, 34.7818), // Dizengoff St, Tel Aviv
    };

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shelters.json");
    let shelters = load_shelters_from_path(path)?;

    println!("Nearest Shelter\n");
    println!("User at ({}, {}), {} shelters loaded\n", user.latitude, user.longitude, shelters.len());

    for shelter in &shelters {
        let dist = geo_utils::haversine_distance(&user, &shelter.position());
        println!("   {:<20} {:>8.0}m", shelter.name, dist);
    }

    match find_nearest_shelter(&user, &shelters) {
        Some(nearest) => println!(
            "\nNearest: {} ({:.0}m)",
            nearest.shelter.name, nearest.distance_meters
        ),
        None => println!("\nNo nearest shelter found"),
    }

    Ok(())
}
