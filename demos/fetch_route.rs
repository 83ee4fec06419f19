//! Fetch a live route to the nearest bundled shelter.
//! Run with: SHELTER_ROUTER_DIRECTIONS_KEY=... cargo run --example fetch_route --features http

use shelter_router::{
    find_nearest_shelter, load_shelters_from_path, DirectionsClient, DirectionsConfig, GpsPoint,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let user = GpsPoint::new(32.0853, 34.7818);
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shelters.json");
    let shelters = load_shelters_from_path(path)?;

    let Some(nearest) = find_nearest_shelter(&user, &shelters) else {
        println!("No nearest shelter found");
        return Ok(());
    };
    println!("Nearest shelter: {} ({:.0}m)", nearest.shelter.name, nearest.distance_meters);

    let client = DirectionsClient::new(DirectionsConfig::from_env())?;
    let route = client.fetch_route(&user, &nearest.shelter.position()).await?;

    println!(
        "Route: {} points, {}m, {}s via {}",
        route.points.len(),
        route.distance_meters,
        route.duration_seconds,
        if route.summary.is_empty() { "-" } else { route.summary.as_str() }
    );
    Ok(())
}
