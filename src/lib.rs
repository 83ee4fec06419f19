//! # Shelter Router
//!
//! Nearest emergency shelter lookup and route decoding for mobile map clients.
//!
//! This library provides:
//! - Loading the bundled shelter list
//! - Nearest-shelter search by great-circle distance
//! - Encoded polyline decoding and directions response parsing
//! - A callback-driven map session that tells the platform what to draw
//!
//! ## Features
//!
//! - **`parallel`** - Enable the parallel nearest-shelter scan with rayon
//! - **`http`** - Enable the HTTP client for the directions service
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use shelter_router::{find_nearest_shelter, load_shelters_from_str, GpsPoint};
//!
//! let shelters = load_shelters_from_str(r#"[
//!     {"name": "Rabin Square", "lat": 32.0809, "lon": 34.7806},
//!     {"name": "Sarona", "lat": 32.0717, "lon": 34.7872}
//! ]"#).unwrap();
//!
//! let user = GpsPoint::new(32.0720, 34.7870);
//! if let Some(nearest) = find_nearest_shelter(&user, &shelters) {
//!     println!("Go to {} ({:.0}m)", nearest.shelter.name, nearest.distance_meters);
//! }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod geo_utils;

pub mod shelters;
pub use shelters::{
    find_nearest_shelter, load_shelters_from_path, load_shelters_from_reader,
    load_shelters_from_str,
};
#[cfg(feature = "parallel")]
pub use shelters::find_nearest_shelter_parallel;

pub mod polyline;
pub use polyline::{decode_polyline, decode_polyline_with_precision};

pub mod directions;
pub use directions::{
    directions_url, parse_directions_route, DirectionsConfig, Route, TravelMode,
};

pub mod session;
pub use session::{
    MapCommand, Marker, MarkerHue, RouteOverlay, RouteStyle, ShelterMapSession,
};

// HTTP module for the directions service
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{fetch_route_sync, DirectionsClient};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("ShelterRouterRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use shelter_router::GpsPoint;
/// let point = GpsPoint::new(32.0853, 34.7818); // Tel Aviv
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box, e.g. of a route overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(geo_utils::compute_bounds(points))
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// A named safe location.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Shelter {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Shelter {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude }
    }

    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// Result of a nearest-shelter search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct NearestShelter {
    pub shelter: Shelter,
    /// Position of the shelter in the searched list
    pub index: u32,
    /// Great-circle distance from the user, in meters
    pub distance_meters: f64,
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{debug, info};
    use std::sync::{Arc, Mutex, MutexGuard};

    /// Parse the bundled shelter asset.
    #[uniffi::export]
    pub fn ffi_load_shelters(json: String) -> Result<Vec<Shelter>> {
        init_logging();
        let shelters = load_shelters_from_str(&json)?;
        info!("[ShelterRouterRust] Loaded {} shelters", shelters.len());
        Ok(shelters)
    }

    /// Nearest shelter to the user, `None` for an empty list.
    #[uniffi::export]
    pub fn ffi_find_nearest_shelter(user: GpsPoint, shelters: Vec<Shelter>) -> Option<NearestShelter> {
        init_logging();
        debug!("[ShelterRouterRust] Nearest-shelter search over {} shelters", shelters.len());
        find_nearest_shelter_parallel(&user, &shelters)
    }

    #[uniffi::export]
    pub fn ffi_decode_polyline(encoded: String) -> Result<Vec<GpsPoint>> {
        decode_polyline(&encoded)
    }

    /// Parse a raw directions response body.
    #[uniffi::export]
    pub fn ffi_parse_directions_route(body: String) -> Result<Route> {
        init_logging();
        parse_directions_route(&body)
    }

    /// Build the directions request URL (for platforms doing their own HTTP).
    #[uniffi::export]
    pub fn ffi_directions_url(config: DirectionsConfig, origin: GpsPoint, destination: GpsPoint) -> String {
        directions_url(&config, &origin, &destination)
    }

    /// Get default route style.
    #[uniffi::export]
    pub fn default_route_style() -> RouteStyle {
        RouteStyle::default()
    }

    /// Get default directions configuration.
    #[uniffi::export]
    pub fn default_directions_config() -> DirectionsConfig {
        DirectionsConfig::default()
    }

    /// Map session handle for mobile callers.
    ///
    /// Wraps [`ShelterMapSession`] so the platform can forward its callbacks
    /// from any thread and execute the returned commands.
    #[derive(uniffi::Object)]
    pub struct MapSessionHandle {
        inner: Mutex<ShelterMapSession>,
    }

    impl MapSessionHandle {
        fn session(&self) -> MutexGuard<'_, ShelterMapSession> {
            // A panic mid-callback leaves the state usable, keep serving it
            self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[uniffi::export]
    impl MapSessionHandle {
        #[uniffi::constructor]
        pub fn new(shelters: Vec<Shelter>, style: RouteStyle) -> Arc<Self> {
            init_logging();
            info!("[ShelterRouterRust] Map session with {} shelters", shelters.len());
            Arc::new(Self {
                inner: Mutex::new(ShelterMapSession::new(shelters, style)),
            })
        }

        pub fn start(&self) -> Vec<MapCommand> {
            init_logging();
            self.session().start()
        }

        pub fn on_permission_result(&self, granted: bool) -> Vec<MapCommand> {
            init_logging();
            self.session().on_permission_result(granted)
        }

        pub fn on_welcome_message(&self, message: Option<String>) -> Vec<MapCommand> {
            init_logging();
            self.session().on_welcome_message(message)
        }

        /// Successful response of the remote greeting function.
        pub fn on_function_success(&self, message: String) -> Vec<MapCommand> {
            init_logging();
            self.session().on_function_result(Ok(message))
        }

        /// Failed call of the remote greeting function.
        pub fn on_function_error(&self, error: String) -> Vec<MapCommand> {
            init_logging();
            self.session().on_function_result(Err(error))
        }

        pub fn on_location(&self, location: Option<GpsPoint>) -> Vec<MapCommand> {
            init_logging();
            self.session().on_location(location)
        }

        pub fn on_map_ready(&self) -> Vec<MapCommand> {
            init_logging();
            self.session().on_map_ready()
        }

        pub fn on_directions_response(&self, body: String) -> Vec<MapCommand> {
            init_logging();
            self.session().on_directions_response(&body)
        }

        pub fn on_route(&self, route: Route) -> Vec<MapCommand> {
            init_logging();
            self.session().on_route(route)
        }

        pub fn on_directions_error(&self, message: String) -> Vec<MapCommand> {
            init_logging();
            self.session().on_directions_error(&message)
        }

        pub fn current_location(&self) -> Option<GpsPoint> {
            self.session().current_location()
        }

        pub fn is_map_ready(&self) -> bool {
            self.session().is_map_ready()
        }

        pub fn nearest(&self) -> Option<NearestShelter> {
            self.session().nearest().cloned()
        }

        pub fn route(&self) -> Option<Route> {
            self.session().route().cloned()
        }
    }

    /// Fetch and decode a route. Blocks the calling thread; call it off the UI thread.
    #[cfg(feature = "http")]
    #[uniffi::export]
    pub fn ffi_fetch_route(
        config: DirectionsConfig,
        origin: GpsPoint,
        destination: GpsPoint,
    ) -> Result<Route> {
        init_logging();
        let start = std::time::Instant::now();
        let route = fetch_route_sync(config, origin, destination)?;
        info!(
            "[ShelterRouterRust] Route with {} points in {:?}",
            route.points.len(),
            start.elapsed()
        );
        Ok(route)
    }
}

// ============================================================================
// Tests
// ============================================================================
