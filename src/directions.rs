//! Directions service request building and response parsing.
//!
//! Only the pieces of the Google Directions JSON response that the route
//! overlay needs are modelled. The route geometry is the concatenation of
//! every step's encoded polyline in the first leg of the first route.

use log::{debug, info, warn};
use serde::Deserialize;

use crate::geo_utils::polyline_length;
use crate::polyline::decode_polyline;
use crate::{Bounds, Error, GpsPoint, Result};

/// Google Directions JSON endpoint.
pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Environment variables consulted by [`DirectionsConfig::from_env`], in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["SHELTER_ROUTER_DIRECTIONS_KEY", "GOOGLE_MAPS_API_KEY"];

// ============================================================================
// Configuration
// ============================================================================

/// How the route should be travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    /// Value of the `mode` query parameter.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

/// Configuration for the directions service.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct DirectionsConfig {
    /// API key appended to every request. Never logged.
    pub api_key: String,
    /// Endpoint returning Google-style directions JSON.
    /// Default: [`DEFAULT_DIRECTIONS_URL`]
    pub base_url: String,
    /// Default: driving
    pub mode: TravelMode,
    /// Whole-request timeout in seconds. Default: 30
    pub timeout_secs: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_DIRECTIONS_URL.to_string(),
            mode: TravelMode::default(),
            timeout_secs: 30,
        }
    }
}

impl DirectionsConfig {
    /// Default configuration with the API key taken from the environment.
    ///
    /// Leaves the key empty when none of [`API_KEY_ENV_VARS`] is set.
    pub fn from_env() -> Self {
        let api_key = API_KEY_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_default();
        Self { api_key, ..Self::default() }
    }

    /// Same configuration with a different API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Build the request URL for a route from `origin` to `destination`.
///
/// ```rust
/// use shelter_router::{directions_url, DirectionsConfig, GpsPoint};
///
/// let config = DirectionsConfig::default().with_api_key("KEY");
/// let url = directions_url(&config, &GpsPoint::new(32.0853, 34.7818), &GpsPoint::new(32.0717, 34.7872));
/// assert_eq!(
///     url,
///     "https://maps.googleapis.com/maps/api/directions/json?origin=32.0853,34.7818&destination=32.0717,34.7872&mode=driving&key=KEY"
/// );
/// ```
pub fn directions_url(config: &DirectionsConfig, origin: &GpsPoint, destination: &GpsPoint) -> String {
    format!(
        "{}?origin={},{}&destination={},{}&mode={}&key={}",
        config.base_url.trim_end_matches('?'),
        origin.latitude,
        origin.longitude,
        destination.latitude,
        destination.longitude,
        config.mode.as_query_value(),
        config.api_key.trim(),
    )
}

// ============================================================================
// Response model
// ============================================================================

/// A decoded route ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Route {
    /// Ordered path from origin to destination
    pub points: Vec<GpsPoint>,
    /// Leg distance reported by the service, in meters
    pub distance_meters: u32,
    /// Leg duration reported by the service, in seconds
    pub duration_seconds: u32,
    /// Short human-readable label (e.g. the main road), may be empty
    pub summary: String,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    /// Bounding box of `points`
    pub bounds: Bounds,
}

impl Route {
    pub fn start(&self) -> Option<GpsPoint> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<GpsPoint> {
        self.points.last().copied()
    }

    /// Length of the decoded path in meters, independent of the reported distance.
    pub fn path_length(&self) -> f64 {
        polyline_length(&self.points)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    #[serde(default)]
    distance: Option<ApiValue>,
    #[serde(default)]
    duration: Option<ApiValue>,
    #[serde(default)]
    start_address: Option<String>,
    #[serde(default)]
    end_address: Option<String>,
    #[serde(default)]
    steps: Vec<ApiStep>,
}

#[derive(Debug, Deserialize)]
struct ApiValue {
    value: u32,
}

#[derive(Debug, Deserialize)]
struct ApiStep {
    polyline: ApiPolyline,
}

#[derive(Debug, Deserialize)]
struct ApiPolyline {
    points: String,
}

/// Parse a directions response body into a [`Route`].
///
/// Uses the first leg of the first route and joins every step's geometry in
/// order.
pub fn parse_directions_route(body: &str) -> Result<Route> {
    let response: ApiResponse = serde_json::from_str(body)?;

    let Some(route) = response.routes.into_iter().next() else {
        if !response.status.is_empty() && response.status != "OK" {
            warn!(
                "[ShelterRouter] Directions status {}: {}",
                response.status,
                response.error_message.as_deref().unwrap_or("no message")
            );
            return Err(Error::ApiStatus {
                status: response.status,
                message: response.error_message,
            });
        }
        return Err(Error::NoRoute);
    };

    let leg = route.legs.into_iter().next().ok_or(Error::NoRoute)?;

    let mut points = Vec::new();
    for (i, step) in leg.steps.iter().enumerate() {
        let decoded = decode_polyline(&step.polyline.points)?;
        debug!("[ShelterRouter] Step {}: {} points", i, decoded.len());
        points.extend(decoded);
    }

    let bounds = Bounds::from_points(&points).ok_or(Error::NoRoute)?;

    let route = Route {
        points,
        distance_meters: leg.distance.map_or(0, |d| d.value),
        duration_seconds: leg.duration.map_or(0, |d| d.value),
        summary: route.summary,
        start_address: leg.start_address,
        end_address: leg.end_address,
        bounds,
    };

    info!(
        "[ShelterRouter] Parsed route: {} steps, {} points, {}m, {}s",
        leg.steps.len(),
        route.points.len(),
        route.distance_meters,
        route.duration_seconds
    );

    Ok(route)
}
