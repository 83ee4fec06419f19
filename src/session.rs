//! Map session: sequencing of the platform callbacks.
//!
//! The platform owns permissions, the location provider, the map widget and
//! the network. It forwards each callback into [`ShelterMapSession`] and
//! executes the [`MapCommand`]s that come back. The session itself does no
//! I/O, so the whole flow can be driven from tests.
//!
//! ```rust
//! use shelter_router::{GpsPoint, MapCommand, RouteStyle, Shelter, ShelterMapSession};
//!
//! let shelters = vec![Shelter::new("Sarona", 32.0717, 34.7872)];
//! let mut session = ShelterMapSession::new(shelters, RouteStyle::default());
//!
//! assert_eq!(session.start(), vec![MapCommand::RequestLocation]);
//! assert_eq!(session.on_location(Some(GpsPoint::new(32.0853, 34.7818))), vec![MapCommand::RequestMap]);
//!
//! let commands = session.on_map_ready();
//! assert!(commands.iter().any(|c| matches!(c, MapCommand::RequestDirections { .. })));
//! ```

use log::{debug, info, warn};

use crate::directions::{parse_directions_route, Route};
use crate::geo_utils::pad_bounds;
use crate::shelters::find_nearest_shelter;
use crate::{Bounds, GpsPoint, NearestShelter, Shelter};

/// Zoom level used when centering on a single point.
pub const DEFAULT_ZOOM: f32 = 18.0;
/// Title of the marker placed on the user.
pub const USER_MARKER_TITLE: &str = "My Location";
pub const LOCATION_UNAVAILABLE_MESSAGE: &str = "Cannot get location.";
pub const PERMISSION_DENIED_MESSAGE: &str = "Location permission is denied, please allow the permission";

/// Marker color, as a hue on the standard map pin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum MarkerHue {
    /// The platform's default pin
    Default,
    Yellow,
    Green,
    Azure,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Marker {
    pub position: GpsPoint,
    pub title: String,
    pub hue: MarkerHue,
}

/// Appearance of the drawn route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RouteStyle {
    /// Stroke width in pixels. Default: 10
    pub width: f32,
    /// ARGB color. Default: opaque blue
    pub color_argb: u32,
    /// Place start/end pins on the route. Default: false
    pub mark_endpoints: bool,
    /// Move the camera to show the whole route. Default: true
    pub fit_bounds: bool,
    /// Margin around the route when fitting, in meters. Default: 50
    pub fit_padding_meters: f64,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            width: 10.0,
            color_argb: 0xFF00_00FF,
            mark_endpoints: false,
            fit_bounds: true,
            fit_padding_meters: 50.0,
        }
    }
}

/// A polyline overlay ready to hand to the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RouteOverlay {
    pub points: Vec<GpsPoint>,
    pub width: f32,
    pub color_argb: u32,
}

/// Something the platform layer should do next.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum MapCommand {
    /// Ask the location provider for a fresh fix (after checking permission).
    RequestLocation,
    /// Ask for the map widget; answer with [`ShelterMapSession::on_map_ready`].
    RequestMap,
    AddMarker { marker: Marker },
    MoveCamera { target: GpsPoint, zoom: f32 },
    FitBounds { bounds: Bounds },
    /// Fetch directions; answer with [`ShelterMapSession::on_directions_response`].
    RequestDirections { origin: GpsPoint, destination: GpsPoint },
    DrawRoute { overlay: RouteOverlay },
    /// Transient user-facing notification.
    ShowToast { message: String },
    /// Replace the banner text (welcome message, backend greeting).
    ShowMessage { message: String },
}

fn add_marker(position: GpsPoint, title: impl Into<String>, hue: MarkerHue) -> MapCommand {
    MapCommand::AddMarker {
        marker: Marker { position, title: title.into(), hue },
    }
}

/// State of one map screen, from creation to the drawn route.
#[derive(Debug)]
pub struct ShelterMapSession {
    shelters: Vec<Shelter>,
    style: RouteStyle,
    current_location: Option<GpsPoint>,
    map_ready: bool,
    nearest: Option<NearestShelter>,
    route: Option<Route>,
}

impl ShelterMapSession {
    pub fn new(shelters: Vec<Shelter>, style: RouteStyle) -> Self {
        Self {
            shelters,
            style,
            current_location: None,
            map_ready: false,
            nearest: None,
            route: None,
        }
    }

    pub fn shelters(&self) -> &[Shelter] {
        &self.shelters
    }

    pub fn current_location(&self) -> Option<GpsPoint> {
        self.current_location
    }

    pub fn is_map_ready(&self) -> bool {
        self.map_ready
    }

    /// Shelter chosen as the route destination, once the map has been ready
    /// with a known location.
    pub fn nearest(&self) -> Option<&NearestShelter> {
        self.nearest.as_ref()
    }

    /// Last successfully parsed route.
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Screen created: start by locating the user.
    pub fn start(&mut self) -> Vec<MapCommand> {
        debug!("[ShelterMapSession] start with {} shelters", self.shelters.len());
        vec![MapCommand::RequestLocation]
    }

    /// Answer to the location permission prompt.
    pub fn on_permission_result(&mut self, granted: bool) -> Vec<MapCommand> {
        if granted {
            vec![MapCommand::RequestLocation]
        } else {
            warn!("[ShelterMapSession] Location permission denied");
            vec![MapCommand::ShowToast { message: PERMISSION_DENIED_MESSAGE.to_string() }]
        }
    }

    /// Value of the welcome entry in the realtime store. `None` when the read
    /// was cancelled or the entry is missing.
    pub fn on_welcome_message(&mut self, message: Option<String>) -> Vec<MapCommand> {
        match message {
            Some(message) => {
                debug!("[ShelterMapSession] Welcome message: {}", message);
                vec![MapCommand::ShowMessage { message }]
            }
            None => {
                warn!("[ShelterMapSession] Failed to read welcome message");
                Vec::new()
            }
        }
    }

    /// Outcome of the remote greeting function.
    pub fn on_function_result(&mut self, result: std::result::Result<String, String>) -> Vec<MapCommand> {
        match result {
            Ok(message) => {
                debug!("[ShelterMapSession] Function response: {}", message);
                vec![MapCommand::ShowMessage { message }]
            }
            Err(e) => {
                warn!("[ShelterMapSession] Error calling remote function: {}", e);
                Vec::new()
            }
        }
    }

    /// Result of a location request. `None` means the provider had no fix.
    pub fn on_location(&mut self, location: Option<GpsPoint>) -> Vec<MapCommand> {
        let Some(location) = location else {
            warn!("[ShelterMapSession] Location is null");
            return vec![MapCommand::ShowToast { message: LOCATION_UNAVAILABLE_MESSAGE.to_string() }];
        };

        debug!(
            "[ShelterMapSession] Location {} {}",
            location.latitude, location.longitude
        );
        self.current_location = Some(location);

        let mut commands = vec![MapCommand::RequestMap];
        if self.map_ready {
            commands.extend(self.user_marker_and_camera());
        }
        commands
    }

    /// The map widget is available.
    pub fn on_map_ready(&mut self) -> Vec<MapCommand> {
        self.map_ready = true;
        debug!("[ShelterMapSession] Map ready");

        let mut commands: Vec<MapCommand> = self
            .shelters
            .iter()
            .map(|shelter| {
                add_marker(shelter.position(), shelter.name.clone(), MarkerHue::Default)
            })
            .collect();

        commands.extend(self.user_marker_and_camera());

        match self.current_location {
            Some(origin) => {
                self.nearest = find_nearest_shelter(&origin, &self.shelters);
                if let Some(nearest) = &self.nearest {
                    let destination = nearest.shelter.position();
                    info!(
                        "[ShelterMapSession] Requesting directions to {} ({:.0}m away)",
                        nearest.shelter.name, nearest.distance_meters
                    );
                    commands.push(MapCommand::RequestDirections { origin, destination });
                }
            }
            None => {
                debug!("[ShelterMapSession] No location yet, centering on first shelter");
                if let Some(first) = self.shelters.first() {
                    commands.push(MapCommand::MoveCamera {
                        target: first.position(),
                        zoom: DEFAULT_ZOOM,
                    });
                }
            }
        }

        commands
    }

    /// Raw body of a directions response.
    ///
    /// A body that does not yield a route is logged and produces no commands.
    pub fn on_directions_response(&mut self, body: &str) -> Vec<MapCommand> {
        match parse_directions_route(body) {
            Ok(route) => self.on_route(route),
            Err(e) => {
                warn!("[ShelterMapSession] Cannot draw route: {}", e);
                Vec::new()
            }
        }
    }

    /// A route obtained some other way (e.g. the bundled HTTP client).
    pub fn on_route(&mut self, route: Route) -> Vec<MapCommand> {
        let mut commands = vec![MapCommand::DrawRoute {
            overlay: RouteOverlay {
                points: route.points.clone(),
                width: self.style.width,
                color_argb: self.style.color_argb,
            },
        }];

        if self.style.mark_endpoints {
            if let (Some(start), Some(end)) = (route.start(), route.end()) {
                commands.push(add_marker(start, "Start", MarkerHue::Green));
                let title = self
                    .nearest
                    .as_ref()
                    .map_or_else(|| "Destination".to_string(), |n| n.shelter.name.clone());
                commands.push(add_marker(end, title, MarkerHue::Azure));
            }
        }

        if self.style.fit_bounds {
            commands.push(MapCommand::FitBounds {
                bounds: pad_bounds(&route.bounds, self.style.fit_padding_meters),
            });
        }

        info!("[ShelterMapSession] Route drawn with {} points", route.points.len());
        self.route = Some(route);
        commands
    }

    /// The directions request itself failed.
    pub fn on_directions_error(&mut self, message: &str) -> Vec<MapCommand> {
        warn!("[ShelterMapSession] Directions request failed: {}", message);
        Vec::new()
    }

    fn user_marker_and_camera(&self) -> Vec<MapCommand> {
        let Some(location) = self.current_location else {
            return Vec::new();
        };
        vec![
            add_marker(location, USER_MARKER_TITLE, MarkerHue::Yellow),
            MapCommand::MoveCamera { target: location, zoom: DEFAULT_ZOOM },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE_RESPONSE: &str = r#"{
        "status": "OK",
        "routes": [{"legs": [{
            "distance": {"value": 1620},
            "duration": {"value": 312},
            "steps": [
                {"polyline": {"points": "ctybEgihsEkCoF_Doi@"}},
                {"polyline": {"points": "o}ybEg{isEj}AfO"}}
            ]
        }]}]
    }"#;

    fn sample_shelters() -> Vec<Shelter> {
        vec![
            Shelter::new("Rabin Square", 32.0809, 34.7806),
            Shelter::new("Sarona", 32.0717, 34.7872),
        ]
    }

    fn user() -> GpsPoint {
        GpsPoint::new(32.0720, 34.7870)
    }

    fn count_markers(commands: &[MapCommand]) -> usize {
        commands.iter().filter(|c| matches!(c, MapCommand::AddMarker { .. })).count()
    }

    #[test]
    fn test_start_requests_location() {
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        assert_eq!(session.start(), vec![MapCommand::RequestLocation]);
    }

    #[test]
    fn test_permission_flow() {
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        assert_eq!(session.on_permission_result(true), vec![MapCommand::RequestLocation]);
        assert_eq!(
            session.on_permission_result(false),
            vec![MapCommand::ShowToast { message: PERMISSION_DENIED_MESSAGE.to_string() }]
        );
    }

    #[test]
    fn test_null_location_shows_toast() {
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        assert_eq!(
            session.on_location(None),
            vec![MapCommand::ShowToast { message: LOCATION_UNAVAILABLE_MESSAGE.to_string() }]
        );
        assert!(session.current_location().is_none());
    }

    #[test]
    fn test_location_then_map_requests_directions_to_nearest() {
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        assert_eq!(session.on_location(Some(user())), vec![MapCommand::RequestMap]);

        let commands = session.on_map_ready();
        // Two shelters plus the user
        assert_eq!(count_markers(&commands), 3);
        assert!(commands.contains(&MapCommand::MoveCamera { target: user(), zoom: DEFAULT_ZOOM }));
        assert_eq!(
            commands.last(),
            Some(&MapCommand::RequestDirections {
                origin: user(),
                destination: GpsPoint::new(32.0717, 34.7872),
            })
        );
        assert_eq!(session.nearest().map(|n| n.shelter.name.as_str()), Some("Sarona"));
    }

    #[test]
    fn test_map_before_location_centers_on_first_shelter() {
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        let commands = session.on_map_ready();
        assert_eq!(count_markers(&commands), 2);
        assert_eq!(
            commands.last(),
            Some(&MapCommand::MoveCamera {
                target: GpsPoint::new(32.0809, 34.7806),
                zoom: DEFAULT_ZOOM,
            })
        );
        assert!(session.is_map_ready());

        // A late fix moves the camera straight away
        let commands = session.on_location(Some(user()));
        assert_eq!(commands[0], MapCommand::RequestMap);
        assert!(matches!(&commands[1], MapCommand::AddMarker { marker } if marker.title == USER_MARKER_TITLE && marker.hue == MarkerHue::Yellow));
        assert_eq!(commands[2], MapCommand::MoveCamera { target: user(), zoom: DEFAULT_ZOOM });
    }

    #[test]
    fn test_no_shelters_no_directions() {
        let mut session = ShelterMapSession::new(Vec::new(), RouteStyle::default());
        session.on_location(Some(user()));
        let commands = session.on_map_ready();
        assert!(!commands.iter().any(|c| matches!(c, MapCommand::RequestDirections { .. })));
        assert!(session.nearest().is_none());
    }

    #[test]
    fn test_directions_response_draws_route() {
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        session.on_location(Some(user()));
        session.on_map_ready();

        let commands = session.on_directions_response(ROUTE_RESPONSE);
        match &commands[0] {
            MapCommand::DrawRoute { overlay } => {
                assert_eq!(overlay.points.len(), 5);
                assert_eq!(overlay.width, 10.0);
                assert_eq!(overlay.color_argb, 0xFF0000FF);
            }
            other => panic!("expected DrawRoute, got {:?}", other),
        }
        match commands.last() {
            Some(MapCommand::FitBounds { bounds }) => {
                assert!(bounds.min_lat < 32.0717);
                assert!(bounds.max_lng > 34.7898);
            }
            other => panic!("expected FitBounds, got {:?}", other),
        }
        assert_eq!(session.route().map(|r| r.distance_meters), Some(1620));
    }

    #[test]
    fn test_route_endpoint_markers() {
        let style = RouteStyle { mark_endpoints: true, fit_bounds: false, ..RouteStyle::default() };
        let mut session = ShelterMapSession::new(sample_shelters(), style);
        session.on_location(Some(user()));
        session.on_map_ready();

        let commands = session.on_directions_response(ROUTE_RESPONSE);
        assert_eq!(commands.len(), 3);
        assert!(matches!(&commands[1], MapCommand::AddMarker { marker } if marker.title == "Start"));
        assert!(matches!(&commands[2], MapCommand::AddMarker { marker } if marker.title == "Sarona"));
    }

    #[test]
    fn test_bad_directions_response_is_ignored() {
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        assert!(session.on_directions_response("not json").is_empty());
        assert!(session.on_directions_response(r#"{"status": "ZERO_RESULTS", "routes": []}"#).is_empty());
        assert!(session.on_directions_error("timeout").is_empty());
        assert!(session.route().is_none());
    }

    #[test]
    fn test_overflowing_route_geometry_is_ignored() {
        let geometry = format!("}}{}F?", "~".repeat(11)).repeat(3);
        let body = format!(
            r#"{{"status": "OK", "routes": [{{"legs": [{{"steps": [{{"polyline": {{"points": "{}"}}}}]}}]}}]}}"#,
            geometry
        );
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        assert!(session.on_directions_response(&body).is_empty());
        assert!(session.route().is_none());
    }

    #[test]
    fn test_welcome_message() {
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        assert_eq!(
            session.on_welcome_message(Some("Stay safe".to_string())),
            vec![MapCommand::ShowMessage { message: "Stay safe".to_string() }]
        );
        assert!(session.on_welcome_message(None).is_empty());
    }

    #[test]
    fn test_function_result() {
        let mut session = ShelterMapSession::new(sample_shelters(), RouteStyle::default());
        assert_eq!(
            session.on_function_result(Ok("Hello from the backend".to_string())),
            vec![MapCommand::ShowMessage { message: "Hello from the backend".to_string() }]
        );
        assert!(session.on_function_result(Err("INTERNAL".to_string())).is_empty());
        // Neither callback touches the map flow
        assert!(session.current_location().is_none());
        assert!(!session.is_map_ready());
    }
}
