//! HTTP client for the directions service.
//!
//! One request per route, no retries: a failed lookup is reported to the
//! caller, which logs it and leaves the map without an overlay.

use log::{debug, info, warn};
use reqwest::Client;
use std::time::{Duration, Instant};

use crate::directions::{directions_url, parse_directions_route, DirectionsConfig, Route};
use crate::{Error, GpsPoint, Result};

/// Directions client with a pooled connection.
pub struct DirectionsClient {
    client: Client,
    config: DirectionsConfig,
}

impl DirectionsClient {
    /// Create a client. Fails when no API key is configured.
    pub fn new(config: DirectionsConfig) -> Result<Self> {
        if !config.has_api_key() {
            return Err(Error::MissingApiKey);
        }

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DirectionsConfig {
        &self.config
    }

    /// Request a route from `origin` to `destination` and decode it.
    pub async fn fetch_route(&self, origin: &GpsPoint, destination: &GpsPoint) -> Result<Route> {
        let url = directions_url(&self.config, origin, destination);
        info!(
            "[DirectionsClient] Requesting {} route ({}, {}) -> ({}, {})",
            self.config.mode.as_query_value(),
            origin.latitude, origin.longitude,
            destination.latitude, destination.longitude
        );

        let start = Instant::now();
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("[DirectionsClient] Request error: {}", e);
            Error::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("[DirectionsClient] HTTP {} after {:?}", status, start.elapsed());
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(
            "[DirectionsClient] Response {:.1}KB in {:?}",
            body.len() as f64 / 1024.0,
            start.elapsed()
        );

        parse_directions_route(&body)
    }
}

/// Blocking wrapper for callers without an async runtime (the FFI layer).
pub fn fetch_route_sync(
    config: DirectionsConfig,
    origin: GpsPoint,
    destination: GpsPoint,
) -> Result<Route> {
    use tokio::runtime::Builder;

    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            warn!("Failed to create tokio runtime: {}", e);
            Error::Runtime(e.to_string())
        })?;

    let client = DirectionsClient::new(config)?;
    rt.block_on(client.fetch_route(&origin, &destination))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let result = DirectionsClient::new(DirectionsConfig::default());
        assert!(matches!(result, Err(Error::MissingApiKey)));

        let blank = DirectionsConfig::default().with_api_key("   ");
        assert!(matches!(DirectionsClient::new(blank), Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_sync_wrapper_reports_missing_key() {
        let result = fetch_route_sync(
            DirectionsConfig::default(),
            GpsPoint::new(32.0853, 34.7818),
            GpsPoint::new(32.0717, 34.7872),
        );
        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_request_error() {
        // Port 9 (discard) on localhost refuses connections
        let config = DirectionsConfig {
            api_key: "test".to_string(),
            base_url: "http://127.0.0.1:9/directions".to_string(),
            timeout_secs: 2,
            ..DirectionsConfig::default()
        };
        let client = DirectionsClient::new(config).unwrap();
        let result = client
            .fetch_route(&GpsPoint::new(32.0853, 34.7818), &GpsPoint::new(32.0717, 34.7872))
            .await;
        assert!(matches!(result, Err(Error::Request(_))));
    }
}
