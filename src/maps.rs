//! HTTP adapter for a Google-Maps-compatible distance matrix and directions API.

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::traits::{DistanceProvider, MatrixElement, RouteLeg, RouteProvider, DEFAULT_MAX_ELEMENTS};

#[derive(Debug, Clone)]
pub struct MapsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Matrix elements (origins × destinations) allowed per request.
    pub max_elements: usize,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapsClient {
    config: MapsConfig,
    client: reqwest::blocking::Client,
}

impl MapsClient {
    pub fn new(config: MapsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, api: &str) -> String {
        format!(
            "{}/maps/api/{}/json",
            self.config.base_url.trim_end_matches('/'),
            api
        )
    }
}

impl DistanceProvider for MapsClient {
    fn distance_matrix(
        &self,
        origins: &[String],
        destinations: &[String],
    ) -> Result<Vec<Vec<MatrixElement>>, ProviderError> {
        if origins.is_empty() || destinations.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            origins = origins.len(),
            destinations = destinations.len(),
            "requesting distance matrix"
        );

        let body = self
            .client
            .get(self.endpoint("distancematrix"))
            .query(&[
                ("origins", origins.join("|")),
                ("destinations", destinations.join("|")),
                ("units", "imperial".to_string()),
                ("mode", "driving".to_string()),
                ("key", self.config.api_key.clone()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<MatrixResponse>())?;

        matrix_elements(body)
    }

    fn max_elements(&self) -> usize {
        self.config.max_elements
    }
}

impl RouteProvider for MapsClient {
    fn route_legs(
        &self,
        origin: &str,
        destination: &str,
        waypoints: &[String],
    ) -> Result<Vec<RouteLeg>, ProviderError> {
        debug!(origin, destination, waypoints = waypoints.len(), "requesting directions");

        let mut query = vec![
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", "driving".to_string()),
            ("key", self.config.api_key.clone()),
        ];
        if !waypoints.is_empty() {
            query.push(("waypoints", waypoints.join("|")));
        }

        let body = self
            .client
            .get(self.endpoint("directions"))
            .query(&query)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<DirectionsResponse>())?;

        route_legs(body)
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixCell>,
}

#[derive(Debug, Deserialize)]
struct MatrixCell {
    status: String,
    distance: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    duration: Option<Seconds>,
}

#[derive(Debug, Deserialize)]
struct Seconds {
    value: i64,
}

fn api_error(status: String, message: Option<String>) -> ProviderError {
    match message {
        Some(message) => ProviderError::Api(format!("{}: {}", status, message)),
        None => ProviderError::Api(status),
    }
}

fn matrix_elements(body: MatrixResponse) -> Result<Vec<Vec<MatrixElement>>, ProviderError> {
    if body.status != "OK" {
        return Err(api_error(body.status, body.error_message));
    }

    Ok(body
        .rows
        .into_iter()
        .map(|row| {
            row.elements
                .into_iter()
                .map(|cell| MatrixElement {
                    status: cell.status,
                    distance_text: cell.distance.and_then(|d| d.text),
                })
                .collect()
        })
        .collect())
}

fn route_legs(body: DirectionsResponse) -> Result<Vec<RouteLeg>, ProviderError> {
    match body.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        _ => return Err(api_error(body.status, body.error_message)),
    }

    let Some(route) = body.routes.into_iter().next() else {
        return Ok(Vec::new());
    };

    route
        .legs
        .into_iter()
        .enumerate()
        .map(|(i, leg)| {
            leg.duration
                .map(|d| RouteLeg { duration_secs: d.value })
                .ok_or_else(|| ProviderError::Decode(format!("leg {} has no duration", i)))
        })
        .collect()
}
