//! Collaborator seams for the planner.
//!
//! The planner never talks to a mapping service directly. Concrete adapters
//! (see [`crate::maps`]) or test doubles implement these traits.

use crate::error::ProviderError;

/// Default number of matrix elements a provider accepts per request.
pub const DEFAULT_MAX_ELEMENTS: usize = 100;

/// One origin/destination cell of a distance matrix response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixElement {
    /// Provider status for this pair; only `"OK"` carries a usable distance.
    pub status: String,
    /// Human-readable distance such as `"3.4 mi"`.
    pub distance_text: Option<String>,
}

impl MatrixElement {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            status: "OK".to_string(),
            distance_text: Some(text.into()),
        }
    }

    pub fn failed(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            distance_text: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// One segment of a planned route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteLeg {
    pub duration_secs: i64,
}

/// Provides driving distances between sets of locations.
///
/// Rows follow `origins` order, elements within a row follow `destinations`.
pub trait DistanceProvider: Sync {
    fn distance_matrix(
        &self,
        origins: &[String],
        destinations: &[String],
    ) -> Result<Vec<Vec<MatrixElement>>, ProviderError>;

    /// Maximum origins × destinations per request.
    fn max_elements(&self) -> usize {
        DEFAULT_MAX_ELEMENTS
    }
}

/// Provides the legs of a route through ordered waypoints.
///
/// A well-behaved provider returns `waypoints.len() + 1` legs, the last one
/// ending at `destination`.
pub trait RouteProvider {
    fn route_legs(
        &self,
        origin: &str,
        destination: &str,
        waypoints: &[String],
    ) -> Result<Vec<RouteLeg>, ProviderError>;
}
