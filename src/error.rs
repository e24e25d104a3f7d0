//! Error types for planning runs and collaborators.

use std::fmt;

/// Failure talking to a mapping collaborator.
#[derive(Debug)]
pub enum ProviderError {
    Http(reqwest::Error),
    /// The service answered with a non-OK top-level status.
    Api(String),
    /// The response body did not have the expected shape.
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Http(err) => write!(f, "http error: {}", err),
            ProviderError::Api(status) => write!(f, "provider returned status {}", status),
            ProviderError::Decode(msg) => write!(f, "unexpected provider response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Http(err) => Some(err),
            _ => None,
        }
    }
}

/// Terminal failure of a planning run. No partial results are produced.
#[derive(Debug)]
pub enum PlanError {
    Provider(ProviderError),
    DistanceUnavailable {
        origin: String,
        destination: String,
        status: String,
    },
    MalformedDistance {
        origin: String,
        destination: String,
        text: String,
    },
    LocationOverCapacity {
        location: String,
        seats: u32,
        capacity: u32,
    },
    NoDriverAvailable {
        pool: usize,
        locations: Vec<String>,
    },
    AmbiguousMustDrive {
        pool: usize,
        attendees: Vec<String>,
    },
    RouteLegMismatch {
        pool: usize,
        expected: usize,
        actual: usize,
    },
    /// A leg duration pushed the pickup time outside the representable range.
    LegDurationOutOfRange {
        pool: usize,
        location: String,
        duration_secs: i64,
    },
}

impl From<ProviderError> for PlanError {
    fn from(err: ProviderError) -> Self {
        PlanError::Provider(err)
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Provider(err) => write!(f, "mapping provider failed: {}", err),
            PlanError::DistanceUnavailable {
                origin,
                destination,
                status,
            } => write!(
                f,
                "distance from {} to {} unavailable (status {})",
                origin, destination, status
            ),
            PlanError::MalformedDistance {
                origin,
                destination,
                text,
            } => write!(
                f,
                "cannot parse distance {:?} from {} to {}",
                text, origin, destination
            ),
            PlanError::LocationOverCapacity {
                location,
                seats,
                capacity,
            } => write!(
                f,
                "location {} needs {} seats but a car pool holds {}",
                location, seats, capacity
            ),
            PlanError::NoDriverAvailable { pool, locations } => write!(
                f,
                "car pool {} has no driver (locations: {})",
                pool + 1,
                locations.join(", ")
            ),
            PlanError::AmbiguousMustDrive { pool, attendees } => write!(
                f,
                "car pool {} has several attendees who must drive: {}",
                pool + 1,
                attendees.join(", ")
            ),
            PlanError::RouteLegMismatch {
                pool,
                expected,
                actual,
            } => write!(
                f,
                "route for car pool {} has {} legs, expected {}",
                pool + 1,
                actual,
                expected
            ),
            PlanError::LegDurationOutOfRange {
                pool,
                location,
                duration_secs,
            } => write!(
                f,
                "route for car pool {} has an unusable leg duration of {}s at {}",
                pool + 1,
                duration_secs,
                location
            ),
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanError::Provider(err) => Some(err),
            _ => None,
        }
    }
}
