//! Location index: one aggregated record per pickup location plus the full
//! distance matrix between locations and the event.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::PlanError;
use crate::model::{Attendee, Distance, Event, LocationRecord};
use crate::traits::{DistanceProvider, MatrixElement};

const FEET_PER_MILE: f64 = 5280.0;
const MILES_PER_KM: f64 = 0.621371;
const METRES_PER_MILE: f64 = 1609.344;

/// Pickup locations in first-appearance order of the attendee list.
///
/// Index order is the enumeration order every later stage relies on for
/// tie-breaking, so it is fixed at construction.
#[derive(Debug, Clone)]
pub struct LocationIndex {
    records: Vec<LocationRecord>,
    positions: HashMap<String, usize>,
}

impl LocationIndex {
    /// Aggregate attendees and fetch every required distance from `provider`.
    pub fn build<P>(attendees: &[Attendee], event: &Event, provider: &P) -> Result<Self, PlanError>
    where
        P: DistanceProvider,
    {
        let (records, positions) = aggregate(attendees);
        let origins: Vec<String> = records.iter().map(|r| r.location.clone()).collect();

        let mut destinations = Vec::with_capacity(origins.len() + 1);
        destinations.push(event.location.clone());
        destinations.extend(origins.iter().cloned());

        let rows = fetch_matrix(provider, &origins, &destinations)?;
        info!(
            locations = origins.len(),
            attendees = attendees.len(),
            "distance matrix complete"
        );

        Self::with_rows(records, positions, &event.location, rows)
    }

    /// Build from an already materialized matrix.
    ///
    /// `rows[i]` belongs to the i-th distinct location (first-appearance order);
    /// element 0 is the distance to the event, element `j + 1` the distance to
    /// location `j`.
    pub fn from_matrix(
        attendees: &[Attendee],
        event_location: &str,
        rows: Vec<Vec<MatrixElement>>,
    ) -> Result<Self, PlanError> {
        let (records, positions) = aggregate(attendees);
        Self::with_rows(records, positions, event_location, rows)
    }

    fn with_rows(
        mut records: Vec<LocationRecord>,
        positions: HashMap<String, usize>,
        event_location: &str,
        rows: Vec<Vec<MatrixElement>>,
    ) -> Result<Self, PlanError> {
        let names: Vec<String> = records.iter().map(|r| r.location.clone()).collect();
        let mut rows = rows.into_iter();

        for record in records.iter_mut() {
            let row = rows.next().unwrap_or_default();

            record.distance_to_event = resolve(&record.location, event_location, row.first())?;

            let mut to_others = Vec::with_capacity(names.len());
            for (j, other) in names.iter().enumerate() {
                let miles = resolve(&record.location, other, row.get(j + 1))?;
                to_others.push(Distance {
                    origin: record.location.clone(),
                    destination: other.clone(),
                    miles,
                });
            }
            record.distance_to_others = to_others;
        }

        Ok(Self { records, positions })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> &LocationRecord {
        &self.records[idx]
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut LocationRecord {
        &mut self.records[idx]
    }

    /// Index position of a location key.
    pub fn position(&self, location: &str) -> Option<usize> {
        self.positions.get(location).copied()
    }

    pub fn seats(&self, idx: usize) -> u32 {
        self.records[idx].seats
    }

    /// Distance from location `from` to location `to`.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.records[from].distance_to(to)
    }

    /// Total seats across the given locations.
    pub fn total_seats(&self, locations: &[usize]) -> u32 {
        locations
            .iter()
            .fold(0u32, |total, &idx| total.saturating_add(self.seats(idx)))
    }

    /// Location keys for a list of indices.
    pub fn names(&self, locations: &[usize]) -> Vec<String> {
        locations
            .iter()
            .map(|&idx| self.records[idx].location.clone())
            .collect()
    }
}

fn aggregate(attendees: &[Attendee]) -> (Vec<LocationRecord>, HashMap<String, usize>) {
    let mut records: Vec<LocationRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for attendee in attendees {
        let idx = *positions
            .entry(attendee.location.clone())
            .or_insert_with(|| {
                records.push(LocationRecord::new(attendee.location.clone()));
                records.len() - 1
            });
        records[idx].add_attendee(attendee.clone());
    }

    (records, positions)
}

/// Fetch the matrix in request-sized chunks of origins.
///
/// Chunks may run concurrently; the result is reassembled in origin order
/// before anyone reads it.
fn fetch_matrix<P>(
    provider: &P,
    origins: &[String],
    destinations: &[String],
) -> Result<Vec<Vec<MatrixElement>>, PlanError>
where
    P: DistanceProvider,
{
    if origins.is_empty() {
        return Ok(Vec::new());
    }

    let chunk_size = origins_per_request(provider.max_elements(), destinations.len());
    debug!(
        chunk_size,
        requests = origins.len().div_ceil(chunk_size),
        "fetching distance matrix"
    );

    let chunks = origins
        .par_chunks(chunk_size)
        .map(|chunk| provider.distance_matrix(chunk, destinations))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::with_capacity(origins.len());
    for (chunk, chunk_rows) in origins.chunks(chunk_size).zip(chunks) {
        if chunk_rows.len() != chunk.len() {
            return Err(PlanError::DistanceUnavailable {
                origin: chunk[chunk_rows.len().min(chunk.len() - 1)].clone(),
                destination: destinations[0].clone(),
                status: format!("{} rows for {} origins", chunk_rows.len(), chunk.len()),
            });
        }
        rows.extend(chunk_rows);
    }

    Ok(rows)
}

/// Origins that fit in one request alongside all destinations.
pub fn origins_per_request(max_elements: usize, destinations: usize) -> usize {
    (max_elements / destinations.max(1)).max(1)
}

fn resolve(origin: &str, destination: &str, element: Option<&MatrixElement>) -> Result<f64, PlanError> {
    let element = element.ok_or_else(|| PlanError::DistanceUnavailable {
        origin: origin.to_string(),
        destination: destination.to_string(),
        status: "MISSING".to_string(),
    })?;

    if !element.is_ok() {
        return Err(PlanError::DistanceUnavailable {
            origin: origin.to_string(),
            destination: destination.to_string(),
            status: element.status.clone(),
        });
    }

    let text = element.distance_text.as_deref().unwrap_or_default();
    parse_distance(text).ok_or_else(|| PlanError::MalformedDistance {
        origin: origin.to_string(),
        destination: destination.to_string(),
        text: text.to_string(),
    })
}

/// Parse provider distance text (`"3.4 mi"`, `"850 ft"`, `"1,204 km"`) into miles.
pub fn parse_distance(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = text.find(|c: char| c.is_ascii_alphabetic())?;
    let number = text[..split].trim().replace(',', "");
    let unit = text[split..].trim();

    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    match unit {
        "mi" => Some(value),
        "ft" => Some(value / FEET_PER_MILE),
        "km" => Some(value * MILES_PER_KM),
        "m" => Some(value / METRES_PER_MILE),
        _ => None,
    }
}
