//! Test fixtures for carpool-planner.
//!
//! Provides:
//! - `LineMap`: locations on a straight line, distances are position differences
//! - `LineRoutes`: fixed-speed route legs over a `LineMap`
//! - an attendee builder with sensible defaults

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

use carpool_planner::error::ProviderError;
use carpool_planner::model::{Attendee, Event};
use carpool_planner::traits::{DistanceProvider, MatrixElement, RouteLeg, RouteProvider};

pub const EVENT: &str = "EVENT";

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

pub fn event() -> Event {
    Event {
        location: EVENT.to_string(),
        address: "Sports Hall, Leamington".to_string(),
        name: "Regional Finals".to_string(),
        start_time: start_time(),
    }
}

/// Builder for test attendees.
#[derive(Clone, Debug)]
pub struct TestAttendee(Attendee);

impl TestAttendee {
    pub fn new(name: &str, location: &str) -> Self {
        Self(Attendee {
            name: name.to_string(),
            seats: 1,
            location: location.to_string(),
            can_drive: true,
            group_id: 0,
            must_drive: false,
        })
    }

    pub fn seats(mut self, seats: u32) -> Self {
        self.0.seats = seats;
        self
    }

    pub fn group(mut self, group_id: u32) -> Self {
        self.0.group_id = group_id;
        self
    }

    pub fn passenger(mut self) -> Self {
        self.0.can_drive = false;
        self
    }

    pub fn must_drive(mut self) -> Self {
        self.0.must_drive = true;
        self
    }

    pub fn build(self) -> Attendee {
        self.0
    }
}

/// Locations placed on a line (miles); the event sits at position 0.
#[derive(Debug, Default)]
pub struct LineMap {
    positions: HashMap<String, f64>,
    /// Element text override for one ordered pair.
    text_override: Option<(String, String, String)>,
    max_elements: Option<usize>,
    requests: Mutex<usize>,
}

impl LineMap {
    pub fn new(points: &[(&str, f64)]) -> Self {
        let mut positions: HashMap<String, f64> = points
            .iter()
            .map(|&(name, position)| (name.to_string(), position))
            .collect();
        positions.insert(EVENT.to_string(), 0.0);
        Self {
            positions,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, origin: &str, destination: &str, text: &str) -> Self {
        self.text_override = Some((origin.to_string(), destination.to_string(), text.to_string()));
        self
    }

    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = Some(max_elements);
        self
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }

    pub fn miles(&self, from: &str, to: &str) -> Option<f64> {
        Some((self.positions.get(from)? - self.positions.get(to)?).abs())
    }
}

impl DistanceProvider for LineMap {
    fn distance_matrix(
        &self,
        origins: &[String],
        destinations: &[String],
    ) -> Result<Vec<Vec<MatrixElement>>, ProviderError> {
        *self.requests.lock().unwrap() += 1;
        Ok(origins
            .iter()
            .map(|origin| {
                destinations
                    .iter()
                    .map(|destination| {
                        if let Some((o, d, text)) = &self.text_override {
                            if o == origin && d == destination {
                                return MatrixElement::ok(text.clone());
                            }
                        }
                        match self.miles(origin, destination) {
                            Some(miles) => MatrixElement::ok(format!("{:.1} mi", miles)),
                            None => MatrixElement::failed("NOT_FOUND"),
                        }
                    })
                    .collect()
            })
            .collect())
    }

    fn max_elements(&self) -> usize {
        self.max_elements.unwrap_or(100)
    }
}

/// Route legs at a fixed speed over a [`LineMap`], plus one minute per stop.
pub struct LineRoutes<'a> {
    map: &'a LineMap,
    secs_per_mile: i64,
    drop_last_leg: bool,
    calls: Mutex<Vec<(String, String, Vec<String>)>>,
}

impl<'a> LineRoutes<'a> {
    pub fn new(map: &'a LineMap) -> Self {
        Self {
            map,
            secs_per_mile: 90,
            drop_last_leg: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn dropping_last_leg(mut self) -> Self {
        self.drop_last_leg = true;
        self
    }

    /// Every request as `(origin, destination, waypoints)`.
    pub fn calls(&self) -> Vec<(String, String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl RouteProvider for LineRoutes<'_> {
    fn route_legs(
        &self,
        origin: &str,
        destination: &str,
        waypoints: &[String],
    ) -> Result<Vec<RouteLeg>, ProviderError> {
        self.calls.lock().unwrap().push((
            origin.to_string(),
            destination.to_string(),
            waypoints.to_vec(),
        ));

        let mut stops = vec![origin.to_string()];
        stops.extend(waypoints.iter().cloned());
        stops.push(destination.to_string());

        let mut legs = Vec::new();
        for pair in stops.windows(2) {
            let miles = self
                .map
                .miles(&pair[0], &pair[1])
                .ok_or_else(|| ProviderError::Api("NOT_FOUND".to_string()))?;
            legs.push(RouteLeg {
                duration_secs: (miles * self.secs_per_mile as f64).round() as i64 + 60,
            });
        }
        if self.drop_last_leg {
            legs.pop();
        }
        Ok(legs)
    }
}
