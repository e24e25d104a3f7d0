//! Domain types shared by every planning stage.

use chrono::NaiveDateTime;

/// A person travelling to the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    /// Unique within the event.
    pub name: String,
    /// Seats this attendee occupies (at least 1).
    pub seats: u32,
    /// Pickup location key (e.g. a post code with spaces removed).
    pub location: String,
    pub can_drive: bool,
    /// Affinity group; 0 means no preference.
    pub group_id: u32,
    pub must_drive: bool,
}

/// The destination every pool travels to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub location: String,
    pub address: String,
    pub name: String,
    /// Arrival anchor; pickup times are computed backwards from here.
    pub start_time: NaiveDateTime,
}

/// Directed distance between two locations, in miles.
#[derive(Debug, Clone, PartialEq)]
pub struct Distance {
    pub origin: String,
    pub destination: String,
    pub miles: f64,
}

/// Timing attached to a location once its pool's route is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelTime {
    /// Raw leg duration from this stop to the next one (or the event).
    pub time_to_next_secs: i64,
    pub expected_pickup: NaiveDateTime,
}

/// Aggregate of all attendees sharing one pickup location.
#[derive(Debug, Clone)]
pub struct LocationRecord {
    pub location: String,
    /// Sum of seats across the attendees here.
    pub seats: u32,
    pub highest_group_id: u32,
    pub has_driver: bool,
    pub distance_to_event: f64,
    /// Distance to every indexed location, in index order (self included, never consulted).
    pub distance_to_others: Vec<Distance>,
    pub attendees: Vec<Attendee>,
    pub travel_time: Option<TravelTime>,
}

impl LocationRecord {
    pub(crate) fn new(location: String) -> Self {
        Self {
            location,
            seats: 0,
            highest_group_id: 0,
            has_driver: false,
            distance_to_event: 0.0,
            distance_to_others: Vec::new(),
            attendees: Vec::new(),
            travel_time: None,
        }
    }

    pub(crate) fn add_attendee(&mut self, attendee: Attendee) {
        self.seats = self.seats.saturating_add(attendee.seats);
        self.highest_group_id = self.highest_group_id.max(attendee.group_id);
        self.has_driver |= attendee.can_drive;
        self.attendees.push(attendee);
    }

    /// Distance from this location to the location at `other` in the index.
    pub fn distance_to(&self, other: usize) -> f64 {
        self.distance_to_others[other].miles
    }
}

/// Locations sharing one vehicle.
///
/// Members are indices into the [`LocationIndex`](crate::location_index::LocationIndex);
/// the pool never owns the records themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct CarPool {
    pub locations: Vec<usize>,
    pub driver: Option<Attendee>,
    /// Affinity group inherited from the seeding location.
    pub group_id: u32,
}

impl CarPool {
    pub fn new(locations: Vec<usize>, group_id: u32) -> Self {
        Self {
            locations,
            driver: None,
            group_id,
        }
    }
}
