//! carpool-planner
//!
//! Groups event attendees into car pools by affinity and proximity, picks a
//! driver for each pool and schedules pickups backwards from the event start.

pub mod drivers;
pub mod error;
pub mod event_file;
pub mod expander;
pub mod grouping;
pub mod location_index;
pub mod maps;
pub mod model;
pub mod planner;
pub mod report;
pub mod schedule;
pub mod traits;
