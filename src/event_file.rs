//! Loader for the flat text event file.
//!
//! ```text
//! Players
//! -------
//! Alice : 1 : CV1 1AA : true : 0 : false
//!
//! Details
//! -------
//! Event Post Code : CV31 1AA
//! Event Address : Sports Hall, Leamington
//! Event Name : Regional Finals
//! Start Time : 2024-03-09 10:00
//! ```
//!
//! Player fields are name, seats, location, can drive, group id, must drive.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::model::{Attendee, Event};

const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone)]
pub struct EventData {
    pub attendees: Vec<Attendee>,
    pub event: Event,
}

#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    MissingField(&'static str),
    InvalidLine { line: usize, reason: String },
    InvalidTime(String),
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err)
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "cannot read event file: {}", err),
            LoadError::MissingField(field) => write!(f, "event file is missing '{}'", field),
            LoadError::InvalidLine { line, reason } => write!(f, "line {}: {}", line, reason),
            LoadError::InvalidTime(value) => {
                write!(f, "start time {:?} is not in {} format", value, START_TIME_FORMAT)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Players,
    Details,
}

pub fn load_event_file(path: &Path) -> Result<EventData, LoadError> {
    let text = fs::read_to_string(path)?;
    parse_event(&text)
}

pub fn parse_event(text: &str) -> Result<EventData, LoadError> {
    let mut section = Section::None;
    let mut attendees = Vec::new();
    let mut names = HashSet::new();

    let mut location = None;
    let mut address = None;
    let mut name = None;
    let mut start_time = None;

    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let number = number + 1;

        match line {
            "Players" => section = Section::Players,
            "Details" => section = Section::Details,
            _ if line.is_empty() || line.starts_with('-') => {}
            _ => match section {
                Section::Players => {
                    let attendee = parse_attendee(line, number)?;
                    if !names.insert(attendee.name.clone()) {
                        return Err(LoadError::InvalidLine {
                            line: number,
                            reason: format!("duplicate attendee name {:?}", attendee.name),
                        });
                    }
                    attendees.push(attendee);
                }
                Section::Details => {
                    let Some((key, value)) = line.split_once(':') else {
                        return Err(LoadError::InvalidLine {
                            line: number,
                            reason: "expected 'Key : value'".to_string(),
                        });
                    };
                    let value = value.trim().to_string();
                    match key.trim() {
                        "Event Post Code" => location = Some(value.replace(' ', "")),
                        "Event Address" => address = Some(value),
                        "Event Name" => name = Some(value),
                        "Start Time" => start_time = Some(value),
                        _ => {}
                    }
                }
                // preamble before the first heading
                Section::None => {}
            },
        }
    }

    let start_time = start_time.ok_or(LoadError::MissingField("Start Time"))?;
    let start_time = NaiveDateTime::parse_from_str(&start_time, START_TIME_FORMAT)
        .map_err(|_| LoadError::InvalidTime(start_time.clone()))?;

    let event = Event {
        location: location.ok_or(LoadError::MissingField("Event Post Code"))?,
        address: address.ok_or(LoadError::MissingField("Event Address"))?,
        name: name.ok_or(LoadError::MissingField("Event Name"))?,
        start_time,
    };

    Ok(EventData { attendees, event })
}

fn parse_attendee(line: &str, number: usize) -> Result<Attendee, LoadError> {
    let invalid = |reason: String| LoadError::InvalidLine { line: number, reason };

    let fields: Vec<&str> = line.split(':').map(str::trim).collect();
    let [name, seats, location, can_drive, group_id, must_drive] = fields.as_slice() else {
        return Err(invalid(format!("expected 6 ':'-separated fields, found {}", fields.len())));
    };

    let seats: u32 = seats
        .parse()
        .map_err(|_| invalid(format!("seats {:?} is not a number", seats)))?;
    if seats == 0 {
        return Err(invalid("seats must be at least 1".to_string()));
    }
    let group_id: u32 = group_id
        .parse()
        .map_err(|_| invalid(format!("group id {:?} is not a number", group_id)))?;

    if name.is_empty() {
        return Err(invalid("attendee name is empty".to_string()));
    }

    Ok(Attendee {
        name: name.to_string(),
        seats,
        location: location.replace(' ', ""),
        can_drive: flag(can_drive),
        group_id,
        must_drive: flag(must_drive),
    })
}

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
