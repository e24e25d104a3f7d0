//! Plain-text rendering of a finished plan.

use std::fmt;

use chrono::NaiveDateTime;

use crate::model::Event;
use crate::planner::Plan;

const SECTION: &str = "\x1b[31m";
const TITLE: &str = "\x1b[32m";
const HEADING: &str = "\x1b[33m";
const BODY: &str = "\x1b[37m";
const RESET: &str = "\x1b[0m";

struct Palette {
    section: &'static str,
    title: &'static str,
    heading: &'static str,
    body: &'static str,
    reset: &'static str,
}

impl Palette {
    fn new(color: bool) -> Self {
        if color {
            Self {
                section: SECTION,
                title: TITLE,
                heading: HEADING,
                body: BODY,
                reset: RESET,
            }
        } else {
            Self {
                section: "",
                title: "",
                heading: "",
                body: "",
                reset: "",
            }
        }
    }
}

/// Render the pools, drivers and pickup times for display.
pub fn render(plan: &Plan, event: &Event, color: bool) -> String {
    Report::new(plan, event, color).to_string()
}

/// A finished plan laid out for the console.
pub struct Report<'a> {
    plan: &'a Plan,
    event: &'a Event,
    palette: Palette,
}

impl<'a> Report<'a> {
    pub fn new(plan: &'a Plan, event: &'a Event, color: bool) -> Self {
        Self {
            plan,
            event,
            palette: Palette::new(color),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (plan, event, p) = (self.plan, self.event, &self.palette);
        writeln!(out, "{}-----------------------------", p.section)?;
        writeln!(out, "|        CAR POOLING        |")?;
        writeln!(out, "-----------------------------{}", p.reset)?;
        writeln!(
            out,
            "{}Car pools to arrive at {} for {} on {}",
            p.body,
            event.name,
            event.start_time.format("%H:%M"),
            event.start_time.format("%A %d %B %Y")
        )?;
        writeln!(out, "The full address is {}", event.address)?;
        writeln!(out)?;
        writeln!(
            out,
            "Suggested leave and pick up times allow for each pick up and should be used as a guide only{}",
            p.reset
        )?;

        for (number, pool) in plan.pools.iter().enumerate() {
            let driver_name = pool.driver.as_ref().map(|d| d.name.as_str()).unwrap_or("?");
            let leave = pool
                .locations
                .first()
                .and_then(|&first| plan.index.get(first).travel_time)
                .map(|t| t.expected_pickup);

            writeln!(out)?;
            writeln!(out, "{}Car Pool {}{}", p.title, number + 1, p.reset)?;
            writeln!(out, "{}   - Driver:{}", p.heading, p.reset)?;
            writeln!(out, "{}      {} (@{}){}", p.body, driver_name, clock(leave), p.reset)?;
            writeln!(out, "{}   - Pick Ups:{}", p.heading, p.reset)?;

            for &location in &pool.locations {
                let record = plan.index.get(location);
                let riders: Vec<&str> = record
                    .attendees
                    .iter()
                    .filter(|a| a.name != driver_name)
                    .map(|a| a.name.as_str())
                    .collect();
                if riders.is_empty() {
                    continue;
                }
                let pickup = record.travel_time.map(|t| t.expected_pickup);
                writeln!(
                    out,
                    "{}      {} (@{}){}",
                    p.body,
                    riders.join(", "),
                    clock(pickup),
                    p.reset
                )?;
            }
        }

        Ok(())
    }
}

fn clock(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
