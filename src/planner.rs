//! One-shot planning pipeline.
//!
//! index → affinity seeds → proximity expansion → drivers → pickup order → schedule.
//! Any failure aborts the whole run; there are no partial plans.

use tracing::info;

use crate::drivers::assign_drivers;
use crate::error::PlanError;
use crate::expander::expand_pools;
use crate::grouping::group_by_affinity;
use crate::location_index::LocationIndex;
use crate::model::{Attendee, CarPool, Event};
use crate::schedule::{order_pickups, schedule_pools};
use crate::traits::{DistanceProvider, RouteProvider};

#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Seats available in one car.
    pub max_pool_size: u32,
    /// First proximity radius, in miles.
    pub min_radius: f64,
    /// Radius increase between passes.
    pub radius_step: f64,
    /// Last radius tried (inclusive).
    pub max_radius: f64,
    /// Added to every route leg to allow for the pickup itself.
    pub pickup_buffer_secs: i64,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            max_pool_size: 5,
            min_radius: 0.5,
            radius_step: 0.5,
            max_radius: 10.0,
            pickup_buffer_secs: 600, // 10 minutes per stop
        }
    }
}

impl PlanOptions {
    /// Radii for each expansion pass, smallest first.
    ///
    /// Generated from an integer step count so repeated float addition cannot
    /// skip or add a pass. Always yields at least one radius.
    pub fn radii(&self) -> Vec<f64> {
        let mut radii = Vec::new();
        if self.radius_step > 0.0 {
            let mut step = 0u32;
            loop {
                let radius = self.min_radius + f64::from(step) * self.radius_step;
                if radius > self.max_radius + 1e-9 {
                    break;
                }
                radii.push(radius);
                step += 1;
            }
        }
        if radii.is_empty() {
            radii.push(self.max_radius);
        }
        radii
    }
}

/// A complete, consistent set of car pools.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Location records, each carrying its travel time.
    pub index: LocationIndex,
    /// Pools with a driver and locations in pickup order.
    pub pools: Vec<CarPool>,
}

pub fn plan<D, R>(
    attendees: &[Attendee],
    event: &Event,
    distances: &D,
    routes: &R,
    options: &PlanOptions,
) -> Result<Plan, PlanError>
where
    D: DistanceProvider,
    R: RouteProvider,
{
    info!(
        event = %event.name,
        attendees = attendees.len(),
        "planning car pools"
    );

    let mut index = LocationIndex::build(attendees, event, distances)?;
    check_capacity(&index, options)?;

    let seeds = group_by_affinity(&index, options);
    let mut pools = expand_pools(&index, seeds, options);

    assign_drivers(&index, &mut pools)?;
    order_pickups(&index, &mut pools);
    schedule_pools(&mut index, &pools, event, routes, options)?;

    Ok(Plan { index, pools })
}

/// A location whose own seats exceed a car can never be placed.
fn check_capacity(index: &LocationIndex, options: &PlanOptions) -> Result<(), PlanError> {
    match index
        .records()
        .iter()
        .find(|record| record.seats > options.max_pool_size)
    {
        Some(record) => Err(PlanError::LocationOverCapacity {
            location: record.location.clone(),
            seats: record.seats,
            capacity: options.max_pool_size,
        }),
        None => Ok(()),
    }
}
