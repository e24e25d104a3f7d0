//! Driver selection: exactly one driver per pool.

use tracing::{debug, info};

use crate::error::PlanError;
use crate::location_index::LocationIndex;
use crate::model::{Attendee, CarPool};

/// Assign a driver to every pool.
///
/// A single must-drive attendee always wins. Otherwise the first capable
/// attendee at the driver-capable location farthest from the event drives,
/// so the route naturally starts at the far end.
pub fn assign_drivers(index: &LocationIndex, pools: &mut [CarPool]) -> Result<(), PlanError> {
    for (pool_idx, pool) in pools.iter_mut().enumerate() {
        let driver = select_driver(index, pool_idx, pool)?;
        debug!(pool = pool_idx + 1, driver = %driver.name, "driver assigned");
        pool.driver = Some(driver);
    }

    info!(pools = pools.len(), "drivers assigned");
    Ok(())
}

fn select_driver(index: &LocationIndex, pool_idx: usize, pool: &CarPool) -> Result<Attendee, PlanError> {
    let capable: Vec<usize> = pool
        .locations
        .iter()
        .copied()
        .filter(|&location| index.get(location).has_driver)
        .collect();

    if capable.is_empty() {
        return Err(PlanError::NoDriverAvailable {
            pool: pool_idx,
            locations: index.names(&pool.locations),
        });
    }

    let must_drive: Vec<&Attendee> = capable
        .iter()
        .flat_map(|&location| index.get(location).attendees.iter())
        .filter(|attendee| attendee.can_drive && attendee.must_drive)
        .collect();

    match must_drive.as_slice() {
        [only] => return Ok((*only).clone()),
        [] => {}
        many => {
            return Err(PlanError::AmbiguousMustDrive {
                pool: pool_idx,
                attendees: many.iter().map(|attendee| attendee.name.clone()).collect(),
            });
        }
    }

    // First location wins a distance tie.
    let mut farthest = capable[0];
    for &location in &capable[1..] {
        if index.get(location).distance_to_event > index.get(farthest).distance_to_event {
            farthest = location;
        }
    }

    index
        .get(farthest)
        .attendees
        .iter()
        .find(|attendee| attendee.can_drive)
        .cloned()
        .ok_or_else(|| PlanError::NoDriverAvailable {
            pool: pool_idx,
            locations: index.names(&pool.locations),
        })
}
