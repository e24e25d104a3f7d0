//! Affinity grouping: seed pools from locations that declared a group.

use tracing::{debug, info};

use crate::location_index::LocationIndex;
use crate::model::CarPool;
use crate::planner::PlanOptions;

/// Form one seed pool per affinity group, in index order.
///
/// The first unassigned location carrying a non-zero group id opens a pool;
/// every later unassigned location with the same id joins while seats allow.
/// Locations that do not fit stay unassigned and may open a second pool for
/// the same group, so a group larger than one car is split rather than rejected.
pub fn group_by_affinity(index: &LocationIndex, options: &PlanOptions) -> Vec<CarPool> {
    let mut assigned = vec![false; index.len()];
    let mut pools = Vec::new();

    for (seed, record) in index.records().iter().enumerate() {
        let group_id = record.highest_group_id;
        if group_id == 0 || assigned[seed] {
            continue;
        }

        assigned[seed] = true;
        let mut members = vec![seed];
        let mut seats = record.seats;

        for (other, candidate) in index.records().iter().enumerate() {
            if assigned[other] || candidate.highest_group_id != group_id {
                continue;
            }
            if seats.saturating_add(candidate.seats) <= options.max_pool_size {
                assigned[other] = true;
                seats += candidate.seats;
                members.push(other);
            }
        }

        debug!(group_id, seats, members = ?index.names(&members), "seeded affinity pool");
        pools.push(CarPool::new(members, group_id));
    }

    info!(pools = pools.len(), "affinity grouping complete");
    pools
}
