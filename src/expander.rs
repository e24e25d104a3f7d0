//! Proximity expansion: grow and merge pools by an increasing radius until
//! every location is placed.

use tracing::{debug, info, warn};

use crate::location_index::LocationIndex;
use crate::model::CarPool;
use crate::planner::PlanOptions;

/// Pool membership with an owner map kept in step with every move.
#[derive(Debug, Clone)]
struct PoolSet {
    members: Vec<Vec<usize>>,
    groups: Vec<u32>,
    owner: Vec<Option<usize>>,
}

impl PoolSet {
    fn new(location_count: usize, seeds: Vec<CarPool>) -> Self {
        let mut set = Self {
            members: Vec::with_capacity(seeds.len()),
            groups: Vec::with_capacity(seeds.len()),
            owner: vec![None; location_count],
        };
        for seed in seeds {
            set.members.push(seed.locations);
            set.groups.push(seed.group_id);
        }
        set.reindex();
        set
    }

    fn len(&self) -> usize {
        self.members.len()
    }

    fn pool_of(&self, location: usize) -> Option<usize> {
        self.owner[location]
    }

    fn is_pooled(&self, location: usize) -> bool {
        self.owner[location].is_some()
    }

    fn open(&mut self, location: usize, group_id: u32) -> usize {
        let pool = self.members.len();
        self.members.push(vec![location]);
        self.groups.push(group_id);
        self.owner[location] = Some(pool);
        pool
    }

    fn add(&mut self, pool: usize, location: usize) {
        self.members[pool].push(location);
        self.owner[location] = Some(pool);
    }

    fn move_location(&mut self, location: usize, from: usize, to: usize) {
        self.members[from].retain(|&member| member != location);
        self.members[to].push(location);
        self.owner[location] = Some(to);
    }

    fn seats(&self, pool: usize, index: &LocationIndex) -> u32 {
        index.total_seats(&self.members[pool])
    }

    /// Drop pools failing `keep`; their locations become unassigned.
    fn retain(&mut self, keep: impl Fn(&[usize]) -> bool) {
        let mut members = Vec::with_capacity(self.members.len());
        let mut groups = Vec::with_capacity(self.groups.len());
        for (pool, group) in self.members.drain(..).zip(self.groups.drain(..)) {
            if keep(pool.as_slice()) {
                members.push(pool);
                groups.push(group);
            }
        }
        self.members = members;
        self.groups = groups;
        self.reindex();
    }

    fn reindex(&mut self) {
        self.owner.iter_mut().for_each(|slot| *slot = None);
        for (pool, members) in self.members.iter().enumerate() {
            for &location in members {
                self.owner[location] = Some(pool);
            }
        }
    }

    fn into_pools(self) -> Vec<CarPool> {
        self.members
            .into_iter()
            .zip(self.groups)
            .map(|(locations, group_id)| CarPool::new(locations, group_id))
            .collect()
    }
}

/// Place every location into exactly one pool.
///
/// Seed pools (from affinity grouping) are kept as starting points. Each
/// radius pass visits locations farthest-from-event first and greedily pulls
/// in the nearest unpooled neighbours within the radius. Pools left with a
/// single location are dissolved between passes so they can join a wider pool
/// later, except after the final radius, which guarantees full coverage.
pub fn expand_pools(index: &LocationIndex, seeds: Vec<CarPool>, options: &PlanOptions) -> Vec<CarPool> {
    let mut set = PoolSet::new(index.len(), seeds);
    let order = farthest_first(index);
    let radii = options.radii();

    for (step, &radius) in radii.iter().enumerate() {
        let last = step + 1 == radii.len();

        for &location in &order {
            let pool = match set.pool_of(location) {
                Some(pool) => pool,
                None => set.open(location, index.get(location).highest_group_id),
            };
            fill_pool(index, &mut set, pool, location, radius, options.max_pool_size);
        }

        if !last {
            let before = set.len();
            set.retain(|members| members.len() > 1);
            debug!(radius, dissolved = before - set.len(), "dissolved single-location pools");
        }

        merge_pools(index, &mut set, radius, options.max_pool_size);
        set.retain(|members| !members.is_empty());

        debug!(radius, pools = set.len(), "radius pass complete");
    }

    for members in &set.members {
        if let [only] = members.as_slice() {
            warn!(
                location = %index.get(*only).location,
                max_radius = options.max_radius,
                "no neighbour within reach; location travels alone"
            );
        }
    }

    info!(pools = set.len(), locations = index.len(), "proximity expansion complete");
    set.into_pools()
}

/// Location indices ordered by descending distance to the event; ties keep index order.
fn farthest_first(index: &LocationIndex) -> Vec<usize> {
    let mut order: Vec<usize> = (0..index.len()).collect();
    order.sort_by(|&a, &b| {
        index
            .get(b)
            .distance_to_event
            .total_cmp(&index.get(a).distance_to_event)
    });
    order
}

fn fill_pool(
    index: &LocationIndex,
    set: &mut PoolSet,
    pool: usize,
    from: usize,
    radius: f64,
    capacity: u32,
) {
    loop {
        let seats = set.seats(pool, index);
        if seats >= capacity {
            return;
        }
        match nearest_unpooled(index, set, from, radius, capacity - seats) {
            Some(next) => set.add(pool, next),
            None => return,
        }
    }
}

/// Nearest unpooled location within `radius` of `from` that fits in `free_seats`.
///
/// Candidates are scanned in index order and only a strictly smaller distance
/// replaces the current best, so the first-seen candidate wins ties.
fn nearest_unpooled(
    index: &LocationIndex,
    set: &PoolSet,
    from: usize,
    radius: f64,
    free_seats: u32,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for candidate in 0..index.len() {
        if candidate == from || set.is_pooled(candidate) || index.seats(candidate) > free_seats {
            continue;
        }
        let distance = index.distance(from, candidate);
        if distance > radius {
            continue;
        }
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((candidate, distance));
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Move at most one location per pool pair when two pools have members within `radius`.
fn merge_pools(index: &LocationIndex, set: &mut PoolSet, radius: f64, capacity: u32) {
    for receiver in 0..set.len() {
        for donor in receiver + 1..set.len() {
            if let Some(location) = find_transfer(index, set, receiver, donor, radius, capacity) {
                debug!(
                    location = %index.get(location).location,
                    receiver,
                    donor,
                    radius,
                    "moving location between pools"
                );
                set.move_location(location, donor, receiver);
            }
        }
    }
}

fn find_transfer(
    index: &LocationIndex,
    set: &PoolSet,
    receiver: usize,
    donor: usize,
    radius: f64,
    capacity: u32,
) -> Option<usize> {
    let receiver_seats = set.seats(receiver, index);
    let donor_seats = set.seats(donor, index);

    for &kept in &set.members[receiver] {
        for &moved in &set.members[donor] {
            if index.distance(kept, moved) > radius || is_anchored(index, set, donor, moved) {
                continue;
            }
            if receiver_seats.saturating_add(index.seats(moved)) <= capacity
                && donor_seats.saturating_add(index.seats(kept)) <= capacity
            {
                return Some(moved);
            }
        }
    }

    None
}

/// A location sharing its affinity group with another member of its pool stays put.
fn is_anchored(index: &LocationIndex, set: &PoolSet, pool: usize, location: usize) -> bool {
    let group_id = index.get(location).highest_group_id;
    group_id != 0
        && set.members[pool]
            .iter()
            .any(|&other| other != location && index.get(other).highest_group_id == group_id)
}
