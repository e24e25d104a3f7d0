//! Pickup ordering and the reverse-time schedule for each pool.

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use crate::error::PlanError;
use crate::location_index::LocationIndex;
use crate::model::{CarPool, Event, TravelTime};
use crate::planner::PlanOptions;
use crate::traits::{RouteLeg, RouteProvider};

/// Put the driver's location first, then the rest farthest-from-event first.
pub fn order_pickups(index: &LocationIndex, pools: &mut [CarPool]) {
    for pool in pools.iter_mut() {
        let driver_at = pool
            .driver
            .as_ref()
            .and_then(|driver| index.position(&driver.location))
            .and_then(|location| pool.locations.iter().position(|&l| l == location));

        let rest = match driver_at {
            Some(at) => {
                let location = pool.locations.remove(at);
                pool.locations.insert(0, location);
                1
            }
            None => 0,
        };

        pool.locations[rest..].sort_by(|&a, &b| {
            index
                .get(b)
                .distance_to_event
                .total_cmp(&index.get(a).distance_to_event)
        });
    }
}

/// Request a route for every ordered pool and stamp pickup times.
pub fn schedule_pools<R>(
    index: &mut LocationIndex,
    pools: &[CarPool],
    event: &Event,
    routes: &R,
    options: &PlanOptions,
) -> Result<(), PlanError>
where
    R: RouteProvider,
{
    for (pool_idx, pool) in pools.iter().enumerate() {
        let Some((&start, rest)) = pool.locations.split_first() else {
            continue;
        };
        let origin = index.get(start).location.clone();
        let waypoints = index.names(rest);

        let legs = routes.route_legs(&origin, &event.location, &waypoints)?;
        apply_legs(
            index,
            pool_idx,
            pool,
            &legs,
            event.start_time,
            options.pickup_buffer_secs,
        )?;
    }

    info!(pools = pools.len(), "pickup schedule computed");
    Ok(())
}

/// Walk the legs backwards from `start_time`, attaching a [`TravelTime`] to
/// every location in the pool.
///
/// Leg `i` runs from location `i` to the next stop; the last leg ends at the event.
pub fn apply_legs(
    index: &mut LocationIndex,
    pool_idx: usize,
    pool: &CarPool,
    legs: &[RouteLeg],
    start_time: NaiveDateTime,
    buffer_secs: i64,
) -> Result<(), PlanError> {
    if legs.len() != pool.locations.len() {
        return Err(PlanError::RouteLegMismatch {
            pool: pool_idx,
            expected: pool.locations.len(),
            actual: legs.len(),
        });
    }

    let mut pickup = start_time;
    for (leg, &location) in legs.iter().zip(&pool.locations).rev() {
        let record = index.get_mut(location);
        pickup = leg
            .duration_secs
            .checked_add(buffer_secs)
            .and_then(TimeDelta::try_seconds)
            .and_then(|step| pickup.checked_sub_signed(step))
            .ok_or_else(|| PlanError::LegDurationOutOfRange {
                pool: pool_idx,
                location: record.location.clone(),
                duration_secs: leg.duration_secs,
            })?;
        record.travel_time = Some(TravelTime {
            time_to_next_secs: leg.duration_secs,
            expected_pickup: pickup,
        });
        debug!(location = %record.location, pickup = %pickup, "pickup scheduled");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attendee;
    use crate::traits::MatrixElement;
    use chrono::NaiveDate;

    fn index_with_distances(distances: &[f64]) -> LocationIndex {
        let attendees: Vec<Attendee> = (0..distances.len())
            .map(|i| Attendee {
                name: format!("p{}", i),
                seats: 1,
                location: format!("L{}", i),
                can_drive: true,
                group_id: 0,
                must_drive: false,
            })
            .collect();
        let rows = distances
            .iter()
            .map(|d| {
                let mut row = vec![MatrixElement::ok(format!("{} mi", d))];
                row.extend(distances.iter().map(|_| MatrixElement::ok("1 mi")));
                row
            })
            .collect();
        LocationIndex::from_matrix(&attendees, "EV", rows).unwrap()
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_driver_first_then_descending_distance() {
        let index = index_with_distances(&[3.0, 8.0, 1.0, 5.0]);
        let mut pool = CarPool::new(vec![0, 1, 2, 3], 0);
        pool.driver = Some(index.get(2).attendees[0].clone());
        let mut pools = vec![pool];

        order_pickups(&index, &mut pools);
        assert_eq!(pools[0].locations, vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_legs_walked_backwards_from_start() {
        let mut index = index_with_distances(&[6.0, 2.0]);
        let pool = CarPool::new(vec![0, 1], 0);
        let legs = [RouteLeg { duration_secs: 900 }, RouteLeg { duration_secs: 300 }];

        apply_legs(&mut index, 0, &pool, &legs, start(), 600).unwrap();

        let last = index.get(1).travel_time.unwrap();
        assert_eq!(last.time_to_next_secs, 300);
        assert_eq!(last.expected_pickup, start() - TimeDelta::seconds(900));

        let first = index.get(0).travel_time.unwrap();
        assert_eq!(first.time_to_next_secs, 900);
        assert_eq!(first.expected_pickup, start() - TimeDelta::seconds(900 + 1500));
        assert!(first.expected_pickup <= last.expected_pickup);
    }

    #[test]
    fn test_leg_count_mismatch() {
        let mut index = index_with_distances(&[6.0, 2.0]);
        let pool = CarPool::new(vec![0, 1], 0);
        let legs = [RouteLeg { duration_secs: 900 }];

        match apply_legs(&mut index, 4, &pool, &legs, start(), 600) {
            Err(PlanError::RouteLegMismatch { pool, expected, actual }) => {
                assert_eq!((pool, expected, actual), (4, 2, 1));
            }
            other => panic!("expected RouteLegMismatch, got {:?}", other),
        }
        assert!(index.get(0).travel_time.is_none());
    }

    #[test]
    fn test_absurd_leg_duration_is_an_error() {
        let mut index = index_with_distances(&[6.0, 2.0]);
        let pool = CarPool::new(vec![0, 1], 2);
        let legs = [
            RouteLeg { duration_secs: 900 },
            RouteLeg {
                duration_secs: i64::MAX / 100,
            },
        ];

        match apply_legs(&mut index, 2, &pool, &legs, start(), 600) {
            Err(PlanError::LegDurationOutOfRange {
                pool,
                location,
                duration_secs,
            }) => {
                assert_eq!(pool, 2);
                assert_eq!(location, "L1");
                assert_eq!(duration_secs, i64::MAX / 100);
            }
            other => panic!("expected LegDurationOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_buffer_is_an_error() {
        let mut index = index_with_distances(&[6.0]);
        let pool = CarPool::new(vec![0], 0);
        let legs = [RouteLeg {
            duration_secs: i64::MAX,
        }];

        assert!(matches!(
            apply_legs(&mut index, 0, &pool, &legs, start(), 600),
            Err(PlanError::LegDurationOutOfRange { .. })
        ));
    }
}
