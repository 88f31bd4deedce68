//! Top-level allocation entry point.
//!
//! Groups the roster by partition and runs, per partition:
//! [`room_sizer::plan`] → [`quota::allocate`] → [`grid::assign`].
//! Room numbers restart at 1 in every partition. Output is ordered by the
//! configured partition order (unlisted partitions follow in encounter
//! order), then by room number.
//!
//! Every partition is split into rooms before any room is seated or
//! reported, so the identity field check sees actual room sizes and an error
//! never comes with a partial result.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{validate_config, AllocationConfig};
use crate::error::{AllocationError, Result};
use crate::grid;
use crate::identity::check_field;
use crate::model::{Member, RoomPlan, SeatingArrangement};
use crate::quota;
use crate::report::{AllocationReporter, LogReporter, RoomSummary};
use crate::room_sizer::{self, room_plans};

/// One partition's members and room plan, validated and ready to allocate.
#[derive(Debug, Clone)]
struct PartitionJob {
    key: String,
    members: Vec<Member>,
    plans: Vec<RoomPlan>,
    min_per_group: u32,
}

/// Allocate the whole roster with an injected RNG and reporter.
pub fn run<R: Rng + ?Sized>(
    roster: &[Member],
    config: &AllocationConfig,
    rng: &mut R,
    reporter: &mut dyn AllocationReporter,
) -> Result<Vec<SeatingArrangement>> {
    let jobs = prepare(roster, config)?;

    let mut allocated = Vec::with_capacity(jobs.len());
    for job in jobs {
        let rooms = quota::allocate(&job.members, &job.plans, job.min_per_group, rng);
        if let Some(largest) = rooms.iter().map(Vec::len).max() {
            check_field("seat", u32::try_from(largest).unwrap_or(u32::MAX))?;
        }
        allocated.push((job, rooms));
    }

    let mut arrangements = Vec::new();
    for (job, rooms) in allocated {
        reporter.partition_planned(&job.key, &job.plans);
        arrangements.extend(seat_partition(&job, rooms, config, rng, reporter)?);
    }
    Ok(arrangements)
}

/// Allocate with a [`LogReporter`]. `None` seeds from system entropy.
pub fn allocate_roster(
    roster: &[Member],
    config: &AllocationConfig,
    seed: Option<u64>,
) -> Result<Vec<SeatingArrangement>> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run(roster, config, &mut rng, &mut LogReporter)
}

/// Validate inputs and split the roster into ordered partition jobs.
fn prepare(roster: &[Member], config: &AllocationConfig) -> Result<Vec<PartitionJob>> {
    if let Some(err) = validate_config(config).into_iter().next() {
        return Err(err);
    }
    if roster.is_empty() {
        return Err(AllocationError::EmptyRoster);
    }
    if let Some(idx) = roster.iter().position(|m| m.name.trim().is_empty()) {
        return Err(AllocationError::BlankName(idx));
    }

    let mut jobs = Vec::new();
    for (key, members) in partition_roster(roster, &config.partition_order) {
        config.prefixes.resolve(&key)?;
        let sizes = room_sizer::plan(members.len() as u32, config.capacity, config.strategy)?;
        check_field("room", sizes.len() as u32)?;
        if let Some(&largest) = sizes.iter().max() {
            check_field("seat", largest)?;
        }
        jobs.push(PartitionJob {
            min_per_group: config.quotas.min_for(&key),
            plans: room_plans(&sizes),
            key,
            members,
        });
    }
    Ok(jobs)
}

/// Group members by partition label, ordered by `order` and then encounter order.
pub fn partition_roster(roster: &[Member], order: &[String]) -> Vec<(String, Vec<Member>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut partitions: Vec<(String, Vec<Member>)> = Vec::new();
    for member in roster {
        let key = member.partition();
        let slot = *index.entry(key).or_insert_with(|| {
            partitions.push((key.to_string(), Vec::new()));
            partitions.len() - 1
        });
        partitions[slot].1.push(member.clone());
    }

    // Stable sort keeps encounter order among unlisted partitions.
    partitions.sort_by_key(|(key, _)| {
        order
            .iter()
            .position(|listed| listed == key)
            .unwrap_or(usize::MAX)
    });
    partitions
}

fn seat_partition<R: Rng + ?Sized>(
    job: &PartitionJob,
    rooms: Vec<Vec<Member>>,
    config: &AllocationConfig,
    rng: &mut R,
    reporter: &mut dyn AllocationReporter,
) -> Result<Vec<SeatingArrangement>> {

    let mut totals: HashMap<&str, usize> = HashMap::new();
    for member in &job.members {
        *totals.entry(member.group.as_str()).or_insert(0) += 1;
    }

    let mut arrangements = Vec::with_capacity(job.plans.len());
    for (plan, members) in job.plans.iter().zip(rooms) {
        let placements = grid::assign(
            &members,
            plan.room_number,
            &config.prefixes,
            config.grid_width,
            rng,
        )?;
        reporter.room_summary(&RoomSummary::from_room(
            &job.key,
            plan,
            &placements,
            job.min_per_group,
            &totals,
        ));
        arrangements.push(SeatingArrangement {
            partition_key: job.key.clone(),
            room_number: plan.room_number,
            placements,
        });
    }
    Ok(arrangements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    use crate::config::SizingStrategy;
    use crate::constants::UNKNOWN_PARTITION;
    use crate::report::{CollectingReporter, NoopReporter};

    fn roster(partition: &str, size: usize, groups: usize) -> Vec<Member> {
        (0..size)
            .map(|i| {
                let group = format!("C{}", i % groups);
                Member::new(format!("{partition}-{i}"), group, partition)
            })
            .collect()
    }

    fn run_seeded(
        roster: &[Member],
        config: &AllocationConfig,
    ) -> Result<Vec<SeatingArrangement>> {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        run(roster, config, &mut rng, &mut NoopReporter)
    }

    #[test]
    fn test_room_numbers_restart_per_partition() {
        let mut members = roster("Grade 1", 60, 3);
        members.extend(roster("Grade 2", 50, 2));
        let config = AllocationConfig {
            capacity: 30,
            ..AllocationConfig::default()
        };
        let rooms = run_seeded(&members, &config).unwrap();

        let keys: Vec<(&str, u32)> = rooms
            .iter()
            .map(|r| (r.partition_key.as_str(), r.room_number))
            .collect();
        assert_eq!(
            keys,
            vec![("Grade 1", 1), ("Grade 1", 2), ("Grade 2", 1), ("Grade 2", 2)]
        );
    }

    #[test]
    fn test_partition_order_then_encounter_order() {
        let mut members = roster("B", 5, 1);
        members.extend(roster("C", 5, 1));
        members.extend(roster("A", 5, 1));
        let order = vec!["A".to_string(), "Z".to_string()];

        let keys: Vec<String> = partition_roster(&members, &order)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_blank_partition_goes_to_unknown() {
        let members = vec![Member::new("Ana", "A", ""), Member::new("Ben", "A", " ")];
        let rooms = run_seeded(&members, &AllocationConfig::default()).unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].partition_key, UNKNOWN_PARTITION);
        assert_eq!(rooms[0].len(), 2);
    }

    #[test]
    fn test_empty_roster() {
        assert_eq!(
            run_seeded(&[], &AllocationConfig::default()),
            Err(AllocationError::EmptyRoster)
        );
    }

    #[test]
    fn test_invalid_capacity() {
        let config = AllocationConfig {
            capacity: 0,
            ..AllocationConfig::default()
        };
        assert_eq!(
            run_seeded(&roster("G", 10, 2), &config),
            Err(AllocationError::InvalidCapacity(0))
        );
    }

    #[test]
    fn test_missing_prefix_fails_before_any_work() {
        let mut config = AllocationConfig::default();
        config.prefixes.default = None;
        config
            .prefixes
            .by_partition
            .insert("Grade 1".into(), "A".into());
        let mut members = roster("Grade 1", 10, 2);
        members.extend(roster("Grade 2", 10, 2));

        let mut reporter = CollectingReporter::default();
        let result = run(
            &members,
            &config,
            &mut ChaCha8Rng::seed_from_u64(1),
            &mut reporter,
        );
        assert_eq!(result, Err(AllocationError::MissingPrefix("Grade 2".into())));
        assert!(reporter.plans.is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut members = roster("G", 3, 1);
        members[1].name = "   ".into();
        assert_eq!(
            run_seeded(&members, &AllocationConfig::default()),
            Err(AllocationError::BlankName(1))
        );
    }

    #[test]
    fn test_oversized_room_rejected() {
        let config = AllocationConfig {
            capacity: 72,
            strategy: SizingStrategy::PackLast,
            ..AllocationConfig::default()
        };
        assert_eq!(
            run_seeded(&roster("G", 108, 4), &config),
            Err(AllocationError::IdentityOverflow {
                field: "seat",
                value: 108
            })
        );
    }

    #[test]
    fn test_overfull_room_rejected_before_anything_is_reported() {
        // One class of 100 with quota 60 can not be split across two rooms
        // of 50, so room 1 ends up holding all 100.
        let mut members = roster("A", 5, 1);
        members.extend(roster("B", 100, 1));
        let mut config = AllocationConfig {
            capacity: 50,
            partition_order: vec!["A".into(), "B".into()],
            ..AllocationConfig::default()
        };
        config.quotas.by_partition.insert("B".into(), 60);

        let mut reporter = CollectingReporter::default();
        let result = run(
            &members,
            &config,
            &mut ChaCha8Rng::seed_from_u64(3),
            &mut reporter,
        );
        assert_eq!(
            result,
            Err(AllocationError::IdentityOverflow {
                field: "seat",
                value: 100
            })
        );
        assert!(reporter.plans.is_empty());
        assert!(reporter.rooms.is_empty());
    }

    #[test]
    fn test_single_room_classes_spread_over_all_rooms() {
        let mut config = AllocationConfig {
            capacity: 30,
            ..AllocationConfig::default()
        };
        config.quotas.default = 6;
        let rooms = run_seeded(&roster("G", 80, 8), &config).unwrap();

        let sizes: Vec<usize> = rooms.iter().map(SeatingArrangement::len).collect();
        assert_eq!(sizes, vec![30, 30, 20]);
    }

    #[test]
    fn test_reporter_sees_every_room() {
        let config = AllocationConfig {
            capacity: 20,
            ..AllocationConfig::default()
        };
        let mut reporter = CollectingReporter::default();
        let rooms = run(
            &roster("G", 50, 5),
            &config,
            &mut ChaCha8Rng::seed_from_u64(2),
            &mut reporter,
        )
        .unwrap();

        assert_eq!(reporter.plans.len(), 1);
        assert_eq!(reporter.rooms.len(), rooms.len());
        let seated: u32 = reporter.rooms.iter().map(|s| s.actual_size).sum();
        assert_eq!(seated, 50);
    }

    #[test]
    fn test_allocate_roster_with_seed_is_repeatable() {
        let members = roster("G", 45, 3);
        let config = AllocationConfig::default();
        assert_eq!(
            allocate_roster(&members, &config, Some(5)).unwrap(),
            allocate_roster(&members, &config, Some(5)).unwrap()
        );
    }
}
