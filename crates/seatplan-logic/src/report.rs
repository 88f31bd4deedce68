//! Per-room summaries handed to an injected reporter.
//!
//! Best-effort outcomes (rooms off target, groups short of quota, adjacent
//! classmates) are not errors. The orchestrator describes each room with a
//! [`RoomSummary`] and lets the caller decide what to do with it: log it,
//! collect it, or drop it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::grid::count_adjacent_conflicts;
use crate::model::{Placement, RoomPlan};

/// Size, quota and adjacency outcome of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub partition_key: String,
    pub room_number: u32,
    pub target_size: u32,
    pub actual_size: u32,
    /// Members per group in this room.
    pub group_counts: BTreeMap<String, u32>,
    /// Groups below quota that also have members in other rooms.
    pub quota_shortfalls: Vec<String>,
    pub adjacent_conflicts: u32,
}

impl RoomSummary {
    /// Summarize a seated room. `partition_totals` holds each group's size
    /// across the whole partition.
    pub fn from_room(
        partition_key: &str,
        plan: &RoomPlan,
        placements: &[Placement],
        min_per_group: u32,
        partition_totals: &HashMap<&str, usize>,
    ) -> Self {
        let mut group_counts: BTreeMap<String, u32> = BTreeMap::new();
        for placement in placements {
            *group_counts
                .entry(placement.member.group.clone())
                .or_insert(0) += 1;
        }
        let quota_shortfalls = group_counts
            .iter()
            .filter(|&(group, &count)| {
                let total = partition_totals.get(group.as_str()).copied().unwrap_or(0);
                count < min_per_group && (count as usize) < total
            })
            .map(|(group, _)| group.clone())
            .collect();

        Self {
            partition_key: partition_key.to_string(),
            room_number: plan.room_number,
            target_size: plan.target_size,
            actual_size: placements.len() as u32,
            group_counts,
            quota_shortfalls,
            adjacent_conflicts: count_adjacent_conflicts(placements) as u32,
        }
    }

    pub fn is_on_target(&self) -> bool {
        self.actual_size == self.target_size
    }
}

/// Receives allocation progress. All methods default to doing nothing.
pub trait AllocationReporter {
    /// Room sizes chosen for a partition, before members are distributed.
    fn partition_planned(&mut self, _partition_key: &str, _plans: &[RoomPlan]) {}

    /// One finished room.
    fn room_summary(&mut self, _summary: &RoomSummary) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl AllocationReporter for NoopReporter {}

/// Writes summaries through the `log` facade; off-target rooms,
/// quota shortfalls and adjacency conflicts are warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl AllocationReporter for LogReporter {
    fn partition_planned(&mut self, partition_key: &str, plans: &[RoomPlan]) {
        let sizes: Vec<u32> = plans.iter().map(|p| p.target_size).collect();
        log::info!(
            "Partition '{}': {} rooms, target sizes {:?}",
            partition_key,
            plans.len(),
            sizes
        );
    }

    fn room_summary(&mut self, summary: &RoomSummary) {
        log::info!(
            "Partition '{}' room {}: {} seated (target {}), groups {:?}",
            summary.partition_key,
            summary.room_number,
            summary.actual_size,
            summary.target_size,
            summary.group_counts
        );
        if !summary.is_on_target() {
            log::warn!(
                "Partition '{}' room {} is off target: {} vs {}",
                summary.partition_key,
                summary.room_number,
                summary.actual_size,
                summary.target_size
            );
        }
        if !summary.quota_shortfalls.is_empty() {
            log::warn!(
                "Partition '{}' room {} below quota for {:?}",
                summary.partition_key,
                summary.room_number,
                summary.quota_shortfalls
            );
        }
        if summary.adjacent_conflicts > 0 {
            log::warn!(
                "Partition '{}' room {} has {} adjacent same-group pairs",
                summary.partition_key,
                summary.room_number,
                summary.adjacent_conflicts
            );
        }
    }
}

/// Keeps every summary, for harnesses and tests.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    pub plans: Vec<(String, Vec<RoomPlan>)>,
    pub rooms: Vec<RoomSummary>,
}

impl AllocationReporter for CollectingReporter {
    fn partition_planned(&mut self, partition_key: &str, plans: &[RoomPlan]) {
        self.plans.push((partition_key.to_string(), plans.to_vec()));
    }

    fn room_summary(&mut self, summary: &RoomSummary) {
        self.rooms.push(summary.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Member;

    fn placed(group: &str, row: u32, col: u32) -> Placement {
        Placement {
            member: Member::new(format!("{group}{row}{col}"), group, "G1"),
            room_number: 1,
            seat_number: (col - 1) * 2 + row,
            row,
            col,
            identity: String::new(),
        }
    }

    #[test]
    fn test_summary_flags_shortfalls_only_for_split_groups() {
        let placements = vec![
            placed("A", 1, 1),
            placed("B", 2, 1),
            placed("A", 1, 2),
            placed("C", 2, 2),
        ];
        let totals = HashMap::from([("A", 5), ("B", 1), ("C", 3)]);
        let plan = RoomPlan {
            room_number: 1,
            target_size: 4,
        };
        let summary = RoomSummary::from_room("G1", &plan, &placements, 2, &totals);

        assert!(summary.is_on_target());
        assert_eq!(summary.group_counts["A"], 2);
        // B holds its whole group; C has 1 of 3.
        assert_eq!(summary.quota_shortfalls, vec!["C".to_string()]);
        assert_eq!(summary.adjacent_conflicts, 1);
    }

    #[test]
    fn test_collecting_reporter_keeps_everything() {
        let mut reporter = CollectingReporter::default();
        let plans = [RoomPlan {
            room_number: 1,
            target_size: 3,
        }];
        reporter.partition_planned("G1", &plans);
        let summary = RoomSummary::from_room("G1", &plans[0], &[], 0, &HashMap::new());
        reporter.room_summary(&summary);

        assert_eq!(reporter.plans.len(), 1);
        assert_eq!(reporter.rooms, vec![summary]);
        assert!(!reporter.rooms[0].is_on_target());
    }
}
