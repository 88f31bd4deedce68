//! Records flowing through the allocation pipeline.
//!
//! `Member` is read-only input; `RoomPlan`, `Placement` and
//! `SeatingArrangement` are built fresh on every run and never mutated once
//! handed back to the caller. Field names serialize in camelCase, which is
//! the shape the export side consumes.

use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_PARTITION;

/// One individual on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    /// Sub-group label (a class). May be empty; empty is a group of its own.
    #[serde(default)]
    pub group: String,
    /// Top-level grouping key (a grade). Empty falls back to [`UNKNOWN_PARTITION`].
    #[serde(default)]
    pub partition_key: String,
}

impl Member {
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        partition_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            partition_key: partition_key.into(),
        }
    }

    /// Partition label with the unknown-partition fallback applied.
    pub fn partition(&self) -> &str {
        if self.partition_key.trim().is_empty() {
            UNKNOWN_PARTITION
        } else {
            &self.partition_key
        }
    }
}

/// Target size of one room inside a partition. Room numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPlan {
    pub room_number: u32,
    pub target_size: u32,
}

/// A member pinned to a room, seat and grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub member: Member,
    pub room_number: u32,
    /// `(col - 1) * grid_rows + row`, unique and contiguous within a room.
    pub seat_number: u32,
    /// 1-based grid row.
    pub row: u32,
    /// 1-based grid column.
    pub col: u32,
    pub identity: String,
}

/// All placements of one room, in seating-chart (column-major) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingArrangement {
    pub partition_key: String,
    pub room_number: u32,
    pub placements: Vec<Placement>,
}

impl SeatingArrangement {
    /// Number of seated members.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_partition_falls_back_to_unknown() {
        assert_eq!(Member::new("Ana", "A", "").partition(), UNKNOWN_PARTITION);
        assert_eq!(Member::new("Ana", "A", "  ").partition(), UNKNOWN_PARTITION);
        assert_eq!(Member::new("Ana", "A", "Grade 2").partition(), "Grade 2");
    }

    #[test]
    fn test_member_json_uses_camel_case_and_defaults() {
        let member: Member = serde_json::from_str(r#"{"name":"Ana"}"#).unwrap();
        assert_eq!(member, Member::new("Ana", "", ""));

        let json = serde_json::to_string(&Member::new("Ana", "A", "G1")).unwrap();
        assert!(json.contains("\"partitionKey\":\"G1\""), "{json}");
    }
}
