//! Validation failures raised before any allocation work starts.
//!
//! Best-effort outcomes (a group too small for its quota, a room left over
//! target) are not errors; they surface through [`crate::report`].

use thiserror::Error;

use crate::constants::{MAX_CAPACITY, MAX_IDENTITY_FIELD, MIN_CAPACITY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// Per-room capacity outside the accepted range.
    #[error("room capacity {0} is outside {min}..={max}", min = MIN_CAPACITY, max = MAX_CAPACITY)]
    InvalidCapacity(u32),
    /// Nothing to allocate.
    #[error("roster has no members")]
    EmptyRoster,
    /// Neither a partition-specific nor a default identity prefix exists.
    #[error("no identity prefix for partition `{0}` and no default prefix configured")]
    MissingPrefix(String),
    /// Roster record at this index has an empty or whitespace-only name.
    #[error("roster record {0} has a blank name")]
    BlankName(usize),
    /// Seating charts need at least one column.
    #[error("grid width {0} must be at least 1")]
    InvalidGridWidth(u32),
    /// A room or seat number would widen the fixed two-digit identity field.
    #[error("{field} number {value} exceeds the identity field limit of {limit}", limit = MAX_IDENTITY_FIELD)]
    IdentityOverflow { field: &'static str, value: u32 },
}

pub type Result<T> = std::result::Result<T, AllocationError>;
