//! Fixed limits and fallback labels shared by every allocation step.

/// Columns in every room's seating chart.
pub const GRID_WIDTH: u32 = 6;

/// Smallest accepted per-room capacity.
pub const MIN_CAPACITY: u32 = 1;

/// Largest accepted per-room capacity (12 rows of 6 seats).
pub const MAX_CAPACITY: u32 = 72;

/// Capacity used when a config does not name one.
pub const DEFAULT_CAPACITY: u32 = 36;

/// Partition label for records that arrive without a partition key.
pub const UNKNOWN_PARTITION: &str = "unknown";

/// Identity prefix carried by `AllocationConfig::default()`.
pub const DEFAULT_PREFIX: &str = "S";

/// Width of the room and seat fields inside an identity string.
pub const IDENTITY_FIELD_WIDTH: usize = 2;

/// Largest room or seat number that still fits [`IDENTITY_FIELD_WIDTH`] digits.
pub const MAX_IDENTITY_FIELD: u32 = 99;
