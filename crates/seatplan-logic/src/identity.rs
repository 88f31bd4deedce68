//! Placement identifiers: `prefix + room:02 + seat:02`.
//!
//! The export side parses these by position, so both numeric fields are
//! always exactly two zero-padded digits.

use crate::config::PrefixTable;
use crate::constants::{IDENTITY_FIELD_WIDTH, MAX_IDENTITY_FIELD};
use crate::error::{AllocationError, Result};

/// Compose an identity from an already-resolved prefix.
pub fn compose(prefix: &str, room_number: u32, seat_number: u32) -> Result<String> {
    check_field("room", room_number)?;
    check_field("seat", seat_number)?;
    Ok(format!(
        "{prefix}{room_number:0w$}{seat_number:0w$}",
        w = IDENTITY_FIELD_WIDTH
    ))
}

/// Compose an identity for a member of `partition`, resolving its prefix.
pub fn compose_for(
    prefixes: &PrefixTable,
    partition: &str,
    room_number: u32,
    seat_number: u32,
) -> Result<String> {
    compose(prefixes.resolve(partition)?, room_number, seat_number)
}

/// Reject numbers that would widen the fixed identity field.
pub fn check_field(field: &'static str, value: u32) -> Result<()> {
    if value > MAX_IDENTITY_FIELD {
        return Err(AllocationError::IdentityOverflow { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_padding() {
        assert_eq!(compose("G1", 1, 7).unwrap(), "G10107");
        assert_eq!(compose("S", 12, 36).unwrap(), "S1236");
        assert_eq!(compose("", 3, 4).unwrap(), "0304");
    }

    #[test]
    fn test_partition_prefix_and_default() {
        let mut prefixes = PrefixTable::with_default("X");
        prefixes.by_partition.insert("Grade 2".into(), "B".into());
        assert_eq!(compose_for(&prefixes, "Grade 2", 2, 5).unwrap(), "B0205");
        assert_eq!(compose_for(&prefixes, "Grade 5", 2, 5).unwrap(), "X0205");
    }

    #[test]
    fn test_missing_prefix() {
        let prefixes = PrefixTable::default();
        assert_eq!(
            compose_for(&prefixes, "Grade 5", 1, 1),
            Err(AllocationError::MissingPrefix("Grade 5".into()))
        );
    }

    #[test]
    fn test_field_overflow() {
        assert_eq!(
            compose("S", 1, 100),
            Err(AllocationError::IdentityOverflow {
                field: "seat",
                value: 100
            })
        );
        assert!(compose("S", 99, 99).is_ok());
    }
}
