//! Room sizing: how many rooms a partition needs and how full each one is.
//!
//! A remainder counts as *small* when it is at most half a room
//! (`remainder * 2 <= capacity`):
//! - `PackLast`: full rooms, a small remainder folds into the last one,
//!   a large remainder gets its own room.
//! - `SeparateRemainder`: full rooms, any remainder gets its own room.
//! - `Average`: `total / capacity` rooms (one more for a large remainder or
//!   when no room would be full), sizes differing by at most one with the
//!   front rooms taking the extra unit.
//!
//! | total / capacity | PackLast | SeparateRemainder | Average |
//! |------------------|----------|-------------------|---------|
//! | 90 / 36 | 36, 54 | 36, 36, 18 | 45, 45 |
//! | 100 / 36 | 36, 36, 28 | 36, 36, 28 | 34, 33, 33 |

use crate::config::SizingStrategy;
use crate::error::{AllocationError, Result};
use crate::model::RoomPlan;

/// Target size of every room, in room order. Sums to `total`.
pub fn plan(total: u32, capacity: u32, strategy: SizingStrategy) -> Result<Vec<u32>> {
    if capacity < 1 {
        return Err(AllocationError::InvalidCapacity(capacity));
    }
    if total == 0 {
        return Ok(Vec::new());
    }

    let full = total / capacity;
    let remainder = total % capacity;
    let small_remainder = remainder * 2 <= capacity;

    let sizes = match strategy {
        SizingStrategy::PackLast => {
            let mut sizes = vec![capacity; full as usize];
            if remainder > 0 {
                if small_remainder && full > 0 {
                    if let Some(last) = sizes.last_mut() {
                        *last += remainder;
                    }
                } else {
                    sizes.push(remainder);
                }
            }
            sizes
        }
        SizingStrategy::SeparateRemainder => {
            let mut sizes = vec![capacity; full as usize];
            if remainder > 0 {
                sizes.push(remainder);
            }
            sizes
        }
        SizingStrategy::Average => {
            let rooms = if full == 0 || !small_remainder {
                full + 1
            } else {
                full
            };
            even_split(total, rooms)
        }
    };

    Ok(sizes)
}

/// Split `total` across `rooms` so sizes differ by at most one.
pub fn even_split(total: u32, rooms: u32) -> Vec<u32> {
    if rooms == 0 {
        return Vec::new();
    }
    let base = total / rooms;
    let extra = total % rooms;
    (0..rooms).map(|i| base + u32::from(i < extra)).collect()
}

/// Number the sizes 1..=N.
pub fn room_plans(sizes: &[u32]) -> Vec<RoomPlan> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &target_size)| RoomPlan {
            room_number: i as u32 + 1,
            target_size,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use SizingStrategy::*;

    #[test]
    fn test_pack_last_small_remainder_merges() {
        assert_eq!(plan(90, 36, PackLast).unwrap(), vec![36, 54]);
    }

    #[test]
    fn test_pack_last_large_remainder_stands_alone() {
        assert_eq!(plan(100, 36, PackLast).unwrap(), vec![36, 36, 28]);
    }

    #[test]
    fn test_pack_last_single_small_room() {
        assert_eq!(plan(10, 36, PackLast).unwrap(), vec![10]);
    }

    #[test]
    fn test_separate_remainder() {
        assert_eq!(plan(90, 36, SeparateRemainder).unwrap(), vec![36, 36, 18]);
        assert_eq!(plan(100, 36, SeparateRemainder).unwrap(), vec![36, 36, 28]);
        assert_eq!(plan(73, 36, SeparateRemainder).unwrap(), vec![36, 36, 1]);
    }

    #[test]
    fn test_average() {
        assert_eq!(plan(90, 36, Average).unwrap(), vec![45, 45]);
        assert_eq!(plan(100, 36, Average).unwrap(), vec![34, 33, 33]);
        assert_eq!(plan(20, 36, Average).unwrap(), vec![20]);
    }

    #[test]
    fn test_exact_multiple_has_no_extra_room() {
        for strategy in [PackLast, SeparateRemainder, Average] {
            assert_eq!(plan(72, 36, strategy).unwrap(), vec![36, 36], "{strategy:?}");
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            plan(10, 0, PackLast),
            Err(AllocationError::InvalidCapacity(0))
        );
    }

    #[test]
    fn test_empty_total() {
        assert!(plan(0, 36, Average).unwrap().is_empty());
    }

    #[test]
    fn test_sizes_always_sum_to_total() {
        for total in 1..=300 {
            for capacity in [1, 5, 6, 30, 36, 72] {
                for strategy in [PackLast, SeparateRemainder, Average] {
                    let sizes = plan(total, capacity, strategy).unwrap();
                    assert_eq!(sizes.iter().sum::<u32>(), total);
                    assert!(sizes.iter().all(|&s| s > 0));
                }
            }
        }
    }

    #[test]
    fn test_room_plans_are_one_based() {
        let plans = room_plans(&[30, 28]);
        assert_eq!(plans[0].room_number, 1);
        assert_eq!(plans[1].room_number, 2);
        assert_eq!(plans[1].target_size, 28);
    }
}
