//! Seat grids: lays one room's members onto a fixed-width chart.
//!
//! The chart has `grid_width` columns and `ceil(n / grid_width)` rows. Seats
//! are numbered down each column (`seat = col * rows + row + 1`, 0-based
//! row/col), and only the first `n` seats in that order exist, so a
//! partially filled room still gets seats `1..=n` with no gaps.
//!
//! Cells are filled row by row. For each cell the groups of the occupied
//! up/down/left/right neighbours are blocked, and the pick is:
//! 1. among unblocked members, the one from the group with the most members
//!    still waiting; ties go to the group sitting diagonally up-right, then
//!    to the earliest pool position;
//! 2. if every waiting member is blocked, a uniformly random one.
//!
//! Step 1 takes the largest unblocked group rather than the first unblocked
//! member: a first-fit pick leaves the biggest group for the last rows, where
//! it can only sit next to itself.
//!
//! A pass that still seats classmates side by side is retried once per group
//! with that group forced into the first cell, and the layout with the fewest
//! adjacent pairs is kept. The opening cell fixes which checkerboard colour
//! the largest group lands on, which matters when a partial chart has one
//! more cell of one colour than the other.
//!
//! The heuristic only affects adjacency quality; every member is always seated.
//! Each cell scans the whole pool, so one pass costs `seats * pool` and a room
//! costs at most one pass per group more.

use std::collections::HashMap;

use rand::Rng;

use crate::config::PrefixTable;
use crate::error::{AllocationError, Result};
use crate::identity::compose_for;
use crate::model::{Member, Placement};

/// Rows needed to seat `count` members `width` to a row.
pub fn grid_rows(count: usize, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    count.div_ceil(width)
}

/// Seat `members` in room `room_number` and return placements in
/// seating-chart order (column 1 top to bottom, then column 2, ...).
pub fn assign<R: Rng + ?Sized>(
    members: &[Member],
    room_number: u32,
    prefixes: &PrefixTable,
    grid_width: u32,
    rng: &mut R,
) -> Result<Vec<Placement>> {
    if grid_width == 0 {
        return Err(AllocationError::InvalidGridWidth(grid_width));
    }
    let width = grid_width as usize;
    let rows = grid_rows(members.len(), width);

    let mut layout = fill(members, rows, width, None, rng);
    for opening in opening_groups(members) {
        if layout.conflicts == 0 {
            break;
        }
        let retry = fill(members, rows, width, Some(opening), rng);
        if retry.conflicts < layout.conflicts {
            layout = retry;
        }
    }

    let mut seated = layout.cells;
    seated.sort_by_key(|&(row, col, _)| (col, row));
    seated
        .into_iter()
        .map(|(row, col, member)| {
            let seat_number = (col * rows + row + 1) as u32;
            Ok(Placement {
                identity: compose_for(prefixes, member.partition(), room_number, seat_number)?,
                member: member.clone(),
                room_number,
                seat_number,
                row: row as u32 + 1,
                col: col as u32 + 1,
            })
        })
        .collect()
}

/// One greedy pass: seated cells as `(row, col, member)` and the adjacent
/// same-group pairs it left behind.
struct Layout<'a> {
    cells: Vec<(usize, usize, &'a Member)>,
    conflicts: usize,
}

fn fill<'a, R: Rng + ?Sized>(
    members: &'a [Member],
    rows: usize,
    width: usize,
    opening: Option<&str>,
    rng: &mut R,
) -> Layout<'a> {
    let count = members.len();
    let mut labels: Vec<Option<&'a str>> = vec![None; rows * width];
    let mut pool: Vec<&'a Member> = members.iter().collect();
    let mut waiting: HashMap<&'a str, usize> = HashMap::new();
    for member in members {
        *waiting.entry(member.group.as_str()).or_insert(0) += 1;
    }

    let mut cells = Vec::with_capacity(count);
    let mut conflicts = 0;
    for row in 0..rows {
        for col in 0..width {
            if col * rows + row >= count {
                continue;
            }
            let blocked = neighbour_groups(&labels, rows, width, row, col);
            let diagonal = if row > 0 && col + 1 < width {
                labels[(row - 1) * width + col + 1]
            } else {
                None
            };
            let preferred = if cells.is_empty() { opening } else { None };
            let pick = pick_member(&pool, &waiting, &blocked, diagonal, preferred)
                .unwrap_or_else(|| rng.gen_range(0..pool.len()));

            let member = pool.remove(pick);
            let group = member.group.as_str();
            if blocked.contains(&group) {
                // Only the upper and left neighbours are filled yet.
                let up = row > 0 && labels[(row - 1) * width + col] == Some(group);
                let left = col > 0 && labels[row * width + col - 1] == Some(group);
                conflicts += usize::from(up) + usize::from(left);
            }
            if let Some(n) = waiting.get_mut(group) {
                *n -= 1;
            }
            labels[row * width + col] = Some(group);
            cells.push((row, col, member));
        }
    }

    Layout { cells, conflicts }
}

/// Distinct group labels in first-appearance order.
fn opening_groups(members: &[Member]) -> Vec<&str> {
    let mut groups: Vec<&str> = Vec::new();
    for member in members {
        if !groups.contains(&member.group.as_str()) {
            groups.push(member.group.as_str());
        }
    }
    groups
}

/// Groups of the occupied 4-neighbourhood of a cell.
fn neighbour_groups<'a>(
    labels: &[Option<&'a str>],
    rows: usize,
    width: usize,
    row: usize,
    col: usize,
) -> Vec<&'a str> {
    let mut groups = Vec::with_capacity(4);
    let mut visit = |r: usize, c: usize| {
        if let Some(group) = labels[r * width + c] {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    };
    if row > 0 {
        visit(row - 1, col);
    }
    if row + 1 < rows {
        visit(row + 1, col);
    }
    if col > 0 {
        visit(row, col - 1);
    }
    if col + 1 < width {
        visit(row, col + 1);
    }
    groups
}

/// Pool index of the best unblocked member, or `None` if all are blocked.
/// A `preferred` group outranks every other key.
fn pick_member(
    pool: &[&Member],
    waiting: &HashMap<&str, usize>,
    blocked: &[&str],
    diagonal: Option<&str>,
    preferred: Option<&str>,
) -> Option<usize> {
    let mut best: Option<(usize, (bool, usize, bool))> = None;
    for (idx, member) in pool.iter().enumerate() {
        let group = member.group.as_str();
        if blocked.contains(&group) {
            continue;
        }
        let key = (
            preferred == Some(group),
            waiting.get(group).copied().unwrap_or(0),
            diagonal == Some(group),
        );
        if best.map_or(true, |(_, best_key)| key > best_key) {
            best = Some((idx, key));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Horizontally or vertically adjacent pairs sharing a group, within one room.
pub fn count_adjacent_conflicts(placements: &[Placement]) -> usize {
    let cells: HashMap<(u32, u32), &str> = placements
        .iter()
        .map(|p| ((p.row, p.col), p.member.group.as_str()))
        .collect();
    cells
        .iter()
        .map(|(&(row, col), group)| {
            [(row + 1, col), (row, col + 1)]
                .into_iter()
                .filter(|cell| cells.get(cell) == Some(group))
                .count()
        })
        .sum()
}
