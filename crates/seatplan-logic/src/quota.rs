//! Quota allocation: splits one partition's members across its rooms.
//!
//! Every group present in a room must hold at least `min_per_group` members
//! there, unless the group is too small to ever reach the quota, in which
//! case all of it sits together in one room (seeded into room 1). Three named
//! phases run in order:
//!
//! 1. [`seed_groups`]: each group is spread over as many leading rooms as it
//!    can fill to quota. A room takes its even share, trimmed to its free
//!    space but never below the quota; the trimmed part overflows.
//! 2. [`distribute_overflow`]: the shuffled overflow goes one member at a time
//!    to the room (among those already holding its group) with the largest
//!    free space, fewest members of that group breaking ties.
//! 3. [`rebalance`]: over-target rooms push members forward to the next room,
//!    topping up groups already there first, then moving whole groups, then
//!    opening new blocks of at least `min_per_group`. No move leaves a group
//!    below quota in either room.
//!
//! With quotas disabled (`min_per_group == 0`) the members are shuffled once
//! and cut to the room sizes. Room targets are soft: the allocator never
//! fails and never drops a member, it only does its best on sizes.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Member, RoomPlan};
use crate::room_sizer::even_split;

/// Members grouped by label, in first-appearance order.
type Groups<'a> = Vec<(&'a str, Vec<&'a Member>)>;

/// Result of phase 1.
#[derive(Debug, Default)]
pub struct Seeding<'a> {
    pub rooms: Vec<Vec<&'a Member>>,
    /// Rooms each group was seeded into, in room order.
    pub homes: HashMap<&'a str, Vec<usize>>,
    pub overflow: Vec<&'a Member>,
}

/// A block of one group's members moving to the next room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transfer<'a> {
    group: &'a str,
    count: usize,
}

/// Split `members` into one list per room plan, in plan order.
pub fn allocate<R: Rng + ?Sized>(
    members: &[Member],
    plans: &[RoomPlan],
    min_per_group: u32,
    rng: &mut R,
) -> Vec<Vec<Member>> {
    if plans.is_empty() {
        return Vec::new();
    }
    let targets: Vec<usize> = plans.iter().map(|p| p.target_size as usize).collect();

    let mut rooms = if min_per_group == 0 {
        cut_to_plans(members, &targets, rng)
    } else {
        let quota = min_per_group as usize;
        let groups = group_members(members);
        let totals: HashMap<&str, usize> = groups
            .iter()
            .map(|(label, group)| (*label, group.len()))
            .collect();
        let mut seeding = seed_groups(&groups, &targets, quota);
        distribute_overflow(&mut seeding, &targets, rng);
        rebalance(&mut seeding.rooms, &targets, quota, &totals);
        seeding.rooms
    };

    rooms
        .iter_mut()
        .map(|room| {
            room.shuffle(rng);
            room.iter().map(|&m| m.clone()).collect()
        })
        .collect()
}

/// Group members by label, keeping first-appearance order.
pub fn group_members(members: &[Member]) -> Groups<'_> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Groups<'_> = Vec::new();
    for member in members {
        let slot = *index.entry(member.group.as_str()).or_insert_with(|| {
            groups.push((member.group.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(member);
    }
    groups
}

/// Count members per group label in one room.
pub fn group_counts<'a>(room: &[&'a Member]) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for member in room {
        *counts.entry(member.group.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Phase 1: place each group's quota-satisfying share, largest groups first.
pub fn seed_groups<'a>(groups: &Groups<'a>, targets: &[usize], quota: usize) -> Seeding<'a> {
    let mut ordered: Vec<&(&'a str, Vec<&'a Member>)> = groups.iter().collect();
    ordered.sort_by_key(|(_, group)| Reverse(group.len()));

    let mut seeding = Seeding {
        rooms: vec![Vec::new(); targets.len()],
        ..Seeding::default()
    };

    for entry in ordered {
        let (label, group) = (entry.0, &entry.1);
        let usable = (group.len() / quota.max(1)).min(targets.len());
        if usable == 0 {
            seeding.rooms[0].extend(group.iter().copied());
            seeding.homes.insert(label, vec![0]);
            continue;
        }

        let mut rest = group.as_slice();
        for (room, share) in even_split(group.len() as u32, usable as u32)
            .into_iter()
            .enumerate()
        {
            let (chunk, tail) = rest.split_at(share as usize);
            rest = tail;
            let gap = targets[room].saturating_sub(seeding.rooms[room].len());
            let take = gap.min(chunk.len()).max(quota);
            seeding.rooms[room].extend_from_slice(&chunk[..take]);
            seeding.overflow.extend_from_slice(&chunk[take..]);
        }
        seeding.homes.insert(label, (0..usable).collect());
    }

    seeding
}

/// Phase 2: hand out the shuffled overflow by largest free space.
pub fn distribute_overflow<R: Rng + ?Sized>(
    seeding: &mut Seeding<'_>,
    targets: &[usize],
    rng: &mut R,
) {
    let mut pool = std::mem::take(&mut seeding.overflow);
    pool.shuffle(rng);

    for member in pool {
        let group = member.group.as_str();
        let homes = seeding.homes.get(group).map(Vec::as_slice).unwrap_or(&[]);
        let rooms = &seeding.rooms;
        let best = homes
            .iter()
            .copied()
            .filter(|&r| rooms[r].len() < targets[r])
            .max_by_key(|&r| {
                let same_group = rooms[r].iter().filter(|m| m.group == group).count();
                (targets[r] - rooms[r].len(), Reverse(same_group), Reverse(r))
            });
        // Every home full: the group's last home absorbs it.
        let room = best.or_else(|| homes.last().copied()).unwrap_or(0);
        seeding.rooms[room].push(member);
    }
}

/// Phase 3: push excess forward room by room. Returns how many members moved.
///
/// `totals` holds each group's size across the partition. A room that can
/// not shed its excess without breaking a quota stays over target.
pub fn rebalance(
    rooms: &mut [Vec<&Member>],
    targets: &[usize],
    quota: usize,
    totals: &HashMap<&str, usize>,
) -> usize {
    let mut moved = 0;
    for i in 0..rooms.len().saturating_sub(1) {
        while rooms[i].len() > targets[i] {
            let excess = rooms[i].len() - targets[i];
            let (head, tail) = rooms.split_at_mut(i + 1);
            let (source, dest) = (&mut head[i], &mut tail[0]);
            let Some(step) = plan_transfer(source, dest, excess, quota, totals) else {
                break;
            };
            moved += transfer(source, dest, step);
        }
    }
    moved
}

/// Best move of at most `excess` members from `source` to `dest`.
///
/// Preference: groups already present in `dest`, then whole groups, then a
/// new block; within a tier the largest block wins, then the group seen first.
fn plan_transfer<'a>(
    source: &[&'a Member],
    dest: &[&'a Member],
    excess: usize,
    quota: usize,
    totals: &HashMap<&str, usize>,
) -> Option<Transfer<'a>> {
    let counts = group_counts(source);
    let dest_counts = group_counts(dest);

    let mut seen = HashSet::new();
    let mut best: Option<((u8, usize), Transfer<'a>)> = None;
    for member in source {
        let group = member.group.as_str();
        if !seen.insert(group) {
            continue;
        }
        let here = counts[group];
        let there = dest_counts.get(group).copied().unwrap_or(0);
        let total = totals.get(group).copied().unwrap_or(here + there);
        let Some(count) = largest_block(here, there, total, excess, quota) else {
            continue;
        };
        let tier = if there > 0 {
            2
        } else if count == here {
            1
        } else {
            0
        };
        let key = (tier, count);
        if best.map_or(true, |(best_key, _)| key > best_key) {
            best = Some((key, Transfer { group, count }));
        }
    }
    best.map(|(_, step)| step)
}

/// Largest `k <= excess` of a group's `here` members that may leave for a
/// room holding `there` of them: the source keeps none or at least `quota`,
/// and the destination reaches `quota` (or the whole group, if smaller).
fn largest_block(
    here: usize,
    there: usize,
    total: usize,
    excess: usize,
    quota: usize,
) -> Option<usize> {
    (1..=here.min(excess)).rev().find(|&k| {
        let left = here - k;
        (left == 0 || left >= quota) && there + k >= quota.min(total)
    })
}

/// Move the last `step.count` members of `step.group` from `source` to `dest`.
fn transfer<'a>(
    source: &mut Vec<&'a Member>,
    dest: &mut Vec<&'a Member>,
    step: Transfer<'_>,
) -> usize {
    let mut remaining = step.count;
    let mut idx = source.len();
    while remaining > 0 && idx > 0 {
        idx -= 1;
        if source[idx].group == step.group {
            dest.push(source.remove(idx));
            remaining -= 1;
        }
    }
    step.count - remaining
}

/// Quota-free split: one shuffle, then consecutive slices per room.
fn cut_to_plans<'a, R: Rng + ?Sized>(
    members: &'a [Member],
    targets: &[usize],
    rng: &mut R,
) -> Vec<Vec<&'a Member>> {
    let mut pool: Vec<&Member> = members.iter().collect();
    pool.shuffle(rng);

    let mut rest = pool.as_slice();
    let mut rooms: Vec<Vec<&Member>> = targets
        .iter()
        .map(|&target| {
            let (chunk, tail) = rest.split_at(target.min(rest.len()));
            rest = tail;
            chunk.to_vec()
        })
        .collect();
    if let Some(last) = rooms.last_mut() {
        last.extend_from_slice(rest);
    }
    rooms
}
