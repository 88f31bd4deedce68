//! SeatPlan Headless Allocation Harness
//!
//! Runs the allocation engine on a synthetic school roster (or a JSON roster
//! supplied on the command line) and checks every invariant of the output.
//! Runs entirely in-process: no spreadsheets, no UI, no storage.
//!
//! Usage:
//!   cargo run -p seatplan-simtest
//!   cargo run -p seatplan-simtest -- --verbose --seed 7
//!   cargo run -p seatplan-simtest -- --help
//!   cargo run -p seatplan-simtest -- --roster roster.json --config config.json --dump

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use seatplan_logic::config::{validate_config, AllocationConfig, SizingStrategy};
use seatplan_logic::constants::GRID_WIDTH;
use seatplan_logic::error::AllocationError;
use seatplan_logic::grid::count_adjacent_conflicts;
use seatplan_logic::model::{Member, SeatingArrangement};
use seatplan_logic::orchestrator::run;
use seatplan_logic::report::{CollectingReporter, NoopReporter};
use seatplan_logic::room_sizer;
use serde::de::DeserializeOwned;

// ── Synthetic roster ────────────────────────────────────────────────────

const GIVEN_NAMES: &[&str] = &[
    "Alex", "Jordan", "Morgan", "Casey", "Riley", "Quinn", "Avery", "Taylor", "Skyler", "Kai",
    "Rowan", "Sage", "River", "Eden", "Harper", "Blake", "Logan", "Reese", "Cameron", "Dakota",
    "Emery", "Finley", "Hayden", "Jules", "Kit", "Lark", "Milan", "Nico", "Oakley", "Peyton",
];

const FAMILY_NAMES: &[&str] = &[
    "Chen", "Nakamura", "Petrov", "Santos", "Kim", "Hansen", "Okafor", "Moreau", "Singh",
    "Torres", "Andersen", "Park", "Novak", "Ibrahim", "Costa", "Yamamoto", "Bakker", "Rossi",
    "Fischer", "Dubois", "Nguyen", "Ali", "Jensen", "Ortiz", "Reyes", "Sato",
];

/// (grade, classes, students per class)
const SYNTHETIC_GRADES: &[(&str, usize, usize)] = &[
    ("Grade 1", 4, 31),
    ("Grade 2", 5, 27),
    ("Grade 3", 3, 40),
];

fn synthetic_roster() -> Vec<Member> {
    let mut roster = Vec::new();
    let mut n = 0usize;
    for &(grade, classes, per_class) in SYNTHETIC_GRADES {
        for class in 0..classes {
            for _ in 0..per_class {
                let given = GIVEN_NAMES[n % GIVEN_NAMES.len()];
                let family = FAMILY_NAMES[(n / GIVEN_NAMES.len() + n * 7) % FAMILY_NAMES.len()];
                roster.push(Member::new(
                    format!("{given} {family} {n}"),
                    format!("Class {}", class + 1),
                    grade,
                ));
                n += 1;
            }
        }
    }
    roster
}

fn synthetic_config() -> AllocationConfig {
    let mut config = AllocationConfig {
        capacity: 30,
        strategy: SizingStrategy::PackLast,
        partition_order: vec!["Grade 1".into(), "Grade 2".into(), "Grade 3".into()],
        ..AllocationConfig::default()
    };
    config.quotas.default = 4;
    for (i, &(grade, _, _)) in SYNTHETIC_GRADES.iter().enumerate() {
        config
            .prefixes
            .by_partition
            .insert(grade.to_string(), (i + 1).to_string());
    }
    config
}

// ── Command line ────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "seatplan-simtest")]
#[command(about = "Headless allocation harness: runs a roster and checks every invariant")]
struct Cli {
    /// Print every check and per-room details
    #[arg(long, short)]
    verbose: bool,

    /// Print the resulting arrangements as JSON
    #[arg(long)]
    dump: bool,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Roster file (JSON array of members); defaults to a synthetic school
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Allocation config file (JSON); defaults to the synthetic school config
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("{}: JSON parse error: {}", path.display(), e))
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let options = Cli::parse();

    let inputs = options
        .roster
        .as_deref()
        .map(load_json::<Vec<Member>>)
        .transpose()
        .and_then(|roster| {
            let config = options
                .config
                .as_deref()
                .map(load_json::<AllocationConfig>)
                .transpose()?;
            Ok((roster, config))
        });
    let (roster, config) = match inputs {
        Ok((roster, config)) => (
            roster.unwrap_or_else(synthetic_roster),
            config.unwrap_or_else(synthetic_config),
        ),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    println!("=== SeatPlan Allocation Harness ===\n");
    println!(
        "{} members, capacity {}, {:?}, seed {}\n",
        roster.len(),
        config.capacity,
        config.strategy,
        options.seed
    );

    let mut results = Vec::new();

    // 1. Room sizing reference table
    results.extend(validate_room_sizing(options.verbose));

    // 2. Input validation
    results.extend(validate_error_paths());

    // 3. Full allocation run
    let mut reporter = CollectingReporter::default();
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let arrangements = match run(&roster, &config, &mut rng, &mut reporter) {
        Ok(arrangements) => arrangements,
        Err(e) => {
            results.push(TestResult {
                name: "allocation_run".into(),
                passed: false,
                detail: format!("allocation failed: {}", e),
            });
            Vec::new()
        }
    };

    if !arrangements.is_empty() {
        results.extend(validate_conservation(&roster, &arrangements));
        results.extend(validate_quotas(&roster, &config, &arrangements));
        results.extend(validate_seats(&arrangements, config.grid_width));
        results.extend(validate_identities(&arrangements));
        results.extend(validate_adjacency(&arrangements, config.grid_width, options.verbose));
        results.extend(validate_determinism(&roster, &config, options.seed, &arrangements));

        if options.verbose {
            println!("  Room summaries:");
            for summary in &reporter.rooms {
                println!(
                    "    {:10} room {:2}: {:3}/{:3} seated, {} adjacent pairs, short: {:?}",
                    summary.partition_key,
                    summary.room_number,
                    summary.actual_size,
                    summary.target_size,
                    summary.adjacent_conflicts,
                    summary.quota_shortfalls
                );
            }
        }
    }

    if options.dump {
        match serde_json::to_string_pretty(&arrangements) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: could not serialize arrangements: {}", e),
        }
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Room Sizing ──────────────────────────────────────────────────────

fn validate_room_sizing(verbose: bool) -> Vec<TestResult> {
    println!("--- Room Sizing ---");
    let mut results = Vec::new();

    let cases: &[(u32, u32, SizingStrategy, &[u32])] = &[
        (100, 36, SizingStrategy::PackLast, &[36, 36, 28]),
        (90, 36, SizingStrategy::PackLast, &[36, 54]),
        (90, 36, SizingStrategy::SeparateRemainder, &[36, 36, 18]),
        (90, 36, SizingStrategy::Average, &[45, 45]),
    ];
    for &(total, capacity, strategy, expected) in cases {
        let sizes = room_sizer::plan(total, capacity, strategy);
        results.push(TestResult {
            name: format!("sizing_{:?}_{}_{}", strategy, total, capacity),
            passed: sizes.as_deref() == Ok(expected),
            detail: format!("{:?} → {:?}", strategy, sizes),
        });
    }

    // Every strategy conserves the total
    let mut mismatches = 0;
    for total in 1..=500 {
        for capacity in 1..=72 {
            for strategy in [
                SizingStrategy::PackLast,
                SizingStrategy::SeparateRemainder,
                SizingStrategy::Average,
            ] {
                let sum: u32 = room_sizer::plan(total, capacity, strategy)
                    .map(|s| s.iter().sum())
                    .unwrap_or(0);
                if sum != total {
                    mismatches += 1;
                }
            }
        }
    }
    results.push(TestResult {
        name: "sizing_sums_to_total".into(),
        passed: mismatches == 0,
        detail: format!("{} mismatches over 108,000 plans", mismatches),
    });

    if verbose {
        println!("  Sizes for 150 members:");
        for capacity in [24, 30, 36] {
            for strategy in [
                SizingStrategy::PackLast,
                SizingStrategy::SeparateRemainder,
                SizingStrategy::Average,
            ] {
                println!(
                    "    cap {:2} {:18}: {:?}",
                    capacity,
                    format!("{:?}", strategy),
                    room_sizer::plan(150, capacity, strategy).unwrap_or_default()
                );
            }
        }
    }

    results
}

// ── 2. Error Paths ──────────────────────────────────────────────────────

fn validate_error_paths() -> Vec<TestResult> {
    println!("--- Input Validation ---");
    let mut results = Vec::new();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let sample = vec![Member::new("Ana", "A", "Grade 1")];

    let empty = run(&[], &AllocationConfig::default(), &mut rng, &mut NoopReporter);
    results.push(TestResult {
        name: "error_empty_roster".into(),
        passed: empty == Err(AllocationError::EmptyRoster),
        detail: format!("{:?}", empty.err()),
    });

    let bad_capacity = AllocationConfig {
        capacity: 0,
        ..AllocationConfig::default()
    };
    let errors = validate_config(&bad_capacity);
    results.push(TestResult {
        name: "error_invalid_capacity".into(),
        passed: errors == vec![AllocationError::InvalidCapacity(0)],
        detail: format!("{:?}", errors),
    });

    let mut no_prefix = AllocationConfig::default();
    no_prefix.prefixes.default = None;
    let missing = run(&sample, &no_prefix, &mut rng, &mut NoopReporter);
    results.push(TestResult {
        name: "error_missing_prefix".into(),
        passed: missing == Err(AllocationError::MissingPrefix("Grade 1".into())),
        detail: format!("{:?}", missing.err()),
    });

    results
}

// ── 3. Conservation ─────────────────────────────────────────────────────

fn validate_conservation(roster: &[Member], arrangements: &[SeatingArrangement]) -> Vec<TestResult> {
    println!("--- Conservation ---");
    let mut results = Vec::new();

    let mut expected: HashMap<(&str, &str), usize> = HashMap::new();
    for m in roster {
        *expected.entry((m.partition(), m.name.as_str())).or_insert(0) += 1;
    }
    let mut placed: HashMap<(&str, &str), usize> = HashMap::new();
    for a in arrangements {
        for p in &a.placements {
            *placed
                .entry((a.partition_key.as_str(), p.member.name.as_str()))
                .or_insert(0) += 1;
        }
    }
    let seated: usize = arrangements.iter().map(|a| a.len()).sum();

    results.push(TestResult {
        name: "conservation_total".into(),
        passed: seated == roster.len(),
        detail: format!("{} seated of {}", seated, roster.len()),
    });
    results.push(TestResult {
        name: "conservation_multiset".into(),
        passed: expected == placed,
        detail: format!("{} distinct members per partition", expected.len()),
    });

    results
}

// ── 4. Quotas ───────────────────────────────────────────────────────────

fn validate_quotas(
    roster: &[Member],
    config: &AllocationConfig,
    arrangements: &[SeatingArrangement],
) -> Vec<TestResult> {
    println!("--- Group Quotas ---");
    let mut results = Vec::new();

    let mut totals: HashMap<(&str, &str), usize> = HashMap::new();
    for m in roster {
        *totals.entry((m.partition(), m.group.as_str())).or_insert(0) += 1;
    }

    let mut violations = Vec::new();
    for a in arrangements {
        let quota = config.quotas.min_for(&a.partition_key) as usize;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for p in &a.placements {
            *counts.entry(p.member.group.as_str()).or_insert(0) += 1;
        }
        for (group, count) in counts {
            let total = totals
                .get(&(a.partition_key.as_str(), group))
                .copied()
                .unwrap_or(0);
            if quota > 0 && count < quota && count != total {
                violations.push(format!(
                    "{} room {} {}: {}",
                    a.partition_key, a.room_number, group, count
                ));
            }
        }
    }
    results.push(TestResult {
        name: "quota_every_present_group".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            "every present group meets quota or is whole".into()
        } else {
            violations.join(", ")
        },
    });

    results
}

// ── 5. Seats ────────────────────────────────────────────────────────────

fn validate_seats(arrangements: &[SeatingArrangement], grid_width: u32) -> Vec<TestResult> {
    println!("--- Seat Numbering ---");
    let mut results = Vec::new();

    let mut gaps = Vec::new();
    let mut formula_errors = 0;
    for a in arrangements {
        let mut seats: Vec<u32> = a.placements.iter().map(|p| p.seat_number).collect();
        seats.sort_unstable();
        if seats != (1..=a.len() as u32).collect::<Vec<_>>() {
            gaps.push(format!("{} room {}", a.partition_key, a.room_number));
        }
        let rows = a.placements.iter().map(|p| p.row).max().unwrap_or(0);
        formula_errors += a
            .placements
            .iter()
            .filter(|p| p.seat_number != (p.col - 1) * rows + p.row)
            .count();
    }
    results.push(TestResult {
        name: "seats_contiguous".into(),
        passed: gaps.is_empty(),
        detail: if gaps.is_empty() {
            format!("{} rooms numbered 1..=n", arrangements.len())
        } else {
            format!("gaps in {}", gaps.join(", "))
        },
    });
    results.push(TestResult {
        name: "seats_column_major".into(),
        passed: formula_errors == 0,
        detail: format!("{} placements off (col-1)*rows+row", formula_errors),
    });

    let bad_cols = arrangements
        .iter()
        .flat_map(|a| &a.placements)
        .filter(|p| !(1..=grid_width).contains(&p.col))
        .count();
    results.push(TestResult {
        name: "seats_within_grid_width".into(),
        passed: bad_cols == 0,
        detail: format!("{} placements outside columns 1-{}", bad_cols, grid_width),
    });

    results
}

// ── 6. Identities ───────────────────────────────────────────────────────

fn validate_identities(arrangements: &[SeatingArrangement]) -> Vec<TestResult> {
    println!("--- Identities ---");
    let mut results = Vec::new();

    let mut seen: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut duplicates = 0;
    for a in arrangements {
        let ids = seen.entry(a.partition_key.as_str()).or_default();
        for p in &a.placements {
            if !ids.insert(p.identity.as_str()) {
                duplicates += 1;
            }
        }
    }
    results.push(TestResult {
        name: "identity_unique_per_partition".into(),
        passed: duplicates == 0,
        detail: format!("{} duplicates across {} partitions", duplicates, seen.len()),
    });

    let malformed = arrangements
        .iter()
        .flat_map(|a| &a.placements)
        .filter(|p| !p.identity.ends_with(&format!("{:02}{:02}", p.room_number, p.seat_number)))
        .count();
    results.push(TestResult {
        name: "identity_room_seat_suffix".into(),
        passed: malformed == 0,
        detail: format!("{} identities without room+seat suffix", malformed),
    });

    results
}

// ── 7. Adjacency ────────────────────────────────────────────────────────

fn validate_adjacency(
    arrangements: &[SeatingArrangement],
    grid_width: u32,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Adjacency ---");
    let mut results = Vec::new();

    // Zero conflicts is expected on the standard six-wide chart whenever
    // there are at least two groups and none holds more than its even share
    // (rounded up), full or partial room alike.
    let mut checked = 0;
    let mut offenders = Vec::new();
    for a in arrangements {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for p in &a.placements {
            *counts.entry(p.member.group.as_str()).or_insert(0) += 1;
        }
        let share = a.len().div_ceil(counts.len().max(1));
        let balanced = counts.len() >= 2 && counts.values().all(|&c| c <= share);
        let conflicts = count_adjacent_conflicts(&a.placements);
        if verbose {
            println!(
                "    {:10} room {:2}: {} groups, {} adjacent pairs",
                a.partition_key,
                a.room_number,
                counts.len(),
                conflicts
            );
        }
        if grid_width == GRID_WIDTH && balanced {
            checked += 1;
            if conflicts > 0 {
                offenders.push(format!("{} room {}", a.partition_key, a.room_number));
            }
        }
    }
    results.push(TestResult {
        name: "adjacency_balanced_rooms".into(),
        passed: offenders.is_empty(),
        detail: if offenders.is_empty() {
            format!("{} balanced rooms without adjacent classmates", checked)
        } else {
            format!("conflicts in {}", offenders.join(", "))
        },
    });

    results
}

// ── 8. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(
    roster: &[Member],
    config: &AllocationConfig,
    seed: u64,
    first: &[SeatingArrangement],
) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let second = run(roster, config, &mut rng, &mut NoopReporter);
    vec![TestResult {
        name: "determinism_same_seed".into(),
        passed: second.as_deref() == Ok(first),
        detail: format!("re-run with seed {} matches", seed),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults_and_values() {
        let cli = Cli::parse_from(["seatplan-simtest"]);
        assert_eq!(cli.seed, 42);
        assert!(!cli.verbose && !cli.dump);
        assert!(cli.roster.is_none() && cli.config.is_none());

        let cli = Cli::parse_from([
            "seatplan-simtest",
            "-v",
            "--seed",
            "7",
            "--roster",
            "roster.json",
            "--dump",
        ]);
        assert!(cli.verbose && cli.dump);
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.roster, Some(PathBuf::from("roster.json")));
    }

    #[test]
    fn test_cli_rejects_unknown_flags_and_bad_seeds() {
        assert!(Cli::try_parse_from(["seatplan-simtest", "--fast"]).is_err());
        assert!(Cli::try_parse_from(["seatplan-simtest", "--seed", "abc"]).is_err());
    }
}
