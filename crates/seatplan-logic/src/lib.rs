//! Pure seat allocation logic for SeatPlan.
//!
//! This crate contains the whole allocation engine and nothing else: no file
//! formats, no UI, no storage. Functions take plain data plus an injected
//! random source and return results, so every step is unit-testable and a
//! fixed seed reproduces a run exactly.
//!
//! # Pipeline
//!
//! roster → partition by key → [`room_sizer`] → [`quota`] → [`grid`]
//! → [`identity`] → ordered [`model::SeatingArrangement`]s
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Allocation settings, prefix/quota tables, validation |
//! | [`constants`] | Grid width, capacity limits, fallback labels |
//! | [`error`] | `AllocationError` taxonomy |
//! | [`grid`] | Column-major seat charts that avoid same-group neighbours |
//! | [`identity`] | Fixed-width `prefix + room + seat` identifiers |
//! | [`model`] | Member, room plan, placement and arrangement records |
//! | [`orchestrator`] | Top-level entry point across partitions |
//! | [`quota`] | Minimum-per-group distribution of members across rooms |
//! | [`report`] | Injected observability hooks for per-room summaries |
//! | [`room_sizer`] | Room count and target sizes per overflow strategy |
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use seatplan_logic::config::AllocationConfig;
//! use seatplan_logic::model::Member;
//! use seatplan_logic::orchestrator::run;
//! use seatplan_logic::report::NoopReporter;
//!
//! let roster: Vec<Member> = (0..40)
//!     .map(|i| Member::new(format!("Student {i}"), format!("Class {}", i % 4), "Grade 1"))
//!     .collect();
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let rooms = run(&roster, &AllocationConfig::default(), &mut rng, &mut NoopReporter).unwrap();
//! assert_eq!(rooms.iter().map(|r| r.placements.len()).sum::<usize>(), 40);
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod identity;
pub mod model;
pub mod orchestrator;
pub mod quota;
pub mod report;
pub mod room_sizer;

pub use error::{AllocationError, Result};
