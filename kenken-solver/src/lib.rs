#![forbid(unsafe_code)]
//! Backtracking search over a `kenken-core` grid: a serial MRV solver and a
//! work-stealing parallel driver built on top of it.

pub mod error;
pub mod parallel;
pub mod solver;

pub use crate::error::SolveError;
pub use crate::parallel::{ParallelStats, solve_parallel, solve_parallel_with_stats};
pub use crate::solver::{Solution, SolveStats, solve, solve_with_stats};
pub use kenken_core::Puzzle;
pub use kenken_core::rules::Ruleset;
