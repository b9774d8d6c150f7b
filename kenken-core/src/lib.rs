#![forbid(unsafe_code)]
//! Data model for KenKen puzzles: the external `Puzzle`/`Cage` representation
//! parsed from an input file, and the `Cell`/`Constraint` engine that a
//! solver mutates in place during search.

pub mod cell;
pub mod constraint;
pub mod error;
pub mod grid;
pub mod list;
pub mod puzzle;
pub mod rules;

pub use crate::cell::{Cell, MAX_N};
pub use crate::constraint::{Constraint, ConstraintKind, UNASSIGNED};
pub use crate::error::CoreError;
pub use crate::grid::{Engine, Grid};
pub use crate::list::CellList;
pub use crate::puzzle::{Cage, CellId, Coord, Puzzle, cell_id, coord};
pub use crate::rules::Ruleset;
