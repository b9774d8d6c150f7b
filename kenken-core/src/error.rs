use thiserror::Error;

use crate::puzzle::{CellId, Op};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("grid size N={0} not supported; must be 1..=25")]
    InvalidGridSize(u8),

    #[error("cage has no cells")]
    EmptyCage,

    #[error("cell id {cell} out of range for N={n}")]
    CellOutOfRange { n: u8, cell: CellId },

    #[error("cell id {0} appears in more than one cage")]
    CellDuplicated(CellId),

    #[error("grid cell {0} is not covered by any cage")]
    CellUncovered(CellId),

    #[error("cage operation {op:?} not valid for cage size {len}")]
    InvalidOpForCageSize { op: Op, len: usize },

    #[error("subtraction/division cages must have exactly 2 cells")]
    SubDivMustBeTwoCell,

    #[error("Single cages must have a target in 1..=N")]
    SingleTargetOutOfRange,

    #[error("cage target must be a positive integer")]
    TargetMustBePositive,

    #[error("{count} cages exceeds the {total} cells in the grid")]
    TooManyCages { count: usize, total: usize },
}
