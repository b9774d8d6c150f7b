use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("grid size N={0} exceeds the maximum supported size of 25")]
    GridSizeTooLarge(u8),

    #[error("no solution found")]
    NoSolution,

    #[error(transparent)]
    Core(#[from] kenken_core::CoreError),
}
