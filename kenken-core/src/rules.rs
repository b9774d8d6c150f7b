#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shape rules `Puzzle::validate` enforces beyond the fixed per-op arity
/// (`Single` is always 1 cell; every cage's cells must be in range and must
/// partition the grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ruleset {
    /// Require `Minus`/`Divide` cages to have exactly two cells.
    pub sub_div_two_cell_only: bool,
}

impl Ruleset {
    pub const fn kenken_default() -> Self {
        Self {
            sub_div_two_cell_only: true,
        }
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::kenken_default()
    }
}
