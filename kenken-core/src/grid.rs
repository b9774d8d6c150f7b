//! Bundles the immutable per-puzzle parameters (`Engine`) and the mutable
//! cell/constraint arrays a search mutates in place (`Grid`), replacing the
//! reference implementation's process-scoped `N`/`cells`/`constraints`
//! globals (Design Notes §9).

use crate::cell::Cell;
use crate::constraint::{Constraint, ConstraintKind};
use crate::error::CoreError;
use crate::puzzle::{CellId, Op, Puzzle, coord};
use crate::rules::Ruleset;

/// Immutable parameters shared, read-only, by every worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub n: u8,
    pub total_cells: usize,
}

impl Engine {
    pub fn new(n: u8) -> Self {
        Self {
            n,
            total_cells: (n as usize) * (n as usize),
        }
    }
}

/// The mutable cell/constraint arrays a search descends through. Cheap to
/// clone: every cross-reference is an index, never a pointer, so a clone is
/// a flat memcpy-equivalent of two `Vec`s (Design Notes §9).
#[derive(Debug, Clone)]
pub struct Grid {
    pub cells: Vec<Cell>,
    pub constraints: Vec<Constraint>,
}

impl Grid {
    /// Builds the initial grid for `puzzle`: one row constraint per row,
    /// one column constraint per column, one cage constraint per cage, then
    /// pushes every constraint's initial permitted-value set onto its
    /// members (§4.2/§4.3).
    pub fn build(puzzle: &Puzzle, rules: Ruleset) -> Result<(Engine, Self), CoreError> {
        puzzle.validate(rules)?;

        let n = puzzle.n;
        let engine = Engine::new(n);
        let total = engine.total_cells;

        let row_base = 0usize;
        let col_base = n as usize;
        let cage_base = 2 * n as usize;

        let mut constraints = Vec::with_capacity(cage_base + puzzle.cages.len());
        for _ in 0..n {
            constraints.push(Constraint::new(ConstraintKind::Line, -1, n as u16, total));
        }
        for _ in 0..n {
            constraints.push(Constraint::new(ConstraintKind::Line, -1, n as u16, total));
        }
        for cage in &puzzle.cages {
            let kind = match cage.op {
                Op::Plus => ConstraintKind::Plus,
                Op::Minus => ConstraintKind::Minus,
                Op::Multiply => ConstraintKind::Multiply,
                Op::Divide => ConstraintKind::Divide,
                Op::Single => ConstraintKind::Single,
            };
            constraints.push(Constraint::new(
                kind,
                cage.target,
                cage.cells.len() as u16,
                total,
            ));
        }

        let mut cells: Vec<Cell> = Vec::with_capacity(total);
        for i in 0..total {
            let c = coord(n, CellId(i as u16))?;
            let row_idx = row_base + c.row as usize;
            let col_idx = col_base + c.col as usize;
            let cage_idx = cage_base
                + puzzle
                    .cages
                    .iter()
                    .position(|cage| cage.cells.iter().any(|&cell| cell.0 as usize == i))
                    .expect("puzzle.validate guarantees full cage coverage");
            cells.push(Cell::new([
                row_idx as u32,
                col_idx as u32,
                cage_idx as u32,
            ]));
            constraints[row_idx].cells.add(i);
            constraints[col_idx].cells.add(i);
            constraints[cage_idx].cells.add(i);
        }

        for constraint in &mut constraints {
            constraint.init(&mut cells, n);
        }

        Ok((engine, Grid { cells, constraints }))
    }
}
