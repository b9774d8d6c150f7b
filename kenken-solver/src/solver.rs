//! MRV backtracking search over a [`kenken_core::Grid`] (§4.4).

use kenken_core::constraint::UNASSIGNED;
use kenken_core::rules::Ruleset;
use kenken_core::{Engine, Grid, Puzzle};
use tracing::instrument;

use crate::error::SolveError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub n: u8,
    pub grid: Vec<u8>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SolveStats {
    pub nodes_visited: u64,
    pub assignments: u64,
    pub max_depth: u32,
    /// Set once any cell in the search had more than one candidate value,
    /// i.e. the search branched rather than being forced throughout.
    pub backtracked: bool,
}

/// Solves `puzzle`, returning the first solution found, if any.
#[instrument(skip(puzzle, rules), fields(n = puzzle.n, cages = puzzle.cages.len()))]
pub fn solve(puzzle: &Puzzle, rules: Ruleset) -> Result<Option<Solution>, SolveError> {
    let mut stats = SolveStats::default();
    solve_inner(puzzle, rules, &mut stats)
}

/// Solves `puzzle` and also returns search statistics.
#[instrument(skip(puzzle, rules), fields(n = puzzle.n, cages = puzzle.cages.len()))]
pub fn solve_with_stats(
    puzzle: &Puzzle,
    rules: Ruleset,
) -> Result<(Option<Solution>, SolveStats), SolveError> {
    let mut stats = SolveStats::default();
    let solution = solve_inner(puzzle, rules, &mut stats)?;
    Ok((solution, stats))
}

fn solve_inner(
    puzzle: &Puzzle,
    rules: Ruleset,
    stats: &mut SolveStats,
) -> Result<Option<Solution>, SolveError> {
    let (engine, mut grid) = Grid::build(puzzle, rules)?;
    let solved = backtrack(&engine, &mut grid, 0, stats);
    Ok(solved.then(|| extract_solution(&engine, &grid)))
}

fn extract_solution(engine: &Engine, grid: &Grid) -> Solution {
    Solution {
        n: engine.n,
        grid: grid.cells.iter().map(|c| c.value).collect(),
    }
}

pub(crate) enum MrvResult {
    Cell(usize, u16),
    Complete,
    Dead,
}

/// Scans all cells; any unassigned cell with zero possibles makes the node
/// dead. Otherwise returns the unassigned cell with minimum `num_possibles`,
/// ties broken by lowest index (§4.4).
pub(crate) fn mrv_select(grid: &Grid) -> MrvResult {
    let mut best: Option<(usize, u16)> = None;
    for (i, cell) in grid.cells.iter().enumerate() {
        if cell.is_assigned() {
            continue;
        }
        if cell.num_possibles == 0 {
            return MrvResult::Dead;
        }
        let improves = match best {
            Some((_, count)) => cell.num_possibles < count,
            None => true,
        };
        if improves {
            best = Some((i, cell.num_possibles));
        }
    }
    match best {
        Some((i, count)) => MrvResult::Cell(i, count),
        None => MrvResult::Complete,
    }
}

fn backtrack(engine: &Engine, grid: &mut Grid, depth: u32, stats: &mut SolveStats) -> bool {
    stats.nodes_visited += 1;
    if depth > stats.max_depth {
        stats.max_depth = depth;
    }

    let (i, count) = match mrv_select(grid) {
        MrvResult::Complete => return true,
        MrvResult::Dead => return false,
        MrvResult::Cell(i, count) => (i, count),
    };
    if count > 1 {
        stats.backtracked = true;
    }

    let n = engine.n;
    let cidx = grid.cells[i].constraint_indexes;
    for &c in &cidx {
        grid.constraints[c as usize].cells.remove(i);
    }

    let mut old = UNASSIGNED;
    let mut solved = false;
    let mut v = n;
    while v >= 1 {
        if grid.cells[i].possible_count(v) == 3 {
            for &c in &cidx {
                grid.constraints[c as usize].update(&mut grid.cells, n, old, v);
            }
            grid.cells[i].value = v;
            stats.assignments += 1;

            solved = backtrack(engine, grid, depth + 1, stats);
            old = v;
            if solved {
                break;
            }
        }
        v -= 1;
    }

    if !solved {
        for &c in &cidx {
            grid.constraints[c as usize].update(&mut grid.cells, n, old, UNASSIGNED);
        }
        grid.cells[i].value = UNASSIGNED;
        for &c in &cidx {
            grid.constraints[c as usize].cells.add(i);
        }
    }

    solved
}

/// Forces `cell` to `value` without MRV selection — used by the parallel
/// driver to replay a job's partial assignment.
pub fn apply_forced(grid: &mut Grid, n: u8, cell: usize, value: u8) {
    let cidx = grid.cells[cell].constraint_indexes;
    for &c in &cidx {
        grid.constraints[c as usize].cells.remove(cell);
    }
    for &c in &cidx {
        grid.constraints[c as usize].update(&mut grid.cells, n, UNASSIGNED, value);
    }
    grid.cells[cell].value = value;
}

/// The exact inverse of [`apply_forced`].
pub fn unapply_forced(grid: &mut Grid, n: u8, cell: usize, value: u8) {
    let cidx = grid.cells[cell].constraint_indexes;
    for &c in &cidx {
        grid.constraints[c as usize].update(&mut grid.cells, n, value, UNASSIGNED);
    }
    grid.cells[cell].value = UNASSIGNED;
    for &c in &cidx {
        grid.constraints[c as usize].cells.add(cell);
    }
}
