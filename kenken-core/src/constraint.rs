//! Constraint kinds and the possibility-ledger primitives they drive
//! (§4.2, §4.3).

use crate::cell::Cell;
use crate::list::CellList;

/// Sentinel cell value meaning "not yet assigned".
pub const UNASSIGNED: u8 = 0;

/// The six constraint kinds. `Line` covers both row and column constraints;
/// they differ only in which cells they cover, not in behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Line,
    Plus,
    Minus,
    Multiply,
    Divide,
    Single,
}

/// A cage or line constraint: its kind, its mutable target state, and the
/// intrusive list of its currently-unassigned member cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// For `Plus`/`Multiply`, the remaining target (updated incrementally).
    /// For `Minus`/`Divide`/`Single`, the original cage target (constant).
    /// Unused for `Line`.
    pub value: i64,
    member_count: u16,
    pub cells: CellList,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, target: i64, member_count: u16, total_cells: usize) -> Self {
        Self {
            kind,
            value: target,
            member_count,
            cells: CellList::new(total_cells),
        }
    }

    /// Pushes this constraint's initial permitted-value set onto every
    /// member cell. Must run once, with every member still present in
    /// `self.cells` (i.e. before any cell in the cage is assigned).
    pub fn init(&mut self, cells: &mut [Cell], n: u8) {
        let m = self.member_count as i64;
        match self.kind {
            ConstraintKind::Line => {
                notify_changes(cells, &self.cells, 1, n, true);
            }
            ConstraintKind::Plus => {
                let (lo, hi) = plus_range(self.value, m, n);
                notify_changes(cells, &self.cells, lo, hi, true);
            }
            ConstraintKind::Multiply => {
                let (lo, hi) = multiply_range(self.value, m, n);
                let lo = lo.max(1);
                let hi = hi.min(n as i64);
                let mut v = lo;
                while v <= hi {
                    if self.value % v == 0 {
                        notify_change(cells, &self.cells, v as u8, true);
                    }
                    v += 1;
                }
            }
            ConstraintKind::Minus => {
                for v in 1..=n {
                    if minus_permitted(v, self.value, n, None) {
                        notify_change(cells, &self.cells, v, true);
                    }
                }
            }
            ConstraintKind::Divide => {
                for v in 1..=n {
                    if divide_permitted(v, self.value, n, None) {
                        notify_change(cells, &self.cells, v, true);
                    }
                }
            }
            ConstraintKind::Single => {
                notify_change(cells, &self.cells, self.value as u8, true);
            }
        }
    }

    /// Shifts the ledger from "this constraint's assigning cell holds trial
    /// value `old`" to "... holds trial value `new`", where `UNASSIGNED`
    /// means the cell is not (yet, or any longer) holding a value at this
    /// level. The assigning cell itself must already be absent from
    /// `self.cells`; only its remaining, still-unassigned members are
    /// touched.
    pub fn update(&mut self, cells: &mut [Cell], n: u8, old: u8, new: u8) {
        match self.kind {
            ConstraintKind::Line => {
                if old != UNASSIGNED {
                    notify_change(cells, &self.cells, old, true);
                }
                if new != UNASSIGNED {
                    notify_change(cells, &self.cells, new, false);
                }
            }
            ConstraintKind::Plus => {
                let rem = self.cells.len() as i64;
                let old_m = if old == UNASSIGNED { rem + 1 } else { rem };
                let new_m = if new == UNASSIGNED { rem + 1 } else { rem };
                let old_r = self.value;
                let new_r = old_r + trial_delta(old) - trial_delta(new);
                let (old_lo, old_hi) = plus_range(old_r, old_m, n);
                let (new_lo, new_hi) = plus_range(new_r, new_m, n);
                flip_ranges(cells, &self.cells, n, |v| in_range(v, old_lo, old_hi), |v| {
                    in_range(v, new_lo, new_hi)
                });
                self.value = new_r;
            }
            ConstraintKind::Multiply => {
                let rem = self.cells.len() as i64;
                let old_m = if old == UNASSIGNED { rem + 1 } else { rem };
                let new_m = if new == UNASSIGNED { rem + 1 } else { rem };
                let old_r = self.value;
                let old_factor = if old != UNASSIGNED { old as i64 } else { 1 };
                let new_factor = if new != UNASSIGNED { new as i64 } else { 1 };
                let new_r = old_r.saturating_mul(old_factor) / new_factor;
                let (old_lo, old_hi) = multiply_range(old_r, old_m, n);
                let (new_lo, new_hi) = multiply_range(new_r, new_m, n);
                flip_ranges(
                    cells,
                    &self.cells,
                    n,
                    |v| in_range(v, old_lo, old_hi) && old_r % v as i64 == 0,
                    |v| in_range(v, new_lo, new_hi) && new_r % v as i64 == 0,
                );
                self.value = new_r;
            }
            ConstraintKind::Minus => {
                let old_c = if old == UNASSIGNED { None } else { Some(old) };
                let new_c = if new == UNASSIGNED { None } else { Some(new) };
                flip_ranges(
                    cells,
                    &self.cells,
                    n,
                    |v| minus_permitted(v, self.value, n, old_c),
                    |v| minus_permitted(v, self.value, n, new_c),
                );
            }
            ConstraintKind::Divide => {
                let old_c = if old == UNASSIGNED { None } else { Some(old) };
                let new_c = if new == UNASSIGNED { None } else { Some(new) };
                flip_ranges(
                    cells,
                    &self.cells,
                    n,
                    |v| divide_permitted(v, self.value, n, old_c),
                    |v| divide_permitted(v, self.value, n, new_c),
                );
            }
            ConstraintKind::Single => {
                // The single cage's one cell is always the one being
                // assigned; nothing else is ever left in `self.cells`.
            }
        }
    }
}

fn trial_delta(v: u8) -> i64 {
    if v == UNASSIGNED { 0 } else { v as i64 }
}

fn in_range(v: u8, lo: i64, hi: i64) -> bool {
    lo <= v as i64 && v as i64 <= hi
}

/// `max_product(k)` = `N^k`, clamped to `i64::MAX` (the analytic bound for
/// the largest product `k` cells drawn from `1..=N` can reach without
/// actually being that large when `k == 0`, it is `1`).
fn max_product(k: i64, n: u8) -> i64 {
    if k <= 0 {
        return 1;
    }
    let mut acc: i64 = 1;
    for _ in 0..k {
        acc = acc.saturating_mul(n as i64);
    }
    acc
}

fn ceil_div(r: i64, d: i64) -> i64 {
    let q = r / d;
    if r % d != 0 { q + 1 } else { q }
}

/// Permitted-value interval for a `Plus` cage with remaining target `r` and
/// `m` still-unassigned member cells.
fn plus_range(r: i64, m: i64, n: u8) -> (i64, i64) {
    let lo = (r - n as i64 * (m - 1)).max(1);
    let hi = (r - (m - 1)).min(n as i64);
    (lo, hi)
}

/// Candidate interval for a `Multiply` cage with remaining target `r` and
/// `m` still-unassigned member cells. Callers must additionally check
/// `r % v == 0` for membership.
fn multiply_range(r: i64, m: i64, n: u8) -> (i64, i64) {
    if r <= 0 {
        return (1, 0);
    }
    let mp = max_product(m - 1, n);
    let lo = ceil_div(r, mp).max(1);
    let hi = r.min(n as i64);
    (lo, hi)
}

/// `Minus` cage permitted-value predicate. `c` is the other cell's trial
/// value in partial mode, `None` when both cells are still unassigned.
fn minus_permitted(v: u8, target: i64, n: u8, c: Option<u8>) -> bool {
    match c {
        None => {
            let v = v as i64;
            let forbidden_lo = n as i64 - target + 1;
            let forbidden_hi = target;
            !(forbidden_lo <= v && v <= forbidden_hi)
        }
        Some(c) => {
            let v = v as i64;
            let c = c as i64;
            v == c + target || v == c - target
        }
    }
}

/// `Divide` cage permitted-value predicate, analogous to [`minus_permitted`].
fn divide_permitted(v: u8, target: i64, n: u8, c: Option<u8>) -> bool {
    if target <= 0 {
        return false;
    }
    match c {
        None => {
            let v = v as i64;
            let max_k = n as i64 / target;
            (1..=max_k).any(|k| v == k || v == k * target)
        }
        Some(c) => {
            let v = v as i64;
            let c = c as i64;
            v == c * target || (c % target == 0 && c >= target && v == c / target)
        }
    }
}

fn flip_ranges(
    cells: &mut [Cell],
    list: &CellList,
    n: u8,
    old_pred: impl Fn(u8) -> bool,
    new_pred: impl Fn(u8) -> bool,
) {
    for v in 1..=n {
        let was = old_pred(v);
        let now = new_pred(v);
        if was && !now {
            notify_change(cells, list, v, false);
        } else if !was && now {
            notify_change(cells, list, v, true);
        }
    }
}

/// For each cell in `list`, adjusts its `possibles[v]` counter by one in the
/// direction `mark_possible` indicates (§4.3).
pub fn notify_change(cells: &mut [Cell], list: &CellList, v: u8, mark_possible: bool) {
    for i in list.iter() {
        if mark_possible {
            cells[i].mark_possible(v);
        } else {
            cells[i].mark_impossible(v);
        }
    }
}

/// Ranged form of [`notify_change`] over `[lo, hi]` inclusive; a no-op if
/// `hi < lo`.
pub fn notify_changes(cells: &mut [Cell], list: &CellList, lo: i64, hi: i64, mark_possible: bool) {
    if hi < lo {
        return;
    }
    let lo = lo.max(1) as u8;
    let hi = hi as u8;
    for v in lo..=hi {
        notify_change(cells, list, v, mark_possible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells_for(n: usize) -> Vec<Cell> {
        (0..n).map(|_| Cell::new([0, 0, 0])).collect()
    }

    #[test]
    fn line_init_permits_all_values() {
        let mut cells = cells_for(4);
        let mut c = Constraint::new(ConstraintKind::Line, -1, 4, 4);
        for i in 0..4 {
            c.cells.add(i);
        }
        c.init(&mut cells, 4);
        for cell in &cells {
            assert_eq!(cell.num_possibles, 4);
        }
    }

    #[test]
    fn line_assign_then_unassign_is_symmetric() {
        let mut cells = cells_for(3);
        let mut c = Constraint::new(ConstraintKind::Line, -1, 3, 3);
        for i in 0..3 {
            c.cells.add(i);
        }
        c.init(&mut cells, 3);
        let before = cells.clone();

        c.cells.remove(0);
        c.update(&mut cells, 3, UNASSIGNED, 2);
        c.update(&mut cells, 3, 2, UNASSIGNED);
        c.cells.add(0);

        assert_eq!(cells, before);
    }

    #[test]
    fn plus_cage_init_matches_spec_interval() {
        // Two-cell Plus cage, target 5, on a 4x4 grid: m=2, r=5.
        // lo = max(1, 5 - 4*1) = 1, hi = min(4, 5-1) = 4.
        let mut cells = cells_for(2);
        let mut c = Constraint::new(ConstraintKind::Plus, 5, 2, 2);
        c.cells.add(0);
        c.cells.add(1);
        c.init(&mut cells, 4);
        for cell in &cells {
            assert_eq!(cell.num_possibles, 4);
        }
    }

    #[test]
    fn plus_cage_assign_unassign_restores_ledger() {
        // Restoration is checked against the ledger (cell possibles/value),
        // which §4.3's counter encoding makes exactly symmetric; the
        // intrusive list's internal link layout is not claimed to be
        // bit-identical after a prepend-based re-add.
        let mut cells = cells_for(2);
        let mut c = Constraint::new(ConstraintKind::Plus, 5, 2, 2);
        c.cells.add(0);
        c.cells.add(1);
        c.init(&mut cells, 4);
        let before_cells = cells.clone();
        let before_value = c.value;

        c.cells.remove(0);
        c.update(&mut cells, 4, UNASSIGNED, 2);
        c.update(&mut cells, 4, 2, UNASSIGNED);
        c.cells.add(0);

        assert_eq!(cells, before_cells);
        assert_eq!(c.value, before_value);
    }

    #[test]
    fn minus_cage_enters_and_leaves_partial_mode() {
        // Two-cell Minus cage, target 1, N=3: full set = {1,2,3} \ {3-1+1..1} = {1,2,3}\{3}?
        // forbidden = [N-T+1, T] = [3, 1] which is empty since lo>hi, so full permits {1,2,3}.
        let mut cells = cells_for(2);
        let mut c = Constraint::new(ConstraintKind::Minus, 1, 2, 2);
        c.cells.add(0);
        c.cells.add(1);
        c.init(&mut cells, 3);
        assert_eq!(cells[0].num_possibles, 3);
        assert_eq!(cells[1].num_possibles, 3);

        // Assign cell 0 to value 2: cell 1 should become partial {2+1, 2-1} = {3,1}.
        c.cells.remove(0);
        c.update(&mut cells, 3, UNASSIGNED, 2);
        assert!(cells[1].possible_count(1) == 3);
        assert!(cells[1].possible_count(3) == 3);
        assert!(cells[1].possible_count(2) == 0);

        c.update(&mut cells, 3, 2, UNASSIGNED);
        c.cells.add(0);
        assert_eq!(cells[0].num_possibles, 3);
        assert_eq!(cells[1].num_possibles, 3);
    }

    #[test]
    fn divide_cage_partial_mode_values() {
        // Two-cell Divide cage, target 2, N=6: assign cell0=3, partial set for
        // cell1 = {3*2, 3/2 if 2|3} = {6}.
        let mut cells = cells_for(2);
        let mut c = Constraint::new(ConstraintKind::Divide, 2, 2, 2);
        c.cells.add(0);
        c.cells.add(1);
        c.init(&mut cells, 6);

        c.cells.remove(0);
        c.update(&mut cells, 6, UNASSIGNED, 3);
        assert_eq!(cells[1].possible_count(6), 3);
        assert_eq!(cells[1].num_possibles, 1);
    }

    #[test]
    fn single_cage_permits_only_target() {
        let mut cells = cells_for(1);
        let mut c = Constraint::new(ConstraintKind::Single, 4, 1, 1);
        c.cells.add(0);
        c.init(&mut cells, 5);
        assert_eq!(cells[0].num_possibles, 1);
        assert_eq!(cells[0].possible_count(4), 3);
    }
}
