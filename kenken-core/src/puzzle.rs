use smallvec::SmallVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::rules::Ruleset;

/// Maximum supported grid size (`MAX_PROBLEM_SIZE` in the original engine).
pub const MAX_PROBLEM_SIZE: u8 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u16);

impl core::fmt::Display for CellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

/// A cage's arithmetic operator. `Single` cages are always one cell;
/// `Minus`/`Divide` cages are always exactly two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Op {
    Plus,
    Minus,
    Multiply,
    Divide,
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cage {
    pub cells: SmallVec<[CellId; 6]>,
    pub op: Op,
    pub target: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub n: u8,
    pub cages: Vec<Cage>,
}

impl Puzzle {
    pub fn validate(&self, rules: Ruleset) -> Result<(), CoreError> {
        let n = self.n;
        if !(1..=MAX_PROBLEM_SIZE).contains(&n) {
            return Err(CoreError::InvalidGridSize(n));
        }

        let a = (n as usize) * (n as usize);
        if self.cages.len() > a {
            return Err(CoreError::TooManyCages {
                count: self.cages.len(),
                total: a,
            });
        }

        let mut seen = vec![false; a];
        for cage in &self.cages {
            cage.validate_shape(n, rules)?;
            for &cell in &cage.cells {
                let idx = cell_index(n, cell)?;
                if seen[idx] {
                    return Err(CoreError::CellDuplicated(cell));
                }
                seen[idx] = true;
            }
        }

        for (idx, covered) in seen.into_iter().enumerate() {
            if !covered {
                return Err(CoreError::CellUncovered(CellId(idx as u16)));
            }
        }

        Ok(())
    }
}

impl Cage {
    pub fn validate_shape(&self, n: u8, rules: Ruleset) -> Result<(), CoreError> {
        if self.cells.is_empty() {
            return Err(CoreError::EmptyCage);
        }

        match (self.op, self.cells.len()) {
            (Op::Single, 1) => {}
            (Op::Single, len) => {
                return Err(CoreError::InvalidOpForCageSize { op: self.op, len });
            }
            (Op::Minus | Op::Divide, len) if rules.sub_div_two_cell_only && len != 2 => {
                return Err(CoreError::SubDivMustBeTwoCell);
            }
            (_, _) => {}
        }

        if self.target <= 0 {
            return Err(CoreError::TargetMustBePositive);
        }
        if self.op == Op::Single && !(1..=(n as i64)).contains(&self.target) {
            return Err(CoreError::SingleTargetOutOfRange);
        }

        for &cell in &self.cells {
            cell_index(n, cell)?;
        }

        Ok(())
    }
}

pub fn cell_id(n: u8, coord: Coord) -> Result<CellId, CoreError> {
    if coord.row >= n || coord.col >= n {
        return Err(CoreError::CellOutOfRange {
            n,
            cell: CellId((coord.row as u16) * (n as u16) + coord.col as u16),
        });
    }
    Ok(CellId((coord.row as u16) * (n as u16) + coord.col as u16))
}

pub fn coord(n: u8, cell: CellId) -> Result<Coord, CoreError> {
    let idx = cell_index(n, cell)?;
    Ok(Coord {
        row: (idx / (n as usize)) as u8,
        col: (idx % (n as usize)) as u8,
    })
}

fn cell_index(n: u8, cell: CellId) -> Result<usize, CoreError> {
    let a = (n as usize) * (n as usize);
    let idx = cell.0 as usize;
    if idx >= a {
        return Err(CoreError::CellOutOfRange { n, cell });
    }
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(n: u8, row: u8, col: u8, target: i64) -> Cage {
        Cage {
            cells: SmallVec::from_slice(&[CellId((row as u16) * (n as u16) + col as u16)]),
            op: Op::Single,
            target,
        }
    }

    #[test]
    fn validate_rejects_uncovered_cell() {
        let n = 2;
        let p = Puzzle {
            n,
            cages: vec![single(n, 0, 0, 1), single(n, 0, 1, 2), single(n, 1, 0, 2)],
        };
        assert!(matches!(
            p.validate(Ruleset::default()),
            Err(CoreError::CellUncovered(_))
        ));
    }

    #[test]
    fn validate_rejects_duplicate_cell() {
        let n = 2;
        let p = Puzzle {
            n,
            cages: vec![
                single(n, 0, 0, 1),
                single(n, 0, 0, 1),
                single(n, 0, 1, 2),
                single(n, 1, 0, 2),
                single(n, 1, 1, 1),
            ],
        };
        assert!(matches!(
            p.validate(Ruleset::default()),
            Err(CoreError::CellDuplicated(_))
        ));
    }

    #[test]
    fn validate_rejects_oversize_grid() {
        let p = Puzzle { n: 26, cages: vec![] };
        assert!(matches!(
            p.validate(Ruleset::default()),
            Err(CoreError::InvalidGridSize(26))
        ));
    }

    #[test]
    fn validate_rejects_minus_cage_with_wrong_arity() {
        let n = 3;
        let cage = Cage {
            cells: SmallVec::from_slice(&[CellId(0), CellId(1), CellId(2)]),
            op: Op::Minus,
            target: 1,
        };
        let p = Puzzle { n, cages: vec![cage] };
        assert!(matches!(
            p.validate(Ruleset::default()),
            Err(CoreError::SubDivMustBeTwoCell)
        ));
    }

    #[test]
    fn cell_id_and_coord_roundtrip() {
        let n = 5;
        for row in 0..n {
            for col in 0..n {
                let c = Coord { row, col };
                let id = cell_id(n, c).unwrap();
                assert_eq!(coord(n, id).unwrap(), c);
            }
        }
    }
}
