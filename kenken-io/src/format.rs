//! Line-oriented puzzle file format (§6): an integer N, an integer K, then
//! K cage lines of the form `<op> <target> <row,col> <row,col> ...`.

use std::fs;
use std::path::Path;

use kenken_core::Puzzle;
use kenken_core::puzzle::{Cage, CellId, Coord, Op, cell_id};
use smallvec::{SmallVec, smallvec};

use crate::error::IoError;

/// Parses a complete puzzle file from its text contents.
pub fn parse_puzzle(input: &str) -> Result<Puzzle, IoError> {
    let mut lines = input.lines();

    let n: u8 = lines
        .next()
        .ok_or(IoError::MalformedConstraint)?
        .trim()
        .parse()
        .map_err(|_| IoError::MalformedConstraint)?;

    let k: usize = lines
        .next()
        .ok_or(IoError::MalformedConstraint)?
        .trim()
        .parse()
        .map_err(|_| IoError::MalformedConstraint)?;

    let mut cages = Vec::with_capacity(k);
    for _ in 0..k {
        let line = lines.next().ok_or(IoError::MalformedConstraint)?;
        parse_cage_line(n, line, &mut cages)?;
    }

    Ok(Puzzle { n, cages })
}

/// Reads and parses a puzzle file from disk.
pub fn read_puzzle_file(path: impl AsRef<Path>) -> Result<Puzzle, IoError> {
    let contents = fs::read_to_string(path).map_err(IoError::Read)?;
    parse_puzzle(&contents)
}

/// Parses one `<op> <target> <row,col> ...` line, pushing the resulting
/// cage(s) onto `cages`. A `!` (Single) line listing more than one
/// coordinate expands into one independent one-cell Single cage per
/// coordinate, rather than a single multi-cell Single cage (which
/// `Cage::validate_shape` would reject outright).
fn parse_cage_line(n: u8, line: &str, cages: &mut Vec<Cage>) -> Result<(), IoError> {
    let mut tokens = line
        .split(|c: char| c == ' ' || c == ',' || c == '\t')
        .filter(|t| !t.is_empty());

    let op = match tokens.next().ok_or(IoError::MalformedConstraint)? {
        "+" => Op::Plus,
        "-" => Op::Minus,
        "x" => Op::Multiply,
        "/" => Op::Divide,
        "!" => Op::Single,
        _ => return Err(IoError::MalformedConstraint),
    };

    let target: i64 = tokens
        .next()
        .ok_or(IoError::MalformedConstraint)?
        .parse()
        .map_err(|_| IoError::MalformedConstraint)?;

    let mut cells: SmallVec<[CellId; 6]> = SmallVec::new();
    loop {
        let Some(row_tok) = tokens.next() else { break };
        let col_tok = tokens.next().ok_or(IoError::MalformedConstraint)?;
        let row: u8 = row_tok.parse().map_err(|_| IoError::MalformedConstraint)?;
        let col: u8 = col_tok.parse().map_err(|_| IoError::MalformedConstraint)?;
        let cell = cell_id(n, Coord { row, col }).map_err(|_| IoError::MalformedConstraint)?;
        cells.push(cell);
    }

    if cells.is_empty() {
        return Err(IoError::MalformedConstraint);
    }

    if op == Op::Single && cells.len() > 1 {
        for cell in cells {
            cages.push(Cage {
                cells: smallvec![cell],
                op,
                target,
            });
        }
    } else {
        cages.push(Cage { cells, op, target });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_all_singles_one_line_expands_to_nine_cages() {
        let input = "3\n1\n! 1 0,0 0,1 0,2 1,0 1,1 1,2 2,0 2,1 2,2\n";
        let puzzle = parse_puzzle(input).unwrap();
        assert_eq!(puzzle.n, 3);
        assert_eq!(puzzle.cages.len(), 9);
        assert!(
            puzzle
                .cages
                .iter()
                .all(|c| c.op == Op::Single && c.cells.len() == 1)
        );
    }

    #[test]
    fn s2_no_cages() {
        let puzzle = parse_puzzle("3\n0\n").unwrap();
        assert_eq!(puzzle.n, 3);
        assert!(puzzle.cages.is_empty());
    }

    #[test]
    fn s3_four_operator_kinds() {
        let input = "4\n4\n\
+ 6 0,0 0,1 1,0\n\
- 1 2,3 3,3\n\
x 24 0,2 0,3 1,3\n\
/ 2 1,1 1,2\n";
        let puzzle = parse_puzzle(input).unwrap();
        assert_eq!(puzzle.cages.len(), 4);
        assert_eq!(puzzle.cages[0].op, Op::Plus);
        assert_eq!(puzzle.cages[0].target, 6);
        assert_eq!(puzzle.cages[1].op, Op::Minus);
        assert_eq!(puzzle.cages[2].op, Op::Multiply);
        assert_eq!(puzzle.cages[3].op, Op::Divide);
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = parse_puzzle("2\n1\n? 1 0,0\n");
        assert!(matches!(err, Err(IoError::MalformedConstraint)));
    }

    #[test]
    fn rejects_truncated_coordinate() {
        let err = parse_puzzle("2\n1\n+ 2 0,0 0\n");
        assert!(matches!(err, Err(IoError::MalformedConstraint)));
    }

    #[test]
    fn rejects_missing_cage_lines() {
        let err = parse_puzzle("2\n2\n+ 2 0,0 0,1\n");
        assert!(matches!(err, Err(IoError::MalformedConstraint)));
    }

    #[test]
    fn rejects_out_of_range_coordinate() {
        let err = parse_puzzle("2\n1\n+ 2 0,0 5,5\n");
        assert!(matches!(err, Err(IoError::MalformedConstraint)));
    }
}
