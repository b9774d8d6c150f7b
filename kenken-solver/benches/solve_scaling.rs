//! Solve-time scaling across grid sizes, serial vs. a fixed worker count.

use criterion::{Criterion, criterion_group, criterion_main};
use kenken_core::Puzzle;
use kenken_core::puzzle::{Cage, CellId, Op};
use kenken_core::rules::Ruleset;
use kenken_solver::{solve, solve_parallel};

/// A trivially-solvable puzzle: one row-spanning `Plus` cage per row,
/// targeting the row sum a Latin square already forces. Covers every cell
/// (required by `Puzzle::validate`) without narrowing the search below
/// what the row/column `Line` constraints already do.
fn create_trivial_puzzle(n: u8) -> Puzzle {
    let target = (n as i64) * (n as i64 + 1) / 2;
    let cages = (0..n)
        .map(|row| Cage {
            cells: (0..n).map(|col| CellId((row as u16) * (n as u16) + col as u16)).collect(),
            op: Op::Plus,
            target,
        })
        .collect();
    Puzzle { n, cages }
}

fn bench_serial(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_serial");
    for n in [2u8, 3, 4, 5, 6, 8] {
        let puzzle = std::hint::black_box(create_trivial_puzzle(n));
        let rules = std::hint::black_box(Ruleset::default());
        group.bench_function(format!("{n}x{n}"), |b| {
            b.iter(|| solve(&puzzle, rules))
        });
    }
    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_parallel_4_workers");
    for n in [4u8, 6, 8, 12] {
        let puzzle = std::hint::black_box(create_trivial_puzzle(n));
        let rules = std::hint::black_box(Ruleset::default());
        group.bench_function(format!("{n}x{n}"), |b| {
            b.iter(|| solve_parallel(&puzzle, rules, 4))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_serial, bench_parallel);
criterion_main!(benches);
