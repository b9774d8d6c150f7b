//! Work-stealing parallel search (§4.5, §5).
//!
//! Worker 0 starts with a single empty job (the root, unsplit); every other
//! worker starts empty. Each worker pops or steals a job, replays it onto a
//! fresh clone of the root grid, and then either recursively splits it into
//! further jobs pushed onto its own queue (while the job is still short and
//! the queue has room) or runs the job out to completion with the ordinary
//! serial search.

use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam_queue::ArrayQueue;
use kenken_core::constraint::UNASSIGNED;
use kenken_core::rules::Ruleset;
use kenken_core::{Engine, Grid, Puzzle};
use parking_lot::Mutex;
use tracing::{instrument, trace};

use crate::error::SolveError;
use crate::solver::{self, MrvResult, Solution, SolveStats};

/// A partial assignment reached by branching from the root: cell index and
/// forced value pairs, applied in order.
type Job = Vec<(usize, u8)>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParallelStats {
    pub nodes_visited: u64,
    pub assignments: u64,
    pub max_depth: u32,
    pub backtracked: bool,
    pub jobs_dispatched: usize,
    pub workers: usize,
}

/// Bound on a single job's length (§4.5): long enough to reach a useful
/// branch count, short enough that replaying a job is cheap next to the
/// search it unlocks.
fn max_job_length(n: u8) -> usize {
    5 * n as usize
}

/// Per-worker queue capacity. §4.5 gives a fixed example ("e.g., 20"), but
/// `should_split` only splits while at least `N` slots are free, so a flat
/// 20-slot queue would never split boards with `N > 20`; this scales with
/// `N` instead so splitting stays available across the whole supported size
/// range while keeping the teacher-sized small-board case close to 20.
fn queue_capacity(n: u8) -> usize {
    (4 * n as usize).max(20)
}

/// Solves `puzzle` using `workers` cooperating threads, returning the first
/// solution any of them finds.
#[instrument(skip(puzzle, rules), fields(n = puzzle.n, workers))]
pub fn solve_parallel(
    puzzle: &Puzzle,
    rules: Ruleset,
    workers: usize,
) -> Result<Option<Solution>, SolveError> {
    let mut stats = ParallelStats::default();
    solve_parallel_inner(puzzle, rules, workers, &mut stats)
}

/// As [`solve_parallel`], additionally returning aggregated search
/// statistics across all workers.
#[instrument(skip(puzzle, rules), fields(n = puzzle.n, workers))]
pub fn solve_parallel_with_stats(
    puzzle: &Puzzle,
    rules: Ruleset,
    workers: usize,
) -> Result<(Option<Solution>, ParallelStats), SolveError> {
    let mut stats = ParallelStats::default();
    let solution = solve_parallel_inner(puzzle, rules, workers, &mut stats)?;
    Ok((solution, stats))
}

fn solve_parallel_inner(
    puzzle: &Puzzle,
    rules: Ruleset,
    workers: usize,
    stats: &mut ParallelStats,
) -> Result<Option<Solution>, SolveError> {
    let workers = workers.max(1);
    let (engine, root) = Grid::build(puzzle, rules)?;
    stats.workers = workers;

    let cap = queue_capacity(engine.n);
    let queues: Vec<ArrayQueue<Job>> = (0..workers).map(|_| ArrayQueue::new(cap)).collect();
    let jobs_dispatched = AtomicUsize::new(1);
    queues[0]
        .push(Job::new())
        .expect("a freshly built queue has room for the seed job");

    let found = AtomicBool::new(false);
    let idle = AtomicUsize::new(0);
    let solution: Mutex<Option<Solution>> = Mutex::new(None);
    let worker_stats: Vec<StdMutex<SolveStats>> =
        (0..workers).map(|_| StdMutex::new(SolveStats::default())).collect();

    std::thread::scope(|scope| {
        for worker_id in 0..workers {
            let engine = &engine;
            let root = &root;
            let queues = &queues;
            let found = &found;
            let idle = &idle;
            let solution = &solution;
            let jobs_dispatched = &jobs_dispatched;
            let worker_stats = &worker_stats;
            scope.spawn(move || {
                worker_loop(
                    worker_id,
                    engine,
                    root,
                    queues,
                    found,
                    idle,
                    solution,
                    jobs_dispatched,
                    &worker_stats[worker_id],
                );
            });
        }
    });

    stats.jobs_dispatched = jobs_dispatched.load(Ordering::Relaxed);
    for ws in &worker_stats {
        let ws = ws.lock().unwrap_or_else(|e| e.into_inner());
        stats.nodes_visited += ws.nodes_visited;
        stats.assignments += ws.assignments;
        stats.max_depth = stats.max_depth.max(ws.max_depth);
        stats.backtracked |= ws.backtracked;
    }

    Ok(solution.into_inner())
}

fn worker_loop(
    worker_id: usize,
    engine: &Engine,
    root: &Grid,
    queues: &[ArrayQueue<Job>],
    found: &AtomicBool,
    idle: &AtomicUsize,
    solution: &Mutex<Option<Solution>>,
    jobs_dispatched: &AtomicUsize,
    stats: &StdMutex<SolveStats>,
) {
    let workers = queues.len();
    loop {
        if found.load(Ordering::Acquire) {
            return;
        }

        let job = queues[worker_id].pop().or_else(|| steal(queues, worker_id));
        let Some(job) = job else {
            let previously_idle = idle.fetch_add(1, Ordering::AcqRel);
            if previously_idle + 1 == workers {
                // Every worker is idle with every queue empty: no more work.
                found.store(true, Ordering::Release);
                return;
            }
            std::thread::yield_now();
            if found.load(Ordering::Acquire) {
                return;
            }
            idle.fetch_sub(1, Ordering::AcqRel);
            continue;
        };

        trace!(worker_id, job_len = job.len(), "replaying job");
        let mut grid = root.clone();
        let mut path = job;
        for &(cell, value) in &path {
            solver::apply_forced(&mut grid, engine.n, cell, value);
        }

        let mut local = SolveStats::default();
        let own_queue = &queues[worker_id];
        let won = if should_split(own_queue, path.len(), engine.n) {
            split_into_queue(engine, &mut grid, &mut path, own_queue, found, &mut local, jobs_dispatched)
        } else {
            search(engine, &mut grid, path.len() as u32, &mut local, found)
                .then(|| extract_solution(engine, &grid))
        };

        if let Some(extracted) = won {
            *solution.lock() = Some(extracted);
            found.store(true, Ordering::Release);
        }

        let mut ws = stats.lock().unwrap_or_else(|e| e.into_inner());
        ws.nodes_visited += local.nodes_visited;
        ws.assignments += local.assignments;
        ws.max_depth = ws.max_depth.max(local.max_depth);
        ws.backtracked |= local.backtracked;
    }
}

fn extract_solution(engine: &Engine, grid: &Grid) -> Solution {
    Solution {
        n: engine.n,
        grid: grid.cells.iter().map(|c| c.value).collect(),
    }
}

fn steal(queues: &[ArrayQueue<Job>], me: usize) -> Option<Job> {
    let workers = queues.len();
    for offset in 1..workers {
        let victim = (me + offset) % workers;
        if let Some(job) = queues[victim].pop() {
            return Some(job);
        }
    }
    None
}

/// §4.5 step 3's split trigger: the job is still short of `MAX_JOB_LENGTH`
/// and the worker's own queue has at least `N` free slots to push into.
fn should_split(queue: &ArrayQueue<Job>, job_len: usize, n: u8) -> bool {
    job_len < max_job_length(n) && queue.capacity() - queue.len() >= n as usize
}

/// Same search as [`solver::backtrack`], but checks `found` so a worker can
/// stop promptly once another has already succeeded.
fn search(engine: &Engine, grid: &mut Grid, depth: u32, stats: &mut SolveStats, found: &AtomicBool) -> bool {
    if found.load(Ordering::Relaxed) {
        return false;
    }
    stats.nodes_visited += 1;
    if depth > stats.max_depth {
        stats.max_depth = depth;
    }

    let (i, count) = match solver::mrv_select(grid) {
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
        if found.load(Ordering::Relaxed) {
            break;
        }
        if grid.cells[i].possible_count(v) == 3 {
            for &c in &cidx {
                grid.constraints[c as usize].update(&mut grid.cells, n, old, v);
            }
            grid.cells[i].value = v;
            stats.assignments += 1;

            solved = search(engine, grid, depth + 1, stats, found);
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

/// §4.5 step 3's `split_into_queue`: picks the next MRV cell and, for each of
/// its permitted values, either recurses (the subjob is still short and the
/// queue still has room) or pushes the probed branch as a leaf job. Each
/// candidate is probed with [`solver::apply_forced`] and reverted with
/// [`solver::unapply_forced`] once its branch is disposed of — unless that
/// branch completed the grid outright, in which case the completed state is
/// left in place and bubbled straight back up to the caller (mirroring
/// `backtrack`'s "no restore on success").
fn split_into_queue(
    engine: &Engine,
    grid: &mut Grid,
    path: &mut Job,
    queue: &ArrayQueue<Job>,
    found: &AtomicBool,
    stats: &mut SolveStats,
    jobs_dispatched: &AtomicUsize,
) -> Option<Solution> {
    if found.load(Ordering::Relaxed) {
        return None;
    }
    stats.nodes_visited += 1;

    let (i, count) = match solver::mrv_select(grid) {
        MrvResult::Complete => return Some(extract_solution(engine, grid)),
        MrvResult::Dead => return None,
        MrvResult::Cell(i, count) => (i, count),
    };
    if count > 1 {
        stats.backtracked = true;
    }

    let n = engine.n;
    let mut v = n;
    while v >= 1 {
        if grid.cells[i].possible_count(v) == 3 {
            solver::apply_forced(grid, n, i, v);
            path.push((i, v));
            stats.assignments += 1;

            let can_descend = path.len() < max_job_length(n) && queue.len() < queue.capacity();
            let won = if can_descend {
                split_into_queue(engine, grid, path, queue, found, stats, jobs_dispatched)
            } else {
                match queue.push(path.clone()) {
                    Ok(()) => {
                        jobs_dispatched.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                    Err(_) => {
                        // Queue genuinely full: finish this branch inline
                        // rather than dropping the work it represents.
                        search(engine, grid, path.len() as u32, stats, found)
                            .then(|| extract_solution(engine, grid))
                    }
                }
            };

            if won.is_some() {
                return won;
            }
            path.pop();
            solver::unapply_forced(grid, n, i, v);
        }
        v -= 1;
    }

    None
}
