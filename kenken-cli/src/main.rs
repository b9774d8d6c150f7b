use std::time::Instant;

use kenken_core::CoreError;
use kenken_core::rules::Ruleset;
use kenken_io::IoError;
use kenken_solver::{Solution, SolveError};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kenken_solver=info,kenken_io=info,kenken_cli=info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn usage() -> &'static str {
    "kenken-cli\n\
\n\
USAGE:\n\
  kenken-cli <puzzle-file>          solve serially\n\
  kenken-cli <P> <puzzle-file>      solve with P parallel workers\n\
\n\
Set KENKEN_TIMING=1 to print search statistics after the grid.\n"
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let is_help = args.get(1).is_some_and(|a| a == "--help" || a == "-h");

    let result = match args.len() {
        2 if !is_help => run_serial(&args[1]),
        3 => run_parallel(&args[1], &args[2]),
        _ => {
            println!("{}", usage());
            std::process::exit(0);
        }
    };

    if let Err(message) = result {
        eprintln!("{message}");
        std::process::exit(1);
    }
}

fn run_serial(path: &str) -> Result<(), String> {
    let puzzle = kenken_io::read_puzzle_file(path).map_err(describe_io_error)?;
    let started = Instant::now();
    let (solution, stats) =
        kenken_solver::solve_with_stats(&puzzle, Ruleset::default()).map_err(describe_solve_error)?;
    let solution = solution.ok_or_else(|| "No solution found".to_string())?;

    print_solution(&solution);
    report_timing(started, stats.nodes_visited);
    Ok(())
}

fn run_parallel(workers_arg: &str, path: &str) -> Result<(), String> {
    let Ok(workers) = workers_arg.parse::<usize>() else {
        println!("{}", usage());
        std::process::exit(0);
    };

    let puzzle = kenken_io::read_puzzle_file(path).map_err(describe_io_error)?;
    let started = Instant::now();
    let (solution, stats) = kenken_solver::solve_parallel_with_stats(&puzzle, Ruleset::default(), workers)
        .map_err(describe_solve_error)?;
    let solution = solution.ok_or_else(|| "No solution found".to_string())?;

    print_solution(&solution);
    report_timing(started, stats.nodes_visited);
    Ok(())
}

fn print_solution(solution: &Solution) {
    let n = solution.n as usize;
    for row in 0..n {
        let line = solution.grid[row * n..(row + 1) * n]
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{line}");
    }
}

fn report_timing(started: Instant, nodes_visited: u64) {
    if std::env::var_os("KENKEN_TIMING").is_some() {
        println!("elapsed: {:?}, nodes visited: {nodes_visited}", started.elapsed());
    }
}

fn describe_io_error(err: IoError) -> String {
    match err {
        IoError::MalformedConstraint => "Malformed constraint in input file".to_string(),
        IoError::Read(_) => "Failed to read line from input file".to_string(),
        IoError::Core(ref core) => describe_core_error(core).to_string(),
    }
}

fn describe_solve_error(err: SolveError) -> String {
    match err {
        SolveError::GridSizeTooLarge(_) => "Problem size too large".to_string(),
        SolveError::NoSolution => "No solution found".to_string(),
        SolveError::Core(ref core) => describe_core_error(core).to_string(),
    }
}

fn describe_core_error(err: &CoreError) -> &'static str {
    match err {
        CoreError::InvalidGridSize(_) => "Problem size too large",
        _ => "Malformed constraint in input file",
    }
}
