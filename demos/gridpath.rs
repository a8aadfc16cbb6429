//! Load a scenario, search it, and print the result.
//!
//! ```text
//! RUST_LOG=debug cargo run -p navgrid-demos --bin gridpath -- demos/scenarios/detour.toml
//! ```

mod scenario;

use std::path::Path;
use std::process::ExitCode;

use navgrid_paths::PathFinder;

use scenario::{Scenario, ScenarioError, render};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(file) = std::env::args().nth(1) else {
        eprintln!("usage: gridpath <scenario.toml>");
        return ExitCode::from(2);
    };

    match run(Path::new(&file)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(file: &Path) -> Result<(), ScenarioError> {
    let scenario = Scenario::load(file)?;
    let prepared = scenario.prepare()?;
    let grid = &prepared.grid;
    log::info!(
        "{}: {}x{} grid, {} walls, {} -> {}",
        file.display(),
        grid.width(),
        grid.height(),
        grid.wall_count(),
        grid.node(prepared.start),
        grid.node(prepared.goal),
    );

    let mut finder = PathFinder::with_limits(scenario.limits());
    for &algorithm in scenario.algorithm.algorithms() {
        let path = finder.find(algorithm, grid, prepared.start, prepared.goal);
        let stats = finder.stats();
        println!("== {algorithm}");
        if path.is_empty() {
            if stats.limit_reached {
                println!("gave up after {} expansions", stats.expanded);
            } else {
                println!("no path");
            }
        } else {
            println!("{}", render(grid, &path));
            let steps: Vec<String> = path.points().map(|p| p.to_string()).collect();
            println!("path: {}", steps.join(" "));
            println!("cost: {}", path.cost());
        }
        println!(
            "expanded: {}, iterations: {}",
            stats.expanded, stats.iterations
        );
    }
    Ok(())
}
