#![allow(non_snake_case)]
use RustedODE::Utils::logger::{
    init_logger, level_filter, save_comparison_to_csv, save_sweeps_to_csv, save_trajectory_to_csv,
    timestamped_csv_name,
};
use RustedODE::Utils::tables::{
    comparison_table, error_summary_table, order_table, sweep_table, trajectory_table,
};
use RustedODE::Utils::task_config::{TaskConfig, TaskKind};
use RustedODE::numerical::ExplicitFixedStep::solver_api::solve_expression;
use RustedODE::numerical::ExplicitFixedStep::steppers::Method;
use RustedODE::numerical::Examples_and_utils::DemoProblem;
use RustedODE::numerical::analytic_reference::{Reference, compare, evaluate_analytic};
use RustedODE::numerical::convergence::ConvergenceAnalysis;
use RustedODE::numerical::ode_errors::OdeError;
use RustedODE::symbolic::function_evaluator::{FunctionParser, SymbolicParser};
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use strum::IntoEnumIterator;

const MAX_TABLE_ROWS: usize = 21;

const USAGE: &str = "usage:
  RustedODE <task file>
  RustedODE --demo <problem> [solve|convergence|compare]
  RustedODE --list";

/// "auto" in the task file means a timestamped file name
fn csv_path(config: &TaskConfig) -> Option<PathBuf> {
    config.output.csv.as_ref().map(|path| {
        if path.as_os_str() == "auto" {
            timestamped_csv_name(&config.kind.to_string())
        } else {
            path.clone()
        }
    })
}

fn run_solve(config: &TaskConfig) -> Result<(), OdeError> {
    let parser = SymbolicParser;
    let problem = &config.problem;
    let n = config.n_steps()?;
    let trajectory = solve_expression(
        &parser,
        config.solver.method.as_ref(),
        &problem.function,
        problem.t0,
        problem.y0,
        config.solver.step,
        n,
    )?;
    let analytic = match &problem.solution {
        Some(solution) => {
            let solution = parser.parse_solution(solution)?;
            let exact = evaluate_analytic(solution.as_ref(), trajectory.t_values())?;
            let report = compare(&trajectory, Reference::Aligned(&exact))?;
            Some((exact, report))
        }
        None => None,
    };
    let analytic_ref = analytic.as_ref().map(|(exact, report)| (exact, report));
    println!("{}", trajectory_table(&trajectory, analytic_ref, MAX_TABLE_ROWS));
    if let Some((_, report)) = &analytic {
        println!(
            "{}",
            error_summary_table(&[(config.solver.method, report.clone())])
        );
    }
    if let Some(path) = csv_path(config) {
        save_trajectory_to_csv(path, &trajectory, analytic_ref)?;
    }
    Ok(())
}

fn run_convergence(config: &TaskConfig) -> Result<(), OdeError> {
    let mut analysis = ConvergenceAnalysis::new();
    analysis.set_reference_refinement(config.convergence.reference_refinement)?;
    analysis.set_log_scale(config.convergence.log_scale);
    let names = config.method_names();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let problem = &config.problem;
    let sweeps = analysis.analyze_methods(
        &names,
        &problem.function,
        problem.t0,
        problem.y0,
        config.t_end()?,
        problem.solution.as_deref(),
        config.convergence.step_sizes.as_deref(),
    )?;
    for sweep in &sweeps {
        println!("{}", sweep.method.spec().description);
        println!("{}", sweep_table(sweep));
    }
    println!("{}", order_table(&sweeps));
    if let Some(path) = csv_path(config) {
        save_sweeps_to_csv(path, &sweeps)?;
    }
    Ok(())
}

fn run_compare(config: &TaskConfig) -> Result<(), OdeError> {
    let analysis = ConvergenceAnalysis::new();
    let names = config.method_names();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let problem = &config.problem;
    let comparison = analysis.compare_methods(
        &problem.function,
        problem.t0,
        problem.y0,
        config.t_end()?,
        problem.solution.as_deref(),
        Some(names.as_slice()),
        config.solver.step,
    )?;
    println!("{}", comparison_table(&comparison, MAX_TABLE_ROWS));
    if !comparison.error_reports.is_empty() {
        println!("{}", error_summary_table(&comparison.error_reports));
    }
    if let Some(err) = &comparison.analytic_error {
        println!("analytic solution not compared: {}", err);
    }
    if let Some(path) = csv_path(config) {
        save_comparison_to_csv(path, &comparison)?;
    }
    Ok(())
}

fn run(config: &TaskConfig) -> Result<(), OdeError> {
    info!(
        "{} task: dy/dt = {}, y({}) = {}",
        config.kind, config.problem.function, config.problem.t0, config.problem.y0
    );
    match config.kind {
        TaskKind::Solve => run_solve(config),
        TaskKind::Convergence => run_convergence(config),
        TaskKind::Compare => run_compare(config),
    }
}

fn list() {
    println!("methods:");
    for method in Method::iter() {
        let spec = method.spec();
        println!("  {:<6} {}", method, spec.description);
    }
    println!("demonstration problems:");
    for demo in DemoProblem::iter() {
        println!("  {:<18} dy/dt = {:<16} {}", demo, demo.rhs(), demo.description());
    }
}

fn config_from_args(args: &[String]) -> Result<Option<TaskConfig>, OdeError> {
    match args {
        [] => {
            warn!("no task given, running the damped oscillator comparison");
            Ok(Some(TaskConfig::from_demo(
                DemoProblem::DampedOscillator,
                TaskKind::Compare,
            )))
        }
        [flag] if flag == "--list" => {
            list();
            Ok(None)
        }
        [flag, rest @ ..] if flag == "--demo" && (1..=2).contains(&rest.len()) => {
            let demo = DemoProblem::from_str(&rest[0]).map_err(|_| {
                OdeError::InvalidParameter(format!("unknown demonstration problem '{}'", rest[0]))
            })?;
            let kind = match rest.get(1) {
                Some(kind) => TaskKind::from_str(kind).map_err(|_| {
                    OdeError::InvalidParameter(format!(
                        "unknown task kind '{}', expected solve, convergence or compare",
                        kind
                    ))
                })?,
                None => TaskKind::Convergence,
            };
            Ok(Some(TaskConfig::from_demo(demo, kind)))
        }
        [path] if !path.starts_with("--") => Ok(Some(TaskConfig::from_file(path)?)),
        _ => Err(OdeError::InvalidParameter(USAGE.to_string())),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    // the task's own loglevel is only known after parsing, so the logger accepts
    // everything and the global filter decides
    let _ = init_logger(Some("debug"));
    log::set_max_level(log::LevelFilter::Info);
    let config = match config_from_args(&args) {
        Ok(Some(config)) => config,
        Ok(None) => return ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = &config.loglevel {
        match level_filter(Some(level)) {
            Ok(filter) => log::set_max_level(filter),
            Err(err) => warn!("{}", err),
        }
    }
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
