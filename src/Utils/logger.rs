use crate::numerical::ExplicitFixedStep::trajectory::Trajectory;
use crate::numerical::analytic_reference::ErrorReport;
use crate::numerical::convergence::{MethodComparison, StepSizeSweepResult};
use crate::numerical::ode_errors::OdeError;
use chrono::Local;
use csv::Writer;
use log::{LevelFilter, info};
use nalgebra::DVector;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};

/// "debug", "info", "warn", "error", "off" or "none" (default "info")
pub fn level_filter(loglevel: Option<&str>) -> Result<LevelFilter, OdeError> {
    match loglevel.unwrap_or("info") {
        "off" | "none" => Ok(LevelFilter::Off),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        other => Err(OdeError::InvalidParameter(format!(
            "loglevel must be debug, info, warn, error, off or none, got '{}'",
            other
        ))),
    }
}

/// Starts terminal logging at `loglevel` (see `level_filter`). Returns false when logging
/// is off or a logger was already installed; both are fine.
pub fn init_logger(loglevel: Option<&str>) -> Result<bool, OdeError> {
    let log_option = level_filter(loglevel)?;
    if log_option == LevelFilter::Off {
        return Ok(false);
    }
    let logger_instance = CombinedLogger::init(vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
    Ok(logger_instance.is_ok())
}

/// `<prefix>_<date>_<time>.csv` in the working directory
pub fn timestamped_csv_name(prefix: &str) -> PathBuf {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    PathBuf::from(format!("{}_{}.csv", prefix, date_and_time))
}

fn write_columns<P: AsRef<Path>>(
    path: P,
    headers: &[String],
    columns: &[&DVector<f64>],
) -> Result<(), OdeError> {
    let mut writer = Writer::from_path(path.as_ref())?;
    writer.write_record(headers)?;
    let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    for i in 0..rows {
        let row: Vec<String> = columns.iter().map(|c| c[i].to_string()).collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!("saved {} rows to {}", rows, path.as_ref().display());
    Ok(())
}

/// columns t, y and, with an analytic comparison, analytic, abs_error, rel_error
pub fn save_trajectory_to_csv<P: AsRef<Path>>(
    path: P,
    trajectory: &Trajectory,
    analytic: Option<(&DVector<f64>, &ErrorReport)>,
) -> Result<(), OdeError> {
    let mut headers = vec!["t".to_string(), "y".to_string()];
    let mut columns = vec![trajectory.t_values(), trajectory.y_values()];
    if let Some((values, report)) = analytic {
        headers.extend(["analytic", "abs_error", "rel_error"].map(String::from));
        columns.extend([values, &report.abs_error, &report.rel_error]);
    }
    write_columns(path, &headers, &columns)
}

/// column t, one column per method, then analytic when present
pub fn save_comparison_to_csv<P: AsRef<Path>>(
    path: P,
    comparison: &MethodComparison,
) -> Result<(), OdeError> {
    let mut headers = vec!["t".to_string()];
    let mut columns = vec![&comparison.t_values];
    for (method, y) in &comparison.results {
        headers.push(method.to_string());
        columns.push(y);
    }
    if let Some(analytic) = &comparison.analytic_values {
        headers.push("analytic".to_string());
        columns.push(analytic);
    }
    write_columns(path, &headers, &columns)
}

/// one row per (method, h, error)
pub fn save_sweeps_to_csv<P: AsRef<Path>>(
    path: P,
    sweeps: &[StepSizeSweepResult],
) -> Result<(), OdeError> {
    let mut writer = Writer::from_path(path.as_ref())?;
    writer.write_record(["method", "h", "error", "estimated_order"])?;
    for sweep in sweeps {
        let order = sweep
            .estimated_order
            .map(|p| p.to_string())
            .unwrap_or_default();
        for (h, error) in sweep.step_sizes.iter().zip(sweep.errors.iter()) {
            writer.write_record([
                sweep.method.to_string(),
                h.to_string(),
                error.to_string(),
                order.clone(),
            ])?;
        }
    }
    writer.flush()?;
    info!("saved step-size sweep to {}", path.as_ref().display());
    Ok(())
}
