/*
Pretty printing of results: trajectories, error summaries, step-size sweeps, method comparisons.
Long trajectories are thinned to at most `max_rows` rows, the last point is always shown.
*/
use crate::numerical::ExplicitFixedStep::steppers::Method;
use crate::numerical::ExplicitFixedStep::trajectory::Trajectory;
use crate::numerical::analytic_reference::ErrorReport;
use crate::numerical::convergence::{MethodComparison, StepSizeSweepResult};
use nalgebra::DVector;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ErrorSummaryRow {
    method: String,
    max: String,
    mean: String,
    rms: String,
}

#[derive(Tabled)]
struct SweepRow {
    h: String,
    error: String,
    #[tabled(rename = "ratio to previous")]
    ratio: String,
}

#[derive(Tabled)]
struct OrderRow {
    method: String,
    theoretical: usize,
    estimated: String,
}

fn sci(x: f64) -> String {
    format!("{:.6e}", x)
}

/// indices 0, k, 2k, ... plus the last one; `max_rows == 0` keeps every row
fn thinned_rows(len: usize, max_rows: usize) -> Vec<usize> {
    if max_rows == 0 || len <= max_rows {
        return (0..len).collect();
    }
    let stride = len.div_ceil(max_rows).max(1);
    let mut rows: Vec<usize> = (0..len).step_by(stride).collect();
    if rows.last() != Some(&(len - 1)) {
        rows.push(len - 1);
    }
    rows
}

pub fn trajectory_table(
    trajectory: &Trajectory,
    analytic: Option<(&DVector<f64>, &ErrorReport)>,
    max_rows: usize,
) -> Table {
    let mut builder = Builder::default();
    let mut header = vec!["step", "t", "y"];
    if analytic.is_some() {
        header.extend(["analytic", "abs error", "rel error"]);
    }
    builder.push_record(header);
    let (t, y) = (trajectory.t_values(), trajectory.y_values());
    for i in thinned_rows(trajectory.len(), max_rows) {
        let mut row = vec![i.to_string(), format!("{:.6}", t[i]), format!("{:.10}", y[i])];
        if let Some((values, report)) = analytic {
            row.extend([
                format!("{:.10}", values[i]),
                sci(report.abs_error[i]),
                sci(report.rel_error[i]),
            ]);
        }
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table
}

pub fn error_summary_table(reports: &[(Method, ErrorReport)]) -> Table {
    let rows: Vec<ErrorSummaryRow> = reports
        .iter()
        .map(|(method, report)| ErrorSummaryRow {
            method: method.spec().name.to_string(),
            max: sci(report.max),
            mean: sci(report.mean),
            rms: sci(report.rms),
        })
        .collect();
    let mut table = Table::new(&rows);
    table.with(Style::modern_rounded());
    table
}

pub fn sweep_table(sweep: &StepSizeSweepResult) -> Table {
    let rows: Vec<SweepRow> = sweep
        .step_sizes
        .iter()
        .zip(sweep.errors.iter())
        .enumerate()
        .map(|(i, (h, error))| {
            let ratio = if i == 0 {
                "-".to_string()
            } else {
                format!("{:.3}", sweep.errors[i - 1] / error)
            };
            SweepRow {
                h: sci(*h),
                error: sci(*error),
                ratio,
            }
        })
        .collect();
    let mut table = Table::new(&rows);
    table.with(Style::modern_rounded());
    table
}

pub fn order_table(sweeps: &[StepSizeSweepResult]) -> Table {
    let rows: Vec<OrderRow> = sweeps
        .iter()
        .map(|sweep| OrderRow {
            method: sweep.method.spec().name.to_string(),
            theoretical: sweep.method.spec().order,
            estimated: sweep
                .estimated_order
                .map(|p| format!("{:.4}", p))
                .unwrap_or_else(|| "n/a".to_string()),
        })
        .collect();
    let mut table = Table::new(&rows);
    table.with(Style::modern_rounded());
    table
}

pub fn comparison_table(comparison: &MethodComparison, max_rows: usize) -> Table {
    let mut builder = Builder::default();
    let mut header = vec!["t".to_string()];
    header.extend(
        comparison
            .results
            .iter()
            .map(|(method, _)| method.spec().name.to_string()),
    );
    if comparison.analytic_values.is_some() {
        header.push("analytic".to_string());
    }
    builder.push_record(header);
    for i in thinned_rows(comparison.t_values.len(), max_rows) {
        let mut row = vec![format!("{:.6}", comparison.t_values[i])];
        row.extend(comparison.results.iter().map(|(_, y)| format!("{:.10}", y[i])));
        if let Some(analytic) = &comparison.analytic_values {
            row.push(format!("{:.10}", analytic[i]));
        }
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table
}
