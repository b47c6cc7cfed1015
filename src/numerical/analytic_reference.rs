//! # Analytic and reference comparison
//!
//! Evaluates a known analytic solution y(t) on a grid, builds a fine reference trajectory
//! when no analytic solution is known, and turns a numeric trajectory plus a reference into
//! pointwise and global error measures.
//!
//! A reference on a different t grid is linearly interpolated onto the numeric grid before
//! differencing. The interpolation error ends up in the reported error: against a reference
//! with spacing h_ref it is O(h_ref^2), small next to the error of a method run with h >= 10 h_ref
//! but not zero.
use crate::numerical::ExplicitFixedStep::steppers::FixedStepSolver;
use crate::numerical::ExplicitFixedStep::trajectory::Trajectory;
use crate::numerical::ode_errors::OdeError;
use crate::symbolic::function_evaluator::{RhsFn, SolutionFn};
use log::info;
use nalgebra::DVector;

/// pointwise and global error of a numeric trajectory against a reference
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub abs_error: DVector<f64>,
    /// |abs / reference|, 0 where that is undefined (reference value 0, NaN, infinity)
    pub rel_error: DVector<f64>,
    pub max: f64,
    pub mean: f64,
    pub rms: f64,
}

/// reference values for `compare`
#[derive(Debug, Clone, Copy)]
pub enum Reference<'a> {
    /// one value per point of the numeric trajectory
    Aligned(&'a DVector<f64>),
    /// any other grid, interpolated onto the numeric one
    Trajectory(&'a Trajectory),
}

/// y(t) at every t; the first non-finite value aborts with `OdeError::Evaluation`
pub fn evaluate_analytic(
    solution: &SolutionFn,
    t_values: &DVector<f64>,
) -> Result<DVector<f64>, OdeError> {
    let mut values = DVector::zeros(t_values.len());
    for (i, &t) in t_values.iter().enumerate() {
        let y = solution(t);
        if !y.is_finite() {
            return Err(OdeError::Evaluation {
                t,
                reason: format!("analytic solution returned non-finite value {}", y),
            });
        }
        values[i] = y;
    }
    Ok(values)
}

/// Number of reference steps covering [t0, t_end]: ceil((t_end - t0)/h_ref). A quotient
/// within a relative 1e-12 above an integer (such as 10.000000000000002) is taken as
/// that integer. A reference ending short of t_end would be clamped at the tail of every
/// numeric grid.
pub fn reference_steps(t0: f64, t_end: f64, h_ref: f64) -> Result<usize, OdeError> {
    if !t0.is_finite() || !t_end.is_finite() || t_end <= t0 {
        return Err(OdeError::InvalidParameter(format!(
            "reference interval must satisfy t0 < t_end, got t0 = {}, t_end = {}",
            t0, t_end
        )));
    }
    if !h_ref.is_finite() || h_ref <= 0.0 {
        return Err(OdeError::InvalidParameter(format!(
            "reference step size must be a finite positive number, got {}",
            h_ref
        )));
    }
    let ratio = (t_end - t0) / h_ref;
    let n_ref = (ratio * (1.0 - 1e-12)).ceil();
    if ratio < 1.0 - 1e-12 || !n_ref.is_finite() {
        return Err(OdeError::InvalidParameter(format!(
            "reference step size {} does not fit into [{}, {}]",
            h_ref, t0, t_end
        )));
    }
    Ok((n_ref as usize).max(1))
}

/// Fine trajectory computed with the injected solver, starting at t0 and reaching at least
/// t_end (see `reference_steps`).
pub fn build_reference(
    solver: &dyn FixedStepSolver,
    f: &RhsFn,
    t0: f64,
    y0: f64,
    t_end: f64,
    h_ref: f64,
) -> Result<Trajectory, OdeError> {
    let n_ref = reference_steps(t0, t_end, h_ref)?;
    info!(
        "building {} reference trajectory: h_ref = {}, {} steps",
        solver.info().name,
        h_ref,
        n_ref
    );
    solver.solve(f, t0, y0, h_ref, n_ref)
}

/// Piecewise linear interpolation of (xp, fp) at x. xp must be increasing; outside
/// [xp_first, xp_last] the end values are returned.
pub fn linear_interpolate(x: f64, xp: &DVector<f64>, fp: &DVector<f64>) -> f64 {
    let last = xp.len() - 1;
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }
    // first index with xp[j] > x, so xp[j-1] <= x < xp[j]
    let j = xp.as_slice().partition_point(|&v| v <= x);
    let (x0, x1) = (xp[j - 1], xp[j]);
    let (y0, y1) = (fp[j - 1], fp[j]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// reference trajectory resampled on the numeric grid
pub fn interpolate_onto(grid: &DVector<f64>, reference: &Trajectory) -> DVector<f64> {
    let (xp, fp) = (reference.t_values(), reference.y_values());
    grid.map(|t| linear_interpolate(t, xp, fp))
}

/// pointwise absolute and relative error
pub fn calculate_errors(
    y_numeric: &DVector<f64>,
    y_reference: &DVector<f64>,
) -> (DVector<f64>, DVector<f64>) {
    let abs_error = (y_numeric - y_reference).abs();
    let rel_error = abs_error.zip_map(y_reference, |abs, reference| {
        let rel = (abs / reference).abs();
        if rel.is_finite() { rel } else { 0.0 }
    });
    (abs_error, rel_error)
}

/// (max, mean, rms) of the absolute error
pub fn calculate_global_errors(abs_error: &DVector<f64>) -> (f64, f64, f64) {
    if abs_error.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let n = abs_error.len() as f64;
    let max = abs_error.amax();
    let mean = abs_error.sum() / n;
    let rms = (abs_error.norm_squared() / n).sqrt();
    (max, mean, rms)
}

pub fn compare(numeric: &Trajectory, reference: Reference) -> Result<ErrorReport, OdeError> {
    let y_numeric = numeric.y_values();
    let resampled;
    let y_reference = match reference {
        Reference::Aligned(values) => {
            if values.len() != y_numeric.len() {
                return Err(OdeError::InvalidParameter(format!(
                    "reference has {} values, trajectory has {} points",
                    values.len(),
                    y_numeric.len()
                )));
            }
            values
        }
        Reference::Trajectory(traj) if traj.same_grid(numeric) => traj.y_values(),
        Reference::Trajectory(traj) => {
            resampled = interpolate_onto(numeric.t_values(), traj);
            &resampled
        }
    };
    let (abs_error, rel_error) = calculate_errors(y_numeric, y_reference);
    let (max, mean, rms) = calculate_global_errors(&abs_error);
    Ok(ErrorReport {
        abs_error,
        rel_error,
        max,
        mean,
        rms,
    })
}
