use crate::numerical::ExplicitFixedStep::steppers::{FixedStepSolver, Method};
use crate::numerical::ExplicitFixedStep::trajectory::Trajectory;
use crate::numerical::ode_errors::OdeError;
use crate::symbolic::function_evaluator::FunctionParser;
use log::info;
use std::time::Instant;

/// Full path from user input to a trajectory: parse the right-hand side, pick the
/// method by name, solve.
///
/// # Examples
/// ```
/// use RustedODE::numerical::ExplicitFixedStep::solver_api::solve_expression;
/// use RustedODE::symbolic::function_evaluator::SymbolicParser;
/// let traj = solve_expression(&SymbolicParser, "rk4", "y", 0.0, 1.0, 0.01, 100).unwrap();
/// assert!((traj.last().1 - 1f64.exp()).abs() < 1e-6);
/// ```
pub fn solve_expression(
    parser: &dyn FunctionParser,
    method: &str,
    f_str: &str,
    t0: f64,
    y0: f64,
    h: f64,
    n: usize,
) -> Result<Trajectory, OdeError> {
    let method = Method::from_name(method)?;
    let f = parser.parse_rhs(f_str)?;
    let solver = method.solver();
    let start = Instant::now();
    let trajectory = solver.solve(f.as_ref(), t0, y0, h, n)?;
    info!(
        "{} solved dy/dt = {} with h = {}, n = {} in {} ms",
        method,
        f_str,
        h,
        n,
        start.elapsed().as_millis()
    );
    Ok(trajectory)
}

/// n = floor((t_end - t0)/h); the last point may fall short of t_end
pub fn steps_to_reach(t0: f64, t_end: f64, h: f64) -> Result<usize, OdeError> {
    if !h.is_finite() || h <= 0.0 {
        return Err(OdeError::InvalidParameter(format!(
            "step size h must be a finite positive number, got {}",
            h
        )));
    }
    if !t0.is_finite() || !t_end.is_finite() || t_end <= t0 {
        return Err(OdeError::InvalidParameter(format!(
            "integration interval must satisfy t0 < t_end, got t0 = {}, t_end = {}",
            t0, t_end
        )));
    }
    let n = ((t_end - t0) / h).floor();
    if n < 1.0 {
        return Err(OdeError::InvalidParameter(format!(
            "step size h = {} is larger than the interval [{}, {}]",
            h, t0, t_end
        )));
    }
    Ok(n as usize)
}
