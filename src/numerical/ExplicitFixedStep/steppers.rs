//! Stepping rules and the shared fixed-step loop.
//!
//! Every method is a unit struct implementing [`StepRule`]: one step from (t, y) to
//! y_next. The loop itself (parameter checks, preallocation, t accumulation, error
//! context) lives once in the blanket implementation of [`FixedStepSolver`].
use crate::numerical::ExplicitFixedStep::trajectory::Trajectory;
use crate::numerical::ode_errors::OdeError;
use crate::symbolic::function_evaluator::RhsFn;
use enum_dispatch::enum_dispatch;
use log::debug;
use nalgebra::DVector;
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// static descriptor of a method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// consistency order p: global error ~ h^p
    pub order: usize,
    /// local truncation error ~ h^(p+1)
    pub local_error_order: usize,
    pub evaluations_per_step: usize,
}

impl SolverSpec {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        order: usize,
        evaluations_per_step: usize,
    ) -> SolverSpec {
        SolverSpec {
            name,
            description,
            order,
            local_error_order: order + 1,
            evaluations_per_step,
        }
    }

    pub fn global_error_order(&self) -> usize {
        self.order
    }
}

/// point where f(t,y) returned something unusable
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    pub t: f64,
    pub y: f64,
    pub reason: String,
}

/// evaluates f and rejects NaN/inf
#[inline]
pub fn eval_stage(f: &RhsFn, t: f64, y: f64) -> Result<f64, StageFailure> {
    let value = f(t, y);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StageFailure {
            t,
            y,
            reason: format!("right-hand side returned non-finite value {}", value),
        })
    }
}

#[enum_dispatch]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solvers {
    Euler(Euler),
    Heun(Heun),
    RK4(RK4),
}

#[enum_dispatch(Solvers)]
pub trait StepRule {
    fn spec(&self) -> SolverSpec;
    /// advances y by one step of size h starting from (t, y)
    fn step(&self, f: &RhsFn, t: f64, y: f64, h: f64) -> Result<f64, StageFailure>;
}

/// Explicit Euler: y_{i+1} = y_i + h f(t_i, y_i)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Euler;

impl StepRule for Euler {
    fn spec(&self) -> SolverSpec {
        SolverSpec::new(
            "Euler",
            "explicit Euler method, one slope evaluation per step",
            1,
            1,
        )
    }

    fn step(&self, f: &RhsFn, t: f64, y: f64, h: f64) -> Result<f64, StageFailure> {
        let k1 = eval_stage(f, t, y)?;
        Ok(y + h * k1)
    }
}

/// Heun (improved Euler), predictor-corrector:
/// y_pred = y_i + h k1, y_{i+1} = y_i + h/2 (k1 + f(t_i + h, y_pred))
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Heun;

impl StepRule for Heun {
    fn spec(&self) -> SolverSpec {
        SolverSpec::new(
            "Heun",
            "Heun's predictor-corrector method (improved Euler), average of the slopes at both ends of the step",
            2,
            2,
        )
    }

    fn step(&self, f: &RhsFn, t: f64, y: f64, h: f64) -> Result<f64, StageFailure> {
        let k1 = eval_stage(f, t, y)?;
        let y_pred = y + h * k1;
        let k2 = eval_stage(f, t + h, y_pred)?;
        Ok(y + (h / 2.0) * (k1 + k2))
    }
}

/// classical fourth-order Runge-Kutta
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RK4;

impl StepRule for RK4 {
    fn spec(&self) -> SolverSpec {
        SolverSpec::new(
            "RK4",
            "classical fourth-order Runge-Kutta method, weighted average of four slopes",
            4,
            4,
        )
    }

    fn step(&self, f: &RhsFn, t: f64, y: f64, h: f64) -> Result<f64, StageFailure> {
        let k1 = eval_stage(f, t, y)?;
        let k2 = eval_stage(f, t + h / 2.0, y + h * k1 / 2.0)?;
        let k3 = eval_stage(f, t + h / 2.0, y + h * k2 / 2.0)?;
        let k4 = eval_stage(f, t + h, y + h * k3)?;
        Ok(y + (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4))
    }
}

/// Checks the preconditions shared by all methods. Nothing is clamped.
pub fn validate_parameters(t0: f64, y0: f64, h: f64, n: usize) -> Result<(), OdeError> {
    if !h.is_finite() || h <= 0.0 {
        return Err(OdeError::InvalidParameter(format!(
            "step size h must be a finite positive number, got {}",
            h
        )));
    }
    if n == 0 {
        return Err(OdeError::InvalidParameter(
            "number of steps n must be a positive integer, got 0".to_string(),
        ));
    }
    if !t0.is_finite() || !y0.is_finite() {
        return Err(OdeError::InvalidParameter(format!(
            "initial values must be finite numbers, got t0 = {}, y0 = {}",
            t0, y0
        )));
    }
    if t0 + h == t0 {
        return Err(OdeError::InvalidParameter(format!(
            "step size h = {} vanishes next to t0 = {}, t would not advance",
            h, t0
        )));
    }
    Ok(())
}

/// A solver producing a whole trajectory. Implemented for every `StepRule`; a custom
/// implementation can be injected wherever a reference solver is needed.
pub trait FixedStepSolver {
    fn info(&self) -> SolverSpec;
    fn solve(&self, f: &RhsFn, t0: f64, y0: f64, h: f64, n: usize)
    -> Result<Trajectory, OdeError>;
}

impl<S: StepRule> FixedStepSolver for S {
    fn info(&self) -> SolverSpec {
        self.spec()
    }

    /// t_{i+1} = t_i + h (accumulated, not t0 + (i+1) h); any failure discards the
    /// partial result.
    fn solve(
        &self,
        f: &RhsFn,
        t0: f64,
        y0: f64,
        h: f64,
        n: usize,
    ) -> Result<Trajectory, OdeError> {
        validate_parameters(t0, y0, h, n)?;
        debug!("{} solve: t0 = {}, y0 = {}, h = {}, n = {}", self.spec().name, t0, y0, h, n);
        let mut t = DVector::zeros(n + 1);
        let mut y = DVector::zeros(n + 1);
        t[0] = t0;
        y[0] = y0;
        for i in 0..n {
            let (t_i, y_i) = (t[i], y[i]);
            let y_next = self
                .step(f, t_i, y_i, h)
                .map_err(|failure| OdeError::FunctionEvaluation {
                    t: failure.t,
                    y: failure.y,
                    step: i,
                    reason: failure.reason,
                })?;
            if !y_next.is_finite() {
                return Err(OdeError::FunctionEvaluation {
                    t: t_i,
                    y: y_i,
                    step: i,
                    reason: format!("step produced non-finite value {}", y_next),
                });
            }
            let t_next = t_i + h;
            if t_next <= t_i {
                return Err(OdeError::InvalidParameter(format!(
                    "step size h = {} vanishes next to t = {} at step {}, t would not advance",
                    h, t_i, i
                )));
            }
            t[i + 1] = t_next;
            y[i + 1] = y_next;
        }
        Ok(Trajectory::from_solver(t, y))
    }
}

/// builds the solver used for reference trajectories
pub type SolverFactory = Arc<dyn Fn() -> Box<dyn FixedStepSolver + Send + Sync> + Send + Sync>;

pub fn rk4_factory() -> SolverFactory {
    Arc::new(|| -> Box<dyn FixedStepSolver + Send + Sync> { Box::new(RK4) })
}

/// method selector, names are "euler", "heun", "rk4" (case-insensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Method {
    Euler,
    Heun,
    RK4,
}

impl Method {
    pub fn from_name(name: &str) -> Result<Method, OdeError> {
        Method::from_str(name.trim()).map_err(|_| OdeError::UnsupportedMethod {
            name: name.to_string(),
            available: Method::available_names().join(", "),
        })
    }

    pub fn available_names() -> Vec<String> {
        Method::iter().map(|m| m.to_string()).collect()
    }

    pub fn solver(&self) -> Solvers {
        match self {
            Method::Euler => Solvers::from(Euler),
            Method::Heun => Solvers::from(Heun),
            Method::RK4 => Solvers::from(RK4),
        }
    }

    pub fn spec(&self) -> SolverSpec {
        self.solver().spec()
    }
}
