//! # Convergence analysis
//!
//! Runs one method over a set of step sizes, measures the global max error for each one
//! and fits log10(error) = p log10(h) + c to estimate the empirical order p. When no
//! analytic solution is given, the error is measured against one reference trajectory
//! computed with a much smaller step (RK4 by default, injectable through a
//! `SolverFactory`) and reused for every step size of the sweep.
//!
//! # Examples
//! ```
//! use RustedODE::numerical::convergence::ConvergenceAnalysis;
//! let analysis = ConvergenceAnalysis::new();
//! let sweep = analysis
//!     .analyze_step_size("heun", "y", 0.0, 1.0, 1.0, Some("exp(t)"), None)
//!     .unwrap();
//! let order = sweep.estimated_order.unwrap();
//! assert!((order - 2.0).abs() < 0.3);
//! ```
use crate::numerical::ExplicitFixedStep::solver_api::steps_to_reach;
use crate::numerical::ExplicitFixedStep::steppers::{
    FixedStepSolver, Method, SolverFactory, rk4_factory,
};
use crate::numerical::ExplicitFixedStep::trajectory::Trajectory;
use crate::numerical::analytic_reference::{
    ErrorReport, Reference, build_reference, compare, evaluate_analytic,
};
use crate::numerical::ode_errors::OdeError;
use crate::symbolic::function_evaluator::{FunctionParser, RhsFn, SolutionFn, SymbolicParser};
use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use strum::IntoEnumIterator;

/// smallest allowed ratio between the smallest swept step and the reference step
pub const MIN_REFERENCE_REFINEMENT: f64 = 10.0;
const N_DEFAULT_STEP_SIZES: usize = 10;

/// log10(error) = order * log10(h) + intercept
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawFit {
    pub order: f64,
    pub intercept: f64,
}

impl PowerLawFit {
    /// error predicted by the fitted line at step size h
    pub fn predict(&self, h: f64) -> f64 {
        10f64.powf(self.order * h.log10() + self.intercept)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepSizeSweepResult {
    pub method: Method,
    pub step_sizes: Vec<f64>,
    /// global max absolute error, one per step size
    pub errors: Vec<f64>,
    pub estimated_order: Option<f64>,
    pub fit: Option<PowerLawFit>,
}

/// several methods at one step size on one grid
#[derive(Debug, Clone)]
pub struct MethodComparison {
    pub t_values: DVector<f64>,
    /// in the order the methods were requested
    pub results: Vec<(Method, DVector<f64>)>,
    pub analytic_values: Option<DVector<f64>>,
    /// filled only when analytic values are available
    pub error_reports: Vec<(Method, ErrorReport)>,
    /// failure of the analytic solution; the numeric results stay valid
    pub analytic_error: Option<OdeError>,
}

impl MethodComparison {
    pub fn get(&self, method: Method) -> Option<&DVector<f64>> {
        self.results
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, y)| y)
    }

    pub fn error_report(&self, method: Method) -> Option<&ErrorReport> {
        self.error_reports
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, r)| r)
    }
}

/// Least squares fit of log10(error) against log10(h). Pairs with a zero or non-finite
/// error (or a non-positive h) are skipped; fewer than two distinct step sizes left means
/// no fit.
pub fn fit_power_law(step_sizes: &[f64], errors: &[f64]) -> Option<PowerLawFit> {
    let points: Vec<(f64, f64)> = step_sizes
        .iter()
        .zip(errors.iter())
        .filter(|(h, e)| h.is_finite() && **h > 0.0 && e.is_finite() && **e > 0.0)
        .map(|(h, e)| (h.log10(), e.log10()))
        .collect();
    let first = points.first()?.0;
    if !points.iter().any(|(x, _)| *x != first) {
        return None;
    }
    let m = points.len();
    let a = DMatrix::from_fn(m, 2, |i, j| if j == 0 { points[i].0 } else { 1.0 });
    let b = DVector::from_iterator(m, points.iter().map(|(_, y)| *y));
    let coeffs = a.svd(true, true).solve(&b, 1e-14).ok()?;
    Some(PowerLawFit {
        order: coeffs[0],
        intercept: coeffs[1],
    })
}

pub fn estimate_order(step_sizes: &[f64], errors: &[f64]) -> Option<f64> {
    fit_power_law(step_sizes, errors).map(|fit| fit.order)
}

pub struct ConvergenceAnalysis {
    parser: Arc<dyn FunctionParser + Send + Sync>,
    reference_factory: SolverFactory,
    reference_refinement: f64,
    log_scale: bool,
}

impl Default for ConvergenceAnalysis {
    fn default() -> Self {
        ConvergenceAnalysis::new()
    }
}

impl ConvergenceAnalysis {
    pub fn new() -> ConvergenceAnalysis {
        ConvergenceAnalysis {
            parser: Arc::new(SymbolicParser),
            reference_factory: rk4_factory(),
            reference_refinement: MIN_REFERENCE_REFINEMENT,
            log_scale: true,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn FunctionParser + Send + Sync>) -> Self {
        self.parser = parser;
        self
    }

    /// solver used for the reference trajectory when no analytic solution is given
    pub fn with_reference_factory(mut self, factory: SolverFactory) -> Self {
        self.reference_factory = factory;
        self
    }

    /// h_ref = min(step_sizes) / refinement, refinement >= 10
    pub fn set_reference_refinement(&mut self, refinement: f64) -> Result<(), OdeError> {
        if !refinement.is_finite() || refinement < MIN_REFERENCE_REFINEMENT {
            return Err(OdeError::InvalidParameter(format!(
                "reference refinement must be at least {}, got {}",
                MIN_REFERENCE_REFINEMENT, refinement
            )));
        }
        self.reference_refinement = refinement;
        Ok(())
    }

    pub fn set_log_scale(&mut self, log_scale: bool) {
        self.log_scale = log_scale;
    }

    pub fn reference_refinement(&self) -> f64 {
        self.reference_refinement
    }

    pub fn log_scale(&self) -> bool {
        self.log_scale
    }

    /// 10 values from 1e-4 to 1e-1, log-spaced (or from 0.001 to 0.1, evenly spaced)
    pub fn default_step_sizes(&self) -> Vec<f64> {
        let last = (N_DEFAULT_STEP_SIZES - 1) as f64;
        (0..N_DEFAULT_STEP_SIZES)
            .map(|i| {
                let s = i as f64 / last;
                if self.log_scale {
                    10f64.powf(-4.0 + 3.0 * s)
                } else {
                    0.001 + (0.1 - 0.001) * s
                }
            })
            .collect()
    }

    fn parse_problem(
        &self,
        f_str: &str,
        solution_str: Option<&str>,
    ) -> Result<(Arc<RhsFn>, Option<Arc<SolutionFn>>), OdeError> {
        let f = self.parser.parse_rhs(f_str)?;
        let analytic = solution_str
            .map(|s| self.parser.parse_solution(s))
            .transpose()?;
        Ok((f, analytic))
    }

    /// Step-size sweep of one method. Errors for a particular h come back wrapped in
    /// `OdeError::AtStepSize`.
    #[allow(clippy::too_many_arguments)]
    pub fn analyze_step_size(
        &self,
        method: &str,
        f_str: &str,
        t0: f64,
        y0: f64,
        t_end: f64,
        solution_str: Option<&str>,
        step_sizes: Option<&[f64]>,
    ) -> Result<StepSizeSweepResult, OdeError> {
        let method = Method::from_name(method)?;
        check_interval(t0, y0, t_end)?;
        let step_sizes: Vec<f64> = match step_sizes {
            Some(given) => given.to_vec(),
            None => self.default_step_sizes(),
        };
        if step_sizes.is_empty() {
            return Err(OdeError::InvalidParameter(
                "at least one step size is required".to_string(),
            ));
        }
        if let Some(bad) = step_sizes.iter().find(|h| !h.is_finite() || **h <= 0.0) {
            return Err(OdeError::InvalidParameter(format!(
                "step sizes must be finite positive numbers, got {}",
                bad
            )));
        }
        let (f, analytic) = self.parse_problem(f_str, solution_str)?;
        let begin = Instant::now();

        let reference: Option<Trajectory> = match analytic {
            Some(_) => None,
            None => {
                let h_min = step_sizes.iter().copied().fold(f64::INFINITY, f64::min);
                let h_ref = h_min / self.reference_refinement;
                let reference_solver = (self.reference_factory)();
                Some(build_reference(
                    reference_solver.as_ref(),
                    f.as_ref(),
                    t0,
                    y0,
                    t_end,
                    h_ref,
                )
                .map_err(|e| e.at_step_size(h_ref))?)
            }
        };

        let solver = method.solver();
        let mut errors = Vec::with_capacity(step_sizes.len());
        for &h in &step_sizes {
            let error = self
                .error_at_step_size(
                    &solver,
                    f.as_ref(),
                    analytic.as_deref(),
                    reference.as_ref(),
                    t0,
                    y0,
                    t_end,
                    h,
                )
                .map_err(|e| e.at_step_size(h))?;
            info!("{}: h = {:e}, max error = {:e}", method, h, error);
            errors.push(error);
        }

        let fit = fit_power_law(&step_sizes, &errors);
        match fit {
            Some(fit) => info!(
                "{}: estimated order {:.4} (theoretical {}), elapsed {} ms",
                method,
                fit.order,
                method.spec().order,
                begin.elapsed().as_millis()
            ),
            None => warn!(
                "{}: not enough distinct step sizes with non-zero error to estimate the order",
                method
            ),
        }
        Ok(StepSizeSweepResult {
            method,
            step_sizes,
            errors,
            estimated_order: fit.map(|fit| fit.order),
            fit,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn error_at_step_size(
        &self,
        solver: &dyn FixedStepSolver,
        f: &RhsFn,
        analytic: Option<&SolutionFn>,
        reference: Option<&Trajectory>,
        t0: f64,
        y0: f64,
        t_end: f64,
        h: f64,
    ) -> Result<f64, OdeError> {
        let n = steps_to_reach(t0, t_end, h)?;
        let numeric = solver.solve(f, t0, y0, h, n)?;
        let report = match (analytic, reference) {
            (Some(solution), _) => {
                let exact = evaluate_analytic(solution, numeric.t_values())?;
                compare(&numeric, Reference::Aligned(&exact))?
            }
            (None, Some(reference)) => compare(&numeric, Reference::Trajectory(reference))?,
            (None, None) => {
                return Err(OdeError::InvalidParameter(
                    "neither analytic solution nor reference trajectory available".to_string(),
                ));
            }
        };
        Ok(report.max)
    }

    /// Sweeps several methods at once, in parallel. Results keep the order of `methods`;
    /// an empty list means every method.
    #[allow(clippy::too_many_arguments)]
    pub fn analyze_methods(
        &self,
        methods: &[&str],
        f_str: &str,
        t0: f64,
        y0: f64,
        t_end: f64,
        solution_str: Option<&str>,
        step_sizes: Option<&[f64]>,
    ) -> Result<Vec<StepSizeSweepResult>, OdeError> {
        let names = method_names_or_all(methods);
        names
            .par_iter()
            .map(|name| {
                self.analyze_step_size(name, f_str, t0, y0, t_end, solution_str, step_sizes)
            })
            .collect()
    }

    /// Runs every requested method (all of them when `methods` is None or empty) with the
    /// same step size over [t0, t_end].
    #[allow(clippy::too_many_arguments)]
    pub fn compare_methods(
        &self,
        f_str: &str,
        t0: f64,
        y0: f64,
        t_end: f64,
        solution_str: Option<&str>,
        methods: Option<&[&str]>,
        h: f64,
    ) -> Result<MethodComparison, OdeError> {
        let names = method_names_or_all(methods.unwrap_or(&[]));
        let methods = names
            .iter()
            .map(|name| Method::from_name(name))
            .collect::<Result<Vec<Method>, OdeError>>()?;
        check_interval(t0, y0, t_end)?;
        let n = steps_to_reach(t0, t_end, h)?;
        let (f, analytic) = self.parse_problem(f_str, solution_str)?;

        let mut t_values: Option<DVector<f64>> = None;
        let mut results = Vec::with_capacity(methods.len());
        for method in methods {
            let (t, y) = method.solver().solve(f.as_ref(), t0, y0, h, n)?.into_parts();
            if t_values.is_none() {
                t_values = Some(t);
            }
            results.push((method, y));
        }
        let t_values = t_values.ok_or_else(|| {
            OdeError::InvalidParameter("no method to compare".to_string())
        })?;

        let mut analytic_values = None;
        let mut error_reports = Vec::new();
        let mut analytic_error = None;
        if let Some(solution) = analytic {
            match evaluate_analytic(solution.as_ref(), &t_values) {
                Ok(exact) => {
                    for (method, y) in &results {
                        let numeric = Trajectory::new(t_values.clone(), y.clone())?;
                        let report = compare(&numeric, Reference::Aligned(&exact))?;
                        info!(
                            "{}: max error = {:e}, mean = {:e}, rms = {:e}",
                            method, report.max, report.mean, report.rms
                        );
                        error_reports.push((*method, report));
                    }
                    analytic_values = Some(exact);
                }
                Err(err) => {
                    warn!("analytic comparison skipped: {}", err);
                    analytic_error = Some(err);
                }
            }
        }
        Ok(MethodComparison {
            t_values,
            results,
            analytic_values,
            error_reports,
            analytic_error,
        })
    }
}

fn method_names_or_all(methods: &[&str]) -> Vec<String> {
    if methods.is_empty() {
        Method::iter().map(|m| m.to_string()).collect()
    } else {
        methods.iter().map(|m| m.to_string()).collect()
    }
}

fn check_interval(t0: f64, y0: f64, t_end: f64) -> Result<(), OdeError> {
    if !t0.is_finite() || !y0.is_finite() || !t_end.is_finite() {
        return Err(OdeError::InvalidParameter(format!(
            "t0, y0 and t_end must be finite numbers, got t0 = {}, y0 = {}, t_end = {}",
            t0, y0, t_end
        )));
    }
    if t_end <= t0 {
        return Err(OdeError::InvalidParameter(format!(
            "t_end must be greater than t0, got t0 = {}, t_end = {}",
            t0, t_end
        )));
    }
    Ok(())
}
