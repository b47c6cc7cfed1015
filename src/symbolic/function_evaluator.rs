//! # Function Evaluator
//!
//! Narrow seam between expression strings and the numeric core. The solvers only see
//! callables; which technology turns a string into a callable is hidden behind
//! [`FunctionParser`]. The default implementation, [`SymbolicParser`], goes through the
//! `Expr` syntax tree of this crate.
//!
//! ```
//! use RustedODE::symbolic::function_evaluator::{FunctionParser, SymbolicParser};
//! let parser = SymbolicParser;
//! let f = parser.parse_rhs("sin(t) - 0.1*y").unwrap();
//! assert_eq!(f(0.0, 10.0), -1.0);
//! let y = parser.parse_solution("exp(t)").unwrap();
//! assert_eq!(y(0.0), 1.0);
//! ```
use crate::numerical::ode_errors::OdeError;
use crate::symbolic::symbolic_engine::Expr;
use log::warn;
use std::sync::Arc;

/// callable of the declared free variables, passed as a slice in declaration order
pub type ScalarFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;
/// right-hand side f(t, y) of dy/dt = f(t, y)
pub type RhsFn = dyn Fn(f64, f64) -> f64 + Send + Sync;
/// analytic solution y(t)
pub type SolutionFn = dyn Fn(f64) -> f64 + Send + Sync;

/// names of the independent and dependent variables used in expression strings
pub const ARG: &str = "t";
pub const UNKNOWN: &str = "y";

pub trait FunctionParser {
    /// Turns `expr` into a callable of `free_variables`. Malformed input and symbols that
    /// are not declared free variables fail with `OdeError::FunctionParse`.
    fn parse(&self, expr: &str, free_variables: &[&str]) -> Result<ScalarFn, OdeError>;

    /// f(t, y) from a string such as "y*(1-y/10)"
    fn parse_rhs(&self, expr: &str) -> Result<Arc<RhsFn>, OdeError> {
        let f = self.parse(expr, &[ARG, UNKNOWN])?;
        Ok(Arc::new(move |t: f64, y: f64| f(&[t, y])))
    }

    /// y(t) from a string such as "exp(t)"
    fn parse_solution(&self, expr: &str) -> Result<Arc<SolutionFn>, OdeError> {
        let f = self.parse(expr, &[ARG])?;
        Ok(Arc::new(move |t: f64| f(&[t])))
    }
}

/// default parser: string -> `Expr` -> lambdified closure
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicParser;

impl FunctionParser for SymbolicParser {
    fn parse(&self, expr: &str, free_variables: &[&str]) -> Result<ScalarFn, OdeError> {
        let parsed = Expr::parse_expression(expr)?;
        let compiled =
            parsed
                .lambdify(free_variables)
                .map_err(|reason| OdeError::FunctionParse {
                    expression: expr.to_string(),
                    reason,
                })?;
        Ok(Arc::from(compiled))
    }
}

/// Checks that a right-hand side is well formed and reports whether it depends on t or y.
/// A slope depending on neither is legal (f = 0 is a perfectly good ODE) but is usually
/// a typing mistake, so it is logged.
pub fn validate_rhs(expr: &str) -> Result<bool, OdeError> {
    let parsed = Expr::parse_expression(expr)?;
    let vars = parsed.all_arguments_are_variables();
    if let Some(unknown) = vars
        .iter()
        .find(|v| !matches!(v.as_str(), ARG | UNKNOWN | "pi" | "e"))
    {
        return Err(OdeError::FunctionParse {
            expression: expr.to_string(),
            reason: format!("unknown symbol '{}', only t and y are allowed", unknown),
        });
    }
    let depends = parsed.contains_variable(ARG) || parsed.contains_variable(UNKNOWN);
    if !depends {
        warn!("right-hand side '{}' depends neither on t nor on y", expr);
    }
    Ok(depends)
}
