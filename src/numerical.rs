/// error type shared by the whole crate
pub mod ode_errors;
/// fixed-step explicit solvers of a scalar IVP dy/dt = f(t, y), y(t0) = y0
/// Example#1
/// ```
/// use RustedODE::numerical::ExplicitFixedStep::steppers::{FixedStepSolver, Method};
/// // dy/dt = y, y(0) = 1, ten steps of 0.1
/// let solver = Method::from_name("RK4").unwrap().solver();
/// let trajectory = solver.solve(&|_t: f64, y: f64| y, 0.0, 1.0, 0.1, 10).unwrap();
/// let (t, y) = trajectory.last();
/// assert!((t - 1.0).abs() < 1e-12);
/// assert!((y - 1f64.exp()).abs() < 1e-5);
/// ```
/// Example#2
/// ```
/// // or the laziest way: right-hand side as a string
/// use RustedODE::numerical::ExplicitFixedStep::solver_api::solve_expression;
/// use RustedODE::symbolic::function_evaluator::SymbolicParser;
/// let trajectory = solve_expression(&SymbolicParser, "heun", "sin(t) - 0.1*y", 0.0, 0.0, 0.1, 100).unwrap();
/// assert_eq!(trajectory.len(), 101);
/// ```
pub mod ExplicitFixedStep;
/// analytic solutions, reference trajectories, error vectors and norms
pub mod analytic_reference;
/// step-size sweeps, empirical order of convergence and side-by-side method comparison
pub mod convergence;
mod convergence_tests;
/// demonstration problems with closed-form solutions
pub mod Examples_and_utils;
