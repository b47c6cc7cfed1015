use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/*
Demonstration problems, scalar IVPs with closed-form solutions

1) exponential growth
y' = y
y(t) = y0*exp(t - t0)

2) exponential decay
y' = -0.5*y
y(t) = y0*exp(-0.5*(t - t0))

3) logistic growth, carrying capacity 10
y' = y*(1 - y/10)
y(t) = 10/(1 + (10/y0 - 1)*exp(-(t - t0)))

4) damped oscillator driven by sin(t)
y' = sin(t) - 0.1*y
y(t) = (0.1*sin(t) - cos(t))/1.01 + C*exp(-0.1*(t - t0)),   C = y0 - (0.1*sin(t0) - cos(t0))/1.01

5) pure quadrature
y' = t
y(t) = y0 + (t^2 - t0^2)/2
.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DemoProblem {
    ExponentialGrowth,
    ExponentialDecay,
    LogisticGrowth,
    DampedOscillator,
    Quadrature,
}

const CARRYING_CAPACITY: f64 = 10.0;

/// number as an expression fragment, negative values in parentheses
fn num(x: f64) -> String {
    if x < 0.0 {
        format!("({})", x)
    } else {
        format!("{}", x)
    }
}

impl DemoProblem {
    /// right-hand side f(t, y)
    pub fn rhs(&self) -> &'static str {
        match self {
            DemoProblem::ExponentialGrowth => "y",
            DemoProblem::ExponentialDecay => "-0.5*y",
            DemoProblem::LogisticGrowth => "y*(1-y/10)",
            DemoProblem::DampedOscillator => "sin(t) - 0.1*y",
            DemoProblem::Quadrature => "t",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DemoProblem::ExponentialGrowth => "exponential growth",
            DemoProblem::ExponentialDecay => "exponential decay",
            DemoProblem::LogisticGrowth => "logistic growth with carrying capacity 10",
            DemoProblem::DampedOscillator => "damped oscillator driven by sin(t)",
            DemoProblem::Quadrature => "pure quadrature, slope independent of y",
        }
    }

    /// closed-form solution through (t0, y0), as an expression in t
    pub fn analytic_solution(&self, t0: f64, y0: f64) -> String {
        match self {
            DemoProblem::ExponentialGrowth => format!("{}*exp(t - {})", num(y0), num(t0)),
            DemoProblem::ExponentialDecay => {
                format!("{}*exp(-0.5*(t - {}))", num(y0), num(t0))
            }
            DemoProblem::LogisticGrowth => {
                // y = 0 is an equilibrium
                if y0 == 0.0 {
                    return "0".to_string();
                }
                let k = CARRYING_CAPACITY / y0 - 1.0;
                format!(
                    "{}/(1 + {}*exp(-(t - {})))",
                    num(CARRYING_CAPACITY),
                    num(k),
                    num(t0)
                )
            }
            DemoProblem::DampedOscillator => {
                let c = y0 - (0.1 * t0.sin() - t0.cos()) / 1.01;
                format!(
                    "(0.1*sin(t) - cos(t))/1.01 + {}*exp(-0.1*(t - {}))",
                    num(c),
                    num(t0)
                )
            }
            DemoProblem::Quadrature => {
                format!("{} + (t^2 - {})/2", num(y0), num(t0 * t0))
            }
        }
    }

    /// (t0, y0, t_end, h)
    pub fn default_parameters(&self) -> (f64, f64, f64, f64) {
        match self {
            DemoProblem::ExponentialGrowth => (0.0, 1.0, 2.0, 0.1),
            DemoProblem::ExponentialDecay => (0.0, 2.0, 5.0, 0.1),
            DemoProblem::LogisticGrowth => (0.0, 1.0, 10.0, 0.1),
            DemoProblem::DampedOscillator => (0.0, 0.0, 10.0, 0.1),
            DemoProblem::Quadrature => (0.0, 0.0, 2.0, 0.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::function_evaluator::{FunctionParser, SymbolicParser};
    use approx::assert_relative_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_analytic_solutions_solve_their_ode() {
        let parser = SymbolicParser;
        for problem in DemoProblem::iter() {
            for &(t0, y0) in &[(0.0, 1.0), (0.5, 2.0), (-1.0, -0.5)] {
                let f = parser.parse_rhs(problem.rhs()).unwrap();
                let solution = parser
                    .parse_solution(&problem.analytic_solution(t0, y0))
                    .unwrap();
                assert_relative_eq!(solution(t0), y0, epsilon = 1e-12);
                // central difference of y(t) against f(t, y(t))
                let d = 1e-5;
                for k in 1..5 {
                    let t = t0 + 0.3 * k as f64;
                    let derivative = (solution(t + d) - solution(t - d)) / (2.0 * d);
                    assert_relative_eq!(derivative, f(t, solution(t)), epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_logistic_equilibrium() {
        assert_eq!(DemoProblem::LogisticGrowth.analytic_solution(0.0, 0.0), "0");
    }

    #[test]
    fn test_names() {
        assert_eq!(
            DemoProblem::from_str("logistic_growth").unwrap(),
            DemoProblem::LogisticGrowth
        );
        assert_eq!(DemoProblem::DampedOscillator.to_string(), "damped_oscillator");
        assert!(DemoProblem::from_str("lorenz").is_err());
        assert_eq!(DemoProblem::iter().count(), 5);
    }
}
