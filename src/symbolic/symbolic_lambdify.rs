use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::{E, PI};

/// compiled expression: arguments are passed in the order of the `vars` slice given to `lambdify`
pub type LambdifiedFn = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

impl Expr {
    /// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions
    ///
    /// Turns the expression into a closure of the variables listed in `vars`; the closure
    /// expects its argument slice in the same order. `pi` and `e` are constants unless
    /// they are listed in `vars`. Any other symbol missing from `vars` is an error, so a
    /// closure returned by this method never fails on lookup.
    ///
    /// Domain errors (ln of a negative number, division by zero) are not caught here:
    /// they come out as NaN or infinity, and the solvers treat a non-finite value as a
    /// failed evaluation.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("t + y^2").unwrap();
    /// let func = f.lambdify(&["t", "y"]).unwrap();
    /// assert_eq!(func(&[1.0, 3.0]), 10.0);
    /// ```
    pub fn lambdify(&self, vars: &[&str]) -> Result<LambdifiedFn, String> {
        let compiled: LambdifiedFn = match self {
            Expr::Var(name) => match vars.iter().position(|&x| x == name) {
                Some(index) => Box::new(move |args: &[f64]| args[index]),
                None if name == "pi" => Box::new(|_: &[f64]| PI),
                None if name == "e" => Box::new(|_: &[f64]| E),
                None => {
                    return Err(format!(
                        "unknown symbol '{}', expected one of {:?}",
                        name, vars
                    ));
                }
            },
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_: &[f64]| val)
            }
            Expr::Add(lhs, rhs) => {
                let lf = lhs.lambdify(vars)?;
                let rf = rhs.lambdify(vars)?;
                Box::new(move |args: &[f64]| lf(args) + rf(args))
            }
            Expr::Sub(lhs, rhs) => {
                let lf = lhs.lambdify(vars)?;
                let rf = rhs.lambdify(vars)?;
                Box::new(move |args: &[f64]| lf(args) - rf(args))
            }
            Expr::Mul(lhs, rhs) => {
                let lf = lhs.lambdify(vars)?;
                let rf = rhs.lambdify(vars)?;
                Box::new(move |args: &[f64]| lf(args) * rf(args))
            }
            Expr::Div(lhs, rhs) => {
                let lf = lhs.lambdify(vars)?;
                let rf = rhs.lambdify(vars)?;
                Box::new(move |args: &[f64]| lf(args) / rf(args))
            }
            Expr::Pow(b, e) => {
                let bf = b.lambdify(vars)?;
                // integer exponents go through powi: exact for negative bases
                if let Expr::Const(exponent) = **e {
                    if exponent.fract() == 0.0 && exponent.abs() <= i32::MAX as f64 {
                        let exponent = exponent as i32;
                        return Ok(Box::new(move |args: &[f64]| bf(args).powi(exponent)));
                    }
                }
                let ef = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| bf(args).powf(ef(args)))
            }
            Expr::Exp(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).exp())
            }
            Expr::Ln(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).ln())
            }
            Expr::sqrt(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).sqrt())
            }
            Expr::abs(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).abs())
            }
            Expr::sin(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).sin())
            }
            Expr::cos(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).cos())
            }
            Expr::tg(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).tan())
            }
            Expr::arcsin(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).asin())
            }
            Expr::arccos(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).acos())
            }
            Expr::arctg(e) => {
                let f = e.lambdify(vars)?;
                Box::new(move |args: &[f64]| f(args).atan())
            }
        };
        Ok(compiled)
    } // end of lambdify
}
