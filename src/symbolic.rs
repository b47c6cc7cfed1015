#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedODE::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("sin(t) - 0.1*y").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// syntax tree of an expression, printing and variable extraction
pub mod symbolic_engine;
/// turns a symbolic expression into a Rust closure
pub mod symbolic_lambdify;
///______________________________________________________________________________________________________________________________________________
/// strings to callables f(t, y) and y(t), behind the FunctionParser trait
pub mod function_evaluator;
