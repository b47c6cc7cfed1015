/// Euler, Heun and classical RK4 over one shared fixed-step loop
pub mod steppers;
/// solve straight from an expression string and a method name
pub mod solver_api;
pub mod trajectory;
