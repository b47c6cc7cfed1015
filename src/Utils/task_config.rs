//! Typed task built from a task document.
//!
//! ```text
//! task
//!   kind: convergence
//!   loglevel: info
//! problem
//!   function: "y*(1-y/10)"
//!   solution: "10/(1 + 9*exp(-t))"
//!   t0: 0 y0: 1 t_end: 5
//! solver
//!   method: heun
//!   step: 0.1
//! convergence
//!   methods: euler, heun, rk4
//!   step_sizes: 0.1, 0.05, 0.02, 0.01
//!   log_scale: true
//!   reference_refinement: 10
//! output
//!   csv: sweep.csv
//!   max_steps: 1000000
//! ```
//! `problem example: logistic_growth` replaces function/solution (and the default t0, y0,
//! t_end, step) with a built-in demonstration problem. `output csv: auto` names the file
//! after the task kind and the current date and time.
use crate::Utils::task_parser::{DocumentMap, Value, parse_task_document, template_from};
use crate::numerical::ExplicitFixedStep::solver_api::steps_to_reach;
use crate::numerical::ExplicitFixedStep::steppers::Method;
use crate::numerical::Examples_and_utils::DemoProblem;
use crate::numerical::analytic_reference::reference_steps;
use crate::numerical::convergence::MIN_REFERENCE_REFINEMENT;
use crate::numerical::ode_errors::OdeError;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

pub const DEFAULT_MAX_STEPS: usize = 10_000_000;
const LOGLEVELS: [&str; 6] = ["debug", "info", "warn", "error", "off", "none"];

const TEMPLATE: &[(&str, &[&str])] = &[
    ("task", &["kind", "loglevel"]),
    ("problem", &["function", "solution", "t0", "y0", "t_end", "example"]),
    ("solver", &["method", "step", "n_steps"]),
    (
        "convergence",
        &["methods", "step_sizes", "log_scale", "reference_refinement"],
    ),
    ("output", &["csv", "max_steps"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TaskKind {
    Solve,
    Convergence,
    Compare,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProblemConfig {
    pub function: String,
    pub solution: Option<String>,
    pub t0: f64,
    pub y0: f64,
    pub t_end: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub method: Method,
    pub step: f64,
    pub n_steps: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceConfig {
    /// empty means every method
    pub methods: Vec<Method>,
    pub step_sizes: Option<Vec<f64>>,
    pub log_scale: bool,
    pub reference_refinement: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub csv: Option<PathBuf>,
    /// upper bound on the number of steps of any single solve
    pub max_steps: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    pub kind: TaskKind,
    pub loglevel: Option<String>,
    pub problem: ProblemConfig,
    pub solver: SolverConfig,
    pub convergence: ConvergenceConfig,
    pub output: OutputConfig,
}

fn invalid(section: &str, key: &str, what: &str) -> OdeError {
    OdeError::InvalidParameter(format!("task document, {} {}: {}", section, key, what))
}

fn values<'a>(doc: &'a DocumentMap, section: &str, key: &str) -> Option<&'a Vec<Value>> {
    doc.get(section)?
        .get(key)?
        .as_ref()
        .filter(|values| !values.is_empty())
}

fn single<'a>(doc: &'a DocumentMap, section: &str, key: &str) -> Result<Option<&'a Value>, OdeError> {
    match values(doc, section, key) {
        None => Ok(None),
        Some(v) if v.len() == 1 => Ok(Some(&v[0])),
        Some(v) => Err(invalid(
            section,
            key,
            &format!("expected a single value, got {}", v.len()),
        )),
    }
}

fn get_string(doc: &DocumentMap, section: &str, key: &str) -> Result<Option<String>, OdeError> {
    Ok(single(doc, section, key)?.map(Value::to_string_value))
}

fn get_f64(doc: &DocumentMap, section: &str, key: &str) -> Result<Option<f64>, OdeError> {
    match single(doc, section, key)? {
        None => Ok(None),
        Some(value) => match value.as_float() {
            Some(x) if x.is_finite() => Ok(Some(x)),
            _ => Err(invalid(section, key, &format!("expected a finite number, got '{}'", value))),
        },
    }
}

fn get_usize(doc: &DocumentMap, section: &str, key: &str) -> Result<Option<usize>, OdeError> {
    match single(doc, section, key)? {
        None => Ok(None),
        Some(value) => match value.as_integer() {
            Some(i) if i > 0 => Ok(Some(i as usize)),
            _ => Err(invalid(
                section,
                key,
                &format!("expected a positive integer, got '{}'", value),
            )),
        },
    }
}

fn get_bool(doc: &DocumentMap, section: &str, key: &str) -> Result<Option<bool>, OdeError> {
    match single(doc, section, key)? {
        None => Ok(None),
        Some(value) => value
            .as_boolean()
            .map(Some)
            .ok_or_else(|| invalid(section, key, &format!("expected true or false, got '{}'", value))),
    }
}

fn get_f64_list(doc: &DocumentMap, section: &str, key: &str) -> Result<Option<Vec<f64>>, OdeError> {
    match values(doc, section, key) {
        None => Ok(None),
        Some(list) => list
            .iter()
            .map(|value| {
                value
                    .as_float()
                    .ok_or_else(|| invalid(section, key, &format!("'{}' is not a number", value)))
            })
            .collect::<Result<Vec<f64>, OdeError>>()
            .map(Some),
    }
}

/// logs sections and keys the task format does not know
fn warn_unknown(doc: &DocumentMap) {
    for (title, section) in doc {
        match TEMPLATE.iter().find(|(known, _)| *known == title.as_str()) {
            None => warn!("task document: unknown section '{}' ignored", title),
            Some((_, keys)) => {
                for key in section.keys().filter(|k| !keys.contains(&k.as_str())) {
                    warn!("task document: unknown key '{}' in section '{}' ignored", key, title);
                }
            }
        }
    }
}

impl FromStr for TaskConfig {
    type Err = OdeError;

    fn from_str(input: &str) -> Result<TaskConfig, OdeError> {
        let template = template_from(TEMPLATE);
        let doc = parse_task_document(input, Some(&template))?;
        warn_unknown(&doc);
        TaskConfig::from_document(&doc)
    }
}

impl TaskConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TaskConfig, OdeError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            OdeError::Io(format!("cannot read task file {}: {}", path.as_ref().display(), e))
        })?;
        content.parse()
    }

    /// task running a demonstration problem with its default parameters
    pub fn from_demo(demo: DemoProblem, kind: TaskKind) -> TaskConfig {
        let (t0, y0, t_end, h) = demo.default_parameters();
        TaskConfig {
            kind,
            loglevel: None,
            problem: ProblemConfig {
                function: demo.rhs().to_string(),
                solution: Some(demo.analytic_solution(t0, y0)),
                t0,
                y0,
                t_end: Some(t_end),
            },
            solver: SolverConfig {
                method: Method::RK4,
                step: h,
                n_steps: None,
            },
            convergence: ConvergenceConfig {
                methods: Vec::new(),
                step_sizes: None,
                log_scale: true,
                reference_refinement: MIN_REFERENCE_REFINEMENT,
            },
            output: OutputConfig {
                csv: None,
                max_steps: DEFAULT_MAX_STEPS,
            },
        }
    }

    pub fn from_document(doc: &DocumentMap) -> Result<TaskConfig, OdeError> {
        let kind = match get_string(doc, "task", "kind")? {
            Some(kind) => TaskKind::from_str(&kind).map_err(|_| {
                invalid("task", "kind", &format!("'{}', expected solve, convergence or compare", kind))
            })?,
            None => TaskKind::Solve,
        };
        let loglevel = get_string(doc, "task", "loglevel")?;
        if let Some(level) = &loglevel {
            if !LOGLEVELS.contains(&level.as_str()) {
                return Err(invalid(
                    "task",
                    "loglevel",
                    &format!("'{}', expected one of {}", level, LOGLEVELS.join(", ")),
                ));
            }
        }

        let demo = match get_string(doc, "problem", "example")? {
            Some(name) => Some(DemoProblem::from_str(&name).map_err(|_| {
                invalid("problem", "example", &format!("unknown demonstration problem '{}'", name))
            })?),
            None => None,
        };
        let defaults = demo.map(|d| d.default_parameters());
        let t0 = get_f64(doc, "problem", "t0")?
            .or(defaults.map(|d| d.0))
            .unwrap_or(0.0);
        let y0 = match get_f64(doc, "problem", "y0")?.or(defaults.map(|d| d.1)) {
            Some(y0) => y0,
            None => return Err(invalid("problem", "y0", "missing")),
        };
        let t_end = get_f64(doc, "problem", "t_end")?.or(defaults.map(|d| d.2));
        let (function, solution) = match demo {
            Some(demo) => (demo.rhs().to_string(), Some(demo.analytic_solution(t0, y0))),
            None => match get_string(doc, "problem", "function")? {
                Some(function) => (function, get_string(doc, "problem", "solution")?),
                None => return Err(invalid("problem", "function", "missing")),
            },
        };

        let method = match get_string(doc, "solver", "method")? {
            Some(name) => Method::from_name(&name)?,
            None => Method::RK4,
        };
        let step = get_f64(doc, "solver", "step")?.or(defaults.map(|d| d.3));
        let n_steps = get_usize(doc, "solver", "n_steps")?;

        let methods = match values(doc, "convergence", "methods") {
            Some(list) => list
                .iter()
                .map(|v| Method::from_name(&v.to_string_value()))
                .collect::<Result<Vec<Method>, OdeError>>()?,
            None => Vec::new(),
        };
        let step_sizes = get_f64_list(doc, "convergence", "step_sizes")?;
        let log_scale = get_bool(doc, "convergence", "log_scale")?.unwrap_or(true);
        let reference_refinement =
            get_f64(doc, "convergence", "reference_refinement")?.unwrap_or(MIN_REFERENCE_REFINEMENT);

        let csv = get_string(doc, "output", "csv")?.map(PathBuf::from);
        let max_steps = get_usize(doc, "output", "max_steps")?.unwrap_or(DEFAULT_MAX_STEPS);

        let step = match (kind, step) {
            (_, Some(step)) => step,
            // a sweep does not need a single step size
            (TaskKind::Convergence, None) => 0.0,
            (_, None) => return Err(invalid("solver", "step", "missing")),
        };

        let config = TaskConfig {
            kind,
            loglevel,
            problem: ProblemConfig {
                function,
                solution,
                t0,
                y0,
                t_end,
            },
            solver: SolverConfig {
                method,
                step,
                n_steps,
            },
            convergence: ConvergenceConfig {
                methods,
                step_sizes,
                log_scale,
                reference_refinement,
            },
            output: OutputConfig { csv, max_steps },
        };
        config.validate()?;
        Ok(config)
    }

    /// numeric checks, including the step-count cap
    pub fn validate(&self) -> Result<(), OdeError> {
        if self.convergence.reference_refinement < MIN_REFERENCE_REFINEMENT {
            return Err(invalid(
                "convergence",
                "reference_refinement",
                &format!("must be at least {}", MIN_REFERENCE_REFINEMENT),
            ));
        }
        match self.kind {
            TaskKind::Solve => {
                self.n_steps()?;
            }
            TaskKind::Compare => {
                let t_end = self.t_end()?;
                self.check_cap(steps_to_reach(self.problem.t0, t_end, self.solver.step)?)?;
            }
            TaskKind::Convergence => {
                let t_end = self.t_end()?;
                let h_min = match &self.convergence.step_sizes {
                    Some(sizes) => {
                        if sizes.iter().any(|h| !h.is_finite() || *h <= 0.0) {
                            return Err(invalid("convergence", "step_sizes", "must be positive"));
                        }
                        sizes.iter().copied().fold(f64::INFINITY, f64::min)
                    }
                    // smallest of the default step sizes
                    None if self.convergence.log_scale => 1e-4,
                    None => 1e-3,
                };
                // the reference trajectory is the largest solve of a sweep
                let h_ref = h_min / self.convergence.reference_refinement;
                self.check_cap(reference_steps(self.problem.t0, t_end, h_ref)?)?;
            }
        }
        Ok(())
    }

    pub fn t_end(&self) -> Result<f64, OdeError> {
        self.problem
            .t_end
            .ok_or_else(|| invalid("problem", "t_end", &format!("required for a {} task", self.kind)))
    }

    /// n_steps if given, otherwise floor((t_end - t0)/step)
    pub fn n_steps(&self) -> Result<usize, OdeError> {
        let n = match self.solver.n_steps {
            Some(n) => n,
            None => {
                let t_end = self.problem.t_end.ok_or_else(|| {
                    invalid("solver", "n_steps", "missing, give n_steps or problem t_end")
                })?;
                steps_to_reach(self.problem.t0, t_end, self.solver.step)?
            }
        };
        self.check_cap(n)
    }

    fn check_cap(&self, n: usize) -> Result<usize, OdeError> {
        if n > self.output.max_steps {
            return Err(OdeError::InvalidParameter(format!(
                "{} steps requested, the limit is {} (output max_steps)",
                n, self.output.max_steps
            )));
        }
        Ok(n)
    }

    pub fn method_names(&self) -> Vec<String> {
        self.convergence
            .methods
            .iter()
            .map(|m| m.to_string())
            .collect()
    }
}
