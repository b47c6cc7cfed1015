use thiserror::Error;

/// error types of the solvers, the reference/analytic comparison and the convergence analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OdeError {
    /// bad h, n, t0, y0, t_end or other numeric setting; always a caller error
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Unsupported method '{name}'. Available methods: {available}")]
    UnsupportedMethod { name: String, available: String },
    /// expression string could not be turned into a callable
    #[error("Cannot parse function '{expression}': {reason}")]
    FunctionParse { expression: String, reason: String },
    /// right-hand side failed (non-finite value) while a solve was running
    #[error("Function evaluation failed at step {step}, t = {t}, y = {y}: {reason}")]
    FunctionEvaluation {
        t: f64,
        y: f64,
        step: usize,
        reason: String,
    },
    /// analytic solution failed at some t
    #[error("Analytic solution evaluation failed at t = {t}: {reason}")]
    Evaluation { t: f64, reason: String },
    /// failure inside a step-size sweep, tagged with the step size being processed
    #[error("Step size h = {h}: {source}")]
    AtStepSize {
        h: f64,
        #[source]
        source: Box<OdeError>,
    },
    #[error("I/O error: {0}")]
    Io(String),
}

impl OdeError {
    /// parse failures and evaluation failures of f(t,y) form one family
    pub fn is_function_evaluation_error(&self) -> bool {
        match self {
            OdeError::FunctionParse { .. } | OdeError::FunctionEvaluation { .. } => true,
            OdeError::AtStepSize { source, .. } => source.is_function_evaluation_error(),
            _ => false,
        }
    }

    /// the error with any step-size context removed
    pub fn root_cause(&self) -> &OdeError {
        match self {
            OdeError::AtStepSize { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn at_step_size(self, h: f64) -> OdeError {
        OdeError::AtStepSize {
            h,
            source: Box::new(self),
        }
    }
}

impl From<std::io::Error> for OdeError {
    fn from(err: std::io::Error) -> Self {
        OdeError::Io(err.to_string())
    }
}

impl From<csv::Error> for OdeError {
    fn from(err: csv::Error) -> Self {
        OdeError::Io(err.to_string())
    }
}
