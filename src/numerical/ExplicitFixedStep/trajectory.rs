use crate::numerical::ode_errors::OdeError;
use itertools::Itertools;
use nalgebra::DVector;

/// Result of a fixed-step solve: the points (t_i, y_i), i = 0..n.
///
/// Fields are private: a trajectory is never modified after the solver (or
/// `Trajectory::new`) produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    t: DVector<f64>,
    y: DVector<f64>,
}

impl Trajectory {
    /// Builds a trajectory from external data (e.g. a reference computed elsewhere).
    /// t and y must have the same non-zero length and t must be strictly increasing.
    pub fn new(t: DVector<f64>, y: DVector<f64>) -> Result<Trajectory, OdeError> {
        if t.len() != y.len() {
            return Err(OdeError::InvalidParameter(format!(
                "t and y must have the same length, got {} and {}",
                t.len(),
                y.len()
            )));
        }
        if t.is_empty() {
            return Err(OdeError::InvalidParameter(
                "trajectory must contain at least one point".to_string(),
            ));
        }
        if let Some((i, _)) = t
            .iter()
            .tuple_windows()
            .find_position(|(a, b)| !(b > a))
        {
            return Err(OdeError::InvalidParameter(format!(
                "t must be strictly increasing, violated between indices {} and {}",
                i,
                i + 1
            )));
        }
        Ok(Trajectory { t, y })
    }

    /// used by the solver loop, which rejects a step that does not advance t
    pub(crate) fn from_solver(t: DVector<f64>, y: DVector<f64>) -> Trajectory {
        Trajectory { t, y }
    }

    /// number of points, n + 1
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// number of steps n
    pub fn n_steps(&self) -> usize {
        self.t.len().saturating_sub(1)
    }

    pub fn t_values(&self) -> &DVector<f64> {
        &self.t
    }

    pub fn y_values(&self) -> &DVector<f64> {
        &self.y
    }

    pub fn initial(&self) -> (f64, f64) {
        (self.t[0], self.y[0])
    }

    pub fn last(&self) -> (f64, f64) {
        let i = self.t.len() - 1;
        (self.t[i], self.y[i])
    }

    /// spacing of the first interval, None for a single-point trajectory
    pub fn step_size(&self) -> Option<f64> {
        if self.t.len() > 1 {
            Some(self.t[1] - self.t[0])
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.t.iter().copied().zip(self.y.iter().copied())
    }

    /// true when both trajectories are sampled at the same t values
    pub fn same_grid(&self, other: &Trajectory) -> bool {
        self.len() == other.len() && self.t.iter().zip(other.t.iter()).all(|(a, b)| a == b)
    }

    pub fn into_parts(self) -> (DVector<f64>, DVector<f64>) {
        (self.t, self.y)
    }
}
