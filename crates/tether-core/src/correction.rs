use crate::{BridgeError, BridgeResult, Position, EPSILON, F};
use nalgebra::Vector2;
use serde::{Serialize, Deserialize};
use tracing::debug;

/// Default number of trailing points that absorb the terminal error.
pub const CORRECTION_WINDOW: usize = 5;

/// What the terminal corrector found and did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectionReport {
    /// `target - trajectory[N]` before correction.
    pub error: Vector2<F>,
    /// Number of points shifted; zero when nothing was corrected.
    pub window: usize,
    pub weights: Vec<F>,
}

impl CorrectionReport {
    pub fn skipped(error: Vector2<F>) -> Self {
        Self {
            error,
            window: 0,
            weights: Vec::new(),
        }
    }

    pub fn applied(&self) -> bool {
        self.window > 0
    }

    /// Endpoint distance from the target before correction.
    pub fn magnitude(&self) -> F {
        self.error.norm()
    }
}

/// Spreads the endpoint error over the tail of a finished path with linearly
/// increasing weights, then pins the last point to the target.
///
/// Points inside the window no longer sit `delta` apart.
#[derive(Clone, Copy, Debug)]
pub struct TerminalCorrector {
    window: usize,
}

impl Default for TerminalCorrector {
    fn default() -> Self {
        Self { window: CORRECTION_WINDOW }
    }
}

impl TerminalCorrector {
    pub fn new(window: usize) -> BridgeResult<Self> {
        if window == 0 {
            return Err(BridgeError::invalid("correction_window", "must be >= 1"));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Ramp weights `1/k, 2/k, ..., 1` for a path of `n_steps` steps,
    /// `k = min(window, n_steps)`.
    pub fn weights(&self, n_steps: usize) -> Vec<F> {
        let k = self.window.min(n_steps);
        (1..=k).map(|i| i as F / k as F).collect()
    }

    pub fn apply(&self, points: &mut [Position], target: &Position) -> CorrectionReport {
        let Some(last) = points.last() else {
            return CorrectionReport::skipped(Vector2::zeros());
        };
        let error = target.0 - last.0;
        let n = points.len() - 1;
        if n < 1 || error.norm() <= EPSILON {
            return CorrectionReport::skipped(error);
        }

        let weights = self.weights(n);
        let k = weights.len();
        for (j, w) in (n - k + 1..=n).zip(&weights) {
            points[j].0 += error * *w;
        }
        points[n] = *target;

        debug!(error = error.norm(), window = k, "redistributed terminal error");
        CorrectionReport { error, window: k, weights }
    }
}
