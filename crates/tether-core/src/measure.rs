use crate::{Position, Trajectory, F};
use serde::{Serialize, Deserialize};
use tracing::info;

/// Summary of consecutive step magnitudes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepStatistics {
    pub n_steps: usize,
    pub mean: F,
    /// Population standard deviation.
    pub std: F,
    pub min: F,
    pub max: F,
    /// Distance from the last point to the target.
    pub final_distance: F,
}

impl StepStatistics {
    pub fn from_lengths(lengths: &[F], final_distance: F) -> Self {
        if lengths.is_empty() {
            return Self {
                n_steps: 0,
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
                final_distance,
            };
        }

        let n = lengths.len() as F;
        let mean = lengths.iter().sum::<F>() / n;
        let var = lengths.iter().map(|l| (l - mean).powi(2)).sum::<F>() / n;

        Self {
            n_steps: lengths.len(),
            mean,
            std: var.sqrt(),
            min: lengths.iter().copied().fold(F::INFINITY, F::min),
            max: lengths.iter().copied().fold(F::NEG_INFINITY, F::max),
            final_distance,
        }
    }

    /// Largest departure of any step length from `delta`.
    pub fn max_deviation(&self, delta: F) -> F {
        if self.n_steps == 0 {
            return 0.0;
        }
        (self.max - delta).abs().max((self.min - delta).abs())
    }
}

/// Statistics over all `N` steps.
pub fn validate(trajectory: &Trajectory, target: &Position) -> StepStatistics {
    let lengths: Vec<F> = trajectory.step_lengths().collect();
    StepStatistics::from_lengths(&lengths, final_distance(trajectory, target))
}

/// Statistics over the leading steps outside the approximate tail.
pub fn validate_exact(trajectory: &Trajectory, target: &Position) -> StepStatistics {
    let lengths: Vec<F> = trajectory.step_lengths().take(trajectory.exact_steps()).collect();
    StepStatistics::from_lengths(&lengths, final_distance(trajectory, target))
}

fn final_distance(trajectory: &Trajectory, target: &Position) -> F {
    trajectory
        .final_point()
        .map(|p| p.distance_to(target))
        .unwrap_or(F::NAN)
}

/// Quality-control view of one finished run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub all_steps: StepStatistics,
    pub exact_steps: StepStatistics,
    pub pre_correction_error: F,
}

impl ValidationReport {
    pub fn log(&self) {
        info!(
            steps = self.all_steps.n_steps,
            mean = self.all_steps.mean,
            std = self.all_steps.std,
            min = self.all_steps.min,
            max = self.all_steps.max,
            exact_std = self.exact_steps.std,
            pre_correction_error = self.pre_correction_error,
            final_distance = self.all_steps.final_distance,
            "step magnitude statistics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_of_known_lengths() {
        let stats = StepStatistics::from_lengths(&[1.0, 2.0, 3.0, 4.0], 0.5);
        assert_eq!(stats.n_steps, 4);
        assert!((stats.mean - 2.5).abs() < 1e-15);
        assert!((stats.std - 1.25f64.sqrt()).abs() < 1e-15);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.final_distance, 0.5);
        assert_eq!(stats.max_deviation(2.0), 2.0);
    }

    #[test]
    fn empty_trajectory_has_no_steps() {
        let trajectory = Trajectory::from_parts(vec![Position::origin()], 0.1, 0);
        let stats = validate(&trajectory, &Position::new(3.0, 4.0));
        assert_eq!(stats.n_steps, 0);
        assert!((stats.final_distance - 5.0).abs() < 1e-15);
    }

    #[test]
    fn exact_view_skips_the_tail() {
        let points = vec![
            Position::origin(),
            Position::new(1.0, 0.0),
            Position::new(2.0, 0.0),
            Position::new(2.5, 0.0),
        ];
        let trajectory = Trajectory::from_parts(points, 1.0, 1);
        let target = Position::new(2.5, 0.0);
        assert_eq!(validate_exact(&trajectory, &target).std, 0.0);
        assert!(validate(&trajectory, &target).std > 0.0);
    }
}
