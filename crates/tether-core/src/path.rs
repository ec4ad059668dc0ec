use crate::{Position, F};
use serde::{Serialize, Deserialize};

/// Positions `0..=N` of one bridge.
///
/// Leading steps are exactly `delta` long. The last `approximate_tail` steps
/// are not: they were either snapped onto the target or shifted by the
/// terminal corrector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<Position>,
    delta: F,
    approximate_tail: usize,
}

impl Trajectory {
    pub fn from_parts(points: Vec<Position>, delta: F, approximate_tail: usize) -> Self {
        let n_steps = points.len().saturating_sub(1);
        Self {
            points,
            delta,
            approximate_tail: approximate_tail.min(n_steps),
        }
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Position> {
        self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn n_steps(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn delta(&self) -> F {
        self.delta
    }

    pub fn initial_point(&self) -> Option<&Position> {
        self.points.first()
    }

    pub fn final_point(&self) -> Option<&Position> {
        self.points.last()
    }

    pub fn approximate_tail(&self) -> usize {
        self.approximate_tail
    }

    /// Number of leading steps that are guaranteed to be `delta` long.
    pub fn exact_steps(&self) -> usize {
        self.n_steps() - self.approximate_tail
    }

    /// Whether the point at `index` was produced by an approximate step.
    pub fn is_approximate(&self, index: usize) -> bool {
        index > self.exact_steps()
    }

    /// `‖x_i - x_{i-1}‖` for `i = 1..=N`.
    pub fn step_lengths(&self) -> impl Iterator<Item = F> + '_ {
        self.points.windows(2).map(|w| w[0].distance_to(&w[1]))
    }
}

impl std::ops::Index<usize> for Trajectory {
    type Output = Position;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}
