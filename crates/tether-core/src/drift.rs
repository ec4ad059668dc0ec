use crate::{BridgeResult, NoiseGenerator, Position, EPSILON, F};
use nalgebra::Vector2;

/// What a director sees before one step. Lives for a single iteration.
#[derive(Clone, Copy, Debug)]
pub struct StepState {
    /// Index of the position about to be produced.
    pub step: u32,
    pub position: Position,
    pub target: Position,
    pub remaining: u32,
    pub delta: F,
    pub to_target: Vector2<F>,
    pub distance: F,
}

impl StepState {
    pub fn new(step: u32, position: Position, target: Position, remaining: u32, delta: F) -> Self {
        let to_target = target.0 - position.0;
        Self {
            step,
            position,
            target,
            remaining,
            delta,
            to_target,
            distance: to_target.norm(),
        }
    }

    pub fn at_target(&self) -> bool {
        self.distance < EPSILON
    }
}

/// A director's choice for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Direction {
    pub unit: Vector2<F>,
    /// Drift strength actually used to build `unit`.
    pub drift_strength: F,
    /// Fresh random vectors drawn because a combination degenerated.
    pub redraws: u32,
}

impl Direction {
    pub fn isotropic(noise: &mut NoiseGenerator) -> Self {
        Self {
            unit: noise.unit_vector(),
            drift_strength: 0.0,
            redraws: 0,
        }
    }
}

pub trait StepDirector: Send + Sync {
    /// Unit direction for the next step. Only called with `state.remaining >= 1`.
    fn direct(&self, state: &StepState, noise: &mut NoiseGenerator) -> BridgeResult<Direction>;
}
