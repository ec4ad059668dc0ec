use crate::{Position, F};
use nalgebra::Vector2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Move `delta` along a unit direction.
    Directed(Vector2<F>),
    /// Land on the target, whatever the distance.
    ToTarget,
}

/// Advances a position by exactly `delta`.
#[derive(Clone, Copy, Debug)]
pub struct FixedMagnitudeStepper {
    delta: F,
}

impl FixedMagnitudeStepper {
    pub fn new(delta: F) -> Self {
        Self { delta }
    }

    pub fn delta(&self) -> F {
        self.delta
    }

    pub fn advance(&self, position: &Position, step: Step, target: &Position) -> Position {
        match step {
            Step::Directed(unit) => Position(position.0 + unit * self.delta),
            Step::ToTarget => *target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoiseGenerator;

    #[test]
    fn directed_steps_have_length_delta() {
        let stepper = FixedMagnitudeStepper::new(0.37);
        let mut noise = NoiseGenerator::new(21);
        let mut x = Position::new(-3.0, 8.0);
        let target = Position::origin();
        for _ in 0..1000 {
            let next = stepper.advance(&x, Step::Directed(noise.unit_vector()), &target);
            assert!((x.distance_to(&next) - 0.37).abs() < 1e-12);
            x = next;
        }
    }

    #[test]
    fn forced_step_lands_on_target() {
        let stepper = FixedMagnitudeStepper::new(0.1);
        let target = Position::new(4.0, -2.0);
        let next = stepper.advance(&Position::origin(), Step::ToTarget, &target);
        assert_eq!(next, target);
    }
}
