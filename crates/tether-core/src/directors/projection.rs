use super::helpers::normalize;
use crate::diffusion::{bridge_increment_sigma, diffusion_coefficient};
use crate::drift::{Direction, StepDirector, StepState};
use crate::{BridgeResult, NoiseGenerator};
use tracing::debug;

/// Brownian-bridge increments projected onto the circle of radius `delta`.
///
/// With `r` steps left the free bridge increment has mean `(x_end - x) / r`
/// and per-axis variance `2D (r - 1) / r`, `D = delta² / 6`. Only its
/// direction is kept; the stepper restores the fixed length.
#[derive(Clone, Copy, Debug, Default)]
pub struct BridgeProjection;

impl StepDirector for BridgeProjection {
    fn direct(&self, state: &StepState, noise: &mut NoiseGenerator) -> BridgeResult<Direction> {
        let r = state.remaining.max(1);
        let mean = state.to_target / r as f64;
        let sigma = bridge_increment_sigma(diffusion_coefficient(state.delta), r);
        let drift_strength = (mean.norm() / state.delta).min(1.0);

        let increment = mean + noise.gaussian_vector(sigma);
        match normalize(increment) {
            Some(unit) => Ok(Direction { unit, drift_strength, redraws: 0 }),
            None => {
                debug!(step = state.step, "projected increment vanished, drawing isotropic direction");
                Ok(Direction {
                    unit: noise.unit_vector(),
                    drift_strength,
                    redraws: 1,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn last_increment_points_at_target() {
        let mut noise = NoiseGenerator::new(1);
        let state = StepState::new(4, Position::new(0.5, 0.0), Position::new(0.5, 2.0), 1, 0.5);
        let d = BridgeProjection.direct(&state, &mut noise).unwrap();
        assert!((d.unit.y - 1.0).abs() < 1e-12);
        assert_eq!(d.drift_strength, 1.0);
    }

    #[test]
    fn vanished_increment_redraws() {
        let mut noise = NoiseGenerator::new(2);
        let target = Position::new(1.0, 1.0);
        let state = StepState::new(4, target, target, 1, 0.5);
        let d = BridgeProjection.direct(&state, &mut noise).unwrap();
        assert_eq!(d.redraws, 1);
        assert!((d.unit.norm() - 1.0).abs() < 1e-12);
    }
}
