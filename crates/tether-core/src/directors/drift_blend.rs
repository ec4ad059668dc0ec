use super::helpers::normalize;
use super::{MAX_DRIFT_STRENGTH, MAX_REDRAWS};
use crate::drift::{Direction, StepDirector, StepState};
use crate::{BridgeError, BridgeResult, NoiseGenerator, F};
use nalgebra::Vector2;
use tracing::debug;

/// `dist / (delta · r)` clamped to `[0, MAX_DRIFT_STRENGTH]`.
///
/// The ratio is how much of the remaining contour the walk must spend heading
/// for the target. It can exceed one when the walk has wandered out of reach.
/// Directors are only consulted with `remaining >= 1`; a zero is read as one.
pub fn drift_strength(distance: F, delta: F, remaining: u32) -> F {
    (distance / (delta * remaining.max(1) as F)).clamp(0.0, MAX_DRIFT_STRENGTH)
}

/// Adaptive blend of the target direction with an isotropic random direction:
///
/// d = normalize(s · ê + sqrt(1 - s²) · u)
///
/// where `ê` points at the target, `u` is uniform on the unit circle and `s`
/// is the clamped [`drift_strength`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DriftBlend;

impl StepDirector for DriftBlend {
    fn direct(&self, state: &StepState, noise: &mut NoiseGenerator) -> BridgeResult<Direction> {
        if state.at_target() {
            return Ok(Direction::isotropic(noise));
        }

        let drift_direction = state.to_target / state.distance;
        let s = drift_strength(state.distance, state.delta, state.remaining);
        blend(state.step, drift_direction, s, || noise.unit_vector())
    }
}

/// Combines `drift_direction` with vectors from `draw` until the sum has a
/// usable length, giving up after `MAX_REDRAWS` fresh draws.
fn blend(
    step: u32,
    drift_direction: Vector2<F>,
    s: F,
    mut draw: impl FnMut() -> Vector2<F>,
) -> BridgeResult<Direction> {
    let random_weight = (1.0 - s * s).sqrt();

    for redraws in 0..=MAX_REDRAWS {
        let u = draw();
        if let Some(unit) = normalize(drift_direction * s + u * random_weight) {
            if redraws > 0 {
                debug!(step, redraws, "drift blend recovered from degenerate direction");
            }
            return Ok(Direction { unit, drift_strength: s, redraws });
        }
    }

    Err(BridgeError::DegenerateDirection {
        step,
        redraws: MAX_REDRAWS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn strength_is_clamped() {
        assert_eq!(drift_strength(10.0, 0.1, 5), MAX_DRIFT_STRENGTH);
        assert_eq!(drift_strength(0.0, 0.1, 5), 0.0);
        assert!((drift_strength(1.0, 0.5, 4) - 0.5).abs() < 1e-15);
        assert_eq!(drift_strength(3.0, 0.5, 4), MAX_DRIFT_STRENGTH);
    }

    #[test]
    fn zero_remaining_reads_as_one() {
        assert_eq!(drift_strength(0.2, 0.5, 0), drift_strength(0.2, 0.5, 1));
        assert_eq!(drift_strength(0.0, 0.5, 0), 0.0);
    }

    // With s = 1/sqrt(2) both weights match, so u = -ê cancels the drift term.
    const BALANCED: F = std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn cancelled_draw_is_redrawn() {
        let drift_direction = Vector2::new(1.0, 0.0);
        let mut draws = vec![Vector2::new(0.0, 1.0), -drift_direction, -drift_direction].into_iter().rev();
        let d = blend(4, drift_direction, BALANCED, || draws.next().unwrap()).unwrap();

        assert_eq!(d.redraws, 2);
        assert!((d.unit.norm() - 1.0).abs() < 1e-12);
        assert!(d.unit.x > 0.0 && d.unit.y > 0.0);
        assert_eq!(draws.next(), None);
    }

    #[test]
    fn persistent_cancellation_is_an_error() {
        let drift_direction = Vector2::new(0.0, -1.0);
        let mut calls = 0;
        let err = blend(7, drift_direction, BALANCED, || {
            calls += 1;
            -drift_direction
        })
        .unwrap_err();

        assert!(matches!(err, BridgeError::DegenerateDirection { step: 7, redraws: MAX_REDRAWS }));
        assert_eq!(calls, MAX_REDRAWS + 1);
    }

    #[test]
    fn directions_are_unit_and_report_strength() {
        let mut noise = NoiseGenerator::new(3);
        let state = StepState::new(1, Position::origin(), Position::new(2.0, 0.0), 10, 0.5);
        for _ in 0..500 {
            let d = DriftBlend.direct(&state, &mut noise).unwrap();
            assert!((d.unit.norm() - 1.0).abs() < 1e-12);
            assert!((d.drift_strength - 0.4).abs() < 1e-15);
        }
    }

    #[test]
    fn clamped_strength_still_leans_toward_target() {
        let mut noise = NoiseGenerator::new(9);
        let state = StepState::new(1, Position::origin(), Position::new(100.0, 0.0), 2, 0.1);
        let mean_x: f64 = (0..2000)
            .map(|_| DriftBlend.direct(&state, &mut noise).unwrap().unit.x)
            .sum::<f64>()
            / 2000.0;
        assert!(mean_x > 0.5, "mean x component {}", mean_x);
    }

    #[test]
    fn at_target_falls_back_to_isotropic() {
        let mut noise = NoiseGenerator::new(5);
        let target = Position::new(1.0, 1.0);
        let state = StepState::new(2, target, target, 3, 0.2);
        let d = DriftBlend.direct(&state, &mut noise).unwrap();
        assert_eq!(d.drift_strength, 0.0);
        assert!((d.unit.norm() - 1.0).abs() < 1e-12);
    }
}
