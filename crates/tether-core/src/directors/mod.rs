pub mod drift_blend;
pub mod projection;
pub mod helpers;

use crate::{BridgeResult, NoiseGenerator, StepRuleKind, F};
use crate::drift::{Direction, StepDirector, StepState};

pub use drift_blend::{drift_strength, DriftBlend};
pub use projection::BridgeProjection;

/// Upper clamp on the drift strength; keeps a random component in every step.
pub const MAX_DRIFT_STRENGTH: F = 0.9;

/// Fresh random vectors a director may draw for one step before giving up.
pub const MAX_REDRAWS: u32 = 8;

/// Director chosen at runtime from a [`StepRuleKind`].
#[derive(Clone, Copy, Debug)]
pub enum AnyDirector {
    DriftBlend(DriftBlend),
    Projection(BridgeProjection),
}

impl From<StepRuleKind> for AnyDirector {
    fn from(kind: StepRuleKind) -> Self {
        match kind {
            StepRuleKind::DriftBlend => AnyDirector::DriftBlend(DriftBlend),
            StepRuleKind::Projection => AnyDirector::Projection(BridgeProjection),
        }
    }
}

impl StepDirector for AnyDirector {
    fn direct(&self, state: &StepState, noise: &mut NoiseGenerator) -> BridgeResult<Direction> {
        match self {
            AnyDirector::DriftBlend(d) => d.direct(state, noise),
            AnyDirector::Projection(d) => d.direct(state, noise),
        }
    }
}
