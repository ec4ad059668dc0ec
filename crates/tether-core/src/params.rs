use crate::diffusion::diffusion_coefficient;
use crate::{BridgeError, BridgeResult, Position, F};
use serde::{Serialize, Deserialize};

/// How the last step reaches the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalMode {
    /// The step producing index `N` jumps straight onto the target.
    #[default]
    Snap,
    /// All `N` steps have length `delta`; the terminal corrector absorbs the
    /// residual over the correction window.
    Redistribute,
}

impl TerminalMode {
    /// Remaining step count the director sees while producing `index`.
    ///
    /// `index` runs over `1..=n_steps`. Zero means the step is forced onto the
    /// target; an index past `n_steps` also yields zero.
    pub fn remaining(self, n_steps: u32, index: u32) -> u32 {
        match self {
            TerminalMode::Snap => n_steps.saturating_sub(index),
            TerminalMode::Redistribute => n_steps.checked_sub(index).map_or(0, |r| r.saturating_add(1)),
        }
    }
}

/// Which step director drives the walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRuleKind {
    #[default]
    DriftBlend,
    Projection,
}

/// Inputs of one bridge run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeParams {
    pub target: Position,
    pub delta: F,
    pub n_steps: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub terminal: TerminalMode,
    #[serde(default)]
    pub rule: StepRuleKind,
}

impl BridgeParams {
    pub fn new(target: impl Into<Position>, delta: F, n_steps: u32) -> Self {
        Self {
            target: target.into(),
            delta,
            n_steps,
            seed: None,
            terminal: TerminalMode::default(),
            rule: StepRuleKind::default(),
        }
    }

    /// Builds parameters from a source that carries a signed step count,
    /// such as a CSV row.
    pub fn from_signed(
        target: impl Into<Position>,
        delta: F,
        n_steps: i64,
        seed: Option<u64>,
    ) -> BridgeResult<Self> {
        if n_steps < 0 {
            return Err(BridgeError::invalid("n_steps", format!("must be >= 0, got {}", n_steps)));
        }
        let n_steps = u32::try_from(n_steps)
            .map_err(|_| BridgeError::invalid("n_steps", format!("{} does not fit in u32", n_steps)))?;
        let params = Self::new(target, delta, n_steps).with_seed_option(seed);
        params.validate()?;
        Ok(params)
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_seed_option(Some(seed))
    }

    pub fn with_seed_option(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_terminal(mut self, terminal: TerminalMode) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn with_rule(mut self, rule: StepRuleKind) -> Self {
        self.rule = rule;
        self
    }

    /// `delta² / 6`, used by the projection rule.
    pub fn diffusion(&self) -> F {
        diffusion_coefficient(self.delta)
    }

    /// Longest distance the walk could cover, `delta · N`.
    pub fn contour_length(&self) -> F {
        self.delta * self.n_steps as F
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if !self.delta.is_finite() {
            return Err(BridgeError::invalid("delta", format!("must be finite, got {}", self.delta)));
        }
        if self.delta <= 0.0 {
            return Err(BridgeError::invalid("delta", format!("must be > 0, got {}", self.delta)));
        }
        if !self.target.is_finite() {
            return Err(BridgeError::invalid(
                "target",
                format!("must be finite, got ({}, {})", self.target.x(), self.target.y()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_delta() {
        for delta in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let err = BridgeParams::new((1.0, 1.0), delta, 10).validate().unwrap_err();
            assert!(matches!(err, BridgeError::InvalidParameter { name: "delta", .. }));
        }
    }

    #[test]
    fn rejects_non_finite_target() {
        let err = BridgeParams::new((f64::NAN, 0.0), 0.1, 10).validate().unwrap_err();
        assert!(matches!(err, BridgeError::InvalidParameter { name: "target", .. }));
    }

    #[test]
    fn rejects_negative_step_count() {
        let err = BridgeParams::from_signed((1.0, 0.0), 0.1, -3, None).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidParameter { name: "n_steps", .. }));

        let ok = BridgeParams::from_signed((1.0, 0.0), 0.1, 3, Some(5)).unwrap();
        assert_eq!(ok.n_steps, 3);
        assert_eq!(ok.seed, Some(5));
    }

    #[test]
    fn remaining_counts_per_mode() {
        assert_eq!(TerminalMode::Snap.remaining(4, 1), 3);
        assert_eq!(TerminalMode::Snap.remaining(4, 4), 0);
        assert_eq!(TerminalMode::Redistribute.remaining(4, 1), 4);
        assert_eq!(TerminalMode::Redistribute.remaining(4, 4), 1);
    }

    #[test]
    fn remaining_past_the_end_is_zero() {
        assert_eq!(TerminalMode::Snap.remaining(4, 5), 0);
        assert_eq!(TerminalMode::Snap.remaining(0, 1), 0);
        assert_eq!(TerminalMode::Redistribute.remaining(4, 5), 0);
        assert_eq!(TerminalMode::Redistribute.remaining(4, 9), 0);
        assert_eq!(TerminalMode::Redistribute.remaining(u32::MAX, u32::MAX), 1);
    }

    #[test]
    fn derived_diffusion() {
        let params = BridgeParams::new((0.0, 0.0), 0.6, 1);
        assert!((params.diffusion() - 0.06).abs() < 1e-15);
    }
}
