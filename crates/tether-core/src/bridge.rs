use crate::drift::{StepDirector, StepState};
use crate::measure::{validate, validate_exact, ValidationReport};
use crate::{
    AnyDirector, BridgeParams, BridgeResult, CorrectionReport, DriftBlend, FixedMagnitudeStepper,
    NoiseGenerator, Position, Step, TerminalCorrector, TerminalMode, Trajectory, F,
};
use tracing::debug;

/// A finished bridge together with what happened while building it.
#[derive(Clone, Debug)]
pub struct BridgeRun {
    pub trajectory: Trajectory,
    pub target: Position,
    pub correction: CorrectionReport,
    /// Drift strength used for each directed step, in order.
    pub drift_strengths: Vec<F>,
    pub redraws: u32,
}

impl BridgeRun {
    pub fn pre_correction_error(&self) -> F {
        self.correction.magnitude()
    }

    pub fn validation(&self) -> ValidationReport {
        ValidationReport {
            all_steps: validate(&self.trajectory, &self.target),
            exact_steps: validate_exact(&self.trajectory, &self.target),
            pre_correction_error: self.pre_correction_error(),
        }
    }
}

/// Director → stepper loop followed by terminal correction.
#[derive(Clone, Debug)]
pub struct BridgeGenerator<D: StepDirector> {
    director: D,
    corrector: TerminalCorrector,
}

impl<D: StepDirector> BridgeGenerator<D> {
    pub fn new(director: D) -> Self {
        Self {
            director,
            corrector: TerminalCorrector::default(),
        }
    }

    pub fn with_corrector(mut self, corrector: TerminalCorrector) -> Self {
        self.corrector = corrector;
        self
    }

    pub fn director(&self) -> &D {
        &self.director
    }

    pub fn corrector(&self) -> &TerminalCorrector {
        &self.corrector
    }

    /// Builds one bridge. `noise` supplies every random draw; `params.seed`
    /// is not consulted here.
    pub fn run(&self, params: &BridgeParams, noise: &mut NoiseGenerator) -> BridgeResult<BridgeRun> {
        params.validate()?;

        let n = params.n_steps;
        let target = params.target;
        let origin = Position::origin();
        let mut points = Vec::with_capacity(n as usize + 1);
        points.push(origin);

        if n == 0 {
            return Ok(BridgeRun {
                trajectory: Trajectory::from_parts(points, params.delta, 0),
                target,
                correction: CorrectionReport::skipped(target.0 - origin.0),
                drift_strengths: Vec::new(),
                redraws: 0,
            });
        }

        let stepper = FixedMagnitudeStepper::new(params.delta);
        let mut drift_strengths = Vec::with_capacity(n as usize);
        let mut redraws = 0;
        let mut position = origin;

        for step in 1..=n {
            let remaining = params.terminal.remaining(n, step);
            position = if remaining == 0 {
                stepper.advance(&position, Step::ToTarget, &target)
            } else {
                let state = StepState::new(step, position, target, remaining, params.delta);
                let direction = self.director.direct(&state, noise)?;
                drift_strengths.push(direction.drift_strength);
                redraws += direction.redraws;
                stepper.advance(&position, Step::Directed(direction.unit), &target)
            };
            points.push(position);
        }

        let correction = self.corrector.apply(&mut points, &target);
        let approximate_tail = match params.terminal {
            TerminalMode::Snap => 1,
            TerminalMode::Redistribute => correction.window,
        };

        debug!(
            n_steps = n,
            pre_correction_error = correction.magnitude(),
            window = correction.window,
            redraws,
            "bridge complete"
        );

        Ok(BridgeRun {
            trajectory: Trajectory::from_parts(points, params.delta, approximate_tail),
            target,
            correction,
            drift_strengths,
            redraws,
        })
    }
}

/// Runs `params` with the director named by `params.rule`, seeding from
/// `params.seed` (or OS entropy when absent).
pub fn simulate(params: &BridgeParams) -> BridgeResult<BridgeRun> {
    let mut noise = NoiseGenerator::from_seed_option(params.seed);
    BridgeGenerator::new(AnyDirector::from(params.rule)).run(params, &mut noise)
}

/// Fixed-step bridge from the origin to `target` with the drift-blend rule.
///
/// Returns `n_steps + 1` points; the last one equals `target`. With
/// `n_steps == 0` the result is just the origin.
pub fn generate_bridge(
    target: (F, F),
    delta: F,
    n_steps: u32,
    seed: Option<u64>,
) -> BridgeResult<Trajectory> {
    let params = BridgeParams::new(target, delta, n_steps).with_seed_option(seed);
    let mut noise = NoiseGenerator::from_seed_option(seed);
    BridgeGenerator::new(DriftBlend)
        .run(&params, &mut noise)
        .map(|run| run.trajectory)
}
