use tether_core::{
    AnyDirector, BridgeError, BridgeGenerator, BridgeParams, BridgeRun, NoiseGenerator, Position,
    StepDirector, StepStatistics, F,
};
use nalgebra::Vector2;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use tracing::{info, warn};

/// Independent bridges sharing one parameter set
#[derive(Clone, Debug)]
pub struct Ensemble {
    pub params: BridgeParams,
    pub global_seed: u64,
    pub runs: Vec<BridgeRun>,
}

/// Statistical summary of an ensemble
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnsembleStats {
    pub n_paths: usize,
    pub mean_pre_correction_error: F,
    pub max_pre_correction_error: F,
    /// Pooled over the exact segment of every path.
    pub exact_steps: StepStatistics,
    /// Per index, standard deviation of the signed distance to the chord
    /// origin → target.
    pub lateral_spread: Vec<F>,
    pub total_redraws: u64,
}

/// Result of one row of a batch
#[derive(Clone, Debug)]
pub struct BatchOutcome {
    pub index: usize,
    pub params: BridgeParams,
    pub result: Result<BridgeRun, BridgeError>,
}

/// Main sampler for bridge generation
pub struct Sampler<D: StepDirector> {
    pub generator: BridgeGenerator<D>,
}

impl<D: StepDirector> Sampler<D> {
    pub fn new(generator: BridgeGenerator<D>) -> Self {
        Self { generator }
    }

    /// Run `n_paths` bridges in parallel. Path `p` draws from
    /// `NoiseGenerator::from_path_id(global_seed, p)`, so the result does not
    /// depend on the thread count.
    pub fn run_paths(
        &self,
        params: &BridgeParams,
        n_paths: usize,
        global_seed: u64,
    ) -> Result<Ensemble, BridgeError> {
        params.validate()?;

        let runs = (0..n_paths)
            .into_par_iter()
            .map(|path_id| {
                let mut noise = NoiseGenerator::from_path_id(global_seed, path_id as u64);
                self.generator.run(params, &mut noise)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(n_paths, n_steps = params.n_steps, global_seed, "ensemble complete");

        Ok(Ensemble {
            params: params.clone(),
            global_seed,
            runs,
        })
    }
}

impl Sampler<AnyDirector> {
    /// Sampler whose director follows `params.rule`.
    pub fn for_params(params: &BridgeParams) -> Self {
        Self::new(BridgeGenerator::new(AnyDirector::from(params.rule)))
    }
}

/// Run one bridge per parameter row. Each row picks its director from its own
/// `rule` and seeds from its own `seed`; a row without a seed falls back to
/// `fallback_seed` mixed with the row index. A failing row is logged and
/// recorded without stopping the others.
pub fn run_batch(rows: &[BridgeParams], fallback_seed: u64) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = rows
        .par_iter()
        .enumerate()
        .map(|(index, params)| {
            let mut noise = match params.seed {
                Some(seed) => NoiseGenerator::new(seed),
                None => NoiseGenerator::from_path_id(fallback_seed, index as u64),
            };
            let result = BridgeGenerator::new(AnyDirector::from(params.rule)).run(params, &mut noise);
            if let Err(ref err) = result {
                warn!(row = index, error = %err, "bridge run failed");
            }
            BatchOutcome {
                index,
                params: params.clone(),
                result,
            }
        })
        .collect();

    let failures = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(rows = rows.len(), failures, "batch complete");
    outcomes
}

impl Ensemble {
    pub fn n_paths(&self) -> usize {
        self.runs.len()
    }

    pub fn statistics(&self) -> EnsembleStats {
        if self.runs.is_empty() {
            return EnsembleStats::empty();
        }

        let errors: Vec<F> = self.runs.iter().map(|r| r.pre_correction_error()).collect();
        let mean_pre_correction_error = errors.iter().sum::<F>() / errors.len() as F;
        let max_pre_correction_error = errors.iter().copied().fold(0.0, F::max);

        let exact_lengths: Vec<F> = self
            .runs
            .iter()
            .flat_map(|r| r.trajectory.step_lengths().take(r.trajectory.exact_steps()))
            .collect();
        let exact_steps = StepStatistics::from_lengths(&exact_lengths, mean_final_distance(&self.runs));

        EnsembleStats {
            n_paths: self.runs.len(),
            mean_pre_correction_error,
            max_pre_correction_error,
            exact_steps,
            lateral_spread: self.lateral_spread(),
            total_redraws: self.runs.iter().map(|r| r.redraws as u64).sum(),
        }
    }

    /// Standard deviation of the signed distance to the chord at each index.
    pub fn lateral_spread(&self) -> Vec<F> {
        let n_points = self.params.n_steps as usize + 1;
        let normal = chord_normal(&self.params.target);
        let n = self.runs.len();

        (0..n_points)
            .map(|i| {
                let offsets: Vec<F> = self
                    .runs
                    .iter()
                    .map(|r| r.trajectory[i].0.dot(&normal))
                    .collect();
                let mean = offsets.iter().sum::<F>() / n as F;
                let var = offsets.iter().map(|o| (o - mean).powi(2)).sum::<F>() / (n - 1).max(1) as F;
                var.sqrt()
            })
            .collect()
    }
}

impl EnsembleStats {
    fn empty() -> Self {
        Self {
            n_paths: 0,
            mean_pre_correction_error: 0.0,
            max_pre_correction_error: 0.0,
            exact_steps: StepStatistics::from_lengths(&[], 0.0),
            lateral_spread: Vec::new(),
            total_redraws: 0,
        }
    }

    /// Index with the widest lateral spread.
    pub fn widest_index(&self) -> Option<usize> {
        self.lateral_spread
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }
}

/// Unit normal of the chord origin → target; the x axis's normal when the
/// target is the origin.
fn chord_normal(target: &Position) -> Vector2<F> {
    let norm = target.0.norm();
    if norm < tether_core::EPSILON {
        Vector2::new(0.0, 1.0)
    } else {
        Vector2::new(-target.y(), target.x()) / norm
    }
}

fn mean_final_distance(runs: &[BridgeRun]) -> F {
    let total: F = runs
        .iter()
        .filter_map(|r| r.trajectory.final_point().map(|p| p.distance_to(&r.target)))
        .sum();
    total / runs.len() as F
}
