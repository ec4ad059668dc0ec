use crate::{is_plain_label, read_batch_rows, write_ensemble_with_manifest, write_runs_with_manifest, RunManifest};
use tether_core::{BridgeParams, StepRuleKind, TerminalMode};
use tether_sampler::{run_batch, Sampler};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Fixed-step stochastic bridges in the plane")]
#[command(long_about = "Random walks with a fixed step length that start at the origin and end exactly on a target")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sample an ensemble of bridges for one parameter set and write to Parquet
    Sample(SampleArgs),

    /// Run one bridge per row of a CSV parameter file
    Batch {
        /// CSV with columns label,target_x,target_y,delta,n_steps,seed[,rule,terminal]
        #[arg(long)]
        params: PathBuf,

        /// Directory receiving <label>.parquet and <label>.manifest.json
        #[arg(long)]
        out_dir: PathBuf,

        /// Base seed for rows with an empty seed column, mixed with the row index
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Target x coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub target_x: f64,

    /// Target y coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub target_y: f64,

    /// Step length
    #[arg(long)]
    pub delta: f64,

    /// Number of steps
    #[arg(long)]
    pub steps: u32,

    /// Number of paths to simulate
    #[arg(long, default_value = "1")]
    pub paths: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Step rule
    #[arg(long, value_enum, default_value = "drift-blend")]
    pub rule: RuleType,

    /// How the last step reaches the target
    #[arg(long, value_enum, default_value = "snap")]
    pub terminal: TerminalType,

    /// Output Parquet file
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum RuleType {
    #[value(name = "drift-blend")]
    DriftBlend,
    #[value(name = "projection")]
    Projection,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum TerminalType {
    #[value(name = "snap")]
    Snap,
    #[value(name = "redistribute")]
    Redistribute,
}

impl From<RuleType> for StepRuleKind {
    fn from(rule: RuleType) -> Self {
        match rule {
            RuleType::DriftBlend => StepRuleKind::DriftBlend,
            RuleType::Projection => StepRuleKind::Projection,
        }
    }
}

impl From<TerminalType> for TerminalMode {
    fn from(terminal: TerminalType) -> Self {
        match terminal {
            TerminalType::Snap => TerminalMode::Snap,
            TerminalType::Redistribute => TerminalMode::Redistribute,
        }
    }
}

pub fn run_sample_command(args: SampleArgs) -> anyhow::Result<()> {
    println!("Tether Sampling");
    println!("===============");
    println!("Target: ({}, {})", args.target_x, args.target_y);
    println!("Delta: {}", args.delta);
    println!("Steps: {}", args.steps);
    println!("Paths: {}", args.paths);
    println!("Rule: {:?}", args.rule);
    println!("Terminal: {:?}", args.terminal);
    println!("Seed: {}", args.seed);
    println!("Output: {:?}", args.out);

    let params = BridgeParams::new((args.target_x, args.target_y), args.delta, args.steps)
        .with_seed(args.seed)
        .with_rule(args.rule.into())
        .with_terminal(args.terminal.into());

    let ensemble = Sampler::for_params(&params)
        .run_paths(&params, args.paths, args.seed)
        .context("sampling failed")?;

    let manifest = RunManifest::new(&params, None);
    write_ensemble_with_manifest(&ensemble, &manifest, &args.out)?;

    if let Some(first) = ensemble.runs.first() {
        first.validation().log();
    }

    let stats = ensemble.statistics();
    println!();
    println!("Summary Statistics:");
    println!("==================");
    println!("Paths completed: {}", stats.n_paths);
    println!("Exact step length: mean {:.9}, std {:.3e}, min {:.9}, max {:.9}",
             stats.exact_steps.mean, stats.exact_steps.std, stats.exact_steps.min, stats.exact_steps.max);
    println!("Pre-correction endpoint error: mean {:.6}, max {:.6}",
             stats.mean_pre_correction_error, stats.max_pre_correction_error);
    if let Some(widest) = stats.widest_index() {
        println!("Widest lateral spread: {:.4} at step {}", stats.lateral_spread[widest], widest);
    }
    if stats.total_redraws > 0 {
        println!("Direction redraws: {}", stats.total_redraws);
    }

    println!("✓ Simulation completed successfully!");

    Ok(())
}

/// Outcome counts of one `tether batch` invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: usize,
    pub failures: usize,
}

pub fn run_batch_command(params_path: &Path, out_dir: &Path, fallback_seed: u64) -> anyhow::Result<BatchSummary> {
    let rows = read_batch_rows(params_path)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    // The first row carrying a label owns its output file. Seeds resolve
    // against the row's position in the file, before any row is filtered out.
    let mut claimed = HashSet::new();
    let mut labels = Vec::new();
    let mut params = Vec::new();
    let mut summary = BatchSummary::default();
    for (index, row) in rows.iter().enumerate() {
        if !is_plain_label(&row.label) {
            warn!(row = index, label = %row.label, "batch label is not a plain file name");
            summary.failures += 1;
            continue;
        }
        if !claimed.insert(row.label.as_str()) {
            warn!(row = index, label = %row.label, "duplicate batch label");
            summary.failures += 1;
            continue;
        }
        match row.to_params(index, fallback_seed) {
            Ok(p) => {
                labels.push(row.label.as_str());
                params.push(p);
            }
            Err(err) => {
                warn!(row = index, label = %row.label, error = %err, "skipping batch row");
                summary.failures += 1;
            }
        }
    }

    for outcome in run_batch(&params, fallback_seed) {
        let label = labels[outcome.index];
        let run = match outcome.result {
            Ok(run) => run,
            Err(_) => {
                summary.failures += 1;
                continue;
            }
        };

        let manifest = RunManifest::new(&outcome.params, Some(label));
        let out = out_dir.join(format!("{}.parquet", label));
        match write_runs_with_manifest([&run], &manifest, &out) {
            Ok(()) => {
                run.validation().log();
                summary.written += 1;
            }
            Err(err) => {
                warn!(label = %label, error = %err, "failed to write batch output");
                summary.failures += 1;
            }
        }
    }

    info!(rows = rows.len(), written = summary.written, failures = summary.failures, "batch finished");
    println!("Batch: {} written, {} failed", summary.written, summary.failures);

    if summary.written == 0 && !rows.is_empty() {
        bail!("every batch row failed");
    }
    Ok(summary)
}
