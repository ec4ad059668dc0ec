use tether_core::{BridgeParams, StepRuleKind, TerminalMode};
use tether_sampler::Sampler;
use clap::{Parser, ValueEnum};
use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::PathBuf;

#[derive(Clone, Debug, ValueEnum)]
enum Rule {
    DriftBlend,
    Projection,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Lateral spread of a bridge ensemble, saved to Parquet")]
struct Args {
    #[arg(long, default_value_t = 5000)]
    paths: usize,

    #[arg(long, default_value_t = 100)]
    steps: u32,

    #[arg(long, default_value_t = 0.5)]
    delta: f64,

    #[arg(long, default_value_t = 5.0, allow_hyphen_values = true)]
    target_x: f64,

    #[arg(long, default_value_t = 3.0, allow_hyphen_values = true)]
    target_y: f64,

    #[arg(long, value_enum, default_value = "drift-blend")]
    rule: Rule,

    #[arg(long)]
    redistribute: bool,

    #[arg(long, default_value = "runs/bridge_spread.parquet")]
    out: PathBuf,

    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let rule = match args.rule {
        Rule::DriftBlend => StepRuleKind::DriftBlend,
        Rule::Projection => StepRuleKind::Projection,
    };
    let terminal = if args.redistribute { TerminalMode::Redistribute } else { TerminalMode::Snap };
    let params = BridgeParams::new((args.target_x, args.target_y), args.delta, args.steps)
        .with_rule(rule)
        .with_terminal(terminal);

    println!("Sampling {} bridges with {} steps (delta={})", args.paths, args.steps, args.delta);
    println!("Target: ({}, {}), rule: {:?}, terminal: {:?}", args.target_x, args.target_y, rule, terminal);

    let ensemble = Sampler::for_params(&params).run_paths(&params, args.paths, args.seed)?;
    let stats = ensemble.statistics();

    // Mean position per step alongside the spread
    let n_points = args.steps as usize + 1;
    let mut mean_x = vec![0.0; n_points];
    let mut mean_y = vec![0.0; n_points];
    for run in &ensemble.runs {
        for (i, p) in run.trajectory.iter().enumerate() {
            mean_x[i] += p.x() / ensemble.n_paths() as f64;
            mean_y[i] += p.y() / ensemble.n_paths() as f64;
        }
    }

    let mut df = DataFrame::new(vec![
        Series::new("step", (0..n_points as u32).collect::<Vec<_>>()),
        Series::new("mean_x", mean_x),
        Series::new("mean_y", mean_y),
        Series::new("lateral_spread", stats.lateral_spread.clone()),
    ])?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    ParquetWriter::new(&mut file).finish(&mut df)?;

    println!("Saved {} rows to {}", df.height(), args.out.display());

    println!("\nEnsemble statistics:");
    println!("Exact step length mean: {:.9} (std {:.3e})", stats.exact_steps.mean, stats.exact_steps.std);
    println!("Pre-correction error: mean {:.6}, max {:.6}",
             stats.mean_pre_correction_error, stats.max_pre_correction_error);
    if let Some(widest) = stats.widest_index() {
        println!("Widest spread {:.4} at step {} of {}", stats.lateral_spread[widest], widest, args.steps);
    }

    Ok(())
}
