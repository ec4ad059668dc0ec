use tether_io::cli::{Cli, Commands, run_batch_command, run_sample_command};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sample(args) => run_sample_command(args)?,
        Commands::Batch { params, out_dir, seed } => {
            run_batch_command(&params, &out_dir, seed)?;
        }
    }

    Ok(())
}
