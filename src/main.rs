//! ChurnGuard - Main Entry Point

use churnguard::cli::{cmd_evaluate, cmd_generate, cmd_predict, cmd_stats, Cli, Commands};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churnguard=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { run, head, output } => {
            cmd_generate(&run, head, output.as_deref())?;
        }
        Commands::Stats { run, filter } => {
            cmd_stats(&run, &filter)?;
        }
        Commands::Evaluate { run, no_cv, json } => {
            cmd_evaluate(&run, no_cv, json)?;
        }
        Commands::Predict { run, model, profile } => {
            cmd_predict(&run, model, profile)?;
        }
    }

    Ok(())
}
