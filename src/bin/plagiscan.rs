//! Plagiscan CLI - near-duplicate detection for code submissions
//!
//! Uploads, analyzes and reports on submissions stored under the configured
//! data directory.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands, GlobalOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Upload(args) => cli::upload_command(&ctx, args).await?,
        Commands::Analyze(args) => cli::analyze_command(&ctx, args).await?,
        Commands::Submit(args) => cli::submit_command(&ctx, args).await?,
        Commands::Batch(args) => cli::batch_command(&ctx, args).await?,
        Commands::Report(args) => cli::report_command(&ctx, args).await?,
        Commands::List(args) => cli::list_command(&ctx, args).await?,
        Commands::Health => cli::health_command(&ctx).await?,
        Commands::PrintDefaultConfig => cli::print_default_config().await?,
        Commands::InitConfig(args) => cli::init_config(args).await?,
        Commands::ValidateConfig => cli::validate_config(&ctx).await?,
    }

    Ok(())
}
