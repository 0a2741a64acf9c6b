//! Depmap CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "depmap")]
#[command(about = "Dependency map, cycle and coupling analysis over file summaries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML or TOML file with analysis settings
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a JSON file of file summaries and render the results
    Analyze(commands::AnalyzeArgs),
    /// List the supported output formats
    Formats,
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so rendered documents on stdout stay clean
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "depmap={lvl},depmap_core={lvl},depmap_export={lvl}",
            lvl = log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze(args) => commands::analyze(args, cli.config.as_deref()),
        Commands::Formats => {
            commands::formats();
            Ok(())
        }
        Commands::Version => {
            println!("depmap v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
