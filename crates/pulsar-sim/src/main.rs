//! Pulsar simulator - runs the module's control core on the host.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pulsar-sim")]
#[command(author, version, about = "Pulsar module simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the device against a simulated panel and audio clock
    Run(commands::run::RunArgs),

    /// List the programs and their parameters
    Programs(commands::programs::ProgramsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Programs(args) => commands::programs::run(args),
    }
}
