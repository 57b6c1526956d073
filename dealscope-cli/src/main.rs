use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod intelligence;
mod paths;

#[derive(Parser)]
#[command(name = "dealscope", about = "Startup investment analysis pipeline")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a company from extracted profile documents
    Analyze(commands::analyze::AnalyzeArgs),
    /// Show a stored analysis
    Show(commands::show::ShowArgs),
    /// Recompute scores of a completed analysis with new weights
    Reweight(commands::reweight::ReweightArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args).await,
        Commands::Show(args) => commands::show::run(args).await,
        Commands::Reweight(args) => commands::reweight::run(args).await,
        Commands::Config(args) => commands::config::run(args),
    }
}
