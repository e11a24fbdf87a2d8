mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cellvision", about = "Colored game-piece tracker for robot vision")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track the game piece in a recording or image sequence
    Run(commands::run::RunArgs),
    /// Run a single detection pass on one image
    Detect(commands::detect::DetectArgs),
    /// Track a synthetic moving disc
    Demo(commands::demo::DemoArgs),
    /// Show SER file metadata
    Info(commands::info::InfoArgs),
    /// Print the default configuration as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Detect(args) => commands::detect::run(args),
        Commands::Demo(args) => commands::demo::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
