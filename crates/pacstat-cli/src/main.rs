use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    baseline::{self, BaselineArgs},
    config::{self, ConfigArgs},
    merge::{self, MergeArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "pacstat", about = "Merge PAC search benchmark tables and compute gains")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge every domain's algorithm tables and add gain columns.
    Merge(MergeArgs),
    /// Annotate a Basic conditions summary with its delta-zero expansions.
    Baseline(BaselineArgs),
    /// Print the effective pipeline configuration as YAML.
    Config(ConfigArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Command::Merge(args) => merge::run(&args),
        Command::Baseline(args) => baseline::run(&args),
        Command::Config(args) => config::run(&args),
    }
}
