//! tmplminer CLI
//!
//! Command-line tool for mining parameterized templates out of fleets of
//! network-device configurations (ACLs, IP prefix-lists).
//!
//! ## Subcommands
//!
//! ```text
//! tmplminer mine <input> -f <flavor> -p <pattern> [-o <dir>]   Mine a meta-template
//! tmplminer info <input> -f <flavor>                           List segment names
//! ```

mod args;
mod commands;
mod config;
mod devices;
mod error;
mod progress;

use args::Commands;
use clap::Parser;

/// tmplminer — discover parameterized templates across a fleet of
/// network device configurations.
#[derive(Parser, Debug)]
#[command(name = "tmplminer", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Mine(args) => commands::mine::run(args),
        Commands::Info(args) => commands::info::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
