//! Depot CLI - a source-aware registry mirror

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; RUST_LOG wins when set
    let default = if cli.global.verbose {
        "depot=debug"
    } else if cli.global.quiet {
        "depot=error"
    } else {
        "depot=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    let global = &cli.global;
    match cli.command {
        Commands::Mirror(args) => commands::mirror::execute(args, global),
        Commands::Sync(args) => commands::sync::execute(args, global),
        Commands::List(args) => commands::list::execute(args, global),
        Commands::Info(args) => commands::info::execute(args, global),
        Commands::Sources => commands::sources::execute(global),
        Commands::Cache(args) => commands::cache::execute(args, global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
