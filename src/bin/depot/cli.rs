//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;
use depot::util::ColorChoice;

/// Depot - a source-aware mirror and offline cache for package registries
#[derive(Parser)]
#[command(name = "depot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Configuration file (default: global config merged with .depot/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Depot home directory
    #[arg(long, global = true, env = "DEPOT_HOME")]
    pub home: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mirror packages matching patterns into the local cache
    Mirror(MirrorArgs),

    /// Sync a source's package index
    Sync(SyncArgs),

    /// List packages in a source's index
    List(ListArgs),

    /// Show versions and dependencies of a package
    Info(InfoArgs),

    /// Show configured sources in fallback order
    Sources,

    /// Manage the archive cache
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct MirrorArgs {
    /// Package patterns (`owner/name`, `*` and `?` wildcards)
    pub patterns: Vec<String>,

    /// Mirror every package in the index
    #[arg(long, conflicts_with = "patterns")]
    pub full: bool,

    /// Do not follow dependencies
    #[arg(long)]
    pub strict: bool,

    /// Mirror from this source only
    #[arg(long)]
    pub source: Option<String>,

    /// Number of parallel downloads
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct SyncArgs {
    /// Source to sync (default: the default source)
    #[arg(long)]
    pub source: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only list packages matching this pattern
    pub pattern: Option<String>,

    /// Source to list (default: the default source)
    #[arg(long)]
    pub source: Option<String>,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Package id (`owner/name`)
    pub package: String,

    /// Source to query (default: the default source)
    #[arg(long)]
    pub source: Option<String>,
}

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// List cached archives
    List,

    /// Show disk usage
    Size,

    /// Remove cached archives
    Clean(CacheCleanArgs),

    /// Print the cache directory
    Path,
}

#[derive(Args)]
pub struct CacheCleanArgs {
    /// Also remove local index copies
    #[arg(long)]
    pub index: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: CompletionShell,
}
