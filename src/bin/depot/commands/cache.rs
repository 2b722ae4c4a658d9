//! `depot cache` command
//!
//! Manage the archive cache and local index copies.

use anyhow::Result;
use depot::util::fs::{dir_size, format_size, remove_dir_all_if_exists};
use depot::util::Status;

use crate::cli::{CacheArgs, CacheCleanArgs, CacheCommands, GlobalArgs};
use crate::commands::Session;

pub fn execute(args: CacheArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    match args.command {
        CacheCommands::List => list_cache(&session),
        CacheCommands::Size => show_size(&session),
        CacheCommands::Clean(clean_args) => clean_cache(&session, clean_args),
        CacheCommands::Path => show_path(&session),
    }
}

/// List cached archives.
fn list_cache(session: &Session) -> Result<()> {
    let registry = session.registry()?;
    let cached = registry.store().list_cached()?;

    if cached.is_empty() {
        session.shell.note("cache is empty");
        return Ok(());
    }

    for package in &cached {
        println!(
            "{}/{}@{} ({})",
            package.owner,
            package.name,
            package.version,
            format_size(package.size)
        );
    }
    Ok(())
}

/// Show cache disk usage.
fn show_size(session: &Session) -> Result<()> {
    let registry = session.registry()?;
    let archives = registry.store().get_cache_size()?;
    let count = registry.store().list_cached()?.len();
    let index = dir_size(registry.index().root())?;

    println!("Cache disk usage:");
    println!();
    println!("  Archives:  {} ({} files)", format_size(archives), count);
    println!("  Indexes:   {}", format_size(index));
    println!();
    println!("  Total:     {}", format_size(archives + index));
    Ok(())
}

/// Remove cached archives, and optionally index copies.
fn clean_cache(session: &Session, args: CacheCleanArgs) -> Result<()> {
    let registry = session.registry()?;
    let store = registry.store();

    let mut cleaned_something = false;
    if store.root().exists() {
        store.clear_cache()?;
        session
            .shell
            .status(Status::Removed, store.root().display());
        cleaned_something = true;
    }

    if args.index {
        let index = registry.index().root();
        if index.exists() {
            remove_dir_all_if_exists(index)?;
            session.shell.status(Status::Removed, index.display());
            cleaned_something = true;
        }
    }

    if !cleaned_something {
        session.shell.note("nothing to clean");
    }
    Ok(())
}

/// Show the archive cache path.
fn show_path(session: &Session) -> Result<()> {
    println!("{}", session.ctx.package_dir().display());
    Ok(())
}
