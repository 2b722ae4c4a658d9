//! `depot info` command

use anyhow::{bail, Context, Result};
use depot::PackageId;

use crate::cli::{GlobalArgs, InfoArgs};
use crate::commands::Session;

pub fn execute(args: InfoArgs, global: &GlobalArgs) -> Result<()> {
    let id: PackageId = args
        .package
        .parse()
        .with_context(|| format!("invalid package id `{}`", args.package))?;

    let session = Session::new(global)?;
    let registry = session.registry()?;
    let source = registry.resolve_source(args.source.as_deref())?;

    let Some(metadata) = registry.get_package(&id, Some(&source.name))? else {
        bail!("package `{}` not found in source `{}`", id, source.name);
    };

    println!("{} (source: {})", id, source.name);
    match metadata.latest() {
        Some(latest) => println!("latest: {}", latest.version),
        None => println!("latest: (none, every version is yanked)"),
    }
    println!();

    println!("versions:");
    for version in &metadata.versions {
        let mut flags = Vec::new();
        if version.is_yanked() {
            flags.push("yanked");
        }
        if registry.has_package(&id, &version.version) {
            flags.push("cached");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("  {}{}", version.version, flags);
    }

    if let Some(latest) = metadata.latest() {
        if !latest.deps.is_empty() {
            println!();
            println!("dependencies of {}:", latest.version);
            for (dep, req) in &latest.deps {
                println!("  {} {}", dep, req);
            }
        }
    }

    Ok(())
}
