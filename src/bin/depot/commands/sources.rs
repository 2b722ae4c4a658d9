//! `depot sources` command

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::Session;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    let registry = session.registry()?;
    let sources = registry.sources();

    if sources.is_empty() {
        session
            .shell
            .note("no sources configured\nhint: add a [[sources]] table to config.toml");
        return Ok(());
    }

    let default = sources.default_source().map(|s| s.name.clone());

    // Fallback order first, then disabled sources
    let mut ordered: Vec<_> = sources.list_enabled_sources();
    let mut disabled: Vec<_> = sources.sources().iter().filter(|s| !s.enabled).collect();
    disabled.sort_by_key(|s| s.priority);
    ordered.extend(disabled);

    println!(
        "  {:<16} {:>8}  {:<10} {:<6} {:<9} URL",
        "NAME", "PRIORITY", "TYPE", "INDEX", "STATUS"
    );
    for source in ordered {
        let marker = if default.as_deref() == Some(source.name.as_str()) {
            "*"
        } else {
            " "
        };
        let status = if source.enabled { "enabled" } else { "disabled" };
        println!(
            "{} {:<16} {:>8}  {:<10} {:<6} {:<9} {}",
            marker,
            source.name,
            source.priority,
            source.kind.to_string(),
            source.index_kind.to_string(),
            status,
            source.base_url
        );
    }

    Ok(())
}
