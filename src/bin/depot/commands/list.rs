//! `depot list` command

use anyhow::Result;

use crate::cli::{GlobalArgs, ListArgs};
use crate::commands::Session;

pub fn execute(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    let registry = session.registry()?;

    let packages = match &args.pattern {
        Some(pattern) => registry.list_packages_matching(pattern, args.source.as_deref())?,
        None => registry.list_packages(args.source.as_deref())?,
    };

    if packages.is_empty() {
        session.shell.note("no packages found");
        return Ok(());
    }

    for id in packages {
        println!("{}", id);
    }
    Ok(())
}
