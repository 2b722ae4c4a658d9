//! `depot sync` command

use anyhow::Result;
use depot::index::SyncOutcome;
use depot::util::Status;

use crate::cli::{GlobalArgs, SyncArgs};
use crate::commands::Session;

pub fn execute(args: SyncArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    let registry = session.registry()?;

    let source = registry.resolve_source(args.source.as_deref())?;
    let dir = registry.index().source_dir(source);

    match registry.sync(Some(&source.name))? {
        SyncOutcome::Cloned => session
            .shell
            .status(Status::Updated, format!("cloned index into {}", dir.display())),
        SyncOutcome::Updated => session
            .shell
            .status(Status::Updated, format!("index at {}", dir.display())),
        SyncOutcome::Unsynced => {}
    }
    Ok(())
}
