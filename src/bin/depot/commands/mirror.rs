//! `depot mirror` command

use anyhow::{bail, Result};
use depot::ops::MirrorOptions;

use crate::cli::{GlobalArgs, MirrorArgs};
use crate::commands::Session;

pub fn execute(args: MirrorArgs, global: &GlobalArgs) -> Result<()> {
    if !args.full && args.patterns.is_empty() {
        bail!("no packages selected\nhint: pass one or more patterns such as `acme/*`, or use --full");
    }

    let session = Session::new(global)?;
    let mut registry = session.registry()?;
    if let Some(jobs) = args.jobs {
        registry = registry.with_jobs(jobs);
    }

    let opts = MirrorOptions {
        patterns: args.patterns,
        full: args.full,
        strict: args.strict,
        quiet: global.quiet,
        source: args.source,
    };
    let report = registry.mirror(&opts)?;

    if !report.is_success() {
        bail!("{} packages or versions failed to mirror", report.failed);
    }
    Ok(())
}
