//! Command implementations

pub mod cache;
pub mod completions;
pub mod info;
pub mod list;
pub mod mirror;
pub mod sources;
pub mod sync;

use std::sync::Arc;

use anyhow::Result;
use depot::ops::Registry;
use depot::util::{GlobalContext, Shell};

use crate::cli::GlobalArgs;

/// Context and output shared by a single command invocation.
pub struct Session {
    pub ctx: GlobalContext,
    pub shell: Arc<Shell>,
}

impl Session {
    /// Load configuration according to the global flags.
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let mut ctx = match &global.home {
            Some(home) => GlobalContext::with_home(home.clone())?,
            None => GlobalContext::new()?,
        };
        ctx.load_config(global.config.as_deref())?;

        let shell = Arc::new(Shell::from_flags(global.quiet, global.verbose, global.color));
        Ok(Session { ctx, shell })
    }

    /// Wire up sources, indexes and the archive cache.
    pub fn registry(&self) -> Result<Registry> {
        Registry::from_context(&self.ctx, self.shell.clone())
    }
}
