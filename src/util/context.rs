//! Global context for Depot operations.
//!
//! Provides centralized access to configuration, paths, and environment.
//!
//! ## Directory Layout
//!
//! ```text
//! <home>/
//! ├── config.toml        # global configuration
//! ├── index/             # package indexes, one tree per source
//! └── packages/          # cached archives
//! ```
//!
//! `storage.index_dir` and `storage.package_dir` override the defaults;
//! relative overrides are taken from the working directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};

use crate::util::config::{load_config, project_config_path, Config};

/// Environment variable overriding the Depot home directory.
pub const HOME_ENV: &str = "DEPOT_HOME";

/// Project directories for Depot
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "depot", "depot"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Depot data
    home: PathBuf,

    /// Merged configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext {
            cwd,
            home: default_home(),
            config: Config::default(),
        })
    }

    /// Create a context rooted at an explicit home directory.
    pub fn with_home(home: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.home = home;
        Ok(ctx)
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the global file
    /// is merged under the project file (`.depot/config.toml`), and either
    /// may be absent.
    pub fn load_config(&mut self, explicit: Option<&Path>) -> Result<()> {
        self.config = match explicit {
            Some(path) => {
                let mut config = Config::default();
                if self.config_path().exists() {
                    config.merge(Config::load(&self.config_path())?);
                }
                config.merge(Config::load(path)?);
                config
            }
            None => load_config(&self.config_path(), &project_config_path(&self.cwd)),
        };

        tracing::debug!("loaded configuration with {} sources", self.config.sources.len());
        Ok(())
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the Depot home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the index root.
    pub fn index_dir(&self) -> PathBuf {
        match &self.config.storage.index_dir {
            Some(dir) => self.cwd.join(dir),
            None => self.home.join("index"),
        }
    }

    /// Get the package cache directory.
    pub fn package_dir(&self) -> PathBuf {
        match &self.config.storage.package_dir {
            Some(dir) => self.cwd.join(dir),
            None => self.home.join("packages"),
        }
    }

    /// Request timeout for archive downloads.
    pub fn timeout(&self) -> Duration {
        self.config
            .net
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(crate::store::transport::DEFAULT_TIMEOUT)
    }

    /// Check if network access is disabled.
    pub fn offline(&self) -> bool {
        self.config.net.offline
    }
}

fn default_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }

    if let Some(dirs) = PROJECT_DIRS.as_ref() {
        dirs.data_dir().to_path_buf()
    } else {
        // Fallback to ~/.depot
        BaseDirs::new()
            .map(|b| b.home_dir().join(".depot"))
            .unwrap_or_else(|| PathBuf::from(".depot"))
    }
}
