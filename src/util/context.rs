//! Global context for gobuild operations.
//!
//! The GlobalContext holds per-invocation settings: the build root and the
//! location of the user-wide configuration directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::util::config::{self, Config, CONFIG_DIR};

/// Per-invocation settings shared by every operation.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Build root; every relative path in a build is relative to it
    root: PathBuf,

    /// Home directory for global gobuild data (~/.gobuild/), if known
    home: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a GlobalContext rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext {
            root: cwd,
            home: config::global_config_dir(),
        })
    }

    /// Create a GlobalContext with a specific build root.
    ///
    /// A relative `root` is taken relative to the current directory.
    pub fn with_root(root: impl AsRef<Path>) -> Result<Self> {
        let mut ctx = Self::new()?;
        let root = root.as_ref();
        ctx.root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            ctx.root.join(root)
        };

        if !ctx.root.is_dir() {
            bail!("build root {} is not a directory", ctx.root.display());
        }
        Ok(ctx)
    }

    /// Use a different global configuration directory.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Get the build root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the gobuild home directory (~/.gobuild/).
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Get the global configuration file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join(config::CONFIG_FILE))
    }

    /// Get the project-local gobuild directory.
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(CONFIG_DIR)
    }

    /// Get the project configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        config::project_config_path(&self.root)
    }

    /// Load the merged configuration for this invocation.
    pub fn load_config(&self) -> Config {
        config::load_config(
            self.global_config_path().as_deref(),
            &self.project_config_path(),
        )
    }
}
