//! Configuration file support for gobuild.
//!
//! gobuild supports two configuration file locations:
//! - Global: `~/.gobuild/config.toml` - User-wide defaults
//! - Project: `<root>/.gobuild/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR: &str = ".gobuild";

/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// gobuild configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toolchain overrides
    pub toolchain: ToolchainSettings,

    /// Build settings
    pub build: BuildConfig,
}

/// Toolchain settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Target architecture (amd64, 386, arm); defaults to `$GOARCH`
    pub arch: Option<String>,

    /// Path to the compiler (e.g., /usr/local/go/bin/6g)
    pub compiler: Option<PathBuf>,

    /// Path to the linker (e.g., /usr/local/go/bin/6l)
    pub linker: Option<PathBuf>,

    /// Path to the archiver (e.g., /usr/local/go/bin/gopack)
    pub archiver: Option<PathBuf>,
}

impl ToolchainSettings {
    /// Check if any tool path is overridden.
    pub fn has_overrides(&self) -> bool {
        self.compiler.is_some() || self.linker.is_some() || self.archiver.is_some()
    }
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Read dot-prefixed files and directories
    pub include_hidden: Option<bool>,

    /// Build entry files without the shared `main` package files
    pub single_main: Option<bool>,

    /// Run benchmarks in test mode
    pub benchmarks: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't
    /// exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Toolchain settings
        if other.toolchain.arch.is_some() {
            self.toolchain.arch = other.toolchain.arch;
        }
        if other.toolchain.compiler.is_some() {
            self.toolchain.compiler = other.toolchain.compiler;
        }
        if other.toolchain.linker.is_some() {
            self.toolchain.linker = other.toolchain.linker;
        }
        if other.toolchain.archiver.is_some() {
            self.toolchain.archiver = other.toolchain.archiver;
        }

        // Build settings
        if other.build.include_hidden.is_some() {
            self.build.include_hidden = other.build.include_hidden;
        }
        if other.build.single_main.is_some() {
            self.build.single_main = other.build.single_main;
        }
        if other.build.benchmarks.is_some() {
            self.build.benchmarks = other.build.benchmarks;
        }
    }

    pub fn include_hidden(&self) -> bool {
        self.build.include_hidden.unwrap_or(false)
    }

    pub fn single_main(&self) -> bool {
        self.build.single_main.unwrap_or(false)
    }

    pub fn benchmarks(&self) -> bool {
        self.build.benchmarks.unwrap_or(false)
    }
}

/// Load configuration with proper precedence.
///
/// Loads global config first, then merges project config on top.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (`~/.gobuild`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the project config file path.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}
