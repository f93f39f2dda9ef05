//! Build context - build root, toolchain and output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::builder::toolchain::{detect_toolchain, Toolchain};
use crate::core::package::PackageNode;
use crate::util::config::Config;
use crate::util::shell::Shell;

/// Build status of a node within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    #[default]
    Unvisited,
    InProgress,
    Compiled,
    Failed,
}

impl BuildState {
    /// Compiled and Failed are final for the rest of the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Compiled | BuildState::Failed)
    }
}

/// Everything a build needs besides the registry and the runner.
#[derive(Clone)]
pub struct BuildContext {
    /// Build root; every command runs here and every artifact path is relative to it
    pub root: PathBuf,

    /// Toolchain implementation
    pub toolchain: Arc<dyn Toolchain>,

    /// User-facing output
    pub shell: Arc<Shell>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.root)
            .field("arch", &self.toolchain.arch())
            .finish()
    }
}

impl BuildContext {
    /// Create a build context from explicit parts.
    pub fn new(root: impl Into<PathBuf>, toolchain: Arc<dyn Toolchain>, shell: Arc<Shell>) -> Self {
        BuildContext {
            root: root.into(),
            toolchain,
            shell,
        }
    }

    /// Create a build context, detecting the toolchain from configuration.
    pub fn detect(root: &Path, config: &Config, shell: Arc<Shell>) -> Result<Self> {
        let toolchain: Arc<dyn Toolchain> = Arc::new(detect_toolchain(&config.toolchain)?);
        Ok(BuildContext::new(root, toolchain, shell))
    }

    /// Get the active toolchain.
    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Object file of a node, relative to the root.
    pub fn object_path(&self, node: &PackageNode) -> PathBuf {
        node.artifact_path(self.toolchain.object_extension())
    }

    /// Archive of a node, relative to the root.
    pub fn archive_path(&self, node: &PackageNode) -> PathBuf {
        node.artifact_path(self.toolchain.archive_extension())
    }

    /// Executable of an entry node, relative to the root.
    pub fn executable_path(&self, node: &PackageNode) -> PathBuf {
        node.artifact_path("")
    }

    /// Resolve a root-relative path.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}
