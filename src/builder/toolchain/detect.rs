//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use crate::builder::errors::BuildError;
use crate::util::config::ToolchainSettings;
use crate::util::process::{find_executable, find_executable_in};

use super::{Arch, GcToolchain};

/// Determine the target architecture.
///
/// The configured `arch` wins, then `$GOARCH`, then the host architecture.
fn resolve_arch_with(config: &ToolchainSettings, goarch: Option<&str>) -> Result<Arch, BuildError> {
    if let Some(arch) = &config.arch {
        return Arch::from_goarch(arch);
    }
    match goarch {
        Some(arch) if !arch.is_empty() => Arch::from_goarch(arch),
        _ => Arch::host(),
    }
}

/// Detect the `gc` toolchain.
///
/// Every tool is looked up separately with the following priority:
/// 1. Path configured under `[toolchain]`
/// 2. The `$GOBIN` directory
/// 3. PATH
pub fn detect_toolchain(config: &ToolchainSettings) -> Result<GcToolchain, BuildError> {
    let goarch = std::env::var("GOARCH").ok();
    let gobin = std::env::var_os("GOBIN").map(PathBuf::from);
    detect_toolchain_with(config, goarch.as_deref(), gobin.as_deref())
}

fn detect_toolchain_with(
    config: &ToolchainSettings,
    goarch: Option<&str>,
    gobin: Option<&Path>,
) -> Result<GcToolchain, BuildError> {
    let arch = resolve_arch_with(config, goarch)?;
    if config.has_overrides() {
        tracing::debug!("toolchain programs configured under [toolchain]");
    }

    let compiler = resolve_tool(
        config.compiler.as_deref(),
        &GcToolchain::compiler_name(arch),
        gobin,
    )?;
    let linker = resolve_tool(
        config.linker.as_deref(),
        &GcToolchain::linker_name(arch),
        gobin,
    )?;
    let archiver = resolve_tool(
        config.archiver.as_deref(),
        GcToolchain::archiver_name(),
        gobin,
    )?;

    tracing::info!(
        "Using {} toolchain: compiler={}, linker={}, archiver={}",
        arch,
        compiler.display(),
        linker.display(),
        archiver.display()
    );

    Ok(GcToolchain::new(arch, compiler, linker, archiver))
}

fn resolve_tool(
    configured: Option<&Path>,
    name: &str,
    gobin: Option<&Path>,
) -> Result<PathBuf, BuildError> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        // A bare program name is looked up in PATH
        if path.components().count() == 1 {
            if let Some(found) = find_executable(&path.to_string_lossy()) {
                return Ok(found);
            }
        }
        return Err(BuildError::ToolNotFound {
            tool: path.display().to_string(),
        });
    }

    if let Some(dir) = gobin {
        if let Some(found) = find_executable_in(name, dir) {
            return Ok(found);
        }
        tracing::debug!("{} not found in GOBIN {}", name, dir.display());
    }

    find_executable(name).ok_or_else(|| BuildError::ToolNotFound {
        tool: name.to_string(),
    })
}
