//! The discovery pass shared by every build mode.

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::builder::events::BuildEvent;
use crate::core::registry::PackageRegistry;
use crate::sources::{discover, DiscoveryOptions, GoScanner};

/// Discover the tree under the build root and report what was found.
///
/// Warnings are printed and dropped; only a missing root is an error.
pub fn discover_packages(
    ctx: &BuildContext,
    options: DiscoveryOptions,
    mode: &str,
) -> Result<PackageRegistry> {
    let discovered = discover(&ctx.root, &GoScanner::new(), options)?;

    for warning in &discovered.warnings {
        ctx.shell().warn(warning);
    }

    let registry = discovered.registry;
    tracing::info!(
        "discovered {} files in {} packages, {} entry files",
        registry.file_count(),
        registry.package_count(),
        registry.entry_count()
    );

    if ctx.shell().is_json() {
        let event = BuildEvent::started(
            mode,
            ctx.toolchain().arch().as_str(),
            registry.package_count(),
            registry.entry_count(),
        );
        ctx.shell().json_event(&event.to_value());
    }

    Ok(registry)
}
