//! Uninstallation
//!
//! Removal is best effort past the confirmation: an undetectable distribution
//! only skips daemon deregistration, and a failed step is logged and passed.

use log::{info, warn};

use super::permissions;
use crate::config::InstallerConfig;
use crate::distro::{self, DistroStrategy, HostContext};

/// Resolve the host strategy, or `None` when daemon removal has to be skipped.
pub fn resolve_strategy(ctx: HostContext<'_>) -> Option<Box<dyn DistroStrategy + '_>> {
    match distro::select_strategy(ctx) {
        Ok(strategy) => Some(strategy),
        Err(e) => {
            warn!("Skipping guest agent service removal: {e}");
            None
        }
    }
}

/// Deregister the daemon when a strategy is available, then delete the
/// installation tree.
pub fn uninstall_guest_tools(config: &InstallerConfig, strategy: Option<&dyn DistroStrategy>) {
    info!("Uninstalling guest tools.");

    match strategy {
        Some(strategy) => strategy.deregister_daemon(),
        None => info!("Unsupported distribution, guest agent service left in place."),
    }

    info!("Removing {}", config.install_root.display());
    permissions::remove_tree(&config.install_root);

    info!("Successfully uninstalled guest tools.");
}
