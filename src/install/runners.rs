//! Top-level install and uninstall runners used by the binary.

use log::{error, info};

use super::orchestration::{InstallOutcome, Installer};
use super::{detection, prompt, uninstall};
use crate::command::CommandRunner;
use crate::config::InstallerConfig;
use crate::distro::{self, HostContext, privileges};
use crate::error::{InstallerError, Result};

/// How an uninstall run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed,
    Declined,
}

/// Install or upgrade guest tools on this host.
pub fn run_install(config: &InstallerConfig, runner: &dyn CommandRunner) -> Result<InstallOutcome> {
    info!("Installing guest tools from {}", config.bundle_dir.display());

    if detection::is_container_host(config) {
        error!("Guest tools are not supported on a container host.");
        return Err(InstallerError::ContainerHost);
    }

    let strategy = distro::select_strategy(HostContext::new(config, runner))?;
    Installer::new(strategy.as_ref()).run()
}

/// Remove guest tools, asking for confirmation unless `assume_yes` is set.
pub fn run_uninstall(
    config: &InstallerConfig,
    runner: &dyn CommandRunner,
    assume_yes: bool,
) -> Result<UninstallOutcome> {
    if !privileges::is_superuser() {
        error!("Insufficient privileges. Please run the uninstaller as root.");
        return Err(InstallerError::PermissionDenied);
    }

    if !assume_yes && !prompt::confirm_uninstall() {
        info!("Uninstall cancelled.");
        return Ok(UninstallOutcome::Declined);
    }

    let strategy = uninstall::resolve_strategy(HostContext::new(config, runner));
    uninstall::uninstall_guest_tools(config, strategy.as_deref());
    Ok(UninstallOutcome::Removed)
}

/// Process exit status for an install result.
pub fn install_exit_code(result: &Result<InstallOutcome>) -> i32 {
    match result {
        Ok(InstallOutcome::Installed { .. }) => 0,
        Ok(InstallOutcome::AlreadyCurrent) | Err(_) => 1,
    }
}

/// Process exit status for an uninstall result.
pub fn uninstall_exit_code(result: &Result<UninstallOutcome>) -> i32 {
    match result {
        Ok(UninstallOutcome::Removed) => 0,
        Ok(UninstallOutcome::Declined) | Err(_) => 1,
    }
}
