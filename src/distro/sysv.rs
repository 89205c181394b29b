//! SysV init script handling shared by the distribution strategies.
//!
//! RedHat and SUSE both register through `chkconfig`; Ubuntu only differs in
//! the registration tool, so the script copy and the teardown skeleton live
//! here.

use std::fs;
use std::os::unix::fs::PermissionsExt;

use log::{debug, error, info, warn};

use super::HostContext;
use crate::command::{CommandRunner, command_line};
use crate::control;
use crate::error::{IoContext, Result};

pub(super) const CHKCONFIG: &str = "/sbin/chkconfig";

/// Copy the bundled init script into the init directory and make it executable.
pub(super) fn install_init_script(ctx: HostContext<'_>) -> Result<()> {
    let config = ctx.config;
    let source = config.bundle_init_script();
    let target = config.init_script_path();

    info!("Installing guest agent service.");
    fs::copy(&source, &target).io_context(|| {
        format!(
            "Failed to copy init script {} to {}",
            source.display(),
            target.display()
        )
    })?;

    let mut perms = fs::metadata(&target)
        .io_context(|| format!("Failed to get init script metadata {}", target.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o100);
    fs::set_permissions(&target, perms)
        .io_context(|| format!("Failed to make {} executable", target.display()))?;

    Ok(())
}

/// Run a step whose failure must not stop the caller.
pub(super) fn attempt(runner: &dyn CommandRunner, program: &str, args: &[&str]) {
    if let Err(e) = runner.run(program, args) {
        warn!("Ignoring failure of {}: {e}", command_line(program, args));
    }
}

/// `chkconfig --add` and enable autostart on boot.
pub(super) fn chkconfig_register(ctx: HostContext<'_>) -> Result<()> {
    let name = ctx.config.daemon_name.as_str();

    if let Err(e) = ctx.runner.run(CHKCONFIG, &["--add", name]) {
        error!("Failed to add guest agent service to the service configuration.");
        return Err(e.into());
    }

    if let Err(e) = ctx.runner.run(CHKCONFIG, &[name, "on"]) {
        error!("Failed to set guest agent service property autostart on boot.");
        return Err(e.into());
    }

    Ok(())
}

/// Disable autostart and drop the service from the `chkconfig` list.
pub(super) fn chkconfig_unregister(ctx: HostContext<'_>) {
    let name = ctx.config.daemon_name.as_str();
    attempt(ctx.runner, CHKCONFIG, &[name, "off"]);
    attempt(ctx.runner, CHKCONFIG, &["--del", name]);
}

/// Stop the daemon, run the family's unregistration, then delete the init
/// script. A missing init script means there is nothing to tear down.
pub(super) fn deregister<F>(ctx: HostContext<'_>, unregister: F)
where
    F: FnOnce(HostContext<'_>),
{
    let script = ctx.config.init_script_path();
    if !script.exists() {
        debug!("No init script at {}, nothing to deregister", script.display());
        return;
    }

    info!("Stopping and removing guest agent service.");

    if let Err(e) = control::stop_daemon(ctx.runner, &script) {
        warn!("Ignoring failure to stop guest agent service: {e}");
    }

    unregister(ctx);

    if let Err(e) = fs::remove_file(&script) {
        warn!("Failed to remove init script {}: {e}", script.display());
    }
}
