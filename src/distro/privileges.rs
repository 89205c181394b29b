//! Privilege and prerequisite checks shared by every distribution.
//!
//! These run before anything on the host is changed, so a failure here only
//! needs to be reported.

use log::error;

use super::HostContext;

/// Check if the effective user is root
#[inline]
pub fn is_superuser() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Check that the installer can run on this host at all.
pub fn validate_host(ctx: HostContext<'_>) -> bool {
    if !is_superuser() {
        error!("Permission denied. Please rerun the installation script as root.");
        return false;
    }

    has_python_prerequisites(ctx) && has_required_tools(ctx)
}

/// The guest agent is a python program; its packaging prerequisites must be
/// importable by the system interpreter.
fn has_python_prerequisites(ctx: HostContext<'_>) -> bool {
    let python = ctx.config.python.as_str();
    for module in &ctx.config.python_modules {
        let statement = format!("import {module}");
        if let Err(e) = ctx.runner.run(python, &["-c", &statement]) {
            error!("Unable to import python module {module} needed by the guest agent: {e}");
            error!("Please install python-{module} and retry installation.");
            return false;
        }
    }
    true
}

fn has_required_tools(ctx: HostContext<'_>) -> bool {
    for tool in &ctx.config.required_tools {
        if which::which(tool).is_err() {
            error!("Required package {tool} not installed. Please install {tool} and retry installation.");
            return false;
        }
    }
    true
}
