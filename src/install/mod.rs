//! Guest tools installation library
//!
//! Installs, upgrades and removes the guest agent payload under the
//! installation root. Distribution specific steps are delegated to the
//! [`DistroStrategy`](crate::distro::DistroStrategy) picked for the host.

mod detection;
mod orchestration;
mod payload;
mod permissions;
mod prompt;
mod runners;
mod uninstall;

#[cfg(test)]
pub(crate) mod testing;

// Public exports
pub use detection::{InstallationState, check_installation_state, is_container_host, is_installed};
pub use orchestration::{InstallOutcome, Installer, Phase};
pub use permissions::{LOCKED_MODE, LOGS_MODE};
pub use prompt::{confirm_from, confirm_uninstall};
pub use runners::{
    UninstallOutcome, install_exit_code, run_install, run_uninstall, uninstall_exit_code,
};
pub use uninstall::{resolve_strategy, uninstall_guest_tools};
