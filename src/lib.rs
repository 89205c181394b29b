//! Guest tools installer for Linux guests.
//!
//! Installs the guest agent daemon and its payload, registers it with the
//! host's SysV init tooling, keeps the initramfs able to boot on either
//! hypervisor, and removes all of it again on uninstall.

pub mod command;
pub mod config;
pub mod control;
pub mod distro;
pub mod error;
pub mod install;
pub mod logging;
pub mod version;
