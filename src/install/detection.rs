//! Installation state detection
//!
//! The completion marker written as the very last install step is the only
//! durable record of a successful install. Anything under the installation
//! root without the marker is leftover from an interrupted run.

use std::fs;
use std::path::Path;

use log::{info, warn};

use super::permissions;
use crate::config::{InstallerConfig, read_ngt_version};
use crate::error::Result;
use crate::version::Version;

/// Installation state enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationState {
    /// No completion marker; any files on disk are stale.
    NotInstalled,
    /// Marker present. `None` when the installed version metadata cannot be read.
    Installed(Option<Version>),
}

/// Check if a previous install ran to completion.
pub fn is_installed(config: &InstallerConfig) -> bool {
    config.marker_path().exists()
}

/// Check current installation state from the marker and installed metadata.
pub fn check_installation_state(config: &InstallerConfig) -> InstallationState {
    if !is_installed(config) {
        return InstallationState::NotInstalled;
    }

    let path = config.installed_version_file();
    match read_ngt_version(&path) {
        Ok(version) => InstallationState::Installed(Some(Version::parse(&version))),
        Err(e) => {
            warn!("Unable to read installed version from {}: {e}", path.display());
            InstallationState::Installed(None)
        }
    }
}

/// Create the completion marker. Content is irrelevant.
pub fn write_marker(config: &InstallerConfig) -> Result<()> {
    permissions::create_locked_file(config, &config.marker_path())
}

/// Container hosts are excluded from guest tooling.
pub fn is_container_host(config: &InstallerConfig) -> bool {
    let path = config.container_config();
    let is_host = contains_container_host_flag(&path);
    if is_host {
        info!("{} marks this VM as a container host", path.display());
    }
    is_host
}

fn contains_container_host_flag(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|contents| {
            contents
                .lines()
                .any(|line| line.trim_end() == "container_host=True")
        })
        .unwrap_or(false)
}
