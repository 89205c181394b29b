//! Per-distribution installer behavior.
//!
//! Each supported family implements [`DistroStrategy`]; [`select_strategy`]
//! inspects the host once per run and hands the orchestrator the matching
//! implementation.
//!
//! # Module Structure
//!
//! - `os_release` - distribution detection from release metadata
//! - `privileges` - superuser and prerequisite checks shared by all families
//! - `sysv` - init script installation and `chkconfig` registration
//! - `dracut` - initramfs driver list maintenance
//! - `file_ops` - atomic file rewrites
//! - `redhat`, `ubuntu`, `suse` - the family implementations

use std::fmt;

use log::{error, info};

use crate::command::CommandRunner;
use crate::config::InstallerConfig;
use crate::error::{InstallerError, Result};
use crate::version;

mod dracut;
mod file_ops;
pub mod os_release;
pub mod privileges;
mod redhat;
mod suse;
mod sysv;
mod ubuntu;

pub use redhat::RedHat;
pub use suse::Suse;
pub use ubuntu::Ubuntu;

/// Everything a strategy needs from its surroundings.
#[derive(Clone, Copy)]
pub struct HostContext<'a> {
    pub config: &'a InstallerConfig,
    pub runner: &'a dyn CommandRunner,
}

impl<'a> HostContext<'a> {
    pub fn new(config: &'a InstallerConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }
}

/// Supported distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    RedHat,
    Ubuntu,
    Suse,
}

impl Family {
    /// Match a distribution name against the known family aliases.
    pub fn from_distribution_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if ["centos", "oracle linux server", "red hat"]
            .iter()
            .any(|alias| name.contains(alias))
        {
            Some(Family::RedHat)
        } else if name.contains("ubuntu") {
            Some(Family::Ubuntu)
        } else if name.contains("suse") {
            Some(Family::Suse)
        } else {
            None
        }
    }

    /// Oldest release of the family the installer supports.
    pub fn minimum_version(self) -> &'static str {
        match self {
            Family::RedHat => "6.4",
            Family::Ubuntu => "14.04",
            Family::Suse => "11",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Family::RedHat => "Red Hat",
            Family::Ubuntu => "Ubuntu",
            Family::Suse => "SUSE",
        })
    }
}

/// Host distribution as reported by its release metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionDescriptor {
    pub name: String,
    pub version: String,
}

impl DistributionDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn family(&self) -> Option<Family> {
        Family::from_distribution_name(&self.name)
    }
}

/// Operations whose behavior differs between distribution families.
pub trait DistroStrategy {
    fn family(&self) -> Family;

    fn descriptor(&self) -> &DistributionDescriptor;

    fn context(&self) -> HostContext<'_>;

    /// Shared host checks followed by the family's minimum version gate.
    ///
    /// Returns `false` rather than an error; nothing has been changed yet.
    fn validate(&self) -> bool {
        privileges::validate_host(self.context())
            && supports_version(self.descriptor(), self.family().minimum_version())
    }

    /// Make the paravirtual storage and network drivers available at boot.
    fn configure_drivers(&self) -> Result<()>;

    /// Install the init script and register it for autostart.
    fn register_daemon(&self) -> Result<()>;

    /// Undo [`register_daemon`](Self::register_daemon). Never fails: every
    /// step is attempted and its failure logged.
    fn deregister_daemon(&self);
}

fn supports_version(descriptor: &DistributionDescriptor, minimum: &str) -> bool {
    if version::meets_minimum(&descriptor.version, minimum) {
        return true;
    }
    error!(
        "{} version {} is not supported. Minimum version {}.",
        descriptor.name, descriptor.version, minimum
    );
    false
}

/// Fail unless the host kernel is Linux.
pub fn ensure_linux() -> Result<()> {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "linux")] {
            let uts = nix::sys::utsname::uname()
                .map_err(|e| InstallerError::UnsupportedPlatform(format!("uname failed: {e}")))?;
            let sysname = uts.sysname().to_string_lossy().to_lowercase();
            if sysname != "linux" {
                error!("Unsupported platform : {sysname}");
                return Err(InstallerError::UnsupportedPlatform(sysname));
            }
            Ok(())
        } else {
            error!("Unsupported platform : {}", std::env::consts::OS);
            Err(InstallerError::UnsupportedPlatform(std::env::consts::OS.to_string()))
        }
    }
}

/// Build the strategy for an already detected distribution.
pub fn strategy_for<'a>(
    ctx: HostContext<'a>,
    descriptor: DistributionDescriptor,
) -> Result<Box<dyn DistroStrategy + 'a>> {
    let Some(family) = descriptor.family() else {
        error!("Unsupported distribution : {}", descriptor.name);
        return Err(InstallerError::UnsupportedDistribution(descriptor.name));
    };

    info!(
        "Using Linux installer for {} {} ({family} family).",
        descriptor.name, descriptor.version
    );

    Ok(match family {
        Family::RedHat => Box::new(RedHat::new(ctx, descriptor)),
        Family::Ubuntu => Box::new(Ubuntu::new(ctx, descriptor)),
        Family::Suse => Box::new(Suse::new(ctx, descriptor)),
    })
}

/// Inspect the host and return the matching strategy.
pub fn select_strategy<'a>(ctx: HostContext<'a>) -> Result<Box<dyn DistroStrategy + 'a>> {
    ensure_linux()?;
    let descriptor = os_release::detect(&ctx.config.release_dir)?;
    strategy_for(ctx, descriptor)
}
