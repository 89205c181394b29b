//! Install and upgrade orchestration
//!
//! A run walks a fixed sequence of phases:
//!
//! ```text
//! CheckInstalled -> CheckVersionGate -> Cleanup -> Validate
//!     -> PreProcess -> Setup -> PostProcess -> AwaitDaemonHealthy -> Done
//! ```
//!
//! Nothing is changed before `Cleanup`. A failure in `Validate` aborts with
//! the host as cleanup left it. A failure in any later mutating phase runs
//! cleanup again before the error is returned, so the host never keeps a
//! half-installed tree. The completion marker is the last thing written.

use std::fs;
use std::thread;

use log::{debug, error, info, warn};

use super::{detection, payload, permissions};
use super::detection::InstallationState;
use crate::command::CommandRunner;
use crate::config::{InstallerConfig, read_ngt_version};
use crate::control;
use crate::distro::DistroStrategy;
use crate::error::{InstallerError, IoContext, Result};
use crate::version::Version;

/// Install phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CheckInstalled,
    CheckVersionGate,
    Cleanup,
    Validate,
    PreProcess,
    Setup,
    PostProcess,
    AwaitDaemonHealthy,
    Done,
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Payload installed and marker written. `daemon_running` reports the
    /// health check, which does not affect success.
    Installed { daemon_running: bool },
    /// The installed version is not older than the bundle; nothing changed.
    AlreadyCurrent,
}

pub struct Installer<'a> {
    config: &'a InstallerConfig,
    runner: &'a dyn CommandRunner,
    strategy: &'a dyn DistroStrategy,
}

impl<'a> Installer<'a> {
    pub fn new(strategy: &'a dyn DistroStrategy) -> Self {
        let ctx = strategy.context();
        Self {
            config: ctx.config,
            runner: ctx.runner,
            strategy,
        }
    }

    /// Drive the phases to completion.
    pub fn run(&self) -> Result<InstallOutcome> {
        let mut phase = Phase::CheckInstalled;
        let mut daemon_running = false;

        loop {
            debug!("Install phase: {phase:?}");
            phase = match phase {
                Phase::CheckInstalled => {
                    if detection::is_installed(self.config) {
                        Phase::CheckVersionGate
                    } else {
                        Phase::Cleanup
                    }
                }
                Phase::CheckVersionGate => {
                    if !self.installation_required()? {
                        return Ok(InstallOutcome::AlreadyCurrent);
                    }
                    Phase::Cleanup
                }
                Phase::Cleanup => {
                    self.cleanup();
                    Phase::Validate
                }
                Phase::Validate => {
                    if !self.strategy.validate() {
                        error!("Pre-requisites not met. Aborting installation.");
                        return Err(InstallerError::ValidationFailed);
                    }
                    Phase::PreProcess
                }
                Phase::PreProcess => self.mutate(Self::pre_process, Phase::Setup)?,
                Phase::Setup => self.mutate(Self::setup, Phase::PostProcess)?,
                Phase::PostProcess => {
                    self.mutate(Self::post_process, Phase::AwaitDaemonHealthy)?
                }
                Phase::AwaitDaemonHealthy => {
                    daemon_running = self.await_daemon_healthy();
                    Phase::Done
                }
                Phase::Done => {
                    info!("Successfully installed guest tools.");
                    return Ok(InstallOutcome::Installed { daemon_running });
                }
            };
        }
    }

    /// Compare the installed version against the bundle.
    ///
    /// An unreadable bundle version is fatal. An unreadable installed
    /// version means the install is treated as outdated.
    fn installation_required(&self) -> Result<bool> {
        let bundle_file = self.config.bundle_version_file();
        let candidate = match read_ngt_version(&bundle_file) {
            Ok(v) => Version::parse(&v),
            Err(e) => {
                error!("Unable to get current installer version. Exiting. ({e})");
                return Err(InstallerError::VersionUnavailable(bundle_file));
            }
        };

        match detection::check_installation_state(self.config) {
            InstallationState::NotInstalled => Ok(true),
            InstallationState::Installed(None) => {
                warn!("Installed version unknown, upgrading to {candidate}.");
                Ok(true)
            }
            InstallationState::Installed(Some(installed)) if installed < candidate => {
                info!("Upgrading guest tools from {installed} to {candidate}.");
                Ok(true)
            }
            InstallationState::Installed(Some(installed)) => {
                warn!("Guest tools version {installed} is already installed and up to date.");
                Ok(false)
            }
        }
    }

    /// Remove every trace of a previous install. Never fails.
    pub fn cleanup(&self) {
        debug!("Cleaning up previous installation.");
        self.strategy.deregister_daemon();
        permissions::remove_tree(&self.config.install_root);
    }

    fn mutate(&self, step: fn(&Self) -> Result<()>, next: Phase) -> Result<Phase> {
        match step(self) {
            Ok(()) => Ok(next),
            Err(e) => {
                error!("Failed to install guest tools: {e}");
                info!("Rolling back installation.");
                self.cleanup();
                Err(InstallerError::RolledBack(Box::new(e)))
            }
        }
    }

    fn pre_process(&self) -> Result<()> {
        for dir in [
            self.config.install_root.clone(),
            self.config.config_dir(),
            self.config.logs_dir(),
        ] {
            fs::create_dir_all(&dir)
                .io_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    fn setup(&self) -> Result<()> {
        self.strategy.configure_drivers()?;
        payload::stage_and_extract(self.config)?;
        payload::copy_bundle_config(self.config)?;
        self.strategy.register_daemon()
    }

    fn post_process(&self) -> Result<()> {
        info!("Starting guest agent service.");
        if let Err(e) = control::start_daemon(self.runner, &self.config.init_script_path()) {
            error!("Failed to start guest agent service.");
            return Err(e.into());
        }

        payload::install_auxiliary_files(self.config)?;
        payload::remove_staged_package(self.config)?;
        permissions::lock_down(self.config)?;
        detection::write_marker(self.config)
    }

    /// Poll for the agent process. The result is informational only.
    fn await_daemon_healthy(&self) -> bool {
        let health = &self.config.health_check;
        for _ in 0..health.attempts {
            info!("Waiting for guest agent service to start.");
            thread::sleep(health.interval());
            if control::is_daemon_running(self.runner, &self.config.agent_process_pattern) {
                info!("Guest agent service is running.");
                return true;
            }
        }

        error!("Guest agent service failed to start.");
        error!("Check {} for details.", self.config.daemon_log().display());
        false
    }
}
