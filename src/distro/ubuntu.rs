//! Ubuntu family.

use log::{debug, error, info};

use super::{DistributionDescriptor, DistroStrategy, Family, HostContext, sysv};
use crate::error::Result;

const UPDATE_RC_D: &str = "update-rc.d";

pub struct Ubuntu<'a> {
    ctx: HostContext<'a>,
    descriptor: DistributionDescriptor,
}

impl<'a> Ubuntu<'a> {
    pub fn new(ctx: HostContext<'a>, descriptor: DistributionDescriptor) -> Self {
        Self { ctx, descriptor }
    }
}

impl DistroStrategy for Ubuntu<'_> {
    fn family(&self) -> Family {
        Family::Ubuntu
    }

    fn descriptor(&self) -> &DistributionDescriptor {
        &self.descriptor
    }

    fn context(&self) -> HostContext<'_> {
        self.ctx
    }

    fn configure_drivers(&self) -> Result<()> {
        // The stock Ubuntu initramfs already carries the virtio and VMware drivers.
        debug!("Mobility drivers are part of the default initramfs on Ubuntu.");
        Ok(())
    }

    fn register_daemon(&self) -> Result<()> {
        sysv::install_init_script(self.ctx)?;

        let name = self.ctx.config.daemon_name.as_str();
        let args = [
            name, "start", "90", "2", "3", "4", "5", ".", "stop", "10", "0", "1", "6", ".",
        ];
        if let Err(e) = self.ctx.runner.run(UPDATE_RC_D, &args) {
            error!("Failed to add guest agent service to the service configuration.");
            return Err(e.into());
        }

        info!("Successfully installed guest agent service.");
        Ok(())
    }

    fn deregister_daemon(&self) {
        sysv::deregister(self.ctx, |ctx| {
            let name = ctx.config.daemon_name.as_str();
            sysv::attempt(ctx.runner, UPDATE_RC_D, &["-f", name, "remove"]);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::RecordingRunner;
    use crate::config::InstallerConfig;
    use std::fs;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> InstallerConfig {
        let config = InstallerConfig {
            init_dir: dir.join("init.d"),
            bundle_dir: dir.join("bundle"),
            ..InstallerConfig::default()
        };
        fs::create_dir_all(&config.init_dir).unwrap();
        fs::create_dir_all(&config.bundle_dir).unwrap();
        fs::write(config.bundle_init_script(), "#!/bin/sh\n").unwrap();
        config
    }

    #[test]
    fn test_register_uses_runlevel_priorities() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let runner = RecordingRunner::new();
        let ubuntu = Ubuntu::new(
            HostContext::new(&config, &runner),
            DistributionDescriptor::new("Ubuntu", "16.04"),
        );

        ubuntu.configure_drivers().unwrap();
        ubuntu.register_daemon().unwrap();

        assert_eq!(
            runner.calls(),
            vec!["update-rc.d ngt_guest_agent start 90 2 3 4 5 . stop 10 0 1 6 ."]
        );
    }

    #[test]
    fn test_register_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let runner = RecordingRunner::new().failing("update-rc.d");
        let ubuntu = Ubuntu::new(
            HostContext::new(&config, &runner),
            DistributionDescriptor::new("Ubuntu", "16.04"),
        );
        assert!(ubuntu.register_daemon().is_err());
    }

    #[test]
    fn test_deregister_removes_runlevel_links() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(config.init_script_path(), "#!/bin/sh\n").unwrap();
        let runner = RecordingRunner::new().failing("update-rc.d");
        let ubuntu = Ubuntu::new(
            HostContext::new(&config, &runner),
            DistributionDescriptor::new("Ubuntu", "14.04"),
        );

        ubuntu.deregister_daemon();

        assert!(runner.ran("update-rc.d -f ngt_guest_agent remove"));
        assert!(!config.init_script_path().exists());
    }
}
