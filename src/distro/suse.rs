//! SUSE family. Registration matches RedHat; mobility drivers are not handled.

use log::{info, warn};

use super::{DistributionDescriptor, DistroStrategy, Family, HostContext, sysv};
use crate::error::Result;

pub struct Suse<'a> {
    ctx: HostContext<'a>,
    descriptor: DistributionDescriptor,
}

impl<'a> Suse<'a> {
    pub fn new(ctx: HostContext<'a>, descriptor: DistributionDescriptor) -> Self {
        Self { ctx, descriptor }
    }
}

impl DistroStrategy for Suse<'_> {
    fn family(&self) -> Family {
        Family::Suse
    }

    fn descriptor(&self) -> &DistributionDescriptor {
        &self.descriptor
    }

    fn context(&self) -> HostContext<'_> {
        self.ctx
    }

    fn configure_drivers(&self) -> Result<()> {
        warn!("VM mobility is currently not supported for SUSE guests.");
        warn!("Skipping installation of mobility drivers.");
        Ok(())
    }

    fn register_daemon(&self) -> Result<()> {
        sysv::install_init_script(self.ctx)?;
        sysv::chkconfig_register(self.ctx)?;
        info!("Successfully installed guest agent service.");
        Ok(())
    }

    fn deregister_daemon(&self) {
        sysv::deregister(self.ctx, sysv::chkconfig_unregister);
    }
}
