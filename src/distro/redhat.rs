//! RedHat family: RHEL, CentOS and Oracle Linux.

use log::{error, info};

use super::{DistributionDescriptor, DistroStrategy, Family, HostContext, dracut, sysv};
use crate::error::Result;

pub struct RedHat<'a> {
    ctx: HostContext<'a>,
    descriptor: DistributionDescriptor,
}

impl<'a> RedHat<'a> {
    pub fn new(ctx: HostContext<'a>, descriptor: DistributionDescriptor) -> Self {
        Self { ctx, descriptor }
    }
}

impl DistroStrategy for RedHat<'_> {
    fn family(&self) -> Family {
        Family::RedHat
    }

    fn descriptor(&self) -> &DistributionDescriptor {
        &self.descriptor
    }

    fn context(&self) -> HostContext<'_> {
        self.ctx
    }

    fn configure_drivers(&self) -> Result<()> {
        info!("Setting up VM mobility drivers.");
        if let Err(e) = dracut::setup_mobility_drivers(self.ctx) {
            error!("Failed to setup VM mobility drivers.");
            return Err(e);
        }
        info!("Successfully set up VM mobility drivers.");
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
