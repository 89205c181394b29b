//! Test fixtures: an installer bundle and host layout inside a temp directory.

use std::cell::RefCell;
use std::fs::{self, File};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use nix::unistd::{User, getuid};
use tempfile::{TempDir, tempdir};

use crate::config::{HealthCheckConfig, InstallerConfig};
use crate::distro::{DistributionDescriptor, DistroStrategy, Family, HostContext};
use crate::error::{InstallerError, Result};

pub const AGENT_SCRIPT: &str = "python/bin/guest_agent_monitor_linux.py";

/// Bundle directory plus empty host directories (`init.d`, `etc`).
pub struct Bundle {
    dir: TempDir,
}

impl Bundle {
    pub fn new(version: &str) -> Self {
        let dir = tempdir().unwrap();
        let bundle = Self { dir };
        let config = bundle.config();

        fs::create_dir_all(config.bundle_config_dir()).unwrap();
        fs::create_dir_all(&config.init_dir).unwrap();
        fs::create_dir_all(&config.release_dir).unwrap();

        bundle.set_version(version);
        fs::write(config.bundle_init_script(), "#!/bin/sh\n").unwrap();
        fs::write(config.bundle_dir.join("License.txt"), "license\n").unwrap();
        fs::write(&config.uninstaller, "#!/bin/sh\n").unwrap();
        write_payload(&config.bundle_package(), &[(AGENT_SCRIPT, "print('agent')\n")]);

        bundle
    }

    pub fn set_version(&self, version: &str) {
        fs::write(
            self.config().bundle_version_file(),
            format!(r#"{{"ngt_version": "{version}"}}"#),
        )
        .unwrap();
    }

    pub fn config(&self) -> InstallerConfig {
        let root = self.dir.path();
        let bundle_dir = root.join("bundle");
        InstallerConfig {
            install_root: root.join("nutanix"),
            init_dir: root.join("init.d"),
            uninstaller: bundle_dir.join("ngt-uninstaller"),
            bundle_dir,
            dracut_conf: root.join("etc/dracut.conf"),
            release_dir: root.join("etc"),
            log_dir: root.to_path_buf(),
            owner: current_user(),
            required_tools: Vec::new(),
            python_modules: Vec::new(),
            health_check: HealthCheckConfig {
                attempts: 2,
                interval_secs: 0,
            },
            ..InstallerConfig::default()
        }
    }
}

pub fn current_user() -> String {
    User::from_uid(getuid()).unwrap().unwrap().name
}

pub fn write_payload(path: &Path, files: &[(&str, &str)]) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Strategy that records the calls it receives and fails on request.
pub struct FakeStrategy<'a> {
    ctx: HostContext<'a>,
    descriptor: DistributionDescriptor,
    pub valid: bool,
    pub fail_drivers: bool,
    calls: RefCell<Vec<&'static str>>,
}

impl<'a> FakeStrategy<'a> {
    pub fn new(ctx: HostContext<'a>) -> Self {
        Self {
            ctx,
            descriptor: DistributionDescriptor::new("CentOS Linux", "7.2"),
            valid: true,
            fail_drivers: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl DistroStrategy for FakeStrategy<'_> {
    fn family(&self) -> Family {
        Family::RedHat
    }

    fn descriptor(&self) -> &DistributionDescriptor {
        &self.descriptor
    }

    fn context(&self) -> HostContext<'_> {
        self.ctx
    }

    fn validate(&self) -> bool {
        self.calls.borrow_mut().push("validate");
        self.valid
    }

    fn configure_drivers(&self) -> Result<()> {
        self.calls.borrow_mut().push("configure_drivers");
        if self.fail_drivers {
            return Err(InstallerError::Config("scripted driver failure".to_string()));
        }
        Ok(())
    }

    fn register_daemon(&self) -> Result<()> {
        self.calls.borrow_mut().push("register_daemon");
        fs::write(self.ctx.config.init_script_path(), "#!/bin/sh\n").unwrap();
        Ok(())
    }

    fn deregister_daemon(&self) {
        self.calls.borrow_mut().push("deregister_daemon");
        let _ = fs::remove_file(self.ctx.config.init_script_path());
    }
}

/// Real family strategy with host validation assumed to pass, so the
/// mutating steps can run without superuser privileges.
pub struct Permissive<S>(pub S);

impl<S: DistroStrategy> DistroStrategy for Permissive<S> {
    fn family(&self) -> Family {
        self.0.family()
    }

    fn descriptor(&self) -> &DistributionDescriptor {
        self.0.descriptor()
    }

    fn context(&self) -> HostContext<'_> {
        self.0.context()
    }

    fn validate(&self) -> bool {
        true
    }

    fn configure_drivers(&self) -> Result<()> {
        self.0.configure_drivers()
    }

    fn register_daemon(&self) -> Result<()> {
        self.0.register_daemon()
    }

    fn deregister_daemon(&self) {
        self.0.deregister_daemon()
    }
}
