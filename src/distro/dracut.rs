//! initramfs driver list maintenance for dracut-based hosts.
//!
//! dracut pulls every dependency of the modules named in `add_drivers`, so
//! listing the paravirtual drivers is enough for the guest to boot after a
//! migration to another hypervisor.

use std::fs;

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::HostContext;
use super::file_ops::write_file_atomic;
use crate::command::CommandRunner;
use crate::error::{IoContext, Result};

/// virtio_* are needed on AHV; vmw_pvscsi, vmxnet3, e1000 and mpt* on ESX.
pub const MOBILITY_DRIVERS: [&str; 9] = [
    "virtio_scsi",
    "virtio_net",
    "virtio_blk",
    "virtio_pci",
    "vmw_pvscsi",
    "vmxnet3",
    "e1000",
    "mptsas",
    "mptspi",
];

const MODINFO: &str = "/sbin/modinfo";
const DRACUT: &str = "dracut";

static ADD_DRIVERS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^#?add_drivers\+="(.*)""#).expect("static regex")
});

/// Check if a kernel module can be loaded on this host.
pub(super) fn is_kernel_module_present(runner: &dyn CommandRunner, module: &str) -> bool {
    match runner.run(MODINFO, &[module]) {
        Ok(_) => true,
        Err(_) => {
            warn!("Kernel module {module} does not exist.");
            false
        }
    }
}

/// Add the missing, loadable mobility drivers to every `add_drivers` line.
///
/// Lines that need no change, and all unrelated lines, are kept byte for
/// byte. Returns `None` when nothing changed.
pub(super) fn add_mobility_drivers<F>(contents: &str, mut is_available: F) -> Option<String>
where
    F: FnMut(&str) -> bool,
{
    let mut output = String::with_capacity(contents.len() + 128);
    let mut changed = false;

    for line in contents.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let Some(captures) = ADD_DRIVERS_RE.captures(body) else {
            output.push_str(line);
            continue;
        };

        let mut drivers = captures[1].to_string();
        let mut modified = false;
        for driver in MOBILITY_DRIVERS {
            let listed = drivers.split_whitespace().any(|d| d == driver);
            if !listed && is_available(driver) {
                drivers.push(' ');
                drivers.push_str(driver);
                modified = true;
            }
        }

        if modified {
            output.push_str(&format!("add_drivers+=\"{} \"\n", drivers.trim()));
            changed = true;
        } else {
            output.push_str(line);
        }
    }

    changed.then_some(output)
}

/// Rewrite the dracut config, then regenerate the initramfs.
pub(super) fn setup_mobility_drivers(ctx: HostContext<'_>) -> Result<()> {
    let path = &ctx.config.dracut_conf;
    let contents = fs::read_to_string(path)
        .io_context(|| format!("Failed to read {}", path.display()))?;

    let rewritten =
        match add_mobility_drivers(&contents, |d| is_kernel_module_present(ctx.runner, d)) {
            Some(updated) => {
                write_file_atomic(path, &updated)?;
                info!("Updated driver list in {}", path.display());
                true
            }
            None => {
                info!("{} already lists all available drivers", path.display());
                false
            }
        };

    if let Err(e) = ctx.runner.run(DRACUT, &["-f"]) {
        if rewritten {
            warn!("Restoring {} after failed initramfs regeneration", path.display());
            write_file_atomic(path, &contents)?;
        }
        return Err(e.into());
    }
    Ok(())
}
