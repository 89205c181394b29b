//! Ownership and mode handling for the installation tree.

use std::fs;
use std::io;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use log::{debug, warn};
use nix::unistd::{Gid, Uid, User, chown};
use walkdir::WalkDir;

use crate::config::InstallerConfig;
use crate::error::{InstallerError, IoContext, Result};

/// Owner read and execute, group read and execute, nothing for others.
pub const LOCKED_MODE: u32 = 0o550;
/// The daemon writes its logs here.
pub const LOGS_MODE: u32 = 0o770;

fn resolve_owner(name: &str) -> Result<(Uid, Gid)> {
    match User::from_name(name) {
        Ok(Some(user)) => Ok((user.uid, user.gid)),
        Ok(None) => Err(InstallerError::Config(format!("unknown user {name}"))),
        Err(e) => Err(InstallerError::io(
            format!("Failed to look up user {name}"),
            io::Error::from(e),
        )),
    }
}

/// Give the configured owner every file and directory under the installation
/// root, mode 0550, then reopen `logs/` to 0770.
pub fn lock_down(config: &InstallerConfig) -> Result<()> {
    let (uid, gid) = resolve_owner(&config.owner)?;
    let root = &config.install_root;

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            InstallerError::io(
                format!("Failed to walk {}", root.display()),
                io::Error::other(e),
            )
        })?;
        let path = entry.path();

        // chown and chmod would follow the link out of the tree.
        if entry.file_type().is_symlink() {
            debug!("Leaving symlink {} untouched", path.display());
            continue;
        }

        chown(path, Some(uid), Some(gid)).map_err(|e| {
            InstallerError::io(
                format!("Failed to change owner of {}", path.display()),
                io::Error::from(e),
            )
        })?;
        set_mode(path, LOCKED_MODE)?;
    }

    let logs = config.logs_dir();
    if logs.is_dir() {
        set_mode(&logs, LOGS_MODE)?;
    }
    Ok(())
}

/// Create an empty file inside the locked tree with the locked owner and mode.
///
/// The parent directory is made owner-writable for the duration of the call.
pub fn create_locked_file(config: &InstallerConfig, path: &Path) -> Result<()> {
    let (uid, gid) = resolve_owner(&config.owner)?;

    if !path.exists() {
        let parent = path.parent().unwrap_or(&config.install_root);
        let original = fs::metadata(parent)
            .io_context(|| format!("Failed to get metadata of {}", parent.display()))?
            .permissions();
        set_mode(parent, original.mode() | 0o200)?;

        let created = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .mode(LOCKED_MODE)
            .open(path)
            .io_context(|| format!("Failed to create {}", path.display()));
        let restored = fs::set_permissions(parent, original)
            .io_context(|| format!("Failed to restore mode of {}", parent.display()));
        created?;
        restored?;
    }

    chown(path, Some(uid), Some(gid)).map_err(|e| {
        InstallerError::io(
            format!("Failed to change owner of {}", path.display()),
            io::Error::from(e),
        )
    })?;
    set_mode(path, LOCKED_MODE)
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .io_context(|| format!("Failed to set mode {mode:o} on {}", path.display()))
}

/// Remove the installation tree. Failures are logged, never returned.
///
/// Directories are made owner-writable first so a locked tree can be removed
/// without superuser privileges.
pub fn remove_tree(root: &Path) {
    if fs::symlink_metadata(root).is_err() {
        return;
    }

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to walk {}: {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Err(e) = fs::set_permissions(entry.path(), fs::Permissions::from_mode(0o750)) {
            warn!("Failed to unlock {}: {e}", entry.path().display());
        }
    }

    if let Err(e) = fs::remove_dir_all(root) {
        warn!("Failed to remove {}: {e}", root.display());
    }
}
