//! Atomic file rewrites for system configuration files.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{IoContext, Result};

/// Replace `path` with `content` via a sibling temp file and rename, keeping
/// the permissions of the file being replaced.
pub(super) fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let previous = fs::metadata(path).ok().map(|m| m.permissions());

    {
        let mut file = fs::File::create(&temp_path)
            .io_context(|| format!("Failed to create temp file {}", temp_path.display()))?;

        file.write_all(content.as_bytes())
            .io_context(|| format!("Failed to write temp file {}", temp_path.display()))?;

        file.sync_all()
            .io_context(|| format!("Failed to sync temp file {}", temp_path.display()))?;
    }

    if let Some(perms) = previous {
        fs::set_permissions(&temp_path, perms)
            .io_context(|| format!("Failed to set permissions on {}", temp_path.display()))?;
    }

    fs::rename(&temp_path, path)
        .io_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
