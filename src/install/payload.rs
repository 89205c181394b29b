//! Payload staging: the agent archive, bundled config and the `bin/` extras.

use std::fs::{self, File};
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, info};
use tar::Archive;

use crate::config::InstallerConfig;
use crate::error::{IoContext, Result};

fn copy_file(source: &Path, target: &Path) -> Result<()> {
    debug!("Copying {} to {}", source.display(), target.display());
    fs::copy(source, target).io_context(|| {
        format!("Failed to copy {} to {}", source.display(), target.display())
    })?;
    Ok(())
}

/// Stage the bundled archive inside the installation root and unpack it there.
pub fn stage_and_extract(config: &InstallerConfig) -> Result<()> {
    let staged = config.staged_package();
    copy_file(&config.bundle_package(), &staged)?;

    info!("Extracting guest agent package.");
    let file = File::open(&staged)
        .io_context(|| format!("Failed to open package {}", staged.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.unpack(&config.install_root).io_context(|| {
        format!(
            "Failed to extract {} into {}",
            staged.display(),
            config.install_root.display()
        )
    })?;
    Ok(())
}

/// Copy the regular files of the bundle's `config/` into the installation's
/// `config/`. Subdirectories are not descended into.
pub fn copy_bundle_config(config: &InstallerConfig) -> Result<usize> {
    let source_dir = config.bundle_config_dir();
    let target_dir = config.config_dir();
    fs::create_dir_all(&target_dir)
        .io_context(|| format!("Failed to create {}", target_dir.display()))?;

    let mut copied = 0;
    for entry in fs::read_dir(&source_dir)
        .io_context(|| format!("Failed to read {}", source_dir.display()))?
    {
        let entry = entry.io_context(|| format!("Failed to read {}", source_dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        copy_file(&path, &target_dir.join(entry.file_name()))?;
        copied += 1;
    }

    debug!("Copied {copied} config files from {}", source_dir.display());
    Ok(copied)
}

/// Place the uninstaller and the auxiliary bundle files in `bin/`.
pub fn install_auxiliary_files(config: &InstallerConfig) -> Result<()> {
    let bin = config.bin_dir();
    fs::create_dir_all(&bin).io_context(|| format!("Failed to create {}", bin.display()))?;

    let uninstaller_name = config
        .uninstaller
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ngt-installer".into());
    copy_file(&config.uninstaller, &bin.join(uninstaller_name))?;

    for name in &config.auxiliary_files {
        copy_file(&config.bundle_dir.join(name), &bin.join(name))?;
    }
    Ok(())
}

/// Delete the staged archive once its contents are in place.
pub fn remove_staged_package(config: &InstallerConfig) -> Result<()> {
    let staged = config.staged_package();
    if staged.exists() {
        fs::remove_file(&staged)
            .io_context(|| format!("Failed to remove {}", staged.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::testing::Bundle;

    #[test]
    fn test_stage_and_extract() {
        let bundle = Bundle::new("1.5.0");
        let config = bundle.config();
        fs::create_dir_all(&config.install_root).unwrap();

        stage_and_extract(&config).unwrap();

        assert!(config.staged_package().exists());
        assert_eq!(
            fs::read_to_string(config.install_root.join("python/bin/guest_agent_monitor_linux.py"))
                .unwrap(),
            "print('agent')\n"
        );

        remove_staged_package(&config).unwrap();
        assert!(!config.staged_package().exists());
        remove_staged_package(&config).unwrap();
    }

    #[test]
    fn test_missing_package_fails() {
        let bundle = Bundle::new("1.5.0");
        let config = bundle.config();
        fs::create_dir_all(&config.install_root).unwrap();
        fs::remove_file(config.bundle_package()).unwrap();
        assert!(stage_and_extract(&config).is_err());
    }

    #[test]
    fn test_copy_bundle_config_skips_directories() {
        let bundle = Bundle::new("1.5.0");
        let config = bundle.config();
        fs::create_dir_all(config.bundle_config_dir().join("nested")).unwrap();

        assert_eq!(copy_bundle_config(&config).unwrap(), 1);
        assert!(config.installed_version_file().exists());
        assert!(!config.config_dir().join("nested").exists());
    }

    #[test]
    fn test_install_auxiliary_files() {
        let bundle = Bundle::new("1.5.0");
        let config = bundle.config();

        install_auxiliary_files(&config).unwrap();

        assert!(config.bin_dir().join("ngt-uninstaller").exists());
        assert!(config.bin_dir().join("License.txt").exists());
    }
}
