use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{InstallerError, IoContext, Result};

/// Installer configuration. Every field defaults to the production layout;
/// a TOML file only needs to name what it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Installation root holding the payload, config, logs and marker.
    pub install_root: PathBuf,
    /// SysV init script directory.
    pub init_dir: PathBuf,
    /// Directory of the installer bundle (payload, init script, config/).
    pub bundle_dir: PathBuf,
    pub daemon_name: String,
    pub package_name: String,
    /// initramfs generation config rewritten on RedHat-family hosts.
    pub dracut_conf: PathBuf,
    /// Directory holding `os-release` and the legacy `*-release` files.
    pub release_dir: PathBuf,
    /// Directory for the timestamped installer log.
    pub log_dir: PathBuf,
    /// Account that owns the locked-down installation tree.
    pub owner: String,
    /// Tools that must be on `PATH` before anything is changed.
    pub required_tools: Vec<String>,
    pub python: String,
    pub python_modules: Vec<String>,
    /// `pgrep -f` pattern identifying a running agent.
    pub agent_process_pattern: String,
    pub health_check: HealthCheckConfig,
    /// Executable copied into `bin/` so the installed tree can uninstall itself.
    pub uninstaller: PathBuf,
    /// Extra bundle files (relative to `bundle_dir`) copied into `bin/`.
    pub auxiliary_files: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    pub attempts: u32,
    pub interval_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            interval_secs: 3,
        }
    }
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("ngt-installer"));
        let bundle_dir = exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            install_root: PathBuf::from("/usr/local/nutanix"),
            init_dir: PathBuf::from("/etc/init.d"),
            bundle_dir,
            daemon_name: "ngt_guest_agent".to_string(),
            package_name: "ngt_guest_agent.tar.gz".to_string(),
            dracut_conf: PathBuf::from("/etc/dracut.conf"),
            release_dir: PathBuf::from("/etc"),
            log_dir: PathBuf::from("/tmp"),
            owner: "root".to_string(),
            required_tools: vec!["dmidecode".to_string()],
            python: "python".to_string(),
            python_modules: vec!["setuptools".to_string()],
            agent_process_pattern: "guest_agent_monitor_linux.py".to_string(),
            health_check: HealthCheckConfig::default(),
            uninstaller: exe,
            auxiliary_files: vec!["License.txt".to_string()],
        }
    }
}

impl InstallerConfig {
    /// Load overrides from a TOML file, or return the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path)
            .io_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .map_err(|e| InstallerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn config_dir(&self) -> PathBuf {
        self.install_root.join("config")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.install_root.join("logs")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.install_root.join("bin")
    }

    /// Completion marker; its existence alone means "installed".
    pub fn marker_path(&self) -> PathBuf {
        self.config_dir().join("ngt_marker")
    }

    pub fn installed_version_file(&self) -> PathBuf {
        self.config_dir().join("ngt_config.json")
    }

    pub fn container_config(&self) -> PathBuf {
        self.config_dir().join("containers.config")
    }

    pub fn daemon_log(&self) -> PathBuf {
        self.logs_dir().join("guest_agent_stdout.log")
    }

    pub fn init_script_path(&self) -> PathBuf {
        self.init_dir.join(&self.daemon_name)
    }

    /// Where the payload archive is staged inside the installation root.
    pub fn staged_package(&self) -> PathBuf {
        self.install_root.join(&self.package_name)
    }

    pub fn bundle_config_dir(&self) -> PathBuf {
        self.bundle_dir.join("config")
    }

    pub fn bundle_version_file(&self) -> PathBuf {
        self.bundle_config_dir().join("ngt_config.json")
    }

    pub fn bundle_package(&self) -> PathBuf {
        self.bundle_dir.join(&self.package_name)
    }

    pub fn bundle_init_script(&self) -> PathBuf {
        self.bundle_dir.join(&self.daemon_name)
    }
}

/// Version metadata shipped in `ngt_config.json`.
#[derive(Debug, Deserialize)]
struct VersionInfo {
    ngt_version: String,
}

/// Read `ngt_version` from a JSON config file.
pub fn read_ngt_version(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .io_context(|| format!("failed to read version config {}", path.display()))?;
    let info: VersionInfo = serde_json::from_str(&raw)
        .map_err(|e| InstallerError::Config(format!("{}: {e}", path.display())))?;
    Ok(info.ngt_version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_production_layout() {
        let cfg = InstallerConfig::default();
        assert_eq!(
            cfg.marker_path(),
            PathBuf::from("/usr/local/nutanix/config/ngt_marker")
        );
        assert_eq!(
            cfg.init_script_path(),
            PathBuf::from("/etc/init.d/ngt_guest_agent")
        );
        assert_eq!(
            cfg.container_config(),
            PathBuf::from("/usr/local/nutanix/config/containers.config")
        );
        assert_eq!(cfg.health_check.attempts, 5);
        assert_eq!(cfg.health_check.interval(), Duration::from_secs(3));
        assert_eq!(cfg.log_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("installer.toml");
        fs::write(
            &path,
            "install_root = \"/opt/guest\"\n\n[health_check]\ninterval_secs = 0\n",
        )
        .unwrap();

        let cfg = InstallerConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.install_root, PathBuf::from("/opt/guest"));
        assert_eq!(cfg.logs_dir(), PathBuf::from("/opt/guest/logs"));
        assert_eq!(cfg.health_check.interval_secs, 0);
        assert_eq!(cfg.health_check.attempts, 5);
        assert_eq!(cfg.daemon_name, "ngt_guest_agent");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "install_root = [").unwrap();
        assert!(matches!(
            InstallerConfig::load(Some(&path)),
            Err(InstallerError::Config(_))
        ));
    }

    #[test]
    fn test_read_ngt_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ngt_config.json");
        fs::write(&path, r#"{"ngt_version": "1.5.0", "other": 1}"#).unwrap();
        assert_eq!(read_ngt_version(&path).unwrap(), "1.5.0");
    }

    #[test]
    fn test_read_ngt_version_failures() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            read_ngt_version(&missing),
            Err(InstallerError::Io { .. })
        ));

        let no_field = dir.path().join("no_field.json");
        fs::write(&no_field, r#"{"version": "1.0"}"#).unwrap();
        assert!(matches!(
            read_ngt_version(&no_field),
            Err(InstallerError::Config(_))
        ));
    }
}
