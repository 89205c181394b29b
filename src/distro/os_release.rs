//! Distribution detection from release metadata.
//!
//! `os-release` is preferred; hosts old enough to lack it still carry
//! `lsb-release` or one of the `*-release` banner files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{DistributionDescriptor, Family};
use crate::error::{InstallerError, Result};

static DOTTED_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:\.\d+)*").expect("static regex")
});

const BANNER_FILES: [&str; 2] = ["redhat-release", "SuSE-release"];

/// Relative to the parent of the release directory.
const VENDOR_OS_RELEASE: &str = "usr/lib/os-release";

/// Parse `KEY=value` lines, stripping optional quotes.
pub fn parse_key_values(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

fn from_os_release(contents: &str) -> Option<DistributionDescriptor> {
    let fields = parse_key_values(contents);
    let version = fields.get("VERSION_ID").cloned().unwrap_or_default();

    // NAME is not always descriptive enough (e.g. "SLES"), so fall back to
    // PRETTY_NAME when only it identifies the family.
    let name = match (fields.get("NAME"), fields.get("PRETTY_NAME")) {
        (Some(name), _) if Family::from_distribution_name(name).is_some() => name.clone(),
        (_, Some(pretty)) if Family::from_distribution_name(pretty).is_some() => pretty.clone(),
        (Some(name), _) => name.clone(),
        (None, Some(pretty)) => pretty.clone(),
        (None, None) => return None,
    };

    Some(DistributionDescriptor::new(name, version))
}

fn from_lsb_release(contents: &str) -> Option<DistributionDescriptor> {
    let fields = parse_key_values(contents);
    let name = fields.get("DISTRIB_ID")?;
    let version = fields.get("DISTRIB_RELEASE").cloned().unwrap_or_default();
    Some(DistributionDescriptor::new(name.clone(), version))
}

/// Parse a banner such as `CentOS Linux release 7.2.1511 (Core)`.
fn from_banner(contents: &str) -> Option<DistributionDescriptor> {
    let first = contents.lines().next()?.trim();
    if first.is_empty() {
        return None;
    }

    let name = match first.find(" release ") {
        Some(idx) => &first[..idx],
        None => first.split(" (").next().unwrap_or(first),
    };
    let version = DOTTED_VERSION_RE
        .find(contents)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Some(DistributionDescriptor::new(name.trim(), version))
}

/// Detect the host distribution from the release files under `release_dir`.
pub fn detect(release_dir: &Path) -> Result<DistributionDescriptor> {
    let read = |name: &str| fs::read_to_string(release_dir.join(name)).ok();
    // `/etc/os-release` is usually a link to the vendor copy, which may be
    // the only one present.
    let vendor_os_release = || {
        let path = release_dir.parent()?.join(VENDOR_OS_RELEASE);
        fs::read_to_string(path).ok()
    };

    let descriptor = read("os-release")
        .or_else(vendor_os_release)
        .and_then(|c| from_os_release(&c))
        .or_else(|| read("lsb-release").and_then(|c| from_lsb_release(&c)))
        .or_else(|| {
            BANNER_FILES
                .iter()
                .find_map(|file| read(file).and_then(|c| from_banner(&c)))
        });

    match descriptor {
        Some(d) => {
            debug!("Detected distribution {:?} version {:?}", d.name, d.version);
            Ok(d)
        }
        None => {
            error!(
                "Unable to determine Linux distribution from {}",
                release_dir.display()
            );
            Err(InstallerError::UnsupportedDistribution("unknown".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_os_release_centos() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("os-release"),
            "NAME=\"CentOS Linux\"\nVERSION=\"7 (Core)\"\nID=\"centos\"\nVERSION_ID=\"7\"\n",
        )
        .unwrap();

        let d = detect(dir.path()).unwrap();
        assert_eq!(d, DistributionDescriptor::new("CentOS Linux", "7"));
        assert_eq!(d.family(), Some(Family::RedHat));
    }

    #[test]
    fn test_os_release_prefers_descriptive_pretty_name() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("os-release"),
            "NAME=\"SLES\"\nVERSION_ID=\"12.3\"\nPRETTY_NAME=\"SUSE Linux Enterprise Server 12 SP3\"\n",
        )
        .unwrap();

        let d = detect(dir.path()).unwrap();
        assert_eq!(d.family(), Some(Family::Suse));
        assert_eq!(d.version, "12.3");
    }

    #[test]
    fn test_vendor_os_release_fallback() {
        let root = tempdir().unwrap();
        let etc = root.path().join("etc");
        let vendor = root.path().join("usr/lib");
        fs::create_dir_all(&etc).unwrap();
        fs::create_dir_all(&vendor).unwrap();
        fs::write(
            vendor.join("os-release"),
            "NAME=\"Ubuntu\"\nVERSION_ID=\"18.04\"\n",
        )
        .unwrap();
        fs::write(
            etc.join("lsb-release"),
            "DISTRIB_ID=Debian\nDISTRIB_RELEASE=9\n",
        )
        .unwrap();

        let d = detect(&etc).unwrap();
        assert_eq!(d, DistributionDescriptor::new("Ubuntu", "18.04"));
    }

    #[test]
    fn test_lsb_release_fallback() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("lsb-release"),
            "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=14.04\nDISTRIB_CODENAME=trusty\n",
        )
        .unwrap();

        let d = detect(dir.path()).unwrap();
        assert_eq!(d, DistributionDescriptor::new("Ubuntu", "14.04"));
    }

    #[test]
    fn test_redhat_banner_fallback() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("redhat-release"),
            "CentOS release 6.5 (Final)\n",
        )
        .unwrap();

        let d = detect(dir.path()).unwrap();
        assert_eq!(d, DistributionDescriptor::new("CentOS", "6.5"));
    }

    #[test]
    fn test_suse_banner_fallback() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("SuSE-release"),
            "SUSE Linux Enterprise Server 11 (x86_64)\nVERSION = 11\nPATCHLEVEL = 4\n",
        )
        .unwrap();

        let d = detect(dir.path()).unwrap();
        assert_eq!(d.name, "SUSE Linux Enterprise Server 11");
        assert_eq!(d.version, "11");
        assert_eq!(d.family(), Some(Family::Suse));
    }

    #[test]
    fn test_no_release_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            detect(dir.path()),
            Err(InstallerError::UnsupportedDistribution(_))
        ));
    }

    #[test]
    fn test_parse_key_values_skips_comments() {
        let fields = parse_key_values("# comment\nA=1\nB='two'\n\nbroken line\n");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["A"], "1");
        assert_eq!(fields["B"], "two");
    }
}
