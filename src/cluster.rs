//! Talos version extraction from the cluster machine config
//!
//! The control-plane machine config pins the Talos release through its
//! installer image reference (`machine.install.image`), which always ends in
//! a `:vX.Y.Z` tag. Only the minor version (`X.Y`) matters for the support
//! matrix lookup.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SyncError};

/// Trailing image tag, e.g. `factory.talos.dev/installer/abc:v1.12.3`
static IMAGE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":v(\d+\.\d+)\.\d+$").unwrap());

/// Bare minor version as accepted on the command line
static MINOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+$").unwrap());

/// Validate a Talos minor version given on the command line.
///
/// Returns the version unchanged so call sites can use it inline.
pub fn validate_minor(version: &str) -> Result<String> {
    if MINOR_RE.is_match(version) {
        Ok(version.to_string())
    } else {
        Err(SyncError::InvalidVersionFormat(version.to_string()))
    }
}

/// Extract the Talos minor version from the cluster control-plane config.
///
/// Navigates `machine.install.image` and pulls `X.Y` out of the trailing
/// `:vX.Y.Z` tag of the installer image reference.
pub fn extract_talos_version(config_path: &Path) -> Result<String> {
    if !config_path.exists() {
        return Err(SyncError::ConfigMissing(config_path.to_path_buf()));
    }

    let content = fs::read_to_string(config_path)?;
    let config: serde_yaml::Value = serde_yaml::from_str(&content)?;

    let image = config
        .get("machine")
        .and_then(|m| m.get("install"))
        .and_then(|i| i.get("image"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            SyncError::ConfigMalformed(format!(
                "no machine.install.image in {}",
                config_path.display()
            ))
        })?;

    log::debug!("installer image: {}", image);

    let captures = IMAGE_TAG_RE.captures(image).ok_or_else(|| {
        SyncError::ConfigMalformed(format!(
            "could not extract Talos version from installer image {:?}",
            image
        ))
    })?;

    Ok(captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn extracts_minor_from_installer_image() {
        let file = write_config(
            "machine:\n  install:\n    image: factory.talos.dev/installer/4a0d65c:v1.12.3\n",
        );
        assert_eq!(extract_talos_version(file.path()).unwrap(), "1.12");
    }

    #[test]
    fn rejects_image_without_version_tag() {
        let file = write_config("machine:\n  install:\n    image: ghcr.io/siderolabs/installer\n");
        let err = extract_talos_version(file.path()).unwrap_err();
        assert!(matches!(err, SyncError::ConfigMalformed(_)));
    }

    #[test]
    fn rejects_config_without_install_image() {
        let file = write_config("machine:\n  network:\n    hostname: cp-1\n");
        let err = extract_talos_version(file.path()).unwrap_err();
        assert!(matches!(err, SyncError::ConfigMalformed(_)));
    }

    #[test]
    fn missing_file_is_config_missing() {
        let err = extract_talos_version(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, SyncError::ConfigMissing(_)));
    }

    #[test]
    fn validates_minor_version_format() {
        assert_eq!(validate_minor("1.12").unwrap(), "1.12");
        assert!(validate_minor("1.12.3").is_err());
        assert!(validate_minor("v1.12").is_err());
        assert!(validate_minor("latest").is_err());
    }
}
