//! Presence checks for the external binaries a command needs.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{Result, WrapterError};

pub const TOFU: &str = "tofu";
pub const TFLINT: &str = "tflint";
pub const TERRAFORM_DOCS: &str = "terraform-docs";

/// Locate `name` on `PATH`. A zero-byte file counts as missing.
pub fn check_binary(name: &str) -> Result<PathBuf> {
    let path = which::which(name).map_err(|_| WrapterError::BinaryNotFound(name.to_string()))?;
    ensure_non_empty(name, &path)?;
    Ok(path)
}

/// Like [`check_binary`], searching only `search_path`.
pub fn check_binary_in(name: &str, search_path: &OsStr) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let path = which::which_in(name, Some(search_path), cwd)
        .map_err(|_| WrapterError::BinaryNotFound(name.to_string()))?;
    ensure_non_empty(name, &path)?;
    Ok(path)
}

/// Check every binary in order, stopping at the first missing one.
pub fn verify(binaries: &[&str]) -> Result<()> {
    for name in binaries {
        let path = check_binary(name)?;
        tracing::debug!(binary = name, path = %path.display(), "found");
    }
    Ok(())
}

fn ensure_non_empty(name: &str, path: &Path) -> Result<()> {
    if std::fs::metadata(path)?.len() == 0 {
        return Err(WrapterError::EmptyBinary(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_binary() {
        let err = check_binary("wrapter-no-such-binary-xyz").unwrap_err();
        assert!(matches!(err, WrapterError::BinaryNotFound(ref b) if b == "wrapter-no-such-binary-xyz"));
    }

    #[cfg(unix)]
    fn install(dir: &Path, name: &str, content: &[u8]) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn empty_binary_is_rejected() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "tofu", b"");
        let err = check_binary_in("tofu", dir.path().as_os_str()).unwrap_err();
        assert!(matches!(err, WrapterError::EmptyBinary(ref b) if b == "tofu"));
    }

    #[cfg(unix)]
    #[test]
    fn present_binary_is_found() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "tflint", b"#!/bin/sh\nexit 0\n");
        let path = check_binary_in("tflint", dir.path().as_os_str()).unwrap();
        assert!(path.ends_with("tflint"));
    }

    #[test]
    fn verify_stops_at_first_missing() {
        let err = verify(&["wrapter-missing-a", "wrapter-missing-b"]).unwrap_err();
        assert!(matches!(err, WrapterError::BinaryNotFound(ref b) if b == "wrapter-missing-a"));
    }
}
