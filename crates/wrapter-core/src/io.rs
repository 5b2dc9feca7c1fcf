use crate::error::Result;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Stage `data` in a tempfile next to `path` so the final rename stays on
/// one filesystem.
fn staged(path: &Path, data: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Replace `path` with `data` in one rename (used for `tfplan.json`).
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    staged(path, data)?.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Create `path` with `data` unless something is already there. Returns
/// false when the existing file was left alone, including one that appeared
/// while `data` was being staged.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    match staged(path, data)?.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_replaces_plan_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tfplan.json");
        std::fs::write(&path, b"{\"old\":true}").unwrap();
        atomic_write(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn atomic_write_creates_service_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("111/dev/us-east-1/team/svc/main.tf");
        atomic_write(&path, b"module {}").unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn write_if_missing_creates_then_keeps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locals.tf");
        assert!(write_if_missing(&path, b"first").unwrap());
        assert!(!write_if_missing(&path, b"second").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn write_if_missing_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("provider.tf");
        std::fs::write(&path, b"mine").unwrap();
        write_if_missing(&path, b"generated").unwrap();
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
