use anyhow::Context;
use std::path::{Path, PathBuf};
use wrapter_core::paths;

/// Resolve the directory a command operates on.
///
/// `--dir` / `WRAPTER_DIR` when given (relative paths are taken from the
/// current directory), otherwise the current directory itself.
pub fn resolve_dir(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(match explicit {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => cwd.join(p),
        None => cwd,
    })
}

/// Resolve the repository root.
///
/// Priority:
/// 1. `--root` flag / `WRAPTER_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `dir` looking for `.git`
pub fn resolve_root(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    paths::find_git_root(dir).context("cannot locate the repository root; pass --root")
}
