use crate::error::Result;
use crate::paths;
use std::path::{Path, PathBuf};

/// `start` followed by every directory below it, depth-first, siblings in
/// name order. Any directory whose path below `start` mentions `.terraform`
/// is skipped together with its subtree. Symlinks are not followed.
pub fn list_dirs(start: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = vec![start.to_path_buf()];
    visit(start, start, &mut dirs)?;
    Ok(dirs)
}

fn visit(start: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut children: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            children.push(entry.path());
        }
    }
    children.sort();

    for child in children {
        if is_excluded(start, &child) {
            tracing::debug!(dir = %child.display(), "skipping");
            continue;
        }
        out.push(child.clone());
        visit(start, &child, out)?;
    }
    Ok(())
}

fn is_excluded(start: &Path, dir: &Path) -> bool {
    let relative = dir.strip_prefix(start).unwrap_or(dir);
    paths::to_slash(relative).contains(paths::TERRAFORM_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mkdirs(root: &Path, dirs: &[&str]) {
        for d in dirs {
            std::fs::create_dir_all(root.join(d)).unwrap();
        }
    }

    #[test]
    fn lists_start_and_descendants_in_order() {
        let dir = TempDir::new().unwrap();
        mkdirs(dir.path(), &["team/b", "team/a/nested", "other"]);
        std::fs::write(dir.path().join("team/main.tf"), "").unwrap();

        let got: Vec<PathBuf> = list_dirs(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        let want: Vec<PathBuf> = ["", "other", "team", "team/a", "team/a/nested", "team/b"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn skips_terraform_dirs_and_subtrees() {
        let dir = TempDir::new().unwrap();
        mkdirs(
            dir.path(),
            &["svc/.terraform/providers/x", "svc/modules", "svc2/.terraform.d"],
        );
        let got = list_dirs(dir.path()).unwrap();
        assert!(got.iter().all(|p| !p.to_string_lossy().contains(".terraform")));
        assert!(got.contains(&dir.path().join("svc/modules")));
        assert!(got.contains(&dir.path().join("svc2")));
    }

    #[test]
    fn start_is_always_listed() {
        let dir = TempDir::new().unwrap();
        let svc = dir.path().join("x.terraform");
        std::fs::create_dir_all(&svc).unwrap();
        assert_eq!(list_dirs(&svc).unwrap(), vec![svc]);
    }
}
