use crate::error::{Result, WrapterError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "invoke.yaml";
pub const TF_CLI_CONFIG_FILE: &str = "terraform.tfrc";
pub const STATE_FILE_NAME: &str = "service.tfstate";
pub const PLAN_BINARY: &str = "tfplan.bin";
pub const PLAN_JSON: &str = "tfplan.json";
pub const TERRAFORM_DIR: &str = ".terraform";

pub const SEPARATOR: char = '/';

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn tf_cli_config_path(root: &Path) -> PathBuf {
    root.join(TF_CLI_CONFIG_FILE)
}

/// Directory of a service inside the convention tree:
/// `<root>/<account>/<env>/<region>/<team>/<service>`.
pub fn service_dir(
    root: &Path,
    account_id: &str,
    environment: &str,
    region: &str,
    team: &str,
    service: &str,
) -> PathBuf {
    root.join(account_id)
        .join(environment)
        .join(region)
        .join(team)
        .join(service)
}

/// Walk upward from `start` to the first directory containing `.git`.
pub fn find_git_root(start: &Path) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(".git").exists() {
            return Ok(dir);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => return Err(WrapterError::GitRootNotFound(start.display().to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexical normalization
// ---------------------------------------------------------------------------

/// Purely lexical cleanup of a slash-separated path, without touching the
/// filesystem:
///
/// - repeated separators collapse into one,
/// - `.` segments are dropped,
/// - `..` removes the preceding segment (at the root of an absolute path it
///   is dropped; in a relative path with nothing to remove it is kept),
/// - trailing separators are trimmed,
/// - an empty result becomes `.`.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with(SEPARATOR);
    let mut out: Vec<&str> = Vec::new();

    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ if rooted => {}
                _ => out.push(".."),
            },
            s => out.push(s),
        }
    }

    let joined = out.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Join non-empty parts with `/` and clean the result.
pub fn join(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return String::new();
    }
    clean(&joined)
}

/// Render a filesystem path with forward slashes.
pub fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == SEPARATOR {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_\-]*$").unwrap())
}

/// Team and service names become directory names and Terraform strings.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 || !name_re().is_match(name) {
        return Err(WrapterError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clean_cases() {
        let cases = [
            ("", "."),
            (".", "."),
            ("/", "/"),
            ("//", "/"),
            ("/a/b/", "/a/b"),
            ("/a//b", "/a/b"),
            ("/a/./b", "/a/b"),
            ("/a/b/../c", "/a/c"),
            ("/../a", "/a"),
            ("a/../..", ".."),
            ("../../x", "../../x"),
            ("a/b/..", "a"),
            ("a/", "a"),
        ];
        for (input, want) in cases {
            assert_eq!(clean(input), want, "clean({input:?})");
        }
    }

    #[test]
    fn join_skips_empty_parts() {
        assert_eq!(join(&["acme", "1/dev/us-east-1", "", "service.tfstate"]),
            "acme/1/dev/us-east-1/service.tfstate");
        assert_eq!(join(&["a", "b/"]), "a/b");
        assert_eq!(join(&["", ""]), "");
    }

    #[test]
    fn service_dir_layout() {
        let root = Path::new("/repo");
        assert_eq!(
            service_dir(root, "111", "dev", "us-east-1", "team", "svc"),
            PathBuf::from("/repo/111/dev/us-east-1/team/svc")
        );
        assert_eq!(config_path(root), PathBuf::from("/repo/invoke.yaml"));
        assert_eq!(tf_cli_config_path(root), PathBuf::from("/repo/terraform.tfrc"));
    }

    #[test]
    fn find_git_root_walks_upward() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let deep = dir.path().join("111/dev/us-east-1/team");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(find_git_root(&deep).unwrap(), dir.path());
    }

    #[test]
    fn valid_names() {
        for name in ["payments", "a", "ledger-api", "dwh_2", "9lives"] {
            validate_name(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_names() {
        let long = "x".repeat(65);
        for name in ["", "-lead", "Upper", "has space", "a/b", "..", long.as_str()] {
            assert!(validate_name(name).is_err(), "expected invalid: {name}");
        }
    }
}
