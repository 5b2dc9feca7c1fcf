//! Derivation of remote-state coordinates from a working directory.
//!
//! Infrastructure lives in a tree shaped like
//! `<anything>/<account>/<environment>/<region>/<team>/<service...>`. Given a
//! directory inside that tree, the resolver recovers the environment (the
//! segment directly above the first recognized region code), maps it to an
//! account and region through the project config, checks that the directory
//! really sits under `<account>/<environment>/<region>`, and builds the state
//! key:
//!
//! ```text
//! <project>/<account>/<environment>/<region>/<service path>/service.tfstate
//! ```
//!
//! The key is the object path in the state bucket, so its format must never
//! change. Everything here is pure string work: no filesystem access, no
//! shared state.
//!
//! Known limitations, kept for compatibility with existing state objects:
//! - a service or team directory literally named like a region code is taken
//!   as the anchor if it is the leftmost one;
//! - the prefix is located with a literal substring search, so an earlier
//!   accidental occurrence of `<account>/<environment>/<region>` (for example
//!   inside a longer directory name) moves the cut point.

use crate::config::{Config, Profiles};
use crate::error::{Result, WrapterError};
use crate::paths;
use crate::region;
use crate::types::Environment;
use serde::Serialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// DerivedContext
// ---------------------------------------------------------------------------

/// Everything derived from one working directory. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedContext {
    /// Environment segment as it appears in the path.
    pub environment: String,
    pub account_id: String,
    pub region: String,
    /// `<account>/<environment>/<region>`
    pub expected_prefix: String,
    /// Path below the prefix, without a leading separator. Empty when the
    /// working directory is the region directory itself.
    pub relative_service_path: String,
    pub state_key: String,
}

// ---------------------------------------------------------------------------
// Environment extraction
// ---------------------------------------------------------------------------

/// Environment segment of `path`, or `None` when the path has no usable
/// region anchor.
///
/// Only the leftmost segment that is a catalog region counts. When that
/// segment is the very first one there is nothing above it and the result is
/// `None`. The root of an absolute path is not a segment either:
/// `/us-east-1/svc` has no environment.
pub fn find_environment(path: &str) -> Option<String> {
    let clean = paths::clean(path);
    let segments: Vec<&str> = clean.split(paths::SEPARATOR).collect();

    let index = segments.iter().position(|s| region::is_region(s))?;
    if index == 0 {
        return None;
    }
    Some(segments[index - 1])
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Same as [`find_environment`], with the empty string standing for "not
/// found".
pub fn extract_environment(path: &str) -> String {
    find_environment(path).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Account / region
// ---------------------------------------------------------------------------

/// Account stored under `environment`'s own profile key. The environment name
/// is matched case-insensitively; the account is returned verbatim.
pub fn resolve_account_id(profiles: &Profiles, environment: &str) -> Result<String> {
    let env: Environment = environment.parse()?;
    profiles
        .get(env)
        .map(str::to_string)
        .ok_or_else(|| WrapterError::EnvironmentNotConfigured(env.as_str().to_string()))
}

pub fn resolve_region(regions_by_account: &BTreeMap<String, String>, account_id: &str) -> Result<String> {
    regions_by_account
        .get(account_id)
        .filter(|region| !region.is_empty())
        .cloned()
        .ok_or_else(|| WrapterError::RegionNotConfigured(account_id.to_string()))
}

/// `(account, region)` for an environment. `dev` and `stable` share the
/// account of the `dev` profile; `prod` and `mgmt` use their own.
pub fn resolve_account_and_region(cfg: &Config, environment: &str) -> Result<(String, String)> {
    let env: Environment = environment.parse()?;
    let owner = env.account_owner();
    let account_id = resolve_account_id(&cfg.profiles, owner.as_str())?;
    let region = resolve_region(&cfg.default_regions, &account_id)?;
    Ok((account_id, region))
}

// ---------------------------------------------------------------------------
// State key
// ---------------------------------------------------------------------------

/// Full derivation for `working_dir`. `working_dir` must use `/` separators
/// (see [`paths::to_slash`]).
pub fn derive_context(project: &str, working_dir: &str, cfg: &Config) -> Result<DerivedContext> {
    let clean_dir = paths::clean(working_dir);

    let environment =
        find_environment(&clean_dir).ok_or_else(|| WrapterError::EnvironmentUndetermined {
            path: clean_dir.clone(),
        })?;
    tracing::debug!(%environment, dir = %clean_dir, "extracted environment");

    let (account_id, region) = resolve_account_and_region(cfg, &environment)?;

    let expected_prefix = paths::join(&[&account_id, &environment, &region]);
    tracing::debug!(%expected_prefix, "expected prefix");

    let start = clean_dir
        .find(&expected_prefix)
        .ok_or_else(|| WrapterError::PrefixMismatch {
            prefix: expected_prefix.clone(),
            path: clean_dir.clone(),
        })?;
    let rest = &clean_dir[start + expected_prefix.len()..];
    let relative_service_path = rest.strip_prefix(paths::SEPARATOR).unwrap_or(rest).to_string();

    let state_key = paths::join(&[
        project,
        &expected_prefix,
        &relative_service_path,
        paths::STATE_FILE_NAME,
    ]);
    tracing::debug!(%state_key, "constructed state key");

    Ok(DerivedContext {
        environment,
        account_id,
        region,
        expected_prefix,
        relative_service_path,
        state_key,
    })
}

/// State key for `working_dir`:
/// `<project>/<account>/<environment>/<region>/<service path>/service.tfstate`.
pub fn construct_state_key(project: &str, working_dir: &str, cfg: &Config) -> Result<String> {
    derive_context(project, working_dir, cfg).map(|ctx| ctx.state_key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> Config {
        Config::new("acme")
            .with_profile(Environment::Dev, "111111111")
            .with_profile(Environment::Prod, "222222222")
            .with_region("111111111", "us-east-1")
    }

    // -- extract_environment ------------------------------------------------

    #[test]
    fn environment_is_segment_above_region() {
        let cases = [
            ("/repo/111111111/dev/us-east-1/teamA/svcB", "dev"),
            ("/home/u/gitlab/scripts/111/prod/us-east-1/dwh/airbyte", "prod"),
            ("111/stable/eu-central-1", "stable"),
            ("/x/mgmt/us-west-2/", "mgmt"),
            ("/x/anything/us-west-2/a/b/c/d/e", "anything"),
        ];
        for (path, want) in cases {
            assert_eq!(extract_environment(path), want, "path {path}");
        }
    }

    #[test]
    fn no_region_yields_empty() {
        for path in ["", "/", "/repo/111/dev", "/repo/111/dev/ap-south-1/svc", "us-east"] {
            assert_eq!(extract_environment(path), "", "path {path:?}");
            assert_eq!(find_environment(path), None);
        }
    }

    #[test]
    fn region_as_first_segment_yields_empty() {
        assert_eq!(extract_environment("us-east-1"), "");
        assert_eq!(extract_environment("us-east-1/team/svc"), "");
        // Leftmost anchor decides even when a later region has a predecessor.
        assert_eq!(extract_environment("us-east-1/dev/us-west-2"), "");
        // Rooted paths: the empty root component is not an environment.
        assert_eq!(extract_environment("/us-east-1/svc"), "");
        assert_eq!(find_environment("/us-east-1/svc"), None);
        assert_eq!(find_environment("//us-east-1"), None);
    }

    #[test]
    fn leftmost_region_wins() {
        assert_eq!(
            extract_environment("/r/111/prod/us-east-1/team/eu-central-1/svc"),
            "prod"
        );
    }

    #[test]
    fn service_named_like_region_is_a_false_positive() {
        // Documented limitation: no region above, so the service dir anchors.
        assert_eq!(extract_environment("/r/team/us-west-2/code"), "team");
    }

    #[test]
    fn extraction_normalizes_first() {
        assert_eq!(extract_environment("/r/111/dev/x/../us-east-1/svc"), "dev");
        assert_eq!(extract_environment("/r/111/dev/./us-east-1//svc/"), "dev");
        assert_eq!(extract_environment("/r/111/dev/us-east-1/.."), "");
    }

    // -- account / region ---------------------------------------------------

    #[test]
    fn dev_and_stable_share_an_account() {
        let cfg = acme();
        let dev = resolve_account_and_region(&cfg, "dev").unwrap();
        let stable = resolve_account_and_region(&cfg, "stable").unwrap();
        assert_eq!(dev, stable);
        assert_eq!(dev, ("111111111".to_string(), "us-east-1".to_string()));
    }

    #[test]
    fn stable_profile_entry_is_not_consulted() {
        let cfg = acme().with_profile(Environment::Stable, "999");
        let (account, _) = resolve_account_and_region(&cfg, "stable").unwrap();
        assert_eq!(account, "111111111");
    }

    #[test]
    fn unknown_environment() {
        let err = resolve_account_and_region(&acme(), "qa").unwrap_err();
        assert!(matches!(err, WrapterError::UnknownEnvironment(ref e) if e == "qa"));
    }

    #[test]
    fn missing_profile() {
        let err = resolve_account_and_region(&acme(), "mgmt").unwrap_err();
        assert!(matches!(err, WrapterError::EnvironmentNotConfigured(ref e) if e == "mgmt"));
    }

    #[test]
    fn missing_region() {
        let err = resolve_account_and_region(&acme(), "prod").unwrap_err();
        assert!(matches!(err, WrapterError::RegionNotConfigured(ref a) if a == "222222222"));
    }

    #[test]
    fn resolve_account_id_is_case_insensitive() {
        let cfg = acme();
        assert_eq!(resolve_account_id(&cfg.profiles, "PROD").unwrap(), "222222222");
        assert_eq!(resolve_account_id(&cfg.profiles, "Dev").unwrap(), "111111111");
        assert!(matches!(
            resolve_account_id(&cfg.profiles, "stable").unwrap_err(),
            WrapterError::EnvironmentNotConfigured(_)
        ));
    }

    #[test]
    fn account_ids_are_case_sensitive() {
        let cfg = Config::new("acme")
            .with_profile(Environment::Dev, "AcctA")
            .with_region("accta", "us-east-1");
        let err = resolve_account_and_region(&cfg, "dev").unwrap_err();
        assert!(matches!(err, WrapterError::RegionNotConfigured(ref a) if a == "AcctA"));
    }

    #[test]
    fn empty_region_entry_is_missing() {
        let cfg = Config::new("acme")
            .with_profile(Environment::Dev, "1")
            .with_region("1", "");
        assert!(matches!(
            resolve_region(&cfg.default_regions, "1").unwrap_err(),
            WrapterError::RegionNotConfigured(_)
        ));
    }

    // -- construct_state_key ------------------------------------------------

    #[test]
    fn state_key_for_service_dir() {
        let key =
            construct_state_key("acme", "/repo/111111111/dev/us-east-1/teamA/svcB", &acme())
                .unwrap();
        assert_eq!(key, "acme/111111111/dev/us-east-1/teamA/svcB/service.tfstate");
    }

    #[test]
    fn state_key_for_stable_uses_dev_account() {
        let key =
            construct_state_key("acme", "/repo/111111111/stable/us-east-1/team/svc", &acme())
                .unwrap();
        assert_eq!(key, "acme/111111111/stable/us-east-1/team/svc/service.tfstate");
    }

    #[test]
    fn state_key_at_region_dir_has_no_empty_segment() {
        let key = construct_state_key("acme", "/repo/111111111/dev/us-east-1/", &acme()).unwrap();
        assert_eq!(key, "acme/111111111/dev/us-east-1/service.tfstate");
    }

    #[test]
    fn state_key_prefix_follows_project() {
        let cfg = acme();
        let ctx = derive_context("acme", "/r/111111111/dev/us-east-1/a/b/c", &cfg).unwrap();
        assert!(ctx.state_key.starts_with("acme/"));
        assert_eq!(&ctx.state_key["acme/".len()..][..ctx.expected_prefix.len()], "111111111/dev/us-east-1");
        assert!(!ctx.state_key.starts_with('/'));
        assert!(!ctx.state_key.contains("//"));
        assert_eq!(ctx.relative_service_path, "a/b/c");
        assert_eq!(ctx.region, "us-east-1");
        assert_eq!(ctx.account_id, "111111111");
        assert_eq!(ctx.environment, "dev");
    }

    #[test]
    fn state_key_is_deterministic() {
        let cfg = acme();
        let dir = "/repo/111111111/dev/us-east-1/teamA/svcB";
        assert_eq!(
            construct_state_key("acme", dir, &cfg).unwrap(),
            construct_state_key("acme", dir, &cfg).unwrap()
        );
    }

    #[test]
    fn distinct_services_get_distinct_keys() {
        let cfg = acme();
        let a = construct_state_key("acme", "/r/111111111/dev/us-east-1/team/a", &cfg).unwrap();
        let b = construct_state_key("acme", "/r/111111111/dev/us-east-1/team/b", &cfg).unwrap();
        let nested =
            construct_state_key("acme", "/r/111111111/dev/us-east-1/team/a/b", &cfg).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, nested);
    }

    #[test]
    fn missing_environment_segment_is_unknown_environment() {
        let err =
            construct_state_key("acme", "/repo/111111111/us-east-1/teamA/svcB", &acme()).unwrap_err();
        assert!(matches!(err, WrapterError::UnknownEnvironment(ref e) if e == "111111111"));
    }

    #[test]
    fn rooted_region_is_undetermined() {
        let err = construct_state_key("acme", "/us-east-1/svc", &acme()).unwrap_err();
        assert!(
            matches!(err, WrapterError::EnvironmentUndetermined { ref path } if path == "/us-east-1/svc")
        );
    }

    #[test]
    fn path_without_region_is_undetermined() {
        let err = construct_state_key("acme", "/repo/111111111/dev/teamA", &acme()).unwrap_err();
        assert!(
            matches!(err, WrapterError::EnvironmentUndetermined { ref path } if path == "/repo/111111111/dev/teamA")
        );
    }

    #[test]
    fn account_without_region_mapping() {
        let cfg = acme().with_profile(Environment::Mgmt, "333333333");
        let err = construct_state_key("acme", "/r/333333333/mgmt/us-east-1/ops", &cfg).unwrap_err();
        assert!(matches!(err, WrapterError::RegionNotConfigured(ref a) if a == "333333333"));
    }

    #[test]
    fn reordered_segments_are_a_prefix_mismatch() {
        let err =
            construct_state_key("acme", "/repo/dev/111111111/us-east-1/team/svc", &acme()).unwrap_err();
        // The segment above the region is the account, not an environment.
        assert!(matches!(err, WrapterError::UnknownEnvironment(_)));

        let err = construct_state_key("acme", "/repo/999/dev/us-east-1/team/svc", &acme()).unwrap_err();
        assert!(matches!(
            err,
            WrapterError::PrefixMismatch { ref prefix, .. } if prefix == "111111111/dev/us-east-1"
        ));
    }

    #[test]
    fn region_directory_differs_from_configured_region() {
        // Path anchors on us-west-2 but the dev account lives in us-east-1.
        let err = construct_state_key("acme", "/r/111111111/dev/us-west-2/svc", &acme()).unwrap_err();
        assert!(matches!(err, WrapterError::PrefixMismatch { .. }));
    }

    #[test]
    fn substring_match_is_literal() {
        // Account "1111" contains "111"; the literal search still finds the
        // prefix inside the longer segment and cuts after it.
        let cfg = Config::new("acme")
            .with_profile(Environment::Dev, "111")
            .with_region("111", "us-east-1");
        let key = construct_state_key("acme", "/r/1111/dev/us-east-1/svc", &cfg).unwrap();
        assert_eq!(key, "acme/111/dev/us-east-1/svc/service.tfstate");
    }

    #[test]
    fn earliest_prefix_occurrence_sets_the_cut_point() {
        let dir = "/r/111111111/dev/us-east-1-old/111111111/dev/us-east-1/svc";
        let ctx = derive_context("acme", dir, &acme()).unwrap();
        assert_eq!(ctx.relative_service_path, "-old/111111111/dev/us-east-1/svc");
    }

    #[test]
    fn only_one_leading_separator_is_stripped() {
        // Normalization already collapsed repeated separators, so the
        // remainder never starts with more than one.
        let ctx = derive_context("acme", "/r/111111111/dev/us-east-1//svc", &acme()).unwrap();
        assert_eq!(ctx.relative_service_path, "svc");
    }

    #[test]
    fn relative_working_dir() {
        let key = construct_state_key("acme", "111111111/dev/us-east-1/team/svc", &acme()).unwrap();
        assert_eq!(key, "acme/111111111/dev/us-east-1/team/svc/service.tfstate");
    }

    #[test]
    fn mixed_case_environment_segment_is_kept_verbatim() {
        let key = construct_state_key("acme", "/r/111111111/DEV/us-east-1/svc", &acme()).unwrap();
        assert_eq!(key, "acme/111111111/DEV/us-east-1/svc/service.tfstate");
    }
}
