//! Bootstrapping new service directories in the convention tree.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backend::BackendConfig;
use crate::config::Config;
use crate::error::{Result, WrapterError};
use crate::paths;
use crate::resolver;
use crate::templates::{self, Emitted, ServiceLocals};
use crate::types::{Component, Environment};

/// Suffix of the directory holding a custom service next to its parent.
pub const CUSTOM_SUFFIX: &str = "-custom";

/// Files written (or found) for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceFiles {
    pub environment: Environment,
    pub dir: PathBuf,
    pub files: Vec<Emitted>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CustomOutcome {
    /// The team directory does not exist; nothing was written.
    TeamMissing { dir: PathBuf },
    /// The parent service directory does not exist; nothing was written.
    ServiceMissing { dir: PathBuf },
    Created(ServiceFiles),
}

/// Map component labels to [`Component`]s. Every label must be offered by
/// `common_service.services`; duplicates collapse.
pub fn parse_components(cfg: &Config, labels: &[String]) -> Result<Vec<Component>> {
    let mut out = Vec::new();
    for label in labels {
        if !cfg.common_service.services.iter().any(|s| s == label) {
            return Err(WrapterError::ComponentUnknown(label.clone()));
        }
        let component: Component = label.parse()?;
        if !out.contains(&component) {
            out.push(component);
        }
    }
    Ok(out)
}

/// Write `locals.tf`, `main.tf`, `provider.tf` and `variables.tf` for
/// `team/service` under every requested environment. Existing files are kept.
pub fn create_service(
    root: &Path,
    cfg: &Config,
    environments: &[Environment],
    team: &str,
    service: &str,
    components: &[Component],
) -> Result<Vec<ServiceFiles>> {
    paths::validate_name(team)?;
    paths::validate_name(service)?;

    let module_source = cfg.common_service.module_source();
    let mut out = Vec::with_capacity(environments.len());
    for &environment in environments {
        let (account_id, region) = resolver::resolve_account_and_region(cfg, environment.as_str())?;
        let dir = paths::service_dir(root, &account_id, environment.as_str(), &region, team, service);
        tracing::info!(%environment, dir = %dir.display(), "creating service");

        let rendered = [
            templates::locals(&ServiceLocals {
                environment: environment.as_str(),
                region: &region,
                team,
                service,
                account_id: &account_id,
            }),
            templates::main(&module_source, components),
            templates::provider(),
            templates::variables(),
        ];
        let files = templates::emit(&dir, &rendered)?;
        out.push(ServiceFiles {
            environment,
            dir,
            files,
        });
    }
    Ok(out)
}

/// Write `<service>-custom/` beside an existing service: `settings.tf`,
/// `tfstate.tf` pointing at the parent's remote state, and `provider.tf`.
pub fn create_custom_service(
    root: &Path,
    cfg: &Config,
    environment: Environment,
    team: &str,
    service: &str,
) -> Result<CustomOutcome> {
    paths::validate_name(team)?;
    paths::validate_name(service)?;

    let (account_id, region) = resolver::resolve_account_and_region(cfg, environment.as_str())?;
    let service_dir = paths::service_dir(root, &account_id, environment.as_str(), &region, team, service);
    let team_dir = service_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| service_dir.clone());

    if !team_dir.is_dir() {
        return Ok(CustomOutcome::TeamMissing { dir: team_dir });
    }
    if !service_dir.is_dir() {
        return Ok(CustomOutcome::ServiceMissing { dir: service_dir });
    }

    // The custom stack reads the state written by the parent service.
    let ctx = resolver::derive_context(cfg.project(), &paths::to_slash(&service_dir), cfg)?;
    let location = BackendConfig::new(cfg, &ctx, String::new(), String::new());

    let dir = team_dir.join(format!("{service}{CUSTOM_SUFFIX}"));
    tracing::info!(%environment, dir = %dir.display(), key = %ctx.state_key, "creating custom service");
    let rendered = [
        templates::custom_settings(&account_id),
        templates::remote_state(&location),
        templates::provider(),
    ];
    let files = templates::emit(&dir, &rendered)?;
    Ok(CustomOutcome::Created(ServiceFiles {
        environment,
        dir,
        files,
    }))
}
