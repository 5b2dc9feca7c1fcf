use crate::output::{print_json, print_table};
use crate::session::Session;
use anyhow::Context;
use clap::Args;
use std::path::Path;
use wrapter_core::scaffold::{self, CustomOutcome, ServiceFiles};
use wrapter_core::templates::Emitted;
use wrapter_core::types::Environment;

#[derive(Args)]
pub struct CreateArgs {
    /// Target environment (repeatable): dev, stable, prod
    #[arg(long = "env", required = true, value_parser = service_environment)]
    environments: Vec<Environment>,

    /// Team directory name
    #[arg(long)]
    team: String,

    /// Service directory name
    #[arg(long)]
    service: String,

    /// Component to enable (repeatable), one of common_service.services
    #[arg(long = "component")]
    components: Vec<String>,

    /// Add a <service>-custom stack next to an existing service
    #[arg(long)]
    custom: bool,
}

fn service_environment(s: &str) -> Result<Environment, String> {
    match s.parse::<Environment>() {
        Ok(Environment::Mgmt) | Err(_) => Err(format!(
            "invalid environment '{s}': expected one of dev, stable, prod"
        )),
        Ok(env) => Ok(env),
    }
}

pub fn run(session: &Session, args: CreateArgs) -> anyhow::Result<()> {
    let cfg = session.load_config()?;

    let created = if args.custom {
        if !args.components.is_empty() {
            tracing::warn!("--component is ignored for custom services");
        }
        let mut created = Vec::new();
        for &env in &args.environments {
            let outcome =
                scaffold::create_custom_service(&session.root, &cfg, env, &args.team, &args.service)
                    .with_context(|| format!("failed to create custom service for {env}"))?;
            match outcome {
                CustomOutcome::Created(files) => created.push(files),
                CustomOutcome::TeamMissing { dir } => println!(
                    "Team directory {} does not exist. Create the service first with \
                     `wrapter create` (without --custom).",
                    dir.display()
                ),
                CustomOutcome::ServiceMissing { dir } => println!(
                    "Service directory {} does not exist. Create the service first with \
                     `wrapter create` (without --custom).",
                    dir.display()
                ),
            }
        }
        created
    } else {
        let components = scaffold::parse_components(&cfg, &args.components)?;
        scaffold::create_service(
            &session.root,
            &cfg,
            &args.environments,
            &args.team,
            &args.service,
            &components,
        )
        .context("failed to create service")?
    };

    if session.json {
        return print_json(&created);
    }
    if !created.is_empty() {
        print_table(&["ENV", "STATUS", "FILE"], &rows(&session.root, &created));
    }
    Ok(())
}

fn rows(root: &Path, created: &[ServiceFiles]) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for service in created {
        for file in &service.files {
            let (status, path) = match file {
                Emitted::Created(p) => ("created", p),
                Emitted::Exists(p) => ("exists", p),
            };
            let shown = path.strip_prefix(root).unwrap_or(path);
            rows.push(vec![
                service.environment.to_string(),
                status.to_string(),
                shown.display().to_string(),
            ]);
        }
    }
    rows
}
