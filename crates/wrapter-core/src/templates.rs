//! Terraform files written when bootstrapping a service.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backend::BackendConfig;
use crate::error::Result;
use crate::io;
use crate::types::Component;

pub const LOCALS_TF: &str = "locals.tf";
pub const MAIN_TF: &str = "main.tf";
pub const PROVIDER_TF: &str = "provider.tf";
pub const VARIABLES_TF: &str = "variables.tf";
pub const SETTINGS_TF: &str = "settings.tf";
pub const TFSTATE_TF: &str = "tfstate.tf";

const PROVIDER_CONTENT: &str = r#"terraform {
  required_version = ">= 1.0.0"
  backend "s3" {
    skip_credentials_validation = true
    skip_metadata_api_check     = true
  }
}
"#;

const VARIABLES_CONTENT: &str = r#"variable "SERVICES_TOKEN" {
  type = string
}

output "outputs" {
  value = module.common_modules
}
"#;

/// Locals shared by every generated service, after the service-specific ones.
const SHARED_LOCALS: &str = r#"  ad_ou_dn             = "OU=company,DC=example,DC=local"
  scope                = "global"
  category             = "security"
  path                 = "iac"
  infra_path           = "infra"
  pg_path              = "postgresql"
  mongo_path           = "mongodb"
  keycloak_path        = "keycloak"
  vault_mount_path     = "vss1"
  services_secret_path = "services"
  secret               = "secret"
  callback_url         = "http://localhost:8080/callback"
"#;

/// A file ready to be written into a service directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub name: &'static str,
    pub content: String,
}

impl RenderedFile {
    fn new(name: &'static str, content: impl Into<String>) -> Self {
        Self {
            name,
            content: content.into(),
        }
    }
}

/// Service identity baked into `locals.tf`.
#[derive(Debug, Clone)]
pub struct ServiceLocals<'a> {
    pub environment: &'a str,
    pub region: &'a str,
    pub team: &'a str,
    pub service: &'a str,
    pub account_id: &'a str,
}

pub fn provider() -> RenderedFile {
    RenderedFile::new(PROVIDER_TF, PROVIDER_CONTENT)
}

pub fn variables() -> RenderedFile {
    RenderedFile::new(VARIABLES_TF, VARIABLES_CONTENT)
}

pub fn locals(l: &ServiceLocals<'_>) -> RenderedFile {
    let content = format!(
        "locals {{\n\
         \x20 env                  = \"{}\"\n\
         \x20 region               = \"{}\"\n\
         \x20 team                 = \"{}\"\n\
         \x20 service_name         = \"{}\"\n\
         \x20 account_id           = \"{}\"\n\
         {SHARED_LOCALS}}}\n",
        l.environment, l.region, l.team, l.service, l.account_id
    );
    RenderedFile::new(LOCALS_TF, content)
}

/// `main.tf` instantiating the shared module. Only enabled components get a
/// flag line; the module defaults the rest to off.
pub fn main(module_source: &str, components: &[Component]) -> RenderedFile {
    let mut out = format!("module \"common_modules\" {{\n  source               = \"{module_source}\"\n");
    for input in [
        "env",
        "team",
        "service_name",
        "scope",
        "category",
        "ad_ou_dn",
        "callback_url",
        "vault_mount_path",
        "region",
        "infra_path",
        "account_id",
        "path",
        "pg_path",
        "mongo_path",
        "keycloak_path",
        "services_secret_path",
        "secret",
    ] {
        out.push_str(&format!("  {input:<20} = local.{input}\n"));
    }
    out.push_str("  SERVICES_TOKEN       = var.SERVICES_TOKEN\n");

    for component in Component::all() {
        if components.contains(component) {
            out.push_str(&format!("  {:<20} = true\n", component.flag()));
        }
    }
    out.push_str("}\n");
    RenderedFile::new(MAIN_TF, out)
}

/// `settings.tf` of a custom service: identity comes from the parent
/// service's remote state.
pub fn custom_settings(account_id: &str) -> RenderedFile {
    let from_state = "data.terraform_remote_state.wrapter.outputs.service_outputs.settings";
    let content = format!(
        "locals {{\n\
         \x20 service_name         = {from_state}.name\n\
         \x20 region               = {from_state}.region\n\
         \x20 team                 = {from_state}.team\n\
         \x20 env                  = {from_state}.env\n\
         \x20 account_id           = \"{account_id}\"\n\
         {SHARED_LOCALS}}}\n\
         \n\
         variable \"MINIO_ACCESS_KEY\" {{\n  type = string\n}}\n\
         variable \"MINIO_SECRET_KEY\" {{\n  type = string\n}}\n"
    );
    RenderedFile::new(SETTINGS_TF, content)
}

/// `tfstate.tf` reading the parent service's state. Credentials stay
/// variables; only the location is rendered.
pub fn remote_state(backend: &BackendConfig) -> RenderedFile {
    let content = format!(
        r#"data "terraform_remote_state" "wrapter" {{
  backend = "s3"
  config = {{
    endpoint                    = "{}"
    bucket                      = "{}"
    key                         = "{}"
    region                      = "{}"
    access_key                  = var.MINIO_ACCESS_KEY
    secret_key                  = var.MINIO_SECRET_KEY
    skip_credentials_validation = true
    skip_metadata_api_check     = true
    skip_requesting_account_id  = true
  }}
}}
"#,
        backend.endpoint, backend.bucket, backend.key, backend.region
    );
    RenderedFile::new(TFSTATE_TF, content)
}

/// Outcome of writing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "lowercase")]
pub enum Emitted {
    Created(PathBuf),
    /// Left untouched because it already existed.
    Exists(PathBuf),
}

/// Write `files` into `dir`, never overwriting existing files.
pub fn emit(dir: &Path, files: &[RenderedFile]) -> Result<Vec<Emitted>> {
    io::ensure_dir(dir)?;
    let mut out = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(file.name);
        if io::write_if_missing(&path, file.content.as_bytes())? {
            out.push(Emitted::Created(path));
        } else {
            out.push(Emitted::Exists(path));
        }
    }
    Ok(out)
}
