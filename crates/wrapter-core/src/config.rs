use crate::error::{Result, WrapterError};
use crate::paths;
use crate::region;
use crate::types::{Component, Environment};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TofuConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TofuConfig {
    #[serde(default)]
    pub version: String,
    /// Namespace of every state key and prefix of the state bucket name.
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub region: String,
}

// ---------------------------------------------------------------------------
// CommonServiceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommonServiceConfig {
    #[serde(default)]
    pub bootstrap_url: String,
    #[serde(default)]
    pub module_git_url: String,
    #[serde(default)]
    pub module_version: String,
    /// Component labels offered when bootstrapping a service.
    #[serde(default)]
    pub services: Vec<String>,
}

impl CommonServiceConfig {
    /// `<module_git_url>?ref=<module_version>`
    pub fn module_source(&self) -> String {
        format!("{}?ref={}", self.module_git_url, self.module_version)
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Environment → account identifier, built once at load time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Profiles(BTreeMap<Environment, String>);

impl Profiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, env: Environment, account_id: impl Into<String>) {
        self.0.insert(env, account_id.into());
    }

    /// Account stored under exactly this environment's key. Empty entries
    /// count as missing.
    pub fn get(&self, env: Environment) -> Option<&str> {
        self.0
            .get(&env)
            .map(String::as_str)
            .filter(|account| !account.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Environment, &str)> {
        self.0.iter().map(|(env, account)| (*env, account.as_str()))
    }
}

impl<'de> Deserialize<'de> for Profiles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = scalar_map(deserializer)?;
        let mut profiles = Profiles::new();
        for (key, account) in raw {
            let Ok(env) = key.parse::<Environment>() else {
                tracing::warn!(profile = %key, "ignoring unknown profile");
                continue;
            };
            // `dev` beats `Dev`/`DEV` whatever the order in the file.
            if profiles.0.contains_key(&env) {
                tracing::warn!(profile = %key, "duplicate profile for {env}");
                if key != env.as_str() {
                    continue;
                }
            }
            profiles.insert(env, account);
        }
        Ok(profiles)
    }
}

// ---------------------------------------------------------------------------
// EnvironmentsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub group: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtlasConfig {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub project: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentDetails {
    #[serde(default)]
    pub aws: String,
    #[serde(default)]
    pub eks: String,
    #[serde(default)]
    pub aurora: String,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub atlas: AtlasConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentsConfig {
    /// S3-compatible endpoint of the state bucket.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub dev: EnvironmentDetails,
    #[serde(default)]
    pub stable: EnvironmentDetails,
    #[serde(default)]
    pub prod: EnvironmentDetails,
    #[serde(default)]
    pub mgmt: EnvironmentDetails,
}

impl EnvironmentsConfig {
    pub fn details(&self, env: Environment) -> &EnvironmentDetails {
        match env {
            Environment::Dev => &self.dev,
            Environment::Stable => &self.stable,
            Environment::Prod => &self.prod,
            Environment::Mgmt => &self.mgmt,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

/// Project configuration read from `invoke.yaml` at the git root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tofu: TofuConfig,
    #[serde(default)]
    pub common_service: CommonServiceConfig,
    /// Account identifier → region code.
    #[serde(default, deserialize_with = "scalar_map")]
    pub default_regions: BTreeMap<String, String>,
    #[serde(default)]
    pub profiles: Profiles,
    #[serde(default)]
    pub environments: EnvironmentsConfig,

    /// `terraform.tfrc` next to `.git`, exported as `TF_CLI_CONFIG_FILE`.
    #[serde(skip)]
    pub terraform_cli_config_path: PathBuf,
}

impl Config {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            tofu: TofuConfig {
                project: project.into(),
                ..TofuConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, env: Environment, account_id: impl Into<String>) -> Self {
        self.profiles.insert(env, account_id);
        self
    }

    pub fn with_region(mut self, account_id: impl Into<String>, region: impl Into<String>) -> Self {
        self.default_regions.insert(account_id.into(), region.into());
        self
    }

    pub fn project(&self) -> &str {
        &self.tofu.project
    }

    /// Name of the object-storage bucket holding every state file.
    pub fn state_bucket(&self) -> String {
        format!("{}-tfstates", self.tofu.project)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(WrapterError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let mut cfg = Config::from_yaml(&data)?;
        cfg.terraform_cli_config_path = paths::tf_cli_config_path(root);
        tracing::debug!(path = %path.display(), project = %cfg.tofu.project, "loaded config");
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        if self.tofu.project.trim().is_empty() {
            error("tofu.project is empty: state keys and the bucket name need it".to_string());
        }

        // Every account reachable from a profile must have a region.
        for (env, account) in self.profiles.iter() {
            if account.is_empty() {
                continue;
            }
            if !self.default_regions.contains_key(account) {
                error(format!(
                    "account '{account}' (profiles.{env}) has no entry in default_regions"
                ));
            }
        }

        let mut warn = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message,
            })
        };

        for env in [Environment::Dev, Environment::Prod, Environment::Mgmt] {
            if self.profiles.get(env).is_none() {
                warn(format!(
                    "profiles.{env} is not set: paths under '{env}' cannot be resolved"
                ));
            }
        }

        if let (Some(stable), Some(dev)) = (
            self.profiles.get(Environment::Stable),
            self.profiles.get(Environment::Dev),
        ) {
            if stable != dev {
                warn(format!(
                    "profiles.stable ('{stable}') is ignored: stable uses the dev account ('{dev}')"
                ));
            }
        }

        for (account, region_code) in &self.default_regions {
            if !region::is_region(region_code) {
                warn(format!(
                    "region '{region_code}' for account '{account}' is not a recognized region; \
                     directories under it cannot be resolved"
                ));
            }
        }

        if self.environments.endpoint.trim().is_empty() {
            warn("environments.endpoint is empty: backend init will have no endpoint".to_string());
        }

        for label in &self.common_service.services {
            if label.parse::<Component>().is_err() {
                warn(format!(
                    "common_service.services entry '{label}' is not a known component"
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Scalar maps
// ---------------------------------------------------------------------------

/// Deserialize a mapping whose keys and values may be written as bare YAML
/// numbers (account IDs usually are) into strings.
fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_yaml::Mapping>::deserialize(deserializer)?;
    let mut out = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let key = scalar_string(&key)
            .ok_or_else(|| serde::de::Error::custom("mapping keys must be scalars"))?;
        let value = match value {
            serde_yaml::Value::Null => String::new(),
            other => scalar_string(&other).ok_or_else(|| {
                serde::de::Error::custom(format!("value for '{key}' must be a scalar"))
            })?,
        };
        out.insert(key, value);
    }
    Ok(out)
}

fn scalar_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
