use crate::config::Config;
use crate::resolver::DerivedContext;

pub const ACCESS_KEY_ENV: &str = "MINIO_ACCESS_KEY";
pub const SECRET_KEY_ENV: &str = "MINIO_SECRET_KEY";

/// S3 backend settings passed to `tofu init` as `-backend-config` flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub endpoint: String,
    pub bucket: String,
    pub key: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

impl BackendConfig {
    pub fn new(cfg: &Config, ctx: &DerivedContext, access_key: String, secret_key: String) -> Self {
        Self {
            endpoint: cfg.environments.endpoint.clone(),
            bucket: cfg.state_bucket(),
            key: ctx.state_key.clone(),
            region: ctx.region.clone(),
            access_key,
            secret_key,
        }
    }

    /// Credentials come from `MINIO_ACCESS_KEY` / `MINIO_SECRET_KEY`; unset
    /// variables become empty values.
    pub fn from_env(cfg: &Config, ctx: &DerivedContext) -> Self {
        let access_key = std::env::var(ACCESS_KEY_ENV).unwrap_or_default();
        let secret_key = std::env::var(SECRET_KEY_ENV).unwrap_or_default();
        if access_key.is_empty() || secret_key.is_empty() {
            tracing::warn!("{ACCESS_KEY_ENV} or {SECRET_KEY_ENV} is not set");
        }
        Self::new(cfg, ctx, access_key, secret_key)
    }

    /// `-backend-config=<name>=<value>` flags in a fixed order.
    pub fn flags(&self) -> Vec<String> {
        [
            ("endpoint", &self.endpoint),
            ("bucket", &self.bucket),
            ("region", &self.region),
            ("key", &self.key),
            ("access_key", &self.access_key),
            ("secret_key", &self.secret_key),
        ]
        .into_iter()
        .map(|(name, value)| format!("-backend-config={name}={value}"))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::derive_context;
    use crate::types::Environment;

    #[test]
    fn flags_from_derived_context() {
        let mut cfg = Config::new("acme")
            .with_profile(Environment::Dev, "111")
            .with_region("111", "us-east-1");
        cfg.environments.endpoint = "https://minio.example.com".to_string();
        let ctx = derive_context("acme", "/r/111/dev/us-east-1/team/svc", &cfg).unwrap();

        let backend = BackendConfig::new(&cfg, &ctx, "ak".to_string(), "sk".to_string());
        assert_eq!(
            backend.flags(),
            vec![
                "-backend-config=endpoint=https://minio.example.com",
                "-backend-config=bucket=acme-tfstates",
                "-backend-config=region=us-east-1",
                "-backend-config=key=acme/111/dev/us-east-1/team/svc/service.tfstate",
                "-backend-config=access_key=ak",
                "-backend-config=secret_key=sk",
            ]
        );
    }
}
