use thiserror::Error;

#[derive(Debug, Error)]
pub enum WrapterError {
    #[error("config not found: {0} (expected invoke.yaml at the git root)")]
    ConfigNotFound(String),

    #[error("not inside a git repository: no .git found above {0}")]
    GitRootNotFound(String),

    // -- derivation ---------------------------------------------------------
    #[error("unable to determine environment from path: {path}")]
    EnvironmentUndetermined { path: String },

    #[error("unknown environment '{0}': expected one of dev, stable, prod, mgmt")]
    UnknownEnvironment(String),

    #[error("no profile configured for environment: {0}")]
    EnvironmentNotConfigured(String),

    #[error("region not found for account ID: {0}")]
    RegionNotConfigured(String),

    #[error("directory path {path} does not contain expected prefix: {prefix}")]
    PrefixMismatch { prefix: String, path: String },

    // -- toolchain ----------------------------------------------------------
    #[error("binary {0} not found in PATH")]
    BinaryNotFound(String),

    #[error("binary {0} is found but it is an empty file")]
    EmptyBinary(String),

    #[error("failed to spawn '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("'{program}' failed in {dir} (exit code {code})")]
    CommandFailed {
        program: String,
        dir: String,
        code: i32,
    },

    #[error("lint failed in {0}: run `wrapter fmt` before commit")]
    LintFailed(String),

    // -- scaffolding --------------------------------------------------------
    #[error("unknown component '{0}': not listed in common_service.services")]
    ComponentUnknown(String),

    #[error("invalid name '{0}': must be lowercase alphanumeric with hyphens or underscores")]
    InvalidName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WrapterError>;
