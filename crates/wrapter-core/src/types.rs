use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Deployment tier. Appears as a path segment directly above the region and
/// keys the `profiles` table of the project config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Stable,
    Prod,
    Mgmt,
}

impl Environment {
    pub fn all() -> &'static [Environment] {
        &[
            Environment::Dev,
            Environment::Stable,
            Environment::Prod,
            Environment::Mgmt,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Stable => "stable",
            Environment::Prod => "prod",
            Environment::Mgmt => "mgmt",
        }
    }

    /// The environment whose profile entry holds this environment's account.
    /// Stable runs inside the dev account.
    pub fn account_owner(self) -> Environment {
        match self {
            Environment::Dev | Environment::Stable => Environment::Dev,
            Environment::Prod => Environment::Prod,
            Environment::Mgmt => Environment::Mgmt,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = crate::error::WrapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "stable" => Ok(Environment::Stable),
            "prod" => Ok(Environment::Prod),
            "mgmt" => Ok(Environment::Mgmt),
            _ => Err(crate::error::WrapterError::UnknownEnvironment(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Optional building block of the shared service module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Component {
    #[serde(rename = "PostgreSQL")]
    Postgres,
    Mongo,
    Keycloak,
    #[serde(rename = "AD")]
    ActiveDirectory,
}

impl Component {
    pub fn all() -> &'static [Component] {
        &[
            Component::Postgres,
            Component::Mongo,
            Component::Keycloak,
            Component::ActiveDirectory,
        ]
    }

    /// Label used in `common_service.services` and on the command line.
    pub fn label(self) -> &'static str {
        match self {
            Component::Postgres => "PostgreSQL",
            Component::Mongo => "Mongo",
            Component::Keycloak => "Keycloak",
            Component::ActiveDirectory => "AD",
        }
    }

    /// Module input that switches the component on.
    pub fn flag(self) -> &'static str {
        match self {
            Component::Postgres => "postgres_enabled",
            Component::Mongo => "mongodb_enabled",
            Component::Keycloak => "keycloak_enabled",
            Component::ActiveDirectory => "ad_enabled",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Component {
    type Err = crate::error::WrapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Component::all()
            .iter()
            .copied()
            .find(|c| c.label() == s)
            .ok_or_else(|| crate::error::WrapterError::ComponentUnknown(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
