//! The OpenTofu toolchain operations wrapter drives.
//!
//! Each operation builds one or more [`Invocation`]s and hands them to a
//! [`CommandRunner`]. Every invocation exports `TF_CLI_CONFIG_FILE` pointing
//! at the repository's `terraform.tfrc`.

use std::path::{Path, PathBuf};

use crate::backend::BackendConfig;
use crate::error::{Result, WrapterError};
use crate::io;
use crate::paths;
use crate::requirements::{TERRAFORM_DOCS, TFLINT, TOFU};
use crate::runner::{CommandRunner, Invocation};

pub const TF_CLI_CONFIG_ENV: &str = "TF_CLI_CONFIG_FILE";

pub const LOCK_PLATFORMS: &[&str] = &["linux_amd64", "darwin_amd64", "darwin_arm64"];

pub struct Toolchain<'a> {
    runner: &'a dyn CommandRunner,
    tf_cli_config: PathBuf,
}

impl<'a> Toolchain<'a> {
    pub fn new(runner: &'a dyn CommandRunner, tf_cli_config: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            tf_cli_config: tf_cli_config.into(),
        }
    }

    fn invocation(&self, program: &str, dir: Option<&Path>) -> Invocation {
        let inv = Invocation::new(program).env(
            TF_CLI_CONFIG_ENV,
            self.tf_cli_config.to_string_lossy().into_owned(),
        );
        match dir {
            Some(d) => inv.current_dir(d),
            None => inv,
        }
    }

    fn tofu(&self, dir: &Path) -> Invocation {
        self.invocation(TOFU, Some(dir))
    }

    // -----------------------------------------------------------------------
    // Single-directory operations
    // -----------------------------------------------------------------------

    /// `tofu init` against the remote state backend.
    pub fn backend_init(&self, dir: &Path, backend: &BackendConfig) -> Result<()> {
        let inv = self
            .tofu(dir)
            .arg("init")
            .args(backend.flags())
            .arg("-reconfigure");
        self.runner.run(&inv)
    }

    /// Backend init, `tofu plan -out tfplan.bin`, then the plan rendered as
    /// pretty JSON into `tfplan.json`. Returns the JSON path, or `None` when
    /// `tofu show` printed nothing.
    pub fn plan(&self, dir: &Path, backend: &BackendConfig) -> Result<Option<PathBuf>> {
        self.backend_init(dir, backend)?;
        self.runner
            .run(&self.tofu(dir).args(["plan", "-out", paths::PLAN_BINARY]))?;

        let raw = self
            .runner
            .capture(&self.tofu(dir).args(["show", "-json", paths::PLAN_BINARY]))?;
        if raw.trim().is_empty() {
            tracing::warn!(dir = %dir.display(), "tofu show produced no output");
            return Ok(None);
        }
        let plan: serde_json::Value = serde_json::from_str(&raw)?;
        let out = dir.join(paths::PLAN_JSON);
        io::atomic_write(&out, serde_json::to_string_pretty(&plan)?.as_bytes())?;
        Ok(Some(out))
    }

    pub fn fmt(&self, dir: &Path) -> Result<()> {
        self.runner.run(&self.tofu(dir).arg("fmt"))
    }

    pub fn providers_lock(&self, dir: &Path) -> Result<()> {
        let inv = self
            .tofu(dir)
            .args(["providers", "lock"])
            .args(LOCK_PLATFORMS.iter().map(|p| format!("-platform={p}")));
        self.runner.run(&inv)
    }

    /// `tflint` then `tofu fmt -diff -check=true`; either failing is a lint
    /// failure.
    pub fn lint(&self, dir: &Path) -> Result<()> {
        let steps = [
            self.invocation(TFLINT, Some(dir)),
            self.tofu(dir).args(["fmt", "-diff", "-check=true"]),
        ];
        for inv in &steps {
            if let Err(e) = self.runner.run(inv) {
                return Err(match e {
                    WrapterError::CommandFailed { .. } => {
                        WrapterError::LintFailed(dir.display().to_string())
                    }
                    other => other,
                });
            }
        }
        Ok(())
    }

    /// Backend-less init, `tofu validate`, then `tflint`.
    pub fn validate(&self, dir: &Path) -> Result<()> {
        self.runner
            .run(&self.tofu(dir).args(["init", "-input=false", "-backend=false"]))?;
        self.runner.run(&self.tofu(dir).arg("validate"))?;
        self.runner.run(&self.invocation(TFLINT, Some(dir)))
    }

    /// Inject a markdown inputs/outputs table into `<dir>/README.md`.
    pub fn docs(&self, dir: &Path) -> Result<()> {
        let inv = self
            .invocation(TERRAFORM_DOCS, None)
            .args([
                "markdown",
                "table",
                "--output-file",
                "README.md",
                "--output-mode",
                "inject",
            ])
            .arg(dir.to_string_lossy().into_owned());
        self.runner.run(&inv)
    }
}
