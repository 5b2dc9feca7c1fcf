//! Execution of external programs.
//!
//! Every external tool (tofu, tflint, terraform-docs) goes through a
//! [`CommandRunner`], so command construction can be tested without the
//! binaries and a dry run can print instead of execute. Output streams
//! straight to the terminal; only [`CommandRunner::capture`] collects stdout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, WrapterError};

/// Backend settings whose values never appear in logs or dry-run output.
const SECRET_ARGS: &[&str] = &["-backend-config=access_key=", "-backend-config=secret_key="];

/// A single external program call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; `None` inherits the caller's.
    pub cwd: Option<PathBuf>,
    /// Added on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Directory label for diagnostics.
    pub fn dir_label(&self) -> String {
        self.cwd
            .as_deref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| ".".to_string())
    }

    /// Command line with credential values masked.
    pub fn redacted(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        for arg in &self.args {
            match SECRET_ARGS.iter().find(|prefix| arg.starts_with(*prefix)) {
                Some(prefix) => parts.push(format!("{prefix}****")),
                None => parts.push(arg.clone()),
            }
        }
        parts.join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }

    fn check(&self, status: std::process::ExitStatus) -> Result<()> {
        if status.success() {
            return Ok(());
        }
        Err(WrapterError::CommandFailed {
            program: self.program.clone(),
            dir: self.dir_label(),
            code: status.code().unwrap_or(1),
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Runs invocations to completion, one at a time.
pub trait CommandRunner {
    /// Run with stdout/stderr attached to the terminal.
    fn run(&self, invocation: &Invocation) -> Result<()>;

    /// Run and return stdout; stderr still goes to the terminal.
    fn capture(&self, invocation: &Invocation) -> Result<String>;
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        tracing::info!(cmd = %invocation, dir = %invocation.dir_label(), "running");
        let status = invocation
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| WrapterError::SpawnFailed {
                program: invocation.program.clone(),
                reason: e.to_string(),
            })?;
        invocation.check(status)
    }

    fn capture(&self, invocation: &Invocation) -> Result<String> {
        tracing::info!(cmd = %invocation, dir = %invocation.dir_label(), "capturing");
        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| WrapterError::SpawnFailed {
                program: invocation.program.clone(),
                reason: e.to_string(),
            })?;
        invocation.check(output.status)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
