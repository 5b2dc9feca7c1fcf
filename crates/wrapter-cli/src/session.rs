use crate::root;
use anyhow::Context;
use std::path::{Path, PathBuf};
use wrapter_core::config::Config;
use wrapter_core::paths;
use wrapter_core::requirements;
use wrapter_core::resolver::{self, DerivedContext};
use wrapter_core::runner::{CommandRunner, Invocation, ProcessRunner};
use wrapter_core::toolchain::Toolchain;
use wrapter_core::walk;

/// Per-invocation state shared by every command.
pub struct Session {
    pub root: PathBuf,
    pub dir: PathBuf,
    pub json: bool,
    pub dry_run: bool,
    runner: Box<dyn CommandRunner>,
}

impl Session {
    pub fn open(
        root: Option<&Path>,
        dir: Option<&Path>,
        json: bool,
        dry_run: bool,
    ) -> anyhow::Result<Self> {
        let dir = root::resolve_dir(dir)?;
        let root = root::resolve_root(root, &dir)?;
        let runner: Box<dyn CommandRunner> = if dry_run {
            Box::new(DryRunRunner)
        } else {
            Box::new(ProcessRunner)
        };
        Ok(Self {
            root,
            dir,
            json,
            dry_run,
            runner,
        })
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        Config::load(&self.root).context("failed to load config")
    }

    /// State coordinates of the working directory.
    pub fn derive(&self, cfg: &Config) -> anyhow::Result<DerivedContext> {
        resolver::derive_context(cfg.project(), &paths::to_slash(&self.dir), cfg)
            .with_context(|| format!("cannot derive state key for {}", self.dir.display()))
    }

    /// Fail early when a tool the command needs is missing. Skipped on dry runs.
    pub fn require(&self, binaries: &[&str]) -> anyhow::Result<()> {
        if self.dry_run {
            return Ok(());
        }
        requirements::verify(binaries).context("missing required tool")
    }

    pub fn toolchain(&self) -> Toolchain<'_> {
        Toolchain::new(self.runner.as_ref(), paths::tf_cli_config_path(&self.root))
    }

    /// The working directory and every directory below it.
    pub fn dirs(&self) -> anyhow::Result<Vec<PathBuf>> {
        walk::list_dirs(&self.dir)
            .with_context(|| format!("failed to list directories under {}", self.dir.display()))
    }
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

/// Prints each invocation instead of running it. Captures come back empty.
struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, invocation: &Invocation) -> wrapter_core::Result<()> {
        println!("{}", describe(invocation));
        Ok(())
    }

    fn capture(&self, invocation: &Invocation) -> wrapter_core::Result<String> {
        println!("{}", describe(invocation));
        Ok(String::new())
    }
}

fn describe(invocation: &Invocation) -> String {
    let env: String = invocation
        .env
        .iter()
        .map(|(key, value)| format!("{key}={value} "))
        .collect();
    format!("[dry-run] {}: {env}{invocation}", invocation.dir_label())
}
