//! Sequential build driver.
//!
//! For each configuration: make sure `_build/<platform>_<arch>` exists, run
//! the configure step in it, then the compile step. The first failure ends
//! the batch.
//!
//! The process working directory is never touched. Each [`Invocation`]
//! carries its own working directory and search path, so nothing needs
//! restoring when a step fails.

use crate::catalog::BuildConfiguration;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Output tree, relative to the project root.
pub const BUILD_ROOT: &str = "_build";
pub const CONFIGURE_TOOL: &str = "cmake";
pub const COMPILE_TOOL: &str = "make";

const CONFIGURE_VERBOSITY: u8 = 4;
// Both relative to `<root>/_build/<name>`.
const SHARED_SCRIPT: &str = "../../arcbuild.cmake";
const SOURCE_DIR: &str = "../..";

/// An external tool exited unsuccessfully.
#[derive(Debug, Error)]
#[error("{program} exited with {}", describe_code(.code))]
pub struct InvocationFailure {
    pub program: String,
    /// `None` when the tool was killed by a signal.
    pub code: Option<i32>,
}

impl InvocationFailure {
    /// Process exit code to report: the tool's own when it fits, else 1.
    pub fn exit_code(&self) -> u8 {
        self.code
            .and_then(|c| u8::try_from(c).ok())
            .filter(|&c| c != 0)
            .unwrap_or(1)
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// One external tool call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// `PATH` for the child. `None` inherits ours.
    pub search_path: Option<OsString>,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external tools. Blocks until the tool exits.
pub trait ToolRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()>;
}

/// Spawns real processes with inherited stdio.
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        let program = match &invocation.search_path {
            Some(paths) => which::which_in(&invocation.program, Some(paths), &invocation.cwd),
            None => which::which(&invocation.program),
        }
        .with_context(|| format!("{} not found in PATH", invocation.program))?;

        let mut cmd = Command::new(&program);
        cmd.args(&invocation.args).current_dir(&invocation.cwd);
        if let Some(paths) = &invocation.search_path {
            cmd.env("PATH", paths);
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run {}", invocation.program))?;
        if !status.success() {
            return Err(InvocationFailure {
                program: invocation.program.clone(),
                code: status.code(),
            }
            .into());
        }
        Ok(())
    }
}

/// Prints each invocation instead of running it.
pub struct DryRunRunner;

impl ToolRunner for DryRunRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        println!(
            "[dry-run] ({}) {}",
            invocation.cwd.display(),
            invocation.command_line()
        );
        Ok(())
    }
}

/// `<root>/_build/<platform>_<arch>`. Stable across runs so the tools can
/// build incrementally.
pub fn build_dir(root: &Path, cfg: &BuildConfiguration) -> PathBuf {
    root.join(BUILD_ROOT).join(cfg.name())
}

/// Configure arguments: fixed template first, `extra_args` last.
pub fn configure_args(cfg: &BuildConfiguration) -> Vec<String> {
    let mut args = vec![
        format!("-DPLATFORM={}", cfg.platform()),
        format!("-DARCH={}", cfg.arch()),
        format!("-DVERBOSE={CONFIGURE_VERBOSITY}"),
        "-P".to_string(),
        SHARED_SCRIPT.to_string(),
        SOURCE_DIR.to_string(),
    ];
    args.extend(cfg.extra_args().iter().cloned());
    args
}

pub struct Driver<R> {
    root: PathBuf,
    search_path: Option<OsString>,
    runner: R,
}

impl<R: ToolRunner> Driver<R> {
    pub fn new(root: impl Into<PathBuf>, search_path: Option<OsString>, runner: R) -> Self {
        Self {
            root: root.into(),
            search_path,
            runner,
        }
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Build every configuration in order, stopping at the first failure.
    pub fn run_batch(&mut self, configs: &[BuildConfiguration]) -> Result<()> {
        for cfg in configs {
            eprintln!("[step] Build {}", cfg.name());
            self.build(cfg)?;
            eprintln!("[ok] {}", cfg.name());
        }
        Ok(())
    }

    /// Configure then compile a single configuration.
    pub fn build(&mut self, cfg: &BuildConfiguration) -> Result<()> {
        let dir = build_dir(&self.root, cfg);
        std::fs::create_dir_all(&dir).with_context(|| format!("Creating {}", dir.display()))?;

        let configure = self.invocation(CONFIGURE_TOOL, configure_args(cfg), &dir);
        println!("Calling: {}", configure.command_line());
        self.runner.run(&configure)?;

        let compile = self.invocation(COMPILE_TOOL, Vec::new(), &dir);
        self.runner.run(&compile)
    }

    fn invocation(&self, program: &str, args: Vec<String>, dir: &Path) -> Invocation {
        Invocation {
            program: program.to_string(),
            args,
            cwd: dir.to_path_buf(),
            search_path: self.search_path.clone(),
        }
    }
}
