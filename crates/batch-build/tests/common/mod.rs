//! Helpers for driving the `batch-build` binary.

#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

/// Command for the binary under test, with a predictable environment.
///
/// `ANDROID_NDK_ROOT` is cleared so the host's own NDK never leaks in.
pub fn batch_build() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_batch-build"));
    cmd.env_remove("ANDROID_NDK_ROOT");
    cmd
}

/// Write an executable `/bin/sh` script named `name` into `dir`.
pub fn write_tool(dir: &Path, name: &str, body: &str) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))
        .with_context(|| format!("Writing {}", path.display()))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}
