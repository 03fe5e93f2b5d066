//! # batch-build
//!
//! Configure and compile the project once per platform/architecture the
//! host can target.
//!
//! ## Usage
//!
//! ```bash
//! batch-build                 # Detect targets, configure + build each one
//! batch-build --list          # Show detected targets
//! batch-build --list --json   # Same, machine-readable
//! batch-build --dry-run       # Print the tool calls without running them
//! ```
//!
//! ## Targets
//!
//! - Android NDK (`ANDROID_NDK_ROOT`): six arch/STL variants
//! - Windows: x86 + x64 for every installed Visual Studio toolset
//! - Linux: native x86 or x64
//!
//! Each target is built in `_build/<platform>_<arch>` with `cmake` then
//! `make`. The first failing tool stops the run and its exit code becomes
//! ours.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod catalog;
mod driver;
mod enumerate;
mod host;

#[derive(Parser)]
#[command(
    name = "batch-build",
    about = "Configure and build every platform/arch the host can target"
)]
struct Cli {
    /// Project root containing arcbuild.cmake
    #[arg(short = 'C', long, default_value = ".")]
    root: PathBuf,

    /// List detected configurations and exit
    #[arg(long)]
    list: bool,

    /// Print the list as JSON
    #[arg(long, requires = "list")]
    json: bool,

    /// Print tool invocations instead of running them
    #[arg(long, conflicts_with = "list")]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The tool already reported its own failure on the terminal.
            if let Some(failure) = e.downcast_ref::<driver::InvocationFailure>() {
                return ExitCode::from(failure.exit_code());
            }
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let host = host::HostEnv::detect();
    let probe = host::FsProbe;

    let configs = enumerate::enumerate(&host, &probe);
    if cli.list {
        return print_list(&configs, cli.json);
    }

    eprintln!("[info] Host: {:?} ({}-bit)", host.os, host.pointer_width);
    for profile in enumerate::profiles(&host, &probe) {
        eprintln!("[info] Profile: {}", profile.name());
    }
    eprintln!("[info] {} configuration(s)", configs.len());

    let search_path = host.search_path()?;
    if cli.dry_run {
        driver::Driver::new(&cli.root, search_path, driver::DryRunRunner).run_batch(&configs)
    } else {
        driver::Driver::new(&cli.root, search_path, driver::ProcessRunner).run_batch(&configs)
    }
}

fn print_list(configs: &[catalog::BuildConfiguration], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(configs)?);
        return Ok(());
    }
    for cfg in configs {
        println!(
            "{:8} {:8} {}",
            cfg.platform(),
            cfg.arch(),
            cfg.extra_args().join(" ")
        );
    }
    Ok(())
}
