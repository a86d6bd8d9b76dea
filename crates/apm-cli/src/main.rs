use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anstyle::{AnsiColor, Effects, Style};
use anyhow::{anyhow, Context, Result};
use apm_core::version::{normalize_version, try_compare_versions};
use apm_core::{
    Catalog, CoreProgram, CoreVersions, InstallationStatus, InstalledRecord, QualifiedId,
};
use apm_installer::{
    detect_installed_release, read_installed_record, scan_installed_files, InstallLayout,
    ScanOptions,
};
use apm_resolver::{
    evaluate_packages, manually_installed_files, CoreVersionBinding, DependencyResolver,
    Evaluation, ResolvedPackage,
};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

include!("completion.rs");
include!("config.rs");
include!("dispatch.rs");
include!("render.rs");

#[derive(Parser, Debug)]
#[command(name = "apm")]
#[command(about = "Inspect AviUtl plugin and script installations", long_about = None)]
struct Cli {
    /// Configuration file; defaults to ./apm.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// AviUtl installation root.
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Package catalog (JSON).
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Installed record (JSON).
    #[arg(long, global = true)]
    record: Option<PathBuf>,
    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show core versions and package installation status.
    Status {
        /// Include packages that are not installed.
        #[arg(long)]
        all: bool,
    },
    /// Explain installability and dependencies of one package.
    Check { id: String },
    /// List tracked files that no recorded package owns.
    Files,
    /// Compare two version strings.
    Compare {
        a: String,
        b: String,
        #[arg(long)]
        explain: bool,
    },
    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
}

const LOG_ENV: &str = "APM_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_cli(cli)
}

include!("tests.rs");
