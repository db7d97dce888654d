//! pccl-build CLI - configures and builds the pccl shared library.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pccl_build::{ExtensionBuilder, SystemEnv};

/// Build the pccl shared library with cmake and stage it for packaging.
#[derive(Parser)]
#[command(name = "pccl-build", version)]
struct Cli {
    /// Root of the cmake project to build
    project_root: PathBuf,

    /// Scratch build directory handed to cmake (created if absent, never wiped)
    #[arg(long, default_value = "build")]
    build_dir: PathBuf,

    /// Directory the compiled shared library is staged into
    #[arg(long, default_value = "pccl")]
    out_dir: PathBuf,

    /// Use verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("pccl_build=debug")
    } else {
        EnvFilter::new("pccl_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let builder = ExtensionBuilder::new(&SystemEnv, &cli.project_root, &cli.build_dir, &cli.out_dir)?;
    builder.run()
}
