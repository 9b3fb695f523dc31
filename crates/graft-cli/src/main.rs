//! `graft-gen`: generate component reconcilers for one package.
//!
//! Writes `impl.gen.rs` into the working directory. Log verbosity comes
//! from `GRAFT_LOG` (an `EnvFilter` directive, default `warn`).

use anyhow::{Context, Result};
use clap::Parser;
use graft_codegen::GenerateOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate Props/State accessors and reconcile functions for every
/// component declared in PACKAGE.
#[derive(Parser, Debug)]
#[command(name = "graft-gen", version, about)]
struct Cli {
    /// Package to analyze: a crate directory or its Cargo.toml
    package: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let options = GenerateOptions::default();
    let generated = graft_codegen::generate(&cli.package, &options)
        .with_context(|| format!("Failed to generate reconcilers for {}", cli.package.display()))?;

    let dir = std::env::current_dir().context("Failed to read working directory")?;
    let path = generated
        .write_to(&dir)
        .with_context(|| format!("Failed to write {}", options.output_file))?;

    tracing::debug!(path = %path.display(), "done");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("GRAFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
