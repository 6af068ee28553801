// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Standalone binary to stamp a release version into a package manifest.

use std::io::stderr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fix_package_json::{VERSION, update_manifest};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Write a release version (with any leading "v" dropped) into a JSON manifest
#[derive(Parser, Debug)]
#[command(name = "fix_package_json")]
#[command(version = VERSION, about, long_about = None)]
struct Cli {
    /// Version to write, e.g. "v1.2.3" or "1.2.3"
    #[arg(allow_hyphen_values = true)]
    version: String,

    /// Path to the JSON manifest, e.g. package.json
    package_path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(stderr),
        )
        .init();

    let update = update_manifest(&cli.package_path, &cli.version)?;
    println!("{update}");
    Ok(())
}
