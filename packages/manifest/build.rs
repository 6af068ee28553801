// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Module with build instructions to record the tool's own version from git.

use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};

/// Runs git with the given arguments, returning trimmed non-empty stdout on success.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    let stdout = stdout.trim();
    (!stdout.is_empty()).then(|| stdout.to_owned())
}

fn rerun_if_git_ref_changed() {
    let git_dir = Path::new("..").join("..").join(".git");

    let head_path = git_dir.join("HEAD");
    if head_path.exists() {
        println!("cargo:rerun-if-changed={}", head_path.display());
    }

    if let Some(branch) = git(&["branch", "--show-current"]) {
        let branch_ref = git_dir.join("refs").join("heads").join(branch);
        if branch_ref.exists() {
            println!("cargo:rerun-if-changed={}", branch_ref.display());
        }
    }

    let tags_path = git_dir.join("refs").join("tags");
    if tags_path.exists() {
        println!("cargo:rerun-if-changed={}", tags_path.display());
    }
}

fn build_version() -> String {
    if git(&["rev-parse", "--git-dir"]).is_none() {
        return "undefined".to_owned();
    }
    rerun_if_git_ref_changed();
    git(&["describe", "--tags"])
        .or_else(|| git(&["rev-parse", "--short", "HEAD^{commit}"]))
        .unwrap_or_else(|| "undefined".to_owned())
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").context("OUT_DIR is set by cargo")?);
    fs::write(out_dir.join("version.txt"), build_version())?;
    Ok(())
}
