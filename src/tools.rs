//! Locates or provisions the external masscan and zgrab2 binaries.
//!
//! Lookup order is PATH, then `<base>/bin/`. When a tool is missing and
//! downloads are allowed, the upstream repository is cloned into
//! `<base>/third_party/` and built in place (make for masscan, the Go
//! toolchain for zgrab2), with the result installed under `<base>/bin/`.
//! All build commands go through the injected [`ProcessRunner`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::debug;

use crate::process::{ProcessRunner, ToolCommand};

const MASSCAN_REPO: &str = "https://github.com/robertdavidgraham/masscan.git";
const ZGRAB2_REPO: &str = "https://github.com/zmap/zgrab2.git";

/// Searches every PATH entry for an existing file with the given name.
fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_env = env::var_os("PATH")?;
    env::split_paths(&path_env)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
}

/// PATH first, then the workspace-local `bin/` directory.
fn find_tool(name: &str, base_dir: &Path) -> Option<PathBuf> {
    if let Some(found) = find_in_path(name) {
        debug!("{name} found on PATH at {}", found.display());
        return Some(found);
    }
    let local = base_dir.join("bin").join(name);
    local.exists().then_some(local)
}

/// Clones the repository unless the checkout already exists.
fn clone_repo(runner: &dyn ProcessRunner, url: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        debug!("reusing existing checkout at {}", dest.display());
        return Ok(());
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    runner
        .run(&ToolCommand::new(
            "git",
            ["clone".to_owned(), url.to_owned(), dest.display().to_string()],
        ))
        .with_context(|| format!("failed to clone {url}"))?;
    Ok(())
}

/// Returns a runnable masscan path, building it from source if permitted.
pub fn ensure_masscan(
    base_dir: &Path,
    no_download: bool,
    runner: &dyn ProcessRunner,
) -> Result<PathBuf> {
    if let Some(found) = find_tool("masscan", base_dir) {
        return Ok(found);
    }
    if no_download {
        bail!("masscan not found and downloads are disabled");
    }

    let repo = base_dir.join("third_party").join("masscan");
    clone_repo(runner, MASSCAN_REPO, &repo)?;
    runner
        .run(&ToolCommand::new(
            "make",
            ["-C".to_owned(), repo.display().to_string()],
        ))
        .context("failed to build masscan")?;

    let built = repo.join("bin").join("masscan");
    if !built.exists() {
        bail!("masscan build did not produce the expected binary");
    }

    let installed = base_dir.join("bin").join("masscan");
    fs::create_dir_all(base_dir.join("bin"))?;
    fs::copy(&built, &installed)
        .with_context(|| format!("failed to install masscan to {}", installed.display()))?;
    Ok(installed)
}

/// Returns a runnable zgrab2 path, building it with the Go toolchain if
/// permitted.
pub fn ensure_zgrab2(
    base_dir: &Path,
    no_download: bool,
    runner: &dyn ProcessRunner,
) -> Result<PathBuf> {
    if let Some(found) = find_tool("zgrab2", base_dir) {
        return Ok(found);
    }
    if no_download {
        bail!("zgrab2 not found and downloads are disabled");
    }

    let repo = base_dir.join("third_party").join("zgrab2");
    clone_repo(runner, ZGRAB2_REPO, &repo)?;

    let installed = base_dir.join("bin").join("zgrab2");
    fs::create_dir_all(base_dir.join("bin"))?;
    runner
        .run(
            &ToolCommand::new(
                "go",
                [
                    "build".to_owned(),
                    "-o".to_owned(),
                    installed.display().to_string(),
                    "./cmd/zgrab2".to_owned(),
                ],
            )
            .in_dir(&repo),
        )
        .context("failed to build zgrab2; ensure Go is installed")?;

    Ok(installed)
}
