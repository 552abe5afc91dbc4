//! Sequences a full sweep: target list → masscan → report split →
//! per-port zgrab2 inspection → title summary.
//!
//! Stages run strictly one after another; an external invocation blocks
//! until its tool exits. Failures before the scan completes are fatal.
//! Per-port inspection failures are not: the summary is written from
//! whatever inspection output exists.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::input::Opts;
use crate::inspect;
use crate::process::{ProcessRunner, ToolCommand};
use crate::report;
use crate::targets;
use crate::tools;
use crate::{detail, output, warning};

/// Every path a run touches, fixed once at startup and threaded through
/// the stages. No stage invents file names of its own.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory the run operates in; tools are provisioned beneath it.
    pub base_dir: PathBuf,
    /// Canonical masscan list file.
    pub list: PathBuf,
    /// Raw masscan `-oL` report.
    pub scan_report: PathBuf,
    /// Addresses with port 80 open, one per line.
    pub open_80: PathBuf,
    /// Addresses with port 443 open, one per line.
    pub open_443: PathBuf,
    /// zgrab2 JSON-lines output for port 80.
    pub inspect_80: PathBuf,
    /// zgrab2 JSON-lines output for port 443.
    pub inspect_443: PathBuf,
    /// Final title summary.
    pub summary: PathBuf,
}

impl Workspace {
    /// Lays out a workspace under `base_dir`. A relative `output` lands in
    /// the base directory; an absolute one is used as given.
    #[must_use]
    pub fn at(base_dir: PathBuf, output: &Path) -> Self {
        Self {
            list: base_dir.join("list"),
            scan_report: base_dir.join("masscan_results.txt"),
            open_80: base_dir.join("open_ips80.txt"),
            open_443: base_dir.join("open_ips443.txt"),
            inspect_80: base_dir.join("zgrab_results_80.json"),
            inspect_443: base_dir.join("zgrab_results_443.json"),
            summary: base_dir.join(output),
            base_dir,
        }
    }
}

fn non_empty(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.len() > 0).unwrap_or(false)
}

/// Runs zgrab2 for one port. Failure here is logged and swallowed; the
/// caller proceeds with whatever output file the tool managed to write.
fn inspect_port(
    opts: &Opts,
    runner: &dyn ProcessRunner,
    zgrab2: &Path,
    port: u16,
    addresses: &Path,
    results: &Path,
) {
    if !non_empty(addresses) {
        detail!(
            format!("no hosts with port {port} open; skipping inspection"),
            opts.quiet,
            opts.accessible
        );
        return;
    }

    output!(
        format!("inspecting hosts on port {port}"),
        opts.quiet,
        opts.accessible
    );
    let command = ToolCommand::new(
        zgrab2.display().to_string(),
        [
            "http".to_owned(),
            "--port".to_owned(),
            port.to_string(),
            "--input-file".to_owned(),
            addresses.display().to_string(),
            "--max-redirects".to_owned(),
            "0".to_owned(),
            "--output-file".to_owned(),
            results.display().to_string(),
        ],
    );
    if let Err(e) = runner.run(&command) {
        warning!(
            format!("zgrab2 failed for port {port}: {e}"),
            opts.accessible
        );
    }
}

/// Drives the whole sweep. Returns `Err` only for fatal conditions: tool
/// provisioning, list building, the masscan invocation, the report split,
/// or an unwritable summary file.
pub fn run_pipeline(opts: &Opts, workspace: &Workspace, runner: &dyn ProcessRunner) -> Result<()> {
    let masscan = tools::ensure_masscan(&workspace.base_dir, opts.no_download, runner)
        .context("masscan is required")?;
    let zgrab2 = tools::ensure_zgrab2(&workspace.base_dir, opts.no_download, runner)
        .context("zgrab2 is required")?;

    output!("building target list", opts.quiet, opts.accessible);
    let target_count = targets::build_target_list(
        &opts.input,
        opts.list,
        opts.country.as_deref(),
        &workspace.list,
    )
    .context("failed to prepare the masscan list file")?;
    detail!(
        format!("{target_count} targets in {}", workspace.list.display()),
        opts.quiet,
        opts.accessible
    );

    output!(
        format!("scanning with masscan (rate {})", opts.rate),
        opts.quiet,
        opts.accessible
    );
    let scan = ToolCommand::new(
        masscan.display().to_string(),
        [
            format!("-p{}", opts.ports_spec()),
            "-iL".to_owned(),
            workspace.list.display().to_string(),
            format!("--rate={}", opts.rate),
            "--exclude".to_owned(),
            "255.255.255.255".to_owned(),
            "--wait".to_owned(),
            "0".to_owned(),
            "-oL".to_owned(),
            workspace.scan_report.display().to_string(),
        ],
    );
    runner
        .run(&scan)
        .context("masscan failed; you may need elevated privileges")?;

    let counts = report::parse_scan_report(
        &workspace.scan_report,
        &workspace.open_80,
        &workspace.open_443,
    )?;
    output!(
        format!("open port 80 hosts: {}", counts.port_80),
        opts.quiet,
        opts.accessible
    );
    output!(
        format!("open port 443 hosts: {}", counts.port_443),
        opts.quiet,
        opts.accessible
    );

    inspect_port(
        opts,
        runner,
        &zgrab2,
        80,
        &workspace.open_80,
        &workspace.inspect_80,
    );
    inspect_port(
        opts,
        runner,
        &zgrab2,
        443,
        &workspace.open_443,
        &workspace.inspect_443,
    );

    let summary = File::create(&workspace.summary).with_context(|| {
        format!("failed to open output file {}", workspace.summary.display())
    })?;
    let mut summary = BufWriter::new(summary);

    for results in [&workspace.inspect_80, &workspace.inspect_443] {
        if results.exists() {
            inspect::append_titles(results, &mut summary)?;
        } else {
            debug!("no inspection output at {}", results.display());
        }
    }
    summary.flush()?;

    output!(
        format!("summary written to {}", workspace.summary.display()),
        opts.quiet,
        opts.accessible
    );
    Ok(())
}
