//! Splits the masscan `-oL` report into per-port address files.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

/// How many addresses the report held for each tracked port.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpenCounts {
    /// Addresses with port 80 open.
    pub port_80: usize,
    /// Addresses with port 443 open.
    pub port_443: usize,
}

/// Reads the masscan report line by line and appends each open address to
/// the file for its port.
///
/// A line of interest tokenizes to at least four whitespace-separated
/// fields shaped `open tcp <port> <address> ...`; every other line shape is
/// ignored without comment. Only ports 80 and 443 are tracked even when the
/// scan covered more, and duplicates are preserved as masscan reported
/// them. An empty report is a successful parse producing two empty files.
pub fn parse_scan_report(report: &Path, out_80: &Path, out_443: &Path) -> Result<OpenCounts> {
    let report_file =
        File::open(report).with_context(|| format!("failed to read {}", report.display()))?;

    let mut writer_80 = BufWriter::new(
        File::create(out_80).with_context(|| format!("failed to open {}", out_80.display()))?,
    );
    let mut writer_443 = BufWriter::new(
        File::create(out_443).with_context(|| format!("failed to open {}", out_443.display()))?,
    );

    let mut counts = OpenCounts::default();
    for line in BufReader::new(report_file).lines() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 || tokens[0] != "open" || tokens[1] != "tcp" {
            continue;
        }

        let (port, address) = (tokens[2], tokens[3]);
        match port {
            "80" => {
                writeln!(writer_80, "{address}")?;
                counts.port_80 += 1;
            }
            "443" => {
                writeln!(writer_443, "{address}")?;
                counts.port_443 += 1;
            }
            other => debug!("ignoring open port {other} on {address}"),
        }
    }
    writer_80.flush()?;
    writer_443.flush()?;

    debug!(
        "report split: {} addresses on port 80, {} on port 443",
        counts.port_80, counts.port_443
    );
    Ok(counts)
}
