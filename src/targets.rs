//! Builds the canonical masscan list file from the operator's input.
//!
//! The input is resolved in one pass: an existing `.json` file is treated
//! as an ASN/geolocation dataset, any other existing file is either the
//! list itself (`--list`) or a literal to be quoted verbatim, and a
//! non-existent input is taken as a bare address, CIDR, or range literal.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::debug;
use serde_derive::Deserialize;

use crate::address::{is_ipv4, TargetKind};
use crate::warning;

/// One dataset record mapping an address range to a country.
///
/// The dataset carries many more fields per record (ASN, continent, country
/// code); everything except these three is ignored at deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct AsnRecord {
    /// First address of the range.
    pub start_ip: String,
    /// Last address of the range.
    pub end_ip: String,
    /// Human-readable country name, absent in some records.
    #[serde(default)]
    pub country_name: Option<String>,
}

impl AsnRecord {
    /// True when no filter is set, or the record names the same country
    /// ignoring case. Records without a country never match a filter.
    fn matches_country(&self, filter: Option<&str>) -> bool {
        match filter {
            None => true,
            Some(want) => self
                .country_name
                .as_deref()
                .is_some_and(|have| have.eq_ignore_ascii_case(want)),
        }
    }

    /// The `start-end` list line, or `None` when either side is not IPv4.
    /// IPv6 ranges are dropped here, not passed on to masscan.
    fn range_line(&self) -> Option<String> {
        (is_ipv4(&self.start_ip) && is_ipv4(&self.end_ip))
            .then(|| format!("{}-{}", self.start_ip, self.end_ip))
    }
}

/// Parses dataset text into typed records.
///
/// Both framings in circulation are accepted: a single top-level JSON array
/// of records, or JSON-lines with one record per line. On the JSON-lines
/// path, lines that fail to deserialize are skipped. An input yielding no
/// records at all is malformed.
pub fn parse_dataset(content: &str) -> Result<Vec<AsnRecord>> {
    let records = match serde_json::from_str::<Vec<AsnRecord>>(content) {
        Ok(records) => records,
        Err(_) => content
            .lines()
            .map(str::trim)
            .map(|line| line.strip_suffix(',').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str::<AsnRecord>(line).ok())
            .collect(),
    };

    if records.is_empty() {
        bail!("no usable records found in dataset");
    }

    Ok(records)
}

/// Converts a dataset file into `start-end` list lines, applying the
/// country filter. Returns the number of lines written; zero matching
/// ranges is an error because masscan would have nothing to do.
pub fn write_dataset_ranges(
    dataset: &Path,
    list_path: &Path,
    country_filter: Option<&str>,
) -> Result<usize> {
    let content = fs::read_to_string(dataset)
        .with_context(|| format!("failed to open {}", dataset.display()))?;
    let records = parse_dataset(&content)
        .with_context(|| format!("could not parse ranges from {}", dataset.display()))?;

    let out = File::create(list_path)
        .with_context(|| format!("failed to write {}", list_path.display()))?;
    let mut out = BufWriter::new(out);

    let mut count = 0;
    for record in &records {
        if !record.matches_country(country_filter) {
            continue;
        }
        let Some(line) = record.range_line() else {
            debug!(
                "skipping non-IPv4 range {}-{}",
                record.start_ip, record.end_ip
            );
            continue;
        };
        writeln!(out, "{line}")?;
        count += 1;
    }
    out.flush()?;

    if count == 0 {
        bail!(
            "no IPv4 ranges in {} matched the requested filter",
            dataset.display()
        );
    }

    Ok(count)
}

/// Writes the literal input string as the sole list line.
fn write_literal(list_path: &Path, input: &str) -> Result<usize> {
    if TargetKind::of(input) == TargetKind::Unknown {
        warning!(format!(
            "{input:?} is not an address, CIDR, or range; passing it to masscan anyway"
        ));
    }

    let mut out = File::create(list_path)
        .with_context(|| format!("failed to write {}", list_path.display()))?;
    writeln!(out, "{input}")?;
    Ok(1)
}

/// Adopts an existing list file as the canonical one, copying only when the
/// input is not already at the canonical location.
fn adopt_list_file(input_path: &Path, list_path: &Path) -> Result<usize> {
    let already_canonical = match (fs::canonicalize(input_path), fs::canonicalize(list_path)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !already_canonical {
        fs::copy(input_path, list_path).with_context(|| {
            format!(
                "failed to copy {} to {}",
                input_path.display(),
                list_path.display()
            )
        })?;
    }

    let count = fs::read_to_string(list_path)?
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();
    if count == 0 {
        bail!("list file {} contains no targets", input_path.display());
    }
    Ok(count)
}

/// Resolves the operator's input into the canonical list file.
///
/// Returns the number of target lines the list holds. The country filter is
/// only meaningful for dataset inputs and is a hard error with anything
/// else.
pub fn build_target_list(
    input: &str,
    list_mode: bool,
    country_filter: Option<&str>,
    list_path: &Path,
) -> Result<usize> {
    let input_path = Path::new(input);
    let is_dataset = input_path.extension().is_some_and(|ext| ext == "json");

    if input_path.exists() && is_dataset {
        return write_dataset_ranges(input_path, list_path, country_filter);
    }

    if country_filter.is_some() {
        bail!("--country requires a country_asn.json input");
    }

    if input_path.exists() {
        if list_mode {
            return adopt_list_file(input_path, list_path);
        }
        return write_literal(list_path, input);
    }

    if list_mode {
        bail!("list file not found: {input}");
    }

    write_literal(list_path, input)
}
