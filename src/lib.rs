//! This crate exposes the internal functionality of the
//! titlescan sweep orchestrator.
//!
//! titlescan drives a masscan → zgrab2 workflow end to end: it normalizes a
//! heterogeneous target specification into a masscan list file, runs masscan
//! against it, feeds the hosts found open on ports 80 and 443 to zgrab2, and
//! reduces the zgrab2 JSON-lines output to one page-title line per
//! responding host.
//!
//! ## Pipeline Overview
//!
//! The run is managed by [`run_pipeline`](crate::pipeline::run_pipeline),
//! which sequences the stages strictly one after another:
//!
//! 1. **Target list**: a single address, CIDR, `start-end` range, pre-built
//!    list file, or `country_asn.json` dataset becomes the canonical list
//!    file (see [`targets`](crate::targets)).
//! 2. **Scan**: masscan runs against the list; a failure here aborts the
//!    run.
//! 3. **Report split**: the masscan `-oL` report is split into per-port
//!    address files (see [`report`](crate::report)).
//! 4. **Inspection**: zgrab2 fetches HTTP from the open hosts, once for
//!    port 80 and once for port 443. A failed inspection is logged and the
//!    run continues with whatever output exists.
//! 5. **Summary**: each zgrab2 output line yields `IP: <addr> - Title: <t>`
//!    or a body-missing marker (see [`inspect`](crate::inspect)).
//!
//! External tools are invoked through the
//! [`ProcessRunner`](crate::process::ProcessRunner) trait, so the whole
//! pipeline can be exercised in tests without masscan or zgrab2 installed.
//!
//! ## Basic Usage Example
//!
//! ```no_run
//! use titlescan::input::Opts;
//! use titlescan::pipeline::{run_pipeline, Workspace};
//! use titlescan::process::SystemRunner;
//!
//! fn main() -> anyhow::Result<()> {
//!     let opts = Opts {
//!         input: "192.168.0.0/24".to_owned(),
//!         ..Opts::default()
//!     };
//!     let workspace = Workspace::at(std::env::current_dir()?, &opts.output);
//!     run_pipeline(&opts, &workspace, &SystemRunner)?;
//!     Ok(())
//! }
//! ```
#![allow(clippy::needless_doctest_main)]
#![warn(missing_docs)]

pub mod tui;

pub mod input;

pub mod address;

pub mod targets;

pub mod report;

pub mod inspect;

pub mod process;

pub mod tools;

pub mod pipeline;
