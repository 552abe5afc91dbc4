//! End-to-end pipeline runs over a scripted process runner.
//!
//! The runner stands in for masscan and zgrab2: it records every command
//! the pipeline issues and writes canned output files where the real tools
//! would. Fake tool binaries are dropped into `<base>/bin/` so provisioning
//! finds them without touching the network.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use titlescan::input::Opts;
use titlescan::pipeline::{run_pipeline, Workspace};
use titlescan::process::{ProcessError, ProcessRunner, ToolCommand};

const REPORT: &str = "#masscan\n\
    open tcp 80 10.0.0.1 1700000000\n\
    open tcp 443 10.0.0.2 1700000000\n\
    open tcp 8080 10.0.0.3 1700000000\n";

const ZGRAB_80: &str =
    "{\"ip\":\"10.0.0.1\",\"data\":{\"http\":{\"result\":{\"response\":{\"body\":\"<html><title>Port Eighty</title></html>\"}}}}}\n";

const ZGRAB_443: &str = concat!(
    "{\"ip\":\"10.0.0.2\",\"data\":{\"http\":{\"result\":{\"response\":{\"body\":\"<title>  Port 443  </title>\"}}}}}\n",
    "{\"ip\":\"10.0.0.9\",\"error\":\"connection reset\"}\n",
);

#[derive(Default)]
struct ScriptedRunner {
    fail_scan: bool,
    fail_port_80: bool,
    report: &'static str,
    commands: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    fn arg_after(command: &ToolCommand, flag: &str) -> Option<String> {
        let position = command.args.iter().position(|arg| arg == flag)?;
        command.args.get(position + 1).cloned()
    }

    fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &ToolCommand) -> Result<(), ProcessError> {
        self.commands.borrow_mut().push(command.render());

        if command.program.ends_with("masscan") {
            if self.fail_scan {
                return Err(ProcessError::Failed {
                    program: command.program.clone(),
                    status: "exit status: 1".to_owned(),
                });
            }
            let report_path = Self::arg_after(command, "-oL").expect("masscan needs -oL");
            fs::write(report_path, self.report).unwrap();
            return Ok(());
        }

        if command.program.ends_with("zgrab2") {
            let port = Self::arg_after(command, "--port").expect("zgrab2 needs --port");
            let output = Self::arg_after(command, "--output-file").expect("zgrab2 needs an output");
            if port == "80" {
                if self.fail_port_80 {
                    return Err(ProcessError::Failed {
                        program: command.program.clone(),
                        status: "exit status: 1".to_owned(),
                    });
                }
                fs::write(output, ZGRAB_80).unwrap();
            } else {
                fs::write(output, ZGRAB_443).unwrap();
            }
            return Ok(());
        }

        panic!("unexpected command: {}", command.render());
    }
}

fn workspace_for(name: &str) -> Workspace {
    let base = std::env::temp_dir().join(format!("titlescan-e2e-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&base);
    fs::create_dir_all(base.join("bin")).unwrap();
    // Fake tool binaries so provisioning never reaches for the network.
    fs::write(base.join("bin").join("masscan"), b"").unwrap();
    fs::write(base.join("bin").join("zgrab2"), b"").unwrap();
    Workspace::at(base, Path::new("opendomains"))
}

fn opts_for(input: &str) -> Opts {
    Opts {
        input: input.to_owned(),
        quiet: true,
        no_download: true,
        ..Opts::default()
    }
}

#[test]
fn full_sweep_writes_title_summary() {
    let workspace = workspace_for("happy");
    let runner = ScriptedRunner {
        report: REPORT,
        ..ScriptedRunner::default()
    };

    run_pipeline(&opts_for("10.0.0.0/24"), &workspace, &runner).unwrap();

    assert_eq!(fs::read_to_string(&workspace.list).unwrap(), "10.0.0.0/24\n");
    assert_eq!(
        fs::read_to_string(&workspace.open_80).unwrap(),
        "10.0.0.1\n"
    );
    assert_eq!(
        fs::read_to_string(&workspace.open_443).unwrap(),
        "10.0.0.2\n"
    );
    assert_eq!(
        fs::read_to_string(&workspace.summary).unwrap(),
        "IP: 10.0.0.1 - Title: Port Eighty\n\
         IP: 10.0.0.2 - Title: Port 443\n\
         IP: 10.0.0.9 - No response body found\n"
    );

    let commands = runner.commands();
    assert_eq!(commands.len(), 3);
    assert!(commands[0].contains("-p80,443"));
    assert!(commands[0].contains("--rate=10000"));
    assert!(commands[1].contains("--port 80"));
    assert!(commands[2].contains("--port 443"));

    fs::remove_dir_all(&workspace.base_dir).unwrap();
}

#[test]
fn failed_scan_aborts_without_summary() {
    let workspace = workspace_for("scan-fails");
    let runner = ScriptedRunner {
        fail_scan: true,
        report: REPORT,
        ..ScriptedRunner::default()
    };

    let result = run_pipeline(&opts_for("10.0.0.0/24"), &workspace, &runner);

    assert!(result.is_err());
    assert!(!workspace.summary.exists());
    fs::remove_dir_all(&workspace.base_dir).unwrap();
}

#[test]
fn failed_port_80_inspection_still_summarizes_port_443() {
    let workspace = workspace_for("port80-fails");
    let runner = ScriptedRunner {
        fail_port_80: true,
        report: REPORT,
        ..ScriptedRunner::default()
    };

    run_pipeline(&opts_for("10.0.0.0/24"), &workspace, &runner).unwrap();

    assert!(!workspace.inspect_80.exists());
    assert_eq!(
        fs::read_to_string(&workspace.summary).unwrap(),
        "IP: 10.0.0.2 - Title: Port 443\n\
         IP: 10.0.0.9 - No response body found\n"
    );
    fs::remove_dir_all(&workspace.base_dir).unwrap();
}

#[test]
fn empty_report_skips_inspection_and_writes_empty_summary() {
    let workspace = workspace_for("empty-report");
    let runner = ScriptedRunner {
        report: "",
        ..ScriptedRunner::default()
    };

    run_pipeline(&opts_for("10.0.0.0/24"), &workspace, &runner).unwrap();

    // Only the masscan invocation; both zgrab2 calls were skipped.
    assert_eq!(runner.commands().len(), 1);
    assert!(workspace.summary.exists());
    assert_eq!(fs::read_to_string(&workspace.summary).unwrap(), "");
    fs::remove_dir_all(&workspace.base_dir).unwrap();
}

#[test]
fn dataset_input_filters_by_country() {
    let workspace = workspace_for("dataset");
    let runner = ScriptedRunner {
        report: "",
        ..ScriptedRunner::default()
    };
    let mut opts = opts_for("fixtures/country_asn.json");
    opts.country = Some("TESTLAND".to_owned());

    run_pipeline(&opts, &workspace, &runner).unwrap();

    // The IPv6 Testland record is dropped; the Otherland record filtered.
    assert_eq!(
        fs::read_to_string(&workspace.list).unwrap(),
        "1.1.1.1-1.1.1.10\n3.3.3.3-3.3.3.30\n"
    );
    fs::remove_dir_all(&workspace.base_dir).unwrap();
}
