//! Provides a means to read, parse and hold configuration options for runs.
use clap::Parser;
use serde_derive::Deserialize;
use std::fs;
use std::path::PathBuf;

const LOWEST_PORT_NUMBER: u16 = 1;
const TOP_PORT_NUMBER: u16 = 65535;

/// Default ports handed to masscan when none are given. Inspection is
/// always limited to these two regardless of what the scan covers.
pub const DEFAULT_PORTS: [u16; 2] = [80, 443];

/// The resolved set of ports handed to masscan.
pub type Ports = Vec<u16>;

/// Parses a comma-delimited mix of ports and `start-end` ranges, sorted
/// and de-duplicated.
pub fn parse_ports_and_ranges(input: &str) -> Result<Ports, String> {
    let mut ports = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if part.contains('-') {
            let range_ports = parse_port_range(part)?;
            ports.extend(range_ports);
        } else {
            let port = parse_single_port(part)?;
            ports.push(port);
        }
    }

    if ports.is_empty() {
        return Err(String::from("No valid ports or ranges provided"));
    }

    ports.sort_unstable();
    ports.dedup();

    Ok(ports)
}

fn parse_port_range(range_str: &str) -> Result<Vec<u16>, String> {
    let range_parts: Vec<&str> = range_str.split('-').collect();
    if range_parts.len() != 2 {
        return Err(format!(
            "Invalid range format '{range_str}'. Expected 'start-end'. Example: 1-1000.",
        ));
    }

    let start: u16 = range_parts[0].parse().map_err(|_| {
        format!(
            "Invalid start port '{}' in range '{range_str}'",
            range_parts[0]
        )
    })?;
    let end: u16 = range_parts[1].parse().map_err(|_| {
        format!(
            "Invalid end port '{}' in range '{range_str}'",
            range_parts[1]
        )
    })?;

    if start > end {
        return Err(format!(
            "Start port {start} is greater than end port {end} in range '{range_str}'",
        ));
    }

    if start < LOWEST_PORT_NUMBER {
        return Err(format!(
            "Ports in range '{range_str}' must be between {LOWEST_PORT_NUMBER} and {TOP_PORT_NUMBER}",
        ));
    }

    Ok((start..=end).collect())
}

fn parse_single_port(port_str: &str) -> Result<u16, String> {
    let port: u16 = port_str
        .parse()
        .map_err(|_| format!("Invalid port number '{port_str}'"))?;

    if port < LOWEST_PORT_NUMBER {
        return Err(format!(
            "Port {port} must be between {LOWEST_PORT_NUMBER} and {TOP_PORT_NUMBER}",
        ));
    }

    Ok(port)
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "titlescan",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
    help_template = "{bin} {version}\n{about}\n\nUSAGE:\n    {usage}\n\nOPTIONS:\n{options}",
)]
#[allow(clippy::struct_excessive_bools)]
/// Masscan + zgrab2 sweep orchestrator.
/// WARNING Do not point this program at infrastructure you are not
/// authorized to scan; masscan at high rates is not a polite neighbour.
pub struct Opts {
    /// An IP, CIDR, start-end range, pre-built masscan list file, or
    /// country_asn.json dataset to sweep.
    pub input: String,

    /// Ports and/or port ranges for masscan. Examples: 80,443 or 8000-8100.
    /// Only ports 80 and 443 are inspected for titles.
    #[arg(short, long, value_parser = parse_ports_and_ranges)]
    pub ports: Option<Ports>,

    /// Masscan transmit rate in packets per second.
    #[arg(short, long, default_value = "10000")]
    pub rate: u32,

    /// Treat the input as a pre-built masscan list file.
    #[arg(short, long)]
    pub list: bool,

    /// Keep only dataset records whose country_name matches (case-insensitive).
    /// Requires a country_asn.json input.
    #[arg(short, long)]
    pub country: Option<String>,

    /// Output file for the title summary.
    #[arg(short, long, default_value = "opendomains")]
    pub output: PathBuf,

    /// Do not clone and build missing tools; fail if they are not installed.
    #[arg(long)]
    pub no_download: bool,

    /// Whether to ignore the configuration file or not.
    #[arg(long)]
    pub no_config: bool,

    /// Custom path to config file
    #[arg(long, value_parser)]
    pub config_path: Option<PathBuf>,

    /// Quiet mode. Only write the output files, no stage chatter.
    #[arg(short, long)]
    pub quiet: bool,

    /// Accessible mode. Turns off features which negatively affect screen readers.
    #[arg(long)]
    pub accessible: bool,
}

impl Opts {
    /// Reads the command line arguments, filling in the default ports.
    pub fn read() -> Self {
        let mut opts = Opts::parse();

        if opts.ports.is_none() {
            opts.ports = Some(DEFAULT_PORTS.to_vec());
        }

        opts
    }

    /// The port list rendered the way masscan's `-p` flag expects it.
    pub fn ports_spec(&self) -> String {
        let ports = self.ports.as_deref().unwrap_or(&DEFAULT_PORTS);
        ports
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Merges values found within the user configuration file into the
    /// command line arguments.
    pub fn merge(&mut self, config: &Config) {
        if !self.no_config {
            self.merge_required(config);
            self.merge_optional(config);
        }
    }

    fn merge_required(&mut self, config: &Config) {
        macro_rules! merge_required {
            ($($field: ident),+) => {
                $(
                    if let Some(e) = &config.$field {
                        self.$field = e.clone();
                    }
                )+
            }
        }

        merge_required!(rate, output, quiet, accessible, no_download);
    }

    fn merge_optional(&mut self, config: &Config) {
        macro_rules! merge_optional {
            ($($field: ident),+) => {
                $(
                    if config.$field.is_some() {
                        self.$field = config.$field.clone();
                    }
                )+
            }
        }

        merge_optional!(ports);
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            input: String::new(),
            ports: None,
            rate: 10_000,
            list: false,
            country: None,
            output: PathBuf::from("opendomains"),
            no_download: false,
            no_config: true,
            config_path: None,
            quiet: false,
            accessible: false,
        }
    }
}

/// Struct used to deserialize the options specified within our config file.
/// These will be further merged with our command line arguments in order to
/// generate the final Opts struct.
#[derive(Debug, Deserialize)]
pub struct Config {
    ports: Option<Vec<u16>>,
    rate: Option<u32>,
    output: Option<PathBuf>,
    quiet: Option<bool>,
    accessible: Option<bool>,
    no_download: Option<bool>,
}

#[allow(clippy::manual_unwrap_or_default)]
impl Config {
    /// Reads the configuration file with TOML format and parses it into a
    /// Config struct.
    ///
    /// # Format
    ///
    /// ports = [80, 443, 8080]
    /// rate = 10000
    /// output = "opendomains"
    /// quiet = false
    ///
    pub fn read(custom_config_path: Option<PathBuf>) -> Self {
        let mut content = String::new();
        let config_path = custom_config_path.unwrap_or_else(default_config_path);
        if config_path.exists() {
            content = match fs::read_to_string(config_path) {
                Ok(content) => content,
                Err(_) => String::new(),
            }
        }

        let config: Config = match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                println!("Found {e} in configuration file.\nAborting run.\n");
                std::process::exit(1);
            }
        };

        config
    }
}

/// Constructs default path to config toml
pub fn default_config_path() -> PathBuf {
    let Some(mut config_path) = dirs::home_dir() else {
        panic!("Could not infer config file path.");
    };
    config_path.push(".titlescan.toml");
    config_path
}
