//! The binary: reads options, merges the config file, and drives one sweep.

use log::debug;

use titlescan::input::{Config, Opts};
use titlescan::pipeline::{run_pipeline, Workspace};
use titlescan::process::SystemRunner;
use titlescan::warning;

fn main() {
    env_logger::init();

    let mut opts = Opts::read();
    let config = Config::read(opts.config_path.clone());
    opts.merge(&config);

    debug!("main() `opts` arguments are {opts:?}");

    let base_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            warning!(format!("could not determine the working directory: {e}"));
            std::process::exit(1);
        }
    };
    let workspace = Workspace::at(base_dir, &opts.output);

    if let Err(e) = run_pipeline(&opts, &workspace, &SystemRunner) {
        warning!(format!("{e:#}"), opts.accessible);
        std::process::exit(1);
    }
}
