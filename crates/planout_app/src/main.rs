use std::process::ExitCode;

use clap::Parser;
use planout_app::app::{run, AppConfig, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env();
    let command = Cli::parse().into_command();
    match run(&config, command) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("planout: {err:#}");
            ExitCode::FAILURE
        }
    }
}
