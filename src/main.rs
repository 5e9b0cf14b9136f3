use jsonfile_db::cli::{CliCommand, DatabaseCli, USAGE};
use jsonfile_db::StorageConfig;
use log::debug;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match CliCommand::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let config = StorageConfig::from_env();
    debug!("Using storage root {}", config.root().display());

    match DatabaseCli::new(config).execute(command) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
