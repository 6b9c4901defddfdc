//! Command line interface for pkg-binfmt.

use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use log::error;
use pkg_binfmt::analyze;
use pkg_types::Abi;
use simplelog::Config;
use simplelog::SimpleLogger;

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if SimpleLogger::init(cli.verbose.log_level_filter(), Config::default()).is_err() {
        log::debug!("not initializing another logger, as one is initialized already");
    }

    let host_abi = match cli.host_abi.as_deref().map(Abi::from_str) {
        Some(Ok(abi)) => Some(abi),
        Some(Err(error)) => {
            error!("invalid --host-abi: {error}");
            return ExitCode::FAILURE;
        }
        None => None,
    };

    match analyze(&cli.path, host_abi.as_ref(), cli.arch_hint.as_deref()) {
        Ok(analysis) => {
            let output = serde_json::json!({
                "abi": analysis.abi.as_ref().map(ToString::to_string),
                "provided": analysis.provided.as_ref().map(ToString::to_string),
                "required": analysis.required.iter().map(ToString::to_string).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output).expect("json serialization of plain strings"));
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}
