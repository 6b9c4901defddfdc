//! Command line interface for pkg-manifest.

use std::fs;
use std::io::Read;
use std::io::stdin;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use simplelog::Config;
use simplelog::SimpleLogger;

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if SimpleLogger::init(cli.verbose.log_level_filter(), Config::default()).is_err() {
        log::debug!("not initializing another logger, as one is initialized already");
    }

    let document = match &cli.path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            stdin().read_to_string(&mut buf).map(|_| buf)
        }
    };
    let document = match document {
        Ok(document) => document,
        Err(source) => {
            error!("failed to read manifest: {source}");
            return ExitCode::FAILURE;
        }
    };

    let package = match pkg_manifest::parse(&document) {
        Ok(package) => package,
        Err(error) => {
            error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let options = pkg_manifest::EmitOptions::new()
        .with_format(cli.format.into())
        .with_no_files(cli.no_files)
        .with_local_metadata(cli.local_metadata);

    match pkg_manifest::emit(&package, &options) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}
