use std::process::ExitCode;

use clap::Parser;
use taglet::cli::Arguments;

fn main() -> ExitCode {
    let Some(args) = Arguments::parse().with_command_or_help() else {
        return ExitCode::SUCCESS;
    };

    match taglet::cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
