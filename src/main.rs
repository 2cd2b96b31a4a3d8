//! ccdupe - Duplicate File Finder
//!
//! Entry point for the ccdupe CLI application.

use ccdupe::{
    cli::Cli,
    duplicates::FinderError,
    error::{ExitCode, StructuredError},
};
use clap::Parser;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::GeneralError
            } else {
                ExitCode::Success
            };
            std::process::exit(code.as_i32());
        }
    };

    if cli.no_color {
        yansi::disable();
    }
    let json_errors = cli.json;

    match ccdupe::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = if err
                .downcast_ref::<FinderError>()
                .is_some_and(|e| matches!(e, FinderError::Interrupted))
            {
                ExitCode::Interrupted
            } else {
                ExitCode::GeneralError
            };

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                match serde_json::to_string_pretty(&structured) {
                    Ok(json) => eprintln!("{json}"),
                    Err(_) => eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err),
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
