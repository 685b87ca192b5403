//! Entry point for ensure-model-metadata
//!
//! Exit code 0 when the model was patched or already complete, 1 on any
//! error including a wrong argument count.

mod cli;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::{Cli, CliRunner};

fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version come through here too and are not failures.
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    match CliRunner::new(args).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}
