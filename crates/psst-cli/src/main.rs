//! psst - print Kubernetes secrets in a readable form.

use colored::Colorize;
use psst_core::SecretError;
use std::process::ExitCode;

/// Exit status when the requested key cannot be chosen.
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    match psst_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            let input_error = e
                .downcast_ref::<SecretError>()
                .is_some_and(SecretError::is_input_error);
            if input_error {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
