//! rove - plugin-driven file tree processor

use std::process::ExitCode;

fn main() -> ExitCode {
    ExitCode::from(rove_cli::cli::run() as u8)
}
