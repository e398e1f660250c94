//! tspack - Command-line tool for describing and building bundle targets

use std::process::ExitCode;

use tspack::cli;

fn main() -> ExitCode {
    cli::run()
}
