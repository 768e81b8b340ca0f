//! The `rshape` binary.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use rshape_cli::{report, run, tracing_config, Cli, Outcome};
use rshape_resolver::OsFileSystem;

const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() -> ExitCode {
    tracing_config::init_tracing();
    let cli = Cli::parse();

    let mut stdout = std::io::stdout().lock();
    match run(&cli, &mut stdout) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::NotAssignable) => ExitCode::from(1),
        Err(error) => {
            let use_color = std::io::stderr().is_terminal();
            let diagnostics = error.diagnostics();
            if diagnostics.is_empty() {
                print_error(&error.to_string(), use_color);
            }
            for diagnostic in &diagnostics {
                eprint!("{}", report::render(diagnostic, &OsFileSystem, use_color));
            }
            ExitCode::from(2)
        }
    }
}

fn print_error(msg: &str, use_color: bool) {
    if use_color {
        eprintln!("{BOLD}{RED}error{RESET}: {msg}");
    } else {
        eprintln!("error: {msg}");
    }
}
