use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use is_dgsh::{check_command, exit_code, EXIT_FATAL};

/// Report whether an executable is dgsh-compatible.
///
/// Prints nothing by default: exit status 0 means compatible, 2 means the
/// program is not compatible (or could not be read), 1 means a usage error.
/// Set `RUST_LOG=debug` to see why.
#[derive(Parser, Debug)]
#[command(name = "is-dgsh", version, about = "Detect dgsh-compatible programs", long_about = None)]
struct Cli {
    /// Path to the script or ELF binary to inspect.
    program: PathBuf,

    /// Print a JSON report of the detection.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn run(cli: &Cli) -> Result<bool> {
    check_command(&cli.program, cli.json)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            return ExitCode::from(EXIT_FATAL as u8);
        }
        // --help / --version
        Err(err) => err.exit(),
    };

    match run(&cli) {
        Ok(compatible) => ExitCode::from(exit_code(compatible) as u8),
        Err(err) => {
            eprintln!("is-dgsh: {err:#}");
            ExitCode::from(EXIT_FATAL as u8)
        }
    }
}
