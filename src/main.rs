use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use avlink::{Args, OutputFormat, run_with_log_level};

fn main() -> ExitCode {
    let args = Args::parse();
    let mut stdout = std::io::stdout();

    let log_level = args.log_level();
    let output_format = args.output_format().unwrap_or(if stdout.is_terminal() {
        OutputFormat::Pretty
    } else {
        OutputFormat::Json
    });

    match run_with_log_level(args.into_command(), &mut stdout, log_level, output_format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
