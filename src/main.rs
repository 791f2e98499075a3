use std::process::ExitCode;

use colored::Colorize;
use procbind::cli::CommandLineInterface;

fn main() -> ExitCode {
    procbind::init_tracing();
    let command_line_interface = CommandLineInterface::load();
    match command_line_interface.run() {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            eprintln!("{} of {} callables failed", summary.failed, summary.failed + summary.succeeded);
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
