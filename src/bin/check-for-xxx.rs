// Hook: pre-commit

use std::io::Write;
use std::process::ExitCode;

use colored::Colorize;
use hooks::hook::{self, EXIT_FAILURE, EXIT_MARKERS};
use hooks::xxx::XXX_MESSAGE;

fn main() -> ExitCode {
  env_logger::init();

  let lines = match hook::run_xxx() {
    Ok(lines) => lines,
    Err(err) => {
      eprintln!("{} {err:#}", "check-for-xxx:".red());
      return ExitCode::from(EXIT_FAILURE);
    }
  };

  if lines.is_empty() {
    return ExitCode::SUCCESS;
  }

  eprintln!("{}", XXX_MESSAGE.red());
  let mut stdout = std::io::stdout().lock();
  for line in &lines {
    writeln!(stdout, "{line}").ok();
  }

  ExitCode::from(EXIT_MARKERS)
}
