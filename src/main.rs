// Hook: pre-commit

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use hooks::hook::{self, Args, Outcome};

fn main() -> ExitCode {
  env_logger::init();
  let args = Args::parse();

  let result = hook::run(&args);
  match &result {
    Ok(Outcome::MarkersFound(detections)) => {
      for detection in detections {
        eprintln!("{detection}");
      }
    },
    Ok(Outcome::Clean) => {},
    Err(err) => eprintln!("{} {err:#}", "check-for-markers:".red())
  }

  ExitCode::from(hook::exit_status(&result))
}
