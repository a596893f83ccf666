// Hook: pre-commit
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use thiserror::Error;

use crate::config::Settings;
use crate::git::{GitError, Repo};
use crate::patterns::{PatternError, Patterns};
use crate::scanner::{collect_errors, Detection, ScanError};
use crate::source::{Against, ChangeSource};
use crate::xxx::find_markers;

/// Exit status when markers were found
pub const EXIT_MARKERS: u8 = 1;
/// Exit status when the check itself failed
pub const EXIT_FAILURE: u8 = 2;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Check staged changes for debug markers", long_about = None)]
pub struct Args {
  /// The files to check. If not specified, all files in the index will be checked
  pub files: Vec<String>,

  /// A regex pattern to search for in the code (can be specified multiple times)
  #[arg(short = 'p', long = "pattern")]
  pub patterns: Vec<String>,

  /// Compare against this revision instead of HEAD
  #[arg(long)]
  pub against: Option<String>
}

#[derive(Error, Debug)]
pub enum HookError {
  #[error(transparent)]
  Git(#[from] GitError),

  #[error(transparent)]
  Pattern(#[from] PatternError),

  #[error(transparent)]
  Scan(#[from] ScanError),

  #[error(transparent)]
  Anyhow(#[from] anyhow::Error)
}

/// Result of a check that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Clean,
  MarkersFound(Vec<Detection>)
}

impl Outcome {
  pub fn status(&self) -> u8 {
    match self {
      Outcome::Clean => 0,
      Outcome::MarkersFound(_) => EXIT_MARKERS
    }
  }
}

/// Process status for a finished or failed run
pub fn exit_status(result: &Result<Outcome, HookError>) -> u8 {
  match result {
    Ok(outcome) => outcome.status(),
    Err(_) => EXIT_FAILURE
  }
}

impl From<Vec<Detection>> for Outcome {
  fn from(detections: Vec<Detection>) -> Self {
    if detections.is_empty() {
      Outcome::Clean
    } else {
      Outcome::MarkersFound(detections)
    }
  }
}

/// Scans the staged version of every changed file for patterns on added lines.
///
/// # Arguments
/// * `source` - Where the changes come from
/// * `against` - Base to compare with, or `None` for the last commit (empty tree if there is none)
/// * `paths` - Files to limit the check to, all staged files when empty
/// * `patterns` - Patterns to report
pub fn check<S>(source: &S, against: Option<Against>, paths: &[String], patterns: &Patterns) -> Result<Vec<Detection>, HookError>
where
  S: ChangeSource,
  HookError: From<S::Error>
{
  let started = Instant::now();
  let against = match against {
    Some(against) => against,
    None => source.against()?
  };
  log::debug!("Comparing the index against {against}");

  let mut detections = Vec::new();
  for change in source.changes(&against, paths)? {
    detections.extend(collect_errors(&change.path, &change.new, &change.old, patterns)?);
  }

  log::debug!("Found {} markers in {:.2?}", detections.len(), started.elapsed());
  Ok(detections)
}

/// Lines of the cached diff that contain `# xxx`, in any case.
pub fn check_xxx<S>(source: &S) -> Result<Vec<String>, HookError>
where
  S: ChangeSource,
  HookError: From<S::Error>
{
  let against = source.against()?;
  log::debug!("Comparing the index against {against}");
  Ok(find_markers(&source.changed_text(&against)?))
}

/// Runs `check-for-markers` against the repository in the current directory.
pub fn run(args: &Args) -> Result<Outcome, HookError> {
  let repo = Repo::new().context("Failed to open repository")?;
  let settings = Settings::load(repo.workdir())?.merge(&args.patterns, args.against.as_deref());
  run_with(&repo, settings, &args.files)
}

/// Compiles the configured patterns and checks `source` with them.
pub fn run_with<S>(source: &S, settings: Settings, files: &[String]) -> Result<Outcome, HookError>
where
  S: ChangeSource,
  HookError: From<S::Error>
{
  log::debug!("Settings: {settings:?}");

  let patterns = Patterns::new(settings.patterns)?;
  if patterns.is_empty() {
    log::warn!("No patterns configured, nothing will be reported");
  }

  let against = settings.against.map(Against::Commit);
  Ok(check(source, against, files, &patterns)?.into())
}

/// Runs `check-for-xxx` against the repository in the current directory.
pub fn run_xxx() -> Result<Vec<String>, HookError> {
  let repo = Repo::new().context("Failed to open repository")?;
  check_xxx(&repo)
}
