//! Finds marker patterns in the lines a change adds.
//!
//! Only additions are inspected. A marker that already existed, or one that
//! is being removed, is never reported.

use std::fmt;
use std::time::Instant;

use thiserror::Error;

use crate::diff::{unified_diff, HeaderError, HunkHeader};
use crate::patterns::Patterns;

#[derive(Error, Debug)]
pub enum ScanError {
  #[error("Malformed hunk in diff of {path}: {source}")]
  MalformedHunk {
    path:   String,
    #[source]
    source: HeaderError
  },

  #[error("Failed to diff {path}: {source}")]
  Diff {
    path:   String,
    #[source]
    source: git2::Error
  }
}

/// A pattern found on an added line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
  pub pattern: String,
  pub path:    String,
  /// 1-based line number in the new version of the file
  pub line:    usize
}

impl fmt::Display for Detection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Error pattern {} detected at {}:{}", self.pattern, self.path, self.line)
  }
}

/// Given two versions of a file, collects every pattern match on an added line.
///
/// # Arguments
/// * `path` - Name of the file, used to label detections
/// * `new` - The incoming version
/// * `old` - The previous version, empty for new files
/// * `patterns` - Patterns to search for
///
/// # Returns
/// * `Result<Vec<Detection>, ScanError>` - Detections in hunk order, then line order, then pattern order
pub fn collect_errors(path: &str, new: &str, old: &str, patterns: &Patterns) -> Result<Vec<Detection>, ScanError> {
  if patterns.is_empty() || new == old {
    return Ok(Vec::new());
  }

  let started = Instant::now();
  let diff = unified_diff(old, new, &format!("a/{path}"), &format!("b/{path}"))
    .map_err(|source| ScanError::Diff { path: path.to_string(), source })?;

  let detections = scan_unified(path, diff.iter().map(String::as_str), patterns)?;
  log::debug!("{path}: {} diff lines scanned in {:.2?}", diff.len(), started.elapsed());
  Ok(detections)
}

/// Walks unified-diff lines, tracking the line number in the new file.
///
/// Lines before the first hunk header (and after a `diff --git` line, until
/// the next header) are file metadata. Inside a hunk, `+` lines are matched
/// and advance the counter, context lines only advance it, and `-` or `\`
/// lines are skipped.
pub fn scan_unified<'a, I>(path: &str, lines: I, patterns: &Patterns) -> Result<Vec<Detection>, ScanError>
where
  I: IntoIterator<Item = &'a str>
{
  let mut detections = Vec::new();
  let mut line_number: Option<usize> = None;

  for line in lines {
    if line.starts_with("@@") {
      let header = line.parse::<HunkHeader>().map_err(|source| {
        ScanError::MalformedHunk { path: path.to_string(), source }
      })?;
      log::debug!("{path}: {header}");
      line_number = Some(header.new_start);
      continue;
    }

    if line.starts_with("diff --git") {
      line_number = None;
      continue;
    }

    let Some(current) = line_number.as_mut() else {
      continue;
    };

    if let Some(added) = line.strip_prefix('+') {
      detections.extend(patterns.matching(added).map(|pattern| {
        Detection {
          pattern: pattern.as_str().to_string(),
          path:    path.to_string(),
          line:    *current
        }
      }));
      *current += 1;
    } else if line.starts_with(' ') {
      *current += 1;
    }
  }

  Ok(detections)
}

#[cfg(test)]
mod tests {
  use super::*;

  const MARKER: &str = "# xxx";

  fn marker() -> Patterns {
    Patterns::new([MARKER]).unwrap()
  }

  fn lines(detections: &[Detection]) -> Vec<usize> {
    detections.iter().map(|detection| detection.line).collect()
  }

  #[test]
  fn test_new_file_marker_on_first_line() {
    let errors = collect_errors("file.py", "# xxx marker\n", "", &marker()).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 1);
    assert_eq!(errors[0].to_string(), "Error pattern # xxx detected at file.py:1");
  }

  #[test]
  fn test_inserted_line_between_unchanged_lines() {
    let errors = collect_errors("file.py", "a\nb\n# xxx\nc\n", "a\nb\nc\n", &marker()).unwrap();
    assert_eq!(lines(&errors), vec![3]);
  }

  #[test]
  fn test_removed_marker_is_not_reported() {
    let errors = collect_errors("file.py", "", "# xxx\n", &marker()).unwrap();
    assert!(errors.is_empty());

    let errors = collect_errors("file.py", "a\nc\n", "a\n# xxx\nc\n", &marker()).unwrap();
    assert!(errors.is_empty());
  }

  #[test]
  fn test_unchanged_marker_is_not_reported() {
    let old = "# xxx\na\n";
    let new = "# xxx\na\nb\n";
    assert!(collect_errors("file.py", new, old, &marker()).unwrap().is_empty());
  }

  #[test]
  fn test_identical_versions_report_nothing() {
    let text = "# xxx\nprint(1)\n";
    assert!(collect_errors("file.py", text, text, &marker()).unwrap().is_empty());
  }

  #[test]
  fn test_scanning_twice_gives_the_same_result() {
    let patterns = Patterns::new([MARKER, "print"]).unwrap();
    let old = "a\nb\n";
    let new = "print(1)\na\n# xxx\nb\n";

    let first = collect_errors("f", new, old, &patterns).unwrap();
    let second = collect_errors("f", new, old, &patterns).unwrap();
    assert_eq!(first, second);
    assert_eq!(lines(&first), vec![1, 3]);
  }

  #[test]
  fn test_one_error_per_matching_pattern_in_pattern_order() {
    let patterns = Patterns::new(["pdb", "# xxx", "nomatch"]).unwrap();
    let errors = collect_errors("f.py", "import pdb  # xxx\n", "", &patterns).unwrap();

    let found: Vec<&str> = errors.iter().map(|error| error.pattern.as_str()).collect();
    assert_eq!(found, vec!["pdb", "# xxx"]);
    assert_eq!(lines(&errors), vec![1, 1]);
  }

  #[test]
  fn test_every_line_of_a_new_file_is_eligible() {
    let new = "# xxx one\nclean\n# xxx two\n# XXX upper\n# xxx three\n";
    let errors = collect_errors("new.py", new, "", &marker()).unwrap();
    assert_eq!(lines(&errors), vec![1, 3, 5]);
  }

  #[test]
  fn test_counter_resets_at_each_hunk() {
    let old = "1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n";
    let new = "1\n# xxx a\n2\n3\n4\n5\n6\n7\n# xxx b\n8\n9\n10\n# xxx c\n";
    let errors = collect_errors("f", new, old, &marker()).unwrap();
    assert_eq!(lines(&errors), vec![2, 9, 13]);
  }

  #[test]
  fn test_replaced_line_uses_new_position() {
    let old = "a\nb\nc\nd\n";
    let new = "a\nb\n# xxx c\n";
    let errors = collect_errors("f", new, old, &marker()).unwrap();
    assert_eq!(lines(&errors), vec![3]);
  }

  #[test]
  fn test_repeated_pattern_reports_each_occurrence() {
    let patterns = Patterns::new([MARKER, MARKER]).unwrap();
    let errors = collect_errors("f.py", "# xxx\n", "", &patterns).unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(lines(&errors), vec![1, 1]);
  }

  #[test]
  fn test_full_rewrite_of_a_large_file() {
    let patterns = Patterns::new(["^new line 19999$"]).unwrap();
    let old: String = (0..20_000).map(|i| format!("old line {i}\n")).collect();
    let new: String = (0..20_000).map(|i| format!("new line {i}\n")).collect();

    let errors = collect_errors("big.txt", &new, &old, &patterns).unwrap();
    assert_eq!(lines(&errors), vec![20_000]);
  }

  #[test]
  fn test_no_patterns_is_inert() {
    let errors = collect_errors("f", "# xxx\n", "", &Patterns::default()).unwrap();
    assert!(errors.is_empty());
  }

  #[test]
  fn test_file_headers_are_not_matched() {
    let patterns = Patterns::new(["b/"]).unwrap();
    let errors = collect_errors("b/", "clean\n", "", &patterns).unwrap();
    assert!(errors.is_empty());
  }

  #[test]
  fn test_scan_unified_with_context_and_metadata_lines() {
    let diff = [
      "diff --git a/f b/f",
      "--- a/f",
      "+++ b/f",
      "@@ -10,3 +10,4 @@",
      " context",
      "-# xxx removed",
      "+# xxx added",
      "\\ No newline at end of file",
      "+# xxx again",
      "diff --git a/g b/g",
      "+++ b/g # xxx",
      "@@ -0,0 +1 @@",
      "+# xxx in g",
    ];
    let errors = scan_unified("f", diff, &marker()).unwrap();
    assert_eq!(lines(&errors), vec![11, 12, 1]);
  }

  #[test]
  fn test_malformed_hunk_header_is_an_error() {
    let diff = ["--- a/f", "+++ b/f", "@@ -1 +1 @@ fn main()", "+# xxx"];
    let err = scan_unified("f", diff, &marker()).unwrap_err();
    assert!(matches!(err, ScanError::MalformedHunk { ref path, .. } if path == "f"));
  }
}
