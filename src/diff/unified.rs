//! Zero-context unified diff rendering and hunk header parsing.

use std::fmt;
use std::str::FromStr;

use git2::{DiffOptions, Patch};
use thiserror::Error;

pub const HUNK_MARKER: &str = "@@";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HeaderError {
  #[error("Not a unified-diff header: {0:?}")]
  Malformed(String)
}

/// Line numbers and counts declared by a `@@ -a,b +c,d @@` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
  pub old_start: usize,
  pub old_count: usize,
  pub new_start: usize,
  pub new_count: usize
}

/// A contiguous run of changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
  pub header:  HunkHeader,
  pub removed: Vec<String>,
  pub added:   Vec<String>
}

fn parse_range(field: &str, sign: char, line: &str) -> Result<(usize, usize), HeaderError> {
  let malformed = || HeaderError::Malformed(line.to_string());
  let range = field.strip_prefix(sign).ok_or_else(malformed)?;

  let (start, count) = match range.split_once(',') {
    Some((start, count)) => (start, Some(count)),
    None => (range, None)
  };

  let start = start.parse::<usize>().map_err(|_| malformed())?;
  let count = match count {
    Some(count) => count.parse::<usize>().map_err(|_| malformed())?,
    None => 1
  };

  Ok((start, count))
}

impl FromStr for HunkHeader {
  type Err = HeaderError;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let parts: Vec<&str> = line.split(' ').collect();

    match parts.as_slice() {
      [HUNK_MARKER, old, new, HUNK_MARKER] => {
        let (old_start, old_count) = parse_range(old, '-', line)?;
        let (new_start, new_count) = parse_range(new, '+', line)?;
        Ok(HunkHeader { old_start, old_count, new_start, new_count })
      },
      _ => Err(HeaderError::Malformed(line.to_string()))
    }
  }
}

// A single-line range omits its count. An empty range names the line before it.
fn format_range(f: &mut fmt::Formatter<'_>, start: usize, count: usize) -> fmt::Result {
  match count {
    1 => write!(f, "{start}"),
    _ => write!(f, "{start},{count}")
  }
}

impl fmt::Display for HunkHeader {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{HUNK_MARKER} -")?;
    format_range(f, self.old_start, self.old_count)?;
    write!(f, " +")?;
    format_range(f, self.new_start, self.new_count)?;
    write!(f, " {HUNK_MARKER}")
  }
}

impl From<&git2::DiffHunk<'_>> for HunkHeader {
  fn from(hunk: &git2::DiffHunk<'_>) -> Self {
    HunkHeader {
      old_start: hunk.old_start() as usize,
      old_count: hunk.old_lines() as usize,
      new_start: hunk.new_start() as usize,
      new_count: hunk.new_lines() as usize
    }
  }
}

// Every line gets a `\n` terminator so a missing final newline or CRLF endings
// never show up as changed lines.
fn normalized(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 1);
  for line in text.lines() {
    out.push_str(line);
    out.push('\n');
  }
  out
}

fn line_text(content: &[u8]) -> String {
  let content = content.strip_suffix(b"\n").unwrap_or(content);
  String::from_utf8_lossy(content).into_owned()
}

fn diff_options() -> DiffOptions {
  let mut opts = DiffOptions::new();
  opts.context_lines(0).interhunk_lines(0).force_text(true);
  opts
}

/// Splits the changes between two texts into zero-context hunks.
///
/// The line diff is libgit2's xdiff, which works in linear space. Within a
/// hunk the removed lines precede the added ones.
pub fn hunks(old: &str, new: &str) -> Result<Vec<Hunk>, git2::Error> {
  let (old, new) = (normalized(old), normalized(new));
  let mut opts = diff_options();
  let patch = Patch::from_buffers(old.as_bytes(), None, new.as_bytes(), None, Some(&mut opts))?;

  let mut hunks = Vec::with_capacity(patch.num_hunks());
  for hunk_idx in 0..patch.num_hunks() {
    let (hunk, line_count) = patch.hunk(hunk_idx)?;
    let mut removed = Vec::new();
    let mut added = Vec::new();

    for line_idx in 0..line_count {
      let line = patch.line_in_hunk(hunk_idx, line_idx)?;
      match line.origin() {
        '-' => removed.push(line_text(line.content())),
        '+' => added.push(line_text(line.content())),
        _ => {}
      }
    }

    hunks.push(Hunk { header: HunkHeader::from(&hunk), removed, added });
  }

  Ok(hunks)
}

/// Renders a unified diff with zero context lines.
///
/// Produces nothing when both sides are equal. Otherwise emits the
/// `---`/`+++` file headers followed by each hunk.
///
/// # Arguments
/// * `old` - The original version
/// * `new` - The new version
/// * `from` - Label for the original version
/// * `to` - Label for the new version
pub fn unified_diff(old: &str, new: &str, from: &str, to: &str) -> Result<Vec<String>, git2::Error> {
  let hunks = hunks(old, new)?;

  if hunks.is_empty() {
    return Ok(Vec::new());
  }

  let mut lines = vec![format!("--- {from}"), format!("+++ {to}")];

  for hunk in hunks {
    lines.push(hunk.header.to_string());
    lines.extend(hunk.removed.iter().map(|line| format!("-{line}")));
    lines.extend(hunk.added.iter().map(|line| format!("+{line}")));
  }

  Ok(lines)
}
