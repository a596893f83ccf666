//! The version-control side of a check: what changed, and what it looked like before.

use std::fmt;

/// Object id of the empty tree. Diffing against it makes every line of every file an addition.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// What the staged changes are compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Against {
  /// A revision spec, usually `HEAD`
  Commit(String),
  /// No prior commit exists
  EmptyTree
}

impl fmt::Display for Against {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Against::Commit(rev) => write!(f, "{rev}"),
      Against::EmptyTree => write!(f, "{EMPTY_TREE}")
    }
  }
}

/// One changed file: its repo-relative path and both decoded versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
  pub path: String,
  pub old:  String,
  pub new:  String
}

impl FileChange {
  pub fn new(path: impl Into<String>, old: impl Into<String>, new: impl Into<String>) -> Self {
    Self { path: path.into(), old: old.into(), new: new.into() }
  }
}

/// Access to the staged changes of a repository.
///
/// Implementations decide how "no prior commit" and undecodable content are
/// represented; neither is an error for callers.
pub trait ChangeSource {
  type Error;

  /// The last commit, or the empty tree when there is none
  fn against(&self) -> Result<Against, Self::Error>;

  /// Staged files that differ from `against`, limited to `paths` unless it is empty.
  /// Deleted files and files whose content did not change are left out.
  fn changes(&self, against: &Against, paths: &[String]) -> Result<Vec<FileChange>, Self::Error>;

  /// The raw cached diff against `against`, in patch format
  fn changed_text(&self, against: &Against) -> Result<Vec<u8>, Self::Error>;
}
