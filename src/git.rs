use std::path::Path;

use git2::{RepositoryOpenFlags as Flag, *};
use log::{debug, warn};
use thiserror::Error;
use anyhow::Context;

use crate::diff::{DiffDeltaPath, HasBlob, Utf8Text};
use crate::source::{Against, ChangeSource, FileChange, EMPTY_TREE};

#[derive(Error, Debug)]
pub enum GitError {
  #[error("Git error: {0}")]
  Git(#[from] git2::Error),

  #[error("Anyhow error: {0}")]
  Anyhow(#[from] anyhow::Error)
}

pub type Result<T, E = GitError> = std::result::Result<T, E>;

/// An opened repository, passed explicitly to everything that reads from it.
pub struct Repo {
  repo: Repository
}

impl Repo {
  /// Opens the repository containing the current directory (or `GIT_DIR`).
  pub fn new() -> Result<Self> {
    Ok(Repo { repo: Repository::open_from_env()? })
  }

  pub fn new_with_path(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Repo {
      repo: Repository::open_ext(path.as_ref(), Flag::empty(), Vec::<&Path>::new())?
    })
  }

  pub fn workdir(&self) -> Option<&Path> {
    self.repo.workdir()
  }

  fn tree(&self, against: &Against) -> Result<Tree<'_>> {
    match against {
      Against::Commit(rev) => {
        self
          .repo
          .revparse_single(rev)
          .and_then(|object| object.peel_to_tree())
          .with_context(|| format!("Could not resolve {rev} to a tree"))
          .map_err(GitError::from)
      },
      Against::EmptyTree => self.empty_tree()
    }
  }

  fn empty_tree(&self) -> Result<Tree<'_>> {
    let oid = Oid::from_str(EMPTY_TREE)?;
    match self.repo.find_tree(oid) {
      Ok(tree) => Ok(tree),
      Err(_) => {
        debug!("[empty_tree] Not in the object database, building it");
        let oid = self.repo.treebuilder(None)?.write()?;
        Ok(self.repo.find_tree(oid)?)
      }
    }
  }

  fn blob_text(&self, file: &DiffFile<'_>) -> Result<String> {
    if !file.has_blob() {
      return Ok(String::new());
    }

    let blob = self.repo.find_blob(file.id())?;
    match blob.content().to_text() {
      Some(text) => Ok(text),
      None => {
        warn!("[blob_text] {} is not UTF-8, treating it as empty", file.id());
        Ok(String::new())
      }
    }
  }

  fn staged_diff(&self, against: &Against, paths: &[String], opts: &mut DiffOptions) -> Result<Diff<'_>> {
    let tree = self.tree(against)?;

    for path in paths {
      opts.pathspec(path.as_str());
    }

    self
      .repo
      .diff_tree_to_index(Some(&tree), None, Some(opts))
      .context("Failed to get diff")
      .map_err(GitError::from)
  }

  fn diff_options() -> DiffOptions {
    let mut opts = DiffOptions::new();
    opts
      .ignore_submodules(true)
      .include_untracked(false)
      .include_ignored(false);
    opts
  }
}

impl ChangeSource for Repo {
  type Error = GitError;

  fn against(&self) -> Result<Against> {
    match self.repo.head().and_then(|head| head.peel_to_commit()) {
      Ok(commit) => {
        debug!("[against] HEAD is {}", commit.id());
        Ok(Against::Commit("HEAD".to_string()))
      },
      Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
        debug!("[against] No commits yet, using the empty tree");
        Ok(Against::EmptyTree)
      },
      Err(e) => Err(e.into())
    }
  }

  fn changes(&self, against: &Against, paths: &[String]) -> Result<Vec<FileChange>> {
    let mut opts = Repo::diff_options();
    let diff = self.staged_diff(against, paths, &mut opts)?;
    let mut changes = Vec::new();

    for delta in diff.deltas() {
      let path = delta.path();
      let (old, new) = (delta.old_file(), delta.new_file());

      if old.id() == new.id() {
        debug!("[changes] {path}: content unchanged");
        continue;
      }

      if !new.has_blob() {
        debug!("[changes] {path}: deleted");
        continue;
      }

      debug!("[changes] {path}: {:?}", delta.status());
      changes.push(FileChange::new(path, self.blob_text(&old)?, self.blob_text(&new)?));
    }

    Ok(changes)
  }

  fn changed_text(&self, against: &Against) -> Result<Vec<u8>> {
    let mut opts = DiffOptions::new();
    opts.ignore_submodules(true);
    let diff = self.staged_diff(against, &[], &mut opts)?;
    let mut acc = Vec::new();

    diff.print(DiffFormat::Patch, |_, _, line| {
      if matches!(line.origin(), '+' | '-' | ' ') {
        acc.push(line.origin() as u8);
      }
      acc.extend_from_slice(line.content());
      true
    })?;

    Ok(acc)
  }
}
