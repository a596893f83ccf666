#![allow(dead_code)]

use std::path::Path;

use anyhow::Result;
use hooks::git::Repo;
use tempfile::TempDir;

pub struct TestRepo {
  pub repo:      git2::Repository,
  pub repo_path: TempDir
}

impl Default for TestRepo {
  fn default() -> Self {
    let repo_path = TempDir::new().unwrap();
    let repo = git2::Repository::init(repo_path.path()).unwrap();

    Self { repo, repo_path }
  }
}

impl TestRepo {
  pub fn write(&self, name: &str, content: impl AsRef<[u8]>) -> Result<()> {
    std::fs::write(self.repo_path.path().join(name), content)?;
    Ok(())
  }

  pub fn delete(&self, name: &str) -> Result<()> {
    std::fs::remove_file(self.repo_path.path().join(name))?;
    Ok(())
  }

  /// Stages the working-tree state of `name`, removing it from the index if the file is gone
  pub fn stage(&self, name: &str) -> Result<()> {
    let mut index = self.repo.index()?;

    if self.repo_path.path().join(name).exists() {
      index.add_path(Path::new(name))?;
    } else {
      index.remove_path(Path::new(name))?;
    }

    index.write()?;
    Ok(())
  }

  pub fn write_and_stage(&self, name: &str, content: impl AsRef<[u8]>) -> Result<()> {
    self.write(name, content)?;
    self.stage(name)
  }

  pub fn commit(&self, message: &str) -> Result<()> {
    let mut index = self.repo.index()?;
    let oid = index.write_tree()?;
    let signature = git2::Signature::now("Your Name", "email@example.com")?;
    let tree = self.repo.find_tree(oid)?;

    match self.repo.head().and_then(|head| head.peel_to_commit()) {
      Ok(parent) => {
        self
          .repo
          .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;
      },
      Err(_) => {
        self
          .repo
          .commit(Some("HEAD"), &signature, &signature, message, &tree, &[])?;
      }
    }

    Ok(())
  }

  /// Opens the repository the way the hooks do
  pub fn open(&self) -> Result<Repo> {
    Ok(Repo::new_with_path(self.repo_path.path())?)
  }
}
