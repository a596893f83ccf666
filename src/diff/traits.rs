//! Utility traits for diff processing.

use git2::DiffFile;

/// Extension trait for git2::DiffDelta to get the repo-relative path of the new side
pub trait DiffDeltaPath {
  fn path(&self) -> String;
}

impl DiffDeltaPath for git2::DiffDelta<'_> {
  fn path(&self) -> String {
    self
      .new_file()
      .path()
      .or_else(|| self.old_file().path())
      .map(|path| path.to_string_lossy().into_owned())
      .unwrap_or_default()
  }
}

/// Extension trait for decoding blob bytes into text.
///
/// Content that is not valid UTF-8 is treated as empty text, so binary
/// files compare equal to each other and never produce diff lines.
pub trait Utf8Text {
  fn to_text(&self) -> Option<String>;

  fn to_text_or_empty(&self) -> String {
    self.to_text().unwrap_or_default()
  }
}

impl Utf8Text for [u8] {
  fn to_text(&self) -> Option<String> {
    std::str::from_utf8(self).ok().map(str::to_string)
  }
}

impl Utf8Text for Vec<u8> {
  fn to_text(&self) -> Option<String> {
    self.as_slice().to_text()
  }
}

/// Extension trait for git2::DiffFile to tell whether a side has content
pub trait HasBlob {
  fn has_blob(&self) -> bool;
}

impl HasBlob for DiffFile<'_> {
  fn has_blob(&self) -> bool {
    self.exists() && !self.id().is_zero()
  }
}
