//! Line diffing for change classification.
//!
//! This module diffs two versions of a file with libgit2 and renders
//! the result as a zero-context unified diff.

pub mod traits;
pub mod unified;

pub use traits::{DiffDeltaPath, HasBlob, Utf8Text};
pub use unified::{hunks, unified_diff, HeaderError, Hunk, HunkHeader};
