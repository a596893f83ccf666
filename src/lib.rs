pub mod config;
pub mod diff;
pub mod git;
pub mod hook;
pub mod patterns;
pub mod scanner;
pub mod source;
pub mod xxx;

// Re-exports
pub use scanner::{collect_errors, Detection};
pub use source::{Against, ChangeSource, FileChange, EMPTY_TREE};
