//! The simplified `# xxx` check.
//!
//! This works on the raw cached diff text with a case-insensitive substring
//! test per line. It does not track line numbers and it also flags removed
//! lines and file headers that contain the marker. `check-for-markers` is the
//! precise variant.

use crate::diff::Utf8Text;

pub const XXX_MARKER: &[u8] = b"# xxx";

pub const XXX_MESSAGE: &str = "This commit would introduce an XXX marker!";

fn contains_marker(line: &[u8]) -> bool {
  line
    .to_ascii_lowercase()
    .windows(XXX_MARKER.len())
    .any(|window| window == XXX_MARKER)
}

/// Every line of `diff` containing the marker, lowercased comparison, original text kept.
pub fn find_markers(diff: &[u8]) -> Vec<String> {
  diff
    .split(|byte| *byte == b'\n')
    .filter(|line| contains_marker(line))
    .map(|line| line.to_text().unwrap_or_else(|| String::from_utf8_lossy(line).into_owned()))
    .collect()
}
