//! Compiled marker patterns.

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
  #[error("Invalid pattern {pattern:?}: {source}")]
  Invalid {
    pattern: String,
    #[source]
    source:  regex::Error
  }
}

/// A regex together with the literal text it was compiled from
#[derive(Debug, Clone)]
pub struct Pattern {
  source: String,
  regex:  Regex
}

impl Pattern {
  pub fn new(source: impl Into<String>) -> Result<Self, PatternError> {
    let source = source.into();
    let regex = Regex::new(&source).map_err(|err| PatternError::Invalid { pattern: source.clone(), source: err })?;
    Ok(Self { source, regex })
  }

  pub fn as_str(&self) -> &str {
    &self.source
  }

  /// Searches anywhere in the line, not a full-line match
  pub fn is_match(&self, line: &str) -> bool {
    self.regex.is_match(line)
  }
}

/// Ordered list of patterns. An empty list never matches.
#[derive(Debug, Clone, Default)]
pub struct Patterns {
  patterns: Vec<Pattern>
}

impl Patterns {
  /// Compiles every source in order. Repeated sources are kept and report separately.
  pub fn new<I, S>(sources: I) -> Result<Self, PatternError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>
  {
    let patterns = sources
      .into_iter()
      .map(Pattern::new)
      .collect::<Result<Vec<_>, _>>()?;

    log::debug!("Compiled {} patterns", patterns.len());
    Ok(Self { patterns })
  }

  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }

  pub fn len(&self) -> usize {
    self.patterns.len()
  }

  /// Patterns that match `line`, in list order
  pub fn matching<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a Pattern> + 'a {
    self.patterns.iter().filter(move |pattern| pattern.is_match(line))
  }
}
