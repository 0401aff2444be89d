//! Whole-string patterns

use crate::errors::{MappingError, Result};
use regex::Regex;
use std::fmt;

/// A compiled pattern that must match the entire input
///
/// The source text uses `regex` crate syntax. It is wrapped as
/// `^(?:source)$` so `com\.foo\..*Test` accepts `com.foo.BarTest` but rejects
/// `com.foo.BarTestHelper`. Backreferences and lookaround are not supported
/// by the dialect and fail to compile.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let invalid = |e| MappingError::InvalidPattern {
            pattern: source.clone(),
            source: e,
        };
        // Must compile on its own, or a stray `)` would close the anchor group
        Regex::new(&source).map_err(invalid)?;
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(invalid)?;
        Ok(Self { source, regex })
    }

    /// Pattern text as written in the rule file
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the whole of `text` matches
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
