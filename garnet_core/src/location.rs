//! Source positions of call sites.

use std::fmt;
use std::sync::Arc;

/// File and line a call site was compiled from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Arc<str>,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<Arc<str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location used for synthesized call sites.
    pub fn unknown() -> Self {
        Self::new("(unknown)", 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
