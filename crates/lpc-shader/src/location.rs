//! Source location tracking for AST nodes and diagnostics.
//!
//! Locations are supplied by the front end from the token that starts a
//! node. Nodes synthesized by the compiler itself carry no location, so
//! every node stores an `Option<SourceLocation>` rather than a sentinel.

use core::fmt;

/// A position in the shader description.
///
/// `line` is one-based (as reported by the front end), `column` is the
/// zero-based character offset within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    /// Line number, starting at 1
    pub line: u32,
    /// Zero-based column
    pub column: u32,
}

impl SourceLocation {
    /// Create a new source location.
    pub const fn new(line: u32, column: u32) -> Self {
        SourceLocation { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
