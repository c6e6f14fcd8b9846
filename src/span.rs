//! Contains the [`Span`] type, which describes a source code range.
use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

/// A byte range in the original source file. Spans are assigned by the parser and only
/// carried through this stage so that diagnostics can point at the offending node.
#[derive(Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Span {
    start: usize,
    end: usize,
}
#[cfg(test)]
impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn zero() -> Self {
        Self::new(0, 0)
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
