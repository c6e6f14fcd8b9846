use std::fmt::{self, Display, Formatter};

use crate::span::Span;

/// A diagnostic reported to the user.
#[derive(Debug)]
pub struct CompileError {
    message: String,
    span: Span,
}
impl CompileError {
    pub fn new(message: String, span: Span) -> Self {
        Self { message, span }
    }
}
impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "at {}: {}", self.span, self.message)
    }
}
