use thiserror::Error;

use crate::{
    ast::{LValueKind, TypeSpec},
    error::CompileError,
    span::Span,
    symbols::{ClassId, MethodId, VarId},
};

pub type LowerResult<T> = Result<T, LowerError>;

/// Construct a new error result.
pub fn error<S>(kind: LowerErrorKind, span: Span) -> LowerResult<S> {
    Err(LowerError::new(kind, span))
}

/// An error raised while lowering a method. These never describe a problem in the user's
/// program: the tree is checked before it gets here, so each one points at a defect in an
/// earlier stage.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct LowerError {
    kind: LowerErrorKind,
    span: Span,
}
impl LowerError {
    pub fn new(kind: LowerErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    #[cfg(test)]
    pub fn kind(&self) -> &LowerErrorKind {
        &self.kind
    }
}
impl From<LowerError> for CompileError {
    fn from(lower_error: LowerError) -> Self {
        Self::new(lower_error.to_string(), lower_error.span)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LowerErrorKind {
    #[error("unknown class symbol {0}")]
    UnknownClass(ClassId),
    #[error("unknown method symbol {0}")]
    UnknownMethod(MethodId),
    #[error("unknown variable symbol {0}")]
    UnknownVariable(VarId),
    #[error("variable '{0}' is used before its declaration was lowered")]
    UnboundVariable(String),
    #[error("'this' is not available in a static method")]
    MissingReceiver,
    #[error("'break' outside of a loop")]
    BreakOutsideLoop,
    #[error("the result of a call returning 'void' is used as a value")]
    VoidValue,
    #[error("expected an object of class type, found '{0}'")]
    ExpectedClass(TypeSpec),
    #[error("cannot print a value of type '{0}'")]
    Unprintable(TypeSpec),
    #[error("expression cannot be assigned to as {0:?}")]
    InvalidLValue(LValueKind),
}
