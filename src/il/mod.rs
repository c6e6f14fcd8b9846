//! Lowering of the checked syntax tree to three-address code.

mod emitter;
mod error;
mod lower_expr;
mod lower_stmt;
mod object_model;
mod runtime_checks;
mod tac;
mod temp_generator;
mod translator;

#[cfg(test)]
mod test_support;

pub use tac::*;
pub use translator::translate;
