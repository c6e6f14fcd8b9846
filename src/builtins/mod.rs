//! Runtime support routines that generated code calls into.
use std::fmt::{self, Display, Formatter};

use crate::ast::TypeSpec;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Intrinsic {
    /// Allocates a zeroed block of the given number of bytes.
    Allocate,
    ReadLine,
    ReadInt,
    /// Compares two strings by content.
    StringEqual,
    PrintInt,
    PrintString,
    PrintBool,
    /// Terminates the program immediately.
    Halt,
}
impl Intrinsic {
    pub fn label(self) -> &'static str {
        match self {
            Intrinsic::Allocate => "_Alloc",
            Intrinsic::ReadLine => "_ReadLine",
            Intrinsic::ReadInt => "_ReadInteger",
            Intrinsic::StringEqual => "_StringEqual",
            Intrinsic::PrintInt => "_PrintInt",
            Intrinsic::PrintString => "_PrintString",
            Intrinsic::PrintBool => "_PrintBool",
            Intrinsic::Halt => "_Halt",
        }
    }

    /// The number of `param` instructions that must precede a call.
    pub fn param_count(self) -> usize {
        match self {
            Intrinsic::Allocate => 1,
            Intrinsic::ReadLine | Intrinsic::ReadInt | Intrinsic::Halt => 0,
            Intrinsic::StringEqual => 2,
            Intrinsic::PrintInt | Intrinsic::PrintString | Intrinsic::PrintBool => 1,
        }
    }

    pub fn return_type(self) -> TypeSpec {
        match self {
            Intrinsic::Allocate | Intrinsic::ReadInt => TypeSpec::Int,
            Intrinsic::ReadLine => TypeSpec::String,
            Intrinsic::StringEqual => TypeSpec::Bool,
            Intrinsic::PrintInt
            | Intrinsic::PrintString
            | Intrinsic::PrintBool
            | Intrinsic::Halt => TypeSpec::Void,
        }
    }

    /// Selects the print routine for a value of the given type.
    pub fn print_for(ty: &TypeSpec) -> Option<Intrinsic> {
        match ty {
            TypeSpec::Int => Some(Intrinsic::PrintInt),
            TypeSpec::Bool => Some(Intrinsic::PrintBool),
            TypeSpec::String => Some(Intrinsic::PrintString),
            _ => None,
        }
    }
}
impl Display for Intrinsic {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}
