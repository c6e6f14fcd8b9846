//! Three-Address Code

use std::fmt::{self, Display, Formatter};

use crate::{
    ast::{BinOp, UnOp},
    listing::Listing,
};

pub type TargetSize = i32;

/// The size of a machine word on the target. Every scalar, reference and array element
/// occupies one word.
pub const WORD_SIZE: TargetSize = 4;

pub type TacListing = Listing<TacInstr>;

/// A lowered program: one function per method body.
#[derive(Debug, Default)]
pub struct TacProgram {
    pub functions: Vec<TacFunction>,
}
impl TacProgram {
    pub fn new() -> Self {
        Self::default()
    }
}
impl Display for TacProgram {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for function in &self.functions {
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TacFunction {
    pub label: String,
    /// Temporaries bound to the incoming parameters, receiver first.
    pub params: Vec<Temp>,
    pub body: TacListing,
}
impl TacFunction {
    pub fn new(label: String, params: Vec<Temp>) -> Self {
        Self {
            label,
            params,
            body: TacListing::new(),
        }
    }

    #[cfg(test)]
    pub fn lines(&self) -> Vec<String> {
        self.body
            .iter_instructions()
            .map(ToString::to_string)
            .collect()
    }
}
impl Display for TacFunction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "function {}({})", self.label, params)?;
        for instr in self.body.iter_instructions() {
            if let TacInstr::Label(_) = instr {
                writeln!(f, "    {}", instr)?;
            } else {
                writeln!(f, "        {}", instr)?;
            }
        }
        Ok(())
    }
}

/// A virtual register. Temporaries are never reused; the backend decides where they live.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Temp(usize);
impl Temp {
    pub fn new(index: usize) -> Self {
        Self(index)
    }
}
impl Display for Temp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    name: String,
    subscript: usize,
}
impl Label {
    pub fn new(name: String, subscript: usize) -> Self {
        Self { name, subscript }
    }
}
impl Display for Label {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}_{}", self.name, self.subscript)
    }
}

/// A single TAC instruction. Where an instruction produces a value, the destination comes first.
#[derive(Debug, Clone)]
pub enum TacInstr {
    /// Copy one temporary into another.
    Assign(Temp, Temp),
    /// Perform a binary operation.
    Bin(Temp, BinOp, Temp, Temp),
    /// Perform a unary operation.
    Un(Temp, UnOp, Temp),
    /// Load an immediate value.
    LoadImm(Temp, TargetSize),
    /// Load the address of a string constant.
    LoadStr(Temp, String),
    /// Load the address of a class's virtual table.
    LoadVtbl(Temp, String),
    /// Load the word at `base + offset`.
    Load(Temp, Temp, TargetSize),
    /// Store a value to the word at `base + offset`.
    Store(Temp, Temp, TargetSize),
    /// Push a parameter for the next call.
    Param(Temp),
    /// Call a function by label.
    DirectCall(Option<Temp>, String),
    /// Call the function whose address is held in a temporary.
    IndirectCall(Option<Temp>, Temp),
    /// Jump to a label.
    Goto(Label),
    /// Jump if a value is zero.
    IfFalse(Temp, Label),
    /// A label which can be jumped to.
    Label(Label),
    /// Return from the current function.
    Return(Option<Temp>),
    /// Allocate an array with the given number of elements. The length is stored in the word
    /// preceding the returned base address.
    NewArray(Temp, Temp),
    /// Test whether an object is an instance of the class with the given virtual table.
    InstanceOf(Temp, Temp, String),
    /// Halt with a diagnostic unless the object is an instance of the class with the given
    /// virtual table.
    ClassCast(Temp, String),
    /// Halt with a diagnostic unless `0 <= index < length(array)`.
    CheckArrayIndex(Temp, Temp),
}
impl Display for TacInstr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fn address(f: &mut Formatter, base: &Temp, offset: TargetSize) -> fmt::Result {
            if offset < 0 {
                write!(f, "*({} - {})", base, -offset)
            } else {
                write!(f, "*({} + {})", base, offset)
            }
        }

        match self {
            Self::Assign(target, src) => write!(f, "{} = {}", target, src),
            Self::Bin(target, op, lhs, rhs) => write!(f, "{} = {} {} {}", target, lhs, op, rhs),
            Self::Un(target, op, src) => write!(f, "{} = {} {}", target, op, src),
            Self::LoadImm(target, value) => write!(f, "{} = {}", target, value),
            Self::LoadStr(target, value) => write!(f, "{} = {:?}", target, value),
            Self::LoadVtbl(target, vtable) => write!(f, "{} = VTBL <{}>", target, vtable),
            Self::Load(target, base, offset) => {
                write!(f, "{} = ", target)?;
                address(f, base, *offset)
            }
            Self::Store(src, base, offset) => {
                address(f, base, *offset)?;
                write!(f, " = {}", src)
            }
            Self::Param(p) => write!(f, "param {}", p),
            Self::DirectCall(Some(target), func) => write!(f, "{} = call {}", target, func),
            Self::DirectCall(None, func) => write!(f, "call {}", func),
            Self::IndirectCall(Some(target), func) => write!(f, "{} = call {}", target, func),
            Self::IndirectCall(None, func) => write!(f, "call {}", func),
            Self::Goto(label) => write!(f, "goto {}", label),
            Self::IfFalse(value, lbl) => write!(f, "if_false {} goto {}", value, lbl),
            Self::Label(lbl) => write!(f, "{}:", lbl),
            Self::Return(None) => f.write_str("return"),
            Self::Return(Some(value)) => write!(f, "return {}", value),
            Self::NewArray(target, length) => write!(f, "{} = new_array {}", target, length),
            Self::InstanceOf(target, object, vtable) => {
                write!(f, "{} = instanceof {}, {}", target, object, vtable)
            }
            Self::ClassCast(object, vtable) => write!(f, "class_cast {}, {}", object, vtable),
            Self::CheckArrayIndex(array, index) => write!(f, "check_index {}, {}", array, index),
        }
    }
}
