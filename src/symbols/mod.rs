//! Read-only view of the symbol table built by semantic analysis.
//!
//! Offsets and sizes are final by the time a program reaches this stage: fields carry their
//! byte offset from the object base, methods their byte offset into the class's virtual table,
//! and classes their instance size including the virtual table pointer.
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{ast::TypeSpec, il::TargetSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarId(pub usize);

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
impl Display for MethodId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
impl Display for VarId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub name: String,
    pub parent: Option<ClassId>,
    /// Instance size in bytes, including the virtual table pointer at offset 0.
    pub size: TargetSize,
    /// Label of the class's virtual table.
    pub vtable: String,
    /// Label of the routine that allocates and initialises a new instance.
    pub allocator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub name: String,
    pub class: ClassId,
    /// Label of the compiled function body.
    pub label: String,
    /// Byte offset of this method's entry in the virtual table.
    pub offset: TargetSize,
    pub return_type: TypeSpec,
    pub is_static: bool,
    /// The implicit receiver parameter. Always present for instance methods.
    pub this: Option<VarId>,
    pub params: Vec<VarId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Local,
    Param,
    Field,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableSymbol {
    pub name: String,
    pub kind: VarKind,
    pub ty: TypeSpec,
    /// Byte offset from the object base. Only meaningful for fields.
    #[serde(default)]
    pub offset: TargetSize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    #[serde(default)]
    classes: Vec<ClassSymbol>,
    #[serde(default)]
    methods: Vec<MethodSymbol>,
    #[serde(default)]
    variables: Vec<VariableSymbol>,
}
#[cfg(test)]
impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: ClassSymbol) -> ClassId {
        self.classes.push(class);
        ClassId(self.classes.len() - 1)
    }

    pub fn add_method(&mut self, method: MethodSymbol) -> MethodId {
        self.methods.push(method);
        MethodId(self.methods.len() - 1)
    }

    pub fn add_variable(&mut self, variable: VariableSymbol) -> VarId {
        self.variables.push(variable);
        VarId(self.variables.len() - 1)
    }
}

impl SymbolTable {
    pub fn class(&self, id: ClassId) -> Option<&ClassSymbol> {
        self.classes.get(id.0)
    }

    pub fn method(&self, id: MethodId) -> Option<&MethodSymbol> {
        self.methods.get(id.0)
    }

    pub fn variable(&self, id: VarId) -> Option<&VariableSymbol> {
        self.variables.get(id.0)
    }

    /// Determines whether `class` is `ancestor` or derives from it.
    pub fn is_subclass(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(class);
        // A well-formed hierarchy is acyclic, so no chain is longer than the class count.
        for _ in 0..=self.classes.len() {
            match current {
                Some(c) if c == ancestor => return true,
                Some(c) => current = self.class(c).and_then(|sym| sym.parent),
                None => return false,
            }
        }
        false
    }

    /// Determines whether a value of type `from` may be used where `to` is expected without a
    /// runtime check.
    pub fn compatible(&self, from: &TypeSpec, to: &TypeSpec) -> bool {
        match (from, to) {
            (TypeSpec::Null, TypeSpec::Class(_)) => true,
            (TypeSpec::Class(sub), TypeSpec::Class(sup)) => self.is_subclass(*sub, *sup),
            (a, b) => a == b,
        }
    }
}
