//! Typed Abstract Syntax Tree definitions.
//!
//! The tree arrives fully checked: every expression carries its static type and lvalue kind,
//! and every identifier, call, class reference and declaration points into the
//! [`SymbolTable`](crate::symbols::SymbolTable).
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{
    span::Span,
    symbols::{ClassId, MethodId, VarId},
};

mod type_spec;

pub use type_spec::*;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Program {
    pub classes: Vec<ClassDef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub class: ClassId,
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub method: MethodId,
    pub body: Block,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum StmtKind {
    /// Declaration of a local variable. Initialisers are expressed as a following assignment.
    VarDef(VarId),
    Block(Block),
    /// An expression evaluated for its side effects.
    Exec(Expr),
    Assign {
        target: Expr,
        value: Expr,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Expr,
        update: Option<Box<Stmt>>,
        body: Box<Stmt>,
    },
    /// `foreach (x in array while guard) body`
    Foreach {
        binding: VarId,
        array: Expr,
        guard: Option<Expr>,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Print(Vec<Expr>),
    /// `if { g1 : s1 ||| g2 : s2 ||| ... ||| gn : sn }`
    Guarded {
        alternatives: Vec<GuardedBranch>,
        last: GuardedBranch,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GuardedBranch {
    pub guard: Expr,
    pub body: Box<Stmt>,
}

/// Classification of an expression that may appear on the left of an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LValueKind {
    #[default]
    NotLValue,
    LocalVar,
    ParamVar,
    MemberVar,
    ArrayElement,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeSpec,
    #[serde(default)]
    pub lvalue: LValueKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Null,
    This,
    ReadInteger,
    ReadLine,
    /// A variable reference. `owner` is the receiver of a member variable; when it is absent
    /// for a member variable, the implicit `this` is used.
    Ident {
        owner: Option<Box<Expr>>,
        symbol: VarId,
    },
    Indexed {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Call(CallExpr),
    /// `array.length()`
    ArrayLength(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    NewClass(ClassId),
    NewArray {
        element: TypeSpec,
        length: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        class: ClassId,
    },
    Cast {
        expr: Box<Expr>,
        class: ClassId,
    },
    /// Shallow copy of an object.
    ShallowCopy(Box<Expr>),
    /// `value %% count`: a new array of `count` elements, each initialised from `value`.
    NewSameArray {
        value: Box<Expr>,
        count: Box<Expr>,
    },
    /// `array[index] default fallback`
    DefaultIndex {
        array: Box<Expr>,
        index: Box<Expr>,
        default: Box<Expr>,
    },
    /// `var x`, a type-inferred local declared at its first assignment.
    VarBinding(VarId),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CallExpr {
    /// The object a virtual method is dispatched on. Absent for static calls.
    pub receiver: Option<Box<Expr>>,
    pub method: MethodId,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    Int(i32),
    Bool(bool),
    String(String),
}
impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Equal,
    NotEqual,
    And,
    Or,
}
impl Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use BinOp::*;
        let op = match self {
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            LessThan => "<",
            LessThanEqual => "<=",
            GreaterThan => ">",
            GreaterThanEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            And => "&&",
            Or => "||",
        };
        f.write_str(op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Negate,
    Not,
}
impl Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnOp::Negate => f.write_str("-"),
            UnOp::Not => f.write_str("!"),
        }
    }
}
