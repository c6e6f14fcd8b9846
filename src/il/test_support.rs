//! Builders for lowering tests. A [`Fixture`] owns a symbol table with a `Main` class and a
//! static `main` method; test bodies are lowered as the body of `main` unless stated otherwise.
use crate::{ast::*, span::Span, symbols::*};

use super::{
    error::{LowerError, LowerErrorKind},
    translate, TacFunction, TacProgram, TargetSize,
};

pub struct Fixture {
    pub symbols: SymbolTable,
    pub main_class: ClassId,
    pub main: MethodId,
}
impl Fixture {
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        let main_class = symbols.add_class(ClassSymbol {
            name: "Main".to_string(),
            parent: None,
            size: 4,
            vtable: "_Main".to_string(),
            allocator: "_Main_New".to_string(),
        });
        let main = symbols.add_method(MethodSymbol {
            name: "main".to_string(),
            class: main_class,
            label: "main".to_string(),
            offset: 0,
            return_type: TypeSpec::Void,
            is_static: true,
            this: None,
            params: vec![],
        });
        Self {
            symbols,
            main_class,
            main,
        }
    }

    pub fn int_locals<const N: usize>(&mut self, names: [&str; N]) -> [VarId; N] {
        self.locals(names.map(|name| (name, TypeSpec::Int)))
    }

    pub fn locals<const N: usize>(&mut self, vars: [(&str, TypeSpec); N]) -> [VarId; N] {
        vars.map(|(name, ty)| self.variable(name, VarKind::Local, ty, 0))
    }

    pub fn param(&mut self, name: &str, ty: TypeSpec) -> VarId {
        self.variable(name, VarKind::Param, ty, 0)
    }

    pub fn field(&mut self, name: &str, ty: TypeSpec, offset: TargetSize) -> VarId {
        self.variable(name, VarKind::Field, ty, offset)
    }

    fn variable(&mut self, name: &str, kind: VarKind, ty: TypeSpec, offset: TargetSize) -> VarId {
        self.symbols.add_variable(VariableSymbol {
            name: name.to_string(),
            kind,
            ty,
            offset,
        })
    }

    pub fn class(&mut self, name: &str, parent: Option<ClassId>, size: TargetSize) -> ClassId {
        self.symbols.add_class(ClassSymbol {
            name: name.to_string(),
            parent,
            size,
            vtable: format!("_{}", name),
            allocator: format!("_{}_New", name),
        })
    }

    pub fn static_method(&mut self, name: &str, label: &str, ret: TypeSpec) -> MethodId {
        self.static_method_with_params(name, label, ret, vec![])
    }

    pub fn static_method_with_params(
        &mut self,
        name: &str,
        label: &str,
        ret: TypeSpec,
        params: Vec<VarId>,
    ) -> MethodId {
        self.symbols.add_method(MethodSymbol {
            name: name.to_string(),
            class: self.main_class,
            label: label.to_string(),
            offset: 0,
            return_type: ret,
            is_static: true,
            this: None,
            params,
        })
    }

    /// Add a virtual method to `class`, labelled `_Class.name`.
    pub fn instance_method(
        &mut self,
        class: ClassId,
        name: &str,
        offset: TargetSize,
        ret: TypeSpec,
    ) -> MethodId {
        let class_name = match self.symbols.class(class) {
            Some(symbol) => symbol.name.clone(),
            None => panic!("unknown class {}", class),
        };
        let this = self.variable("this", VarKind::Param, TypeSpec::Class(class), 0);
        self.symbols.add_method(MethodSymbol {
            name: name.to_string(),
            class,
            label: format!("_{}.{}", class_name, name),
            offset,
            return_type: ret,
            is_static: false,
            this: Some(this),
            params: vec![],
        })
    }

    /// A reference to a local, parameter or (implicit `this`) member variable.
    pub fn var(&self, id: VarId) -> Expr {
        match self.symbols.variable(id) {
            Some(symbol) if symbol.kind == VarKind::Field => self.member(None, id),
            Some(symbol) => {
                let lvalue = match symbol.kind {
                    VarKind::Param => LValueKind::ParamVar,
                    _ => LValueKind::LocalVar,
                };
                expr(
                    ExprKind::Ident {
                        owner: None,
                        symbol: id,
                    },
                    symbol.ty.clone(),
                )
                .with_lvalue(lvalue)
            }
            None => panic!("unknown variable {}", id),
        }
    }

    pub fn member(&self, owner: Option<Expr>, field: VarId) -> Expr {
        let ty = match self.symbols.variable(field) {
            Some(symbol) => symbol.ty.clone(),
            None => panic!("unknown field {}", field),
        };
        expr(
            ExprKind::Ident {
                owner: owner.map(Box::new),
                symbol: field,
            },
            ty,
        )
        .with_lvalue(LValueKind::MemberVar)
    }

    /// Lower a program made of the given method bodies, each placed in its own class.
    pub fn lower_program(
        &self,
        methods: Vec<(MethodId, Vec<Stmt>)>,
    ) -> Result<TacProgram, Vec<LowerError>> {
        let classes = methods
            .into_iter()
            .map(|(method, body)| {
                let symbol = self.symbols.method(method).expect("unknown method");
                ClassDef {
                    name: format!("{}", symbol.class),
                    class: symbol.class,
                    methods: vec![MethodDef {
                        name: symbol.name.clone(),
                        method,
                        body: Block { statements: body },
                        span: Span::zero(),
                    }],
                    span: Span::zero(),
                }
            })
            .collect();
        translate(&Program { classes }, &self.symbols)
    }

    pub fn lower(&self, body: Vec<Stmt>) -> TacFunction {
        let mut program = self
            .lower_program(vec![(self.main, body)])
            .expect("lowering failed");
        program.functions.remove(0)
    }

    pub fn lower_errors(&self, body: Vec<Stmt>) -> Vec<LowerErrorKind> {
        match self.lower_program(vec![(self.main, body)]) {
            Ok(_) => panic!("lowering succeeded"),
            Err(errors) => errors.into_iter().map(|e| e.kind().clone()).collect(),
        }
    }
}

impl Expr {
    pub fn with_lvalue(mut self, lvalue: LValueKind) -> Self {
        self.lvalue = lvalue;
        self
    }
}

pub fn expr(kind: ExprKind, ty: TypeSpec) -> Expr {
    Expr {
        kind,
        ty,
        lvalue: LValueKind::NotLValue,
        span: Span::zero(),
    }
}

pub fn int(value: i32) -> Expr {
    expr(ExprKind::Literal(Literal::Int(value)), TypeSpec::Int)
}

pub fn boolean(value: bool) -> Expr {
    expr(ExprKind::Literal(Literal::Bool(value)), TypeSpec::Bool)
}

pub fn string(value: &str) -> Expr {
    expr(
        ExprKind::Literal(Literal::String(value.to_string())),
        TypeSpec::String,
    )
}

pub fn binary(op: BinOp, lhs: Expr, rhs: Expr, ty: TypeSpec) -> Expr {
    expr(
        ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        ty,
    )
}

pub fn unary(op: UnOp, operand: Expr, ty: TypeSpec) -> Expr {
    expr(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        ty,
    )
}

/// An element of an `int[]`.
pub fn indexed(array: Expr, index: Expr) -> Expr {
    expr(
        ExprKind::Indexed {
            array: Box::new(array),
            index: Box::new(index),
        },
        TypeSpec::Int,
    )
    .with_lvalue(LValueKind::ArrayElement)
}

pub fn call_expr(receiver: Option<Expr>, method: MethodId, args: Vec<Expr>, ty: TypeSpec) -> Expr {
    expr(
        ExprKind::Call(CallExpr {
            receiver: receiver.map(Box::new),
            method,
            args,
        }),
        ty,
    )
}

pub fn int_array() -> TypeSpec {
    TypeSpec::Array(Box::new(TypeSpec::Int))
}

pub fn stmt(kind: StmtKind) -> Stmt {
    Stmt {
        kind,
        span: Span::zero(),
    }
}

pub fn var_def(var: VarId) -> Stmt {
    stmt(StmtKind::VarDef(var))
}

pub fn assign(target: Expr, value: Expr) -> Stmt {
    stmt(StmtKind::Assign { target, value })
}

pub fn exec(expr: Expr) -> Stmt {
    stmt(StmtKind::Exec(expr))
}

pub fn print(args: Vec<Expr>) -> Stmt {
    stmt(StmtKind::Print(args))
}

pub fn block(statements: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Block(Block { statements }))
}

macro_rules! assert_generates {
    ($fx:expr, $body:expr, $il:expr) => {{
        let lines = $fx.lower($body).lines();
        assert_eq!(&$il[..], &lines[..]);
    }};
}
pub(crate) use assert_generates;
