use std::collections::HashMap;

use crate::{
    ast::{ClassDef, MethodDef, Program},
    prelude::*,
    span::Span,
    symbols::{ClassId, ClassSymbol, MethodId, MethodSymbol, SymbolTable, VarId, VariableSymbol},
};

use super::{emitter::Emitter, error::*, tac::*};

/// Lower a checked program to three-address code. Every method is lowered independently;
/// the errors of all methods that failed are returned together.
pub fn translate(program: &Program, symbols: &SymbolTable) -> Result<TacProgram, Vec<LowerError>> {
    Translator::new(symbols).translate_program(program)
}

pub(super) struct Translator<'s> {
    pub(super) symbols: &'s SymbolTable,
    pub(super) emitter: Emitter,
}

/// State scoped to the lowering of a single method body.
pub(super) struct MethodContext {
    /// The receiver of an instance method, `None` in static methods.
    this: Option<Temp>,
    /// Exit labels of the enclosing loops, innermost last.
    loop_exits: Vec<Label>,
    /// The temporaries bound to locals and parameters.
    bindings: HashMap<VarId, Temp>,
}
impl MethodContext {
    fn new(this: Option<Temp>) -> Self {
        Self {
            this,
            loop_exits: vec![],
            bindings: HashMap::new(),
        }
    }

    pub(super) fn bind(&mut self, var: VarId, temp: Temp) {
        self.bindings.insert(var, temp);
    }

    pub(super) fn bound_temp(&self, var: VarId) -> Option<Temp> {
        self.bindings.get(&var).copied()
    }

    pub(super) fn this(&self, span: Span) -> LowerResult<Temp> {
        match self.this {
            Some(this) => Ok(this),
            None => error(LowerErrorKind::MissingReceiver, span),
        }
    }

    pub(super) fn push_loop_exit(&mut self, exit: Label) {
        self.loop_exits.push(exit);
    }

    pub(super) fn pop_loop_exit(&mut self) {
        self.loop_exits.pop();
    }

    pub(super) fn loop_exit(&self, span: Span) -> LowerResult<Label> {
        match self.loop_exits.last() {
            Some(exit) => Ok(exit.clone()),
            None => error(LowerErrorKind::BreakOutsideLoop, span),
        }
    }
}

impl<'s> Translator<'s> {
    fn new(symbols: &'s SymbolTable) -> Self {
        Self {
            symbols,
            emitter: Emitter::new(),
        }
    }

    fn translate_program(mut self, program: &Program) -> Result<TacProgram, Vec<LowerError>> {
        let mut tac = TacProgram::new();
        let mut errors = vec![];

        for class in &program.classes {
            self.translate_class(class, &mut tac, &mut errors);
        }

        if errors.is_empty() {
            Ok(tac)
        } else {
            Err(errors)
        }
    }

    fn translate_class(
        &mut self,
        class: &ClassDef,
        tac: &mut TacProgram,
        errors: &mut Vec<LowerError>,
    ) {
        debug!("Lowering class {}", class.name);
        for method in &class.methods {
            match self.translate_method(method) {
                Ok(function) => tac.functions.push(function),
                Err(err) => {
                    debug!("Lowering {}.{} failed: {}", class.name, method.name, err);
                    errors.push(err);
                }
            }
        }
    }

    /// Lower a method body into a function. The receiver and parameters are bound to fresh
    /// temporaries before the body is lowered.
    fn translate_method(&mut self, method: &MethodDef) -> LowerResult<TacFunction> {
        let symbol = self.method_symbol(method.method, method.span)?;
        debug!("Lowering method {} as {}", method.name, symbol.label);

        let this = match symbol.this {
            Some(this_var) if !symbol.is_static => Some((this_var, self.emitter.new_temp())),
            _ => None,
        };
        let mut ctx = MethodContext::new(this.map(|(_, temp)| temp));
        let mut params = vec![];
        if let Some((this_var, temp)) = this {
            ctx.bind(this_var, temp);
            params.push(temp);
        }
        for param in &symbol.params {
            let temp = self.emitter.new_temp();
            ctx.bind(*param, temp);
            params.push(temp);
        }

        self.emitter.begin_func(&symbol.label, params);
        self.lower_block(&method.body, &mut ctx)?;
        Ok(self.emitter.end_func())
    }

    pub(super) fn class_symbol(&self, id: ClassId, span: Span) -> LowerResult<&'s ClassSymbol> {
        match self.symbols.class(id) {
            Some(class) => Ok(class),
            None => error(LowerErrorKind::UnknownClass(id), span),
        }
    }

    pub(super) fn method_symbol(&self, id: MethodId, span: Span) -> LowerResult<&'s MethodSymbol> {
        match self.symbols.method(id) {
            Some(method) => Ok(method),
            None => error(LowerErrorKind::UnknownMethod(id), span),
        }
    }

    pub(super) fn variable_symbol(
        &self,
        id: VarId,
        span: Span,
    ) -> LowerResult<&'s VariableSymbol> {
        match self.symbols.variable(id) {
            Some(variable) => Ok(variable),
            None => error(LowerErrorKind::UnknownVariable(id), span),
        }
    }

    /// Bind a fresh temporary to a local variable.
    pub(super) fn bind_local(&mut self, var: VarId, ctx: &mut MethodContext) -> Temp {
        let temp = self.emitter.new_temp();
        ctx.bind(var, temp);
        temp
    }

    /// The temporary previously bound to a local or parameter.
    pub(super) fn temp_of(&self, var: VarId, ctx: &MethodContext, span: Span) -> LowerResult<Temp> {
        match ctx.bound_temp(var) {
            Some(temp) => Ok(temp),
            None => {
                let name = self.variable_symbol(var, span)?.name.clone();
                error(LowerErrorKind::UnboundVariable(name), span)
            }
        }
    }

    /// Unwrap the result of a call whose value is required.
    pub(super) fn value_of(&self, result: Option<Temp>, span: Span) -> LowerResult<Temp> {
        match result {
            Some(temp) => Ok(temp),
            None => error(LowerErrorKind::VoidValue, span),
        }
    }
}
