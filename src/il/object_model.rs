//! Lowering of operations that depend on the runtime layout of objects and arrays.
//!
//! Objects hold their virtual table pointer at offset 0, followed by one word per field.
//! Arrays are addressed by their first element; the length lives in the word before it.

use crate::{
    ast::{Expr, TypeSpec},
    builtins::Intrinsic,
    span::Span,
    symbols::ClassId,
};

use super::{
    error::*,
    tac::*,
    translator::{MethodContext, Translator},
};

/// Offset of the hidden length word relative to an array's base address.
const ARRAY_LENGTH_OFFSET: TargetSize = -WORD_SIZE;

impl Translator<'_> {
    /// Compute `array + index * WORD_SIZE`.
    pub(super) fn element_address(&mut self, array: Temp, index: Temp) -> Temp {
        let word = self.emitter.gen_load_imm(WORD_SIZE);
        let offset = self.emitter.gen_mul(index, word);
        self.emitter.gen_add(array, offset)
    }

    pub(super) fn load_array_length(&mut self, array: Temp) -> Temp {
        self.emitter.gen_load(array, ARRAY_LENGTH_OFFSET)
    }

    /// Load the address of the method at `offset` in the receiver's virtual table.
    pub(super) fn lookup_virtual(&mut self, receiver: Temp, offset: TargetSize) -> Temp {
        let vtable = self.emitter.gen_load(receiver, 0);
        self.emitter.gen_load(vtable, offset)
    }

    pub(super) fn lower_array_length(
        &mut self,
        array: &Expr,
        ctx: &mut MethodContext,
    ) -> LowerResult<Temp> {
        let array = self.lower_expr(array, ctx)?;
        Ok(self.load_array_length(array))
    }

    pub(super) fn lower_new_class(&mut self, class: ClassId, span: Span) -> LowerResult<Temp> {
        let symbol = self.class_symbol(class, span)?;
        let object = self
            .emitter
            .gen_direct_call(&symbol.allocator, &TypeSpec::Class(class));
        self.value_of(object, span)
    }

    pub(super) fn lower_instance_of(
        &mut self,
        object: &Expr,
        class: ClassId,
        ctx: &mut MethodContext,
        span: Span,
    ) -> LowerResult<Temp> {
        let object = self.lower_expr(object, ctx)?;
        let symbol = self.class_symbol(class, span)?;
        Ok(self.emitter.gen_instanceof(object, &symbol.vtable))
    }

    /// Lower a cast. Upcasts need no code; anything else is checked at runtime. Either way the
    /// result is the operand's own temporary.
    pub(super) fn lower_cast(
        &mut self,
        object: &Expr,
        class: ClassId,
        ctx: &mut MethodContext,
        span: Span,
    ) -> LowerResult<Temp> {
        let value = self.lower_expr(object, ctx)?;
        let symbol = self.class_symbol(class, span)?;
        if !self.symbols.compatible(&object.ty, &TypeSpec::Class(class)) {
            self.emitter.gen_class_cast(value, &symbol.vtable);
        }
        Ok(value)
    }

    pub(super) fn lower_shallow_copy(
        &mut self,
        source: &Expr,
        ctx: &mut MethodContext,
    ) -> LowerResult<Temp> {
        let class = match source.ty.as_class() {
            Some(class) => class,
            None => return error(LowerErrorKind::ExpectedClass(source.ty.clone()), source.span),
        };
        let object = self.lower_expr(source, ctx)?;
        self.copy_object(object, class, source.span)
    }

    /// Allocate a new instance of `class` and copy every field word of `object` into it. The
    /// virtual table pointer is written from the class rather than copied.
    fn copy_object(&mut self, object: Temp, class: ClassId, span: Span) -> LowerResult<Temp> {
        let symbol = self.class_symbol(class, span)?;

        let size = self.emitter.gen_load_imm(symbol.size);
        self.emitter.gen_param(size);
        let copy = self.emitter.gen_intrinsic_call(Intrinsic::Allocate);
        let copy = self.value_of(copy, span)?;

        for offset in (WORD_SIZE..symbol.size).step_by(WORD_SIZE as usize) {
            let field = self.emitter.gen_load(object, offset);
            self.emitter.gen_store(field, copy, offset);
        }

        let vtable = self.emitter.gen_load_vtbl(&symbol.vtable);
        self.emitter.gen_store(vtable, copy, 0);
        Ok(copy)
    }

    /// Lower `value %% count`: allocate an array of `count` elements and initialise every one
    /// of them with `value`. Objects are shallow-copied per element, so no two elements alias.
    pub(super) fn lower_new_same_array(
        &mut self,
        value: &Expr,
        count: &Expr,
        ctx: &mut MethodContext,
    ) -> LowerResult<Temp> {
        let element_class = value.ty.as_class();
        let element = self.lower_expr(value, ctx)?;
        let count = self.lower_expr(count, ctx)?;
        let array = self.emitter.gen_new_array(count);

        let fill = self.emitter.new_label("fill");
        let filled = self.emitter.new_label("fill_end");

        let word = self.emitter.gen_load_imm(WORD_SIZE);
        let one = self.emitter.gen_load_imm(1);
        let index = self.emitter.gen_load_imm(0);
        let cursor = self.emitter.new_temp();
        self.emitter.gen_assign(cursor, array);

        self.emitter.gen_mark(fill.clone());
        let more = self.emitter.gen_les(index, count);
        self.emitter.gen_beqz(more, filled.clone());
        let stored = match element_class {
            Some(class) => self.copy_object(element, class, value.span)?,
            None => element,
        };
        self.emitter.gen_store(stored, cursor, 0);
        let next_cursor = self.emitter.gen_add(cursor, word);
        self.emitter.gen_assign(cursor, next_cursor);
        let next_index = self.emitter.gen_add(index, one);
        self.emitter.gen_assign(index, next_index);
        self.emitter.gen_branch(fill);
        self.emitter.gen_mark(filled);

        Ok(array)
    }

    /// Lower `array[index] default fallback`. Out-of-range indices select the fallback instead
    /// of halting; both paths write the same result temporary.
    pub(super) fn lower_default_index(
        &mut self,
        array: &Expr,
        index: &Expr,
        default: &Expr,
        ctx: &mut MethodContext,
    ) -> LowerResult<Temp> {
        let array = self.lower_expr(array, ctx)?;
        let index = self.lower_expr(index, ctx)?;
        let default = self.lower_expr(default, ctx)?;

        let length = self.load_array_length(array);
        let result = self.emitter.new_temp();
        let use_default = self.emitter.new_label("use_default");
        let in_bounds = self.emitter.new_label("in_bounds");
        let end = self.emitter.new_label("default_end");

        let below_length = self.emitter.gen_les(index, length);
        self.emitter.gen_beqz(below_length, use_default.clone());
        let zero = self.emitter.gen_load_imm(0);
        let negative = self.emitter.gen_les(index, zero);
        self.emitter.gen_beqz(negative, in_bounds.clone());

        self.emitter.gen_mark(use_default);
        self.emitter.gen_assign(result, default);
        self.emitter.gen_branch(end.clone());

        self.emitter.gen_mark(in_bounds);
        let address = self.element_address(array, index);
        let element = self.emitter.gen_load(address, 0);
        self.emitter.gen_assign(result, element);
        self.emitter.gen_mark(end);

        Ok(result)
    }
}
