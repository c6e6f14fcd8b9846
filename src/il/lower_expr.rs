use crate::{ast::*, builtins::Intrinsic, span::Span, symbols::VarId};

use super::{
    error::*,
    tac::*,
    translator::{MethodContext, Translator},
};

impl Translator<'_> {
    /// Lower an expression. Returns the temporary holding its value.
    pub(super) fn lower_expr(&mut self, expr: &Expr, ctx: &mut MethodContext) -> LowerResult<Temp> {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(self.lower_literal(lit)),
            ExprKind::Null => Ok(self.emitter.gen_load_imm(0)),
            ExprKind::This => ctx.this(span),
            ExprKind::ReadInteger => {
                let value = self.emitter.gen_intrinsic_call(Intrinsic::ReadInt);
                self.value_of(value, span)
            }
            ExprKind::ReadLine => {
                let value = self.emitter.gen_intrinsic_call(Intrinsic::ReadLine);
                self.value_of(value, span)
            }
            ExprKind::Ident { owner, symbol } => {
                self.lower_ident(expr.lvalue, owner.as_deref(), *symbol, ctx, span)
            }
            ExprKind::Indexed { array, index } => self.lower_indexed(array, index, ctx),
            ExprKind::Call(call) => {
                let value = self.lower_call(call, ctx, span)?;
                self.value_of(value, span)
            }
            ExprKind::ArrayLength(array) => self.lower_array_length(array, ctx),
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs, ctx, span),
            ExprKind::Unary { op, operand } => {
                let operand = self.lower_expr(operand, ctx)?;
                Ok(self.emitter.gen_un(*op, operand))
            }
            ExprKind::NewClass(class) => self.lower_new_class(*class, span),
            ExprKind::NewArray { length, .. } => {
                let length = self.lower_expr(length, ctx)?;
                Ok(self.emitter.gen_new_array(length))
            }
            ExprKind::InstanceOf { expr: object, class } => {
                self.lower_instance_of(object, *class, ctx, span)
            }
            ExprKind::Cast { expr: object, class } => self.lower_cast(object, *class, ctx, span),
            ExprKind::ShallowCopy(source) => self.lower_shallow_copy(source, ctx),
            ExprKind::NewSameArray { value, count } => self.lower_new_same_array(value, count, ctx),
            ExprKind::DefaultIndex {
                array,
                index,
                default,
            } => self.lower_default_index(array, index, default, ctx),
            ExprKind::VarBinding(var) => Ok(self.bind_local(*var, ctx)),
        }
    }

    /// Lower a literal to an immediate or string constant load.
    fn lower_literal(&mut self, lit: &Literal) -> Temp {
        match lit {
            Literal::Int(i) => self.emitter.gen_load_imm(*i),
            Literal::Bool(b) => self.emitter.gen_load_imm(*b as TargetSize),
            Literal::String(s) => self.emitter.gen_load_str(s),
        }
    }

    /// Lower a variable reference. Locals and parameters already live in their bound temporary;
    /// member variables are loaded from the receiver. A variable is never an array element.
    fn lower_ident(
        &mut self,
        lvalue: LValueKind,
        owner: Option<&Expr>,
        symbol: VarId,
        ctx: &mut MethodContext,
        span: Span,
    ) -> LowerResult<Temp> {
        match lvalue {
            LValueKind::MemberVar => {
                let receiver = self.lower_receiver(owner, ctx, span)?;
                let offset = self.variable_symbol(symbol, span)?.offset;
                Ok(self.emitter.gen_load(receiver, offset))
            }
            LValueKind::LocalVar | LValueKind::ParamVar | LValueKind::NotLValue => {
                self.temp_of(symbol, ctx, span)
            }
            LValueKind::ArrayElement => error(LowerErrorKind::InvalidLValue(lvalue), span),
        }
    }

    /// Lower the owner of a member access, falling back to the implicit `this`.
    pub(super) fn lower_receiver(
        &mut self,
        owner: Option<&Expr>,
        ctx: &mut MethodContext,
        span: Span,
    ) -> LowerResult<Temp> {
        match owner {
            Some(owner) => self.lower_expr(owner, ctx),
            None => ctx.this(span),
        }
    }

    /// Lower an indexed read. The index is checked against the array bounds before the element
    /// address is computed.
    fn lower_indexed(
        &mut self,
        array: &Expr,
        index: &Expr,
        ctx: &mut MethodContext,
    ) -> LowerResult<Temp> {
        let array = self.lower_expr(array, ctx)?;
        let index = self.lower_expr(index, ctx)?;
        self.check_array_index(array, index);

        let address = self.element_address(array, index);
        Ok(self.emitter.gen_load(address, 0))
    }

    /// Lower a binary expression. Both operands are always evaluated, left to right.
    fn lower_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        ctx: &mut MethodContext,
        span: Span,
    ) -> LowerResult<Temp> {
        let left = self.lower_expr(lhs, ctx)?;
        let right = self.lower_expr(rhs, ctx)?;

        match op {
            BinOp::Divide | BinOp::Modulo => {
                self.check_zero(right);
                Ok(self.emitter.gen_bin(op, left, right))
            }
            BinOp::Equal | BinOp::NotEqual
                if lhs.ty == TypeSpec::String || rhs.ty == TypeSpec::String =>
            {
                self.lower_string_equality(op, left, right, span)
            }
            _ => Ok(self.emitter.gen_bin(op, left, right)),
        }
    }

    /// Strings are compared by content through the runtime, never by address.
    fn lower_string_equality(
        &mut self,
        op: BinOp,
        left: Temp,
        right: Temp,
        span: Span,
    ) -> LowerResult<Temp> {
        self.emitter.gen_param(left);
        self.emitter.gen_param(right);
        let equal = self.emitter.gen_intrinsic_call(Intrinsic::StringEqual);
        let equal = self.value_of(equal, span)?;

        if op == BinOp::NotEqual {
            Ok(self.emitter.gen_lnot(equal))
        } else {
            Ok(equal)
        }
    }

    /// Lower a call. The receiver and all arguments are evaluated before any of them are
    /// passed, so that nested calls cannot interleave their parameters with ours.
    /// Returns `None` for calls to `void` methods.
    pub(super) fn lower_call(
        &mut self,
        call: &CallExpr,
        ctx: &mut MethodContext,
        span: Span,
    ) -> LowerResult<Option<Temp>> {
        let method = self.method_symbol(call.method, span)?;

        let receiver = match &call.receiver {
            Some(receiver) => Some(self.lower_expr(receiver, ctx)?),
            None => None,
        };
        let args = call
            .args
            .iter()
            .map(|arg| self.lower_expr(arg, ctx))
            .collect::<LowerResult<Vec<_>>>()?;

        if let Some(receiver) = receiver {
            self.emitter.gen_param(receiver);
        }
        for arg in args {
            self.emitter.gen_param(arg);
        }

        Ok(match receiver {
            None => self
                .emitter
                .gen_direct_call(&method.label, &method.return_type),
            Some(receiver) => {
                let func = self.lookup_virtual(receiver, method.offset);
                self.emitter.gen_indirect_call(func, &method.return_type)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::il::test_support::*;

    use super::*;

    #[test]
    fn arithmetic_is_lowered_operands_first() {
        let mut fx = Fixture::new();
        let [a, b, c, x] = fx.int_locals(["a", "b", "c", "x"]);

        let value = binary(
            BinOp::Add,
            fx.var(a),
            binary(BinOp::Multiply, fx.var(b), fx.var(c), TypeSpec::Int),
            TypeSpec::Int,
        );
        let body = vec![
            var_def(a),
            var_def(b),
            var_def(c),
            var_def(x),
            assign(fx.var(x), value),
        ];

        assert_generates!(fx, body, ["%5 = %2 * %3", "%6 = %1 + %5", "%4 = %6"]);
    }

    #[test]
    fn literals_load_immediates_and_string_constants() {
        let mut fx = Fixture::new();
        let [b] = fx.locals([("b", TypeSpec::Bool)]);
        let [s] = fx.locals([("s", TypeSpec::String)]);

        let body = vec![
            var_def(b),
            var_def(s),
            assign(fx.var(b), boolean(true)),
            assign(fx.var(s), string("hi")),
        ];

        assert_generates!(fx, body, ["%3 = 1", "%1 = %3", "%4 = \"hi\"", "%2 = %4"]);
    }

    #[test]
    fn division_is_guarded_by_a_zero_check() {
        let mut fx = Fixture::new();
        let [a, b, x] = fx.int_locals(["a", "b", "x"]);

        let body = vec![
            var_def(a),
            var_def(b),
            var_def(x),
            assign(
                fx.var(x),
                binary(BinOp::Divide, fx.var(a), fx.var(b), TypeSpec::Int),
            ),
        ];

        assert_generates!(
            fx,
            body,
            [
                "%4 = \"Decaf runtime error: Division by zero error.\"",
                "%5 = 0",
                "%6 = %2 == %5",
                "if_false %6 goto nonzero_1",
                "param %4",
                "call _PrintString",
                "call _Halt",
                "nonzero_1:",
                "%7 = %1 / %2",
                "%3 = %7",
            ]
        );
    }

    #[test]
    fn modulo_is_guarded_by_a_zero_check() {
        let mut fx = Fixture::new();
        let [a, b, x] = fx.int_locals(["a", "b", "x"]);

        let body = vec![
            var_def(a),
            var_def(b),
            var_def(x),
            assign(
                fx.var(x),
                binary(BinOp::Modulo, fx.var(a), fx.var(b), TypeSpec::Int),
            ),
        ];
        let lines = fx.lower(body).lines();

        let halt = lines.iter().position(|l| l == "call _Halt");
        let modulo = lines.iter().position(|l| l == "%7 = %1 % %2");
        assert!(halt.is_some());
        assert!(halt < modulo);
    }

    #[test]
    fn string_equality_uses_the_runtime() {
        let mut fx = Fixture::new();
        let [s, t] = fx.locals([("s", TypeSpec::String), ("t", TypeSpec::String)]);
        let [eq, ne] = fx.locals([("eq", TypeSpec::Bool), ("ne", TypeSpec::Bool)]);

        let body = vec![
            var_def(s),
            var_def(t),
            var_def(eq),
            var_def(ne),
            assign(
                fx.var(eq),
                binary(BinOp::Equal, fx.var(s), fx.var(t), TypeSpec::Bool),
            ),
            assign(
                fx.var(ne),
                binary(BinOp::NotEqual, fx.var(s), fx.var(t), TypeSpec::Bool),
            ),
        ];

        assert_generates!(
            fx,
            body,
            [
                "param %1",
                "param %2",
                "%5 = call _StringEqual",
                "%3 = %5",
                "param %1",
                "param %2",
                "%6 = call _StringEqual",
                "%7 = ! %6",
                "%4 = %7",
            ]
        );
    }

    #[test]
    fn non_string_equality_uses_primitive_compare() {
        let mut fx = Fixture::new();
        let [a, b] = fx.int_locals(["a", "b"]);
        let [ne] = fx.locals([("ne", TypeSpec::Bool)]);

        let body = vec![
            var_def(a),
            var_def(b),
            var_def(ne),
            assign(
                fx.var(ne),
                binary(BinOp::NotEqual, fx.var(a), fx.var(b), TypeSpec::Bool),
            ),
        ];

        assert_generates!(fx, body, ["%4 = %1 != %2", "%3 = %4"]);
    }

    #[test]
    fn negation_applies_to_the_lowered_operand() {
        let mut fx = Fixture::new();
        let [a, x] = fx.int_locals(["a", "x"]);

        let negated = unary(
            UnOp::Negate,
            binary(BinOp::Subtract, fx.var(a), int(1), TypeSpec::Int),
            TypeSpec::Int,
        );
        let body = vec![var_def(a), var_def(x), assign(fx.var(x), negated)];

        assert_generates!(fx, body, ["%3 = 1", "%4 = %1 - %3", "%5 = - %4", "%2 = %5"]);
    }

    #[test]
    fn variable_tagged_as_array_element_is_rejected() {
        let mut fx = Fixture::new();
        let [a, x] = fx.int_locals(["a", "x"]);

        let misplaced = fx.var(a).with_lvalue(LValueKind::ArrayElement);
        let body = vec![var_def(a), var_def(x), assign(fx.var(x), misplaced)];

        assert_eq!(
            vec![LowerErrorKind::InvalidLValue(LValueKind::ArrayElement)],
            fx.lower_errors(body)
        );
    }

    #[test]
    fn logical_operators_evaluate_both_operands() {
        let mut fx = Fixture::new();
        let [p, q, r] = fx.locals([
            ("p", TypeSpec::Bool),
            ("q", TypeSpec::Bool),
            ("r", TypeSpec::Bool),
        ]);

        let body = vec![
            var_def(p),
            var_def(q),
            var_def(r),
            assign(
                fx.var(r),
                unary(
                    UnOp::Not,
                    binary(BinOp::And, fx.var(p), fx.var(q), TypeSpec::Bool),
                    TypeSpec::Bool,
                ),
            ),
        ];

        assert_generates!(fx, body, ["%4 = %1 && %2", "%5 = ! %4", "%3 = %5"]);
    }

    #[test]
    fn indexed_read_checks_bounds_before_loading() {
        let mut fx = Fixture::new();
        let [arr] = fx.locals([("arr", int_array())]);
        let [i, x] = fx.int_locals(["i", "x"]);

        let body = vec![
            var_def(arr),
            var_def(i),
            var_def(x),
            assign(fx.var(x), indexed(fx.var(arr), fx.var(i))),
        ];

        assert_generates!(
            fx,
            body,
            [
                "check_index %1, %2",
                "%4 = 4",
                "%5 = %2 * %4",
                "%6 = %1 + %5",
                "%7 = *(%6 + 0)",
                "%3 = %7",
            ]
        );
    }

    #[test]
    fn static_call_evaluates_all_arguments_before_passing_them() {
        let mut fx = Fixture::new();
        let helper = fx.static_method("helper", "_Main.helper", TypeSpec::Void);

        let call = call_expr(None, helper, vec![int(1), int(2)], TypeSpec::Void);
        let body = vec![exec(call)];

        assert_generates!(
            fx,
            body,
            ["%1 = 1", "%2 = 2", "param %1", "param %2", "call _Main.helper"]
        );
    }

    #[test]
    fn nested_call_arguments_do_not_interleave_params() {
        let mut fx = Fixture::new();
        let inner = fx.static_method("inner", "_Main.inner", TypeSpec::Int);
        let outer = fx.static_method("outer", "_Main.outer", TypeSpec::Void);

        let nested = call_expr(None, inner, vec![int(7)], TypeSpec::Int);
        let body = vec![exec(call_expr(
            None,
            outer,
            vec![int(1), nested],
            TypeSpec::Void,
        ))];

        assert_generates!(
            fx,
            body,
            [
                "%1 = 1",
                "%2 = 7",
                "param %2",
                "%3 = call _Main.inner",
                "param %1",
                "param %3",
                "call _Main.outer",
            ]
        );
    }

    #[test]
    fn void_call_used_as_value_is_rejected() {
        let mut fx = Fixture::new();
        let helper = fx.static_method("helper", "_Main.helper", TypeSpec::Void);
        let [x] = fx.int_locals(["x"]);

        let body = vec![
            var_def(x),
            assign(
                fx.var(x),
                call_expr(None, helper, vec![], TypeSpec::Void),
            ),
        ];

        assert_eq!(vec![LowerErrorKind::VoidValue], fx.lower_errors(body));
    }

    #[test]
    fn reference_before_declaration_is_rejected() {
        let mut fx = Fixture::new();
        let [x, y] = fx.int_locals(["x", "y"]);

        let body = vec![var_def(y), assign(fx.var(y), fx.var(x))];

        assert_eq!(
            vec![LowerErrorKind::UnboundVariable("x".to_string())],
            fx.lower_errors(body)
        );
    }

    #[test]
    fn read_expressions_call_the_runtime() {
        let mut fx = Fixture::new();
        let [n] = fx.int_locals(["n"]);
        let [line] = fx.locals([("line", TypeSpec::String)]);

        let body = vec![
            var_def(n),
            var_def(line),
            assign(fx.var(n), expr(ExprKind::ReadInteger, TypeSpec::Int)),
            assign(fx.var(line), expr(ExprKind::ReadLine, TypeSpec::String)),
        ];

        assert_generates!(
            fx,
            body,
            [
                "%3 = call _ReadInteger",
                "%1 = %3",
                "%4 = call _ReadLine",
                "%2 = %4",
            ]
        );
    }

    #[test]
    fn var_binding_declares_local_at_first_assignment() {
        let mut fx = Fixture::new();
        let [x] = fx.int_locals(["x"]);

        let binding =
            expr(ExprKind::VarBinding(x), TypeSpec::Int).with_lvalue(LValueKind::LocalVar);
        let body = vec![assign(binding, int(3)), print(vec![fx.var(x)])];

        assert_generates!(fx, body, ["%1 = 3", "%2 = %1", "param %2", "call _PrintInt"]);
    }
}
