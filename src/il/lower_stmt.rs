use crate::{ast::*, builtins::Intrinsic, symbols::VarId};

use super::{
    error::*,
    tac::*,
    translator::{MethodContext, Translator},
};

impl Translator<'_> {
    /// Lower a block of statements in order.
    pub(super) fn lower_block(
        &mut self,
        block: &Block,
        ctx: &mut MethodContext,
    ) -> LowerResult<()> {
        for stmt in &block.statements {
            self.lower_stmt(stmt, ctx)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt, ctx: &mut MethodContext) -> LowerResult<()> {
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::VarDef(var) => {
                self.bind_local(*var, ctx);
            }
            StmtKind::Block(block) => self.lower_block(block, ctx)?,
            StmtKind::Exec(expr) => self.lower_exec(expr, ctx)?,
            StmtKind::Assign { target, value } => self.lower_assign(target, value, ctx)?,
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.lower_if(condition, then_branch, else_branch.as_deref(), ctx)?,
            StmtKind::While { condition, body } => self.lower_while(condition, body, ctx)?,
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => self.lower_for(init.as_deref(), condition, update.as_deref(), body, ctx)?,
            StmtKind::Foreach {
                binding,
                array,
                guard,
                body,
            } => self.lower_foreach(*binding, array, guard.as_ref(), body, ctx)?,
            StmtKind::Return(value) => {
                let value = match value {
                    Some(value) => Some(self.lower_expr(value, ctx)?),
                    None => None,
                };
                self.emitter.gen_return(value);
            }
            StmtKind::Break => {
                let exit = ctx.loop_exit(span)?;
                self.emitter.gen_branch(exit);
            }
            StmtKind::Print(args) => self.lower_print(args, ctx)?,
            StmtKind::Guarded { alternatives, last } => {
                self.lower_guarded(alternatives, last, ctx)?
            }
        }
        Ok(())
    }

    /// Evaluate an expression for its side effects. This is the only place where a call to a
    /// `void` method may appear.
    fn lower_exec(&mut self, expr: &Expr, ctx: &mut MethodContext) -> LowerResult<()> {
        match &expr.kind {
            ExprKind::Call(call) => {
                self.lower_call(call, ctx, expr.span)?;
            }
            _ => {
                self.lower_expr(expr, ctx)?;
            }
        }
        Ok(())
    }

    /// Lower an assignment. The value is computed first, then the target's location.
    fn lower_assign(
        &mut self,
        target: &Expr,
        value: &Expr,
        ctx: &mut MethodContext,
    ) -> LowerResult<()> {
        let value = self.lower_expr(value, ctx)?;

        match (target.lvalue, &target.kind) {
            (LValueKind::ArrayElement, ExprKind::Indexed { array, index }) => {
                let array = self.lower_expr(array, ctx)?;
                let index = self.lower_expr(index, ctx)?;
                self.check_array_index(array, index);
                let address = self.element_address(array, index);
                self.emitter.gen_store(value, address, 0);
            }
            (LValueKind::MemberVar, ExprKind::Ident { owner, symbol }) => {
                let receiver = self.lower_receiver(owner.as_deref(), ctx, target.span)?;
                let offset = self.variable_symbol(*symbol, target.span)?.offset;
                self.emitter.gen_store(value, receiver, offset);
            }
            (LValueKind::LocalVar | LValueKind::ParamVar, ExprKind::Ident { symbol, .. }) => {
                let temp = self.temp_of(*symbol, ctx, target.span)?;
                self.emitter.gen_assign(temp, value);
            }
            (LValueKind::LocalVar, ExprKind::VarBinding(var)) => {
                let temp = self.bind_local(*var, ctx);
                self.emitter.gen_assign(temp, value);
            }
            (kind, _) => return error(LowerErrorKind::InvalidLValue(kind), target.span),
        }
        Ok(())
    }

    fn lower_if(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        ctx: &mut MethodContext,
    ) -> LowerResult<()> {
        let cond = self.lower_expr(condition, ctx)?;
        let end = self.emitter.new_label("if_end");

        match else_branch {
            Some(else_branch) => {
                let otherwise = self.emitter.new_label("else");
                self.emitter.gen_beqz(cond, otherwise.clone());
                self.lower_stmt(then_branch, ctx)?;
                self.emitter.gen_branch(end.clone());
                self.emitter.gen_mark(otherwise);
                self.lower_stmt(else_branch, ctx)?;
            }
            None => {
                self.emitter.gen_beqz(cond, end.clone());
                self.lower_stmt(then_branch, ctx)?;
            }
        }

        self.emitter.gen_mark(end);
        Ok(())
    }

    fn lower_while(
        &mut self,
        condition: &Expr,
        body: &Stmt,
        ctx: &mut MethodContext,
    ) -> LowerResult<()> {
        let repeat = self.emitter.new_label("loop");
        self.emitter.gen_mark(repeat.clone());
        let cond = self.lower_expr(condition, ctx)?;
        let exit = self.emitter.new_label("loop_exit");
        self.emitter.gen_beqz(cond, exit.clone());

        self.lower_loop_body(body, repeat, &exit, ctx)?;
        self.emitter.gen_mark(exit);
        Ok(())
    }

    /// Lower a for loop. The initial jump skips the update, so the update only runs between
    /// iterations.
    fn lower_for(
        &mut self,
        init: Option<&Stmt>,
        condition: &Expr,
        update: Option<&Stmt>,
        body: &Stmt,
        ctx: &mut MethodContext,
    ) -> LowerResult<()> {
        if let Some(init) = init {
            self.lower_stmt(init, ctx)?;
        }
        let check = self.emitter.new_label("for_cond");
        let repeat = self.emitter.new_label("loop");
        self.emitter.gen_branch(check.clone());
        self.emitter.gen_mark(repeat.clone());
        if let Some(update) = update {
            self.lower_stmt(update, ctx)?;
        }
        self.emitter.gen_mark(check);
        let cond = self.lower_expr(condition, ctx)?;
        let exit = self.emitter.new_label("loop_exit");
        self.emitter.gen_beqz(cond, exit.clone());

        self.lower_loop_body(body, repeat, &exit, ctx)?;
        self.emitter.gen_mark(exit);
        Ok(())
    }

    /// Lower `foreach (x in array while guard) body` as a counted loop over the elements. The
    /// loop ends early, like a `break`, as soon as the guard is false.
    fn lower_foreach(
        &mut self,
        binding: VarId,
        array: &Expr,
        guard: Option<&Expr>,
        body: &Stmt,
        ctx: &mut MethodContext,
    ) -> LowerResult<()> {
        let element = self.bind_local(binding, ctx);
        let array = self.lower_expr(array, ctx)?;

        let repeat = self.emitter.new_label("loop");
        let exit = self.emitter.new_label("loop_exit");

        let word = self.emitter.gen_load_imm(WORD_SIZE);
        let one = self.emitter.gen_load_imm(1);
        let cursor = self.emitter.new_temp();
        self.emitter.gen_assign(cursor, array);
        let length = self.load_array_length(array);
        let index = self.emitter.gen_load_imm(0);

        self.emitter.gen_mark(repeat.clone());
        let more = self.emitter.gen_les(index, length);
        let next_index = self.emitter.gen_add(index, one);
        self.emitter.gen_assign(index, next_index);
        self.emitter.gen_beqz(more, exit.clone());

        let current = self.emitter.gen_load(cursor, 0);
        self.emitter.gen_assign(element, current);
        if let Some(guard) = guard {
            let guard = self.lower_expr(guard, ctx)?;
            self.emitter.gen_beqz(guard, exit.clone());
        }
        let next_cursor = self.emitter.gen_add(cursor, word);
        self.emitter.gen_assign(cursor, next_cursor);

        self.lower_loop_body(body, repeat, &exit, ctx)?;
        self.emitter.gen_mark(exit);
        Ok(())
    }

    /// Lower a loop body with `exit` as the target of `break`, then jump back to `repeat`.
    fn lower_loop_body(
        &mut self,
        body: &Stmt,
        repeat: Label,
        exit: &Label,
        ctx: &mut MethodContext,
    ) -> LowerResult<()> {
        ctx.push_loop_exit(exit.clone());
        let result = self.lower_stmt(body, ctx);
        ctx.pop_loop_exit();
        result?;

        self.emitter.gen_branch(repeat);
        Ok(())
    }

    fn lower_print(&mut self, args: &[Expr], ctx: &mut MethodContext) -> LowerResult<()> {
        for arg in args {
            let value = self.lower_expr(arg, ctx)?;
            let intrinsic = match Intrinsic::print_for(&arg.ty) {
                Some(intrinsic) => intrinsic,
                None => return error(LowerErrorKind::Unprintable(arg.ty.clone()), arg.span),
            };
            self.emitter.gen_param(value);
            self.emitter.gen_intrinsic_call(intrinsic);
        }
        Ok(())
    }

    /// Lower a guarded command. Each guard is tested in turn and its body runs whenever the
    /// guard holds; a body that fires does not skip the guards after it, so every alternative
    /// whose guard is true runs, in order.
    // TODO: settle whether only the first matching alternative should run. That needs a
    // branch from the end of each body to `end`.
    fn lower_guarded(
        &mut self,
        alternatives: &[GuardedBranch],
        last: &GuardedBranch,
        ctx: &mut MethodContext,
    ) -> LowerResult<()> {
        for alternative in alternatives {
            let cond = self.lower_expr(&alternative.guard, ctx)?;
            let skip = self.emitter.new_label("guard_skip");
            self.emitter.gen_beqz(cond, skip.clone());
            self.lower_stmt(&alternative.body, ctx)?;
            self.emitter.gen_mark(skip);
        }

        let cond = self.lower_expr(&last.guard, ctx)?;
        let end = self.emitter.new_label("guard_end");
        self.emitter.gen_beqz(cond, end.clone());
        self.lower_stmt(&last.body, ctx)?;
        self.emitter.gen_mark(end);
        Ok(())
    }
}
