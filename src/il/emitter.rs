use std::{
    collections::{HashMap, HashSet},
    mem,
};

use crate::{
    ast::{BinOp, TypeSpec, UnOp},
    builtins::Intrinsic,
    prelude::*,
};

use super::{tac::*, temp_generator::*};

/// Appends instructions to the function currently being lowered. Every value-producing
/// operation allocates a fresh destination temporary and returns it.
pub struct Emitter {
    temp_generator: TempGenerator,
    function: TacFunction,
    /// Last subscript handed out per label prefix.
    label_subscripts: HashMap<&'static str, usize>,
    /// Labels already bound to a position. A label is marked at most once.
    marked: HashSet<Label>,
    pending_params: usize,
}
impl Emitter {
    pub fn new() -> Self {
        Self {
            temp_generator: TempGenerator::new(),
            function: TacFunction::default(),
            label_subscripts: HashMap::new(),
            marked: HashSet::new(),
            pending_params: 0,
        }
    }

    pub fn new_temp(&mut self) -> Temp {
        self.temp_generator.next_temp()
    }

    /// Allocate a label named `prefix_N`. Each prefix is numbered from 1 on its own.
    pub fn new_label(&mut self, prefix: &'static str) -> Label {
        let subscript = self.label_subscripts.entry(prefix).or_insert(0);
        *subscript += 1;
        let label = Label::new(prefix.to_string(), *subscript);
        trace!("New label {}", label);
        label
    }

    /// Start a new function. Anything emitted for a previous, unfinished function is discarded.
    pub fn begin_func(&mut self, label: &str, params: Vec<Temp>) {
        debug!("Begin function {}", label);
        self.function = TacFunction::new(label.to_string(), params);
        self.pending_params = 0;
    }

    /// Finish the current function and hand over its listing.
    pub fn end_func(&mut self) -> TacFunction {
        let function = mem::take(&mut self.function);
        debug!(
            "End function {} ({} instructions)",
            function.label,
            function.body.len()
        );
        function
    }

    pub fn gen_assign(&mut self, dst: Temp, src: Temp) {
        self.emit(TacInstr::Assign(dst, src));
    }

    pub fn gen_bin(&mut self, op: BinOp, lhs: Temp, rhs: Temp) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInstr::Bin(dst, op, lhs, rhs));
        dst
    }

    pub fn gen_add(&mut self, lhs: Temp, rhs: Temp) -> Temp {
        self.gen_bin(BinOp::Add, lhs, rhs)
    }

    pub fn gen_mul(&mut self, lhs: Temp, rhs: Temp) -> Temp {
        self.gen_bin(BinOp::Multiply, lhs, rhs)
    }

    pub fn gen_les(&mut self, lhs: Temp, rhs: Temp) -> Temp {
        self.gen_bin(BinOp::LessThan, lhs, rhs)
    }

    pub fn gen_equ(&mut self, lhs: Temp, rhs: Temp) -> Temp {
        self.gen_bin(BinOp::Equal, lhs, rhs)
    }

    pub fn gen_un(&mut self, op: UnOp, src: Temp) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInstr::Un(dst, op, src));
        dst
    }

    pub fn gen_lnot(&mut self, src: Temp) -> Temp {
        self.gen_un(UnOp::Not, src)
    }

    pub fn gen_load_imm(&mut self, value: TargetSize) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInstr::LoadImm(dst, value));
        dst
    }

    pub fn gen_load_str(&mut self, value: &str) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInstr::LoadStr(dst, value.to_string()));
        dst
    }

    pub fn gen_load_vtbl(&mut self, vtable: &str) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInstr::LoadVtbl(dst, vtable.to_string()));
        dst
    }

    pub fn gen_load(&mut self, base: Temp, offset: TargetSize) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInstr::Load(dst, base, offset));
        dst
    }

    pub fn gen_store(&mut self, src: Temp, base: Temp, offset: TargetSize) {
        self.emit(TacInstr::Store(src, base, offset));
    }

    pub fn gen_param(&mut self, value: Temp) {
        self.pending_params += 1;
        self.emit(TacInstr::Param(value));
    }

    /// Call a function by label. Returns the temporary holding the result, unless the function
    /// returns `void`.
    pub fn gen_direct_call(&mut self, func: &str, ret: &TypeSpec) -> Option<Temp> {
        let dst = self.call_target(ret);
        self.emit(TacInstr::DirectCall(dst, func.to_string()));
        dst
    }

    pub fn gen_indirect_call(&mut self, func: Temp, ret: &TypeSpec) -> Option<Temp> {
        let dst = self.call_target(ret);
        self.emit(TacInstr::IndirectCall(dst, func));
        dst
    }

    pub fn gen_intrinsic_call(&mut self, intrinsic: Intrinsic) -> Option<Temp> {
        debug_assert_eq!(
            intrinsic.param_count(),
            self.pending_params,
            "wrong number of parameters passed to {}",
            intrinsic
        );
        self.gen_direct_call(intrinsic.label(), &intrinsic.return_type())
    }

    pub fn gen_branch(&mut self, label: Label) {
        self.emit(TacInstr::Goto(label));
    }

    /// Branch to `label` if `cond` is zero.
    pub fn gen_beqz(&mut self, cond: Temp, label: Label) {
        self.emit(TacInstr::IfFalse(cond, label));
    }

    /// Bind a label to the current position.
    pub fn gen_mark(&mut self, label: Label) {
        let fresh = self.marked.insert(label.clone());
        debug_assert!(fresh, "label {} marked twice", label);
        self.emit(TacInstr::Label(label));
    }

    pub fn gen_return(&mut self, value: Option<Temp>) {
        self.emit(TacInstr::Return(value));
    }

    pub fn gen_new_array(&mut self, length: Temp) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInstr::NewArray(dst, length));
        dst
    }

    pub fn gen_instanceof(&mut self, object: Temp, vtable: &str) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInstr::InstanceOf(dst, object, vtable.to_string()));
        dst
    }

    pub fn gen_class_cast(&mut self, object: Temp, vtable: &str) {
        self.emit(TacInstr::ClassCast(object, vtable.to_string()));
    }

    pub fn gen_check_array_index(&mut self, array: Temp, index: Temp) {
        self.emit(TacInstr::CheckArrayIndex(array, index));
    }

    fn call_target(&mut self, ret: &TypeSpec) -> Option<Temp> {
        self.pending_params = 0;
        if ret.is_void() {
            None
        } else {
            Some(self.new_temp())
        }
    }

    /// Emit an instruction, adding it to the listing.
    fn emit(&mut self, instr: TacInstr) {
        trace!("Emit {}", instr);
        self.function.body.push(instr);
    }
}
