//! Guards emitted in front of operations that can fail at runtime.
use crate::builtins::Intrinsic;

use super::{tac::*, translator::Translator};

const DIVISION_BY_ZERO: &str = "Decaf runtime error: Division by zero error.";

impl Translator<'_> {
    /// Halt with a diagnostic if `divisor` is zero. Control only falls through to the code
    /// emitted after this guard when the divisor is non-zero.
    pub(super) fn check_zero(&mut self, divisor: Temp) {
        let msg = self.emitter.gen_load_str(DIVISION_BY_ZERO);
        let nonzero = self.emitter.new_label("nonzero");
        let zero = self.emitter.gen_load_imm(0);
        let is_zero = self.emitter.gen_equ(divisor, zero);
        self.emitter.gen_beqz(is_zero, nonzero.clone());

        self.emitter.gen_param(msg);
        self.emitter.gen_intrinsic_call(Intrinsic::PrintString);
        self.emitter.gen_intrinsic_call(Intrinsic::Halt);
        self.emitter.gen_mark(nonzero);
    }

    /// Halt with a diagnostic unless `index` lies within the bounds of `array`.
    pub(super) fn check_array_index(&mut self, array: Temp, index: Temp) {
        self.emitter.gen_check_array_index(array, index);
    }
}
