//! VINTRP: pixel-shader parameter interpolation.
//!
//! Single-word, self-consistent layout (this family has no worked example
//! in the catalog's grounded fixtures, so the bit positions below are a
//! simplified original assignment rather than a mined real-hardware one):
//! `class(6)=0b110010 | vdst(8) | attr_chan(2) | attr(6) | vsrc0(8)`.

use super::super::encode::{push_delayed, push_usage, EncodeCtx, EncodedWords};
use super::super::operand::OperandValue;
use crate::catalog::InstructionEntry;
use crate::isa::registers::{decode_operand, Operand};
use crate::result::{AsmError, AsmResult};
use crate::srcpos::SourcePos;
use crate::usage::{FieldId, RwFlags};
use crate::waitcnt::DelayClass;
use smallvec::smallvec;

const CLASS: u32 = 0b110010;

pub(crate) fn pack(vdst: u32, attr_chan: u32, attr: u32, vsrc0: u32) -> u32 {
    (CLASS << 26) | ((vdst & 0xFF) << 18) | ((attr_chan & 0x3) << 16) | ((attr & 0x3F) << 8) | (vsrc0 & 0xFF)
}

pub(crate) fn unpack(word: u32) -> (u32, u32, u32, u32) {
    (
        (word >> 18) & 0xFF,
        (word >> 16) & 0x3,
        (word >> 8) & 0x3F,
        word & 0xFF,
    )
}

fn operand_at<'a>(
    operands: &'a [OperandValue],
    idx: usize,
    at: &SourcePos,
) -> AsmResult<&'a OperandValue> {
    operands.get(idx).ok_or(AsmError::OperandKindMismatch {
        at: at.clone(),
        operand_index: idx,
        detail: "missing operand".to_string(),
    })
}

pub(crate) fn encode(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    let vdst = operand_at(operands, 0, &ctx.at)?;
    let vsrc0 = operand_at(operands, 1, &ctx.at)?;
    push_usage(ctx, vdst, 1, FieldId::VintrpVdst, RwFlags::Write);
    push_delayed(ctx, vdst, 1, DelayClass::Valu, RwFlags::Write);
    push_usage(ctx, vsrc0, 1, FieldId::VintrpVsrc0, RwFlags::Read);
    let attr_chan = entry.opcode & 0x3;
    let attr = (entry.opcode >> 2) & 0x3F;
    let word = pack(vdst.bits(ctx.arch), attr_chan, attr, vsrc0.bits(ctx.arch));
    Ok(smallvec![word])
}

/// Decode a VINTRP word into `(vdst, attr_chan, attr, vsrc0)`.
pub fn decode(word: u32, arch: crate::arch::GcnArch) -> (Operand, u32, u32, Operand) {
    let (vdst, attr_chan, attr, vsrc0) = unpack(word);
    (
        decode_operand(vdst, 1, arch),
        attr_chan,
        attr,
        decode_operand(vsrc0, 1, arch),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let word = pack(12, 2, 5, 256 + 9);
        assert_eq!(unpack(word), (12, 2, 5, 256 + 9));
    }
}
