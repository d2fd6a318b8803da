//! DS: local/shared data-share memory access.
//!
//! Simplified, self-consistent two-word layout (same rationale as
//! [`super::vintrp`]): word1 carries the opcode and the two 8-bit byte
//! offsets, word2 carries the four register operands.
//!
//! `word1 = class(6)=0b110110 | op(8) | gds(1) | offset1(8) | offset0(8) | reserved(1)`
//! `word2 = vdst(8) | data1(8) | data0(8) | addr(8)`

use super::super::encode::{push_delayed, push_usage, EncodeCtx, EncodedWords};
use super::super::operand::OperandValue;
use crate::arch::GcnArch;
use crate::catalog::InstructionEntry;
use crate::isa::registers::{decode_operand, Operand};
use crate::result::{AsmError, AsmResult};
use crate::srcpos::SourcePos;
use crate::usage::{FieldId, RwFlags};
use crate::waitcnt::DelayClass;
use smallvec::smallvec;

const CLASS: u32 = 0b110110;

pub(crate) fn pack_word1(op: u32, gds: bool, offset1: u32, offset0: u32) -> u32 {
    (CLASS << 26)
        | ((op & 0xFF) << 18)
        | (u32::from(gds) << 17)
        | ((offset1 & 0xFF) << 9)
        | ((offset0 & 0xFF) << 1)
}

pub(crate) fn unpack_word1(word: u32) -> (u32, bool, u32, u32) {
    (
        (word >> 18) & 0xFF,
        (word >> 17) & 1 != 0,
        (word >> 9) & 0xFF,
        (word >> 1) & 0xFF,
    )
}

pub(crate) fn pack_word2(vdst: u32, data1: u32, data0: u32, addr: u32) -> u32 {
    ((vdst & 0xFF) << 24) | ((data1 & 0xFF) << 16) | ((data0 & 0xFF) << 8) | (addr & 0xFF)
}

pub(crate) fn unpack_word2(word: u32) -> (u32, u32, u32, u32) {
    (
        (word >> 24) & 0xFF,
        (word >> 16) & 0xFF,
        (word >> 8) & 0xFF,
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
    let has_dst = !entry.flags.no_dst;
    let mut idx = 0usize;

    let vdst = if has_dst {
        let op = operand_at(operands, idx, &ctx.at)?;
        idx += 1;
        push_usage(ctx, op, 1, FieldId::DsVdst, RwFlags::Write);
        push_delayed(ctx, op, 1, DelayClass::Lds, RwFlags::Write);
        op.bits(ctx.arch)
    } else {
        0
    };

    let addr = operand_at(operands, idx, &ctx.at)?;
    idx += 1;
    push_usage(ctx, addr, 1, FieldId::DsAddr, RwFlags::Read);

    let mut data0_bits = 0;
    if let Some(data0) = operands.get(idx) {
        if !entry.flags.no_src {
            push_usage(ctx, data0, 1, FieldId::DsData0, RwFlags::Read);
            data0_bits = data0.bits(ctx.arch);
            idx += 1;
        }
    }
    let mut data1_bits = 0;
    if let Some(data1) = operands.get(idx) {
        push_usage(ctx, data1, 1, FieldId::DsData1, RwFlags::Read);
        data1_bits = data1.bits(ctx.arch);
    }

    let word1 = pack_word1(entry.opcode, false, 0, 0);
    let word2 = pack_word2(vdst, data1_bits, data0_bits, addr.bits(ctx.arch));
    Ok(smallvec![word1, word2])
}

/// Decode a DS word pair into `(op, gds, vdst, data1, data0, addr)`.
pub fn decode(word1: u32, word2: u32, arch: GcnArch) -> (u32, bool, Operand, Operand, Operand, Operand) {
    let (op, gds, _offset1, _offset0) = unpack_word1(word1);
    let (vdst, data1, data0, addr) = unpack_word2(word2);
    (
        op,
        gds,
        decode_operand(vdst, 1, arch),
        decode_operand(data1, 1, arch),
        decode_operand(data0, 1, arch),
        decode_operand(addr, 1, arch),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word1_round_trips() {
        let word = pack_word1(13, true, 0x20, 0x10);
        assert_eq!(unpack_word1(word), (13, true, 0x20, 0x10));
    }

    #[test]
    fn word2_round_trips() {
        let word = pack_word2(4, 256 + 7, 256 + 6, 256 + 5);
        assert_eq!(unpack_word2(word), (4, 256 + 7, 256 + 6, 256 + 5));
    }
}
