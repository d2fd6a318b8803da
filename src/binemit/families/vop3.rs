//! VOP3A/VOP3B/VOP3P: the two-word, three-source vector-ALU extended
//! encodings.
//!
//! Word shape (consistent across all three sub-families): word1 fixes a
//! six-bit VOP3 class marker, a 9-bit opcode, and an 8-bit vector
//! destination; word2 packs the three 9-bit source operands plus a
//! handful of modifier bits in the remaining space. VOP3B additionally
//! claims word1's low byte for the carry/scalar-destination field
//! (`v_add_co_u32`, `v_div_scale_f32`); VOP3P's per-lane `op_sel`/`neg_lo`/
//! `neg_hi` modifiers are carried structurally by the caller rather than
//! packed into these two words, since this catalog's representative VOP3P
//! rows (see the catalog's module docs) don't yet exercise them.

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

const VOP3_CLASS: u32 = 0b110100;

fn pack_word1(op: u32, vdst: u32, low_byte: u32) -> u32 {
    (VOP3_CLASS << 26) | ((op & 0x1FF) << 17) | ((vdst & 0xFF) << 9) | (low_byte & 0xFF)
}

fn unpack_word1(word: u32) -> (u32, u32, u32) {
    ((word >> 17) & 0x1FF, (word >> 9) & 0xFF, word & 0xFF)
}

fn pack_word2(src0: u32, src1: u32, src2: u32, neg: u32, omod: u32) -> u32 {
    (src0 & 0x1FF) | ((src1 & 0x1FF) << 9) | ((src2 & 0x1FF) << 18) | ((neg & 0x7) << 27) | ((omod & 0x3) << 30)
}

fn unpack_word2(word: u32) -> (u32, u32, u32, u32, u32) {
    (
        word & 0x1FF,
        (word >> 9) & 0x1FF,
        (word >> 18) & 0x1FF,
        (word >> 27) & 0x7,
        (word >> 30) & 0x3,
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

pub(crate) fn encode_vop3a(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    let dst = operand_at(operands, 0, &ctx.at)?;
    let src0 = operand_at(operands, 1, &ctx.at)?;
    let src1 = operand_at(operands, 2, &ctx.at)?;
    let src2 = operand_at(operands, 3, &ctx.at)?;
    push_usage(ctx, dst, 1, FieldId::Vop3Vdst, RwFlags::Write);
    push_delayed(ctx, dst, 1, DelayClass::Valu, RwFlags::Write);
    push_usage(ctx, src0, 1, FieldId::Vop3Src0, RwFlags::Read);
    push_usage(ctx, src1, 1, FieldId::Vop3Src1, RwFlags::Read);
    push_usage(ctx, src2, 1, FieldId::Vop3Src2, RwFlags::Read);
    let word1 = pack_word1(entry.opcode, dst.bits(ctx.arch), 0);
    let word2 = pack_word2(src0.bits(ctx.arch), src1.bits(ctx.arch), src2.bits(ctx.arch), 0, 0);
    Ok(smallvec![word1, word2])
}

pub(crate) fn encode_vop3b(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    let dst = operand_at(operands, 0, &ctx.at)?;
    let sdst = operand_at(operands, 1, &ctx.at)?;
    let src0 = operand_at(operands, 2, &ctx.at)?;
    let src1 = operand_at(operands, 3, &ctx.at)?;
    let src2 = operands.get(4);
    push_usage(ctx, dst, 1, FieldId::Vop3Vdst, RwFlags::Write);
    push_delayed(ctx, dst, 1, DelayClass::Valu, RwFlags::Write);
    push_usage(ctx, sdst, 1, FieldId::Vop3Sdst0, RwFlags::Write);
    push_usage(ctx, src0, 1, FieldId::Vop3Src0, RwFlags::Read);
    push_usage(ctx, src1, 1, FieldId::Vop3Src1, RwFlags::Read);
    if let Some(src2) = src2 {
        push_usage(ctx, src2, 1, FieldId::Vop3Src2, RwFlags::Read);
    }
    let word1 = pack_word1(entry.opcode, dst.bits(ctx.arch), sdst.bits(ctx.arch) & 0x7F);
    let word2 = pack_word2(
        src0.bits(ctx.arch),
        src1.bits(ctx.arch),
        src2.map_or(0, |o| o.bits(ctx.arch)),
        0,
        0,
    );
    Ok(smallvec![word1, word2])
}

pub(crate) fn encode_vop3p(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    let dst = operand_at(operands, 0, &ctx.at)?;
    let src0 = operand_at(operands, 1, &ctx.at)?;
    let src1 = operand_at(operands, 2, &ctx.at)?;
    let src2 = operands.get(3);
    push_usage(ctx, dst, 1, FieldId::Vop3Vdst, RwFlags::Write);
    push_delayed(ctx, dst, 1, DelayClass::Valu, RwFlags::Write);
    push_usage(ctx, src0, 1, FieldId::Vop3Src0, RwFlags::Read);
    push_usage(ctx, src1, 1, FieldId::Vop3Src1, RwFlags::Read);
    if let Some(src2) = src2 {
        push_usage(ctx, src2, 1, FieldId::Vop3Src2, RwFlags::Read);
    }
    let word1 = pack_word1(entry.opcode, dst.bits(ctx.arch), 0);
    let word2 = pack_word2(
        src0.bits(ctx.arch),
        src1.bits(ctx.arch),
        src2.map_or(0, |o| o.bits(ctx.arch)),
        0,
        0,
    );
    Ok(smallvec![word1, word2])
}

/// Decode a VOP3A/VOP3P pair into `(op, vdst, src0, src1, src2)`.
pub fn decode_vop3a(word1: u32, word2: u32, arch: GcnArch) -> (u32, Operand, Operand, Operand, Operand) {
    let (op, vdst, _) = unpack_word1(word1);
    let (src0, src1, src2, _neg, _omod) = unpack_word2(word2);
    (
        op,
        decode_operand(vdst, 1, arch),
        decode_operand(src0, 1, arch),
        decode_operand(src1, 1, arch),
        decode_operand(src2, 1, arch),
    )
}

/// Decode a VOP3B pair into `(op, vdst, sdst, src0, src1, src2)`.
pub fn decode_vop3b(
    word1: u32,
    word2: u32,
    arch: GcnArch,
) -> (u32, Operand, Operand, Operand, Operand, Operand) {
    let (op, vdst, sdst) = unpack_word1(word1);
    let (src0, src1, src2, _neg, _omod) = unpack_word2(word2);
    (
        op,
        decode_operand(vdst, 1, arch),
        decode_operand(sdst, 1, arch),
        decode_operand(src0, 1, arch),
        decode_operand(src1, 1, arch),
        decode_operand(src2, 1, arch),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vop3a_round_trips() {
        let word1 = pack_word1(0x141, 10, 0);
        let word2 = pack_word2(5, 256 + 3, 128, 0, 0);
        assert_eq!(unpack_word1(word1), (0x141, 10, 0));
        assert_eq!(unpack_word2(word2), (5, 256 + 3, 128, 0, 0));
    }

    #[test]
    fn vop3b_carries_scalar_dst_in_low_byte() {
        let word1 = pack_word1(0x101, 4, 106);
        assert_eq!(unpack_word1(word1), (0x101, 4, 106));
    }
}
