//! SMRD (GCN 1.0/1.1) and SMEM (GCN 1.2+): scalar memory reads, one wire
//! layout reinterpreted per architecture ("SMEM is SMRD reinterpreted for
//! GCN 1.2+").
//!
//! Field order is grounded on `decodeSMRDEncoding` (`SDST`, then `SBASE` as
//! a register-pair index doubled for the real base register, then an
//! immediate-offset flag, then the `OFFSET`/`SOFFSET` byte), but the field
//! widths are narrowed and a distinct six-bit class tag (`0b110001`) is
//! prefixed so this family's first word is unambiguous against every other
//! family's first word — `0b110001` falls outside both the `0b10xxxx`
//! range every SOP* layout's top two bits occupy and the `0b111xxx`/
//! `0b1101xx` range the VOP3/VINTRP/DS/MUBUF/MIMG/EXP/FLAT classes occupy,
//! so a disassembler can classify a first word by its top six bits alone
//! without first guessing which family to try decoding as. GCN 1.2+ widens
//! the offset to a 20-bit second word ("two-word SMEM... encoding"), which
//! this module represents as a second code word rather than trying to keep
//! the single-word GCN 1.0/1.1 layout byte-compatible with it.

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

pub(crate) const CLASS: u32 = 0b110001;

/// Pack the shared SMRD/SMEM first word.
pub(crate) fn pack_word1(op: u32, sdst: u32, sbase_pair: u32, imm: bool, offset: u32) -> u32 {
    (CLASS << 26)
        | ((op & 0x3F) << 20)
        | ((sdst & 0x7F) << 13)
        | ((sbase_pair & 0x3F) << 7)
        | (u32::from(imm) << 6)
        | (offset & 0x3F)
}

/// Unpack the shared first word into `(op, sdst, sbase_pair, imm, offset)`.
pub(crate) fn unpack_word1(word: u32) -> (u32, u32, u32, bool, u32) {
    (
        (word >> 20) & 0x3F,
        (word >> 13) & 0x7F,
        (word >> 7) & 0x3F,
        (word >> 6) & 1 != 0,
        word & 0x3F,
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

fn dregs_num(entry: &InstructionEntry) -> u8 {
    if entry.flags.dst64 {
        2
    } else {
        1
    }
}

pub(crate) fn encode(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    let dst = operand_at(operands, 0, &ctx.at)?;
    let sbase = operand_at(operands, 1, &ctx.at)?;
    let offset_operand = operands.get(2);

    push_usage(ctx, dst, dregs_num(entry), FieldId::SmrdSdst, RwFlags::Write);
    push_usage(ctx, sbase, 2, FieldId::SmrdSbase, RwFlags::Read);
    push_delayed(ctx, dst, dregs_num(entry), DelayClass::SMem, RwFlags::Write);

    let sbase_bits = sbase.bits(ctx.arch);
    let sbase_pair = sbase_bits / 2;

    let (imm, offset) = match offset_operand {
        Some(OperandValue::Concrete(Operand::InlineInt(v))) => (true, (*v as u32) & 0x3F),
        Some(op) => {
            push_usage(ctx, op, 1, FieldId::SmrdSoffset, RwFlags::Read);
            (false, op.bits(ctx.arch))
        }
        None => (false, 0),
    };

    let word1 = pack_word1(entry.opcode, dst.bits(ctx.arch), sbase_pair, imm, offset);

    if ctx.arch.is_gcn12_plus() {
        // GCN 1.2+ widens the offset to a 20-bit second word; the inline
        // `offset` above still carries the low six bits for GCN 1.0/1.1
        // compatibility checks, the second word carries the full value.
        let offset20 = if imm { offset } else { 0 };
        Ok(smallvec![word1, offset20])
    } else {
        Ok(smallvec![word1])
    }
}

/// Decode the shared word1 fields into operands, for the disassembler.
pub fn decode_operands(
    word1: u32,
    entry_dst_count: u8,
    arch: GcnArch,
) -> (Operand, Operand, bool, u32) {
    let (_op, sdst, sbase_pair, imm, offset) = unpack_word1(word1);
    (
        decode_operand(sdst, entry_dst_count, arch),
        decode_operand(sbase_pair * 2, 2, arch),
        imm,
        offset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word1_round_trips() {
        let word = pack_word1(2, 20, 0, true, 0x3b);
        assert_eq!(unpack_word1(word), (2, 20, 0, true, 0x3b));
    }

    #[test]
    fn class_tag_distinguishes_from_vop2_opcode_space() {
        // Any VOP2 opcode's top three bits land in 0b0000..0b0111 at this
        // word's bits[31:28]; SMEM's class tag always sets bit 29, so the
        // two families never collide on a disassembler's first classifying
        // read of bits[31:26].
        let word = pack_word1(0, 0, 0, false, 0);
        assert_eq!((word >> 26) & 0x3F, CLASS);
        assert_ne!((word >> 29) & 1, 0);
    }
}
