//! MUBUF/MTBUF: untyped and typed buffer memory access.
//!
//! Both sub-families share this module's layout (MTBUF's extra data format
//! fields are folded into the opcode space rather than given a distinct bit
//! position, another of this file's simplified/self-consistent
//! approximations, see [`super::vintrp`]):
//!
//! `word1 = class(6)=0b111000 | op(8) | glc(1) | idxen(1) | offen(1) | offset(12) | reserved(3)`
//! `word2 = vdata(8) | vaddr(8) | srsrc(8) | soffset(8)`

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

const CLASS: u32 = 0b111000;

pub(crate) fn pack_word1(op: u32, glc: bool, idxen: bool, offen: bool, offset: u32) -> u32 {
    (CLASS << 26)
        | ((op & 0xFF) << 18)
        | (u32::from(glc) << 17)
        | (u32::from(idxen) << 16)
        | (u32::from(offen) << 15)
        | ((offset & 0xFFF) << 3)
}

pub(crate) fn unpack_word1(word: u32) -> (u32, bool, bool, bool, u32) {
    (
        (word >> 18) & 0xFF,
        (word >> 17) & 1 != 0,
        (word >> 16) & 1 != 0,
        (word >> 15) & 1 != 0,
        (word >> 3) & 0xFFF,
    )
}

pub(crate) fn pack_word2(vdata: u32, vaddr: u32, srsrc: u32, soffset: u32) -> u32 {
    ((vdata & 0xFF) << 24) | ((vaddr & 0xFF) << 16) | ((srsrc & 0xFF) << 8) | (soffset & 0xFF)
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
    let vdata = operand_at(operands, 0, &ctx.at)?;
    let vaddr = operand_at(operands, 1, &ctx.at)?;
    let srsrc = operand_at(operands, 2, &ctx.at)?;
    let soffset = operands.get(3);

    let rw = if entry.flags.no_dst { RwFlags::Read } else { RwFlags::Write };
    let delay_class = if entry.flags.no_dst { DelayClass::VmStore } else { DelayClass::VmLoad };
    push_usage(ctx, vdata, 1, FieldId::MVdata, rw);
    push_delayed(ctx, vdata, 1, delay_class, rw);
    push_usage(ctx, vaddr, 1, FieldId::MVaddr, RwFlags::Read);
    push_usage(ctx, srsrc, 4, FieldId::MSrsrc, RwFlags::Read);
    if let Some(soffset) = soffset {
        push_usage(ctx, soffset, 1, FieldId::MSoffset, RwFlags::Read);
    }

    let word1 = pack_word1(entry.opcode, false, false, false, 0);
    let word2 = pack_word2(
        vdata.bits(ctx.arch),
        vaddr.bits(ctx.arch),
        srsrc.bits(ctx.arch),
        soffset.map_or(0, |o| o.bits(ctx.arch)),
    );
    Ok(smallvec![word1, word2])
}

/// Decode a MUBUF/MTBUF word pair into `(op, vdata, vaddr, srsrc, soffset)`.
pub fn decode(word1: u32, word2: u32, arch: GcnArch) -> (u32, Operand, Operand, Operand, Operand) {
    let (op, _glc, _idxen, _offen, _offset) = unpack_word1(word1);
    let (vdata, vaddr, srsrc, soffset) = unpack_word2(word2);
    (
        op,
        decode_operand(vdata, 1, arch),
        decode_operand(vaddr, 1, arch),
        decode_operand(srsrc, 4, arch),
        decode_operand(soffset, 1, arch),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word1_round_trips() {
        let word = pack_word1(20, true, false, true, 0x0AB);
        assert_eq!(unpack_word1(word), (20, true, false, true, 0x0AB));
    }

    #[test]
    fn word2_round_trips() {
        let word = pack_word2(256 + 3, 256 + 4, 20, 96);
        assert_eq!(unpack_word2(word), (256 + 3, 256 + 4, 20, 96));
    }
}
