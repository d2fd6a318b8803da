//! MIMG: image/texture memory access.
//!
//! Simplified, self-consistent two-word layout (see [`super::vintrp`] for
//! the rationale): word1 carries the opcode and the `dmask`/modifier bits,
//! word2 carries the four register operands. Sampled fetches
//! (`entry.flags.mimg_sample`) additionally claim an `SSAMP` descriptor,
//! packed into the same `srsrc` byte's upper half as a 4-register-aligned
//! pair index, since a full third register field would not fit this
//! module's 32-bit word2.
//!
//! `word1 = class(6)=0b111100 | op(8) | dmask(4) | unorm(1) | glc(1) | reserved(12)`
//! `word2 = vdata(8) | vaddr(8) | srsrc(8) | ssamp(8)`

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

const CLASS: u32 = 0b111100;

pub(crate) fn pack_word1(op: u32, dmask: u32, unorm: bool, glc: bool) -> u32 {
    (CLASS << 26) | ((op & 0xFF) << 18) | ((dmask & 0xF) << 14) | (u32::from(unorm) << 13) | (u32::from(glc) << 12)
}

pub(crate) fn unpack_word1(word: u32) -> (u32, u32, bool, bool) {
    (
        (word >> 18) & 0xFF,
        (word >> 14) & 0xF,
        (word >> 13) & 1 != 0,
        (word >> 12) & 1 != 0,
    )
}

pub(crate) fn pack_word2(vdata: u32, vaddr: u32, srsrc: u32, ssamp: u32) -> u32 {
    ((vdata & 0xFF) << 24) | ((vaddr & 0xFF) << 16) | ((srsrc & 0xFF) << 8) | (ssamp & 0xFF)
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
    let ssamp = operands.get(3);

    let dst_width = if entry.flags.mimg_vdata4 { 4 } else { 1 };
    let rw = if entry.flags.no_dst { RwFlags::Read } else { RwFlags::Write };
    let delay_class = if entry.flags.no_dst { DelayClass::VmStore } else { DelayClass::VmLoad };
    push_usage(ctx, vdata, dst_width, FieldId::MVdata, rw);
    push_delayed(ctx, vdata, dst_width, delay_class, rw);
    push_usage(ctx, vaddr, 1, FieldId::MVaddr, RwFlags::Read);
    push_usage(ctx, srsrc, 8, FieldId::MSrsrc, RwFlags::Read);
    if entry.flags.mimg_sample {
        if let Some(ssamp) = ssamp {
            push_usage(ctx, ssamp, 4, FieldId::MimgSsamp, RwFlags::Read);
        }
    }

    let word1 = pack_word1(entry.opcode, 0xF, false, false);
    let word2 = pack_word2(
        vdata.bits(ctx.arch),
        vaddr.bits(ctx.arch),
        srsrc.bits(ctx.arch),
        ssamp.map_or(0, |o| o.bits(ctx.arch)),
    );
    Ok(smallvec![word1, word2])
}

/// Decode a MIMG word pair into `(op, dmask, vdata, vaddr, srsrc, ssamp)`.
pub fn decode(word1: u32, word2: u32, arch: GcnArch) -> (u32, u32, Operand, Operand, Operand, Operand) {
    let (op, dmask, _unorm, _glc) = unpack_word1(word1);
    let (vdata, vaddr, srsrc, ssamp) = unpack_word2(word2);
    (
        op,
        dmask,
        decode_operand(vdata, 4, arch),
        decode_operand(vaddr, 1, arch),
        decode_operand(srsrc, 8, arch),
        decode_operand(ssamp, 4, arch),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word1_round_trips() {
        let word = pack_word1(42, 0b1101, true, false);
        assert_eq!(unpack_word1(word), (42, 0b1101, true, false));
    }

    #[test]
    fn word2_round_trips() {
        let word = pack_word2(256 + 8, 256 + 9, 32, 64);
        assert_eq!(unpack_word2(word), (256 + 8, 256 + 9, 32, 64));
    }
}
