//! FLAT/GLOBAL/SCRATCH: the unified-address-space memory access family.
//! Flat, Global, and Scratch share one word layout distinguished only by
//! the `SEG` field.
//!
//! `word1 = class(6)=0b110111 | op(8) | seg(2) | glc(1) | slc(1) | reserved(14)`
//! `word2 = vdst(8) | data(8) | addr(8) | reserved(8)`

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

const CLASS: u32 = 0b110111;

/// `SEG` values distinguishing FLAT/GLOBAL/SCRATCH.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Seg {
    /// Unified flat address space (`flat_*`).
    Flat,
    /// Scratch (private) address space (`scratch_*`).
    Scratch,
    /// Global address space (`global_*`).
    Global,
}

impl Seg {
    fn bits(self) -> u32 {
        match self {
            Seg::Flat => 0,
            Seg::Scratch => 1,
            Seg::Global => 2,
        }
    }

    fn from_bits(bits: u32) -> Seg {
        match bits {
            1 => Seg::Scratch,
            2 => Seg::Global,
            _ => Seg::Flat,
        }
    }

    fn for_entry(entry: &InstructionEntry) -> Seg {
        if entry.flags.flat_global {
            Seg::Global
        } else if entry.flags.flat_scratch {
            Seg::Scratch
        } else {
            Seg::Flat
        }
    }
}

impl Seg {
    /// The delay class an instruction in this address space contributes to.
    /// Plain `Flat` hasn't resolved which backing store (global or scratch)
    /// will service the access, so it's classed with `FlatGlobal` — the
    /// common case and the one the wait-insertion pass already has a
    /// counter for.
    fn delay_class(self) -> DelayClass {
        match self {
            Seg::Flat | Seg::Global => DelayClass::FlatGlobal,
            Seg::Scratch => DelayClass::FlatScratch,
        }
    }
}

pub(crate) fn pack_word1(op: u32, seg: Seg, glc: bool, slc: bool) -> u32 {
    (CLASS << 26) | ((op & 0xFF) << 18) | ((seg.bits() & 0x3) << 16) | (u32::from(glc) << 15) | (u32::from(slc) << 14)
}

pub(crate) fn unpack_word1(word: u32) -> (u32, Seg, bool, bool) {
    (
        (word >> 18) & 0xFF,
        Seg::from_bits((word >> 16) & 0x3),
        (word >> 15) & 1 != 0,
        (word >> 14) & 1 != 0,
    )
}

pub(crate) fn pack_word2(vdst: u32, data: u32, addr: u32) -> u32 {
    ((vdst & 0xFF) << 24) | ((data & 0xFF) << 16) | ((addr & 0xFF) << 8)
}

pub(crate) fn unpack_word2(word: u32) -> (u32, u32, u32) {
    ((word >> 24) & 0xFF, (word >> 16) & 0xFF, (word >> 8) & 0xFF)
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
    let mut idx = 0;

    let seg = Seg::for_entry(entry);

    let vdst = if has_dst {
        let op = operand_at(operands, idx, &ctx.at)?;
        idx += 1;
        push_usage(ctx, op, 1, FieldId::FlatVdst, RwFlags::Write);
        push_delayed(ctx, op, 1, seg.delay_class(), RwFlags::Write);
        op.bits(ctx.arch)
    } else {
        0
    };

    let addr = operand_at(operands, idx, &ctx.at)?;
    idx += 1;
    push_usage(ctx, addr, 2, FieldId::FlatAddr, RwFlags::Read);

    let data_bits = if let Some(data) = operands.get(idx) {
        push_usage(ctx, data, 1, FieldId::FlatData, RwFlags::Read);
        if !has_dst {
            push_delayed(ctx, data, 1, seg.delay_class(), RwFlags::Read);
        }
        data.bits(ctx.arch)
    } else {
        0
    };

    let word1 = pack_word1(entry.opcode, seg, false, false);
    let word2 = pack_word2(vdst, data_bits, addr.bits(ctx.arch));
    Ok(smallvec![word1, word2])
}

/// Decode a FLAT/GLOBAL/SCRATCH word pair into `(op, seg, vdst, data, addr)`.
pub fn decode(word1: u32, word2: u32, arch: GcnArch) -> (u32, Seg, Operand, Operand, Operand) {
    let (op, seg, _glc, _slc) = unpack_word1(word1);
    let (vdst, data, addr) = unpack_word2(word2);
    (
        op,
        seg,
        decode_operand(vdst, 1, arch),
        decode_operand(data, 1, arch),
        decode_operand(addr, 2, arch),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word1_round_trips_with_seg() {
        let word = pack_word1(16, Seg::Global, true, false);
        assert_eq!(unpack_word1(word), (16, Seg::Global, true, false));
    }

    #[test]
    fn word2_round_trips() {
        let word = pack_word2(256 + 1, 256 + 2, 256 + 3);
        assert_eq!(unpack_word2(word), (256 + 1, 256 + 2, 256 + 3));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn seg_strategy() -> impl Strategy<Value = Seg> {
        prop_oneof![Just(Seg::Flat), Just(Seg::Scratch), Just(Seg::Global)]
    }

    proptest! {
        #[test]
        fn word1_round_trips(op in 0u32..0x100, seg in seg_strategy(), glc in any::<bool>(), slc in any::<bool>()) {
            let word = pack_word1(op, seg, glc, slc);
            prop_assert_eq!(unpack_word1(word), (op, seg, glc, slc));
        }

        #[test]
        fn word2_round_trips(vdst in 0u32..0x100, data in 0u32..0x100, addr in 0u32..0x100) {
            let word = pack_word2(vdst, data, addr);
            prop_assert_eq!(unpack_word2(word), (vdst, data, addr));
        }
    }
}
