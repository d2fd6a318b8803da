//! VOP1/VOP2/VOPC: the single-word vector-ALU encodings.
//!
//! All three share one 32-bit shape: `class(1)=0 | prefix_or_op(6,
//! bits[30:25]) | field_a(8, bits[24:17]) | field_b(8, bits[16:9]) |
//! src0(9, bits[8:0])`. VOP1 fixes the prefix at `0x3F` and puts its
//! opcode in `field_b`; VOPC fixes the prefix at `0x3E` and puts its
//! opcode in `field_a` (VOPC has no destination field — the hardware
//! reuses the VOP1 destination's bit position for the opcode); VOP2 has no
//! fixed prefix at all, putting its own opcode directly in the six prefix
//! bits, which works because VOP2's legal opcode range never collides with
//! `0x3E`/`0x3F`. Grounded on `decodeVOP1Encoding`/`decodeVOP2Encoding`/
//! `decodeVOPCEncoding`.

use super::super::encode::{push_delayed, push_usage, EncodeCtx, EncodedWords};
use super::super::operand::OperandValue;
use super::dppsdwa::{self, VopModifier};
use crate::arch::GcnArch;
use crate::catalog::InstructionEntry;
use crate::isa::registers::{decode_operand, Operand, RegKind};
use crate::result::{AsmError, AsmResult};
use crate::srcpos::SourcePos;
use crate::usage::{FieldId, RwFlags};
use crate::waitcnt::DelayClass;
use smallvec::smallvec;

const VOP1_PREFIX: u32 = 0x3F;
const VOPC_PREFIX: u32 = 0x3E;

fn pack(prefix_or_op: u32, field_a: u32, field_b: u32, src0: u32) -> u32 {
    ((prefix_or_op & 0x3F) << 25) | ((field_a & 0xFF) << 17) | ((field_b & 0xFF) << 9) | (src0 & 0x1FF)
}

fn unpack(word: u32) -> (u32, u32, u32, u32) {
    (
        (word >> 25) & 0x3F,
        (word >> 17) & 0xFF,
        (word >> 9) & 0xFF,
        word & 0x1FF,
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

fn vgpr_bits(op: &OperandValue, arch: GcnArch) -> u32 {
    // VOP2/VOPC's second source is always a raw VGPR index (no +256 shift,
    // no inline-constant alternative), so strip the generic operand codec's
    // VGPR offset back off.
    const VGPR_OPERAND_BASE: u32 = 256;
    op.bits(arch).saturating_sub(VGPR_OPERAND_BASE)
}

/// Does a literal 32-bit constant word need to trail this instruction?
pub fn needs_literal(op: &OperandValue, arch: GcnArch) -> bool {
    matches!(op, OperandValue::Concrete(Operand::Literal) | OperandValue::Literal(_))
        || op.bits(arch) == 0xFF
}

/// Is `op` a VGPR? DPP only ever shuffles VGPR lanes, so this is the field
/// a DPP- or SDWA-modified `src0` belongs under: [`FieldId::DppSdwaSrc0`]
/// for a VGPR, [`FieldId::DppSdwaSsrc0`] for the SGPR/inline-constant kinds
/// only SDWA permits.
fn is_vector_operand(op: &OperandValue) -> bool {
    matches!(op, OperandValue::Concrete(Operand::Vector(_)))
        || matches!(op, OperandValue::Symbolic(_, RegKind::Vector))
}

fn dpp_sdwa_src0_field(op: &OperandValue) -> FieldId {
    if is_vector_operand(op) {
        FieldId::DppSdwaSrc0
    } else {
        FieldId::DppSdwaSsrc0
    }
}

pub(crate) fn encode_vop1(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    encode_vop1_with_modifier(entry, operands, ctx, &VopModifier::None)
}

pub(crate) fn encode_vop1_with_modifier(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
    modifier: &VopModifier,
) -> AsmResult<EncodedWords> {
    let dst = operand_at(operands, 0, &ctx.at)?;
    let src0 = operand_at(operands, 1, &ctx.at)?;
    push_usage(ctx, dst, 1, FieldId::VopVdst, RwFlags::Write);
    push_delayed(ctx, dst, 1, DelayClass::Valu, RwFlags::Write);
    match modifier {
        VopModifier::None => {
            push_usage(ctx, src0, 1, FieldId::VopSrc0, RwFlags::Read);
            let word = pack(VOP1_PREFIX, dst.bits(ctx.arch), entry.opcode, src0.bits(ctx.arch));
            Ok(smallvec![word])
        }
        VopModifier::Dpp(m) => {
            push_usage(ctx, src0, 1, dpp_sdwa_src0_field(src0), RwFlags::Read);
            let word1 = pack(VOP1_PREFIX, dst.bits(ctx.arch), entry.opcode, dppsdwa::dpp_sentinel(ctx.arch));
            let word2 = dppsdwa::pack_dpp_word(src0.bits(ctx.arch), *m);
            Ok(smallvec![word1, word2])
        }
        VopModifier::Sdwa(m) => {
            push_usage(ctx, src0, 1, dpp_sdwa_src0_field(src0), RwFlags::Read);
            let word1 = pack(VOP1_PREFIX, dst.bits(ctx.arch), entry.opcode, dppsdwa::sdwa_sentinel(ctx.arch));
            let word2 = dppsdwa::pack_sdwa_word(src0.bits(ctx.arch), *m);
            Ok(smallvec![word1, word2])
        }
    }
}

pub(crate) fn encode_vop2(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    encode_vop2_with_modifier(entry, operands, ctx, &VopModifier::None)
}

pub(crate) fn encode_vop2_with_modifier(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
    modifier: &VopModifier,
) -> AsmResult<EncodedWords> {
    let dst = operand_at(operands, 0, &ctx.at)?;
    let src0 = operand_at(operands, 1, &ctx.at)?;
    let vsrc1 = operand_at(operands, 2, &ctx.at)?;
    push_usage(ctx, dst, 1, FieldId::VopVdst, RwFlags::Write);
    push_delayed(ctx, dst, 1, DelayClass::Valu, RwFlags::Write);
    push_usage(ctx, vsrc1, 1, FieldId::VopVsrc1, RwFlags::Read);
    if entry.flags.implicit_vcc_src {
        push_usage(ctx, operand_at(operands, 3, &ctx.at)?, 1, FieldId::VopVccSsrc, RwFlags::Read);
    }
    match modifier {
        VopModifier::None => {
            push_usage(ctx, src0, 1, FieldId::VopSrc0, RwFlags::Read);
            let word = pack(
                entry.opcode,
                dst.bits(ctx.arch),
                vgpr_bits(vsrc1, ctx.arch),
                src0.bits(ctx.arch),
            );
            Ok(smallvec![word])
        }
        VopModifier::Dpp(m) => {
            push_usage(ctx, src0, 1, dpp_sdwa_src0_field(src0), RwFlags::Read);
            let word1 = pack(
                entry.opcode,
                dst.bits(ctx.arch),
                vgpr_bits(vsrc1, ctx.arch),
                dppsdwa::dpp_sentinel(ctx.arch),
            );
            let word2 = dppsdwa::pack_dpp_word(src0.bits(ctx.arch), *m);
            Ok(smallvec![word1, word2])
        }
        VopModifier::Sdwa(m) => {
            push_usage(ctx, src0, 1, dpp_sdwa_src0_field(src0), RwFlags::Read);
            let word1 = pack(
                entry.opcode,
                dst.bits(ctx.arch),
                vgpr_bits(vsrc1, ctx.arch),
                dppsdwa::sdwa_sentinel(ctx.arch),
            );
            let word2 = dppsdwa::pack_sdwa_word(src0.bits(ctx.arch), *m);
            Ok(smallvec![word1, word2])
        }
    }
}

pub(crate) fn encode_vopc(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    encode_vopc_with_modifier(entry, operands, ctx, &VopModifier::None)
}

pub(crate) fn encode_vopc_with_modifier(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
    modifier: &VopModifier,
) -> AsmResult<EncodedWords> {
    let src0 = operand_at(operands, 0, &ctx.at)?;
    let vsrc1 = operand_at(operands, 1, &ctx.at)?;
    push_usage(ctx, vsrc1, 1, FieldId::VopVsrc1, RwFlags::Read);
    match modifier {
        VopModifier::None => {
            push_usage(ctx, src0, 1, FieldId::VopSrc0, RwFlags::Read);
            let word = pack(
                VOPC_PREFIX,
                entry.opcode,
                vgpr_bits(vsrc1, ctx.arch),
                src0.bits(ctx.arch),
            );
            Ok(smallvec![word])
        }
        VopModifier::Dpp(m) => {
            push_usage(ctx, src0, 1, dpp_sdwa_src0_field(src0), RwFlags::Read);
            let word1 = pack(
                VOPC_PREFIX,
                entry.opcode,
                vgpr_bits(vsrc1, ctx.arch),
                dppsdwa::dpp_sentinel(ctx.arch),
            );
            let word2 = dppsdwa::pack_dpp_word(src0.bits(ctx.arch), *m);
            Ok(smallvec![word1, word2])
        }
        VopModifier::Sdwa(m) => {
            push_usage(ctx, src0, 1, dpp_sdwa_src0_field(src0), RwFlags::Read);
            let mut m = *m;
            if let Some(sdst) = operands.get(2) {
                push_usage(ctx, sdst, 1, FieldId::SdwaBSdst, RwFlags::Write);
                m.vopc_sdst = sdst.bits(ctx.arch) as u8;
            }
            let word1 = pack(
                VOPC_PREFIX,
                entry.opcode,
                vgpr_bits(vsrc1, ctx.arch),
                dppsdwa::sdwa_sentinel(ctx.arch),
            );
            let word2 = dppsdwa::pack_sdwa_word(src0.bits(ctx.arch), m);
            Ok(smallvec![word1, word2])
        }
    }
}

/// Decode a VOP1 word into `(vdst, op, src0)`.
pub fn decode_vop1(word: u32, arch: GcnArch) -> (Operand, u32, Operand) {
    let (_prefix, vdst, op, src0) = unpack(word);
    (decode_operand(vdst, 1, arch), op, decode_operand(src0, 1, arch))
}

/// Decode a VOP2 word into `(op, vdst, vsrc1, src0)`.
pub fn decode_vop2(word: u32, arch: GcnArch) -> (u32, Operand, Operand, Operand) {
    let (op, vdst, vsrc1, src0) = unpack(word);
    (
        op,
        decode_operand(vdst, 1, arch),
        Operand::Vector(crate::isa::registers::RegRange::single(
            crate::isa::registers::RegKind::Vector,
            vsrc1,
        )),
        decode_operand(src0, 1, arch),
    )
}

/// Decode a VOPC word into `(op, vsrc1, src0)`.
pub fn decode_vopc(word: u32, arch: GcnArch) -> (u32, Operand, Operand) {
    let (_prefix, op, vsrc1, src0) = unpack(word);
    (
        op,
        Operand::Vector(crate::isa::registers::RegRange::single(
            crate::isa::registers::RegKind::Vector,
            vsrc1,
        )),
        decode_operand(src0, 1, arch),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vop1_round_trips() {
        let word = pack(VOP1_PREFIX, 5, 1, 128);
        assert_eq!(unpack(word), (VOP1_PREFIX, 5, 1, 128));
    }

    #[test]
    fn vop2_round_trips_with_vgpr_src1() {
        let word = pack(3, 46, 22, 256 + 42);
        assert_eq!(unpack(word), (3, 46, 22, 256 + 42));
    }

    #[test]
    fn vopc_fixed_prefix_distinguishes_from_vop1() {
        let word = pack(VOPC_PREFIX, 0x58, 41, 256 + 72);
        let (prefix, op, vsrc1, src0) = unpack(word);
        assert_eq!(prefix, VOPC_PREFIX);
        assert_eq!(op, 0x58);
        assert_eq!(vsrc1, 41);
        assert_eq!(src0, 256 + 72);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn word_round_trips(
            prefix_or_op in 0u32..0x40,
            field_a in 0u32..0x100,
            field_b in 0u32..0x100,
            src0 in 0u32..0x200,
        ) {
            let word = pack(prefix_or_op, field_a, field_b, src0);
            prop_assert_eq!(unpack(word), (prefix_or_op, field_a, field_b, src0));
        }
    }
}

#[cfg(test)]
mod modifier_tests {
    use super::*;
    use crate::arch::ArchMask;
    use crate::catalog::{InstrFlags, InstructionEntry};
    use crate::isa::registers::RegRange;
    use crate::isa::EncodingFamily;
    use crate::usage::UsageStream;
    use crate::waitcnt::WaitcntStream;

    fn ctx<'a>(usage: &'a mut UsageStream, waitcnt: &'a mut WaitcntStream) -> EncodeCtx<'a> {
        EncodeCtx {
            arch: GcnArch::Gcn1_0,
            offset: 0,
            at: SourcePos::default(),
            usage,
            waitcnt,
        }
    }

    fn vgpr(n: u32) -> OperandValue {
        OperandValue::Concrete(Operand::Vector(RegRange::single(RegKind::Vector, n)))
    }

    fn sgpr(n: u32) -> OperandValue {
        OperandValue::Concrete(Operand::Scalar(RegRange::single(RegKind::Scalar, n)))
    }

    fn vop1_entry() -> InstructionEntry {
        InstructionEntry {
            mnemonic: "v_mov_b32",
            family: EncodingFamily::Vop1,
            opcode: 1,
            flags: InstrFlags::default(),
            archs: ArchMask::ALL,
        }
    }

    #[test]
    fn vop1_dpp_emits_suffix_word_with_real_src0() {
        let mut usage = UsageStream::new();
        let mut waitcnt = WaitcntStream::new();
        let mut c = ctx(&mut usage, &mut waitcnt);
        let entry = vop1_entry();
        let operands = [vgpr(5), vgpr(9)];
        let m = dppsdwa::DppModifiers {
            dpp_ctrl: 0x130,
            row_mask: 0xF,
            bank_mask: 0xF,
            bound_ctrl: true,
        };
        let words = encode_vop1_with_modifier(&entry, &operands, &mut c, &VopModifier::Dpp(m)).unwrap();
        assert_eq!(words.len(), 2);
        let (_, _, _, src0) = unpack(words[0]);
        assert_eq!(src0, dppsdwa::dpp_sentinel(GcnArch::Gcn1_0));
        let (real_src0, unpacked) = dppsdwa::unpack_dpp_word(words[1]);
        assert_eq!(real_src0, 256 + 9);
        assert_eq!(unpacked, m);
        assert_eq!(usage.len(), 2);
    }

    #[test]
    fn vop1_sdwa_with_scalar_src0_uses_ssrc0_field() {
        let mut usage = UsageStream::new();
        let mut waitcnt = WaitcntStream::new();
        let mut c = ctx(&mut usage, &mut waitcnt);
        let entry = vop1_entry();
        let operands = [vgpr(3), sgpr(12)];
        let m = dppsdwa::SdwaModifiers {
            dst_sel: dppsdwa::SdwaSel::Byte1,
            dst_unused: dppsdwa::SdwaUnused::Pad,
            clamp: false,
            src0_sel: dppsdwa::SdwaSel::Dword,
            vopc_sdst: 0,
        };
        let words = encode_vop1_with_modifier(&entry, &operands, &mut c, &VopModifier::Sdwa(m)).unwrap();
        assert_eq!(words.len(), 2);
        let (_, _, _, src0) = unpack(words[0]);
        assert_eq!(src0, dppsdwa::sdwa_sentinel(GcnArch::Gcn1_0));
        let (real_src0, unpacked) = dppsdwa::unpack_sdwa_word(words[1]);
        assert_eq!(real_src0, 12);
        assert_eq!(unpacked, m);
        assert_eq!(usage.len(), 2);
        assert!(usage.records_at(0).any(|u| u.field == FieldId::DppSdwaSsrc0));
    }

    #[test]
    fn vopc_sdwa_explicit_sdst_overrides_default() {
        let mut usage = UsageStream::new();
        let mut waitcnt = WaitcntStream::new();
        let mut c = ctx(&mut usage, &mut waitcnt);
        let entry = InstructionEntry {
            mnemonic: "v_cmp_eq_f32",
            family: EncodingFamily::Vopc,
            opcode: 2,
            flags: InstrFlags::default(),
            archs: ArchMask::ALL,
        };
        let operands = [vgpr(1), vgpr(2), sgpr(20)];
        let m = dppsdwa::SdwaModifiers {
            dst_sel: dppsdwa::SdwaSel::Dword,
            dst_unused: dppsdwa::SdwaUnused::Preserve,
            clamp: false,
            src0_sel: dppsdwa::SdwaSel::Dword,
            vopc_sdst: 0,
        };
        let words = encode_vopc_with_modifier(&entry, &operands, &mut c, &VopModifier::Sdwa(m)).unwrap();
        let (_, unpacked) = dppsdwa::unpack_sdwa_word(words[1]);
        assert_eq!(unpacked.vopc_sdst, 20);
        assert!(usage.records_at(0).any(|u| u.field == FieldId::SdwaBSdst));
    }
}
