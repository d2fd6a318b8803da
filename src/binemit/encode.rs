//! The top-level encode entry point: validates operands against an
//! [`InstructionEntry`]'s mode flags, dispatches to the family-specific
//! bit layout, and appends the resulting usage/delayed-op records.

use super::families;
use super::families::dppsdwa::VopModifier;
use super::operand::OperandValue;
use crate::arch::GcnArch;
use crate::catalog::InstructionEntry;
use crate::isa::EncodingFamily;
use crate::result::{AsmError, AsmResult};
use crate::srcpos::SourcePos;
use crate::usage::{FieldId, RegVarUsage, RwFlags, UsageStream};
use crate::waitcnt::{DelayClass, DelayedOp, WaitcntStream};
use smallvec::SmallVec;

/// The code words a single instruction encodes to. Most instructions are
/// one word; two-word families and literal-carrying forms use more.
pub type EncodedWords = SmallVec<[u32; 5]>;

/// Mutable encode-time context threaded through every family encoder:
/// where this instruction starts, which architecture it targets, and the
/// two side-streams it appends to.
pub struct EncodeCtx<'a> {
    /// Target architecture.
    pub arch: GcnArch,
    /// Code-stream byte offset this instruction starts at.
    pub offset: u32,
    /// Source position, for diagnostics.
    pub at: SourcePos,
    /// Register-usage side-stream.
    pub usage: &'a mut UsageStream,
    /// Delayed-op/wait side-stream.
    pub waitcnt: &'a mut WaitcntStream,
}

/// Encode one instruction: family, catalog entry, parsed operands and
/// target architecture in, code words and side-stream records out.
pub fn encode(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
) -> AsmResult<EncodedWords> {
    encode_with_modifier(entry, operands, ctx, &VopModifier::None)
}

/// Like [`encode`], but for a VOP1/VOP2/VOPC instruction lets the caller
/// request its `src0` operand be carried under a DPP or SDWA suffix word
/// instead of the plain single-word form. `modifier` is ignored for every
/// other family.
pub fn encode_with_modifier(
    entry: &InstructionEntry,
    operands: &[OperandValue],
    ctx: &mut EncodeCtx<'_>,
    modifier: &VopModifier,
) -> AsmResult<EncodedWords> {
    check_single_sgpr(entry.family, operands, &ctx.at)?;
    let literal = single_literal(operands, &ctx.at)?;

    let mut words = match entry.family {
        EncodingFamily::Sop1 => families::sop::encode_sop1(entry, operands, ctx),
        EncodingFamily::Sop2 => families::sop::encode_sop2(entry, operands, ctx),
        EncodingFamily::Sopc => families::sop::encode_sopc(entry, operands, ctx),
        EncodingFamily::Sopp => families::sop::encode_sopp(entry, operands, ctx),
        EncodingFamily::Sopk => families::sop::encode_sopk(entry, operands, ctx),
        EncodingFamily::Smem => families::smem::encode(entry, operands, ctx),
        EncodingFamily::Vop1 => families::vop::encode_vop1_with_modifier(entry, operands, ctx, modifier),
        EncodingFamily::Vop2 => families::vop::encode_vop2_with_modifier(entry, operands, ctx, modifier),
        EncodingFamily::Vopc => families::vop::encode_vopc_with_modifier(entry, operands, ctx, modifier),
        EncodingFamily::Vop3a => families::vop3::encode_vop3a(entry, operands, ctx),
        EncodingFamily::Vop3b => families::vop3::encode_vop3b(entry, operands, ctx),
        EncodingFamily::Vop3p => families::vop3::encode_vop3p(entry, operands, ctx),
        EncodingFamily::Vintrp => families::vintrp::encode(entry, operands, ctx),
        EncodingFamily::Ds => families::ds::encode(entry, operands, ctx),
        EncodingFamily::Mubuf | EncodingFamily::Mtbuf => {
            families::mubuf::encode(entry, operands, ctx)
        }
        EncodingFamily::Mimg => families::mimg::encode(entry, operands, ctx),
        EncodingFamily::Exp => families::exp::encode(entry, operands, ctx),
        EncodingFamily::Flat | EncodingFamily::Global | EncodingFamily::Scratch => {
            families::flat::encode(entry, operands, ctx)
        }
    }?;

    if let Some(v) = literal {
        words.push(v);
    }
    Ok(words)
}

/// At most one operand may carry a trailing literal constant. Returns the
/// literal's raw value, if any, for the caller to append after the
/// family-specific words.
fn single_literal(operands: &[OperandValue], at: &SourcePos) -> AsmResult<Option<u32>> {
    let mut found = None;
    for operand in operands {
        if let Some(v) = operand.literal_value() {
            if found.is_some() {
                return Err(AsmError::LiteralAfterLiteral { at: at.clone() });
            }
            found = Some(v);
        }
    }
    Ok(found)
}

/// Push one [`RegVarUsage`] record for `operand`, occupying `width`
/// registers starting at its own sub-range. One record is emitted per
/// operand field consumed, with precise (start, end) taken from the
/// operand and alignment set to `width`.
pub(crate) fn push_usage(
    ctx: &mut EncodeCtx<'_>,
    operand: &OperandValue,
    width: u8,
    field: FieldId,
    rw: RwFlags,
) {
    let (start, end) = match *operand {
        OperandValue::Concrete(_) | OperandValue::Literal(_) => (0, width),
        OperandValue::Symbolic(r, _) => (r.sub_start, r.sub_end),
    };
    ctx.usage.push(RegVarUsage {
        offset: ctx.offset,
        target: operand.usage_target(),
        start,
        end,
        field,
        rw,
        alignment: width,
    });
}

/// Push one [`DelayedOp`] record for `operand`'s sub-range, classifying it
/// under `delay_class` for the wait-insertion pass. Mirrors [`push_usage`]
/// but targets the waitcnt side-stream instead of the register-usage one.
pub(crate) fn push_delayed(
    ctx: &mut EncodeCtx<'_>,
    operand: &OperandValue,
    width: u8,
    delay_class: DelayClass,
    rw: RwFlags,
) {
    let (start, end) = match *operand {
        OperandValue::Concrete(_) | OperandValue::Literal(_) => (0, width),
        OperandValue::Symbolic(r, _) => (r.sub_start, r.sub_end),
    };
    ctx.waitcnt.push_delayed(DelayedOp {
        offset: ctx.offset,
        target: operand.usage_target(),
        start,
        end,
        delay_class,
        rw,
    });
}

/// The single-SGPR law: a VALU encoding may read at most one distinct SGPR
/// across all its scalar-source operands.
fn check_single_sgpr(
    family: EncodingFamily,
    operands: &[OperandValue],
    at: &SourcePos,
) -> AsmResult<()> {
    if !family.is_vector_alu() {
        return Ok(());
    }
    let mut seen = None;
    for operand in operands {
        if let Some(identity) = operand.distinct_sgpr_identity() {
            match seen {
                None => seen = Some(identity),
                Some(prev) if prev == identity => {}
                Some(_) => {
                    return Err(AsmError::MoreThanOneSGPRToRead { at: at.clone() })
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::registers::Operand;
    use crate::regvar::{RegVarRef, RegVarTable};
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

    #[test]
    fn one_literal_operand_appends_a_trailing_word() {
        let mut usage = UsageStream::new();
        let mut waitcnt = WaitcntStream::new();
        let mut c = ctx(&mut usage, &mut waitcnt);
        let entry = crate::catalog::catalog()
            .lookup_mnemonic("v_mov_b32", GcnArch::Gcn1_0)
            .unwrap();
        let operands = [
            OperandValue::Concrete(Operand::Vector(crate::isa::registers::RegRange::single(
                crate::isa::RegKind::Vector,
                4,
            ))),
            OperandValue::Literal(0x4048_0000),
        ];
        let words = encode(entry, &operands, &mut c).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[1], 0x4048_0000);
    }

    #[test]
    fn two_literal_operands_is_an_error() {
        let mut usage = UsageStream::new();
        let mut waitcnt = WaitcntStream::new();
        let mut c = ctx(&mut usage, &mut waitcnt);
        let entry = crate::catalog::catalog()
            .lookup_mnemonic("v_add_f32", GcnArch::Gcn1_0)
            .unwrap();
        let operands = [
            OperandValue::Concrete(Operand::Vector(crate::isa::registers::RegRange::single(
                crate::isa::RegKind::Vector,
                4,
            ))),
            OperandValue::Literal(1),
            OperandValue::Literal(2),
        ];
        let err = encode(entry, &operands, &mut c).unwrap_err();
        assert!(matches!(err, AsmError::LiteralAfterLiteral { .. }));
    }

    #[test]
    fn symbolic_operand_still_pushes_usage_with_its_own_subrange() {
        let mut usage = UsageStream::new();
        let mut waitcnt = WaitcntStream::new();
        let mut c = ctx(&mut usage, &mut waitcnt);
        let entry = crate::catalog::catalog()
            .lookup_mnemonic("s_mov_b32", GcnArch::Gcn1_0)
            .unwrap();
        let mut table = RegVarTable::new();
        let var = table.declare("tmp", crate::isa::RegKind::Scalar, 1);
        let operands = [
            OperandValue::Concrete(Operand::Scalar(crate::isa::registers::RegRange::single(
                crate::isa::RegKind::Scalar,
                7,
            ))),
            OperandValue::Symbolic(RegVarRef::whole(var, &table), crate::isa::RegKind::Scalar),
        ];
        encode(entry, &operands, &mut c).unwrap();
        assert_eq!(usage.len(), 2);
    }
}
