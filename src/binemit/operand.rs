//! The value an encoder consumes for one operand slot: either a concrete,
//! already-numbered register/constant, or a not-yet-resolved regvar
//! reference.
//!
//! Follows the same "emit a placeholder, patch later" split used for
//! relocations elsewhere in this crate (a reloc site gets a provisional
//! value, then a later pass patches it once addresses are final): a
//! symbolic operand is encoded as an all-zero placeholder field, and the
//! [`crate::usage::RegVarUsage`] record pushed alongside it is what the
//! external register allocator uses to find and patch that field later.

use crate::isa::registers::{encode_operand, Operand, RegKind};
use crate::regvar::RegVarRef;
use crate::usage::UsageTarget;
use crate::arch::GcnArch;

/// One parsed operand, on its way into an encoder.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum OperandValue {
    /// A register, special register, or inline constant whose concrete
    /// encoding is already known.
    Concrete(Operand),
    /// A regvar sub-range reference; the allocator hasn't assigned concrete
    /// indices yet.
    Symbolic(RegVarRef, RegKind),
    /// A literal-constant operand, with its trailing 32-bit raw value
    /// already resolved by the caller's expression evaluator (out of this
    /// crate's scope). Encodes to the same operand-field code as
    /// [`Operand::Literal`]; the top-level [`super::encode::encode`] entry
    /// point is what appends `.0` as a trailing code word.
    Literal(u32),
}

impl OperandValue {
    /// The raw operand-field bits to write now. Symbolic operands encode as
    /// zero; the allocator patches the field in place once it resolves the
    /// regvar.
    pub fn bits(&self, arch: GcnArch) -> u32 {
        match *self {
            OperandValue::Concrete(op) => encode_operand(&op, arch),
            OperandValue::Symbolic(_, _) => 0,
            OperandValue::Literal(_) => encode_operand(&Operand::Literal, arch),
        }
    }

    /// The [`UsageTarget`] this operand contributes to its usage record.
    pub fn usage_target(&self) -> UsageTarget {
        match *self {
            OperandValue::Concrete(_) | OperandValue::Literal(_) => UsageTarget::Literal,
            OperandValue::Symbolic(r, _) => UsageTarget::RegVar(r),
        }
    }

    /// Does this operand name a real, distinct SGPR (for the single-SGPR
    /// scalar-source check)? Inline constants, the literal marker, and
    /// VGPRs never count.
    pub fn distinct_sgpr_identity(&self) -> Option<SgprIdentity> {
        match *self {
            OperandValue::Concrete(Operand::Scalar(r)) => Some(SgprIdentity::Literal(r.first)),
            OperandValue::Symbolic(r, RegKind::Scalar) => Some(SgprIdentity::RegVar(r.var)),
            _ => None,
        }
    }

    /// The trailing literal value this operand carries, if it is a literal.
    pub fn literal_value(&self) -> Option<u32> {
        match *self {
            OperandValue::Literal(v) => Some(v),
            _ => None,
        }
    }
}

/// What makes two scalar-source operands "the same SGPR" for the
/// single-SGPR constraint: either the same literal register index, or the
/// same regvar handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SgprIdentity {
    /// A literal register index.
    Literal(u32),
    /// A regvar handle.
    RegVar(crate::regvar::RegVarId),
}
