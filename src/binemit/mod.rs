//! Binary code emission: the top-level [`encode`] entry point, the
//! [`OperandValue`] model that bridges parsed operands and not-yet-resolved
//! regvar references, and one submodule per encoding family under
//! [`families`].
//!
//! A thin top-level dispatcher over per-ISA encoder tables, with
//! relocation/fixup sites recorded alongside the emitted bytes rather than
//! patched in place.

pub mod encode;
mod families;
mod operand;

pub use encode::{encode, encode_with_modifier, EncodeCtx, EncodedWords};
pub use operand::{OperandValue, SgprIdentity};
pub use families::{dppsdwa, ds, exp, flat, mimg, mubuf, smem, sop, vintrp, vop, vop3};
