//! Operand- and register-level data shared by the encoder, decoder, and
//! usage tracker.
//!
//! Split into a static register-description module and a small enumerated
//! identifier module with `Display`/`FromStr`: the register-range and
//! special-register model lives in [`registers`], and the encoding-family
//! identifier lives in [`families`].

pub mod families;
pub mod registers;

pub use families::EncodingFamily;
pub use registers::{Operand, RegKind, RegRange, SpecialSReg};
