//! Error types shared by the encode and decode paths.

use crate::arch::GcnArch;
use crate::srcpos::SourcePos;
use failure_derive::Fail;

/// A codec-level error, carrying the [`SourcePos`] of the instruction that
/// triggered it when one is available (encode-side errors always have one;
/// the corrupt-catalog error is raised before any source is read).
#[derive(Debug, Fail)]
pub enum AsmError {
    /// Mnemonic not present in the catalog for the requested architecture.
    #[fail(display = "{}: unknown instruction '{}' for {}", at, mnemonic, arch)]
    UnknownInstruction {
        /// Source position of the offending line.
        at: SourcePos,
        /// The mnemonic as written.
        mnemonic: String,
        /// Target architecture.
        arch: GcnArch,
    },

    /// An operand's register kind (scalar/vector) or width didn't match
    /// what the instruction entry requires.
    #[fail(display = "{}: operand {} kind mismatch: {}", at, operand_index, detail)]
    OperandKindMismatch {
        /// Source position.
        at: SourcePos,
        /// Zero-based operand index.
        operand_index: usize,
        /// Human-readable detail ("expected VGPR, found SGPR").
        detail: String,
    },

    /// A scalar register range of count > 1 was not naturally aligned.
    #[fail(
        display = "{}: register range s[{}:{}] is not aligned to {}",
        at, first, last, required_alignment
    )]
    RegisterRangeMisaligned {
        /// Source position.
        at: SourcePos,
        /// First register index.
        first: u32,
        /// Last register index (inclusive).
        last: u32,
        /// Required alignment in registers.
        required_alignment: u32,
    },

    /// More than one literal 32-bit word was requested by a single
    /// instruction encoding.
    #[fail(display = "{}: only one literal constant is allowed per instruction", at)]
    LiteralAfterLiteral {
        /// Source position.
        at: SourcePos,
    },

    /// A modifier was attached to an instruction that does not support it.
    #[fail(display = "{}: modifier '{}' is not valid here", at, modifier)]
    InvalidModifier {
        /// Source position.
        at: SourcePos,
        /// The modifier keyword.
        modifier: String,
    },

    /// Two modifiers on the same instruction contradict each other.
    #[fail(display = "{}: modifiers '{}' and '{}' conflict", at, first, second)]
    ModifierConflict {
        /// Source position.
        at: SourcePos,
        /// First modifier keyword.
        first: String,
        /// Second modifier keyword.
        second: String,
    },

    /// More than one distinct SGPR was read as a scalar source by a single
    /// VALU instruction.
    #[fail(display = "{}: more than one SGPR register to read", at)]
    MoreThanOneSGPRToRead {
        /// Source position.
        at: SourcePos,
    },

    /// A resolved SOPP branch displacement did not fit in a signed 16-bit
    /// word count.
    #[fail(
        display = "{}: branch distance {} words is out of range (+/-0x7FFF)",
        at, words
    )]
    BranchOutOfRange {
        /// Source position.
        at: SourcePos,
        /// Signed branch distance, in words.
        words: i64,
    },

    /// The instruction exists in the catalog but not for the requested
    /// architecture.
    #[fail(
        display = "{}: '{}' is not supported on {}",
        at, mnemonic, arch
    )]
    UnsupportedForArchitecture {
        /// Source position.
        at: SourcePos,
        /// The mnemonic as written.
        mnemonic: String,
        /// Target architecture.
        arch: GcnArch,
    },

    /// The reverse-lookup table failed its build-time integrity check
    /// (duplicate architecture-exact slot, or a base offset out of range).
    #[fail(display = "corrupt instruction catalog: {}", detail)]
    CorruptCatalog {
        /// Human-readable detail.
        detail: String,
    },

    /// After regvar resolution, a register index fell outside the range
    /// the hardware supports for its kind.
    #[fail(
        display = "register index {} is out of hardware range (max {})",
        index, max
    )]
    RegisterIndexOutOfRange {
        /// The out-of-range index.
        index: u32,
        /// The maximum valid index (inclusive).
        max: u32,
    },
}

/// Result type used throughout the encode path.
pub type AsmResult<T> = Result<T, AsmError>;

/// A decode-side diagnostic. Unlike [`AsmError`], these never abort
/// decoding; the disassembler logs them and substitutes a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisasmWarning {
    /// No catalog entry matched `(family, opcode, arch)`.
    IllegalEncoding {
        /// Byte offset of the instruction.
        offset: u32,
        /// Encoding family name, for the `<family>_ill_<opcode>` mnemonic.
        family: &'static str,
        /// The raw opcode field.
        opcode: u32,
    },
    /// The code buffer ended in the middle of what looked like a
    /// multi-word instruction.
    TruncatedInstruction {
        /// Byte offset where decoding stopped.
        offset: u32,
    },
    /// A field that carries no defined meaning for this instruction held a
    /// nonzero value; it round-trips as a `field=0xNN` tail.
    UnusedNonzeroField {
        /// Byte offset of the instruction.
        offset: u32,
        /// Field name.
        field: &'static str,
        /// The field's raw value.
        value: u32,
    },
}
