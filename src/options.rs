//! Caller-supplied configuration for a single assemble or disassemble job.
//!
//! The codec has no global settings object (there is no flag/template DSL
//! in this domain the way `cranelift_codegen::settings` has one for target
//! CPU features); instead each job is configured directly through this
//! small struct, constructed once per [`crate::GcnArch`] choice.

/// Options controlling the disassembler's text output and the
/// assembler's strictness around ambiguous-but-legal encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// When decoding, treat a nonzero "unused" field as a warning
    /// (`field=0xNN` tail, default) rather than a hard decode error.
    pub tolerate_unused_nonzero_fields: bool,

    /// Prefix each disassembled instruction's text line with its raw hex
    /// code words.
    pub emit_hex_code_prefix: bool,

    /// Prefix each disassembled instruction's text line with its code
    /// offset.
    pub emit_code_position_prefix: bool,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        AssemblerOptions {
            tolerate_unused_nonzero_fields: true,
            emit_hex_code_prefix: false,
            emit_code_position_prefix: false,
        }
    }
}
