//! GCN machine code assembler/disassembler codec.
//!
//! This crate implements the hard core of a toolchain for AMD GCN
//! (Graphics Core Next) GPU machine code: bit-exact encoding and decoding
//! of every GCN instruction family across six architecture generations, a
//! symbolic register-variable model with per-field usage tracking, a
//! waitcnt/delayed-operation tracker, and a source-position handler for
//! diagnostics.
//!
//! Binary container formats (AMD Catalyst, AMD OpenCL 2.0, ROCm,
//! GalliumCompute), expression evaluation, macro expansion, and listing
//! output are external collaborators; this crate only defines the narrow
//! interfaces they consume (see [`reloc`], [`usage`], [`waitcnt`]).

#![deny(missing_docs)]
#![warn(unused_import_braces)]

pub mod arch;
pub mod binemit;
pub mod catalog;
pub mod disasm;
pub mod isa;
pub mod options;
pub mod regvar;
pub mod reloc;
pub mod result;
pub mod srcpos;
pub mod usage;
pub mod waitcnt;

pub use crate::arch::GcnArch;
pub use crate::options::AssemblerOptions;
pub use crate::result::{AsmError, AsmResult};

/// Version number of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
