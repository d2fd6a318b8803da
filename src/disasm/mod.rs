//! The disassembler pipeline: a size-and-label pre-scan ([`prescan`])
//! followed by a formatting pass ([`format`]) that turns each discovered
//! instruction into printed assembly text.

mod format;
mod prescan;

pub use format::{disassemble, DisasmOutput};
pub use prescan::{scan, InstrSite, PrescanResult};
