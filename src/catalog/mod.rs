//! The static instruction catalog and its two lookup structures.
//!
//! Modelled on a one-shot-built static table pattern, using
//! [`std::sync::OnceLock`] in place of a build-script-generated constant
//! table: the catalog here is small enough, and varied enough across six
//! architecture generations, that a runtime one-time build is a better fit
//! than a code-generator would be.

mod lookup;
mod table;

pub use lookup::{CatalogError, InstructionCatalog};
pub use table::{InstrFlags, InstructionEntry};

use std::sync::OnceLock;

static CATALOG: OnceLock<InstructionCatalog> = OnceLock::new();

/// The process-wide instruction catalog, built once on first access.
///
/// The reverse table is built once in a process-wide initializer protected
/// by a one-shot latch; all readers observe the fully-published table
/// thereafter. [`OnceLock`] is exactly that latch.
pub fn catalog() -> &'static InstructionCatalog {
    CATALOG.get_or_init(|| {
        InstructionCatalog::build(table::ROWS).expect("static catalog table is self-consistent")
    })
}
