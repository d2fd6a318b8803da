//! Forward (mnemonic → entry) and reverse (family × opcode × arch → entry)
//! lookup structures built once over the static catalog row list.

use super::table::InstructionEntry;
use crate::arch::GcnArch;
use crate::isa::EncodingFamily;
use std::collections::HashMap;
use std::fmt;

/// The catalog failed its build-time integrity check: two rows claimed the
/// same reverse-lookup slot with identical architecture masks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two rows claim the exact same `(family, opcode, arch)` slot.
    DuplicateExactMatch {
        /// The colliding encoding family.
        family: EncodingFamily,
        /// The colliding opcode.
        opcode: u32,
        /// The architecture both rows claim.
        arch: GcnArch,
        /// Mnemonic of the row that was already present.
        first: &'static str,
        /// Mnemonic of the row that tried to overwrite it.
        second: &'static str,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CatalogError::DuplicateExactMatch {
                family,
                opcode,
                arch,
                first,
                second,
            } => write!(
                f,
                "{} opcode {:#x} on {} claimed by both '{}' and '{}'",
                family, opcode, arch, first, second
            ),
        }
    }
}

/// The built catalog: a forward table keyed by mnemonic (the assembler's
/// entry point) and a reverse table keyed by `(family, opcode, arch)` (the
/// disassembler's entry point).
pub struct InstructionCatalog {
    forward: HashMap<&'static str, Vec<&'static InstructionEntry>>,
    reverse: HashMap<(EncodingFamily, u32, GcnArch), &'static InstructionEntry>,
}

impl InstructionCatalog {
    /// Build both tables from the static row list. `rows` must have
    /// `'static` lifetime since the published catalog is immutable after
    /// build and lives for the whole process, shared by every job.
    pub fn build(rows: &'static [InstructionEntry]) -> Result<Self, CatalogError> {
        let mut forward: HashMap<&'static str, Vec<&'static InstructionEntry>> = HashMap::new();
        let mut reverse: HashMap<(EncodingFamily, u32, GcnArch), &'static InstructionEntry> =
            HashMap::new();

        for entry in rows {
            forward.entry(entry.mnemonic).or_default().push(entry);

            for arch in GcnArch::ALL.iter().copied() {
                if !entry.archs.contains(arch) {
                    continue;
                }
                let key = (entry.family, entry.opcode, arch);
                if let Some(existing) = reverse.get(&key) {
                    if existing.archs.matches_exactly(entry.archs) {
                        return Err(CatalogError::DuplicateExactMatch {
                            family: entry.family,
                            opcode: entry.opcode,
                            arch,
                            first: existing.mnemonic,
                            second: entry.mnemonic,
                        });
                    }
                    // A later, more architecture-specific entry wins over a
                    // broader one when the match isn't an exact collision;
                    // fewer archs claimed counts as "more specific".
                    if entry.archs.0.count_ones() <= existing.archs.0.count_ones() {
                        continue;
                    }
                }
                reverse.insert(key, entry);
            }
        }

        Ok(InstructionCatalog { forward, reverse })
    }

    /// Find the catalog entry for `mnemonic` valid on `arch` (the
    /// assembler's entry point).
    pub fn lookup_mnemonic(
        &self,
        mnemonic: &str,
        arch: GcnArch,
    ) -> Option<&'static InstructionEntry> {
        self.forward
            .get(mnemonic)?
            .iter()
            .copied()
            .find(|entry| entry.archs.contains(arch))
    }

    /// Does the catalog know `mnemonic` at all (on any architecture)? Used
    /// to distinguish `UnknownInstruction` from `UnsupportedForArchitecture`.
    pub fn knows_mnemonic(&self, mnemonic: &str) -> bool {
        self.forward.contains_key(mnemonic)
    }

    /// Reverse-lookup an encoding (the disassembler's entry point). Returns
    /// `None` for an illegal encoding; the caller prints
    /// `<family>_ill_<opcode>` and continues.
    pub fn lookup_encoding(
        &self,
        family: EncodingFamily,
        opcode: u32,
        arch: GcnArch,
    ) -> Option<&'static InstructionEntry> {
        self.reverse.get(&(family, opcode, arch)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::table::ROWS;

    #[test]
    fn builds_without_error() {
        InstructionCatalog::build(ROWS).expect("static table is self-consistent");
    }

    #[test]
    fn forward_lookup_finds_known_mnemonic() {
        let cat = InstructionCatalog::build(ROWS).unwrap();
        let entry = cat
            .lookup_mnemonic("s_mov_b32", GcnArch::Gcn1_0)
            .expect("s_mov_b32 is in the catalog");
        assert_eq!(entry.mnemonic, "s_mov_b32");
    }

    #[test]
    fn reverse_lookup_round_trips_forward_entries() {
        let cat = InstructionCatalog::build(ROWS).unwrap();
        for arch in GcnArch::ALL.iter().copied() {
            if let Some(entry) = cat.lookup_mnemonic("s_endpgm", arch) {
                let back = cat
                    .lookup_encoding(entry.family, entry.opcode, arch)
                    .expect("reverse lookup should find what forward lookup found");
                assert_eq!(back.mnemonic, "s_endpgm");
            }
        }
    }

    #[test]
    fn arch_gated_mnemonic_absent_off_arch() {
        let cat = InstructionCatalog::build(ROWS).unwrap();
        assert!(cat.knows_mnemonic("global_load_dword"));
        assert!(cat
            .lookup_mnemonic("global_load_dword", GcnArch::Gcn1_0)
            .is_none());
        assert!(cat
            .lookup_mnemonic("global_load_dword", GcnArch::Gcn1_4)
            .is_some());
    }

    #[test]
    fn unknown_mnemonic_is_not_known() {
        let cat = InstructionCatalog::build(ROWS).unwrap();
        assert!(!cat.knows_mnemonic("not_a_real_instruction"));
    }
}
