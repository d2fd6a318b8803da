//! DPP and SDWA: the two lane-shuffle/byte-select suffix-word extensions to
//! VOP1/VOP2/VOPC's `src0` field.
//!
//! Both replace the plain 9-bit `src0` operand code with a sentinel value
//! (distinct from the literal-constant marker `0xFF`, and from every real
//! register/inline-constant code -- see the gaps `209..=239` and
//! `249..=250` that [`crate::isa::registers::decode_operand`] never
//! assigns) and append one extra 32-bit suffix word carrying the real
//! source operand plus the modifier's own fields. The sentinel value itself
//! moved once, between GCN 1.4 and GCN 1.5; both generations are checked
//! via [`GcnArch::is_gcn15_plus`].
//!
//! Suffix-word layouts here are this crate's own simplified, self-consistent
//! shapes (the same rationale as [`super::ds`]/[`super::flat`]'s two-word
//! layouts), not a bit-exact reproduction of the hardware's packed fields.

use crate::arch::GcnArch;

/// GCN 1.2-1.4's `src0` sentinel marking an SDWA suffix word.
const SDWA_SENTINEL_GCN12: u32 = 0xF9;
/// GCN 1.2-1.4's `src0` sentinel marking a DPP suffix word.
const DPP_SENTINEL_GCN12: u32 = 0xFA;
/// GCN 1.5+'s `src0` sentinel marking an SDWA suffix word.
const SDWA_SENTINEL_GCN15: u32 = 0xE9;
/// GCN 1.5+'s `src0` sentinel marking a DPP suffix word.
const DPP_SENTINEL_GCN15: u32 = 0xEA;

/// The `src0` sentinel this architecture uses for SDWA.
pub fn sdwa_sentinel(arch: GcnArch) -> u32 {
    if arch.is_gcn15_plus() {
        SDWA_SENTINEL_GCN15
    } else {
        SDWA_SENTINEL_GCN12
    }
}

/// The `src0` sentinel this architecture uses for DPP.
pub fn dpp_sentinel(arch: GcnArch) -> u32 {
    if arch.is_gcn15_plus() {
        DPP_SENTINEL_GCN15
    } else {
        DPP_SENTINEL_GCN12
    }
}

/// Is this `src0` field value the SDWA suffix-word sentinel for `arch`?
pub fn is_sdwa_src0(src0: u32, arch: GcnArch) -> bool {
    src0 == sdwa_sentinel(arch)
}

/// Is this `src0` field value the DPP suffix-word sentinel for `arch`?
pub fn is_dpp_src0(src0: u32, arch: GcnArch) -> bool {
    src0 == dpp_sentinel(arch)
}

/// A DPP (Data-Parallel Processing, cross-lane shuffle) suffix word's
/// fields, everything but the real `src0` register code itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DppModifiers {
    /// Row/lane shuffle selector (`dpp_ctrl`); interpretation is a fixed
    /// table of shuffle patterns this crate never needs to interpret.
    pub dpp_ctrl: u32,
    /// Row (group-of-4-lanes) mask: which lane rows participate.
    pub row_mask: u8,
    /// Bank (group-of-4-lanes-within-row) mask: which lane banks participate.
    pub bank_mask: u8,
    /// Whether out-of-range shuffle sources read `0` (`true`) or the
    /// unmodified destination lane (`false`).
    pub bound_ctrl: bool,
}

/// `src0(8) | dpp_ctrl(9) | bound_ctrl(1) | bank_mask(4) | row_mask(4)`.
pub(crate) fn pack_dpp_word(src0: u32, m: DppModifiers) -> u32 {
    (src0 & 0xFF)
        | ((m.dpp_ctrl & 0x1FF) << 8)
        | (u32::from(m.bound_ctrl) << 17)
        | ((u32::from(m.bank_mask) & 0xF) << 18)
        | ((u32::from(m.row_mask) & 0xF) << 22)
}

pub(crate) fn unpack_dpp_word(word: u32) -> (u32, DppModifiers) {
    let src0 = word & 0xFF;
    let modifiers = DppModifiers {
        dpp_ctrl: (word >> 8) & 0x1FF,
        bound_ctrl: (word >> 17) & 1 != 0,
        bank_mask: ((word >> 18) & 0xF) as u8,
        row_mask: ((word >> 22) & 0xF) as u8,
    };
    (src0, modifiers)
}

/// Which sub-field of a 32-bit operand an SDWA instruction reads/writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SdwaSel {
    /// Byte 0 (bits 7:0).
    Byte0,
    /// Byte 1 (bits 15:8).
    Byte1,
    /// Byte 2 (bits 23:16).
    Byte2,
    /// Byte 3 (bits 31:24).
    Byte3,
    /// Word 0 (bits 15:0).
    Word0,
    /// Word 1 (bits 31:16).
    Word1,
    /// The full dword.
    Dword,
}

impl SdwaSel {
    fn bits(self) -> u32 {
        match self {
            SdwaSel::Byte0 => 0,
            SdwaSel::Byte1 => 1,
            SdwaSel::Byte2 => 2,
            SdwaSel::Byte3 => 3,
            SdwaSel::Word0 => 4,
            SdwaSel::Word1 => 5,
            SdwaSel::Dword => 6,
        }
    }

    fn from_bits(bits: u32) -> SdwaSel {
        match bits {
            0 => SdwaSel::Byte0,
            1 => SdwaSel::Byte1,
            2 => SdwaSel::Byte2,
            3 => SdwaSel::Byte3,
            4 => SdwaSel::Word0,
            5 => SdwaSel::Word1,
            _ => SdwaSel::Dword,
        }
    }
}

impl core::fmt::Display for SdwaSel {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(match self {
            SdwaSel::Byte0 => "BYTE_0",
            SdwaSel::Byte1 => "BYTE_1",
            SdwaSel::Byte2 => "BYTE_2",
            SdwaSel::Byte3 => "BYTE_3",
            SdwaSel::Word0 => "WORD_0",
            SdwaSel::Word1 => "WORD_1",
            SdwaSel::Dword => "DWORD",
        })
    }
}

/// What an SDWA destination write does to the bits outside its `dst_sel`
/// sub-field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SdwaUnused {
    /// Bits outside `dst_sel` are zero-padded.
    Pad,
    /// Bits outside `dst_sel` are sign-extended from it.
    Sext,
    /// Bits outside `dst_sel` are left unmodified.
    Preserve,
}

impl SdwaUnused {
    fn bits(self) -> u32 {
        match self {
            SdwaUnused::Pad => 0,
            SdwaUnused::Sext => 1,
            SdwaUnused::Preserve => 2,
        }
    }

    fn from_bits(bits: u32) -> SdwaUnused {
        match bits {
            0 => SdwaUnused::Pad,
            1 => SdwaUnused::Sext,
            _ => SdwaUnused::Preserve,
        }
    }
}

impl core::fmt::Display for SdwaUnused {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(match self {
            SdwaUnused::Pad => "UNUSED_PAD",
            SdwaUnused::Sext => "UNUSED_SEXT",
            SdwaUnused::Preserve => "UNUSED_PRESERVE",
        })
    }
}

/// An SDWA (Sub-DWord Addressing, byte/word-lane select) suffix word's
/// fields, everything but the real `src0` register code itself.
///
/// `vopc_sdst` is only meaningful for a VOPC instruction under SDWA: unlike
/// its base encoding, which always compares into the implicit `vcc`, the
/// SDWA form can direct the comparison result at an explicit SGPR pair.
/// VOP1/VOP2 leave it at its default, `0`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SdwaModifiers {
    /// Which sub-field of the 32-bit destination is written.
    pub dst_sel: SdwaSel,
    /// What happens to destination bits outside `dst_sel`.
    pub dst_unused: SdwaUnused,
    /// Clamp the result to the destination format's representable range.
    pub clamp: bool,
    /// Which sub-field of the 32-bit `src0` is read.
    pub src0_sel: SdwaSel,
    /// Explicit SGPR-pair destination for a VOPC comparison result.
    pub vopc_sdst: u8,
}

/// `src0(8) | dst_sel(3) | dst_unused(2) | clamp(1) | src0_sel(3) | vopc_sdst(7)`.
pub(crate) fn pack_sdwa_word(src0: u32, m: SdwaModifiers) -> u32 {
    (src0 & 0xFF)
        | (m.dst_sel.bits() << 8)
        | (m.dst_unused.bits() << 11)
        | (u32::from(m.clamp) << 13)
        | (m.src0_sel.bits() << 14)
        | ((u32::from(m.vopc_sdst) & 0x7F) << 17)
}

pub(crate) fn unpack_sdwa_word(word: u32) -> (u32, SdwaModifiers) {
    let src0 = word & 0xFF;
    let modifiers = SdwaModifiers {
        dst_sel: SdwaSel::from_bits((word >> 8) & 0x7),
        dst_unused: SdwaUnused::from_bits((word >> 11) & 0x3),
        clamp: (word >> 13) & 1 != 0,
        src0_sel: SdwaSel::from_bits((word >> 14) & 0x7),
        vopc_sdst: ((word >> 17) & 0x7F) as u8,
    };
    (src0, modifiers)
}

/// A VOP1/VOP2/VOPC instruction's `src0`-slot modifier, if any: plain
/// (no suffix word), DPP, or SDWA.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VopModifier {
    /// No suffix word; `src0` names a plain register/inline-constant/literal.
    None,
    /// DPP (cross-lane shuffle) suffix word.
    Dpp(DppModifiers),
    /// SDWA (byte/word sub-field select) suffix word.
    Sdwa(SdwaModifiers),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpp_word_round_trips() {
        let m = DppModifiers {
            dpp_ctrl: 0x101,
            row_mask: 0xA,
            bank_mask: 0x5,
            bound_ctrl: true,
        };
        let word = pack_dpp_word(256 + 4, m);
        assert_eq!(unpack_dpp_word(word), (256 + 4, m));
    }

    #[test]
    fn sdwa_word_round_trips() {
        let m = SdwaModifiers {
            dst_sel: SdwaSel::Byte2,
            dst_unused: SdwaUnused::Sext,
            clamp: true,
            src0_sel: SdwaSel::Word1,
            vopc_sdst: 0x2A,
        };
        let word = pack_sdwa_word(7, m);
        assert_eq!(unpack_sdwa_word(word), (7, m));
    }

    #[test]
    fn sentinels_differ_by_generation() {
        assert_ne!(dpp_sentinel(GcnArch::Gcn1_2), dpp_sentinel(GcnArch::Gcn1_5));
        assert_ne!(sdwa_sentinel(GcnArch::Gcn1_4), sdwa_sentinel(GcnArch::Gcn1_5_1));
        assert!(is_dpp_src0(dpp_sentinel(GcnArch::Gcn1_0), GcnArch::Gcn1_0));
        assert!(is_sdwa_src0(sdwa_sentinel(GcnArch::Gcn1_5), GcnArch::Gcn1_5));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn sdwa_sel_strategy() -> impl Strategy<Value = SdwaSel> {
        prop_oneof![
            Just(SdwaSel::Byte0),
            Just(SdwaSel::Byte1),
            Just(SdwaSel::Byte2),
            Just(SdwaSel::Byte3),
            Just(SdwaSel::Word0),
            Just(SdwaSel::Word1),
            Just(SdwaSel::Dword),
        ]
    }

    fn sdwa_unused_strategy() -> impl Strategy<Value = SdwaUnused> {
        prop_oneof![
            Just(SdwaUnused::Pad),
            Just(SdwaUnused::Sext),
            Just(SdwaUnused::Preserve),
        ]
    }

    proptest! {
        #[test]
        fn dpp_round_trips(
            src0 in 0u32..0x100,
            dpp_ctrl in 0u32..0x200,
            row_mask in 0u8..0x10,
            bank_mask in 0u8..0x10,
            bound_ctrl in any::<bool>(),
        ) {
            let m = DppModifiers { dpp_ctrl, row_mask, bank_mask, bound_ctrl };
            let word = pack_dpp_word(src0, m);
            prop_assert_eq!(unpack_dpp_word(word), (src0, m));
        }

        #[test]
        fn sdwa_round_trips(
            src0 in 0u32..0x100,
            dst_sel in sdwa_sel_strategy(),
            dst_unused in sdwa_unused_strategy(),
            clamp in any::<bool>(),
            src0_sel in sdwa_sel_strategy(),
            vopc_sdst in 0u8..0x80,
        ) {
            let m = SdwaModifiers { dst_sel, dst_unused, clamp, src0_sel, vopc_sdst };
            let word = pack_sdwa_word(src0, m);
            prop_assert_eq!(unpack_sdwa_word(word), (src0, m));
        }
    }
}
