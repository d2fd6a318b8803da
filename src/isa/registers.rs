//! The GCN scalar/vector register model: real register ranges, the named
//! special-register aliases that share the scalar operand's index space,
//! inline constants, and the 9-bit operand codec that ties them together.
//!
//! One flat namespace of register banks, each bank owning a contiguous
//! index range with a name-prefix, tested with an encode/decode round-trip
//! style.

use crate::arch::GcnArch;
use core::fmt;

/// Which hardware register file an index is drawn from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RegKind {
    /// Scalar general-purpose register (`sN`), or one of the special
    /// aliases occupying indices above the real SGPR count.
    Scalar,
    /// Vector general-purpose register (`vN`), one per lane.
    Vector,
}

impl fmt::Display for RegKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            RegKind::Scalar => "s",
            RegKind::Vector => "v",
        })
    }
}

/// A contiguous range of registers of one kind, e.g. `s[4:7]` or `v12`.
///
/// `count` must be 1, 2, 4, 8, or 16; ranges of count > 1 must additionally
/// be naturally aligned to `count`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RegRange {
    /// Register file.
    pub kind: RegKind,
    /// Index of the first register in the range.
    pub first: u32,
    /// Number of registers in the range.
    pub count: u8,
}

impl RegRange {
    /// A single register.
    pub fn single(kind: RegKind, index: u32) -> RegRange {
        RegRange {
            kind,
            first: index,
            count: 1,
        }
    }

    /// Index one past the last register in the range.
    pub fn end(&self) -> u32 {
        self.first + u32::from(self.count)
    }

    /// Required alignment, in registers, for a range of this `count`.
    /// Only 1/2/4/8/16 are legal counts; anything else requires no
    /// alignment beyond its own width because it never arises from the
    /// catalog (callers that construct a `RegRange` directly, e.g. the
    /// regvar resolver, are expected to only ever produce these widths).
    pub fn required_alignment(count: u8) -> u32 {
        match count {
            1 => 1,
            2 => 2,
            4 => 4,
            8 => 8,
            16 => 16,
            other => u32::from(other).next_power_of_two(),
        }
    }

    /// Is `first` aligned to `required_alignment(count)`?
    pub fn is_aligned(&self) -> bool {
        self.first % Self::required_alignment(self.count) == 0
    }
}

impl fmt::Display for RegRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.count == 1 {
            write!(f, "{}{}", self.kind, self.first)
        } else {
            write!(f, "{}[{}:{}]", self.kind, self.first, self.end() - 1)
        }
    }
}

/// Named scalar-register aliases occupying the index range above the real
/// SGPR count, up to the literal-constant marker at 255.
///
/// `Ttmp12`..`Ttmp15` alias the same four index slots `TbaLo`..`TmaHi` use
/// on architectures before GCN 1.4: `trap_base`/`trap_memory` were removed
/// from the hardware when those four trap-handler scratch registers were
/// added, so the index meaning is architecture-dependent (see
/// [`index_to_special`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SpecialSReg {
    /// `flat_scratch_lo`, the flat-scratch base address's low half.
    FlatScratchLo,
    /// `flat_scratch_hi`.
    FlatScratchHi,
    /// `xnack_mask_lo`.
    XnackMaskLo,
    /// `xnack_mask_hi`.
    XnackMaskHi,
    /// `vcc_lo`, the vector-condition-code low half (lanes 0-31).
    VccLo,
    /// `vcc_hi` (lanes 32-63, wave64 mode only).
    VccHi,
    /// `tba_lo`, trap-handler base address low half (GCN 1.0-1.2).
    TbaLo,
    /// `tba_hi`.
    TbaHi,
    /// `tma_lo`, trap-handler temporary address low half (GCN 1.0-1.2).
    TmaLo,
    /// `tma_hi`.
    TmaHi,
    /// `ttmpN`, trap-handler temporary scratch register, `0 <= n <= 15`.
    Ttmp(u8),
    /// `m0`, the memory-register/LDS-offset-and-size register.
    M0,
    /// `exec_lo`, the execute mask's low half.
    ExecLo,
    /// `exec_hi`.
    ExecHi,
    /// `vccz`, "VCC is all zero" condition read.
    Vccz,
    /// `execz`, "EXEC is all zero" condition read.
    Execz,
    /// `scc`, the scalar condition code.
    Scc,
    /// `lds_direct`, reads the LDS direct-data path (VALU source only).
    LdsDirect,
}

impl SpecialSReg {
    /// Scalar-operand index this alias occupies for the given architecture.
    pub fn index(self, arch: GcnArch) -> u32 {
        match self {
            SpecialSReg::FlatScratchLo => 102,
            SpecialSReg::FlatScratchHi => 103,
            SpecialSReg::XnackMaskLo => 104,
            SpecialSReg::XnackMaskHi => 105,
            SpecialSReg::VccLo => 106,
            SpecialSReg::VccHi => 107,
            SpecialSReg::TbaLo => 108,
            SpecialSReg::TbaHi => 109,
            SpecialSReg::TmaLo => 110,
            SpecialSReg::TmaHi => 111,
            SpecialSReg::Ttmp(n) if n <= 11 => 112 + u32::from(n),
            SpecialSReg::Ttmp(n) if arch.is_gcn14_plus() && n <= 15 => {
                108 + (u32::from(n) - 12)
            }
            SpecialSReg::Ttmp(n) => panic!("ttmp{} not addressable on {}", n, arch),
            SpecialSReg::M0 => 124,
            SpecialSReg::ExecLo => 126,
            SpecialSReg::ExecHi => 127,
            SpecialSReg::Vccz => 251,
            SpecialSReg::Execz => 252,
            SpecialSReg::Scc => 253,
            SpecialSReg::LdsDirect => 254,
        }
    }

    /// Is this alias addressable on `arch`? `Tba`/`Tma` were removed from
    /// the hardware from GCN 1.4 on, freeing their index slots for
    /// `ttmp12..ttmp15`; the converse holds for those four `Ttmp` indices.
    pub fn available_on(self, arch: GcnArch) -> bool {
        match self {
            SpecialSReg::TbaLo | SpecialSReg::TbaHi | SpecialSReg::TmaLo | SpecialSReg::TmaHi => {
                !arch.is_gcn14_plus()
            }
            SpecialSReg::Ttmp(n) if n >= 12 => arch.is_gcn14_plus(),
            _ => true,
        }
    }
}

impl fmt::Display for SpecialSReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SpecialSReg::FlatScratchLo => f.write_str("flat_scratch_lo"),
            SpecialSReg::FlatScratchHi => f.write_str("flat_scratch_hi"),
            SpecialSReg::XnackMaskLo => f.write_str("xnack_mask_lo"),
            SpecialSReg::XnackMaskHi => f.write_str("xnack_mask_hi"),
            SpecialSReg::VccLo => f.write_str("vcc_lo"),
            SpecialSReg::VccHi => f.write_str("vcc_hi"),
            SpecialSReg::TbaLo => f.write_str("tba_lo"),
            SpecialSReg::TbaHi => f.write_str("tba_hi"),
            SpecialSReg::TmaLo => f.write_str("tma_lo"),
            SpecialSReg::TmaHi => f.write_str("tma_hi"),
            SpecialSReg::Ttmp(n) => write!(f, "ttmp{}", n),
            SpecialSReg::M0 => f.write_str("m0"),
            SpecialSReg::ExecLo => f.write_str("exec_lo"),
            SpecialSReg::ExecHi => f.write_str("exec_hi"),
            SpecialSReg::Vccz => f.write_str("vccz"),
            SpecialSReg::Execz => f.write_str("execz"),
            SpecialSReg::Scc => f.write_str("scc"),
            SpecialSReg::LdsDirect => f.write_str("lds_direct"),
        }
    }
}

/// Reverse-map a scalar-operand index in `102..=127` or `251..=254` back to
/// its named alias for `arch`. Returns `None` for indices that are real
/// SGPRs, inline constants, or unassigned on every architecture.
pub fn index_to_special(index: u32, arch: GcnArch) -> Option<SpecialSReg> {
    let candidate = match index {
        102 => SpecialSReg::FlatScratchLo,
        103 => SpecialSReg::FlatScratchHi,
        104 => SpecialSReg::XnackMaskLo,
        105 => SpecialSReg::XnackMaskHi,
        106 => SpecialSReg::VccLo,
        107 => SpecialSReg::VccHi,
        108 if !arch.is_gcn14_plus() => SpecialSReg::TbaLo,
        108 => SpecialSReg::Ttmp(12),
        109 if !arch.is_gcn14_plus() => SpecialSReg::TbaHi,
        109 => SpecialSReg::Ttmp(13),
        110 if !arch.is_gcn14_plus() => SpecialSReg::TmaLo,
        110 => SpecialSReg::Ttmp(14),
        111 if !arch.is_gcn14_plus() => SpecialSReg::TmaHi,
        111 => SpecialSReg::Ttmp(15),
        112..=123 => SpecialSReg::Ttmp((index - 112) as u8),
        124 => SpecialSReg::M0,
        126 => SpecialSReg::ExecLo,
        127 => SpecialSReg::ExecHi,
        251 => SpecialSReg::Vccz,
        252 => SpecialSReg::Execz,
        253 => SpecialSReg::Scc,
        254 => SpecialSReg::LdsDirect,
        _ => return None,
    };
    Some(candidate)
}

/// Decode an inline integer constant from its `128..=208` operand code, or
/// `None` if `code` is outside that range.
pub fn decode_inline_int(code: u32) -> Option<i32> {
    match code {
        128..=192 => Some((code - 128) as i32),
        193..=208 => Some(-((code - 192) as i32)),
        _ => None,
    }
}

/// Encode a small integer as an inline-constant operand code, or `None` if
/// it is outside the representable range `-16..=64`.
pub fn encode_inline_int(value: i32) -> Option<u32> {
    match value {
        0..=64 => Some(128 + value as u32),
        -16..=-1 => Some(192 + (-value) as u32),
        _ => None,
    }
}

/// The eight inline floating-point constants plus `1/(2*pi)`.
pub const INLINE_FLOATS: [(u32, f32); 9] = [
    (240, 0.5),
    (241, -0.5),
    (242, 1.0),
    (243, -1.0),
    (244, 2.0),
    (245, -2.0),
    (246, 4.0),
    (247, -4.0),
    (248, 0.159_154_94), // 1 / (2*pi), GCN 1.2+ only
];

/// Decode an inline floating-point constant, or `None` if `code` does not
/// name one. `arch` gates `1/(2*pi)` (code 248), which GCN 1.0/1.1 lack.
pub fn decode_inline_float(code: u32, arch: GcnArch) -> Option<f32> {
    if code == 248 && !arch.is_gcn12_plus() {
        return None;
    }
    INLINE_FLOATS
        .iter()
        .find(|&&(c, _)| c == code)
        .map(|&(_, v)| v)
}

/// Encode a floating-point value as an inline-constant operand code.
pub fn encode_inline_float(value: f32, arch: GcnArch) -> Option<u32> {
    INLINE_FLOATS
        .iter()
        .find(|&&(c, v)| v == value && (c != 248 || arch.is_gcn12_plus()))
        .map(|&(c, _)| c)
}

/// A decoded value of the shared 9-bit scalar/vector source-operand field
/// (`SSRC0`/`SSRC1`/`SDST` and VALU `SRC0`), with the VGPR sub-range
/// represented as indices `256..=511` (operand code minus
/// [`VGPR_OPERAND_BASE`] gives the real VGPR index), matching the GCN
/// hardware encoding so the catalog's per-instruction operand-width table
/// can key directly off it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Operand {
    /// A real scalar register, or a range starting at one.
    Scalar(RegRange),
    /// A real vector register, or a range starting at one (VALU `SRC0` and
    /// `VSRC1`/`VSRC2` fields only).
    Vector(RegRange),
    /// A named special-register alias.
    Special(SpecialSReg),
    /// A small inline integer constant.
    InlineInt(i32),
    /// An inline floating-point constant.
    InlineFloat(f32),
    /// The literal-constant marker: the actual 32-bit value follows the
    /// instruction word(s) in the code stream.
    Literal,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operand::Scalar(r) => write!(f, "{}", r),
            Operand::Vector(r) => write!(f, "{}", r),
            Operand::Special(special) => write!(f, "{}", special),
            Operand::InlineInt(v) => write!(f, "{}", v),
            Operand::InlineFloat(v) => write!(f, "{}", v),
            Operand::Literal => f.write_str("lit"),
        }
    }
}

/// Operand-code offset at which the VGPR sub-range begins within the 9-bit
/// scalar/vector operand field: a VALU source operand that is a VGPR is
/// encoded as 256 + register index, sharing the SGPR/special/inline-constant
/// operand's code space.
pub const VGPR_OPERAND_BASE: u32 = 256;

/// Decode a raw 9-bit operand code (`0..=511`) into an [`Operand`].
/// `count` is the register-range width implied by the instruction's
/// operand-size table (1 for 32-bit operands, 2/4/8/16 for wider ones);
/// it only affects the `Scalar`/`Vector` cases.
pub fn decode_operand(code: u32, count: u8, arch: GcnArch) -> Operand {
    if code >= VGPR_OPERAND_BASE {
        return Operand::Vector(RegRange {
            kind: RegKind::Vector,
            first: code - VGPR_OPERAND_BASE,
            count,
        });
    }
    if let Some(v) = decode_inline_int(code) {
        return Operand::InlineInt(v);
    }
    if let Some(v) = decode_inline_float(code, arch) {
        return Operand::InlineFloat(v);
    }
    if code == 255 {
        return Operand::Literal;
    }
    if let Some(special) = index_to_special(code, arch) {
        return Operand::Special(special);
    }
    Operand::Scalar(RegRange {
        kind: RegKind::Scalar,
        first: code,
        count,
    })
}

/// Encode an [`Operand`] back to its raw 9-bit operand code.
pub fn encode_operand(op: &Operand, arch: GcnArch) -> u32 {
    match *op {
        Operand::Scalar(r) => r.first,
        Operand::Vector(r) => VGPR_OPERAND_BASE + r.first,
        Operand::Special(special) => special.index(arch),
        Operand::InlineInt(v) => {
            encode_inline_int(v).expect("inline int out of -16..=64 range")
        }
        Operand::InlineFloat(v) => {
            encode_inline_float(v, arch).expect("value is not one of the inline float constants")
        }
        Operand::Literal => 255,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reg_range_display() {
        let single = RegRange::single(RegKind::Scalar, 7);
        assert_eq!(single.to_string(), "s7");
        let range = RegRange {
            kind: RegKind::Scalar,
            first: 20,
            count: 4,
        };
        assert_eq!(range.to_string(), "s[20:23]");
    }

    #[test]
    fn alignment_rules() {
        let ok = RegRange {
            kind: RegKind::Scalar,
            first: 4,
            count: 4,
        };
        assert!(ok.is_aligned());
        let bad = RegRange {
            kind: RegKind::Scalar,
            first: 2,
            count: 4,
        };
        assert!(!bad.is_aligned());
    }

    #[test]
    fn inline_int_round_trip() {
        for v in -16..=64 {
            let code = encode_inline_int(v).unwrap();
            assert_eq!(decode_inline_int(code), Some(v));
        }
        assert_eq!(encode_inline_int(65), None);
        assert_eq!(encode_inline_int(-17), None);
    }

    #[test]
    fn inline_float_round_trip() {
        for &(code, v) in INLINE_FLOATS[..8].iter() {
            assert_eq!(decode_inline_float(code, GcnArch::Gcn1_0), Some(v));
            assert_eq!(encode_inline_float(v, GcnArch::Gcn1_0), Some(code));
        }
        // 1/(2*pi) is GCN 1.2+ only.
        assert_eq!(decode_inline_float(248, GcnArch::Gcn1_0), None);
        assert_eq!(decode_inline_float(248, GcnArch::Gcn1_2).is_some(), true);
    }

    #[test]
    fn special_register_round_trip() {
        for arch in GcnArch::ALL.iter().copied() {
            for index in 102u32..=127 {
                if let Some(special) = index_to_special(index, arch) {
                    if special.available_on(arch) {
                        assert_eq!(special.index(arch), index);
                    }
                }
            }
        }
    }

    #[test]
    fn ttmp_slot_reassignment_across_generations() {
        assert_eq!(index_to_special(108, GcnArch::Gcn1_0), Some(SpecialSReg::TbaLo));
        assert_eq!(
            index_to_special(108, GcnArch::Gcn1_4),
            Some(SpecialSReg::Ttmp(12))
        );
    }

    #[test]
    fn operand_decode_vgpr_offset() {
        let op = decode_operand(256 + 42, 1, GcnArch::Gcn1_0);
        assert_eq!(
            op,
            Operand::Vector(RegRange {
                kind: RegKind::Vector,
                first: 42,
                count: 1
            })
        );
        assert_eq!(encode_operand(&op, GcnArch::Gcn1_0), 256 + 42);
    }

    #[test]
    fn operand_decode_literal_and_vcc() {
        assert_eq!(decode_operand(255, 1, GcnArch::Gcn1_0), Operand::Literal);
        assert_eq!(
            decode_operand(106, 1, GcnArch::Gcn1_0),
            Operand::Special(SpecialSReg::VccLo)
        );
    }
}
