//! Encoding-family identifiers.
//!
//! A small closed set with `Display`/`FromStr` used both by the catalog
//! (each entry is tagged with the family it belongs to) and by the binary
//! emitter (dispatch to the right word-layout routine lives in
//! `binemit::families`, one module per variant here).
/// An encoding family: a distinct instruction-word layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EncodingFamily {
    /// Scalar ALU, one source, one destination.
    Sop1,
    /// Scalar ALU, two sources, one destination.
    Sop2,
    /// Scalar ALU comparison, result in SCC.
    Sopc,
    /// Scalar ALU program-control (branches, `s_endpgm`, `s_waitcnt`, ...).
    Sopp,
    /// Scalar ALU with a 16-bit inline literal operand.
    Sopk,
    /// Scalar memory read (`SMRD` on GCN 1.0/1.1, `SMEM` from GCN 1.2 on).
    Smem,
    /// Vector ALU, one source, one destination.
    Vop1,
    /// Vector ALU, two sources, one destination.
    Vop2,
    /// Vector ALU comparison, result in VCC or an SGPR pair.
    Vopc,
    /// Vector ALU, three operands, 32-bit encoding word pair, scalar form.
    Vop3a,
    /// Vector ALU, three operands, 32-bit encoding word pair, carry-out form.
    Vop3b,
    /// Vector ALU packed (two 16-bit lanes per operand), GCN 1.4+ only.
    Vop3p,
    /// Vector parameter interpolation (pixel shader attribute fetch).
    Vintrp,
    /// Local/shared data share memory access.
    Ds,
    /// Untyped buffer memory access.
    Mubuf,
    /// Typed buffer memory access.
    Mtbuf,
    /// Image/texture memory access.
    Mimg,
    /// Export (pixel/vertex shader output, parameter/position/render target).
    Exp,
    /// Flat (unified) memory access.
    Flat,
    /// Flat memory access explicitly targeting the global address space
    /// (GCN 1.4+).
    Global,
    /// Flat memory access explicitly targeting the scratch address space
    /// (GCN 1.4+).
    Scratch,
}

impl EncodingFamily {
    /// Every known family, in the order the catalog lists them.
    pub const ALL: [EncodingFamily; 21] = [
        EncodingFamily::Sop1,
        EncodingFamily::Sop2,
        EncodingFamily::Sopc,
        EncodingFamily::Sopp,
        EncodingFamily::Sopk,
        EncodingFamily::Smem,
        EncodingFamily::Vop1,
        EncodingFamily::Vop2,
        EncodingFamily::Vopc,
        EncodingFamily::Vop3a,
        EncodingFamily::Vop3b,
        EncodingFamily::Vop3p,
        EncodingFamily::Vintrp,
        EncodingFamily::Ds,
        EncodingFamily::Mubuf,
        EncodingFamily::Mtbuf,
        EncodingFamily::Mimg,
        EncodingFamily::Exp,
        EncodingFamily::Flat,
        EncodingFamily::Global,
        EncodingFamily::Scratch,
    ];

    /// Does this family's destination/source operand space use the VALU
    /// operand encoding (9-bit `src0`, inline constants, literal marker)?
    pub fn is_vector_alu(self) -> bool {
        matches!(
            self,
            EncodingFamily::Vop1
                | EncodingFamily::Vop2
                | EncodingFamily::Vopc
                | EncodingFamily::Vop3a
                | EncodingFamily::Vop3b
                | EncodingFamily::Vop3p
        )
    }

    /// Is this one of the three flat-memory sub-families sharing a single
    /// word layout distinguished only by `SEG`?
    pub fn is_flat_like(self) -> bool {
        matches!(
            self,
            EncodingFamily::Flat | EncodingFamily::Global | EncodingFamily::Scratch
        )
    }
}

impl EncodingFamily {
    /// The lowercase name used in both `Display` and anywhere a `&'static
    /// str` (rather than a formatted `String`) is needed, e.g.
    /// [`crate::result::DisasmWarning::IllegalEncoding`]'s `family` field.
    pub fn name(self) -> &'static str {
        match self {
            EncodingFamily::Sop1 => "sop1",
            EncodingFamily::Sop2 => "sop2",
            EncodingFamily::Sopc => "sopc",
            EncodingFamily::Sopp => "sopp",
            EncodingFamily::Sopk => "sopk",
            EncodingFamily::Smem => "smem",
            EncodingFamily::Vop1 => "vop1",
            EncodingFamily::Vop2 => "vop2",
            EncodingFamily::Vopc => "vopc",
            EncodingFamily::Vop3a => "vop3a",
            EncodingFamily::Vop3b => "vop3b",
            EncodingFamily::Vop3p => "vop3p",
            EncodingFamily::Vintrp => "vintrp",
            EncodingFamily::Ds => "ds",
            EncodingFamily::Mubuf => "mubuf",
            EncodingFamily::Mtbuf => "mtbuf",
            EncodingFamily::Mimg => "mimg",
            EncodingFamily::Exp => "exp",
            EncodingFamily::Flat => "flat",
            EncodingFamily::Global => "global",
            EncodingFamily::Scratch => "scratch",
        }
    }
}

impl core::fmt::Display for EncodingFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for EncodingFamily {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "sop1" => EncodingFamily::Sop1,
            "sop2" => EncodingFamily::Sop2,
            "sopc" => EncodingFamily::Sopc,
            "sopp" => EncodingFamily::Sopp,
            "sopk" => EncodingFamily::Sopk,
            "smem" => EncodingFamily::Smem,
            "vop1" => EncodingFamily::Vop1,
            "vop2" => EncodingFamily::Vop2,
            "vopc" => EncodingFamily::Vopc,
            "vop3a" => EncodingFamily::Vop3a,
            "vop3b" => EncodingFamily::Vop3b,
            "vop3p" => EncodingFamily::Vop3p,
            "vintrp" => EncodingFamily::Vintrp,
            "ds" => EncodingFamily::Ds,
            "mubuf" => EncodingFamily::Mubuf,
            "mtbuf" => EncodingFamily::Mtbuf,
            "mimg" => EncodingFamily::Mimg,
            "exp" => EncodingFamily::Exp,
            "flat" => EncodingFamily::Flat,
            "global" => EncodingFamily::Global,
            "scratch" => EncodingFamily::Scratch,
            _ => return Err(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_display_from_str() {
        for family in EncodingFamily::ALL.iter().copied() {
            let s = family.to_string();
            assert_eq!(s.parse::<EncodingFamily>().unwrap(), family);
        }
    }

    #[test]
    fn flat_like_subset() {
        assert!(EncodingFamily::Flat.is_flat_like());
        assert!(EncodingFamily::Global.is_flat_like());
        assert!(EncodingFamily::Scratch.is_flat_like());
        assert!(!EncodingFamily::Ds.is_flat_like());
    }
}
