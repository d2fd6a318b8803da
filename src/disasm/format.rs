//! Stage B of the disassembler pipeline: turns the instruction boundaries
//! [`super::prescan`] found into printable assembly text, one line per
//! instruction, in the fixed operand and modifier order the encoder itself
//! reads operands in.
//!
//! Grounded on the reference disassembler's per-family `decodeXxxEncoding`
//! print routines, reusing this crate's own `binemit::families::*::decode*`
//! functions rather than re-deriving the bit layouts a second time.

use crate::arch::GcnArch;
use crate::binemit::{ds, exp, flat, mimg, mubuf, smem, sop, vintrp, vop, vop3};
use crate::catalog::{catalog, InstructionCatalog, InstructionEntry};
use crate::isa::registers::Operand;
use crate::isa::EncodingFamily;
use crate::options::AssemblerOptions;
use crate::reloc::{LabelTable, RelocTable};
use crate::result::DisasmWarning;
use crate::waitcnt;
use log::debug;

use super::prescan::{self, InstrSite};

/// SOPP opcode carrying the `s_waitcnt` counter immediate. The catalog has
/// no per-opcode mode flag for SOPP the way it does for SOPK, so this and
/// the opcode below are matched directly, mirroring the hardcoded opcode
/// checks in [`prescan::is_branch_opcode`].
const SOPP_OP_WAITCNT: u32 = 12;
/// SOPP opcode carrying the `sendmsg` immediate.
const SOPP_OP_SENDMSG: u32 = 16;

/// The fully formatted output of a disassembler run.
#[derive(Debug)]
pub struct DisasmOutput {
    /// One text line per instruction, in code order.
    pub lines: Vec<String>,
    /// Diagnostics raised while scanning or formatting.
    pub warnings: Vec<DisasmWarning>,
    /// Labels discovered for branch targets.
    pub labels: LabelTable,
}

/// Run both pipeline stages over `code` and return formatted text.
///
/// `start_offset` is the byte offset of `code[0]` in the containing
/// section, used both to label lines and to resolve PC-relative branch
/// targets.
pub fn disassemble(
    code: &[u32],
    start_offset: u32,
    arch: GcnArch,
    options: &AssemblerOptions,
    relocs: &RelocTable,
) -> DisasmOutput {
    let scan = prescan::scan(code, start_offset, arch);
    let cat = catalog();
    let mut warnings = scan.warnings;
    let mut lines = Vec::with_capacity(scan.sites.len());

    for site in &scan.sites {
        let start = ((site.offset - start_offset) / 4) as usize;
        let words = &code[start..start + site.word_count as usize];
        let mut line = String::new();

        if options.emit_code_position_prefix {
            line.push_str(&format!("{:08x}: ", site.offset));
        }
        if options.emit_hex_code_prefix {
            for w in words {
                line.push_str(&format!("{:08x} ", w));
            }
        }
        if let Some(label) = scan.labels.at(site.offset) {
            line.push_str(&label.name);
            line.push_str(": ");
        }

        format_instruction(&mut line, site, words, arch, cat, &scan.labels, relocs, options, &mut warnings);
        lines.push(line);
    }

    DisasmOutput {
        lines,
        warnings,
        labels: scan.labels,
    }
}

/// Which kind of value a literal-constant trailing word should be printed
/// as, guessed from the mnemonic's type suffix (SPEC_FULL's "FloatLitType"
/// classification; this catalog has no dedicated flag for it, so the
/// suffix is the only signal a standalone disassembler line has).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum LitKind {
    Int,
    F32,
    F16,
}

fn lit_kind_of(mnemonic: &str) -> LitKind {
    if mnemonic.ends_with("f16") || mnemonic.contains("_f16_") {
        LitKind::F16
    } else if mnemonic.contains("f32") || mnemonic.contains("f64") {
        LitKind::F32
    } else {
        LitKind::Int
    }
}

fn format_literal(value: u32, kind: LitKind) -> String {
    match kind {
        LitKind::Int => format!("{:#x}", value),
        LitKind::F32 => format!("{}", f32::from_bits(value)),
        LitKind::F16 => format!("{}", half_to_f32(value as u16)),
    }
}

fn half_to_f32(bits: u16) -> f32 {
    let sign = (bits >> 15) & 1;
    let exp = (bits >> 10) & 0x1F;
    let mant = u32::from(bits & 0x3FF);
    let magnitude = if exp == 0 {
        (mant as f32) * 2f32.powi(-24)
    } else if exp == 0x1F {
        if mant == 0 {
            f32::INFINITY
        } else {
            f32::NAN
        }
    } else {
        (1.0 + (mant as f32) / 1024.0) * 2f32.powi(i32::from(exp) - 15)
    };
    if sign == 1 {
        -magnitude
    } else {
        magnitude
    }
}

/// Resolve a site's real opcode and catalog entry, disambiguating the two
/// families the size scan can't tell apart (VOP3A/VOP3B/VOP3P share one
/// class tag; MUBUF/MTBUF share another) by probing the catalog with each
/// candidate family in turn.
fn resolve(
    site: &InstrSite,
    words: &[u32],
    arch: GcnArch,
    cat: &'static InstructionCatalog,
) -> (EncodingFamily, u32, Option<&'static InstructionEntry>) {
    let word1 = words[0];
    match site.family {
        EncodingFamily::Vop1 => {
            let (_, op, _) = vop::decode_vop1(word1, arch);
            (EncodingFamily::Vop1, op, cat.lookup_encoding(EncodingFamily::Vop1, op, arch))
        }
        EncodingFamily::Vop2 => {
            let (op, _, _, _) = vop::decode_vop2(word1, arch);
            (EncodingFamily::Vop2, op, cat.lookup_encoding(EncodingFamily::Vop2, op, arch))
        }
        EncodingFamily::Vopc => {
            let (op, _, _) = vop::decode_vopc(word1, arch);
            (EncodingFamily::Vopc, op, cat.lookup_encoding(EncodingFamily::Vopc, op, arch))
        }
        EncodingFamily::Vop3a => {
            let word2 = words[1];
            let (op, ..) = vop3::decode_vop3a(word1, word2, arch);
            for family in [EncodingFamily::Vop3a, EncodingFamily::Vop3b, EncodingFamily::Vop3p] {
                if let Some(entry) = cat.lookup_encoding(family, op, arch) {
                    return (family, op, Some(entry));
                }
            }
            (EncodingFamily::Vop3a, op, None)
        }
        EncodingFamily::Smem => {
            let (op, ..) = smem::unpack_word1(word1);
            (EncodingFamily::Smem, op, cat.lookup_encoding(EncodingFamily::Smem, op, arch))
        }
        EncodingFamily::Vintrp => {
            let (_, attr_chan, attr, _) = vintrp::decode(word1, arch);
            let op = attr_chan | (attr << 2);
            (EncodingFamily::Vintrp, op, cat.lookup_encoding(EncodingFamily::Vintrp, op, arch))
        }
        EncodingFamily::Ds => {
            let (op, ..) = ds::decode(word1, words[1], arch);
            (EncodingFamily::Ds, op, cat.lookup_encoding(EncodingFamily::Ds, op, arch))
        }
        EncodingFamily::Flat | EncodingFamily::Global | EncodingFamily::Scratch => {
            let (op, seg, ..) = flat::decode(word1, words[1], arch);
            let family = match seg {
                flat::Seg::Flat => EncodingFamily::Flat,
                flat::Seg::Global => EncodingFamily::Global,
                flat::Seg::Scratch => EncodingFamily::Scratch,
            };
            (family, op, cat.lookup_encoding(family, op, arch))
        }
        EncodingFamily::Mubuf => {
            let (op, ..) = mubuf::decode(word1, words[1], arch);
            for family in [EncodingFamily::Mubuf, EncodingFamily::Mtbuf] {
                if let Some(entry) = cat.lookup_encoding(family, op, arch) {
                    return (family, op, Some(entry));
                }
            }
            (EncodingFamily::Mubuf, op, None)
        }
        EncodingFamily::Mimg => {
            let (op, ..) = mimg::decode(word1, words[1], arch);
            (EncodingFamily::Mimg, op, cat.lookup_encoding(EncodingFamily::Mimg, op, arch))
        }
        EncodingFamily::Exp => {
            let (target, ..) = exp::decode(word1, arch);
            (EncodingFamily::Exp, target, cat.lookup_encoding(EncodingFamily::Exp, target, arch))
        }
        EncodingFamily::Sop1 => {
            let (_, op, _) = sop::unpack_sop1(word1);
            (EncodingFamily::Sop1, op, cat.lookup_encoding(EncodingFamily::Sop1, op, arch))
        }
        EncodingFamily::Sop2 => {
            let (op, ..) = sop::unpack_sop2(word1);
            (EncodingFamily::Sop2, op, cat.lookup_encoding(EncodingFamily::Sop2, op, arch))
        }
        EncodingFamily::Sopc => {
            let (op, ..) = sop::unpack_sopc(word1);
            (EncodingFamily::Sopc, op, cat.lookup_encoding(EncodingFamily::Sopc, op, arch))
        }
        EncodingFamily::Sopp => {
            let (op, _) = sop::unpack_sopp(word1);
            (EncodingFamily::Sopp, op, cat.lookup_encoding(EncodingFamily::Sopp, op, arch))
        }
        EncodingFamily::Sopk => {
            let (op, ..) = sop::unpack_sopk(word1);
            (EncodingFamily::Sopk, op, cat.lookup_encoding(EncodingFamily::Sopk, op, arch))
        }
        EncodingFamily::Vop3b | EncodingFamily::Vop3p | EncodingFamily::Mtbuf => {
            unreachable!("prescan never assigns these ambiguous families directly")
        }
    }
}

fn format_instruction(
    out: &mut String,
    site: &InstrSite,
    words: &[u32],
    arch: GcnArch,
    cat: &'static InstructionCatalog,
    labels: &LabelTable,
    relocs: &RelocTable,
    options: &AssemblerOptions,
    warnings: &mut Vec<DisasmWarning>,
) {
    let (family, opcode, entry) = resolve(site, words, arch, cat);

    let entry = match entry {
        Some(entry) => entry,
        None => {
            debug!(
                "illegal encoding at offset {:#x}: {} opcode {:#x} has no catalog entry",
                site.offset,
                family.name(),
                opcode
            );
            warnings.push(DisasmWarning::IllegalEncoding {
                offset: site.offset,
                family: family.name(),
                opcode,
            });
            out.push_str(&format!(
                "{}_ill_{:#x}\n\t.int {}",
                family.name(),
                opcode,
                words
                    .iter()
                    .map(|w| format!("{:#010x}", w))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
            return;
        }
    };

    let unused_field = unused_nonzero_field(family, entry, words);
    if let Some((field, value)) = unused_field {
        if !options.tolerate_unused_nonzero_fields {
            debug!(
                "unused field {} = {:#x} at offset {:#x} has no defined meaning for {} and strict mode is on",
                field, value, site.offset, entry.mnemonic
            );
            warnings.push(DisasmWarning::IllegalEncoding {
                offset: site.offset,
                family: family.name(),
                opcode,
            });
            out.push_str(&format!(
                "{}_ill_{:#x}\n\t.int {}",
                family.name(),
                opcode,
                words
                    .iter()
                    .map(|w| format!("{:#010x}", w))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
            return;
        }
        warnings.push(DisasmWarning::UnusedNonzeroField {
            offset: site.offset,
            field,
            value,
        });
    }

    out.push_str(entry.mnemonic);

    let operands = decode_operands(family, entry, words, site, arch, labels, relocs);
    if !operands.is_empty() {
        out.push(' ');
        out.push_str(&operands.join(", "));
    }

    let trailing_idx = trailing_word_index(family, words);
    if let Some(trailing) = words.get(trailing_idx) {
        if !operands.is_empty() {
            out.push_str(", ");
        } else {
            out.push(' ');
        }
        let trailing_offset = site.offset + (trailing_idx as u32) * 4;
        match relocs.at(trailing_offset) {
            Some(reloc) => out.push_str(&format_reloc(reloc)),
            None => out.push_str(&format_literal(*trailing, lit_kind_of(entry.mnemonic))),
        }
    }

    for modifier in trailing_modifiers(family, words, arch) {
        out.push(' ');
        out.push_str(&modifier);
    }

    if let Some((field, value)) = unused_field {
        out.push_str(&format!(" {}={:#x}", field, value));
    }
}

/// Does this instruction carry a nonzero value in a field its catalog row
/// says isn't read for this particular opcode? Only checked for the two
/// families whose simplified layouts leave an operand's raw bits in the
/// word even when the opcode doesn't use that operand slot (DS's
/// `no_dst`/`no_src` rows, FLAT's `no_dst` rows); the catalog's encoder
/// always writes zero there, so a nonzero value here can only come from a
/// hand-written or corrupted code buffer.
fn unused_nonzero_field(
    family: EncodingFamily,
    entry: &InstructionEntry,
    words: &[u32],
) -> Option<(&'static str, u32)> {
    match family {
        EncodingFamily::Ds => {
            let (vdst, data1, data0, _addr) = ds::unpack_word2(words[1]);
            if entry.flags.no_dst && vdst != 0 {
                return Some(("vdst", vdst));
            }
            if entry.flags.no_src {
                if data0 != 0 {
                    return Some(("data0", data0));
                }
                if data1 != 0 {
                    return Some(("data1", data1));
                }
            }
            None
        }
        EncodingFamily::Flat | EncodingFamily::Global | EncodingFamily::Scratch => {
            let (vdst, data, _addr) = flat::unpack_word2(words[1]);
            if entry.flags.no_dst && vdst != 0 {
                return Some(("vdst", vdst));
            }
            None
        }
        _ => None,
    }
}

/// A VOP1/VOP2/VOPC `src0` field's printable operand text: the plain
/// decoded operand, or, when `src0` carries a DPP/SDWA sentinel, the real
/// source register packed into the suffix word that follows.
fn vop_src0_text(words: &[u32], arch: GcnArch) -> String {
    let raw_src0 = words[0] & 0x1FF;
    if crate::binemit::dppsdwa::is_dpp_src0(raw_src0, arch) {
        let suffix = words.get(1).copied().unwrap_or(0);
        let (src0, _) = crate::binemit::dppsdwa::unpack_dpp_word(suffix);
        crate::isa::registers::decode_operand(src0, 1, arch).to_string()
    } else if crate::binemit::dppsdwa::is_sdwa_src0(raw_src0, arch) {
        let suffix = words.get(1).copied().unwrap_or(0);
        let (src0, _) = crate::binemit::dppsdwa::unpack_sdwa_word(suffix);
        crate::isa::registers::decode_operand(src0, 1, arch).to_string()
    } else {
        crate::isa::registers::decode_operand(raw_src0, 1, arch).to_string()
    }
}

/// Print a pending relocation in place of the raw value it will patch,
/// `symbol` for a zero addend, `symbol+N`/`symbol-N` otherwise.
fn format_reloc(reloc: &crate::reloc::Relocation) -> String {
    match reloc.addend {
        0 => reloc.symbol.clone(),
        n if n > 0 => format!("{}+{:#x}", reloc.symbol, n),
        n => format!("{}-{:#x}", reloc.symbol, -n),
    }
}

/// Index of the trailing literal code word, if this instruction's word
/// count is one more than its family's fixed shape implies. VOP1/VOP2/VOPC
/// can also carry an extra word for a DPP or SDWA suffix instead of a
/// literal -- that word is handled by [`trailing_modifiers`], not here, so
/// it's excluded by checking the raw `src0` field against the literal
/// marker specifically.
fn trailing_word_index(family: EncodingFamily, words: &[u32]) -> usize {
    let word_count = words.len();
    let fixed = match family {
        EncodingFamily::Vop1 | EncodingFamily::Vop2 | EncodingFamily::Vopc => {
            if word_count > 1 && words[0] & 0x1FF != 0xFF {
                return word_count;
            }
            1
        }
        EncodingFamily::Sop1 | EncodingFamily::Sop2 | EncodingFamily::Sopc => 1,
        EncodingFamily::Vop3a | EncodingFamily::Vop3b | EncodingFamily::Vop3p => 2,
        _ => word_count,
    };
    if word_count > fixed {
        fixed
    } else {
        word_count
    }
}

/// Printed in the fixed order `dmask, unorm, glc, slc, r128, tfe, lwe, da,
/// d16`; this catalog's simplified layouts only carry bits for
/// `dmask`/`unorm`/`glc` (MIMG) and `glc` (MUBUF/FLAT family), so the rest
/// of the list is never populated.
fn trailing_modifiers(family: EncodingFamily, words: &[u32], arch: GcnArch) -> Vec<String> {
    let mut out = Vec::new();
    match family {
        EncodingFamily::Vop1 | EncodingFamily::Vop2 | EncodingFamily::Vopc if words.len() > 1 => {
            let raw_src0 = words[0] & 0x1FF;
            if crate::binemit::dppsdwa::is_dpp_src0(raw_src0, arch) {
                let (_, m) = crate::binemit::dppsdwa::unpack_dpp_word(words[1]);
                out.push(format!("dpp_ctrl:{:#x}", m.dpp_ctrl));
                out.push(format!("row_mask:{:#x}", m.row_mask));
                out.push(format!("bank_mask:{:#x}", m.bank_mask));
                if m.bound_ctrl {
                    out.push("bound_ctrl:1".to_string());
                }
            } else if crate::binemit::dppsdwa::is_sdwa_src0(raw_src0, arch) {
                let (_, m) = crate::binemit::dppsdwa::unpack_sdwa_word(words[1]);
                if family == EncodingFamily::Vopc {
                    out.push(format!(
                        "sdst:{}",
                        crate::isa::registers::decode_operand(u32::from(m.vopc_sdst), 1, arch)
                    ));
                } else {
                    out.push(format!("dst_sel:{}", m.dst_sel));
                    out.push(format!("dst_unused:{}", m.dst_unused));
                }
                out.push(format!("src0_sel:{}", m.src0_sel));
                if m.clamp {
                    out.push("clamp".to_string());
                }
            }
        }
        EncodingFamily::Mimg => {
            let (_, dmask, unorm, glc) = mimg::unpack_word1(words[0]);
            if dmask != 0xF {
                out.push(format!("dmask={:#x}", dmask));
            }
            if unorm {
                out.push("unorm".to_string());
            }
            if glc {
                out.push("glc".to_string());
            }
        }
        EncodingFamily::Mubuf | EncodingFamily::Mtbuf => {
            let (_, glc, _idxen, _offen, _offset) = mubuf::unpack_word1(words[0]);
            if glc {
                out.push("glc".to_string());
            }
        }
        EncodingFamily::Flat | EncodingFamily::Global | EncodingFamily::Scratch => {
            let (_, _seg, glc, slc) = flat::unpack_word1(words[0]);
            if glc {
                out.push("glc".to_string());
            }
            if slc {
                out.push("slc".to_string());
            }
        }
        _ => {}
    }
    out
}

fn decode_operands(
    family: EncodingFamily,
    entry: &InstructionEntry,
    words: &[u32],
    site: &InstrSite,
    arch: GcnArch,
    labels: &LabelTable,
    relocs: &RelocTable,
) -> Vec<String> {
    match family {
        EncodingFamily::Vop1 => {
            let (vdst, _, _) = vop::decode_vop1(words[0], arch);
            vec![vdst.to_string(), vop_src0_text(words, arch)]
        }
        EncodingFamily::Vop2 => {
            let (_, vdst, vsrc1, _) = vop::decode_vop2(words[0], arch);
            let mut ops = vec![vdst.to_string(), vop_src0_text(words, arch), vsrc1.to_string()];
            if entry.flags.implicit_vcc_src {
                ops.push(Operand::Special(crate::isa::registers::SpecialSReg::VccLo).to_string());
            }
            ops
        }
        EncodingFamily::Vopc => {
            let (_, vsrc1, _) = vop::decode_vopc(words[0], arch);
            vec![vop_src0_text(words, arch), vsrc1.to_string()]
        }
        EncodingFamily::Vop3a | EncodingFamily::Vop3p => {
            let (_, vdst, src0, src1, src2) = vop3::decode_vop3a(words[0], words[1], arch);
            vec![vdst.to_string(), src0.to_string(), src1.to_string(), src2.to_string()]
        }
        EncodingFamily::Vop3b => {
            let (_, vdst, sdst, src0, src1, src2) = vop3::decode_vop3b(words[0], words[1], arch);
            vec![
                vdst.to_string(),
                sdst.to_string(),
                src0.to_string(),
                src1.to_string(),
                src2.to_string(),
            ]
        }
        EncodingFamily::Smem => {
            let dst_count = if entry.flags.dst64 { 2 } else { 1 };
            let (sdst, sbase, _imm, _offset) = smem::decode_operands(words[0], dst_count, arch);
            vec![sdst.to_string(), sbase.to_string()]
        }
        EncodingFamily::Vintrp => {
            let (vdst, _attr_chan, _attr, vsrc0) = vintrp::decode(words[0], arch);
            vec![vdst.to_string(), vsrc0.to_string()]
        }
        EncodingFamily::Ds => {
            let (_, _gds, vdst, data1, data0, addr) = ds::decode(words[0], words[1], arch);
            let mut ops = Vec::new();
            if !entry.flags.no_dst {
                ops.push(vdst.to_string());
            }
            ops.push(addr.to_string());
            if !entry.flags.no_src {
                ops.push(data0.to_string());
                ops.push(data1.to_string());
            }
            ops
        }
        EncodingFamily::Flat | EncodingFamily::Global | EncodingFamily::Scratch => {
            let (_, _seg, vdst, data, addr) = flat::decode(words[0], words[1], arch);
            let mut ops = Vec::new();
            if !entry.flags.no_dst {
                ops.push(vdst.to_string());
            }
            ops.push(addr.to_string());
            ops.push(data.to_string());
            ops
        }
        EncodingFamily::Mubuf | EncodingFamily::Mtbuf => {
            let (_, vdata, vaddr, srsrc, soffset) = mubuf::decode(words[0], words[1], arch);
            vec![vdata.to_string(), vaddr.to_string(), srsrc.to_string(), soffset.to_string()]
        }
        EncodingFamily::Mimg => {
            let (_, _dmask, vdata, vaddr, srsrc, ssamp) = mimg::decode(words[0], words[1], arch);
            let mut ops = vec![vdata.to_string(), vaddr.to_string(), srsrc.to_string()];
            if entry.flags.mimg_sample {
                ops.push(ssamp.to_string());
            }
            ops
        }
        EncodingFamily::Exp => {
            let (_, en, _compr, _done, _vm, vsrc0) = exp::decode(words[0], arch);
            let mut ops = Vec::new();
            if en & 1 != 0 {
                ops.push(vsrc0.to_string());
            }
            ops
        }
        EncodingFamily::Sop1 => {
            let dst_count = if entry.flags.dst64 { 2 } else { 1 };
            let src_count = if entry.flags.src0_64 { 2 } else { 1 };
            let (sdst, _, ssrc0) = sop::unpack_sop1(words[0]);
            vec![
                crate::isa::registers::decode_operand(sdst, dst_count, arch).to_string(),
                crate::isa::registers::decode_operand(ssrc0, src_count, arch).to_string(),
            ]
        }
        EncodingFamily::Sop2 => {
            let dst_count = if entry.flags.dst64 { 2 } else { 1 };
            let src0_count = if entry.flags.src0_64 { 2 } else { 1 };
            let src1_count = if entry.flags.src1_64 { 2 } else { 1 };
            let (_, sdst, ssrc1, ssrc0) = sop::unpack_sop2(words[0]);
            vec![
                crate::isa::registers::decode_operand(sdst, dst_count, arch).to_string(),
                crate::isa::registers::decode_operand(ssrc0, src0_count, arch).to_string(),
                crate::isa::registers::decode_operand(ssrc1, src1_count, arch).to_string(),
            ]
        }
        EncodingFamily::Sopc => {
            let (_, ssrc1, ssrc0) = sop::unpack_sopc(words[0]);
            vec![
                crate::isa::registers::decode_operand(ssrc0, 1, arch).to_string(),
                crate::isa::registers::decode_operand(ssrc1, 1, arch).to_string(),
            ]
        }
        EncodingFamily::Sopp => sopp_operands(entry.opcode, words[0], site, arch, labels, relocs),
        EncodingFamily::Sopk => {
            let (_, sdst, simm16) = sop::unpack_sopk(words[0]);
            let mut ops = Vec::new();
            if !entry.flags.no_dst {
                ops.push(crate::isa::registers::decode_operand(sdst, 1, arch).to_string());
            }
            if entry.flags.sopk_imm_sreg {
                ops.push(format_hwreg(simm16, arch));
            } else {
                ops.push(Operand::InlineInt(simm16 as i32).to_string());
            }
            ops
        }
    }
}

/// SOPP's operand text: none for plain control instructions
/// (`s_nop`/`s_endpgm`/...), a resolved branch-target label for the branch
/// opcodes, and a symbolic decode for the two immediate-carrying opcodes
/// this catalog exposes (`s_waitcnt`, `s_sendmsg`).
fn sopp_operands(
    opcode: u32,
    word: u32,
    site: &InstrSite,
    arch: GcnArch,
    labels: &LabelTable,
    relocs: &RelocTable,
) -> Vec<String> {
    let (_, simm16) = sop::unpack_sopp(word);

    if prescan::is_branch_opcode(opcode, arch) {
        if let Some(reloc) = relocs.at(site.offset) {
            return vec![format_reloc(reloc)];
        }
        let target = prescan::branch_target(site.offset, simm16);
        let name = target.and_then(|t| labels.at(t)).map(|l| l.name.clone());
        return vec![name.unwrap_or_else(|| {
            target
                .map(crate::reloc::synthetic_label_name)
                .unwrap_or_else(|| format!("{:#x}", simm16))
        })];
    }

    match opcode {
        SOPP_OP_WAITCNT => vec![format_waitcnt(simm16, arch)],
        SOPP_OP_SENDMSG => vec![format_sendmsg(simm16, arch)],
        _ => Vec::new(),
    }
}

/// `hwreg(name, offset, size)` bit layout, grounded on
/// `decodeSOPKEncoding`'s `s_getreg`/`s_setreg` handling: a 6-bit register
/// id, a 5-bit bit-offset, and a 5-bit field width stored biased by one.
fn format_hwreg(imm16: u16, arch: GcnArch) -> String {
    let imm16 = u32::from(imm16);
    let id = imm16 & 0x3F;
    let offset = (imm16 >> 6) & 0x1F;
    let size = ((imm16 >> 11) & 0x1F) + 1;
    let name = hwreg_name(id, arch)
        .map(str::to_string)
        .unwrap_or_else(|| format!("@{}", id));
    format!("hwreg({}, {}, {})", name, offset, size)
}

const HWREG_NAMES_BASE: &[&str] = &[
    "@0",
    "mode",
    "status",
    "trapsts",
    "hw_id",
    "gpr_alloc",
    "lds_alloc",
    "ib_sts",
];
const HWREG_NAMES_GCN12: &[&str] = &["pc_lo", "pc_hi", "inst_dw0", "inst_dw1", "ib_dbg0", "flush_ib"];
const HWREG_NAMES_GCN14: &[&str] = &[
    "sh_mem_bases",
    "sq_shader_tba_lo",
    "sq_shader_tba_hi",
    "sq_shader_tma_lo",
    "sq_shader_tma_hi",
    "ib_dbg1",
];

fn hwreg_name(id: u32, arch: GcnArch) -> Option<&'static str> {
    let id = id as usize;
    if id < HWREG_NAMES_BASE.len() {
        return Some(HWREG_NAMES_BASE[id]);
    }
    let id = id - HWREG_NAMES_BASE.len();
    if arch.is_gcn12_plus() && id < HWREG_NAMES_GCN12.len() {
        return Some(HWREG_NAMES_GCN12[id]);
    }
    if !arch.is_gcn12_plus() {
        return None;
    }
    let id = id.checked_sub(HWREG_NAMES_GCN12.len())?;
    if arch.is_gcn14_plus() && id < HWREG_NAMES_GCN14.len() {
        return Some(HWREG_NAMES_GCN14[id]);
    }
    None
}

const SENDMSG_NAMES: &[&str] = &[
    "nop",
    "interrupt",
    "gs",
    "gs_done",
    "savewave",
    "stall_wave_gen",
    "halt_waves",
    "ordered_ps_done",
];
const SENDMSG_NAMES_GCN14: &[&str] = &[
    "nop",
    "interrupt",
    "gs",
    "gs_done",
    "savewave",
    "stall_wave_gen",
    "halt_waves",
    "ordered_ps_done",
    "early_prim_dealloc",
    "gs_alloc_req",
    "get_doorbell",
];
const SENDMSG_GSOP_NAMES: &[&str] = &["nop", "cut", "emit", "emit-cut"];

/// `sendmsg(name[, gsop][, stream])` bit layout, grounded on
/// `decodeSOPPEncoding`'s `s_sendmsg` handling: a 4-bit message id, a 2-bit
/// GS opcode (meaningful only for the two `gs*` messages), and a 2-bit
/// stream id (meaningful only for `gs_done` with a non-nop GS opcode).
fn format_sendmsg(imm16: u16, arch: GcnArch) -> String {
    let imm16 = u32::from(imm16);
    let msg = imm16 & 0xF;
    let gsop = (imm16 >> 4) & 0x3;
    let stream = (imm16 >> 8) & 0x3;

    let table = if arch.is_gcn14_plus() { SENDMSG_NAMES_GCN14 } else { SENDMSG_NAMES };
    let name = match table.get(msg as usize) {
        Some(name) => *name,
        None => return format!("sendmsg({:#x})", imm16),
    };

    let is_gs = msg == 2 || msg == 3;
    let mut text = format!("sendmsg({}", name);
    if is_gs {
        text.push_str(", ");
        text.push_str(SENDMSG_GSOP_NAMES.get(gsop as usize).copied().unwrap_or("nop"));
        if msg == 3 && gsop != 0 {
            text.push_str(&format!(", {}", stream));
        }
    }
    text.push(')');

    let known_bits = if is_gs { 0xF | (0x3 << 4) | (0x3 << 8) } else { 0xF };
    if imm16 & !known_bits != 0 {
        text.push_str(&format!(":{:#x}", imm16));
    }
    text
}

/// `vmcnt(N) & expcnt(N) & lgkmcnt(N)` bit layout, reusing the assembler's
/// own `s_waitcnt` codec so disassembly never drifts from encoding.
fn format_waitcnt(imm16: u16, arch: GcnArch) -> String {
    let waits = waitcnt::decode_imm16(imm16, arch);
    let mut parts = Vec::new();
    if let Some(v) = waits.vmcnt {
        parts.push(format!("vmcnt({})", v));
    }
    if let Some(v) = waits.expcnt {
        parts.push(format!("expcnt({})", v));
    }
    if let Some(v) = waits.lgkmcnt {
        parts.push(format!("lgkmcnt({})", v));
    }
    if parts.is_empty() {
        "0".to_string()
    } else {
        parts.join(" & ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::AssemblerOptions;
    use crate::reloc::{RelocKind, Relocation};

    fn no_relocs() -> RelocTable {
        RelocTable::new()
    }

    #[test]
    fn s_endpgm_round_trips_to_bare_mnemonic() {
        let code = [sop::pack_sopp(1, 0)];
        let out = disassemble(&code, 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &no_relocs());
        assert_eq!(out.lines, vec!["s_endpgm".to_string()]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn vop3a_and_vop3b_disambiguate_by_opcode() {
        // v_fma_f32 (VOP3A) and v_add_co_u32 (VOP3B) share the VOP3 class
        // tag and word count; the disassembler must pick whichever family
        // the catalog actually lists the decoded opcode under.
        const VOP3_CLASS: u32 = 0b110100;
        let fma = catalog()
            .lookup_mnemonic("v_fma_f32", GcnArch::Gcn1_0)
            .unwrap();
        let word1 = (VOP3_CLASS << 26) | ((fma.opcode & 0x1FF) << 17) | (9 << 9);
        let word2 = 5 | ((256 + 3) << 9) | (10 << 18);
        let out = disassemble(
            &[word1, word2],
            0,
            GcnArch::Gcn1_0,
            &AssemblerOptions::default(),
            &no_relocs(),
        );
        assert!(out.lines[0].starts_with("v_fma_f32"));
        assert!(out.warnings.is_empty());

        let add_co = catalog()
            .lookup_mnemonic("v_add_co_u32", GcnArch::Gcn1_0)
            .unwrap();
        let word1b = (VOP3_CLASS << 26) | ((add_co.opcode & 0x1FF) << 17) | (9 << 9);
        let outb = disassemble(
            &[word1b, word2],
            0,
            GcnArch::Gcn1_0,
            &AssemblerOptions::default(),
            &no_relocs(),
        );
        assert!(outb.lines[0].starts_with("v_add_co_u32"));
        assert!(outb.warnings.is_empty());
    }

    #[test]
    fn illegal_encoding_falls_back_to_int_directive() {
        // An SOP1 opcode no catalog row defines.
        let word = sop::pack_sop1(0, 0xFE, 1);
        let out = disassemble(&[word], 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &no_relocs());
        assert!(out.lines[0].starts_with("sop1_ill_"));
        assert!(matches!(
            out.warnings.as_slice(),
            [DisasmWarning::IllegalEncoding { .. }]
        ));
    }

    #[test]
    fn branch_target_line_is_label_prefixed() {
        let code = [sop::pack_sopp(2, 0), sop::pack_sopp(1, 0)];
        let out = disassemble(&code, 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &no_relocs());
        assert!(out.lines[1].starts_with("L"));
    }

    #[test]
    fn branch_opcode_prints_target_label_as_operand() {
        // s_branch (op 2), simm16=0 -> target = 0 + (0+1)*4 = 4.
        let code = [sop::pack_sopp(2, 0), sop::pack_sopp(1, 0)];
        let out = disassemble(&code, 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &no_relocs());
        assert_eq!(out.lines[0], "s_branch L4");
    }

    #[test]
    fn sopp_waitcnt_prints_symbolic_counters() {
        let code = [sop::pack_sopp(12, 0x0543)];
        let out = disassemble(&code, 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &no_relocs());
        assert_eq!(out.lines[0], "s_waitcnt vmcnt(3) & expcnt(4) & lgkmcnt(5)");
    }

    #[test]
    fn sopp_sendmsg_prints_symbolic_message() {
        // msg=2 (gs), gsop=2 (emit).
        let imm16 = 2 | (2 << 4);
        let code = [sop::pack_sopp(16, imm16)];
        let out = disassemble(&code, 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &no_relocs());
        assert_eq!(out.lines[0], "s_sendmsg sendmsg(gs, emit)");
    }

    #[test]
    fn sopk_getreg_prints_hwreg_form() {
        let entry = catalog().lookup_mnemonic("s_getreg_b32", GcnArch::Gcn1_0).unwrap();
        // hwreg(mode=1, offset=0, size=32) -> id=1, offset=0, size field biased (32-1=31).
        let imm16 = 1 | (0 << 6) | (31 << 11);
        let word = sop::pack_sopk(entry.opcode, 7, imm16);
        let out = disassemble(&[word], 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &no_relocs());
        assert_eq!(out.lines[0], "s_getreg_b32 s7, hwreg(mode, 0, 32)");
    }

    #[test]
    fn trailing_literal_word_prints_as_float_for_f32_mnemonic() {
        let entry = catalog()
            .lookup_mnemonic("v_sqrt_f32", GcnArch::Gcn1_0)
            .unwrap();
        // VOP1 word with vdst=4, src0=0xFF (literal marker).
        let word1 = (0x3Fu32 << 25) | (4 << 17) | (entry.opcode << 9) | 0xFF;
        let code = [word1, 0x4048_0000];
        let out = disassemble(&code, 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &no_relocs());
        assert!(out.lines[0].contains("3.14"));
    }

    #[test]
    fn trailing_literal_word_prints_as_relocation_when_pending() {
        let entry = catalog()
            .lookup_mnemonic("v_sqrt_f32", GcnArch::Gcn1_0)
            .unwrap();
        let word1 = (0x3Fu32 << 25) | (4 << 17) | (entry.opcode << 9) | 0xFF;
        let code = [word1, 0];
        let mut relocs = RelocTable::new();
        relocs.push(Relocation {
            offset: 4,
            kind: RelocKind::Abs32,
            symbol: "my_const".to_string(),
            addend: 0,
        });
        let out = disassemble(&code, 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &relocs);
        assert!(out.lines[0].ends_with("my_const"));
    }

    #[test]
    fn ds_write_with_nonzero_vdst_prints_tail_and_warns_when_tolerant() {
        let entry = catalog()
            .lookup_mnemonic("ds_write_b32", GcnArch::Gcn1_0)
            .unwrap();
        let word1 = crate::binemit::ds::pack_word1(entry.opcode, false, 0, 0);
        // vdst is unused for this opcode but nonzero here.
        let word2 = crate::binemit::ds::pack_word2(7, 0, 0, 0);
        let code = [word1, word2];
        let out = disassemble(&code, 0, GcnArch::Gcn1_0, &AssemblerOptions::default(), &no_relocs());
        assert!(out.lines[0].contains("vdst=0x7"));
        assert!(matches!(
            out.warnings.as_slice(),
            [DisasmWarning::UnusedNonzeroField { field: "vdst", value: 7, .. }]
        ));
    }

    #[test]
    fn ds_write_with_nonzero_vdst_falls_back_to_illegal_when_strict() {
        let entry = catalog()
            .lookup_mnemonic("ds_write_b32", GcnArch::Gcn1_0)
            .unwrap();
        let word1 = crate::binemit::ds::pack_word1(entry.opcode, false, 0, 0);
        let word2 = crate::binemit::ds::pack_word2(7, 0, 0, 0);
        let code = [word1, word2];
        let options = AssemblerOptions {
            tolerate_unused_nonzero_fields: false,
            ..AssemblerOptions::default()
        };
        let out = disassemble(&code, 0, GcnArch::Gcn1_0, &options, &no_relocs());
        assert!(out.lines[0].contains("_ill_"));
        assert!(matches!(
            out.warnings.as_slice(),
            [DisasmWarning::IllegalEncoding { .. }]
        ));
    }
}
