//! Stage A of the disassembler pipeline: one forward pass over the code
//! buffer that measures every instruction's word count and discovers the
//! branch targets a second, formatting pass will need labels for.
//!
//! Grounded on the reference disassembler's own two-pass structure
//! (`CLRXDisassembler::disassemble`'s first loop just computes sizes and
//! collects branch targets into a label set before any mnemonic is
//! printed); mirrors [`crate::srcpos::SourcePosHandler`]'s
//! append-only-then-replay shape at the API level.

use crate::arch::GcnArch;
use crate::binemit::sop;
use crate::isa::EncodingFamily;
use crate::reloc::{synthetic_label_name, Label, LabelTable};
use crate::result::DisasmWarning;
use log::debug;

/// One instruction boundary discovered during the size scan.
///
/// `family` is fully resolved except for the two pairs the size scan alone
/// cannot tell apart (VOP3A/VOP3B/VOP3P all share one class tag and word
/// count; MUBUF/MTBUF likewise) -- [`super::format`] disambiguates those
/// with a catalog probe once it has a concrete opcode in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrSite {
    /// Byte offset of the instruction's first code word.
    pub offset: u32,
    /// Encoding family, as far as the size scan can tell.
    pub family: EncodingFamily,
    /// Number of 32-bit code words this instruction occupies.
    pub word_count: u8,
}

/// The result of a full Stage A pass.
#[derive(Debug, Default)]
pub struct PrescanResult {
    /// One entry per instruction found, in code order.
    pub sites: Vec<InstrSite>,
    /// Labels synthesized for every SOPP branch target discovered.
    pub labels: LabelTable,
    /// Diagnostics raised along the way (currently just truncation).
    pub warnings: Vec<DisasmWarning>,
}

const CLASS_SMEM: u32 = 0b110001;
const CLASS_VINTRP: u32 = 0b110010;
const CLASS_VOP3: u32 = 0b110100;
const CLASS_DS: u32 = 0b110110;
const CLASS_FLAT: u32 = 0b110111;
const CLASS_MUBUF: u32 = 0b111000;
const CLASS_MIMG: u32 = 0b111100;
const CLASS_EXP: u32 = 0b111110;

/// SOPP opcodes that carry a signed branch-word-count immediate: `{2,
/// 4..9}`, widened on GCN 1.4+ with `{21..26}`.
pub(crate) fn is_branch_opcode(op: u32, arch: GcnArch) -> bool {
    matches!(op, 2 | 4..=9) || (arch.is_gcn14_plus() && matches!(op, 21..=26))
}

/// Scan `code` (whose first word sits at source byte offset `start_offset`)
/// and return every instruction boundary plus the labels any SOPP branch
/// targets need.
pub fn scan(code: &[u32], start_offset: u32, arch: GcnArch) -> PrescanResult {
    let mut result = PrescanResult::default();
    let mut pos: usize = 0;

    while pos < code.len() {
        let word = code[pos];
        let offset = start_offset + (pos as u32) * 4;
        let next = code.get(pos + 1).copied();
        let (family, word_count) = classify(word, next, arch);

        if pos + word_count as usize > code.len() {
            debug!("truncated instruction at offset {:#x}, {} word(s) short", offset, word_count as usize - (code.len() - pos));
            result
                .warnings
                .push(DisasmWarning::TruncatedInstruction { offset });
            break;
        }

        if family == EncodingFamily::Sopp {
            let (op, simm16) = sop::unpack_sopp(word);
            if is_branch_opcode(op, arch) {
                record_branch_target(&mut result.labels, offset, simm16);
            }
        }

        result.sites.push(InstrSite {
            offset,
            family,
            word_count,
        });
        pos += word_count as usize;
    }

    result
}

/// `target = startOffset + (pos + int16(imm16) + 1) * 4`, where `pos` here
/// is this instruction's own word index; since `offset` is already
/// `startOffset + pos * 4`, the formula collapses to
/// `offset + (simm16 + 1) * 4`. Returns `None` if the computed target would
/// be negative.
pub(crate) fn branch_target(offset: u32, simm16: u16) -> Option<u32> {
    let delta = i64::from(simm16 as i16);
    let target = i64::from(offset) + (delta + 1) * 4;
    if target < 0 {
        None
    } else {
        Some(target as u32)
    }
}

fn record_branch_target(labels: &mut LabelTable, offset: u32, simm16: u16) {
    let target = match branch_target(offset, simm16) {
        Some(t) => t,
        None => return,
    };
    if labels.at(target).is_none() {
        labels.push(Label {
            offset: target,
            name: synthetic_label_name(target),
        });
    }
}

/// Determine an instruction's family (as far as the size scan alone can
/// tell) and word count from its code word(s).
fn classify(word: u32, next: Option<u32>, arch: GcnArch) -> (EncodingFamily, u8) {
    let top6 = word >> 26;

    if top6 < 0b100000 {
        return classify_vop(word, arch);
    }

    match top6 {
        CLASS_SMEM => (
            EncodingFamily::Smem,
            if arch.is_gcn12_plus() { 2 } else { 1 },
        ),
        CLASS_VINTRP => (EncodingFamily::Vintrp, 1),
        CLASS_VOP3 => (EncodingFamily::Vop3a, classify_vop3_words(next)),
        CLASS_DS => (EncodingFamily::Ds, 2),
        CLASS_FLAT => (classify_flat_seg(word), 2),
        CLASS_MUBUF => (EncodingFamily::Mubuf, 2),
        CLASS_MIMG => (EncodingFamily::Mimg, 2),
        CLASS_EXP => (EncodingFamily::Exp, 1),
        _ => classify_sop(word),
    }
}

fn classify_flat_seg(word: u32) -> EncodingFamily {
    match (word >> 16) & 0x3 {
        1 => EncodingFamily::Scratch,
        2 => EncodingFamily::Global,
        _ => EncodingFamily::Flat,
    }
}

fn classify_vop3_words(word2: Option<u32>) -> u8 {
    match word2 {
        Some(w) => {
            let (src0, src1, src2, _neg, _omod) = unpack_vop3_word2(w);
            if src0 == 0xFF || src1 == 0xFF || src2 == 0xFF {
                3
            } else {
                2
            }
        }
        None => 2,
    }
}

fn unpack_vop3_word2(word: u32) -> (u32, u32, u32, u32, u32) {
    (
        word & 0x1FF,
        (word >> 9) & 0x1FF,
        (word >> 18) & 0x1FF,
        (word >> 27) & 0x7,
        (word >> 30) & 0x3,
    )
}

fn classify_vop(word: u32, arch: GcnArch) -> (EncodingFamily, u8) {
    const VOP1_PREFIX: u32 = 0x3F;
    const VOPC_PREFIX: u32 = 0x3E;
    let prefix = (word >> 25) & 0x3F;
    let src0 = word & 0x1FF;
    let family = match prefix {
        VOP1_PREFIX => EncodingFamily::Vop1,
        VOPC_PREFIX => EncodingFamily::Vopc,
        _ => EncodingFamily::Vop2,
    };
    (family, vop_src0_words(src0, arch))
}

/// A VOP1/VOP2/VOPC `src0` field can push one extra trailing code word
/// three different ways: a plain literal-constant marker, or a DPP/SDWA
/// suffix word (see [`crate::binemit::dppsdwa`]) carrying the real source
/// operand.
fn vop_src0_words(src0: u32, arch: GcnArch) -> u8 {
    if src0 == 0xFF
        || crate::binemit::dppsdwa::is_dpp_src0(src0, arch)
        || crate::binemit::dppsdwa::is_sdwa_src0(src0, arch)
    {
        2
    } else {
        1
    }
}

fn classify_sop(word: u32) -> (EncodingFamily, u8) {
    let top9 = word >> 23;
    if top9 == 0x17D {
        let (_, _, ssrc0) = sop::unpack_sop1(word);
        return (EncodingFamily::Sop1, literal_words(ssrc0));
    }
    if top9 == 0x17E {
        let (_, _, ssrc0) = sop::unpack_sopc(word);
        return (EncodingFamily::Sopc, literal_words(ssrc0));
    }
    if top9 == 0x17F {
        return (EncodingFamily::Sopp, 1);
    }
    if (word >> 28) == 0b1011 {
        return (EncodingFamily::Sopk, 1);
    }
    let (_, _, _, ssrc0) = sop::unpack_sop2(word);
    (EncodingFamily::Sop2, literal_words(ssrc0))
}

fn literal_words(field: u32) -> u8 {
    if field == 0xFF {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binemit::{flat, sop};

    #[test]
    fn sopp_endpgm_is_one_word_no_label() {
        let code = [sop::pack_sopp(1, 0)];
        let result = scan(&code, 0, GcnArch::Gcn1_0);
        assert_eq!(result.sites.len(), 1);
        assert_eq!(result.sites[0].family, EncodingFamily::Sopp);
        assert_eq!(result.sites[0].word_count, 1);
        assert!(result.labels.is_empty());
    }

    #[test]
    fn sopp_branch_discovers_forward_label() {
        // s_branch (op 2) with simm16 = 1 word forward: target = offset + (1+1)*4 = 8.
        let code = [sop::pack_sopp(2, 1), sop::pack_sopp(1, 0), sop::pack_sopp(1, 0)];
        let result = scan(&code, 0, GcnArch::Gcn1_0);
        assert_eq!(result.sites.len(), 3);
        assert!(result.labels.at(8).is_some());
    }

    #[test]
    fn flat_seg_field_picks_global_family() {
        let code = [flat::pack_word1(16, flat::Seg::Global, false, false), flat::pack_word2(1, 2, 3)];
        let result = scan(&code, 0, GcnArch::Gcn1_0);
        assert_eq!(result.sites[0].family, EncodingFamily::Global);
        assert_eq!(result.sites[0].word_count, 2);
    }

    #[test]
    fn truncated_last_instruction_is_flagged() {
        // A DS-class word1 with no trailing word2 at all.
        let code = [crate::binemit::ds::pack_word1(0, false, 0, 0)];
        let result = scan(&code, 0, GcnArch::Gcn1_0);
        assert_eq!(result.sites.len(), 0);
        assert!(matches!(
            result.warnings.as_slice(),
            [DisasmWarning::TruncatedInstruction { offset: 0 }]
        ));
    }

    #[test]
    fn vop1_literal_marker_extends_to_two_words() {
        // src0 = 0xFF (literal marker) -> one extra trailing code word.
        let word = (0x3Fu32 << 25) | (5 << 17) | (1 << 9) | 0xFF;
        let code = [word, 0x4048_0000];
        let result = scan(&code, 0, GcnArch::Gcn1_0);
        assert_eq!(result.sites[0].word_count, 2);
    }
}
