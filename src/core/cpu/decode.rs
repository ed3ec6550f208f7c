// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 r64core contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Instruction decoding
//!
//! A 32-bit instruction word is classified once into an [`Op`] tag; the
//! operand fields stay packed in the word and are extracted by the
//! accessors on [`Decoded`]. Blocks of `Decoded` values are what the
//! block cache stores, so this type is deliberately small (8 bytes).

/// Fully classified operation tag.
///
/// `Reserved` covers every encoding the core does not implement;
/// executing one is the malformed-instruction halt path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    // SPECIAL
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    Jr,
    Jalr,
    Syscall,
    Break,
    Sync,
    Mfhi,
    Mthi,
    Mflo,
    Mtlo,
    Dsllv,
    Dsrlv,
    Dsrav,
    Mult,
    Multu,
    Div,
    Divu,
    Dmult,
    Dmultu,
    Ddiv,
    Ddivu,
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    Dadd,
    Daddu,
    Dsub,
    Dsubu,
    Dsll,
    Dsrl,
    Dsra,
    Dsll32,
    Dsrl32,
    Dsra32,
    // REGIMM
    Bltz,
    Bgez,
    Bltzl,
    Bgezl,
    Bltzal,
    Bgezal,
    Bltzall,
    Bgezall,
    // Jumps and branches
    J,
    Jal,
    Beq,
    Bne,
    Blez,
    Bgtz,
    Beql,
    Bnel,
    Blezl,
    Bgtzl,
    // Immediate ALU
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    Daddi,
    Daddiu,
    // Loads and stores
    Ldl,
    Ldr,
    Lb,
    Lh,
    Lwl,
    Lw,
    Lbu,
    Lhu,
    Lwr,
    Lwu,
    Sb,
    Sh,
    Swl,
    Sw,
    Sdl,
    Sdr,
    Swr,
    Cache,
    Ll,
    Lwc1,
    Ldc1,
    Ld,
    Sc,
    Swc1,
    Sdc1,
    Sd,
    // COP0
    Mfc0,
    Mtc0,
    Tlbr,
    Tlbwi,
    Tlbwr,
    Tlbp,
    Eret,
    // COP1 moves and control
    Mfc1,
    Dmfc1,
    Cfc1,
    Mtc1,
    Dmtc1,
    Ctc1,
    Bc1f,
    Bc1t,
    Bc1fl,
    Bc1tl,
    // COP1 arithmetic (format in the word's fmt field)
    FpAdd,
    FpSub,
    FpMul,
    FpDiv,
    FpSqrt,
    FpAbs,
    FpMov,
    FpNeg,
    FpRoundL,
    FpTruncL,
    FpCeilL,
    FpFloorL,
    FpRoundW,
    FpTruncW,
    FpCeilW,
    FpFloorW,
    FpCvtS,
    FpCvtD,
    FpCvtW,
    FpCvtL,
    // COP1 compares: quiet family
    FpCf,
    FpCun,
    FpCeq,
    FpCueq,
    FpColt,
    FpCult,
    FpCole,
    FpCule,
    // COP1 compares: signalling family (NaN operand is fatal)
    FpCsf,
    FpCngle,
    FpCseq,
    FpCngl,
    FpClt,
    FpCnge,
    FpCle,
    FpCngt,
    // Everything else
    Reserved,
}

/// COP1 operand format, from the word's fmt field (bits [25:21]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpFormat {
    Single,
    Double,
    Word,
    Long,
    Invalid,
}

/// A decoded instruction: the operation tag plus the raw word the
/// operand fields are extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub op: Op,
    pub word: u32,
}

impl Decoded {
    #[inline(always)]
    pub fn rs(&self) -> u8 {
        ((self.word >> 21) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn rt(&self) -> u8 {
        ((self.word >> 16) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn rd(&self) -> u8 {
        ((self.word >> 11) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn sa(&self) -> u8 {
        ((self.word >> 6) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn imm16(&self) -> u16 {
        (self.word & 0xFFFF) as u16
    }

    /// Sign-extended 16-bit immediate.
    #[inline(always)]
    pub fn simm16(&self) -> i64 {
        (self.imm16() as i16) as i64
    }

    #[inline(always)]
    pub fn target26(&self) -> u32 {
        self.word & 0x03FF_FFFF
    }

    // COP1 field aliases
    #[inline(always)]
    pub fn ft(&self) -> u8 {
        self.rt()
    }

    #[inline(always)]
    pub fn fs(&self) -> u8 {
        self.rd()
    }

    #[inline(always)]
    pub fn fd(&self) -> u8 {
        self.sa()
    }

    #[inline(always)]
    pub fn fmt(&self) -> FpFormat {
        match (self.word >> 21) & 0x1F {
            16 => FpFormat::Single,
            17 => FpFormat::Double,
            20 => FpFormat::Word,
            21 => FpFormat::Long,
            _ => FpFormat::Invalid,
        }
    }

    /// Is this a branch/jump (a natural block boundary)?
    pub fn is_jump(&self) -> bool {
        use Op::*;
        matches!(
            self.op,
            Jr | Jalr
                | J
                | Jal
                | Beq
                | Bne
                | Blez
                | Bgtz
                | Beql
                | Bnel
                | Blezl
                | Bgtzl
                | Bltz
                | Bgez
                | Bltzl
                | Bgezl
                | Bltzal
                | Bgezal
                | Bltzall
                | Bgezall
                | Bc1f
                | Bc1t
                | Bc1fl
                | Bc1tl
                | Eret
        )
    }
}

/// Classify one instruction word.
pub fn decode(word: u32) -> Decoded {
    let op = match word >> 26 {
        0x00 => decode_special(word),
        0x01 => decode_regimm(word),
        0x02 => Op::J,
        0x03 => Op::Jal,
        0x04 => Op::Beq,
        0x05 => Op::Bne,
        0x06 => Op::Blez,
        0x07 => Op::Bgtz,
        0x08 => Op::Addi,
        0x09 => Op::Addiu,
        0x0A => Op::Slti,
        0x0B => Op::Sltiu,
        0x0C => Op::Andi,
        0x0D => Op::Ori,
        0x0E => Op::Xori,
        0x0F => Op::Lui,
        0x10 => decode_cop0(word),
        0x11 => decode_cop1(word),
        0x14 => Op::Beql,
        0x15 => Op::Bnel,
        0x16 => Op::Blezl,
        0x17 => Op::Bgtzl,
        0x18 => Op::Daddi,
        0x19 => Op::Daddiu,
        0x1A => Op::Ldl,
        0x1B => Op::Ldr,
        0x20 => Op::Lb,
        0x21 => Op::Lh,
        0x22 => Op::Lwl,
        0x23 => Op::Lw,
        0x24 => Op::Lbu,
        0x25 => Op::Lhu,
        0x26 => Op::Lwr,
        0x27 => Op::Lwu,
        0x28 => Op::Sb,
        0x29 => Op::Sh,
        0x2A => Op::Swl,
        0x2B => Op::Sw,
        0x2C => Op::Sdl,
        0x2D => Op::Sdr,
        0x2E => Op::Swr,
        0x2F => Op::Cache,
        0x30 => Op::Ll,
        0x31 => Op::Lwc1,
        0x35 => Op::Ldc1,
        0x37 => Op::Ld,
        0x38 => Op::Sc,
        0x39 => Op::Swc1,
        0x3D => Op::Sdc1,
        0x3F => Op::Sd,
        _ => Op::Reserved,
    };
    Decoded { op, word }
}

fn decode_special(word: u32) -> Op {
    match word & 0x3F {
        0x00 => Op::Sll,
        0x02 => Op::Srl,
        0x03 => Op::Sra,
        0x04 => Op::Sllv,
        0x06 => Op::Srlv,
        0x07 => Op::Srav,
        0x08 => Op::Jr,
        0x09 => Op::Jalr,
        0x0C => Op::Syscall,
        0x0D => Op::Break,
        0x0F => Op::Sync,
        0x10 => Op::Mfhi,
        0x11 => Op::Mthi,
        0x12 => Op::Mflo,
        0x13 => Op::Mtlo,
        0x14 => Op::Dsllv,
        0x16 => Op::Dsrlv,
        0x17 => Op::Dsrav,
        0x18 => Op::Mult,
        0x19 => Op::Multu,
        0x1A => Op::Div,
        0x1B => Op::Divu,
        0x1C => Op::Dmult,
        0x1D => Op::Dmultu,
        0x1E => Op::Ddiv,
        0x1F => Op::Ddivu,
        0x20 => Op::Add,
        0x21 => Op::Addu,
        0x22 => Op::Sub,
        0x23 => Op::Subu,
        0x24 => Op::And,
        0x25 => Op::Or,
        0x26 => Op::Xor,
        0x27 => Op::Nor,
        0x2A => Op::Slt,
        0x2B => Op::Sltu,
        0x2C => Op::Dadd,
        0x2D => Op::Daddu,
        0x2E => Op::Dsub,
        0x2F => Op::Dsubu,
        0x38 => Op::Dsll,
        0x3A => Op::Dsrl,
        0x3B => Op::Dsra,
        0x3C => Op::Dsll32,
        0x3E => Op::Dsrl32,
        0x3F => Op::Dsra32,
        _ => Op::Reserved,
    }
}

fn decode_regimm(word: u32) -> Op {
    match (word >> 16) & 0x1F {
        0x00 => Op::Bltz,
        0x01 => Op::Bgez,
        0x02 => Op::Bltzl,
        0x03 => Op::Bgezl,
        0x10 => Op::Bltzal,
        0x11 => Op::Bgezal,
        0x12 => Op::Bltzall,
        0x13 => Op::Bgezall,
        _ => Op::Reserved,
    }
}

fn decode_cop0(word: u32) -> Op {
    match (word >> 21) & 0x1F {
        0x00 => Op::Mfc0,
        0x04 => Op::Mtc0,
        0x10..=0x1F => match word & 0x3F {
            0x01 => Op::Tlbr,
            0x02 => Op::Tlbwi,
            0x06 => Op::Tlbwr,
            0x08 => Op::Tlbp,
            0x18 => Op::Eret,
            _ => Op::Reserved,
        },
        _ => Op::Reserved,
    }
}

fn decode_cop1(word: u32) -> Op {
    match (word >> 21) & 0x1F {
        0x00 => Op::Mfc1,
        0x01 => Op::Dmfc1,
        0x02 => Op::Cfc1,
        0x04 => Op::Mtc1,
        0x05 => Op::Dmtc1,
        0x06 => Op::Ctc1,
        0x08 => match (word >> 16) & 0x3 {
            0x0 => Op::Bc1f,
            0x1 => Op::Bc1t,
            0x2 => Op::Bc1fl,
            _ => Op::Bc1tl,
        },
        16 | 17 | 20 | 21 => match word & 0x3F {
            0x00 => Op::FpAdd,
            0x01 => Op::FpSub,
            0x02 => Op::FpMul,
            0x03 => Op::FpDiv,
            0x04 => Op::FpSqrt,
            0x05 => Op::FpAbs,
            0x06 => Op::FpMov,
            0x07 => Op::FpNeg,
            0x08 => Op::FpRoundL,
            0x09 => Op::FpTruncL,
            0x0A => Op::FpCeilL,
            0x0B => Op::FpFloorL,
            0x0C => Op::FpRoundW,
            0x0D => Op::FpTruncW,
            0x0E => Op::FpCeilW,
            0x0F => Op::FpFloorW,
            0x20 => Op::FpCvtS,
            0x21 => Op::FpCvtD,
            0x24 => Op::FpCvtW,
            0x25 => Op::FpCvtL,
            0x30 => Op::FpCf,
            0x31 => Op::FpCun,
            0x32 => Op::FpCeq,
            0x33 => Op::FpCueq,
            0x34 => Op::FpColt,
            0x35 => Op::FpCult,
            0x36 => Op::FpCole,
            0x37 => Op::FpCule,
            0x38 => Op::FpCsf,
            0x39 => Op::FpCngle,
            0x3A => Op::FpCseq,
            0x3B => Op::FpCngl,
            0x3C => Op::FpClt,
            0x3D => Op::FpCnge,
            0x3E => Op::FpCle,
            0x3F => Op::FpCngt,
            _ => Op::Reserved,
        },
        _ => Op::Reserved,
    }
}
