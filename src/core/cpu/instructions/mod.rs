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

//! Instruction execution
//!
//! One handler per operation, grouped by family. Every handler returns
//! `Result` so fatal conditions (reserved encodings, malformed COP0
//! writes) unwind to the session as [`CoreError::Halted`] instead of
//! being flagged globally.
//!
//! [`CoreError::Halted`]: crate::core::error::CoreError

mod arithmetic;
mod branch;
mod cop0;
mod cop1;
mod jump;
mod load;
mod logical;
mod multiply;
mod shift;
mod store;

use super::decode::{Decoded, Op};
use super::Cpu;
use crate::core::error::{CoreError, Result};
use crate::core::memory::Bus;

impl Cpu {
    pub(crate) fn execute(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        match i.op {
            // Shifts
            Op::Sll => self.op_sll(i),
            Op::Srl => self.op_srl(i),
            Op::Sra => self.op_sra(i),
            Op::Sllv => self.op_sllv(i),
            Op::Srlv => self.op_srlv(i),
            Op::Srav => self.op_srav(i),
            Op::Dsll => self.op_dsll(i),
            Op::Dsrl => self.op_dsrl(i),
            Op::Dsra => self.op_dsra(i),
            Op::Dsll32 => self.op_dsll32(i),
            Op::Dsrl32 => self.op_dsrl32(i),
            Op::Dsra32 => self.op_dsra32(i),
            Op::Dsllv => self.op_dsllv(i),
            Op::Dsrlv => self.op_dsrlv(i),
            Op::Dsrav => self.op_dsrav(i),

            // Arithmetic
            Op::Add => self.op_add(i),
            Op::Addu => self.op_addu(i),
            Op::Sub => self.op_sub(i),
            Op::Subu => self.op_subu(i),
            Op::Dadd => self.op_dadd(i),
            Op::Daddu => self.op_daddu(i),
            Op::Dsub => self.op_dsub(i),
            Op::Dsubu => self.op_dsubu(i),
            Op::Slt => self.op_slt(i),
            Op::Sltu => self.op_sltu(i),
            Op::Addi => self.op_addi(i),
            Op::Addiu => self.op_addiu(i),
            Op::Daddi => self.op_daddi(i),
            Op::Daddiu => self.op_daddiu(i),
            Op::Slti => self.op_slti(i),
            Op::Sltiu => self.op_sltiu(i),
            Op::Lui => self.op_lui(i),

            // Logical
            Op::And => self.op_and(i),
            Op::Or => self.op_or(i),
            Op::Xor => self.op_xor(i),
            Op::Nor => self.op_nor(i),
            Op::Andi => self.op_andi(i),
            Op::Ori => self.op_ori(i),
            Op::Xori => self.op_xori(i),

            // Multiply/divide and HI/LO
            Op::Mult => self.op_mult(i),
            Op::Multu => self.op_multu(i),
            Op::Div => self.op_div(i),
            Op::Divu => self.op_divu(i),
            Op::Dmult => self.op_dmult(i),
            Op::Dmultu => self.op_dmultu(i),
            Op::Ddiv => self.op_ddiv(i),
            Op::Ddivu => self.op_ddivu(i),
            Op::Mfhi => self.op_mfhi(i),
            Op::Mthi => self.op_mthi(i),
            Op::Mflo => self.op_mflo(i),
            Op::Mtlo => self.op_mtlo(i),

            // Jumps
            Op::J => self.op_j(i),
            Op::Jal => self.op_jal(i),
            Op::Jr => self.op_jr(i),
            Op::Jalr => self.op_jalr(i),

            // Branches
            Op::Beq => self.op_beq(i),
            Op::Bne => self.op_bne(i),
            Op::Blez => self.op_blez(i),
            Op::Bgtz => self.op_bgtz(i),
            Op::Beql => self.op_beql(i),
            Op::Bnel => self.op_bnel(i),
            Op::Blezl => self.op_blezl(i),
            Op::Bgtzl => self.op_bgtzl(i),
            Op::Bltz => self.op_bltz(i),
            Op::Bgez => self.op_bgez(i),
            Op::Bltzl => self.op_bltzl(i),
            Op::Bgezl => self.op_bgezl(i),
            Op::Bltzal => self.op_bltzal(i),
            Op::Bgezal => self.op_bgezal(i),
            Op::Bltzall => self.op_bltzall(i),
            Op::Bgezall => self.op_bgezall(i),
            Op::Bc1f => self.op_bc1f(i),
            Op::Bc1t => self.op_bc1t(i),
            Op::Bc1fl => self.op_bc1fl(i),
            Op::Bc1tl => self.op_bc1tl(i),

            // Loads
            Op::Lb => self.op_lb(i, bus),
            Op::Lbu => self.op_lbu(i, bus),
            Op::Lh => self.op_lh(i, bus),
            Op::Lhu => self.op_lhu(i, bus),
            Op::Lw => self.op_lw(i, bus),
            Op::Lwu => self.op_lwu(i, bus),
            Op::Ld => self.op_ld(i, bus),
            Op::Lwl => self.op_lwl(i, bus),
            Op::Lwr => self.op_lwr(i, bus),
            Op::Ldl => self.op_ldl(i, bus),
            Op::Ldr => self.op_ldr(i, bus),
            Op::Ll => self.op_ll(i, bus),
            Op::Lwc1 => self.op_lwc1(i, bus),
            Op::Ldc1 => self.op_ldc1(i, bus),

            // Stores
            Op::Sb => self.op_sb(i, bus),
            Op::Sh => self.op_sh(i, bus),
            Op::Sw => self.op_sw(i, bus),
            Op::Sd => self.op_sd(i, bus),
            Op::Swl => self.op_swl(i, bus),
            Op::Swr => self.op_swr(i, bus),
            Op::Sdl => self.op_sdl(i, bus),
            Op::Sdr => self.op_sdr(i, bus),
            Op::Sc => self.op_sc(i, bus),
            Op::Swc1 => self.op_swc1(i, bus),
            Op::Sdc1 => self.op_sdc1(i, bus),
            Op::Cache => Ok(()),
            Op::Sync => Ok(()),

            // COP0
            Op::Mfc0 => self.op_mfc0(i),
            Op::Mtc0 => self.op_mtc0(i),
            Op::Tlbr => self.op_tlbr(i),
            Op::Tlbwi => self.op_tlbwi(i, bus),
            Op::Tlbwr => self.op_tlbwr(i, bus),
            Op::Tlbp => self.op_tlbp(i),
            Op::Eret => self.op_eret(i),
            Op::Syscall => self.op_syscall(i),
            Op::Break => self.op_break(i),

            // COP1
            Op::Mfc1 => self.op_mfc1(i),
            Op::Dmfc1 => self.op_dmfc1(i),
            Op::Cfc1 => self.op_cfc1(i),
            Op::Mtc1 => self.op_mtc1(i),
            Op::Dmtc1 => self.op_dmtc1(i),
            Op::Ctc1 => self.op_ctc1(i),
            Op::FpAdd => self.fp_binary(i, |a, b| a + b, |a, b| a + b),
            Op::FpSub => self.fp_binary(i, |a, b| a - b, |a, b| a - b),
            Op::FpMul => self.fp_binary(i, |a, b| a * b, |a, b| a * b),
            Op::FpDiv => self.fp_binary(i, |a, b| a / b, |a, b| a / b),
            Op::FpSqrt => self.fp_unary(i, |a| a.sqrt(), |a| a.sqrt()),
            Op::FpAbs => self.fp_unary(i, |a| a.abs(), |a| a.abs()),
            Op::FpNeg => self.fp_unary(i, |a| -a, |a| -a),
            Op::FpMov => self.op_fp_mov(i),
            Op::FpRoundW => self.fp_to_word(i, |v| v.round_ties_even()),
            Op::FpTruncW => self.fp_to_word(i, |v| v.trunc()),
            Op::FpCeilW => self.fp_to_word(i, |v| v.ceil()),
            Op::FpFloorW => self.fp_to_word(i, |v| v.floor()),
            Op::FpRoundL => self.fp_to_long(i, |v| v.round_ties_even()),
            Op::FpTruncL => self.fp_to_long(i, |v| v.trunc()),
            Op::FpCeilL => self.fp_to_long(i, |v| v.ceil()),
            Op::FpFloorL => self.fp_to_long(i, |v| v.floor()),
            Op::FpCvtS => self.op_cvt_s(i),
            Op::FpCvtD => self.op_cvt_d(i),
            Op::FpCvtW => self.op_cvt_w(i),
            Op::FpCvtL => self.op_cvt_l(i),
            Op::FpCf => self.fp_compare(i, false, false, |_, _| false),
            Op::FpCun => self.fp_compare(i, false, true, |_, _| false),
            Op::FpCeq => self.fp_compare(i, false, false, |a, b| a == b),
            Op::FpCueq => self.fp_compare(i, false, true, |a, b| a == b),
            Op::FpColt => self.fp_compare(i, false, false, |a, b| a < b),
            Op::FpCult => self.fp_compare(i, false, true, |a, b| a < b),
            Op::FpCole => self.fp_compare(i, false, false, |a, b| a <= b),
            Op::FpCule => self.fp_compare(i, false, true, |a, b| a <= b),
            Op::FpCsf => self.fp_compare(i, true, false, |_, _| false),
            Op::FpCngle => self.fp_compare(i, true, false, |_, _| false),
            Op::FpCseq => self.fp_compare(i, true, false, |a, b| a == b),
            Op::FpCngl => self.fp_compare(i, true, false, |a, b| a == b),
            Op::FpClt => self.fp_compare(i, true, false, |a, b| a < b),
            Op::FpCnge => self.fp_compare(i, true, false, |a, b| a < b),
            Op::FpCle => self.fp_compare(i, true, false, |a, b| a <= b),
            Op::FpCngt => self.fp_compare(i, true, false, |a, b| a <= b),

            Op::Reserved => Err(CoreError::halted(
                format!("reserved instruction 0x{:08X}", i.word),
                self.pc,
            )),
        }
    }

    /// Effective address of a load/store: base register plus the
    /// sign-extended offset, in 32-bit address arithmetic.
    #[inline]
    pub(crate) fn effective_addr(&self, i: Decoded) -> u32 {
        (self.read_reg(i.rs()) as u32).wrapping_add(i.simm16() as u32)
    }
}
