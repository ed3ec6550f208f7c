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

//! Integer add/subtract/compare instructions.
//!
//! 32-bit forms wrap and sign-extend their result into the 64-bit
//! register file; the trapping ADD/SUB/ADDI variants behave like their
//! unsigned twins here (no overflow exception is raised).

use crate::core::cpu::decode::Decoded;
use crate::core::cpu::Cpu;
use crate::core::error::Result;

impl Cpu {
    pub(crate) fn op_add(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rs()) as i32).wrapping_add(self.read_reg(i.rt()) as i32);
        self.write_reg32(i.rd(), v as u32);
        Ok(())
    }

    pub(crate) fn op_addu(&mut self, i: Decoded) -> Result<()> {
        self.op_add(i)
    }

    pub(crate) fn op_sub(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rs()) as i32).wrapping_sub(self.read_reg(i.rt()) as i32);
        self.write_reg32(i.rd(), v as u32);
        Ok(())
    }

    pub(crate) fn op_subu(&mut self, i: Decoded) -> Result<()> {
        self.op_sub(i)
    }

    pub(crate) fn op_dadd(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()).wrapping_add(self.read_reg(i.rt()));
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_daddu(&mut self, i: Decoded) -> Result<()> {
        self.op_dadd(i)
    }

    pub(crate) fn op_dsub(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()).wrapping_sub(self.read_reg(i.rt()));
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_dsubu(&mut self, i: Decoded) -> Result<()> {
        self.op_dsub(i)
    }

    pub(crate) fn op_slt(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rs()) as i64) < (self.read_reg(i.rt()) as i64);
        self.write_reg(i.rd(), v as u64);
        Ok(())
    }

    pub(crate) fn op_sltu(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()) < self.read_reg(i.rt());
        self.write_reg(i.rd(), v as u64);
        Ok(())
    }

    pub(crate) fn op_addi(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rs()) as i32).wrapping_add(i.simm16() as i32);
        self.write_reg32(i.rt(), v as u32);
        Ok(())
    }

    pub(crate) fn op_addiu(&mut self, i: Decoded) -> Result<()> {
        self.op_addi(i)
    }

    pub(crate) fn op_daddi(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()).wrapping_add(i.simm16() as u64);
        self.write_reg(i.rt(), v);
        Ok(())
    }

    pub(crate) fn op_daddiu(&mut self, i: Decoded) -> Result<()> {
        self.op_daddi(i)
    }

    pub(crate) fn op_slti(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rs()) as i64) < i.simm16();
        self.write_reg(i.rt(), v as u64);
        Ok(())
    }

    pub(crate) fn op_sltiu(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()) < i.simm16() as u64;
        self.write_reg(i.rt(), v as u64);
        Ok(())
    }

    pub(crate) fn op_lui(&mut self, i: Decoded) -> Result<()> {
        self.write_reg32(i.rt(), (i.imm16() as u32) << 16);
        Ok(())
    }
}
