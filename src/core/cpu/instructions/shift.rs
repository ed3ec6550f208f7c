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

//! Shift instructions. Variable forms take the amount from rs, masked
//! to 5 bits (32-bit shifts) or 6 bits (64-bit shifts).

use crate::core::cpu::decode::Decoded;
use crate::core::cpu::Cpu;
use crate::core::error::Result;

impl Cpu {
    pub(crate) fn op_sll(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rt()) as u32) << i.sa();
        self.write_reg32(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_srl(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rt()) as u32) >> i.sa();
        self.write_reg32(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_sra(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rt()) as i32) >> i.sa();
        self.write_reg32(i.rd(), v as u32);
        Ok(())
    }

    pub(crate) fn op_sllv(&mut self, i: Decoded) -> Result<()> {
        let sa = self.read_reg(i.rs()) as u32 & 0x1F;
        let v = (self.read_reg(i.rt()) as u32) << sa;
        self.write_reg32(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_srlv(&mut self, i: Decoded) -> Result<()> {
        let sa = self.read_reg(i.rs()) as u32 & 0x1F;
        let v = (self.read_reg(i.rt()) as u32) >> sa;
        self.write_reg32(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_srav(&mut self, i: Decoded) -> Result<()> {
        let sa = self.read_reg(i.rs()) as u32 & 0x1F;
        let v = (self.read_reg(i.rt()) as i32) >> sa;
        self.write_reg32(i.rd(), v as u32);
        Ok(())
    }

    pub(crate) fn op_dsll(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rt()) << i.sa();
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_dsrl(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rt()) >> i.sa();
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_dsra(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rt()) as i64) >> i.sa();
        self.write_reg(i.rd(), v as u64);
        Ok(())
    }

    pub(crate) fn op_dsll32(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rt()) << (i.sa() + 32);
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_dsrl32(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rt()) >> (i.sa() + 32);
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_dsra32(&mut self, i: Decoded) -> Result<()> {
        let v = (self.read_reg(i.rt()) as i64) >> (i.sa() + 32);
        self.write_reg(i.rd(), v as u64);
        Ok(())
    }

    pub(crate) fn op_dsllv(&mut self, i: Decoded) -> Result<()> {
        let sa = self.read_reg(i.rs()) as u32 & 0x3F;
        let v = self.read_reg(i.rt()) << sa;
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_dsrlv(&mut self, i: Decoded) -> Result<()> {
        let sa = self.read_reg(i.rs()) as u32 & 0x3F;
        let v = self.read_reg(i.rt()) >> sa;
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_dsrav(&mut self, i: Decoded) -> Result<()> {
        let sa = self.read_reg(i.rs()) as u32 & 0x3F;
        let v = (self.read_reg(i.rt()) as i64) >> sa;
        self.write_reg(i.rd(), v as u64);
        Ok(())
    }
}
