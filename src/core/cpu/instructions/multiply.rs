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

//! Multiply/divide and the HI/LO registers. Division by zero leaves
//! HI/LO untouched and logs, matching the reference interpreter.

use crate::core::cpu::decode::Decoded;
use crate::core::cpu::Cpu;
use crate::core::error::Result;

impl Cpu {
    pub(crate) fn op_mult(&mut self, i: Decoded) -> Result<()> {
        let prod = (self.read_reg(i.rs()) as i32 as i64) * (self.read_reg(i.rt()) as i32 as i64);
        self.lo = prod as i32 as i64 as u64;
        self.hi = (prod >> 32) as i64 as u64;
        Ok(())
    }

    pub(crate) fn op_multu(&mut self, i: Decoded) -> Result<()> {
        let prod = (self.read_reg(i.rs()) as u32 as u64) * (self.read_reg(i.rt()) as u32 as u64);
        self.lo = prod as i32 as i64 as u64;
        self.hi = (prod >> 32) as i32 as i64 as u64;
        Ok(())
    }

    pub(crate) fn op_div(&mut self, i: Decoded) -> Result<()> {
        let dividend = self.read_reg(i.rs()) as i32;
        let divisor = self.read_reg(i.rt()) as i32;
        if divisor != 0 {
            self.lo = dividend.wrapping_div(divisor) as i64 as u64;
            self.hi = dividend.wrapping_rem(divisor) as i64 as u64;
        } else {
            log::warn!("DIV by zero at pc=0x{:08X}", self.pc);
        }
        Ok(())
    }

    pub(crate) fn op_divu(&mut self, i: Decoded) -> Result<()> {
        let dividend = self.read_reg(i.rs()) as u32;
        let divisor = self.read_reg(i.rt()) as u32;
        if divisor != 0 {
            self.lo = (dividend / divisor) as i32 as i64 as u64;
            self.hi = (dividend % divisor) as i32 as i64 as u64;
        } else {
            log::warn!("DIVU by zero at pc=0x{:08X}", self.pc);
        }
        Ok(())
    }

    pub(crate) fn op_dmult(&mut self, i: Decoded) -> Result<()> {
        let prod = (self.read_reg(i.rs()) as i64 as i128) * (self.read_reg(i.rt()) as i64 as i128);
        self.lo = prod as u64;
        self.hi = (prod >> 64) as u64;
        Ok(())
    }

    pub(crate) fn op_dmultu(&mut self, i: Decoded) -> Result<()> {
        let prod = (self.read_reg(i.rs()) as u128) * (self.read_reg(i.rt()) as u128);
        self.lo = prod as u64;
        self.hi = (prod >> 64) as u64;
        Ok(())
    }

    pub(crate) fn op_ddiv(&mut self, i: Decoded) -> Result<()> {
        let dividend = self.read_reg(i.rs()) as i64;
        let divisor = self.read_reg(i.rt()) as i64;
        if divisor != 0 {
            self.lo = dividend.wrapping_div(divisor) as u64;
            self.hi = dividend.wrapping_rem(divisor) as u64;
        } else {
            log::warn!("DDIV by zero at pc=0x{:08X}", self.pc);
        }
        Ok(())
    }

    pub(crate) fn op_ddivu(&mut self, i: Decoded) -> Result<()> {
        let dividend = self.read_reg(i.rs());
        let divisor = self.read_reg(i.rt());
        if divisor != 0 {
            self.lo = dividend / divisor;
            self.hi = dividend % divisor;
        } else {
            log::warn!("DDIVU by zero at pc=0x{:08X}", self.pc);
        }
        Ok(())
    }

    pub(crate) fn op_mfhi(&mut self, i: Decoded) -> Result<()> {
        self.write_reg(i.rd(), self.hi);
        Ok(())
    }

    pub(crate) fn op_mthi(&mut self, i: Decoded) -> Result<()> {
        self.hi = self.read_reg(i.rs());
        Ok(())
    }

    pub(crate) fn op_mflo(&mut self, i: Decoded) -> Result<()> {
        self.write_reg(i.rd(), self.lo);
        Ok(())
    }

    pub(crate) fn op_mtlo(&mut self, i: Decoded) -> Result<()> {
        self.lo = self.read_reg(i.rs());
        Ok(())
    }
}
