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

//! Bitwise instructions. All operate on the full 64-bit registers;
//! the immediate forms zero-extend their operand.

use crate::core::cpu::decode::Decoded;
use crate::core::cpu::Cpu;
use crate::core::error::Result;

impl Cpu {
    pub(crate) fn op_and(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()) & self.read_reg(i.rt());
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_or(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()) | self.read_reg(i.rt());
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_xor(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()) ^ self.read_reg(i.rt());
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_nor(&mut self, i: Decoded) -> Result<()> {
        let v = !(self.read_reg(i.rs()) | self.read_reg(i.rt()));
        self.write_reg(i.rd(), v);
        Ok(())
    }

    pub(crate) fn op_andi(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()) & i.imm16() as u64;
        self.write_reg(i.rt(), v);
        Ok(())
    }

    pub(crate) fn op_ori(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()) | i.imm16() as u64;
        self.write_reg(i.rt(), v);
        Ok(())
    }

    pub(crate) fn op_xori(&mut self, i: Decoded) -> Result<()> {
        let v = self.read_reg(i.rs()) ^ i.imm16() as u64;
        self.write_reg(i.rt(), v);
        Ok(())
    }
}
