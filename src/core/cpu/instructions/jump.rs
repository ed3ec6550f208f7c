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

//! Unconditional jumps. The target takes effect after the delay slot;
//! linking forms write the address past the slot.

use crate::core::cpu::decode::Decoded;
use crate::core::cpu::Cpu;
use crate::core::error::Result;

impl Cpu {
    pub(crate) fn op_j(&mut self, i: Decoded) -> Result<()> {
        let target = (self.pc.wrapping_add(4) & 0xF000_0000) | (i.target26() << 2);
        self.branch_to(target);
        Ok(())
    }

    pub(crate) fn op_jal(&mut self, i: Decoded) -> Result<()> {
        let link = self.link_addr();
        self.write_reg(31, link);
        self.op_j(i)
    }

    pub(crate) fn op_jr(&mut self, i: Decoded) -> Result<()> {
        let target = self.read_reg(i.rs()) as u32;
        self.branch_to(target);
        Ok(())
    }

    pub(crate) fn op_jalr(&mut self, i: Decoded) -> Result<()> {
        let target = self.read_reg(i.rs()) as u32;
        let link = self.link_addr();
        self.write_reg(i.rd(), link);
        self.branch_to(target);
        Ok(())
    }
}
