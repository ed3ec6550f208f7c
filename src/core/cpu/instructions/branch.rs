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

//! Conditional branches.
//!
//! Ordinary branches execute their delay slot whether or not the
//! branch is taken. The "likely" forms nullify the slot on a not-taken
//! branch. The and-link forms write r31 unconditionally, before the
//! condition is known to have been taken.

use crate::core::cpu::decode::Decoded;
use crate::core::cpu::Cpu;
use crate::core::error::Result;

impl Cpu {
    #[inline]
    fn branch_if(&mut self, i: Decoded, taken: bool) {
        if taken {
            let target = self.branch_addr(i);
            self.branch_to(target);
        }
    }

    #[inline]
    fn branch_likely_if(&mut self, i: Decoded, taken: bool) {
        if taken {
            let target = self.branch_addr(i);
            self.branch_to(target);
        } else {
            self.nullify_delay_slot();
        }
    }

    pub(crate) fn op_beq(&mut self, i: Decoded) -> Result<()> {
        let taken = self.read_reg(i.rs()) == self.read_reg(i.rt());
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bne(&mut self, i: Decoded) -> Result<()> {
        let taken = self.read_reg(i.rs()) != self.read_reg(i.rt());
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_blez(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) <= 0;
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bgtz(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) > 0;
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_beql(&mut self, i: Decoded) -> Result<()> {
        let taken = self.read_reg(i.rs()) == self.read_reg(i.rt());
        self.branch_likely_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bnel(&mut self, i: Decoded) -> Result<()> {
        let taken = self.read_reg(i.rs()) != self.read_reg(i.rt());
        self.branch_likely_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_blezl(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) <= 0;
        self.branch_likely_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bgtzl(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) > 0;
        self.branch_likely_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bltz(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) < 0;
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bgez(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) >= 0;
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bltzl(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) < 0;
        self.branch_likely_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bgezl(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) >= 0;
        self.branch_likely_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bltzal(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) < 0;
        let link = self.link_addr();
        self.write_reg(31, link);
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bgezal(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) >= 0;
        let link = self.link_addr();
        self.write_reg(31, link);
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bltzall(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) < 0;
        let link = self.link_addr();
        self.write_reg(31, link);
        self.branch_likely_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bgezall(&mut self, i: Decoded) -> Result<()> {
        let taken = (self.read_reg(i.rs()) as i64) >= 0;
        let link = self.link_addr();
        self.write_reg(31, link);
        self.branch_likely_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bc1f(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let taken = !self.cop1.condition();
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bc1t(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let taken = self.cop1.condition();
        self.branch_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bc1fl(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let taken = !self.cop1.condition();
        self.branch_likely_if(i, taken);
        Ok(())
    }

    pub(crate) fn op_bc1tl(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let taken = self.cop1.condition();
        self.branch_likely_if(i, taken);
        Ok(())
    }
}
