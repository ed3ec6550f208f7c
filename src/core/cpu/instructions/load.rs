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

//! Load instructions.
//!
//! A failed translation has already raised the TLB refill exception, so
//! the handler just returns and the step loop resumes at the vector.
//! The unaligned pairs (LWL/LWR, LDL/LDR) merge the covered bytes into
//! the destination, leaving the remaining bytes as they were.

use crate::core::cpu::cop0;
use crate::core::cpu::decode::Decoded;
use crate::core::cpu::tlb::AccessKind;
use crate::core::cpu::Cpu;
use crate::core::error::Result;
use crate::core::memory::Bus;

impl Cpu {
    pub(crate) fn op_lb(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        let v = bus.read8(phys) as i8 as i64 as u64;
        self.write_reg(i.rt(), v);
        Ok(())
    }

    pub(crate) fn op_lbu(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        self.write_reg(i.rt(), bus.read8(phys) as u64);
        Ok(())
    }

    pub(crate) fn op_lh(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        let v = bus.read16(phys) as i16 as i64 as u64;
        self.write_reg(i.rt(), v);
        Ok(())
    }

    pub(crate) fn op_lhu(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        self.write_reg(i.rt(), bus.read16(phys) as u64);
        Ok(())
    }

    pub(crate) fn op_lw(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        self.write_reg32(i.rt(), bus.read32(phys));
        Ok(())
    }

    pub(crate) fn op_lwu(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        self.write_reg(i.rt(), bus.read32(phys) as u64);
        Ok(())
    }

    pub(crate) fn op_ld(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        self.write_reg(i.rt(), bus.read64(phys));
        Ok(())
    }

    pub(crate) fn op_lwl(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_addr(i);
        let Some(phys) = self.translate(vaddr & !3, AccessKind::Read) else {
            return Ok(());
        };
        let n = vaddr & 3;
        let mem = bus.read32(phys);
        let old = self.read_reg(i.rt()) as u32;
        let keep = if n == 0 { 0 } else { (1u32 << (8 * n)) - 1 };
        let v = (mem << (8 * n)) | (old & keep);
        self.write_reg32(i.rt(), v);
        Ok(())
    }

    pub(crate) fn op_lwr(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_addr(i);
        let Some(phys) = self.translate(vaddr & !3, AccessKind::Read) else {
            return Ok(());
        };
        let n = vaddr & 3;
        let mem = bus.read32(phys);
        if n == 3 {
            self.write_reg32(i.rt(), mem);
        } else {
            let old = self.read_reg(i.rt());
            let keep = 0xFFFF_FFFFu32 << (8 * (n + 1));
            let low = ((old as u32) & keep) | (mem >> (8 * (3 - n)));
            // Upper register half is preserved; only the full-word case
            // sign-extends.
            self.write_reg(i.rt(), (old & 0xFFFF_FFFF_0000_0000) | low as u64);
        }
        Ok(())
    }

    pub(crate) fn op_ldl(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_addr(i);
        let Some(phys) = self.translate(vaddr & !7, AccessKind::Read) else {
            return Ok(());
        };
        let n = vaddr & 7;
        let mem = bus.read64(phys);
        let old = self.read_reg(i.rt());
        let keep = if n == 0 { 0 } else { (1u64 << (8 * n)) - 1 };
        let v = (mem << (8 * n)) | (old & keep);
        self.write_reg(i.rt(), v);
        Ok(())
    }

    pub(crate) fn op_ldr(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_addr(i);
        let Some(phys) = self.translate(vaddr & !7, AccessKind::Read) else {
            return Ok(());
        };
        let n = vaddr & 7;
        let mem = bus.read64(phys);
        let old = self.read_reg(i.rt());
        let keep = if n == 7 { 0 } else { !0u64 << (8 * (n + 1)) };
        let v = (old & keep) | (mem >> (8 * (7 - n)));
        self.write_reg(i.rt(), v);
        Ok(())
    }

    /// Load linked: a plain LW that arms the LL bit for a following SC.
    pub(crate) fn op_ll(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        self.write_reg32(i.rt(), bus.read32(phys));
        self.cop0.regs[cop0::LL_ADDR] = phys >> 4;
        self.ll_bit = true;
        Ok(())
    }

    pub(crate) fn op_lwc1(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        let bits = bus.read32(phys);
        self.cop1.write_single_bits(i.ft() as usize, bits);
        Ok(())
    }

    pub(crate) fn op_ldc1(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Read) else {
            return Ok(());
        };
        let bits = bus.read64(phys);
        self.cop1.write_double_bits(i.ft() as usize, bits);
        Ok(())
    }
}
