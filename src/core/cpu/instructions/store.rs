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

//! Store instructions. Translation failures raise the refill exception
//! with the write cause code; the bus handles block-cache invalidation
//! for every successful store.

use crate::core::cpu::decode::Decoded;
use crate::core::cpu::tlb::AccessKind;
use crate::core::cpu::Cpu;
use crate::core::error::Result;
use crate::core::memory::Bus;

impl Cpu {
    pub(crate) fn op_sb(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Write) else {
            return Ok(());
        };
        bus.write8(phys, self.read_reg(i.rt()) as u8);
        Ok(())
    }

    pub(crate) fn op_sh(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Write) else {
            return Ok(());
        };
        bus.write16(phys, self.read_reg(i.rt()) as u16);
        Ok(())
    }

    pub(crate) fn op_sw(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Write) else {
            return Ok(());
        };
        bus.write32(phys, self.read_reg(i.rt()) as u32);
        Ok(())
    }

    pub(crate) fn op_sd(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Write) else {
            return Ok(());
        };
        bus.write64(phys, self.read_reg(i.rt()));
        Ok(())
    }

    pub(crate) fn op_swl(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_addr(i);
        let Some(phys) = self.translate(vaddr & !3, AccessKind::Write) else {
            return Ok(());
        };
        let n = vaddr & 3;
        let rt = self.read_reg(i.rt()) as u32;
        let mem = bus.read32(phys);
        let keep = if n == 0 { 0 } else { !0u32 << (8 * (4 - n)) };
        bus.write32(phys, (mem & keep) | (rt >> (8 * n)));
        Ok(())
    }

    pub(crate) fn op_swr(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_addr(i);
        let Some(phys) = self.translate(vaddr & !3, AccessKind::Write) else {
            return Ok(());
        };
        let n = vaddr & 3;
        let rt = self.read_reg(i.rt()) as u32;
        let mem = bus.read32(phys);
        let keep = if n == 3 { 0 } else { !0u32 >> (8 * (n + 1)) };
        bus.write32(phys, (mem & keep) | (rt << (8 * (3 - n))));
        Ok(())
    }

    pub(crate) fn op_sdl(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_addr(i);
        let Some(phys) = self.translate(vaddr & !7, AccessKind::Write) else {
            return Ok(());
        };
        let n = vaddr & 7;
        let rt = self.read_reg(i.rt());
        let mem = bus.read64(phys);
        let keep = if n == 0 { 0 } else { !0u64 << (8 * (8 - n)) };
        bus.write64(phys, (mem & keep) | (rt >> (8 * n)));
        Ok(())
    }

    pub(crate) fn op_sdr(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        let vaddr = self.effective_addr(i);
        let Some(phys) = self.translate(vaddr & !7, AccessKind::Write) else {
            return Ok(());
        };
        let n = vaddr & 7;
        let rt = self.read_reg(i.rt());
        let mem = bus.read64(phys);
        let keep = if n == 7 { 0 } else { !0u64 >> (8 * (n + 1)) };
        bus.write64(phys, (mem & keep) | (rt << (8 * (7 - n))));
        Ok(())
    }

    /// Store conditional: succeeds only when the LL bit is still armed;
    /// rt reports the outcome either way.
    pub(crate) fn op_sc(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        if self.ll_bit {
            let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Write) else {
                return Ok(());
            };
            bus.write32(phys, self.read_reg(i.rt()) as u32);
            self.write_reg(i.rt(), 1);
        } else {
            self.write_reg(i.rt(), 0);
        }
        self.ll_bit = false;
        Ok(())
    }

    pub(crate) fn op_swc1(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Write) else {
            return Ok(());
        };
        bus.write32(phys, self.cop1.read_single_bits(i.ft() as usize));
        Ok(())
    }

    pub(crate) fn op_sdc1(&mut self, i: Decoded, bus: &mut Bus) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let Some(phys) = self.translate(self.effective_addr(i), AccessKind::Write) else {
            return Ok(());
        };
        bus.write64(phys, self.cop1.read_double_bits(i.ft() as usize));
        Ok(())
    }
}
