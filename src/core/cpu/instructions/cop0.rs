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

//! COP0 instructions: register moves with their per-register write
//! rules, the four TLB operations, ERET and the software exceptions.
//!
//! MTC0's per-register behavior (field masks, ignored writes, fatal
//! writes) matches the reference core exactly, including its
//! limitations: writing a non-zero value to Cause or reading Random
//! halts the machine.

use crate::core::cpu::cop0::{self, ExceptionCode, Status};
use crate::core::cpu::decode::Decoded;
use crate::core::cpu::interrupt::EventKind;
use crate::core::cpu::tlb::{TlbWriteRegs, TLB_ENTRIES};
use crate::core::cpu::Cpu;
use crate::core::error::{CoreError, Result};
use crate::core::memory::Bus;

impl Cpu {
    pub(crate) fn op_mfc0(&mut self, i: Decoded) -> Result<()> {
        let rd = i.rd() as usize;
        let value = match rd {
            cop0::RANDOM => {
                return Err(CoreError::halted("MFC0 from Random", self.pc));
            }
            cop0::COUNT => self.count(),
            _ => self.cop0.regs[rd],
        };
        self.write_reg32(i.rt(), value);
        Ok(())
    }

    pub(crate) fn op_mtc0(&mut self, i: Decoded) -> Result<()> {
        let rd = i.rd() as usize;
        let value = self.read_reg(i.rt()) as u32;
        match rd {
            cop0::INDEX => {
                self.cop0.regs[cop0::INDEX] = value & 0x8000_003F;
                if self.cop0.regs[cop0::INDEX] & 0x3F > 31 {
                    return Err(CoreError::halted("MTC0 Index with index > 31", self.pc));
                }
            }
            cop0::RANDOM => {}
            cop0::ENTRY_LO0 => self.cop0.regs[cop0::ENTRY_LO0] = value & 0x3FFF_FFFF,
            cop0::ENTRY_LO1 => self.cop0.regs[cop0::ENTRY_LO1] = value & 0x3FFF_FFFF,
            cop0::CONTEXT => {
                self.cop0.regs[cop0::CONTEXT] =
                    (value & 0xFF80_0000) | (self.cop0.regs[cop0::CONTEXT] & 0x007F_FFF0);
            }
            cop0::PAGE_MASK => self.cop0.regs[cop0::PAGE_MASK] = value & 0x01FF_E000,
            cop0::WIRED => {
                self.cop0.regs[cop0::WIRED] = value;
                self.cop0.regs[cop0::RANDOM] = 31;
            }
            cop0::BAD_VADDR => {}
            cop0::COUNT => {
                self.scheduler.set_count(self.cycles, value);
                if self.scheduler.is_scheduled(EventKind::CompareTimer) {
                    let compare = self.cop0.regs[cop0::COMPARE];
                    let when = self.scheduler.cycles_until_count(self.cycles, compare);
                    self.scheduler.schedule(EventKind::CompareTimer, when);
                }
            }
            cop0::ENTRY_HI => self.cop0.regs[cop0::ENTRY_HI] = value & 0xFFFF_E0FF,
            cop0::COMPARE => {
                self.cop0.regs[cop0::COMPARE] = value;
                // Writing Compare acks the timer interrupt.
                self.cop0.regs[cop0::CAUSE] &= !cop0::CAUSE_IP7;
                let when = self.scheduler.cycles_until_count(self.cycles, value);
                self.scheduler.schedule(EventKind::CompareTimer, when);
            }
            cop0::STATUS => {
                let fr_flipped =
                    (self.cop0.regs[cop0::STATUS] ^ value) & Status::FR.bits() != 0;
                self.cop0.regs[cop0::STATUS] = value;
                if fr_flipped {
                    self.cop1.set_fr_mode(value & Status::FR.bits() != 0);
                }
                // A pending unmasked interrupt is taken before the next
                // instruction by the step loop's check.
            }
            cop0::CAUSE => {
                if value != 0 {
                    return Err(CoreError::halted("MTC0 Cause with non-zero value", self.pc));
                }
                self.cop0.regs[cop0::CAUSE] = 0;
            }
            cop0::EPC => self.cop0.regs[cop0::EPC] = value,
            cop0::PREVID => {}
            cop0::CONFIG => self.cop0.regs[cop0::CONFIG] = value,
            cop0::WATCH_LO => self.cop0.regs[cop0::WATCH_LO] = value,
            cop0::WATCH_HI => self.cop0.regs[cop0::WATCH_HI] = value,
            cop0::CACHE_ERROR => {}
            cop0::TAG_LO => self.cop0.regs[cop0::TAG_LO] = value & 0x0FFF_FFC0,
            cop0::TAG_HI => self.cop0.regs[cop0::TAG_HI] = 0,
            _ => {
                return Err(CoreError::halted(
                    format!("MTC0 to unknown register {}", rd),
                    self.pc,
                ));
            }
        }
        Ok(())
    }

    /// Read the entry selected by Index back into the TLB registers.
    pub(crate) fn op_tlbr(&mut self, _i: Decoded) -> Result<()> {
        let index = (self.cop0.regs[cop0::INDEX] & 0x3F) as usize;
        if index >= TLB_ENTRIES {
            return Err(CoreError::halted("TLBR with out-of-range Index", self.pc));
        }
        let e = self.tlb.entries[index];
        self.cop0.regs[cop0::PAGE_MASK] = e.mask << 13;
        self.cop0.regs[cop0::ENTRY_HI] = (e.vpn2 << 13) | e.asid as u32;
        self.cop0.regs[cop0::ENTRY_LO0] = (e.pfn_even << 6)
            | ((e.c_even as u32) << 3)
            | ((e.d_even as u32) << 2)
            | ((e.v_even as u32) << 1)
            | e.global as u32;
        self.cop0.regs[cop0::ENTRY_LO1] = (e.pfn_odd << 6)
            | ((e.c_odd as u32) << 3)
            | ((e.d_odd as u32) << 2)
            | ((e.v_odd as u32) << 1)
            | e.global as u32;
        Ok(())
    }

    pub(crate) fn op_tlbwi(&mut self, _i: Decoded, bus: &mut Bus) -> Result<()> {
        let index = (self.cop0.regs[cop0::INDEX] & 0x3F) as usize;
        if index >= TLB_ENTRIES {
            return Err(CoreError::halted("TLBWI with out-of-range Index", self.pc));
        }
        let regs = self.tlb_write_regs();
        self.tlb.write_entry(index, regs, bus);
        Ok(())
    }

    /// TLBWR picks its slot from Random, which counts down through the
    /// non-wired entries with Count.
    pub(crate) fn op_tlbwr(&mut self, _i: Decoded, bus: &mut Bus) -> Result<()> {
        let wired = self.cop0.regs[cop0::WIRED].min(31);
        let random = (self.count() / 2) % (32 - wired) + wired;
        self.cop0.regs[cop0::RANDOM] = random;
        let regs = self.tlb_write_regs();
        self.tlb.write_entry(random as usize, regs, bus);
        Ok(())
    }

    pub(crate) fn op_tlbp(&mut self, _i: Decoded) -> Result<()> {
        self.cop0.regs[cop0::INDEX] |= 0x8000_0000;
        if let Some(index) = self.tlb.probe(self.cop0.regs[cop0::ENTRY_HI]) {
            self.cop0.regs[cop0::INDEX] = index as u32;
        }
        Ok(())
    }

    pub(crate) fn op_eret(&mut self, _i: Decoded) -> Result<()> {
        if self.cop0.status().contains(Status::ERL) {
            return Err(CoreError::halted("ERET with ERL set", self.pc));
        }
        self.cop0.regs[cop0::STATUS] &= !Status::EXL.bits();
        self.pc = self.cop0.regs[cop0::EPC];
        self.ll_bit = false;
        self.cancel_branch_state();
        Ok(())
    }

    pub(crate) fn op_syscall(&mut self, _i: Decoded) -> Result<()> {
        self.cop0.regs[cop0::CAUSE] = (ExceptionCode::Syscall as u32) << 2;
        self.general_exception();
        Ok(())
    }

    pub(crate) fn op_break(&mut self, _i: Decoded) -> Result<()> {
        self.cop0.regs[cop0::CAUSE] = (ExceptionCode::Breakpoint as u32) << 2;
        self.general_exception();
        Ok(())
    }

    fn tlb_write_regs(&self) -> TlbWriteRegs {
        TlbWriteRegs {
            entry_hi: self.cop0.regs[cop0::ENTRY_HI],
            entry_lo0: self.cop0.regs[cop0::ENTRY_LO0],
            entry_lo1: self.cop0.regs[cop0::ENTRY_LO1],
            page_mask: self.cop0.regs[cop0::PAGE_MASK],
        }
    }
}
