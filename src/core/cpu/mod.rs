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

//! R4300i CPU core
//!
//! One [`Cpu`] value holds the whole execution context: the 64-bit GPR
//! file, COP0/COP1, the TLB, the event scheduler and the delay-slot
//! state machine. `step` executes exactly one instruction; everything
//! observable (registers, memory, Count) advances deterministically
//! from the instruction stream, so two runs over the same ROM and
//! inputs produce identical state.

pub mod cop0;
pub mod cop1;
pub mod decode;
pub mod instructions;
pub mod interrupt;
pub mod quirks;
pub mod tlb;

#[cfg(test)]
mod tests;

use crate::core::config::{CoreConfig, CpuStyle};
use crate::core::error::Result;
use crate::core::memory::Bus;
use crate::core::rom::{CicChip, Rom};
use cop0::{Cop0, ExceptionCode};
use cop1::Cop1;
use decode::{decode, Decoded};
use interrupt::{EventKind, Scheduler};
use quirks::Quirks;
use tlb::{AccessKind, Tlb};

/// Master clock of the VR4300, in Hz.
pub const CPU_HZ: u64 = 93_750_000;

/// Entry point after the HLE boot (start of the IPL3 payload in SP
/// DMEM, past the 0x40-byte header).
pub const BOOT_PC: u32 = 0xA400_0040;

const CYCLES_PER_INSTR: u64 = 2;

pub struct Cpu {
    /// General purpose registers; r0 is forced to zero after every
    /// instruction.
    pub regs: [u64; 32],
    pub hi: u64,
    pub lo: u64,
    pub pc: u32,
    /// Target of a taken branch, consumed when its delay slot retires.
    branch_target: Option<u32>,
    /// The currently executing instruction sits in a delay slot.
    in_delay_slot: bool,
    /// An exception or ERET set `pc` directly this step.
    redirected: bool,
    /// A not-taken likely branch nullifies its delay slot.
    skip_next: bool,
    pub ll_bit: bool,
    pub cop0: Cop0,
    pub cop1: Cop1,
    pub tlb: Tlb,
    pub scheduler: Scheduler,
    /// Total cycles executed since power-on.
    pub cycles: u64,
    pub quirks: Quirks,
    style: CpuStyle,
    /// Cycles between vertical interrupts.
    vi_period: u64,
    /// Vertical interrupts fired since power-on.
    pub vi_count: u64,
}

impl Cpu {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            regs: [0; 32],
            hi: 0,
            lo: 0,
            pc: BOOT_PC,
            branch_target: None,
            in_delay_slot: false,
            redirected: false,
            skip_next: false,
            ll_bit: false,
            cop0: Cop0::new(),
            cop1: Cop1::new(),
            tlb: Tlb::new(),
            scheduler: Scheduler::new(config.counter_factor),
            cycles: 0,
            quirks: Quirks::default(),
            style: config.cpu_style,
            vi_period: CPU_HZ / 60,
            vi_count: 0,
        }
    }

    /// Put the machine in the state the PIF and IPL3 would have left it
    /// in: boot code copied to SP DMEM, COP0 at its documented reset
    /// values, and the register file matching the loaded cartridge's
    /// boot chip and region.
    pub fn power_on(&mut self, rom: &Rom, bus: &mut Bus) {
        self.regs = [0; 32];
        self.hi = 0;
        self.lo = 0;
        self.branch_target = None;
        self.in_delay_slot = false;
        self.redirected = false;
        self.skip_next = false;
        self.ll_bit = false;
        self.cop0 = Cop0::new();
        self.cop1 = Cop1::new();
        self.tlb = Tlb::new();
        self.cycles = 0;
        self.vi_count = 0;
        self.scheduler.clear();
        bus.cache.clear();

        bus.load_rom(rom);
        bus.seed_boot_code();

        self.quirks = Quirks::detect(rom.header());
        self.vi_period = CPU_HZ / rom.vis_per_second() as u64;

        self.cop0.regs[cop0::RANDOM] = 31;
        self.cop0.regs[cop0::STATUS] = 0x3400_0000;
        self.cop0.regs[cop0::CONFIG] = 0x0006_E463;
        self.cop0.regs[cop0::PREVID] = 0xB00;
        self.cop0.regs[cop0::CAUSE] = 0x5C;
        self.cop0.regs[cop0::CONTEXT] = 0x007F_FFF0;
        self.cop0.regs[cop0::EPC] = 0xFFFF_FFFF;
        self.cop0.regs[cop0::BAD_VADDR] = 0xFFFF_FFFF;
        self.cop0.regs[cop0::ERROR_EPC] = 0xFFFF_FFFF;
        self.scheduler.set_count(0, 0x5000);
        self.cop1.set_fr_mode(self.cop0.fr_mode());

        self.init_boot_registers(rom, bus);

        self.pc = BOOT_PC;
        self.scheduler
            .schedule(EventKind::VideoInterrupt, self.vi_period);
        log::info!(
            "power-on: pc=0x{:08X} cic={:?} vi/s={}",
            self.pc,
            rom.cic(),
            rom.vis_per_second()
        );
    }

    /// Register file contents the IPL3 leaves behind, which differ per
    /// boot chip and region build.
    fn init_boot_registers(&mut self, rom: &Rom, bus: &mut Bus) {
        let cic = rom.cic();
        let pal = matches!(rom.system_type(), crate::core::rom::SystemType::Pal);

        self.regs[6] = 0xFFFF_FFFF_A400_1F0C;
        self.regs[7] = 0xFFFF_FFFF_A400_1F08;
        self.regs[8] = 0x0000_0000_0000_00C0;
        self.regs[10] = 0x0000_0000_0000_0040;
        self.regs[11] = 0xFFFF_FFFF_A400_0040;
        self.regs[29] = 0xFFFF_FFFF_A400_1FF0;

        if pal {
            match cic {
                CicChip::Cic6102 => {
                    self.regs[5] = 0xFFFF_FFFF_C0F1_D859;
                    self.regs[14] = 0x0000_0000_2DE1_08EA;
                }
                CicChip::Cic6103 => {
                    self.regs[5] = 0xFFFF_FFFF_D464_6273;
                    self.regs[14] = 0x0000_0000_1AF9_9984;
                }
                CicChip::Cic6105 => {
                    write_imem_word(bus, 1, 0xBDA8_07FC);
                    self.regs[5] = 0xFFFF_FFFF_DECA_AAD1;
                    self.regs[14] = 0x0000_0000_0CF8_5C13;
                    self.regs[24] = 0x0000_0000_0000_0002;
                }
                CicChip::Cic6106 => {
                    self.regs[5] = 0xFFFF_FFFF_B04D_C903;
                    self.regs[14] = 0x0000_0000_1AF9_9984;
                    self.regs[24] = 0x0000_0000_0000_0002;
                }
                CicChip::Cic6101 => {}
            }
            self.regs[23] = 0x0000_0000_0000_0006;
            self.regs[31] = 0xFFFF_FFFF_A400_1554;
        } else {
            match cic {
                CicChip::Cic6102 => {
                    self.regs[5] = 0xFFFF_FFFF_C959_73D5;
                    self.regs[14] = 0x0000_0000_2449_A366;
                }
                CicChip::Cic6103 => {
                    self.regs[5] = 0xFFFF_FFFF_9531_5A28;
                    self.regs[14] = 0x0000_0000_5BAC_A1DF;
                }
                CicChip::Cic6105 => {
                    write_imem_word(bus, 1, 0x8DA8_07FC);
                    self.regs[5] = 0x0000_0000_5493_FB9A;
                    self.regs[14] = 0xFFFF_FFFF_C2C2_0384;
                }
                CicChip::Cic6106 => {
                    self.regs[5] = 0xFFFF_FFFF_E067_221F;
                    self.regs[14] = 0x0000_0000_5CD2_B70F;
                }
                CicChip::Cic6101 => {}
            }
            self.regs[20] = 0x0000_0000_0000_0001;
            self.regs[24] = 0x0000_0000_0000_0003;
            self.regs[31] = 0xFFFF_FFFF_A400_1550;
        }

        match cic {
            CicChip::Cic6101 => {
                self.regs[22] = 0x3F;
            }
            CicChip::Cic6102 => {
                self.regs[1] = 0x0000_0000_0000_0001;
                self.regs[2] = 0x0000_0000_0EBD_A536;
                self.regs[3] = 0x0000_0000_0EBD_A536;
                self.regs[4] = 0x0000_0000_0000_A536;
                self.regs[12] = 0xFFFF_FFFF_ED10_D0B3;
                self.regs[13] = 0x0000_0000_1402_A4CC;
                self.regs[15] = 0x0000_0000_3103_E121;
                self.regs[22] = 0x3F;
                self.regs[25] = 0xFFFF_FFFF_9DEB_B54F;
            }
            CicChip::Cic6103 => {
                self.regs[1] = 0x0000_0000_0000_0001;
                self.regs[2] = 0x0000_0000_49A5_EE96;
                self.regs[3] = 0x0000_0000_49A5_EE96;
                self.regs[4] = 0x0000_0000_0000_EE96;
                self.regs[12] = 0xFFFF_FFFF_CE9D_FBF7;
                self.regs[13] = 0xFFFF_FFFF_CE9D_FBF7;
                self.regs[15] = 0x0000_0000_18B6_3D28;
                self.regs[22] = 0x78;
                self.regs[25] = 0xFFFF_FFFF_825B_21C9;
            }
            CicChip::Cic6105 => {
                write_imem_word(bus, 0, 0x3C0D_BFC0);
                write_imem_word(bus, 2, 0x25AD_07C0);
                write_imem_word(bus, 3, 0x3108_0080);
                write_imem_word(bus, 4, 0x5500_FFFC);
                write_imem_word(bus, 5, 0x3C0D_BFC0);
                write_imem_word(bus, 6, 0x8DA8_0024);
                write_imem_word(bus, 7, 0x3C0B_B000);
                self.regs[2] = 0xFFFF_FFFF_F58B_0FBF;
                self.regs[3] = 0xFFFF_FFFF_F58B_0FBF;
                self.regs[4] = 0x0000_0000_0000_0FBF;
                self.regs[12] = 0xFFFF_FFFF_9651_F81E;
                self.regs[13] = 0x0000_0000_2D42_AAC5;
                self.regs[15] = 0x0000_0000_5658_4D60;
                self.regs[22] = 0x91;
                self.regs[25] = 0xFFFF_FFFF_CDCE_565F;
            }
            CicChip::Cic6106 => {
                self.regs[2] = 0xFFFF_FFFF_A959_30A4;
                self.regs[3] = 0xFFFF_FFFF_A959_30A4;
                self.regs[4] = 0x0000_0000_0000_30A4;
                self.regs[12] = 0xFFFF_FFFF_BCB5_9510;
                self.regs[13] = 0xFFFF_FFFF_BCB5_9510;
                self.regs[15] = 0x0000_0000_7A3C_07F4;
                self.regs[22] = 0x85;
                self.regs[25] = 0x0000_0000_465E_3F72;
            }
        }
    }

    /// Execute one instruction (or deliver one pending interrupt).
    pub fn step(&mut self, bus: &mut Bus) -> Result<()> {
        self.process_events();
        if self.cop0.interrupts_enabled() && self.cop0.interrupt_pending() {
            self.take_interrupt();
            return Ok(());
        }

        let pending = self.branch_target.take();
        self.in_delay_slot = pending.is_some();
        self.redirected = false;
        self.skip_next = false;

        let Some(instr) = self.fetch(bus) else {
            // Fetch faulted; pc already points at the handler.
            self.cycles += CYCLES_PER_INSTR;
            self.in_delay_slot = false;
            return Ok(());
        };

        self.execute(instr, bus)?;
        self.cycles += CYCLES_PER_INSTR;
        self.regs[0] = 0;

        if self.redirected {
            // pc was set by an exception or ERET.
        } else if self.skip_next {
            self.pc = self.pc.wrapping_add(8);
        } else if let Some(target) = pending {
            self.pc = target;
        } else {
            self.pc = self.pc.wrapping_add(4);
        }
        self.in_delay_slot = false;
        Ok(())
    }

    /// Run until at least one vertical interrupt has fired.
    pub fn run_frame(&mut self, bus: &mut Bus) -> Result<()> {
        let target = self.vi_count + 1;
        while self.vi_count < target {
            self.step(bus)?;
        }
        Ok(())
    }

    fn fetch(&mut self, bus: &mut Bus) -> Option<Decoded> {
        let pc = self.pc;
        let phys = self.translate(pc, AccessKind::Read)?;
        match self.style {
            CpuStyle::PureInterpreter => Some(decode(bus.read32(phys))),
            CpuStyle::CachedInterpreter => {
                let vpage = pc >> 12;
                if bus.cache.page_state(vpage) != crate::core::recompiler::PageState::Valid {
                    let page_virt = pc & !0xFFF;
                    let page_phys = phys & !0xFFF;
                    let words: Vec<u32> = (0..0x400)
                        .map(|i| bus.read32(page_phys + i * 4))
                        .collect();
                    let block = crate::core::recompiler::DecodedBlock::translate(page_virt, &words);
                    let mapped = !(0x8000_0000..0xC000_0000).contains(&pc);
                    bus.cache
                        .install(vpage, block, mapped.then_some(page_phys >> 12));
                }
                bus.cache.block(vpage).map(|b| b.instr_at(pc))
            }
        }
    }

    /// Virtual-to-physical translation. KSEG0/KSEG1 are direct-mapped;
    /// everything else goes through the TLB. A miss raises the refill
    /// exception and yields `None`, so callers simply stop the current
    /// instruction.
    pub fn translate(&mut self, vaddr: u32, kind: AccessKind) -> Option<u32> {
        if (0x8000_0000..0xC000_0000).contains(&vaddr) {
            return Some(vaddr & 0x1FFF_FFFF);
        }
        if let Some(phys) = self.quirks.translate_high(vaddr) {
            return Some(phys & 0x1FFF_FFFF);
        }
        match self.tlb.lookup(vaddr, kind) {
            Some(phys) => Some(phys & 0x1FFF_FFFF),
            None => {
                self.tlb_refill(vaddr, kind);
                None
            }
        }
    }

    fn tlb_refill(&mut self, vaddr: u32, kind: AccessKind) {
        log::debug!(
            "TLB refill at 0x{:08X} ({:?}), pc=0x{:08X}",
            vaddr,
            kind,
            self.pc
        );
        let code = match kind {
            AccessKind::Read => ExceptionCode::TlbLoad,
            AccessKind::Write => ExceptionCode::TlbStore,
        };
        self.cop0.set_exception_code(code);
        self.cop0.regs[cop0::BAD_VADDR] = vaddr;
        self.cop0.regs[cop0::CONTEXT] = (self.cop0.regs[cop0::CONTEXT] & 0xFF80_0000)
            | ((vaddr >> 9) & 0x007F_FFF0);
        self.cop0.regs[cop0::ENTRY_HI] =
            (vaddr & 0xFFFF_E000) | (self.cop0.regs[cop0::ENTRY_HI] & 0xFF);
        let refill = !self.cop0.status().contains(cop0::Status::EXL);
        self.general_exception();
        if refill {
            self.pc = cop0::REFILL_VECTOR;
        }
    }

    /// Set Cause's exception code and enter the general handler.
    pub(crate) fn raise_exception(&mut self, code: ExceptionCode) {
        self.cop0.set_exception_code(code);
        self.general_exception();
    }

    /// Common exception entry: latch EPC (with the branch-delay flag),
    /// set EXL and jump to the general vector. EPC is left alone when
    /// EXL was already set.
    pub(crate) fn general_exception(&mut self) {
        let in_slot = self.in_delay_slot || self.branch_target.is_some();
        if !self.cop0.status().contains(cop0::Status::EXL) {
            if in_slot {
                self.cop0.regs[cop0::EPC] = self.pc.wrapping_sub(4);
                self.cop0.regs[cop0::CAUSE] |= cop0::CAUSE_BD;
            } else {
                self.cop0.regs[cop0::EPC] = self.pc;
                self.cop0.regs[cop0::CAUSE] &= !cop0::CAUSE_BD;
            }
        }
        self.cop0.regs[cop0::STATUS] |= cop0::Status::EXL.bits();
        self.pc = cop0::GENERAL_VECTOR;
        self.branch_target = None;
        self.skip_next = false;
        self.ll_bit = false;
        self.redirected = true;
    }

    /// Clear all in-flight pipeline state (used after restoring a save
    /// state, which is only taken between instructions).
    pub fn reset_pipeline(&mut self) {
        self.branch_target = None;
        self.in_delay_slot = false;
        self.redirected = false;
        self.skip_next = false;
    }

    /// An instruction set `pc` directly (ERET); drop any queued branch
    /// and keep the step loop from advancing past it.
    pub(crate) fn cancel_branch_state(&mut self) {
        self.branch_target = None;
        self.skip_next = false;
        self.redirected = true;
    }

    fn take_interrupt(&mut self) {
        self.raise_exception(ExceptionCode::Interrupt);
        // The external line has no MI back-end to ack through, so it is
        // acked on delivery. The timer line stays up until Compare is
        // written.
        self.cop0.regs[cop0::CAUSE] &= !cop0::CAUSE_IP2;
        self.cycles += CYCLES_PER_INSTR;
    }

    fn process_events(&mut self) {
        while let Some(kind) = self.scheduler.pop_due(self.cycles) {
            match kind {
                EventKind::CompareTimer => {
                    self.cop0.regs[cop0::CAUSE] |= cop0::CAUSE_IP7;
                    let compare = self.cop0.regs[cop0::COMPARE];
                    let when = self.scheduler.cycles_until_count(self.cycles, compare);
                    self.scheduler.schedule(EventKind::CompareTimer, when);
                }
                EventKind::VideoInterrupt => {
                    self.vi_count += 1;
                    self.cop0.regs[cop0::CAUSE] |= cop0::CAUSE_IP2;
                    self.scheduler
                        .schedule(EventKind::VideoInterrupt, self.cycles + self.vi_period);
                }
            }
        }
    }

    /// Current value of the Count register.
    #[inline]
    pub fn count(&self) -> u32 {
        self.scheduler.count(self.cycles)
    }

    #[inline]
    pub(crate) fn read_reg(&self, index: u8) -> u64 {
        self.regs[index as usize]
    }

    /// Writes to r0 are dropped.
    #[inline]
    pub(crate) fn write_reg(&mut self, index: u8, value: u64) {
        if index != 0 {
            self.regs[index as usize] = value;
        }
    }

    /// Sign-extend a 32-bit value into the 64-bit register file.
    #[inline]
    pub(crate) fn write_reg32(&mut self, index: u8, value: u32) {
        self.write_reg(index, value as i32 as i64 as u64);
    }

    /// Queue a branch to `target`; taken after the delay slot.
    #[inline]
    pub(crate) fn branch_to(&mut self, target: u32) {
        self.branch_target = Some(target);
    }

    /// Nullify the delay slot of a not-taken likely branch.
    #[inline]
    pub(crate) fn nullify_delay_slot(&mut self) {
        self.skip_next = true;
    }

    /// Relative branch target for the currently executing instruction.
    #[inline]
    pub(crate) fn branch_addr(&self, instr: Decoded) -> u32 {
        self.pc
            .wrapping_add(4)
            .wrapping_add((instr.simm16() as u32) << 2)
    }

    /// Address after the delay slot, written by linking jumps/branches.
    #[inline]
    pub(crate) fn link_addr(&self) -> u64 {
        self.pc.wrapping_add(8) as i32 as i64 as u64
    }

    pub(crate) fn currently_in_delay_slot(&self) -> bool {
        self.in_delay_slot
    }

    /// Log the full register file (the fatal-stop diagnostic dump).
    pub fn dump_registers(&self) {
        log::info!("pc=0x{:08X} count=0x{:08X}", self.pc, self.count());
        for j in 0..16 {
            log::info!(
                "reg[{:2}]:{:08X}{:08X}    reg[{:2}]:{:08X}{:08X}",
                j,
                (self.regs[j] >> 32) as u32,
                self.regs[j] as u32,
                j + 16,
                (self.regs[j + 16] >> 32) as u32,
                self.regs[j + 16] as u32
            );
        }
        log::info!(
            "hi:{:08X}{:08X}    lo:{:08X}{:08X}",
            (self.hi >> 32) as u32,
            self.hi as u32,
            (self.lo >> 32) as u32,
            self.lo as u32
        );
    }
}

fn write_imem_word(bus: &mut Bus, word_index: u32, value: u32) {
    bus.write32(0x0400_1000 + word_index * 4, value);
}
