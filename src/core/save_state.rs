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

//! Save states
//!
//! A snapshot of everything the instruction stream can observe: the
//! register files, COP0/COP1, the TLB entry table, the event scheduler
//! and all writable memory. Derived structures (the TLB lookup tables,
//! the block cache) are rebuilt on restore rather than stored.
//!
//! Snapshots are taken between frames, so no branch is in flight and
//! the pipeline state does not need to be carried.

use crate::core::cpu::cop0::Cop0;
use crate::core::cpu::cop1::Cop1;
use crate::core::cpu::interrupt::Scheduler;
use crate::core::cpu::tlb::TlbEntry;
use crate::core::error::{CoreError, Result};
use crate::core::system::System;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SAVE_STATE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
pub struct CpuState {
    pub regs: [u64; 32],
    pub hi: u64,
    pub lo: u64,
    pub pc: u32,
    pub ll_bit: bool,
    pub cop0: Cop0,
    pub cop1: Cop1,
    pub tlb_entries: Vec<TlbEntry>,
    pub scheduler: Scheduler,
    pub cycles: u64,
    pub vi_count: u64,
}

#[derive(Serialize, Deserialize)]
pub struct SaveState {
    version: u32,
    created_at: DateTime<Utc>,
    /// Identity of the cartridge the snapshot belongs to.
    rom_md5: String,
    pub cpu: CpuState,
    pub rdram: Vec<u8>,
    pub sp_dmem: Vec<u8>,
    pub sp_imem: Vec<u8>,
}

impl SaveState {
    pub fn capture(system: &System) -> Self {
        let cpu = &system.cpu;
        Self {
            version: SAVE_STATE_VERSION,
            created_at: Utc::now(),
            rom_md5: system.rom().md5().to_string(),
            cpu: CpuState {
                regs: cpu.regs,
                hi: cpu.hi,
                lo: cpu.lo,
                pc: cpu.pc,
                ll_bit: cpu.ll_bit,
                cop0: cpu.cop0.clone(),
                cop1: cpu.cop1.clone(),
                tlb_entries: cpu.tlb.entries.to_vec(),
                scheduler: cpu.scheduler.clone(),
                cycles: cpu.cycles,
                vi_count: cpu.vi_count,
            },
            rdram: system.bus.rdram().to_vec(),
            sp_dmem: system.bus.sp_dmem().to_vec(),
            sp_imem: system.bus.sp_imem().to_vec(),
        }
    }

    /// Restore into a running system. The snapshot must belong to the
    /// loaded cartridge.
    pub fn restore(self, system: &mut System) -> Result<()> {
        if self.version != SAVE_STATE_VERSION {
            return Err(CoreError::SaveStateVersion {
                expected: SAVE_STATE_VERSION,
                got: self.version,
            });
        }
        if self.rom_md5 != system.rom().md5() {
            return Err(CoreError::SaveStateDecode(format!(
                "snapshot belongs to ROM {}, loaded ROM is {}",
                self.rom_md5,
                system.rom().md5()
            )));
        }
        if self.cpu.tlb_entries.len() != system.cpu.tlb.entries.len()
            || self.rdram.len() != system.bus.rdram().len()
        {
            return Err(CoreError::SaveStateDecode(
                "snapshot has mismatched memory shapes".into(),
            ));
        }

        let cpu = &mut system.cpu;
        cpu.regs = self.cpu.regs;
        cpu.hi = self.cpu.hi;
        cpu.lo = self.cpu.lo;
        cpu.pc = self.cpu.pc;
        cpu.ll_bit = self.cpu.ll_bit;
        cpu.cop0 = self.cpu.cop0;
        cpu.cop1 = self.cpu.cop1;
        cpu.tlb.entries.copy_from_slice(&self.cpu.tlb_entries);
        cpu.tlb.rebuild_luts();
        cpu.scheduler = self.cpu.scheduler;
        cpu.cycles = self.cpu.cycles;
        cpu.vi_count = self.cpu.vi_count;
        cpu.reset_pipeline();

        system.bus.rdram_mut().copy_from_slice(&self.rdram);
        system.bus.sp_dmem_mut().copy_from_slice(&self.sp_dmem);
        system.bus.sp_imem_mut().copy_from_slice(&self.sp_imem);
        // Every translation is stale against the restored memory.
        system.bus.cache.clear();

        log::info!(
            "state restored: pc=0x{:08X} cycles={} (saved {})",
            system.cpu.pc,
            system.cpu.cycles,
            self.created_at
        );
        Ok(())
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| CoreError::SaveStateDecode(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let (state, _) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| CoreError::SaveStateDecode(e.to_string()))?;
        Ok(state)
    }
}
