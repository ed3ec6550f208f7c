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

//! Memory bus for the N64 core
//!
//! All accesses here take *physical* addresses; virtual-to-physical
//! translation (KSEG direct mapping or TLB) happens in the CPU before
//! the bus is consulted.
//!
//! # Physical Memory Map
//!
//! | Physical Address Range | Region  | Size  | Access |
//! |------------------------|---------|-------|--------|
//! | 0x00000000-0x007FFFFF  | RDRAM   | 8MB   | R/W    |
//! | 0x04000000-0x04000FFF  | SP DMEM | 4KB   | R/W    |
//! | 0x04001000-0x04001FFF  | SP IMEM | 4KB   | R/W    |
//! | 0x10000000-...         | ROM     | image | R only |
//!
//! The bus is big-endian, matching the guest. Every store into RDRAM or
//! SP memory notifies the block cache so translations backed by the
//! written page are retired before their next use.

use crate::core::error::{CoreError, Result};
use crate::core::recompiler::CodeCache;
use crate::core::rom::Rom;

#[cfg(test)]
mod tests;

/// RDRAM size with the expansion pak (8MB)
pub const RDRAM_SIZE: usize = 8 * 1024 * 1024;

/// SP DMEM/IMEM size (4KB each)
pub const SP_MEM_SIZE: usize = 0x1000;

/// Base physical address of the cartridge ROM window
pub const ROM_BASE: u32 = 0x1000_0000;

const SP_DMEM_BASE: u32 = 0x0400_0000;
const SP_IMEM_BASE: u32 = 0x0400_1000;

/// Memory bus owning guest RAM, the SP memories, the ROM window and the
/// block cache (which must observe every store).
pub struct Bus {
    rdram: Vec<u8>,
    sp_dmem: Vec<u8>,
    sp_imem: Vec<u8>,
    rom: Vec<u8>,
    /// Block cache; stores notify it for self-modifying-code detection.
    pub cache: CodeCache,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            rdram: vec![0; RDRAM_SIZE],
            sp_dmem: vec![0; SP_MEM_SIZE],
            sp_imem: vec![0; SP_MEM_SIZE],
            rom: Vec::new(),
            cache: CodeCache::new(),
        }
    }

    /// Install a cartridge image (normalized byte order) into the ROM
    /// window.
    pub fn load_rom(&mut self, rom: &Rom) {
        self.rom = rom.data().to_vec();
    }

    /// Copy the boot code from ROM into SP DMEM, as the PIF would have.
    pub fn seed_boot_code(&mut self) {
        let n = self.rom.len().min(SP_MEM_SIZE);
        if n > 0x40 {
            self.sp_dmem[0x40..n].copy_from_slice(&self.rom[0x40..n]);
        }
    }

    fn region(&self, paddr: u32) -> Option<(&[u8], usize)> {
        let paddr = paddr & 0x1FFF_FFFF;
        if (paddr as usize) < self.rdram.len() {
            Some((&self.rdram, paddr as usize))
        } else if (SP_DMEM_BASE..SP_DMEM_BASE + SP_MEM_SIZE as u32).contains(&paddr) {
            Some((&self.sp_dmem, (paddr - SP_DMEM_BASE) as usize))
        } else if (SP_IMEM_BASE..SP_IMEM_BASE + SP_MEM_SIZE as u32).contains(&paddr) {
            Some((&self.sp_imem, (paddr - SP_IMEM_BASE) as usize))
        } else if paddr >= ROM_BASE && ((paddr - ROM_BASE) as usize) < self.rom.len() {
            Some((&self.rom, (paddr - ROM_BASE) as usize))
        } else {
            None
        }
    }

    fn region_mut(&mut self, paddr: u32) -> Option<(&mut [u8], usize)> {
        let paddr = paddr & 0x1FFF_FFFF;
        if (paddr as usize) < self.rdram.len() {
            Some((&mut self.rdram, paddr as usize))
        } else if (SP_DMEM_BASE..SP_DMEM_BASE + SP_MEM_SIZE as u32).contains(&paddr) {
            Some((&mut self.sp_dmem, (paddr - SP_DMEM_BASE) as usize))
        } else if (SP_IMEM_BASE..SP_IMEM_BASE + SP_MEM_SIZE as u32).contains(&paddr) {
            Some((&mut self.sp_imem, (paddr - SP_IMEM_BASE) as usize))
        } else {
            // ROM and MMIO are not writable through the bus
            None
        }
    }

    pub fn read8(&self, paddr: u32) -> u8 {
        match self.region(paddr) {
            Some((mem, off)) => mem[off],
            None => {
                log::debug!("unhandled read8 at physical 0x{:08X}", paddr);
                0
            }
        }
    }

    pub fn read16(&self, paddr: u32) -> u16 {
        match self.region(paddr & !1) {
            Some((mem, off)) if off + 2 <= mem.len() => {
                u16::from_be_bytes([mem[off], mem[off + 1]])
            }
            _ => {
                log::debug!("unhandled read16 at physical 0x{:08X}", paddr);
                0
            }
        }
    }

    pub fn read32(&self, paddr: u32) -> u32 {
        match self.region(paddr & !3) {
            Some((mem, off)) if off + 4 <= mem.len() => {
                u32::from_be_bytes([mem[off], mem[off + 1], mem[off + 2], mem[off + 3]])
            }
            _ => {
                log::debug!("unhandled read32 at physical 0x{:08X}", paddr);
                0
            }
        }
    }

    pub fn read64(&self, paddr: u32) -> u64 {
        ((self.read32(paddr) as u64) << 32) | self.read32(paddr.wrapping_add(4)) as u64
    }

    pub fn write8(&mut self, paddr: u32, value: u8) {
        match self.region_mut(paddr) {
            Some((mem, off)) => {
                mem[off] = value;
                self.cache.notify_write(paddr);
            }
            None => log::debug!("unhandled write8 at physical 0x{:08X}", paddr),
        }
    }

    pub fn write16(&mut self, paddr: u32, value: u16) {
        match self.region_mut(paddr & !1) {
            Some((mem, off)) if off + 2 <= mem.len() => {
                mem[off..off + 2].copy_from_slice(&value.to_be_bytes());
                self.cache.notify_write(paddr);
            }
            _ => log::debug!("unhandled write16 at physical 0x{:08X}", paddr),
        }
    }

    pub fn write32(&mut self, paddr: u32, value: u32) {
        match self.region_mut(paddr & !3) {
            Some((mem, off)) if off + 4 <= mem.len() => {
                mem[off..off + 4].copy_from_slice(&value.to_be_bytes());
                self.cache.notify_write(paddr);
            }
            _ => log::debug!("unhandled write32 at physical 0x{:08X}", paddr),
        }
    }

    pub fn write64(&mut self, paddr: u32, value: u64) {
        self.write32(paddr, (value >> 32) as u32);
        self.write32(paddr.wrapping_add(4), value as u32);
    }

    /// A 4KB view of the RDRAM page backing a physical address, used for
    /// translation checksums. Pages outside RDRAM yield an empty slice.
    pub fn rdram_page(&self, paddr: u32) -> &[u8] {
        let base = (paddr as usize & 0x7FF_000).min(self.rdram.len());
        let end = (base + 0x1000).min(self.rdram.len());
        &self.rdram[base..end]
    }

    /// Range-checked raw RDRAM read for external collaborators.
    pub fn rdram_read_raw(&self, offset: usize, out: &mut [u8]) -> Result<()> {
        let end = offset
            .checked_add(out.len())
            .filter(|&e| e <= self.rdram.len())
            .ok_or(CoreError::InvalidMemoryAccess {
                address: offset as u32,
            })?;
        out.copy_from_slice(&self.rdram[offset..end]);
        Ok(())
    }

    /// Range-checked raw RDRAM write for external collaborators. Goes
    /// through the same invalidation path as guest stores.
    pub fn rdram_write_raw(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(data.len())
            .filter(|&e| e <= self.rdram.len())
            .ok_or(CoreError::InvalidMemoryAccess {
                address: offset as u32,
            })?;
        self.rdram[offset..end].copy_from_slice(data);
        for page in (offset..end).step_by(0x1000) {
            self.cache.notify_write(page as u32);
        }
        Ok(())
    }

    /// Full RDRAM contents, for determinism checks and save states.
    pub fn rdram(&self) -> &[u8] {
        &self.rdram
    }

    pub fn rdram_mut(&mut self) -> &mut [u8] {
        &mut self.rdram
    }

    pub fn sp_dmem(&self) -> &[u8] {
        &self.sp_dmem
    }

    pub fn sp_dmem_mut(&mut self) -> &mut [u8] {
        &mut self.sp_dmem
    }

    pub fn sp_imem(&self) -> &[u8] {
        &self.sp_imem
    }

    pub fn sp_imem_mut(&mut self) -> &mut [u8] {
        &mut self.sp_imem
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
