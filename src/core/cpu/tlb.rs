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

//! Software TLB / MMU
//!
//! 32-entry translation table plus two flat lookup tables (read and
//! write direction) with one entry per 4KB guest page, so that every
//! load/store translates in O(1). A LUT entry is non-zero iff some
//! currently mapped TLB entry covers that page for that direction; the
//! high bit tags validity, the low 20 bits carry the physical page.
//!
//! Installing a mapping interacts with the block cache: pages leaving a
//! mapping get a content checksum stored on their translated block (so
//! the translation can be trusted again later if the bytes are
//! unchanged), and pages entering a mapping are re-validated by
//! comparing that checksum.

use crate::core::memory::Bus;
use serde::{Deserialize, Serialize};

/// Number of TLB slots.
pub const TLB_ENTRIES: usize = 32;

/// Access direction for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

/// One TLB slot: raw fields plus the derived even/odd range bounds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TlbEntry {
    pub mask: u32,
    pub vpn2: u32,
    pub global: bool,
    pub asid: u8,
    pub pfn_even: u32,
    pub c_even: u8,
    pub d_even: bool,
    pub v_even: bool,
    pub pfn_odd: u32,
    pub c_odd: u8,
    pub d_odd: bool,
    pub v_odd: bool,
    pub start_even: u32,
    pub end_even: u32,
    pub phys_even: u32,
    pub start_odd: u32,
    pub end_odd: u32,
    pub phys_odd: u32,
}

/// COP0 register snapshot a TLB write reads its fields from.
#[derive(Debug, Clone, Copy)]
pub struct TlbWriteRegs {
    pub entry_hi: u32,
    pub entry_lo0: u32,
    pub entry_lo1: u32,
    pub page_mask: u32,
}

/// The translation table and its per-page lookup tables.
pub struct Tlb {
    pub entries: [TlbEntry; TLB_ENTRIES],
    lut_r: Vec<u32>,
    lut_w: Vec<u32>,
}

impl Tlb {
    pub fn new() -> Self {
        Self {
            entries: [TlbEntry::default(); TLB_ENTRIES],
            lut_r: vec![0; 0x10_0000],
            lut_w: vec![0; 0x10_0000],
        }
    }

    /// O(1) translation of a virtual address for the given direction.
    /// `None` means no mapping covers the page (a refill condition for
    /// the caller to raise).
    #[inline]
    pub fn lookup(&self, vaddr: u32, kind: AccessKind) -> Option<u32> {
        let lut = match kind {
            AccessKind::Write => &self.lut_w,
            AccessKind::Read => &self.lut_r,
        };
        let entry = lut[(vaddr >> 12) as usize];
        if entry != 0 {
            Some((entry & 0x7FFF_F000) | (vaddr & 0xFFF))
        } else {
            None
        }
    }

    /// Raw read-direction LUT entry for a page (used by the TLB-write
    /// checksum pass, which needs the tagged value).
    pub fn lut_r_entry(&self, vpage: u32) -> u32 {
        self.lut_r[vpage as usize]
    }

    /// Remove a slot's mappings from the LUTs. Inverse of [`map`];
    /// mapping then unmapping leaves the LUTs exactly as before.
    ///
    /// [`map`]: Self::map
    pub fn unmap(&mut self, index: usize) {
        let e = self.entries[index];
        if e.v_even {
            for addr in (e.start_even..e.end_even).step_by(0x1000) {
                self.lut_r[(addr >> 12) as usize] = 0;
            }
            if e.d_even {
                for addr in (e.start_even..e.end_even).step_by(0x1000) {
                    self.lut_w[(addr >> 12) as usize] = 0;
                }
            }
        }
        if e.v_odd {
            for addr in (e.start_odd..e.end_odd).step_by(0x1000) {
                self.lut_r[(addr >> 12) as usize] = 0;
            }
            if e.d_odd {
                for addr in (e.start_odd..e.end_odd).step_by(0x1000) {
                    self.lut_w[(addr >> 12) as usize] = 0;
                }
            }
        }
    }

    /// Install a slot's mappings into the LUTs.
    ///
    /// A mapping is skipped when its range is empty, straddles the
    /// 0x80000000..0xC0000000 kernel-unmapped window, or targets
    /// physical memory at or above 512MB.
    pub fn map(&mut self, index: usize) {
        let e = self.entries[index];
        if e.v_even
            && e.start_even < e.end_even
            && !(e.start_even >= 0x8000_0000 && e.end_even < 0xC000_0000)
            && e.phys_even < 0x2000_0000
        {
            for addr in (e.start_even..e.end_even).step_by(0x1000) {
                let phys = e.phys_even.wrapping_add(addr - e.start_even);
                self.lut_r[(addr >> 12) as usize] = 0x8000_0000 | phys;
            }
            if e.d_even {
                for addr in (e.start_even..e.end_even).step_by(0x1000) {
                    let phys = e.phys_even.wrapping_add(addr - e.start_even);
                    self.lut_w[(addr >> 12) as usize] = 0x8000_0000 | phys;
                }
            }
        }
        if e.v_odd
            && e.start_odd < e.end_odd
            && !(e.start_odd >= 0x8000_0000 && e.end_odd < 0xC000_0000)
            && e.phys_odd < 0x2000_0000
        {
            for addr in (e.start_odd..e.end_odd).step_by(0x1000) {
                let phys = e.phys_odd.wrapping_add(addr - e.start_odd);
                self.lut_r[(addr >> 12) as usize] = 0x8000_0000 | phys;
            }
            if e.d_odd {
                for addr in (e.start_odd..e.end_odd).step_by(0x1000) {
                    let phys = e.phys_odd.wrapping_add(addr - e.start_odd);
                    self.lut_w[(addr >> 12) as usize] = 0x8000_0000 | phys;
                }
            }
        }
    }

    /// Associative probe for an EntryHi match. Returns the matching
    /// slot, or `None` when nothing matches (the caller leaves Index's
    /// previous value in place, only setting the probe-failure bit).
    pub fn probe(&self, entry_hi: u32) -> Option<usize> {
        let vpn2 = (entry_hi & 0xFFFF_E000) >> 13;
        let asid = (entry_hi & 0xFF) as u8;
        self.entries.iter().position(|e| {
            (e.vpn2 & !e.mask) == (vpn2 & !e.mask) && (e.global || e.asid == asid)
        })
    }

    /// Install a new mapping at a slot (the TLBWI/TLBWR core).
    ///
    /// Order matters:
    /// 1. checksum pass over the slot's *old* valid pages (store a CRC
    ///    of the backing RAM page on each page's block, mark the page
    ///    invalid; a second invalidation zeroes the checksum),
    /// 2. unmap the old ranges,
    /// 3. recompute fields and ranges from the COP0 registers,
    /// 4. map the new ranges,
    /// 5. re-validate new pages whose stored checksum still matches
    ///    memory (self-modifying-code recovery).
    pub fn write_entry(&mut self, index: usize, regs: TlbWriteRegs, bus: &mut Bus) {
        self.retire_range(index, false, bus);
        self.retire_range(index, true, bus);

        self.unmap(index);

        let e = &mut self.entries[index];
        e.global = (regs.entry_lo0 & regs.entry_lo1 & 1) != 0;
        e.pfn_even = (regs.entry_lo0 & 0x3FFF_FFC0) >> 6;
        e.pfn_odd = (regs.entry_lo1 & 0x3FFF_FFC0) >> 6;
        e.c_even = ((regs.entry_lo0 & 0x38) >> 3) as u8;
        e.c_odd = ((regs.entry_lo1 & 0x38) >> 3) as u8;
        e.d_even = (regs.entry_lo0 & 0x4) != 0;
        e.d_odd = (regs.entry_lo1 & 0x4) != 0;
        e.v_even = (regs.entry_lo0 & 0x2) != 0;
        e.v_odd = (regs.entry_lo1 & 0x2) != 0;
        e.asid = (regs.entry_hi & 0xFF) as u8;
        e.vpn2 = (regs.entry_hi & 0xFFFF_E000) >> 13;
        e.mask = (regs.page_mask & 0x01FF_E000) >> 13;

        e.start_even = e.vpn2 << 13;
        e.end_even = e
            .start_even
            .wrapping_add(e.mask << 12)
            .wrapping_add(0xFFF);
        e.phys_even = e.pfn_even << 12;

        e.start_odd = e.end_even.wrapping_add(1);
        e.end_odd = e.start_odd.wrapping_add(e.mask << 12).wrapping_add(0xFFF);
        e.phys_odd = e.pfn_odd << 12;

        self.map(index);

        self.revalidate_range(index, false, bus);
        self.revalidate_range(index, true, bus);
    }

    /// Checksum-and-invalidate pass over one half (even/odd) of a
    /// slot's old mapping.
    fn retire_range(&mut self, index: usize, odd: bool, bus: &mut Bus) {
        let e = self.entries[index];
        let (valid, start, end) = if odd {
            (e.v_odd, e.start_odd, e.end_odd)
        } else {
            (e.v_even, e.start_even, e.end_even)
        };
        if !valid {
            return;
        }
        for vpage in (start >> 12)..=(end >> 12) {
            let lut = self.lut_r[vpage as usize];
            // If either KSEG mirror of the backing page went stale, the
            // mapped page is stale too.
            if bus.cache.is_valid(vpage)
                && (!bus.cache.is_valid(lut >> 12) || !bus.cache.is_valid((lut >> 12) + 0x20000))
            {
                bus.cache.invalidate(vpage);
            }
            if bus.cache.is_valid(vpage) {
                let sum = crc32fast::hash(bus.rdram_page(lut & 0x7FF_000));
                bus.cache.set_checksum(vpage, sum);
                bus.cache.invalidate(vpage);
            } else {
                bus.cache.set_checksum(vpage, 0);
            }
        }
    }

    /// Checksum re-validation pass over one half of the new mapping.
    fn revalidate_range(&mut self, index: usize, odd: bool, bus: &mut Bus) {
        let e = self.entries[index];
        let (valid, start, end) = if odd {
            (e.v_odd, e.start_odd, e.end_odd)
        } else {
            (e.v_even, e.start_even, e.end_even)
        };
        if !valid {
            return;
        }
        for vpage in (start >> 12)..=(end >> 12) {
            if let Some(stored) = bus.cache.stored_checksum(vpage) {
                if stored != 0 {
                    let lut = self.lut_r[vpage as usize];
                    if stored == crc32fast::hash(bus.rdram_page(lut & 0x7FF_000)) {
                        bus.cache.revalidate(vpage);
                    }
                }
            }
        }
    }

    /// Rebuild both LUTs from the entry table (used after loading a
    /// save state, which carries only the entries).
    pub fn rebuild_luts(&mut self) {
        self.lut_r.iter_mut().for_each(|v| *v = 0);
        self.lut_w.iter_mut().for_each(|v| *v = 0);
        for index in 0..TLB_ENTRIES {
            self.map(index);
        }
    }
}

impl Default for Tlb {
    fn default() -> Self {
        Self::new()
    }
}
