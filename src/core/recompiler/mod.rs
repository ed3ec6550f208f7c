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

//! Block cache
//!
//! One [`DecodedBlock`] per 4KB guest page: the page's instruction
//! stream classified once into [`Decoded`] tags, reused on every
//! subsequent fetch until the backing memory changes.
//!
//! Staleness is tracked per page with a three-state machine:
//!
//! - `Unknown` — never translated.
//! - `Valid` — a block exists and its backing page is unmodified;
//!   fetches may use it directly.
//! - `Invalid` — the backing page was written (or remapped) after
//!   translation; the block must be re-decoded, or re-validated by a
//!   checksum match, before next use.
//!
//! A stored checksum of zero means "always re-decode": it is set when a
//! page is invalidated a second time, at which point the content hash
//! can no longer be trusted to identify the translated bytes.

use crate::core::cpu::decode::{decode, Decoded};
use std::collections::HashMap;

#[cfg(test)]
mod tests;

/// Number of 4KB pages in the 32-bit guest address space.
pub const PAGE_COUNT: usize = 0x10_0000;

/// Translation state of one guest page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Unknown,
    Valid,
    Invalid,
}

/// A translated (decoded) page of guest instructions.
pub struct DecodedBlock {
    /// Virtual start address, page aligned.
    pub start: u32,
    /// One past the last instruction byte.
    pub end: u32,
    /// Decoded instruction array, one entry per word.
    pub instrs: Vec<Decoded>,
    /// CRC of the backing RAM page at (in)validation time; zero means
    /// the block can never be re-validated by checksum.
    pub checksum: u32,
}

impl DecodedBlock {
    /// Translate a page of raw instruction words.
    pub fn translate(start: u32, words: &[u32]) -> Self {
        let instrs = words.iter().map(|&w| decode(w)).collect::<Vec<_>>();
        Self {
            start,
            end: start + (words.len() as u32) * 4,
            instrs,
            checksum: 0,
        }
    }

    /// Decoded instruction at a virtual address inside this block.
    #[inline]
    pub fn instr_at(&self, vaddr: u32) -> Decoded {
        self.instrs[((vaddr - self.start) >> 2) as usize]
    }
}

/// Cache of decoded blocks keyed by guest virtual page, plus the
/// per-page invalid-code map and the physical-page back-links used for
/// self-modifying-code detection.
pub struct CodeCache {
    blocks: HashMap<u32, DecodedBlock>,
    /// One flag per page; `true` = stale. Starts all-stale so the first
    /// fetch from any page translates it.
    invalid: Vec<bool>,
    /// Physical page -> virtual pages currently holding a translation
    /// backed by it. KSEG mirrors are implicit; this records TLB-mapped
    /// aliases.
    links: HashMap<u32, Vec<u32>>,
}

impl CodeCache {
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            invalid: vec![true; PAGE_COUNT],
            links: HashMap::new(),
        }
    }

    /// Translation state of a virtual page.
    pub fn page_state(&self, vpage: u32) -> PageState {
        let stale = self.invalid[vpage as usize & (PAGE_COUNT - 1)];
        match (stale, self.blocks.contains_key(&vpage)) {
            (false, _) => PageState::Valid,
            (true, true) => PageState::Invalid,
            (true, false) => PageState::Unknown,
        }
    }

    pub fn is_valid(&self, vpage: u32) -> bool {
        !self.invalid[vpage as usize & (PAGE_COUNT - 1)]
    }

    pub fn block(&self, vpage: u32) -> Option<&DecodedBlock> {
        self.blocks.get(&vpage)
    }

    /// Install a freshly translated block and mark its page valid. If
    /// the page is TLB-mapped, `phys_page` records the backing so later
    /// stores through the physical address retire this translation too.
    pub fn install(&mut self, vpage: u32, block: DecodedBlock, phys_page: Option<u32>) {
        self.invalid[vpage as usize & (PAGE_COUNT - 1)] = false;
        self.blocks.insert(vpage, block);
        if let Some(ppage) = phys_page {
            let linked = self.links.entry(ppage).or_default();
            if !linked.contains(&vpage) {
                linked.push(vpage);
            }
        }
    }

    /// Mark one virtual page stale.
    pub fn invalidate(&mut self, vpage: u32) {
        self.invalid[vpage as usize & (PAGE_COUNT - 1)] = true;
    }

    /// Re-mark a page valid after its checksum proved the translation
    /// still matches memory (the self-modifying-code recovery path).
    pub fn revalidate(&mut self, vpage: u32) {
        if self.blocks.contains_key(&vpage) {
            self.invalid[vpage as usize & (PAGE_COUNT - 1)] = false;
        }
    }

    /// Stored checksum for a page's block, if any block exists.
    pub fn stored_checksum(&self, vpage: u32) -> Option<u32> {
        self.blocks.get(&vpage).map(|b| b.checksum)
    }

    pub fn set_checksum(&mut self, vpage: u32, checksum: u32) {
        if let Some(block) = self.blocks.get_mut(&vpage) {
            block.checksum = checksum;
        }
    }

    /// A store hit a physical address: retire translations in both KSEG
    /// direct-mapped mirrors of the page and in any TLB-mapped alias.
    pub fn notify_write(&mut self, paddr: u32) {
        let ppage = (paddr & 0x1FFF_FFFF) >> 12;
        self.invalidate(ppage + (0x8000_0000 >> 12));
        self.invalidate(ppage + (0xA000_0000 >> 12));
        let linked = self.links.get(&ppage).cloned().unwrap_or_default();
        for vpage in linked {
            self.invalidate(vpage);
        }
    }

    /// Forget everything: every page back to `Unknown`.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.links.clear();
        self.invalid.iter_mut().for_each(|v| *v = true);
    }
}

impl Default for CodeCache {
    fn default() -> Self {
        Self::new()
    }
}
