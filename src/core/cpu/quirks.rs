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

//! Per-title translation quirks
//!
//! Some titles rely on behavior outside the architectural translation
//! rules. Each quirk is detected once from the cartridge header and
//! consulted from the address-translation path, so the workarounds
//! never leak into the common case.

use crate::core::rom::RomHeader;

/// GoldenEye 007 cartridge ID ("GE").
const GOLDENEYE_CART_ID: u16 = 0x4745;

/// Quirks active for the loaded cartridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quirks {
    /// Reads in 0x7F000000..0x80000000 resolve into a fixed cartridge
    /// ROM window at this base instead of going through the TLB.
    /// GoldenEye maps its inflated resources there and the base moves
    /// with the region build.
    pub high_rom_window: Option<u32>,
}

impl Quirks {
    pub fn detect(header: &RomHeader) -> Self {
        let mut quirks = Quirks::default();
        if header.cartridge_id == GOLDENEYE_CART_ID {
            let base = match header.country_code {
                0x4A => 0xB003_4B70, // Japan
                0x50 => 0xB003_29F0, // Europe
                _ => 0xB003_4B30,    // USA build, also the fallback
            };
            log::info!(
                "GoldenEye high-address window enabled, base 0x{:08X}",
                base
            );
            quirks.high_rom_window = Some(base);
        }
        quirks
    }

    /// Translate an address through the high ROM window if the quirk is
    /// active and the address falls inside it.
    #[inline]
    pub fn translate_high(&self, vaddr: u32) -> Option<u32> {
        if (0x7F00_0000..0x8000_0000).contains(&vaddr) {
            self.high_rom_window
                .map(|base| base.wrapping_add(vaddr & 0xFF_FFFF))
        } else {
            None
        }
    }
}
