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

use super::*;
use crate::core::recompiler::DecodedBlock;

#[test]
fn test_big_endian_byte_order() {
    let mut bus = Bus::new();
    bus.write32(0x100, 0x1122_3344);
    assert_eq!(bus.read8(0x100), 0x11);
    assert_eq!(bus.read8(0x103), 0x44);
    assert_eq!(bus.read16(0x100), 0x1122);
    assert_eq!(bus.read16(0x102), 0x3344);
}

#[test]
fn test_read64_write64() {
    let mut bus = Bus::new();
    bus.write64(0x200, 0x0102_0304_0506_0708);
    assert_eq!(bus.read64(0x200), 0x0102_0304_0506_0708);
    assert_eq!(bus.read32(0x200), 0x0102_0304);
    assert_eq!(bus.read32(0x204), 0x0506_0708);
}

#[test]
fn test_sp_memories_are_addressable() {
    let mut bus = Bus::new();
    bus.write32(0x0400_0000, 0xAAAA_5555);
    bus.write32(0x0400_1FFC, 0x5555_AAAA);
    assert_eq!(bus.read32(0x0400_0000), 0xAAAA_5555);
    assert_eq!(bus.read32(0x0400_1FFC), 0x5555_AAAA);
    assert_eq!(bus.sp_dmem()[0], 0xAA);
    assert_eq!(bus.sp_imem()[SP_MEM_SIZE - 4], 0x55);
}

#[test]
fn test_unhandled_region_reads_zero() {
    let mut bus = Bus::new();
    // MI register space is not modeled.
    assert_eq!(bus.read32(0x0430_0000), 0);
    bus.write32(0x0430_0000, 0xFFFF_FFFF);
    assert_eq!(bus.read32(0x0430_0000), 0);
}

#[test]
fn test_kseg_mirror_bit_is_masked() {
    let mut bus = Bus::new();
    bus.write32(0x100, 0xDEAD_BEEF);
    // Physical addresses are taken mod 512MB, so a KSEG0-style address
    // reaches the same RDRAM cell.
    assert_eq!(bus.read32(0x8000_0100), 0xDEAD_BEEF);
}

#[test]
fn test_store_invalidates_translated_page() {
    let mut bus = Bus::new();
    let words = vec![0u32; 0x400];
    bus.cache
        .install(0x8_0005, DecodedBlock::translate(0x8000_5000, &words), None);
    assert!(bus.cache.is_valid(0x8_0005));
    bus.write32(0x5010, 0x1234_5678);
    assert!(!bus.cache.is_valid(0x8_0005), "store must retire the page");
}

#[test]
fn test_rdram_raw_access_bounds() {
    let mut bus = Bus::new();
    let data = [1u8, 2, 3, 4];
    bus.rdram_write_raw(0x1000, &data).unwrap();
    let mut out = [0u8; 4];
    bus.rdram_read_raw(0x1000, &mut out).unwrap();
    assert_eq!(out, data);

    let err = bus.rdram_write_raw(RDRAM_SIZE - 2, &data).unwrap_err();
    assert!(matches!(err, CoreError::InvalidMemoryAccess { .. }));
    assert!(bus.rdram_read_raw(RDRAM_SIZE, &mut out).is_err());
}

#[test]
fn test_rdram_raw_write_invalidates_pages() {
    let mut bus = Bus::new();
    let words = vec![0u32; 0x400];
    bus.cache
        .install(0x8_0002, DecodedBlock::translate(0x8000_2000, &words), None);
    bus.rdram_write_raw(0x2000, &[0xFF; 0x10]).unwrap();
    assert!(!bus.cache.is_valid(0x8_0002));
}

#[test]
fn test_rdram_page_clamps_to_page_base() {
    let mut bus = Bus::new();
    bus.write8(0x3456, 0x77);
    let page = bus.rdram_page(0x3456);
    assert_eq!(page.len(), 0x1000);
    assert_eq!(page[0x456], 0x77);
}

#[test]
fn test_rom_window_is_read_only() {
    let mut bus = Bus::new();
    // Install a fake image directly; the window mirrors its bytes.
    bus.rom = vec![0xAB; 0x1000];
    assert_eq!(bus.read8(ROM_BASE), 0xAB);
    bus.write8(ROM_BASE, 0x00);
    assert_eq!(bus.read8(ROM_BASE), 0xAB);
    // Past the image end reads as open bus (zero).
    assert_eq!(bus.read32(ROM_BASE + 0x1000), 0);
}

#[test]
fn test_seed_boot_code_copies_past_header() {
    let mut bus = Bus::new();
    let mut image = vec![0u8; 0x2000];
    for (i, b) in image.iter_mut().enumerate() {
        *b = i as u8;
    }
    bus.rom = image;
    bus.seed_boot_code();
    assert_eq!(bus.sp_dmem()[0x3F], 0, "header bytes are not copied");
    assert_eq!(bus.sp_dmem()[0x40], 0x40);
    assert_eq!(bus.sp_dmem()[SP_MEM_SIZE - 1], (SP_MEM_SIZE - 1) as u8);
}
