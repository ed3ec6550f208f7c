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
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Build a minimal big-endian image: valid magic, a name, USA country
/// code, and boot code summing to the CIC 6103 checksum.
fn z64_image() -> Vec<u8> {
    let mut data = vec![0u8; 0x2000];
    data[0..4].copy_from_slice(&[0x80, 0x37, 0x12, 0x40]);
    data[0x08..0x0C].copy_from_slice(&0x8000_0400u32.to_be_bytes()); // boot pc
    data[0x10..0x14].copy_from_slice(&0x1234_5678u32.to_be_bytes()); // crc1
    data[0x14..0x18].copy_from_slice(&0x9ABC_DEF0u32.to_be_bytes()); // crc2
    data[0x20..0x2A].copy_from_slice(b"TEST IMAGE");
    data[0x3C] = 0x4E;
    data[0x3D] = 0x54;
    data[0x3E] = 0x45; // USA

    // 214 all-ones words plus one remainder word sum to the CIC 6103
    // boot checksum 0xD6497E414B.
    for i in 0..214usize {
        data[0x40 + i * 4..0x44 + i * 4].copy_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
    }
    data[0x40 + 214 * 4..0x44 + 214 * 4].copy_from_slice(&0x497E_4221u32.to_be_bytes());
    data
}

fn to_v64(z64: &[u8]) -> Vec<u8> {
    let mut out = z64.to_vec();
    for pair in out.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
    out
}

fn to_n64(z64: &[u8]) -> Vec<u8> {
    let mut out = z64.to_vec();
    for word in out.chunks_exact_mut(4) {
        word.swap(0, 3);
        word.swap(1, 2);
    }
    out
}

#[test]
fn test_parse_z64_header() {
    let rom = Rom::from_bytes(&z64_image()).unwrap();
    assert_eq!(rom.header().name, "TEST IMAGE");
    assert_eq!(rom.header().pc, 0x8000_0400);
    assert_eq!(rom.header().crc1, 0x1234_5678);
    assert_eq!(rom.header().crc2, 0x9ABC_DEF0);
    assert_eq!(rom.header().cartridge_id, 0x4E54);
    assert_eq!(rom.header().country_code, 0x45);
    assert_eq!(rom.system_type(), SystemType::Ntsc);
    assert_eq!(rom.vis_per_second(), 60);
    assert_eq!(rom.cic(), CicChip::Cic6103);
}

#[test]
fn test_md5_is_uppercase_hex() {
    let rom = Rom::from_bytes(&z64_image()).unwrap();
    assert_eq!(rom.md5().len(), 32);
    assert!(rom
        .md5()
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
}

#[test]
fn test_byte_orders_normalize_to_same_image() {
    let z64 = z64_image();
    let native = Rom::from_bytes(&z64).unwrap();
    let swapped = Rom::from_bytes(&to_v64(&z64)).unwrap();
    let reversed = Rom::from_bytes(&to_n64(&z64)).unwrap();
    assert_eq!(native.md5(), swapped.md5());
    assert_eq!(native.md5(), reversed.md5());
    assert_eq!(swapped.data(), native.data());
    assert_eq!(swapped.header().name, "TEST IMAGE");
}

#[test]
fn test_gzipped_image_is_inflated() {
    let z64 = z64_image();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&z64).unwrap();
    let compressed = encoder.finish().unwrap();

    let rom = Rom::from_bytes(&compressed).unwrap();
    assert_eq!(rom.md5(), Rom::from_bytes(&z64).unwrap().md5());
}

#[test]
fn test_unknown_format_is_rejected() {
    let mut data = z64_image();
    data[0] = 0x00;
    let err = Rom::from_bytes(&data).unwrap_err();
    assert!(matches!(err, CoreError::BadRomFormat { .. }));
}

#[test]
fn test_truncated_image_is_rejected() {
    let err = Rom::from_bytes(&[0x80, 0x37, 0x12, 0x40]).unwrap_err();
    assert!(matches!(err, CoreError::RomTooSmall { .. }));
}

#[test]
fn test_unknown_boot_checksum_defaults_to_6102() {
    let mut data = z64_image();
    data[0x40] ^= 0xFF;
    let rom = Rom::from_bytes(&data).unwrap();
    assert_eq!(rom.cic(), CicChip::Cic6102);
}

#[test]
fn test_pal_country_code() {
    let mut data = z64_image();
    data[0x3E] = 0x50; // Europe
    let rom = Rom::from_bytes(&data).unwrap();
    assert_eq!(rom.system_type(), SystemType::Pal);
    assert_eq!(rom.vis_per_second(), 50);
}

#[test]
fn test_load_from_disk_populates_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.z64");
    std::fs::write(&path, z64_image()).unwrap();

    let mut cache = RomCache::new(4);
    let rom = Rom::load(&path, &mut cache).unwrap();
    assert_eq!(cache.len(), 1);

    // Second load is served from the cache even if the file vanishes.
    std::fs::remove_file(&path).unwrap();
    let again = Rom::load(&path, &mut cache).unwrap();
    assert_eq!(again.md5(), rom.md5());
}

#[test]
fn test_missing_file_error() {
    let mut cache = RomCache::new(4);
    let err = Rom::load("/nonexistent/rom.z64", &mut cache).unwrap_err();
    assert!(matches!(err, CoreError::RomNotFound(_)));
}

#[test]
fn test_rom_cache_respects_capacity() {
    let mut cache = RomCache::new(1);
    cache.insert("/a".into(), vec![1]);
    cache.insert("/b".into(), vec![2]);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(Path::new("/a")).is_some());
    assert!(cache.get(Path::new("/b")).is_none());
}
