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

//! Cartridge ROM loading and identification
//!
//! ROM images arrive in one of three on-disk byte orders, optionally
//! gzip-compressed. Loading normalizes everything to big-endian (.z64)
//! word order, parses the 64-byte header, and computes an MD5 digest
//! used as the image's identity (cache key, quirk lookup, movie
//! verification).
//!
//! | First byte | Format | Normalization               |
//! |------------|--------|-----------------------------|
//! | 0x80       | .z64   | none (native)               |
//! | 0x37       | .v64   | swap within each halfword   |
//! | 0x40       | .n64   | reverse bytes of each word  |

use crate::core::error::{CoreError, Result};
use flate2::read::GzDecoder;
use md5::{Digest, Md5};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

/// Gzip magic bytes used to detect compressed images.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Size of the cartridge header in bytes.
pub const HEADER_SIZE: usize = 0x40;

/// TV system a cartridge targets, derived from its country code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemType {
    Ntsc,
    Pal,
}

/// Boot chip variant, detected from a checksum over the boot code.
///
/// Determines the register file contents the IPL3 would have left
/// behind when the HLE boot skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CicChip {
    Cic6101,
    Cic6102,
    Cic6103,
    Cic6105,
    Cic6106,
}

/// Parsed 64-byte cartridge header.
#[derive(Debug, Clone)]
pub struct RomHeader {
    pub clock_rate: u32,
    /// Boot address the IPL3 jumps to.
    pub pc: u32,
    pub release: u32,
    pub crc1: u32,
    pub crc2: u32,
    /// Image name, trimmed of trailing whitespace/NULs.
    pub name: String,
    pub manufacturer_id: u32,
    pub cartridge_id: u16,
    pub country_code: u8,
}

/// A loaded, normalized cartridge image.
#[derive(Debug)]
pub struct Rom {
    /// Image bytes in big-endian (.z64) word order.
    data: Vec<u8>,
    header: RomHeader,
    /// MD5 digest of the normalized image, uppercase hex.
    md5: String,
    system: SystemType,
    cic: CicChip,
}

impl Rom {
    /// Parse an in-memory image: inflate if gzip-compressed, normalize
    /// the byte order, parse the header and compute the identity digest.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let mut data = maybe_inflate(raw)?;

        if data.len() < HEADER_SIZE {
            return Err(CoreError::RomTooSmall {
                expected: HEADER_SIZE,
                got: data.len(),
            });
        }

        normalize_byte_order(&mut data)?;

        let header = parse_header(&data);
        let md5 = {
            let mut hasher = Md5::new();
            hasher.update(&data);
            let digest = hasher.finalize();
            digest.iter().map(|b| format!("{:02X}", b)).collect()
        };
        let system = system_type(header.country_code);
        let cic = detect_cic(&data);

        log::info!(
            "ROM loaded: \"{}\" CRC {:08X} {:08X} country {} ({:?}, {:?}, {} bytes)",
            header.name,
            header.crc1,
            header.crc2,
            header.country_code as char,
            system,
            cic,
            data.len()
        );

        Ok(Self {
            data,
            header,
            md5,
            system,
            cic,
        })
    }

    /// Load an image from disk, consulting the cache first.
    pub fn load(path: impl AsRef<Path>, cache: &mut RomCache) -> Result<Self> {
        let path = path.as_ref();
        if let Some(raw) = cache.get(path) {
            log::info!("loading cached ROM for {}", path.display());
            return Self::from_bytes(&raw);
        }
        let raw = std::fs::read(path)
            .map_err(|_| CoreError::RomNotFound(path.display().to_string()))?;
        let rom = Self::from_bytes(&raw)?;
        cache.insert(path.to_path_buf(), raw);
        Ok(rom)
    }

    pub fn header(&self) -> &RomHeader {
        &self.header
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn md5(&self) -> &str {
        &self.md5
    }

    pub fn system_type(&self) -> SystemType {
        self.system
    }

    pub fn cic(&self) -> CicChip {
        self.cic
    }

    /// Vertical interrupts per second for this cartridge's TV system.
    pub fn vis_per_second(&self) -> u32 {
        match self.system {
            SystemType::Pal => 50,
            SystemType::Ntsc => 60,
        }
    }

    /// Read a 32-bit word from the normalized image.
    pub fn read_u32(&self, offset: usize) -> u32 {
        let b = &self.data[offset..offset + 4];
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    }
}

/// Inflate a gzip-compressed image, or pass the buffer through.
fn maybe_inflate(raw: &[u8]) -> Result<Vec<u8>> {
    if raw.len() >= 2 && raw[0..2] == GZIP_MAGIC {
        let mut out = Vec::new();
        GzDecoder::new(raw).read_to_end(&mut out)?;
        Ok(out)
    } else {
        Ok(raw.to_vec())
    }
}

/// Normalize an image to big-endian (.z64) word order in place.
///
/// The format is identified by the first byte of the image; anything
/// other than the three known orders is rejected.
pub fn normalize_byte_order(data: &mut [u8]) -> Result<()> {
    match data[0] {
        0x80 => Ok(()),
        0x37 => {
            for pair in data.chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
            Ok(())
        }
        0x40 => {
            for word in data.chunks_exact_mut(4) {
                word.swap(0, 3);
                word.swap(1, 2);
            }
            Ok(())
        }
        _ => {
            let first_word = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
            log::error!("wrong ROM file format (first word 0x{:08X})", first_word);
            Err(CoreError::BadRomFormat { first_word })
        }
    }
}

fn parse_header(data: &[u8]) -> RomHeader {
    let be = |o: usize| u32::from_be_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]]);

    let name_bytes = &data[0x20..0x34];
    let name = name_bytes
        .iter()
        .map(|&b| if b == 0 { b' ' } else { b } as char)
        .collect::<String>()
        .trim()
        .to_string();

    RomHeader {
        clock_rate: be(0x04),
        pc: be(0x08),
        release: be(0x0C),
        crc1: be(0x10),
        crc2: be(0x14),
        name,
        manufacturer_id: be(0x38),
        cartridge_id: u16::from_be_bytes([data[0x3C], data[0x3D]]),
        country_code: data[0x3E],
    }
}

/// Map a country code to the TV system. Unknown codes fall back to PAL,
/// matching the reference behavior.
pub fn system_type(country_code: u8) -> SystemType {
    match country_code {
        0x37 | 0x41 | 0x45 | 0x4A => SystemType::Ntsc,
        0x44 | 0x46 | 0x49 | 0x50 | 0x53 | 0x55 | 0x58 | 0x59 => SystemType::Pal,
        _ => {
            log::warn!("unknown country code 0x{:02X}, assuming PAL", country_code);
            SystemType::Pal
        }
    }
}

/// Human-readable region name for a country code.
pub fn country_name(country_code: u8) -> &'static str {
    match country_code {
        0x00 => "Demo",
        0x37 => "Beta",
        0x41 => "USA/Japan",
        0x44 => "Germany",
        0x45 => "USA",
        0x46 => "France",
        0x49 => "Italy",
        0x4A => "Japan",
        0x53 => "Spain",
        0x55 | 0x59 => "Australia",
        0x50 | 0x58 | 0x20 | 0x21 | 0x38 | 0x70 => "Europe",
        _ => "Unknown",
    }
}

/// Detect the boot chip from the additive checksum of the boot code
/// (words 0x40..0x1000 of the image). Unknown checksums assume 6102.
fn detect_cic(data: &[u8]) -> CicChip {
    let end = data.len().min(0x1000);
    let mut sum: u64 = 0;
    let mut off = 0x40;
    while off + 4 <= end {
        sum = sum.wrapping_add(u32::from_be_bytes([
            data[off],
            data[off + 1],
            data[off + 2],
            data[off + 3],
        ]) as u64);
        off += 4;
    }
    match sum {
        0x000000D0027FDF31 | 0x000000CFFB631223 => CicChip::Cic6101,
        0x000000D057C85244 => CicChip::Cic6102,
        0x000000D6497E414B => CicChip::Cic6103,
        0x0000011A49F60E96 => CicChip::Cic6105,
        0x000000D6D5BE5580 => CicChip::Cic6106,
        _ => CicChip::Cic6102,
    }
}

/// Bounded in-memory cache of raw (pre-normalization) ROM file contents,
/// keyed by path. Purely a loading accelerator; never persisted.
pub struct RomCache {
    entries: HashMap<PathBuf, Vec<u8>>,
    capacity: usize,
}

impl RomCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.entries.get(path).cloned()
    }

    pub fn insert(&mut self, path: PathBuf, raw: Vec<u8>) {
        if self.entries.len() < self.capacity {
            log::info!(
                "caching ROM ({}/{} entries full)",
                self.entries.len() + 1,
                self.capacity
            );
            self.entries.insert(path, raw);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
