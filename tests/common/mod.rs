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

//! Shared helpers: a synthetic bootable cartridge whose boot code is a
//! caller-supplied program, executed from SP DMEM by the HLE boot.

use r64core::core::config::CoreConfig;
use r64core::core::rom::Rom;
use r64core::core::system::System;

pub fn i_type(op: u32, rs: u32, rt: u32, imm: u32) -> u32 {
    (op << 26) | (rs << 21) | (rt << 16) | (imm & 0xFFFF)
}

pub fn r_type(funct: u32, rs: u32, rt: u32, rd: u32, sa: u32) -> u32 {
    (rs << 21) | (rt << 16) | (rd << 11) | (sa << 6) | funct
}

pub fn nop() -> u32 {
    0
}

pub fn lui(rt: u32, imm: u32) -> u32 {
    i_type(0x0F, 0, rt, imm)
}

pub fn ori(rt: u32, rs: u32, imm: u32) -> u32 {
    i_type(0x0D, rs, rt, imm)
}

pub fn addiu(rt: u32, rs: u32, imm: u32) -> u32 {
    i_type(0x09, rs, rt, imm)
}

pub fn addu(rd: u32, rs: u32, rt: u32) -> u32 {
    r_type(0x21, rs, rt, rd, 0)
}

pub fn sw(rt: u32, base: u32, offset: u32) -> u32 {
    i_type(0x2B, base, rt, offset)
}

pub fn beq(rs: u32, rt: u32, offset: u32) -> u32 {
    i_type(0x04, rs, rt, offset)
}

pub fn bne(rs: u32, rt: u32, offset: u32) -> u32 {
    i_type(0x05, rs, rt, offset)
}

/// A z64 image whose boot code (offset 0x40, the bytes the HLE boot
/// copies to SP DMEM and jumps into) is `program`.
pub fn test_rom_image(program: &[u32]) -> Vec<u8> {
    let mut data = vec![0u8; 0x10_0000];
    data[0..4].copy_from_slice(&[0x80, 0x37, 0x12, 0x40]);
    data[0x20..0x28].copy_from_slice(b"TESTCART");
    data[0x3E] = 0x45; // USA
    for (i, word) in program.iter().enumerate() {
        let off = 0x40 + i * 4;
        data[off..off + 4].copy_from_slice(&word.to_be_bytes());
    }
    data
}

/// A program that mixes a short computation (64 words written to
/// 0x80000400) with an idle loop, so frames keep completing after the
/// work is done.
pub fn workload_program() -> Vec<u32> {
    vec![
        lui(8, 0x8000),
        ori(8, 8, 0x0400),
        addiu(9, 0, 64),
        addiu(10, 0, 0x1234),
        // loop:
        addu(11, 10, 10),
        addu(10, 11, 10),
        addiu(10, 10, 7),
        sw(10, 8, 0),
        addiu(8, 8, 4),
        addiu(9, 9, 0xFFFF), // -1
        bne(9, 0, 0xFFF9),   // back to loop
        nop(),
        // idle:
        beq(0, 0, 0xFFFF),
        nop(),
    ]
}

pub fn boot_system(program: &[u32]) -> System {
    let rom = Rom::from_bytes(&test_rom_image(program)).expect("synthetic image must parse");
    System::new(rom, &CoreConfig::default())
}
