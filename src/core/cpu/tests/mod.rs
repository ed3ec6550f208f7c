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

mod basic;
mod decode;

use crate::core::config::CoreConfig;
use crate::core::cpu::Cpu;
use crate::core::memory::Bus;

/// Physical load address for test programs; 0x80001000 virtual.
pub(crate) const PROGRAM_PHYS: u32 = 0x1000;
pub(crate) const PROGRAM_VADDR: u32 = 0x8000_1000;

/// Fresh machine with a program in RDRAM and the pc on its first
/// instruction. Interrupts start disabled (Status is zero).
pub(crate) fn setup(program: &[u32]) -> (Cpu, Bus) {
    let mut cpu = Cpu::new(&CoreConfig::default());
    let mut bus = Bus::new();
    for (idx, word) in program.iter().enumerate() {
        bus.write32(PROGRAM_PHYS + (idx as u32) * 4, *word);
    }
    cpu.pc = PROGRAM_VADDR;
    (cpu, bus)
}

pub(crate) fn step_n(cpu: &mut Cpu, bus: &mut Bus, n: usize) {
    for _ in 0..n {
        cpu.step(bus).expect("program step failed");
    }
}

// Instruction encoders.

pub(crate) fn r_type(funct: u32, rs: u32, rt: u32, rd: u32, sa: u32) -> u32 {
    (rs << 21) | (rt << 16) | (rd << 11) | (sa << 6) | funct
}

pub(crate) fn i_type(op: u32, rs: u32, rt: u32, imm: u32) -> u32 {
    (op << 26) | (rs << 21) | (rt << 16) | (imm & 0xFFFF)
}

pub(crate) fn nop() -> u32 {
    0
}

pub(crate) fn lui(rt: u32, imm: u32) -> u32 {
    i_type(0x0F, 0, rt, imm)
}

pub(crate) fn ori(rt: u32, rs: u32, imm: u32) -> u32 {
    i_type(0x0D, rs, rt, imm)
}

pub(crate) fn addiu(rt: u32, rs: u32, imm: u32) -> u32 {
    i_type(0x09, rs, rt, imm)
}

pub(crate) fn addu(rd: u32, rs: u32, rt: u32) -> u32 {
    r_type(0x21, rs, rt, rd, 0)
}

pub(crate) fn beq(rs: u32, rt: u32, offset: u32) -> u32 {
    i_type(0x04, rs, rt, offset)
}

pub(crate) fn bnel(rs: u32, rt: u32, offset: u32) -> u32 {
    i_type(0x15, rs, rt, offset)
}

pub(crate) fn jal(target: u32) -> u32 {
    (0x03 << 26) | ((target >> 2) & 0x03FF_FFFF)
}

pub(crate) fn sw(rt: u32, base: u32, offset: u32) -> u32 {
    i_type(0x2B, base, rt, offset)
}

pub(crate) fn lw(rt: u32, base: u32, offset: u32) -> u32 {
    i_type(0x23, base, rt, offset)
}

pub(crate) fn mtc0(rt: u32, rd: u32) -> u32 {
    (0x10 << 26) | (0x04 << 21) | (rt << 16) | (rd << 11)
}

pub(crate) fn mfc0(rt: u32, rd: u32) -> u32 {
    (0x10 << 26) | (rt << 16) | (rd << 11)
}

pub(crate) fn syscall() -> u32 {
    0x0C
}

pub(crate) fn eret() -> u32 {
    (0x10 << 26) | (1 << 25) | 0x18
}

pub(crate) fn tlbwi() -> u32 {
    (0x10 << 26) | (1 << 25) | 0x02
}

pub(crate) fn tlbr() -> u32 {
    (0x10 << 26) | (1 << 25) | 0x01
}

pub(crate) fn tlbp() -> u32 {
    (0x10 << 26) | (1 << 25) | 0x08
}

/// COP1 arithmetic/compare word: fmt 16 = single, 17 = double.
pub(crate) fn cop1(fmt: u32, funct: u32, ft: u32, fs: u32, fd: u32) -> u32 {
    (0x11 << 26) | (fmt << 21) | (ft << 16) | (fs << 11) | (fd << 6) | funct
}

pub(crate) fn mtc1(rt: u32, fs: u32) -> u32 {
    (0x11 << 26) | (0x04 << 21) | (rt << 16) | (fs << 11)
}

pub(crate) fn mfc1(rt: u32, fs: u32) -> u32 {
    (0x11 << 26) | (rt << 16) | (fs << 11)
}

pub(crate) fn ctc1(rt: u32, fs: u32) -> u32 {
    (0x11 << 26) | (0x06 << 21) | (rt << 16) | (fs << 11)
}

pub(crate) fn bc1t(offset: u32) -> u32 {
    (0x11 << 26) | (0x08 << 21) | (1 << 16) | (offset & 0xFFFF)
}
