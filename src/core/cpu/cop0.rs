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

//! System control coprocessor (COP0) register file
//!
//! Thirty-two 32-bit registers addressed by number. The write-side
//! effects of MTC0 (field masking, timer rescheduling, FR-mode
//! shuffles) live with the instruction handlers; this module holds the
//! storage, register numbering, the Status/Cause bit layout and the
//! exception codes.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub const INDEX: usize = 0;
pub const RANDOM: usize = 1;
pub const ENTRY_LO0: usize = 2;
pub const ENTRY_LO1: usize = 3;
pub const CONTEXT: usize = 4;
pub const PAGE_MASK: usize = 5;
pub const WIRED: usize = 6;
pub const BAD_VADDR: usize = 8;
pub const COUNT: usize = 9;
pub const ENTRY_HI: usize = 10;
pub const COMPARE: usize = 11;
pub const STATUS: usize = 12;
pub const CAUSE: usize = 13;
pub const EPC: usize = 14;
pub const PREVID: usize = 15;
pub const CONFIG: usize = 16;
pub const LL_ADDR: usize = 17;
pub const WATCH_LO: usize = 18;
pub const WATCH_HI: usize = 19;
pub const X_CONTEXT: usize = 20;
pub const PARITY_ERROR: usize = 26;
pub const CACHE_ERROR: usize = 27;
pub const TAG_LO: usize = 28;
pub const TAG_HI: usize = 29;
pub const ERROR_EPC: usize = 30;

bitflags! {
    /// Status register bit layout.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u32 {
        const IE  = 0x0000_0001;
        const EXL = 0x0000_0002;
        const ERL = 0x0000_0004;
        /// Interrupt mask field (IM0..IM7).
        const IM  = 0x0000_FF00;
        /// Timer interrupt mask (IM7).
        const IM7 = 0x0000_8000;
        /// 64-bit FPU register mode.
        const FR  = 0x0400_0000;
        /// COP1 usable.
        const CU1 = 0x2000_0000;
    }
}

/// Cause register exception-code field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExceptionCode {
    Interrupt = 0,
    TlbModification = 1,
    TlbLoad = 2,
    TlbStore = 3,
    AddressLoad = 4,
    AddressStore = 5,
    Syscall = 8,
    Breakpoint = 9,
    ReservedInstruction = 10,
    CoprocessorUnusable = 11,
    Overflow = 12,
    Trap = 13,
    FloatingPoint = 15,
}

/// Branch-delay flag in Cause.
pub const CAUSE_BD: u32 = 0x8000_0000;
/// Coprocessor-number field in Cause (set for unusable-coprocessor).
pub const CAUSE_CE1: u32 = 0x1000_0000;
/// Timer interrupt pending bit in Cause (IP7).
pub const CAUSE_IP7: u32 = 0x0000_8000;
/// External interrupt pending bit in Cause (IP2).
pub const CAUSE_IP2: u32 = 0x0000_0400;

/// General exception vector (EXL path).
pub const GENERAL_VECTOR: u32 = 0x8000_0180;
/// TLB refill vector.
pub const REFILL_VECTOR: u32 = 0x8000_0000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cop0 {
    pub regs: [u32; 32],
}

impl Cop0 {
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    #[inline]
    pub fn status(&self) -> Status {
        Status::from_bits_retain(self.regs[STATUS])
    }

    /// True when interrupts are globally enabled: IE set, neither EXL
    /// nor ERL set.
    #[inline]
    pub fn interrupts_enabled(&self) -> bool {
        self.regs[STATUS] & 0x7 == 0x1
    }

    /// True when an unmasked interrupt is pending.
    #[inline]
    pub fn interrupt_pending(&self) -> bool {
        self.regs[STATUS] & self.regs[CAUSE] & 0xFF00 != 0
    }

    /// FR bit: 32 odd-numbered FPU registers visible (set) or 16
    /// even/odd pairs (clear).
    #[inline]
    pub fn fr_mode(&self) -> bool {
        self.status().contains(Status::FR)
    }

    #[inline]
    pub fn cop1_usable(&self) -> bool {
        self.status().contains(Status::CU1)
    }

    /// Set the exception-code field of Cause, preserving the other
    /// fields.
    pub fn set_exception_code(&mut self, code: ExceptionCode) {
        self.regs[CAUSE] = (self.regs[CAUSE] & !0x7C) | ((code as u32) << 2);
    }
}

impl Default for Cop0 {
    fn default() -> Self {
        Self::new()
    }
}
