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

//! Floating-point coprocessor (COP1) register file
//!
//! Thirty-two 64-bit FGRs whose addressing depends on the Status FR
//! bit: with FR set every register is an independent 64-bit double,
//! with FR clear odd registers alias the high words of even ones and
//! doubles only exist at even indices. Toggling FR shuffles the 32-bit
//! halves so single-precision register contents survive the switch.
//!
//! FCR31 carries the rounding mode in its low two bits and the compare
//! condition in bit 23. Arithmetic rounds with the host's
//! nearest-even; the mode is honored explicitly where it is
//! observable, in the float-to-integer conversions.

use serde::{Deserialize, Serialize};

/// FCR31 condition bit.
pub const FCR31_CONDITION: u32 = 0x0080_0000;

/// Implementation/revision register value.
pub const FCR0_VALUE: u32 = 0x511;

/// IEEE rounding mode selected by FCR31\[1:0\].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    NearestEven,
    TowardZero,
    TowardPlus,
    TowardMinus,
}

impl RoundingMode {
    pub fn from_fcr31(fcr31: u32) -> Self {
        match fcr31 & 3 {
            0 => RoundingMode::NearestEven,
            1 => RoundingMode::TowardZero,
            2 => RoundingMode::TowardPlus,
            _ => RoundingMode::TowardMinus,
        }
    }

    /// Round a double to an integral double in this mode.
    pub fn round_f64(self, v: f64) -> f64 {
        match self {
            RoundingMode::NearestEven => v.round_ties_even(),
            RoundingMode::TowardZero => v.trunc(),
            RoundingMode::TowardPlus => v.ceil(),
            RoundingMode::TowardMinus => v.floor(),
        }
    }

    pub fn round_f32(self, v: f32) -> f32 {
        match self {
            RoundingMode::NearestEven => v.round_ties_even(),
            RoundingMode::TowardZero => v.trunc(),
            RoundingMode::TowardPlus => v.ceil(),
            RoundingMode::TowardMinus => v.floor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cop1 {
    fgr: [u64; 32],
    pub fcr0: u32,
    pub fcr31: u32,
    /// Mirror of the Status FR bit; drives register addressing.
    fr_mode: bool,
}

impl Cop1 {
    pub fn new() -> Self {
        Self {
            fgr: [0; 32],
            fcr0: FCR0_VALUE,
            fcr31: 0,
            fr_mode: false,
        }
    }

    #[inline]
    pub fn rounding_mode(&self) -> RoundingMode {
        RoundingMode::from_fcr31(self.fcr31)
    }

    #[inline]
    pub fn condition(&self) -> bool {
        self.fcr31 & FCR31_CONDITION != 0
    }

    #[inline]
    pub fn set_condition(&mut self, cond: bool) {
        if cond {
            self.fcr31 |= FCR31_CONDITION;
        } else {
            self.fcr31 &= !FCR31_CONDITION;
        }
    }

    /// Raw 32-bit view of a single-precision register under the current
    /// FR mode.
    #[inline]
    pub fn read_single_bits(&self, index: usize) -> u32 {
        if self.fr_mode {
            self.fgr[index] as u32
        } else if index & 1 == 0 {
            self.fgr[index] as u32
        } else {
            (self.fgr[index & !1] >> 32) as u32
        }
    }

    #[inline]
    pub fn write_single_bits(&mut self, index: usize, bits: u32) {
        if self.fr_mode {
            self.fgr[index] = (self.fgr[index] & 0xFFFF_FFFF_0000_0000) | bits as u64;
        } else if index & 1 == 0 {
            self.fgr[index] = (self.fgr[index] & 0xFFFF_FFFF_0000_0000) | bits as u64;
        } else {
            let slot = index & !1;
            self.fgr[slot] = (self.fgr[slot] & 0x0000_0000_FFFF_FFFF) | ((bits as u64) << 32);
        }
    }

    /// Raw 64-bit view of a double-precision register. With FR clear
    /// the low index bit is ignored.
    #[inline]
    pub fn read_double_bits(&self, index: usize) -> u64 {
        if self.fr_mode {
            self.fgr[index]
        } else {
            self.fgr[index & !1]
        }
    }

    #[inline]
    pub fn write_double_bits(&mut self, index: usize, bits: u64) {
        if self.fr_mode {
            self.fgr[index] = bits;
        } else {
            self.fgr[index & !1] = bits;
        }
    }

    #[inline]
    pub fn read_single(&self, index: usize) -> f32 {
        f32::from_bits(self.read_single_bits(index))
    }

    #[inline]
    pub fn write_single(&mut self, index: usize, value: f32) {
        self.write_single_bits(index, value.to_bits());
    }

    #[inline]
    pub fn read_double(&self, index: usize) -> f64 {
        f64::from_bits(self.read_double_bits(index))
    }

    #[inline]
    pub fn write_double(&mut self, index: usize, value: f64) {
        self.write_double_bits(index, value.to_bits());
    }

    #[inline]
    pub fn fr_mode(&self) -> bool {
        self.fr_mode
    }

    /// Switch register addressing when the Status FR bit changes,
    /// shuffling the 32-bit halves so every single-precision register
    /// keeps its value across the switch.
    pub fn set_fr_mode(&mut self, fr: bool) {
        if fr == self.fr_mode {
            return;
        }
        let mut singles = [0u32; 32];
        for (i, s) in singles.iter_mut().enumerate() {
            *s = self.read_single_bits(i);
        }
        self.fr_mode = fr;
        for (i, s) in singles.iter().enumerate() {
            self.write_single_bits(i, *s);
        }
    }
}

impl Default for Cop1 {
    fn default() -> Self {
        Self::new()
    }
}
