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

//! COP1 instructions: moves, control registers, arithmetic,
//! conversions and compares.
//!
//! Every COP1 instruction first checks the Status CU1 bit; with the
//! coprocessor unusable the handler raises the unusable exception and
//! the faulting instruction re-executes after the OS enables it.
//!
//! The signalling compare family treats a NaN operand as fatal, the
//! quiet family folds it into the condition. The explicit
//! float-to-integer conversions (CVT.W/CVT.L) honor the FCR31 rounding
//! mode; ROUND/TRUNC/CEIL/FLOOR carry their mode in the opcode.

use crate::core::cpu::cop0::{self, ExceptionCode};
use crate::core::cpu::decode::{Decoded, FpFormat};
use crate::core::cpu::Cpu;
use crate::core::error::{CoreError, Result};

impl Cpu {
    /// Check CU1; raises the coprocessor-unusable exception and returns
    /// false when COP1 is disabled.
    pub(crate) fn check_cop1_usable(&mut self) -> bool {
        if self.cop0.cop1_usable() {
            true
        } else {
            self.cop0.regs[cop0::CAUSE] =
                ((ExceptionCode::CoprocessorUnusable as u32) << 2) | cop0::CAUSE_CE1;
            self.general_exception();
            false
        }
    }

    pub(crate) fn op_mfc1(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let bits = self.cop1.read_single_bits(i.fs() as usize);
        self.write_reg32(i.rt(), bits);
        Ok(())
    }

    pub(crate) fn op_dmfc1(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let bits = self.cop1.read_double_bits(i.fs() as usize);
        self.write_reg(i.rt(), bits);
        Ok(())
    }

    pub(crate) fn op_mtc1(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let bits = self.read_reg(i.rt()) as u32;
        self.cop1.write_single_bits(i.fs() as usize, bits);
        Ok(())
    }

    pub(crate) fn op_dmtc1(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let bits = self.read_reg(i.rt());
        self.cop1.write_double_bits(i.fs() as usize, bits);
        Ok(())
    }

    pub(crate) fn op_cfc1(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let value = match i.fs() {
            31 => self.cop1.fcr31,
            0 => self.cop1.fcr0,
            _ => 0,
        };
        self.write_reg32(i.rt(), value);
        Ok(())
    }

    pub(crate) fn op_ctc1(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        if i.fs() == 31 {
            // Rounding mode rides in the low two bits and takes effect
            // on the next conversion.
            self.cop1.fcr31 = self.read_reg(i.rt()) as u32;
        }
        Ok(())
    }

    pub(crate) fn fp_binary(
        &mut self,
        i: Decoded,
        single: fn(f32, f32) -> f32,
        double: fn(f64, f64) -> f64,
    ) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let (fs, ft, fd) = (i.fs() as usize, i.ft() as usize, i.fd() as usize);
        match i.fmt() {
            FpFormat::Single => {
                let v = single(self.cop1.read_single(fs), self.cop1.read_single(ft));
                self.cop1.write_single(fd, v);
                Ok(())
            }
            FpFormat::Double => {
                let v = double(self.cop1.read_double(fs), self.cop1.read_double(ft));
                self.cop1.write_double(fd, v);
                Ok(())
            }
            _ => Err(self.bad_fp_format(i)),
        }
    }

    pub(crate) fn fp_unary(
        &mut self,
        i: Decoded,
        single: fn(f32) -> f32,
        double: fn(f64) -> f64,
    ) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let (fs, fd) = (i.fs() as usize, i.fd() as usize);
        match i.fmt() {
            FpFormat::Single => {
                let v = single(self.cop1.read_single(fs));
                self.cop1.write_single(fd, v);
                Ok(())
            }
            FpFormat::Double => {
                let v = double(self.cop1.read_double(fs));
                self.cop1.write_double(fd, v);
                Ok(())
            }
            _ => Err(self.bad_fp_format(i)),
        }
    }

    /// MOV.fmt copies raw bits; it never rounds or signals.
    pub(crate) fn op_fp_mov(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let (fs, fd) = (i.fs() as usize, i.fd() as usize);
        match i.fmt() {
            FpFormat::Single => {
                let bits = self.cop1.read_single_bits(fs);
                self.cop1.write_single_bits(fd, bits);
                Ok(())
            }
            FpFormat::Double => {
                let bits = self.cop1.read_double_bits(fs);
                self.cop1.write_double_bits(fd, bits);
                Ok(())
            }
            _ => Err(self.bad_fp_format(i)),
        }
    }

    /// ROUND/TRUNC/CEIL/FLOOR.W: convert to a 32-bit integer with the
    /// mode baked into the opcode.
    pub(crate) fn fp_to_word(&mut self, i: Decoded, round: fn(f64) -> f64) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let (fs, fd) = (i.fs() as usize, i.fd() as usize);
        let v = match i.fmt() {
            FpFormat::Single => self.cop1.read_single(fs) as f64,
            FpFormat::Double => self.cop1.read_double(fs),
            _ => return Err(self.bad_fp_format(i)),
        };
        self.cop1.write_single_bits(fd, round(v) as i32 as u32);
        Ok(())
    }

    pub(crate) fn fp_to_long(&mut self, i: Decoded, round: fn(f64) -> f64) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let (fs, fd) = (i.fs() as usize, i.fd() as usize);
        let v = match i.fmt() {
            FpFormat::Single => self.cop1.read_single(fs) as f64,
            FpFormat::Double => self.cop1.read_double(fs),
            _ => return Err(self.bad_fp_format(i)),
        };
        self.cop1.write_double_bits(fd, round(v) as i64 as u64);
        Ok(())
    }

    pub(crate) fn op_cvt_s(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let (fs, fd) = (i.fs() as usize, i.fd() as usize);
        let v = match i.fmt() {
            FpFormat::Double => self.cop1.read_double(fs) as f32,
            FpFormat::Word => self.cop1.read_single_bits(fs) as i32 as f32,
            FpFormat::Long => self.cop1.read_double_bits(fs) as i64 as f32,
            _ => return Err(self.bad_fp_format(i)),
        };
        self.cop1.write_single(fd, v);
        Ok(())
    }

    pub(crate) fn op_cvt_d(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let (fs, fd) = (i.fs() as usize, i.fd() as usize);
        let v = match i.fmt() {
            FpFormat::Single => self.cop1.read_single(fs) as f64,
            FpFormat::Word => self.cop1.read_single_bits(fs) as i32 as f64,
            FpFormat::Long => self.cop1.read_double_bits(fs) as i64 as f64,
            _ => return Err(self.bad_fp_format(i)),
        };
        self.cop1.write_double(fd, v);
        Ok(())
    }

    /// CVT.W: float to 32-bit integer under the FCR31 rounding mode.
    pub(crate) fn op_cvt_w(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let mode = self.cop1.rounding_mode();
        let (fs, fd) = (i.fs() as usize, i.fd() as usize);
        let v = match i.fmt() {
            FpFormat::Single => mode.round_f32(self.cop1.read_single(fs)) as f64,
            FpFormat::Double => mode.round_f64(self.cop1.read_double(fs)),
            _ => return Err(self.bad_fp_format(i)),
        };
        self.cop1.write_single_bits(fd, v as i32 as u32);
        Ok(())
    }

    pub(crate) fn op_cvt_l(&mut self, i: Decoded) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let mode = self.cop1.rounding_mode();
        let (fs, fd) = (i.fs() as usize, i.fd() as usize);
        let v = match i.fmt() {
            FpFormat::Single => mode.round_f32(self.cop1.read_single(fs)) as f64,
            FpFormat::Double => mode.round_f64(self.cop1.read_double(fs)),
            _ => return Err(self.bad_fp_format(i)),
        };
        self.cop1.write_double_bits(fd, v as i64 as u64);
        Ok(())
    }

    /// Shared compare path. Operands are widened to f64 (exact for
    /// singles); `on_nan` is the condition when either operand is NaN
    /// and the compare is quiet.
    pub(crate) fn fp_compare(
        &mut self,
        i: Decoded,
        signalling: bool,
        on_nan: bool,
        cmp: fn(f64, f64) -> bool,
    ) -> Result<()> {
        if !self.check_cop1_usable() {
            return Ok(());
        }
        let (fs, ft) = (i.fs() as usize, i.ft() as usize);
        let (a, b) = match i.fmt() {
            FpFormat::Single => (
                self.cop1.read_single(fs) as f64,
                self.cop1.read_single(ft) as f64,
            ),
            FpFormat::Double => (self.cop1.read_double(fs), self.cop1.read_double(ft)),
            _ => return Err(self.bad_fp_format(i)),
        };
        if a.is_nan() || b.is_nan() {
            if signalling {
                log::error!("Invalid operation exception in C opcode");
                return Err(CoreError::halted(
                    "signalling FPU compare with NaN operand",
                    self.pc,
                ));
            }
            self.cop1.set_condition(on_nan);
        } else {
            self.cop1.set_condition(cmp(a, b));
        }
        Ok(())
    }

    fn bad_fp_format(&self, i: Decoded) -> CoreError {
        CoreError::halted(
            format!("invalid FPU format in instruction 0x{:08X}", i.word),
            self.pc,
        )
    }
}
