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

/// Emulator error types
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for the core
///
/// Guest-recoverable faults (TLB refill, coprocessor unusable) never
/// appear here; they are redirected to the guest exception vector
/// inside the CPU. An error from this enum means the emulation loop
/// must stop at the next instruction boundary.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Fail-fast halt: an unrecoverable guest condition (bad privileged
    /// write, signalling NaN compare, ...).
    /// The loop must not silently continue after one of these.
    #[error("core halted: {reason} (PC=0x{pc:08X})")]
    Halted { reason: String, pc: u32 },

    #[error("ROM file not found: {0}")]
    RomNotFound(String),

    #[error("unrecognized ROM image format (first word 0x{first_word:08X})")]
    BadRomFormat { first_word: u32 },

    #[error("ROM image too small: {got} bytes (need at least {expected})")]
    RomTooSmall { expected: usize, got: usize },

    #[error("invalid memory access at 0x{address:08X}")]
    InvalidMemoryAccess { address: u32 },

    #[error("save state version mismatch: got {got}, expected {expected}")]
    SaveStateVersion { expected: u32, got: u32 },

    #[error("save state decode error: {0}")]
    SaveStateDecode(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Build the fail-fast halt error, logging the diagnostic the way the
    /// rest of the core does before surfacing it.
    pub fn halted(reason: impl Into<String>, pc: u32) -> Self {
        let reason = reason.into();
        log::error!("core halt at PC=0x{:08X}: {}", pc, reason);
        CoreError::Halted { reason, pc }
    }
}
