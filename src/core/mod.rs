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

//! Core emulation components
//!
//! This module contains the hardware emulation components:
//! - CPU (MIPS R4300i) with COP0, COP1 and the software TLB
//! - Memory bus (RDRAM, SP memories, ROM window)
//! - Block cache / cached-dispatch recompiler
//! - ROM loading and identification
//! - Execution session integration

pub mod config;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod recompiler;
pub mod rom;
pub mod save_state;
pub mod system;

// Re-export commonly used types
pub use config::CoreConfig;
pub use cpu::Cpu;
pub use error::{CoreError, Result};
pub use memory::Bus;
pub use rom::Rom;
pub use system::System;
