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

//! Nintendo 64 CPU core library
//!
//! This library provides the core emulation components for a Nintendo 64
//! emulator: the R4300i CPU interpreter with a cached block dispatcher,
//! the COP0 system-control and COP1 floating-point coprocessors, the
//! software TLB/MMU, ROM loading, and the execution session.
//!
//! # Example
//!
//! ```
//! use r64core::core::config::CoreConfig;
//! use r64core::core::cpu::Cpu;
//! use r64core::core::memory::Bus;
//!
//! let mut cpu = Cpu::new(&CoreConfig::default());
//! let mut bus = Bus::new();
//!
//! // Execute one instruction
//! cpu.step(&mut bus).unwrap();
//! ```

pub mod core;
