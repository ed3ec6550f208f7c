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

//! Core configuration
//!
//! Settings consumed by the core itself (not the frontend): which CPU
//! core style to run, how many decoded ROM images to keep cached, and
//! the cycle counter divider.

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which execution engine drives the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuStyle {
    /// Decode and execute one instruction at a time.
    PureInterpreter,
    /// Decode whole pages into cached blocks, invalidated on
    /// self-modification (the recompiler path).
    #[default]
    CachedInterpreter,
}

/// Core configuration, loadable from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Execution engine selection.
    pub cpu_style: CpuStyle,

    /// Maximum number of normalized ROM images kept in the in-memory
    /// ROM cache.
    pub rom_cache_size: usize,

    /// Cycles per Count tick. Real hardware increments Count at half
    /// the pipeline clock; 2 reproduces that.
    pub counter_factor: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cpu_style: CpuStyle::default(),
            rom_cache_size: 4,
            counter_factor: 2,
        }
    }
}

impl CoreConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
