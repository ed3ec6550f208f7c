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

use clap::Parser;
use log::{error, info};
use r64core::core::config::CoreConfig;
use r64core::core::error::Result;
use r64core::core::rom::{Rom, RomCache};
use r64core::core::save_state::SaveState;
use r64core::core::system::System;
use std::path::PathBuf;

/// Nintendo 64 CPU core, headless frontend
#[derive(Parser)]
#[command(name = "r64core")]
#[command(about = "Nintendo 64 emulator core", long_about = None)]
struct Args {
    /// Path to a ROM image (.z64/.v64/.n64, optionally gzipped)
    rom_file: PathBuf,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Number of frames to run before exiting
    #[arg(short = 'n', long, default_value = "600")]
    frames: u64,

    /// Restore this save state before running
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Write a save state here after the run
    #[arg(long)]
    save_state: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("r64core v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };

    info!("Loading ROM from: {}", args.rom_file.display());
    let mut rom_cache = RomCache::new(config.rom_cache_size);
    let rom = Rom::load(&args.rom_file, &mut rom_cache)?;
    info!("ROM md5: {}", rom.md5());

    let mut system = System::new(rom, &config);

    if let Some(path) = &args.load_state {
        info!("Restoring state from: {}", path.display());
        SaveState::read_from(path)?.restore(&mut system)?;
    }

    info!("Starting emulation for {} frames...", args.frames);
    for frame in 0..args.frames {
        if let Err(e) = system.run_one_frame() {
            error!("Halted at PC=0x{:08X} in frame {}: {}", system.cpu.pc, frame, e);
            system.cpu.dump_registers();
            return Err(e);
        }
    }

    info!("Emulation completed");
    info!("Frames: {}", system.cpu.vi_count);
    info!("Cycles: {}", system.cpu.cycles);
    info!("Final PC: 0x{:08X}", system.cpu.pc);

    if let Some(path) = &args.save_state {
        info!("Writing state to: {}", path.display());
        SaveState::capture(&system).write_to(path)?;
    }

    Ok(())
}
