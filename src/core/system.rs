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

//! Emulation session
//!
//! A [`System`] owns one booted machine (CPU, bus, cartridge) and runs
//! it on the caller's thread. Control from other threads goes through
//! the shared [`SessionFlags`]: pause/resume, stop, frame advance and
//! the screen-invalidated signal are all atomics, so a frontend can
//! flip them without holding any lock while the core is executing.
//!
//! The run loop is frame-granular: it executes until a vertical
//! interrupt fires, notifies the sinks, then re-checks the flags. While
//! paused, queued frame-advance requests are burned down one frame per
//! request.

use crate::core::config::CoreConfig;
use crate::core::cpu::Cpu;
use crate::core::error::Result;
use crate::core::memory::Bus;
use crate::core::rom::Rom;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// One controller's inputs for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub buttons: u32,
    pub stick_x: i8,
    pub stick_y: i8,
}

/// Supplies controller state, polled once per frame.
pub trait InputSource: Send {
    fn poll(&mut self, frame: u64) -> ControllerState;
}

/// Receives frame-completion notifications.
pub trait VideoSink: Send {
    fn frame_ready(&mut self, frame: u64);
}

/// Cross-thread session controls.
#[derive(Debug, Default)]
pub struct SessionFlags {
    pub emu_launched: AtomicBool,
    pub emu_paused: AtomicBool,
    pub core_executing: AtomicBool,
    /// A frame completed since the frontend last presented.
    pub screen_invalidated: AtomicBool,
    /// Frames still to run while paused.
    pub frame_advance_outstanding: AtomicUsize,
    pub stop_requested: AtomicBool,
}

impl SessionFlags {
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn set_paused(&self, paused: bool) {
        self.emu_paused.store(paused, Ordering::SeqCst);
    }

    /// Queue one frame to run while paused.
    pub fn frame_advance(&self) {
        self.frame_advance_outstanding.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct System {
    pub cpu: Cpu,
    pub bus: Bus,
    rom: Rom,
    flags: Arc<SessionFlags>,
    input: Option<Box<dyn InputSource>>,
    video: Option<Box<dyn VideoSink>>,
}

impl System {
    /// Boot a machine around a loaded cartridge (HLE boot: the IPL3
    /// register state is synthesized and execution starts in SP DMEM).
    pub fn new(rom: Rom, config: &CoreConfig) -> Self {
        let mut cpu = Cpu::new(config);
        let mut bus = Bus::new();
        cpu.power_on(&rom, &mut bus);
        Self {
            cpu,
            bus,
            rom,
            flags: Arc::new(SessionFlags::default()),
            input: None,
            video: None,
        }
    }

    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    /// Shared handle for controlling the session from other threads.
    pub fn flags(&self) -> Arc<SessionFlags> {
        Arc::clone(&self.flags)
    }

    pub fn set_input_source(&mut self, input: Box<dyn InputSource>) {
        self.input = Some(input);
    }

    pub fn set_video_sink(&mut self, video: Box<dyn VideoSink>) {
        self.video = Some(video);
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<()> {
        self.cpu.step(&mut self.bus)
    }

    /// Execute until the next vertical interrupt and notify the sinks.
    pub fn run_one_frame(&mut self) -> Result<()> {
        let frame = self.cpu.vi_count;
        if let Some(input) = self.input.as_mut() {
            // The controller timeline stays frame-indexed even before
            // PIF access is wired up to it.
            let _ = input.poll(frame);
        }
        self.cpu.run_frame(&mut self.bus)?;
        self.flags.screen_invalidated.store(true, Ordering::SeqCst);
        if let Some(video) = self.video.as_mut() {
            video.frame_ready(self.cpu.vi_count);
        }
        Ok(())
    }

    /// Run until stopped. Returns the halt error if the guest executed
    /// something fatal; the register dump has been logged by then.
    pub fn run(&mut self) -> Result<()> {
        self.flags.emu_launched.store(true, Ordering::SeqCst);
        self.flags.core_executing.store(true, Ordering::SeqCst);
        log::info!("session started: \"{}\"", self.rom.header().name);

        let result = self.run_loop();

        self.flags.core_executing.store(false, Ordering::SeqCst);
        self.flags.emu_launched.store(false, Ordering::SeqCst);
        if let Err(err) = &result {
            log::error!("session halted: {err}");
            self.cpu.dump_registers();
        }
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        while !self.flags.stop_requested.load(Ordering::SeqCst) {
            if self.flags.emu_paused.load(Ordering::SeqCst) {
                if self.flags.frame_advance_outstanding.load(Ordering::SeqCst) > 0 {
                    self.run_one_frame()?;
                    self.flags
                        .frame_advance_outstanding
                        .fetch_sub(1, Ordering::SeqCst);
                } else {
                    std::thread::yield_now();
                }
                continue;
            }
            self.run_one_frame()?;
        }
        log::info!("session stopped at pc=0x{:08X}", self.cpu.pc);
        Ok(())
    }
}
