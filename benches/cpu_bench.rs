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

use criterion::{criterion_group, criterion_main, Criterion};
use r64core::core::config::{CoreConfig, CpuStyle};
use r64core::core::cpu::Cpu;
use r64core::core::memory::Bus;
use std::hint::black_box;

fn i_type(op: u32, rs: u32, rt: u32, imm: u32) -> u32 {
    (op << 26) | (rs << 21) | (rt << 16) | (imm & 0xFFFF)
}

/// Tight ALU loop: addiu/addu body with a bne back edge.
fn loop_program() -> Vec<u32> {
    vec![
        i_type(0x09, 0, 9, 0xFFFF),  // addiu r9, r0, -1 (runs forever)
        i_type(0x09, 10, 10, 1),     // addiu r10, r10, 1
        (10 << 21) | (10 << 16) | (11 << 11) | 0x21, // addu r11, r10, r10
        i_type(0x05, 9, 0, 0xFFFD),  // bne r9, r0, -3
        0,                           // nop
    ]
}

fn setup(style: CpuStyle) -> (Cpu, Bus) {
    let config = CoreConfig {
        cpu_style: style,
        ..CoreConfig::default()
    };
    let mut cpu = Cpu::new(&config);
    let mut bus = Bus::new();
    for (i, word) in loop_program().iter().enumerate() {
        bus.write32(0x1000 + (i as u32) * 4, *word);
    }
    cpu.pc = 0x8000_1000;
    (cpu, bus)
}

fn bench_interpreters(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_loop_10k");
    for (name, style) in [
        ("cached", CpuStyle::CachedInterpreter),
        ("pure", CpuStyle::PureInterpreter),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let (mut cpu, mut bus) = setup(style);
                for _ in 0..10_000 {
                    cpu.step(&mut bus).unwrap();
                }
                black_box(cpu.regs[11])
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_interpreters);
criterion_main!(benches);
