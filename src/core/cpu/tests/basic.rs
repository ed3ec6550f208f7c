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

use super::*;
use crate::core::error::CoreError;

#[test]
fn test_lui_ori_builds_constant() {
    let (mut cpu, mut bus) = setup(&[lui(8, 0xDEAD), ori(8, 8, 0xBEEF)]);
    step_n(&mut cpu, &mut bus, 2);
    // Bit 31 set, so the value is sign-extended into the upper half.
    assert_eq!(cpu.regs[8], 0xFFFF_FFFF_DEAD_BEEF);
}

#[test]
fn test_addiu_sign_extends() {
    let (mut cpu, mut bus) = setup(&[addiu(8, 0, 0xFFFF)]);
    step_n(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs[8] as i64, -1);
}

#[test]
fn test_addu_wraps_and_sign_extends() {
    let (mut cpu, mut bus) = setup(&[addu(10, 8, 9)]);
    cpu.regs[8] = 0x7FFF_FFFF;
    cpu.regs[9] = 1;
    step_n(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs[10], 0xFFFF_FFFF_8000_0000);
}

#[test]
fn test_writes_to_r0_are_dropped() {
    let (mut cpu, mut bus) = setup(&[addiu(0, 0, 0x1234)]);
    step_n(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs[0], 0);
}

#[test]
fn test_slt_and_sltu_disagree_on_sign() {
    let slt = r_type(0x2A, 8, 9, 10, 0);
    let sltu = r_type(0x2B, 8, 9, 11, 0);
    let (mut cpu, mut bus) = setup(&[slt, sltu]);
    cpu.regs[8] = (-1i64) as u64;
    cpu.regs[9] = 1;
    step_n(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs[10], 1);
    assert_eq!(cpu.regs[11], 0);
}

#[test]
fn test_branch_executes_delay_slot() {
    // beq r0, r0, +2 ; delay slot addiu r8 ; skipped addiu r9 ; target addiu r10
    let program = [
        beq(0, 0, 2),
        addiu(8, 0, 1),
        addiu(9, 0, 1),
        addiu(10, 0, 1),
    ];
    let (mut cpu, mut bus) = setup(&program);
    step_n(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs[8], 1, "delay slot must run");
    assert_eq!(cpu.regs[9], 0, "branched-over instruction must not run");
    assert_eq!(cpu.regs[10], 1, "branch target must run");
}

#[test]
fn test_likely_branch_nullifies_slot_when_not_taken() {
    // bnel r0, r0 is never taken; its delay slot must be skipped.
    let program = [bnel(0, 0, 2), addiu(8, 0, 1), addiu(9, 0, 1)];
    let (mut cpu, mut bus) = setup(&program);
    step_n(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs[8], 0, "nullified slot must not run");
    assert_eq!(cpu.regs[9], 1);
    assert_eq!(cpu.pc, PROGRAM_VADDR + 12);
}

#[test]
fn test_jal_links_past_delay_slot() {
    let target = PROGRAM_VADDR + 0x40;
    let (mut cpu, mut bus) = setup(&[jal(target), nop()]);
    step_n(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs[31], (PROGRAM_VADDR + 8) as u64);
    assert_eq!(cpu.pc, target);
}

#[test]
fn test_jr_returns_through_register() {
    let jr = r_type(0x08, 8, 0, 0, 0);
    let (mut cpu, mut bus) = setup(&[jr, nop()]);
    cpu.regs[8] = 0x8000_2000;
    step_n(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc, 0x8000_2000);
}

#[test]
fn test_store_load_roundtrip_with_sign() {
    let program = [
        sw(8, 9, 0x100),
        lw(10, 9, 0x100),
        i_type(0x20, 9, 11, 0x100), // lb
        i_type(0x24, 9, 12, 0x100), // lbu
    ];
    let (mut cpu, mut bus) = setup(&program);
    cpu.regs[8] = 0x8091_A2B3;
    cpu.regs[9] = 0x8000_4000;
    step_n(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.regs[10], 0xFFFF_FFFF_8091_A2B3);
    assert_eq!(cpu.regs[11] as i64, 0x80u8 as i8 as i64);
    assert_eq!(cpu.regs[12], 0x80);
}

#[test]
fn test_lwl_lwr_assemble_unaligned_word() {
    // Memory holds AA BB CC DD EE at 0x4000; load the word at the
    // unaligned address 0x4001 with the lwl/lwr pair.
    let program = [
        i_type(0x22, 9, 8, 0x001), // lwl r8, 1(r9)
        i_type(0x26, 9, 8, 0x004), // lwr r8, 4(r9)
    ];
    let (mut cpu, mut bus) = setup(&program);
    bus.write32(0x4000, 0xAABB_CCDD);
    bus.write32(0x4004, 0xEE11_2233);
    cpu.regs[9] = 0x8000_4000;
    step_n(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs[8] as u32, 0xBBCC_DDEE);
}

#[test]
fn test_mult_splits_product() {
    let mult = r_type(0x18, 8, 9, 0, 0);
    let mflo = r_type(0x12, 0, 0, 10, 0);
    let mfhi = r_type(0x10, 0, 0, 11, 0);
    let (mut cpu, mut bus) = setup(&[mult, mflo, mfhi]);
    cpu.regs[8] = (-7i64) as u64;
    cpu.regs[9] = 3;
    step_n(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs[10] as i64, -21);
    assert_eq!(cpu.regs[11] as i64, -1);
}

#[test]
fn test_div_by_zero_leaves_hi_lo() {
    let div = r_type(0x1A, 8, 9, 0, 0);
    let (mut cpu, mut bus) = setup(&[div]);
    cpu.regs[8] = 10;
    cpu.regs[9] = 0;
    cpu.hi = 0x1111;
    cpu.lo = 0x2222;
    step_n(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.hi, 0x1111);
    assert_eq!(cpu.lo, 0x2222);
}

#[test]
fn test_dsll32_shifts_into_upper_half() {
    let dsll32 = r_type(0x3C, 0, 8, 9, 4);
    let (mut cpu, mut bus) = setup(&[dsll32]);
    cpu.regs[8] = 0x1;
    step_n(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs[9], 1u64 << 36);
}

#[test]
fn test_ll_sc_pair_succeeds() {
    let ll = i_type(0x30, 9, 8, 0x100);
    let sc = i_type(0x38, 9, 10, 0x100);
    let (mut cpu, mut bus) = setup(&[ll, sc]);
    cpu.regs[9] = 0x8000_4000;
    cpu.regs[10] = 0x55;
    step_n(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs[10], 1, "sc after ll must succeed");
    assert_eq!(bus.read32(0x4100), 0x55);
    assert!(!cpu.ll_bit);
}

#[test]
fn test_sc_without_ll_fails() {
    let sc = i_type(0x38, 9, 10, 0x100);
    let (mut cpu, mut bus) = setup(&[sc]);
    cpu.regs[9] = 0x8000_4000;
    cpu.regs[10] = 0x55;
    step_n(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs[10], 0);
    assert_eq!(bus.read32(0x4100), 0);
}

#[test]
fn test_reserved_instruction_halts() {
    // Opcode 0x1C is unassigned.
    let (mut cpu, mut bus) = setup(&[0x7000_0000]);
    let err = cpu.step(&mut bus).unwrap_err();
    assert!(matches!(err, CoreError::Halted { .. }));
}
