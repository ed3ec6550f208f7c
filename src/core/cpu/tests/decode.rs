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
use crate::core::cpu::decode::{decode, FpFormat, Op};

#[test]
fn test_decode_classifies_major_opcodes() {
    assert_eq!(decode(nop()).op, Op::Sll);
    assert_eq!(decode(addiu(8, 9, 5)).op, Op::Addiu);
    assert_eq!(decode(lui(8, 0x1234)).op, Op::Lui);
    assert_eq!(decode(beq(1, 2, 4)).op, Op::Beq);
    assert_eq!(decode(jal(0x8000_1000)).op, Op::Jal);
    assert_eq!(decode(lw(8, 9, 4)).op, Op::Lw);
    assert_eq!(decode(sw(8, 9, 4)).op, Op::Sw);
}

#[test]
fn test_decode_special_and_regimm() {
    assert_eq!(decode(r_type(0x21, 1, 2, 3, 0)).op, Op::Addu);
    assert_eq!(decode(r_type(0x08, 31, 0, 0, 0)).op, Op::Jr);
    assert_eq!(decode(r_type(0x3C, 0, 1, 2, 4)).op, Op::Dsll32);
    assert_eq!(decode(i_type(0x01, 4, 0x01, 8)).op, Op::Bgez);
    assert_eq!(decode(i_type(0x01, 4, 0x10, 8)).op, Op::Bltzal);
}

#[test]
fn test_decode_cop0_and_cop1() {
    assert_eq!(decode(mtc0(8, 0)).op, Op::Mtc0);
    assert_eq!(decode(tlbwi()).op, Op::Tlbwi);
    assert_eq!(decode(eret()).op, Op::Eret);
    assert_eq!(decode(mtc1(8, 4)).op, Op::Mtc1);
    assert_eq!(decode(cop1(16, 0x00, 6, 4, 8)).op, Op::FpAdd);
    assert_eq!(decode(cop1(17, 0x3C, 6, 4, 0)).op, Op::FpClt);
    assert_eq!(decode(bc1t(4)).op, Op::Bc1t);
}

#[test]
fn test_unassigned_encodings_are_reserved() {
    assert_eq!(decode(0x7000_0000).op, Op::Reserved);
    assert_eq!(decode(r_type(0x01, 0, 0, 0, 0)).op, Op::Reserved);
    assert_eq!(decode(i_type(0x01, 0, 0x08, 0)).op, Op::Reserved);
}

#[test]
fn test_field_accessors() {
    let d = decode(r_type(0x21, 9, 10, 11, 0));
    assert_eq!(d.rs(), 9);
    assert_eq!(d.rt(), 10);
    assert_eq!(d.rd(), 11);

    let d = decode(addiu(8, 29, 0xFFF0));
    assert_eq!(d.imm16(), 0xFFF0);
    assert_eq!(d.simm16(), -16);

    let d = decode(jal(0x8123_4560));
    assert_eq!(d.target26(), (0x8123_4560 >> 2) & 0x03FF_FFFF);

    let d = decode(cop1(17, 0x00, 6, 4, 8));
    assert_eq!(d.ft(), 6);
    assert_eq!(d.fs(), 4);
    assert_eq!(d.fd(), 8);
    assert_eq!(d.fmt(), FpFormat::Double);
}

#[test]
fn test_is_jump_marks_block_boundaries() {
    assert!(decode(beq(0, 0, 4)).is_jump());
    assert!(decode(r_type(0x08, 31, 0, 0, 0)).is_jump());
    assert!(decode(eret()).is_jump());
    assert!(decode(bc1t(4)).is_jump());
    assert!(!decode(addiu(8, 0, 1)).is_jump());
    assert!(!decode(lw(8, 9, 0)).is_jump());
}
