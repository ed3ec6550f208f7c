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
use crate::core::cpu::decode::Op;

fn page_of_nops() -> Vec<u32> {
    vec![0u32; 0x400]
}

#[test]
fn test_translate_decodes_every_word() {
    let mut words = page_of_nops();
    words[0] = 0x2508_0001; // addiu r8, r8, 1
    words[1] = 0x0100_0008; // jr r8
    let block = DecodedBlock::translate(0x8000_1000, &words);
    assert_eq!(block.start, 0x8000_1000);
    assert_eq!(block.end, 0x8000_2000);
    assert_eq!(block.instrs.len(), 0x400);
    assert_eq!(block.instr_at(0x8000_1000).op, Op::Addiu);
    assert_eq!(block.instr_at(0x8000_1004).op, Op::Jr);
    assert_eq!(block.instr_at(0x8000_1008).op, Op::Sll);
}

#[test]
fn test_page_state_transitions() {
    let mut cache = CodeCache::new();
    assert_eq!(cache.page_state(0x8_0001), PageState::Unknown);

    let block = DecodedBlock::translate(0x8000_1000, &page_of_nops());
    cache.install(0x8_0001, block, None);
    assert_eq!(cache.page_state(0x8_0001), PageState::Valid);

    cache.invalidate(0x8_0001);
    assert_eq!(cache.page_state(0x8_0001), PageState::Invalid);

    cache.revalidate(0x8_0001);
    assert_eq!(cache.page_state(0x8_0001), PageState::Valid);
}

#[test]
fn test_revalidate_requires_a_block() {
    let mut cache = CodeCache::new();
    cache.revalidate(0x8_0001);
    assert_eq!(cache.page_state(0x8_0001), PageState::Unknown);
}

#[test]
fn test_notify_write_retires_both_kseg_mirrors() {
    let mut cache = CodeCache::new();
    cache.install(
        0x8_0003,
        DecodedBlock::translate(0x8000_3000, &page_of_nops()),
        None,
    );
    cache.install(
        0xA_0003,
        DecodedBlock::translate(0xA000_3000, &page_of_nops()),
        None,
    );
    cache.notify_write(0x3004);
    assert_eq!(cache.page_state(0x8_0003), PageState::Invalid);
    assert_eq!(cache.page_state(0xA_0003), PageState::Invalid);
}

#[test]
fn test_notify_write_follows_physical_links() {
    let mut cache = CodeCache::new();
    // A TLB-mapped translation at vpage 0x200 backed by physical page 5.
    cache.install(
        0x200,
        DecodedBlock::translate(0x0020_0000, &page_of_nops()),
        Some(0x5),
    );
    cache.notify_write(0x5FFC);
    assert_eq!(cache.page_state(0x200), PageState::Invalid);

    // A store to an unrelated physical page leaves it alone.
    cache.revalidate(0x200);
    cache.notify_write(0x6000);
    assert_eq!(cache.page_state(0x200), PageState::Valid);
}

#[test]
fn test_notify_write_masks_kseg_physical_address() {
    let mut cache = CodeCache::new();
    cache.install(
        0x8_0003,
        DecodedBlock::translate(0x8000_3000, &page_of_nops()),
        None,
    );
    // A store issued with the KSEG0 bit still present retires the same
    // physical page.
    cache.notify_write(0x8000_3000);
    assert_eq!(cache.page_state(0x8_0003), PageState::Invalid);
}

#[test]
fn test_checksum_storage() {
    let mut cache = CodeCache::new();
    assert_eq!(cache.stored_checksum(0x8_0001), None);
    cache.set_checksum(0x8_0001, 0xDEAD_BEEF); // no block, dropped
    assert_eq!(cache.stored_checksum(0x8_0001), None);

    cache.install(
        0x8_0001,
        DecodedBlock::translate(0x8000_1000, &page_of_nops()),
        None,
    );
    assert_eq!(cache.stored_checksum(0x8_0001), Some(0));
    cache.set_checksum(0x8_0001, 0xDEAD_BEEF);
    assert_eq!(cache.stored_checksum(0x8_0001), Some(0xDEAD_BEEF));
}

#[test]
fn test_clear_forgets_everything() {
    let mut cache = CodeCache::new();
    cache.install(
        0x8_0001,
        DecodedBlock::translate(0x8000_1000, &page_of_nops()),
        Some(0x1),
    );
    cache.clear();
    assert_eq!(cache.page_state(0x8_0001), PageState::Unknown);
    assert!(cache.block(0x8_0001).is_none());
    // The old physical link must not retire a fresh translation.
    cache.install(
        0x300,
        DecodedBlock::translate(0x0030_0000, &page_of_nops()),
        None,
    );
    cache.notify_write(0x1000);
    assert_eq!(cache.page_state(0x300), PageState::Valid);
}
