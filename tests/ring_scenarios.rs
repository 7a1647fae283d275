//! End-to-end ring buffer scenarios on the mock flash
//!
//! Exercises the full mount/push/pop lifecycle, durability across
//! remounts, overwrite wrapping, and the crash-commit protocol.
//!
//! Run with `cargo test --features mock`.

#![cfg(feature = "mock")]

use std::collections::VecDeque;

use flashring::platform::mock::{MockFlash, MockPartitionTable};
use flashring::ring::RingHeader;
use flashring::{FlashError, RingBuffer, RingError, RingOptions};

const SECTOR: u32 = 4096;
const PARTITION: u32 = 32768; // 2 header sectors + 6 data sectors
const RECORD: usize = 16;
const CAPACITY: u32 = 1536;
const RECORDS_PER_SECTOR: u32 = 256;
const DATA_BASE: u32 = 8192;

fn fresh_ring(options: RingOptions) -> RingBuffer<MockFlash> {
    RingBuffer::mount(MockFlash::new(SECTOR, PARTITION), RECORD as u32, options).unwrap()
}

fn remount(ring: RingBuffer<MockFlash>, options: RingOptions) -> RingBuffer<MockFlash> {
    let mut flash = ring.into_inner();
    flash.clear_write_failures();
    RingBuffer::mount(flash, RECORD as u32, options).unwrap()
}

/// Record payload derived from a push index
fn record(i: u32) -> [u8; RECORD] {
    let mut buf = [0u8; RECORD];
    for chunk in buf.chunks_mut(4) {
        chunk.copy_from_slice(&i.to_le_bytes());
    }
    buf
}

#[test]
fn s1_empty_cycle() {
    let ring = fresh_ring(RingOptions::empty());
    assert_eq!(ring.record_num(), 0);
    assert_eq!(ring.max_records(), CAPACITY);

    // A formatted partition mounts back to the same empty state
    let ring = remount(ring, RingOptions::empty());
    assert_eq!(ring.record_num(), 0);
}

#[test]
fn s2_basic_push_pop() {
    let mut ring = fresh_ring(RingOptions::empty());
    ring.push_back(&[0x01; RECORD]).unwrap();
    ring.push_back(&[0x02; RECORD]).unwrap();

    let mut buf = [0u8; RECORD];
    ring.pop_front(&mut buf).unwrap();
    assert_eq!(buf, [0x01; RECORD]);

    ring.peek_front(&mut buf).unwrap();
    assert_eq!(buf, [0x02; RECORD]);
    assert_eq!(ring.record_num(), 1);
}

#[test]
fn s3_sector_boundary_triggers_erase() {
    let mut ring = fresh_ring(RingOptions::empty());

    // Filling sector 0 erases only sector 0 of the data ring
    for i in 0..RECORDS_PER_SECTOR {
        ring.push_back(&record(i)).unwrap();
    }
    assert_eq!(ring.flash_mut().get_erase_count(DATA_BASE), 1);
    assert_eq!(ring.flash_mut().get_erase_count(DATA_BASE + SECTOR), 0);

    // The 257th record opens sector 1, which is erased before the write
    ring.push_back(&record(RECORDS_PER_SECTOR)).unwrap();
    assert_eq!(ring.flash_mut().get_erase_count(DATA_BASE + SECTOR), 1);
}

#[test]
fn s4_full_ring_without_overwrite() {
    let mut ring = fresh_ring(RingOptions::empty());
    for i in 0..CAPACITY {
        ring.push_back(&record(i)).unwrap();
    }

    assert_eq!(ring.push_back(&record(CAPACITY)), Err(RingError::OutOfSpace));
    assert_eq!(ring.record_num(), CAPACITY);

    let mut buf = [0u8; RECORD];
    ring.peek_front(&mut buf).unwrap();
    assert_eq!(buf, record(0));
}

#[test]
fn s5_overwrite_drops_oldest_sector() {
    let mut ring = fresh_ring(RingOptions::OVERWRITE);
    for i in 0..=CAPACITY {
        ring.push_back(&record(i)).unwrap();
    }

    // The push into the full ring dropped sector 0 (records 0..256)
    assert_eq!(ring.record_num(), CAPACITY - RECORDS_PER_SECTOR + 1);

    let mut buf = [0u8; RECORD];
    ring.pop_front(&mut buf).unwrap();
    assert_eq!(buf, record(RECORDS_PER_SECTOR));
}

#[test]
fn s6_crash_between_record_write_and_header_write() {
    // Without recovery: the interrupted push is forgotten
    let mut ring = fresh_ring(RingOptions::empty());
    ring.push_back(&record(1)).unwrap();
    ring.flash_mut().fail_after_writes(1);
    assert_eq!(
        ring.push_back(&record(2)),
        Err(RingError::Flash(FlashError::WriteFailed))
    );
    let ring = remount(ring, RingOptions::empty());
    assert_eq!(ring.record_num(), 1);

    // With recovery: the durably written record is counted back in
    let mut ring = fresh_ring(RingOptions::empty());
    ring.push_back(&record(1)).unwrap();
    ring.flash_mut().fail_after_writes(1);
    assert!(ring.push_back(&record(2)).is_err());
    let mut ring = remount(ring, RingOptions::RECOVERY);
    assert_eq!(ring.record_num(), 2);

    let mut buf = [0u8; RECORD];
    ring.pop_front(&mut buf).unwrap();
    assert_eq!(buf, record(1));
    ring.pop_front(&mut buf).unwrap();
    assert_eq!(buf, record(2));
}

#[test]
fn fifo_order_over_mixed_operations() {
    let mut ring = fresh_ring(RingOptions::empty());
    let mut model: VecDeque<[u8; RECORD]> = VecDeque::new();
    let mut buf = [0u8; RECORD];

    // Interleaved pushes and pops that walk the queue across several
    // sector boundaries
    for i in 0..900u32 {
        ring.push_back(&record(i)).unwrap();
        model.push_back(record(i));
        if i % 3 == 0 {
            ring.pop_front(&mut buf).unwrap();
            assert_eq!(buf, model.pop_front().unwrap());
        }
    }

    // Remount mid-stream, then drain completely
    let mut ring = remount(ring, RingOptions::empty());
    assert_eq!(ring.record_num() as usize, model.len());
    while let Some(expected) = model.pop_front() {
        ring.pop_front(&mut buf).unwrap();
        assert_eq!(buf, expected);
    }
    assert!(ring.is_empty());
}

#[test]
fn state_survives_remount_after_each_operation() {
    let mut ring = fresh_ring(RingOptions::empty());
    let mut buf = [0u8; RECORD];

    for i in 0..5u32 {
        ring.push_back(&record(i)).unwrap();
        ring = remount(ring, RingOptions::empty());
        assert_eq!(ring.record_num(), i + 1);
    }

    for i in 0..5u32 {
        ring.pop_front(&mut buf).unwrap();
        assert_eq!(buf, record(i));
        ring = remount(ring, RingOptions::empty());
        assert_eq!(ring.record_num(), 4 - i);
        if !ring.is_empty() {
            ring.peek_front(&mut buf).unwrap();
            assert_eq!(buf, record(i + 1));
        }
    }
}

#[test]
fn overwrite_keeps_newest_records_across_wraps() {
    let mut ring = fresh_ring(RingOptions::OVERWRITE);

    // Well over two laps around the ring
    let total = 4000u32;
    for i in 0..total {
        ring.push_back(&record(i)).unwrap();
    }

    let count = ring.record_num();
    assert!(count > CAPACITY - RECORDS_PER_SECTOR && count <= CAPACITY);

    // The survivors are exactly the last `count` pushes, in order
    let mut buf = [0u8; RECORD];
    for i in (total - count)..total {
        ring.pop_front(&mut buf).unwrap();
        assert_eq!(buf, record(i));
    }
    assert!(ring.is_empty());
}

#[test]
fn every_data_sector_is_erased_before_first_write() {
    let mut ring = fresh_ring(RingOptions::OVERWRITE);
    for i in 0..CAPACITY {
        ring.push_back(&record(i)).unwrap();
    }

    for sector in 0..6u32 {
        assert_eq!(
            ring.flash_mut().get_erase_count(DATA_BASE + sector * SECTOR),
            1,
            "data sector {} not erased exactly once on first lap",
            sector
        );
    }

    // The overwrite push wraps the back onto sector 0, erasing it again
    ring.push_back(&record(CAPACITY)).unwrap();
    assert_eq!(ring.flash_mut().get_erase_count(DATA_BASE), 2);
}

#[test]
fn header_commits_alternate_between_slots() {
    let mut ring = fresh_ring(RingOptions::empty());

    for i in 1..=5u32 {
        ring.push_back(&record(i)).unwrap();
        let slot = i % 2;
        let bytes: [u8; RingHeader::SIZE] = ring
            .flash_mut()
            .get_contents(slot * SECTOR, RingHeader::SIZE)
            .try_into()
            .unwrap();
        let header = RingHeader::decode(&bytes).unwrap();
        assert_eq!(header.sequence, i);
        assert_eq!(header.record_num, i);
    }
}

#[test]
fn crash_at_every_write_position_of_a_push() {
    // A push issues at most two writes: the record payload and the header
    // commit. Whichever fails, a remount must observe either the pre-push
    // or the post-push state, never anything in between.
    for fail_at in 0..2u32 {
        let mut ring = fresh_ring(RingOptions::RECOVERY);
        for i in 0..300u32 {
            ring.push_back(&record(i)).unwrap();
        }
        for _ in 0..50 {
            ring.delete_front().unwrap();
        }
        let pre_count = ring.record_num();

        ring.flash_mut().fail_after_writes(fail_at);
        assert!(ring.push_back(&record(9999)).is_err());

        let mut ring = remount(ring, RingOptions::RECOVERY);
        let count = ring.record_num();
        assert!(
            count == pre_count || count == pre_count + 1,
            "fail_at={}: got {} records, expected {} or {}",
            fail_at,
            count,
            pre_count,
            pre_count + 1
        );

        // The front of the queue is untouched either way
        let mut buf = [0u8; RECORD];
        ring.peek_front(&mut buf).unwrap();
        assert_eq!(buf, record(50));
    }
}

#[test]
fn crash_during_delete_rolls_back_to_pre_delete_state() {
    let mut ring = fresh_ring(RingOptions::RECOVERY);
    for i in 0..10u32 {
        ring.push_back(&record(i)).unwrap();
    }

    // The only write a delete issues is the header commit
    ring.flash_mut().fail_after_writes(0);
    assert!(ring.delete_front().is_err());

    let mut ring = remount(ring, RingOptions::RECOVERY);
    assert_eq!(ring.record_num(), 10);

    let mut buf = [0u8; RECORD];
    ring.peek_front(&mut buf).unwrap();
    assert_eq!(buf, record(0));
}

#[test]
fn torn_header_write_falls_back_to_previous_state() {
    let mut ring = fresh_ring(RingOptions::empty());
    for i in 0..3u32 {
        ring.push_back(&record(i)).unwrap();
    }

    // Power fails halfway through the header commit of a delete: the
    // written slot fails its CRC, so the remount falls back to the state
    // the other slot still holds
    ring.flash_mut().simulate_power_loss();
    ring.delete_front().unwrap();
    assert_eq!(ring.record_num(), 2);

    let mut ring = remount(ring, RingOptions::empty());
    assert_eq!(ring.record_num(), 3);

    let mut buf = [0u8; RECORD];
    ring.peek_front(&mut buf).unwrap();
    assert_eq!(buf, record(0));
}

#[test]
fn ring_opened_through_partition_table() {
    let mut table = MockPartitionTable::new();
    table.insert("events", MockFlash::new(SECTOR, PARTITION));

    assert!(matches!(table.open("missing"), Err(FlashError::NotFound)));

    let flash = table.open("events").unwrap();
    let mut ring = RingBuffer::mount(flash, RECORD as u32, RingOptions::empty()).unwrap();
    ring.push_back(&record(7)).unwrap();

    let mut buf = [0u8; RECORD];
    ring.pop_front(&mut buf).unwrap();
    assert_eq!(buf, record(7));
}
