//! Persistent record ring
//!
//! This module implements a crash-safe FIFO queue of fixed-size records on
//! a flash partition. State changes are committed through a pair of
//! alternating header copies so that power loss at any point leaves the
//! last durable state intact.
//!
//! # Commit Protocol
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │  push_back / delete_front              │
//! │  1. mutate the data ring (if needed)   │
//! │  2. erase slot (sequence+1) mod 2      │
//! │  3. write header with sequence+1       │
//! └──────────────┬─────────────────────────┘
//!                │ crash anywhere above?
//!                ▼
//! ┌────────────────────────────────────────┐
//! │  mount                                 │
//! │  - both copies valid: newer wins       │
//! │  - one copy valid: adopt it; with      │
//! │    RECOVERY, scan the back slot for a  │
//! │    record whose commit was lost        │
//! │  - neither valid: format (or fail      │
//! │    with STRICT)                        │
//! └────────────────────────────────────────┘
//! ```
//!
//! The slot being erased and rewritten is always the one holding the
//! *older* header, so the authoritative copy is never at risk. An
//! operation is durable exactly when its header write completed; a record
//! write whose header was lost is either forgotten (the durability
//! contract) or re-adopted by the mount-time back-scan.

pub mod crc;
pub mod error;
pub mod geometry;
pub mod header;

pub use error::{Result, RingError};
pub use geometry::Geometry;
pub use header::{RingHeader, RING_MAGIC};

use crate::platform::FlashPartition;
use bitflags::bitflags;

bitflags! {
    /// Mount options for a [`RingBuffer`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RingOptions: u8 {
        /// Pushing into a full ring discards the oldest sector instead of
        /// failing with `OutOfSpace`
        const OVERWRITE = 0b0001;
        /// Mounting with one invalid header copy scans the back slot and
        /// re-adopts a record whose header commit was lost
        const RECOVERY = 0b0010;
        /// Mounting fails with `Corrupt` instead of formatting when both
        /// header copies are invalid but the slots are not erased flash
        const STRICT = 0b0100;
    }
}

/// Chunk size for the recovery back-scan read loop
const SCAN_CHUNK: usize = 64;

/// Crash-safe FIFO queue of fixed-size records on a flash partition
///
/// The engine holds no locks and performs no internal synchronisation:
/// exclusive access is expressed through `&mut self`, and callers that
/// need shared access wrap the ring externally. Two rings on different
/// partitions are fully independent.
///
/// # Example
///
/// ```rust,ignore
/// use flashring::{RingBuffer, RingOptions};
/// use flashring::platform::mock::MockFlash;
///
/// let flash = MockFlash::new(4096, 32768);
/// let mut ring = RingBuffer::mount(flash, 16, RingOptions::empty())?;
///
/// ring.push_back(&[0x01; 16])?;
/// let mut record = [0u8; 16];
/// ring.pop_front(&mut record)?;
/// assert_eq!(record, [0x01; 16]);
/// ```
pub struct RingBuffer<F: FlashPartition> {
    /// Flash partition
    flash: F,
    /// Partition layout
    geometry: Geometry,
    /// Mount options
    options: RingOptions,
    /// Ring offset of the oldest record
    front: u32,
    /// Number of records currently stored
    record_num: u32,
    /// Sequence of the last committed header
    sequence: u32,
}

impl<F: FlashPartition> RingBuffer<F> {
    /// Mount a ring on `flash`
    ///
    /// Reads both header copies, adopts the newest valid state, and — for
    /// a blank or unreadable partition — formats a fresh ring. With
    /// [`RingOptions::RECOVERY`], a mount that finds exactly one valid
    /// copy also re-adopts a record whose header commit was lost.
    ///
    /// # Errors
    ///
    /// - [`RingError::InvalidSize`] if `record_size` is zero or exceeds the
    ///   sector size, or the partition is too small
    /// - [`RingError::Corrupt`] with [`RingOptions::STRICT`] when both
    ///   header copies are invalid but not erased flash
    /// - [`RingError::Flash`] on adapter errors
    pub fn mount(mut flash: F, record_size: u32, options: RingOptions) -> Result<Self> {
        let geometry = Geometry::new(flash.sector_size(), flash.size(), record_size)?;

        let mut raw_a = [0u8; RingHeader::SIZE];
        let mut raw_b = [0u8; RingHeader::SIZE];
        flash.read(geometry.slot_offset(0), &mut raw_a)?;
        flash.read(geometry.slot_offset(1), &mut raw_b)?;

        let mut ring = Self {
            flash,
            geometry,
            options,
            front: 0,
            record_num: 0,
            sequence: u32::MAX,
        };

        let (adopted, scan_back) = match (RingHeader::decode(&raw_a), RingHeader::decode(&raw_b)) {
            (Some(a), Some(b)) => (Some(if a.is_newer_than(&b) { a } else { b }), false),
            (Some(h), None) | (None, Some(h)) => {
                (Some(h), options.contains(RingOptions::RECOVERY))
            }
            (None, None) => (None, false),
        };

        match adopted {
            Some(h) if geometry.state_in_bounds(h.front, h.record_num) => {
                ring.front = h.front;
                ring.record_num = h.record_num;
                ring.sequence = h.sequence;
                if scan_back {
                    crate::logging::header_copy_lost();
                    ring.recover_back_slot()?;
                }
                crate::logging::mounted(ring.record_num, ring.front);
            }
            _ => {
                let blank = raw_a.iter().chain(raw_b.iter()).all(|&b| b == 0xFF);
                if !blank && options.contains(RingOptions::STRICT) {
                    return Err(RingError::Corrupt);
                }
                if blank {
                    crate::logging::formatting_blank();
                } else {
                    crate::logging::resetting_invalid();
                }
                ring.write_header()?;
            }
        }

        Ok(ring)
    }

    /// Append a record to the back of the ring
    ///
    /// `src` must be exactly one record long. When the target slot starts
    /// a sector, that sector is erased first. The push is durable once the
    /// header commit succeeds.
    ///
    /// # Errors
    ///
    /// - [`RingError::InvalidSize`] if `src` is not `record_size` bytes
    /// - [`RingError::OutOfSpace`] when full without
    ///   [`RingOptions::OVERWRITE`]; the ring is unchanged
    /// - [`RingError::Flash`] on adapter errors
    pub fn push_back(&mut self, src: &[u8]) -> Result<()> {
        if src.len() != self.geometry.record_size() as usize {
            return Err(RingError::InvalidSize);
        }

        if self.geometry.is_full(self.front, self.record_num) {
            if !self.options.contains(RingOptions::OVERWRITE) {
                return Err(RingError::OutOfSpace);
            }
            // Drop the whole front sector, then rederive the back from the
            // updated state.
            let dropped = self.geometry.records_to_sector_end(self.front);
            self.front = self.geometry.next_sector_start(self.front);
            self.record_num -= dropped;
            crate::logging::dropped_front_sector(dropped);
        }

        let back = self.geometry.back_offset(self.front, self.record_num);
        if back.is_multiple_of(self.geometry.sector_size()) {
            self.flash.erase_range(
                self.geometry.data_offset(back),
                self.geometry.sector_size(),
            )?;
        }
        self.flash.write(self.geometry.data_offset(back), src)?;
        self.record_num += 1;
        self.write_header()
    }

    /// Read the oldest record without consuming it
    ///
    /// # Errors
    ///
    /// - [`RingError::InvalidSize`] if `dest` is not `record_size` bytes
    /// - [`RingError::Empty`] when the ring holds no records
    /// - [`RingError::Flash`] on adapter errors
    pub fn peek_front(&mut self, dest: &mut [u8]) -> Result<()> {
        if dest.len() != self.geometry.record_size() as usize {
            return Err(RingError::InvalidSize);
        }
        if self.record_num == 0 {
            return Err(RingError::Empty);
        }
        self.flash.read(self.geometry.data_offset(self.front), dest)?;
        Ok(())
    }

    /// Consume the oldest record without reading it
    ///
    /// # Errors
    ///
    /// - [`RingError::Empty`] when the ring holds no records
    /// - [`RingError::Flash`] on adapter errors
    pub fn delete_front(&mut self) -> Result<()> {
        if self.record_num == 0 {
            return Err(RingError::Empty);
        }
        self.front = self.geometry.advance_front(self.front);
        self.record_num -= 1;
        self.write_header()
    }

    /// Read and consume the oldest record
    ///
    /// A failed read surfaces without mutating state.
    pub fn pop_front(&mut self, dest: &mut [u8]) -> Result<()> {
        self.peek_front(dest)?;
        self.delete_front()
    }

    /// Number of records currently stored
    pub fn record_num(&self) -> u32 {
        self.record_num
    }

    /// Total record capacity of the ring
    pub fn max_records(&self) -> u32 {
        self.geometry.capacity()
    }

    /// Whether the ring holds no records
    pub fn is_empty(&self) -> bool {
        self.record_num == 0
    }

    /// Partition layout of this ring
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Get the flash partition (for testing)
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Unmount, returning the flash partition
    pub fn into_inner(self) -> F {
        self.flash
    }

    /// Commit the current state to the older header slot
    fn write_header(&mut self) -> Result<()> {
        let sequence = self.sequence.wrapping_add(1);
        let header = RingHeader::new(self.front, self.record_num, sequence);
        let offset = self.geometry.slot_offset(sequence % 2);
        self.flash.erase_range(offset, self.geometry.slot_bytes())?;
        self.flash.write(offset, &header.to_bytes())?;
        // The in-memory sequence moves only after the slot write succeeds,
        // so a failed commit keeps the other slot authoritative and a
        // retry targets the same slot.
        self.sequence = sequence;
        Ok(())
    }

    /// Re-adopt a record whose header commit was lost
    ///
    /// Called when a mount finds exactly one valid header copy. If the
    /// derived back slot sits mid-sector and holds non-erased bytes, a
    /// prior push durably wrote the record but lost its header; count it
    /// and commit. At most one record is recoverable this way.
    fn recover_back_slot(&mut self) -> Result<()> {
        if self.geometry.is_full(self.front, self.record_num) {
            // A full ring has no free slot an interrupted push could have
            // written; the back derivation aliases live records here.
            return Ok(());
        }
        let back = self.geometry.back_offset(self.front, self.record_num);
        if back.is_multiple_of(self.geometry.sector_size()) {
            // A sector-aligned back slot may hold stale bytes from the
            // ring's previous lap; its contents prove nothing.
            return Ok(());
        }
        if self.back_slot_erased(back)? {
            crate::logging::back_slot_clean(back);
            return Ok(());
        }
        crate::logging::orphan_adopted(back);
        self.record_num += 1;
        self.write_header()
    }

    /// Check whether the record slot at `back` is fully erased
    fn back_slot_erased(&mut self, back: u32) -> Result<bool> {
        let mut chunk = [0u8; SCAN_CHUNK];
        let mut offset = self.geometry.data_offset(back);
        let mut remaining = self.geometry.record_size();
        while remaining > 0 {
            let n = remaining.min(SCAN_CHUNK as u32);
            let buf = &mut chunk[..n as usize];
            self.flash.read(offset, buf)?;
            if buf.iter().any(|&b| b != 0xFF) {
                return Ok(false);
            }
            offset += n;
            remaining -= n;
        }
        Ok(true)
    }
}
