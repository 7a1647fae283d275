//! Data ring layout arithmetic
//!
//! Pure offset math for the record ring: how the partition splits into
//! header slots and data sectors, where a given queue state puts its next
//! record, and how the front moves when records are consumed. Everything
//! here is host-testable and touches no flash.
//!
//! Offsets handled by this module are relative to the start of the data
//! ring unless a method says otherwise. Records never straddle a sector
//! boundary: each sector holds `records_per_sector` slots from its base,
//! and any trailing `sector_size % record_size` bytes are padding.

use super::error::RingError;
use super::header::RingHeader;

/// Partition layout derived from sector size, partition size, and record
/// size
///
/// All quantities are fixed at mount time. The layout is:
///
/// ```text
/// [slot A][slot B][data sector 0][data sector 1]...[data sector N-1]
/// ```
///
/// where each header slot occupies the smallest whole number of sectors
/// that fits a serialized [`RingHeader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    sector_size: u32,
    record_size: u32,
    data_sectors: u32,
    slot_bytes: u32,
}

impl Geometry {
    /// Compute the layout for a partition
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidSize`] when `record_size` is zero or
    /// larger than a sector, or when the partition is too small to hold
    /// both header slots and at least one data sector.
    pub fn new(sector_size: u32, partition_size: u32, record_size: u32) -> Result<Self, RingError> {
        if record_size == 0 || record_size > sector_size {
            return Err(RingError::InvalidSize);
        }

        let slot_sectors = (RingHeader::SIZE as u32).div_ceil(sector_size);
        let total_sectors = partition_size / sector_size;
        let data_sectors = total_sectors
            .checked_sub(2 * slot_sectors)
            .filter(|&n| n > 0)
            .ok_or(RingError::InvalidSize)?;

        Ok(Self {
            sector_size,
            record_size,
            data_sectors,
            slot_bytes: slot_sectors * sector_size,
        })
    }

    /// Sector size in bytes
    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    /// Record size in bytes
    pub fn record_size(&self) -> u32 {
        self.record_size
    }

    /// Number of sectors in the data ring
    pub fn data_sectors(&self) -> u32 {
        self.data_sectors
    }

    /// Bytes occupied by one header slot (whole sectors)
    pub fn slot_bytes(&self) -> u32 {
        self.slot_bytes
    }

    /// Absolute offset of header slot 0 or 1
    pub fn slot_offset(&self, slot: u32) -> u32 {
        slot * self.slot_bytes
    }

    /// Translate a data-ring offset to an absolute partition offset
    pub fn data_offset(&self, ring_offset: u32) -> u32 {
        2 * self.slot_bytes + ring_offset
    }

    /// Record slots per sector
    pub fn records_per_sector(&self) -> u32 {
        self.sector_size / self.record_size
    }

    /// Total record capacity of the ring
    pub fn capacity(&self) -> u32 {
        self.data_sectors * self.records_per_sector()
    }

    /// Record slots from `offset` to the end of its sector
    pub fn records_to_sector_end(&self, offset: u32) -> u32 {
        (self.sector_size - offset % self.sector_size) / self.record_size
    }

    /// Start of the data sector after the one containing `offset`, modulo
    /// the ring
    pub fn next_sector_start(&self, offset: u32) -> u32 {
        (offset / self.sector_size + 1) % self.data_sectors * self.sector_size
    }

    /// Offset at which the next record will be written
    ///
    /// Records occupy consecutive slots starting at `front`: first the
    /// slots up to the end of the front sector, then whole sectors, with
    /// the back landing `record_num` slots after `front`. Only meaningful
    /// when the queue is not full.
    pub fn back_offset(&self, front: u32, record_num: u32) -> u32 {
        let front_sector_slots = self.records_to_sector_end(front);
        if front_sector_slots > record_num {
            front + record_num * self.record_size
        } else {
            let remaining = record_num - front_sector_slots;
            let full_sectors = remaining / self.records_per_sector();
            let back_sector = (front / self.sector_size + full_sectors + 1) % self.data_sectors;
            back_sector * self.sector_size + (remaining % self.records_per_sector()) * self.record_size
        }
    }

    /// Whether a queue with this state has no free slot left
    ///
    /// The queue is full when the slot after the last record would land
    /// back in the sector containing `front`.
    pub fn is_full(&self, front: u32, record_num: u32) -> bool {
        let front_sector_slots = self.records_to_sector_end(front);
        if front_sector_slots > record_num {
            return false;
        }
        let remaining = record_num - front_sector_slots;
        let full_sectors = remaining / self.records_per_sector();
        let front_sector = front / self.sector_size;
        (front_sector + full_sectors + 1) % self.data_sectors == front_sector
    }

    /// Position of the front after consuming one record
    ///
    /// Moves to the next slot while the sector has one, otherwise to the
    /// start of the next data sector, so a fully consumed sector is left
    /// behind ready for erase.
    pub fn advance_front(&self, front: u32) -> u32 {
        let slot = (front % self.sector_size) / self.record_size;
        if slot + 1 < self.records_per_sector() {
            front + self.record_size
        } else {
            self.next_sector_start(front)
        }
    }

    /// Whether a header's state fits this layout
    ///
    /// Rejects headers written with a different record size or partition
    /// geometry: `front` must name a record slot inside the ring and
    /// `record_num` must not exceed capacity.
    pub fn state_in_bounds(&self, front: u32, record_num: u32) -> bool {
        let in_sector = front % self.sector_size;
        front < self.data_sectors * self.sector_size
            && in_sector.is_multiple_of(self.record_size)
            && in_sector / self.record_size < self.records_per_sector()
            && record_num <= self.capacity()
    }
}
