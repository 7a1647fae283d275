//! Mock flash implementation for testing
//!
//! Provides in-memory flash simulation for unit tests.

use crate::platform::{error::FlashError, traits::FlashPartition, Result};
use heapless::{FnvIndexMap, String};
use std::vec;
use std::vec::Vec;

/// Maximum partition label length (ESP-IDF style labels)
pub const PARTITION_LABEL_LEN: usize = 16;

/// Maximum number of partitions in a [`MockPartitionTable`]
const MAX_PARTITIONS: usize = 8;

/// Mock flash partition
///
/// Simulates a wear-levelled flash partition in memory for testing.
/// Supports:
/// - Read/write/erase operations with NOR semantics (writes clear bits,
///   erases set 0xFF)
/// - Erase count tracking per sector
/// - Power-loss simulation (next write is torn in half)
/// - Write failure injection for crash-protocol testing
///
/// # Example
///
/// ```rust,ignore
/// use flashring::platform::mock::MockFlash;
/// use flashring::platform::traits::FlashPartition;
///
/// let mut flash = MockFlash::new(4096, 32768);
///
/// flash.erase_range(0, 4096).unwrap();
/// flash.write(0, &[0xB1, 0x15, 0x5B, 0x00]).unwrap();
///
/// let mut buf = [0u8; 4];
/// flash.read(0, &mut buf).unwrap();
/// assert_eq!(buf, [0xB1, 0x15, 0x5B, 0x00]);
/// assert_eq!(flash.get_erase_count(0), 1);
/// ```
#[derive(Debug)]
pub struct MockFlash {
    /// Sector size in bytes
    sector_size: u32,
    /// Flash storage (initialized to 0xFF - erased state)
    storage: Vec<u8>,
    /// Erase count per sector (for wear observation)
    erase_counts: Vec<u32>,
    /// Simulated power loss flag
    power_loss: bool,
    /// Writes remaining before injected failures begin (None = unlimited)
    write_budget: Option<u32>,
}

impl MockFlash {
    /// Create a new mock flash partition
    ///
    /// # Panics
    ///
    /// Panics if `sector_size` is not a power of two or `size` is zero or
    /// not a multiple of `sector_size`.
    pub fn new(sector_size: u32, size: u32) -> Self {
        assert!(sector_size.is_power_of_two(), "sector size must be a power of two");
        assert!(size > 0 && size.is_multiple_of(sector_size), "size must be a multiple of sector size");

        Self {
            sector_size,
            storage: vec![0xFF; size as usize],
            erase_counts: vec![0; (size / sector_size) as usize],
            power_loss: false,
            write_budget: None,
        }
    }

    /// Get flash contents (for test verification)
    pub fn get_contents(&self, offset: u32, len: usize) -> Vec<u8> {
        self.storage[offset as usize..(offset as usize + len)].to_vec()
    }

    /// Inject corruption at offset (for testing error recovery)
    pub fn inject_corruption(&mut self, offset: u32, len: usize) {
        for byte in &mut self.storage[offset as usize..(offset as usize + len)] {
            *byte = 0xAA; // Corrupt pattern
        }
    }

    /// Get erase count for the sector containing `offset`
    pub fn get_erase_count(&self, offset: u32) -> u32 {
        self.erase_counts[(offset / self.sector_size) as usize]
    }

    /// Get total erase count across all sectors
    pub fn get_total_erase_count(&self) -> u32 {
        self.erase_counts.iter().sum()
    }

    /// Simulate power loss during the next write operation
    ///
    /// The next write will only partially complete, simulating power loss
    /// mid-operation.
    pub fn simulate_power_loss(&mut self) {
        self.power_loss = true;
    }

    /// Make the `n`-th and all later write calls fail
    ///
    /// `fail_after_writes(0)` fails every write from now on;
    /// `fail_after_writes(1)` lets one write through, then fails.
    /// Reads and erases are unaffected.
    pub fn fail_after_writes(&mut self, n: u32) {
        self.write_budget = Some(n);
    }

    /// Clear any pending write failure injection
    pub fn clear_write_failures(&mut self) {
        self.write_budget = None;
    }

    fn check_bounds(&self, offset: u32, len: usize) -> Result<()> {
        if offset as usize + len > self.storage.len() {
            return Err(FlashError::OutOfBounds);
        }
        Ok(())
    }
}

impl FlashPartition for MockFlash {
    fn sector_size(&self) -> u32 {
        self.sector_size
    }

    fn size(&self) -> u32 {
        self.storage.len() as u32
    }

    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        self.check_bounds(offset, buf.len())?;
        buf.copy_from_slice(&self.storage[offset as usize..offset as usize + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        self.check_bounds(offset, data.len())?;

        match self.write_budget {
            Some(0) => return Err(FlashError::WriteFailed),
            Some(ref mut n) => *n -= 1,
            None => {}
        }

        // Simulate power loss (partial write)
        let write_len = if self.power_loss {
            self.power_loss = false;
            data.len() / 2
        } else {
            data.len()
        };

        // Flash can only change bits from 1→0
        for i in 0..write_len {
            self.storage[offset as usize + i] &= data[i];
        }

        Ok(())
    }

    fn erase_range(&mut self, offset: u32, len: u32) -> Result<()> {
        if !offset.is_multiple_of(self.sector_size) || !len.is_multiple_of(self.sector_size) {
            return Err(FlashError::NotAligned);
        }
        self.check_bounds(offset, len as usize)?;

        for byte in &mut self.storage[offset as usize..(offset + len) as usize] {
            *byte = 0xFF;
        }

        let start_sector = (offset / self.sector_size) as usize;
        for sector in 0..(len / self.sector_size) as usize {
            self.erase_counts[start_sector + sector] += 1;
        }

        Ok(())
    }
}

/// Label-keyed table of mock partitions
///
/// Models the partition lookup step that on target belongs to the
/// partition-table driver: a ring is opened by label, and a missing label
/// reports [`FlashError::NotFound`].
pub struct MockPartitionTable {
    partitions: FnvIndexMap<String<PARTITION_LABEL_LEN>, MockFlash, MAX_PARTITIONS>,
}

impl MockPartitionTable {
    /// Create an empty partition table
    pub fn new() -> Self {
        Self {
            partitions: FnvIndexMap::new(),
        }
    }

    /// Register a partition under `label`
    ///
    /// # Panics
    ///
    /// Panics if the label exceeds [`PARTITION_LABEL_LEN`] or the table is
    /// full.
    pub fn insert(&mut self, label: &str, flash: MockFlash) {
        let key = String::try_from(label).expect("partition label too long");
        assert!(
            self.partitions.insert(key, flash).is_ok(),
            "partition table full"
        );
    }

    /// Take the partition registered under `label`
    ///
    /// # Errors
    ///
    /// Returns [`FlashError::NotFound`] if no partition has that label.
    pub fn open(&mut self, label: &str) -> Result<MockFlash> {
        let key = String::try_from(label).map_err(|_| FlashError::NotFound)?;
        self.partitions.remove(&key).ok_or(FlashError::NotFound)
    }

    /// Check whether a partition is registered under `label`
    pub fn contains(&self, label: &str) -> bool {
        String::try_from(label)
            .map(|key| self.partitions.contains_key(&key))
            .unwrap_or(false)
    }
}

impl Default for MockPartitionTable {
    fn default() -> Self {
        Self::new()
    }
}
