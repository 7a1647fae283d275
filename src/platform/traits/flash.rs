//! Flash partition trait
//!
//! This module defines the wear-levelled partition interface the ring engine
//! writes through. Implementations typically wrap a wear-levelling driver
//! over raw NOR flash, which is why the contract below mirrors NOR
//! semantics.

use crate::platform::Result;

/// Wear-levelled flash partition interface
///
/// The partition presents a linear byte-addressable window with sector
/// granularity for erases.
///
/// # Flash Characteristics
///
/// - The partition is organized in sectors (typically 4 KB)
/// - Erase operations set all bytes in the range to 0xFF
/// - Write operations can only change bits from 1→0 (erase first to reset)
/// - Read operations have no granularity restriction
/// - Operations are blocking; an erase can take 100ms+ on real hardware
///
/// # Invariants
///
/// - `sector_size()` is a power of two and `size()` is a multiple of it
/// - Only one owner per partition instance (no concurrent access)
pub trait FlashPartition {
    /// Sector size in bytes (the smallest erasable unit)
    fn sector_size(&self) -> u32;

    /// Total partition size in bytes
    fn size(&self) -> u32;

    /// Read `buf.len()` bytes starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns `FlashError::OutOfBounds` if the range falls outside the
    /// partition, or `FlashError::ReadFailed` if the driver fails.
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `offset`
    ///
    /// The target bytes must have been erased (0xFF) since the last write;
    /// writing can only clear bits. The caller is responsible for erasing.
    ///
    /// # Errors
    ///
    /// Returns `FlashError::OutOfBounds` if the range falls outside the
    /// partition, or `FlashError::WriteFailed` if the driver fails.
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()>;

    /// Erase `len` bytes starting at `offset`, setting them to 0xFF
    ///
    /// Both `offset` and `len` must be multiples of `sector_size()`.
    ///
    /// # Errors
    ///
    /// Returns `FlashError::NotAligned` for unaligned ranges,
    /// `FlashError::OutOfBounds` for ranges outside the partition, or
    /// `FlashError::EraseFailed` if the driver fails.
    fn erase_range(&mut self, offset: u32, len: u32) -> Result<()>;
}
