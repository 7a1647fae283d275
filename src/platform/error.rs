//! Flash adapter error types

use core::fmt;

/// Result type for flash adapter operations
pub type Result<T> = core::result::Result<T, FlashError>;

/// Errors reported by a flash partition
///
/// All adapter implementations map their driver-specific errors to these
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The named partition does not exist
    NotFound,
    /// Offset or length falls outside the partition
    OutOfBounds,
    /// Erase offset or length is not sector-aligned
    NotAligned,
    /// Read operation failed
    ReadFailed,
    /// Write operation failed
    WriteFailed,
    /// Erase operation failed
    EraseFailed,
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashError::NotFound => write!(f, "partition not found"),
            FlashError::OutOfBounds => write!(f, "access outside partition bounds"),
            FlashError::NotAligned => write!(f, "erase range not sector-aligned"),
            FlashError::ReadFailed => write!(f, "flash read failed"),
            FlashError::WriteFailed => write!(f, "flash write failed"),
            FlashError::EraseFailed => write!(f, "flash erase failed"),
        }
    }
}
