//! Ring buffer error types

use crate::platform::FlashError;
use core::fmt;

/// Result type for ring buffer operations
pub type Result<T> = core::result::Result<T, RingError>;

/// Errors from ring buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingError {
    /// Record size is zero, exceeds the sector size, the partition cannot
    /// hold the header slots plus at least one data sector, or a caller
    /// buffer does not match the configured record size
    InvalidSize,
    /// The ring holds no records
    Empty,
    /// The ring is full and overwrite is disabled
    OutOfSpace,
    /// Both header copies are unreadable and the mount is strict
    Corrupt,
    /// Flash adapter error
    Flash(FlashError),
}

impl From<FlashError> for RingError {
    fn from(err: FlashError) -> Self {
        RingError::Flash(err)
    }
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::InvalidSize => write!(f, "invalid record or partition size"),
            RingError::Empty => write!(f, "ring buffer is empty"),
            RingError::OutOfSpace => write!(f, "ring buffer is full"),
            RingError::Corrupt => write!(f, "both header copies are corrupt"),
            RingError::Flash(e) => write!(f, "flash error: {}", e),
        }
    }
}
