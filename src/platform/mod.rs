//! Flash adapter layer
//!
//! This module names the outside world the ring depends on: a
//! wear-levelled flash partition with sector-granular erase. Real drivers
//! implement [`FlashPartition`]; the `mock` module provides an in-memory
//! implementation for host testing.

pub mod error;
pub mod mock;
pub mod traits;

// Re-export commonly used types
pub use error::{FlashError, Result};
pub use traits::FlashPartition;
