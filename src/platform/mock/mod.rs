//! Mock flash implementation for testing
//!
//! This module provides an in-memory flash partition that can be used for
//! unit testing without requiring actual hardware, plus a small partition
//! table for lookup-by-label tests.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled (requires std)

#![cfg(any(test, feature = "mock"))]

mod flash;

pub use flash::{MockFlash, MockPartitionTable, PARTITION_LABEL_LEN};
