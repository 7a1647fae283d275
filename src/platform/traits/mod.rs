//! Flash abstraction traits
//!
//! This module defines the trait that flash partition providers must
//! implement.

pub mod flash;

pub use flash::FlashPartition;
