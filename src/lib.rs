#![cfg_attr(not(test), no_std)]

//! flashring - persistent circular record buffer on wear-levelled flash
//!
//! This library keeps a FIFO queue of fixed-size records in a flash
//! partition and guarantees that the queue survives power loss at any point
//! of any operation. Flash is reached through the [`FlashPartition`] trait,
//! so the same engine runs against a wear-levelling driver on target and
//! against an in-memory mock on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │        RingBuffer<F>                    │
//! │  - push_back / peek_front / pop_front   │
//! │  - dual-header commit protocol          │
//! │  - mount-time recovery                  │
//! └──────────────┬─────────────────────────┘
//!                │
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        FlashPartition trait             │
//! │  (sector_size / size / read /           │
//! │   write / erase_range)                  │
//! └────────────────────────────────────────┘
//! ```
//!
//! # Partition Layout
//!
//! ```text
//! [Header Slot A]  0  .. H   - primary header copy
//! [Header Slot B]  H  .. 2H  - mirror header copy
//! [Data Ring]      2H .. P   - record sectors
//! ```
//!
//! `H` is the header size rounded up to whole sectors, so rewriting one
//! header copy never disturbs the other. Records are placed so that none
//! straddles a sector boundary; a sector is erased exactly when the write
//! position enters it.

// Host-side mock flash and the unit tests need std; everything else is core.
#[cfg(any(test, feature = "mock"))]
extern crate std;

mod logging;
pub mod platform;
pub mod ring;

pub use platform::{FlashError, FlashPartition};
pub use ring::{RingBuffer, RingError, RingHeader, RingOptions, RING_MAGIC};
