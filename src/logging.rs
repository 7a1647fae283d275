//! Ring event logging
//!
//! The engine reports its mount, recovery, and overwrite decisions through
//! the functions here. With the `defmt` feature each event reaches the
//! defmt sink with the ring state as typed fields; host test builds print
//! the same events; all other builds compile them out.

// Event fields go unused when no sink is compiled in.
#![allow(unused_variables)]

/// A header was adopted and the ring finished mounting
pub(crate) fn mounted(record_num: u32, front: u32) {
    #[cfg(feature = "defmt")]
    defmt::info!(
        "ring mounted: {=u32} records, front at {=u32}",
        record_num,
        front
    );
    #[cfg(all(not(feature = "defmt"), test))]
    println!("[INFO] ring mounted: {} records, front at {}", record_num, front);
}

/// Exactly one header copy survived; the back slot will be checked
pub(crate) fn header_copy_lost() {
    #[cfg(feature = "defmt")]
    defmt::warn!("one ring header copy is invalid, checking the back slot");
    #[cfg(all(not(feature = "defmt"), test))]
    println!("[WARN] one ring header copy is invalid, checking the back slot");
}

/// Both header slots are erased flash; a fresh ring is being formatted
pub(crate) fn formatting_blank() {
    #[cfg(feature = "defmt")]
    defmt::info!("blank partition, formatting ring");
    #[cfg(all(not(feature = "defmt"), test))]
    println!("[INFO] blank partition, formatting ring");
}

/// Neither header copy is usable; the ring state is being reset
pub(crate) fn resetting_invalid() {
    #[cfg(feature = "defmt")]
    defmt::warn!("no usable ring header, resetting");
    #[cfg(all(not(feature = "defmt"), test))]
    println!("[WARN] no usable ring header, resetting");
}

/// An overwrite push discarded the front sector's records
pub(crate) fn dropped_front_sector(dropped: u32) {
    #[cfg(feature = "defmt")]
    defmt::warn!("ring full, dropped {=u32} oldest records", dropped);
    #[cfg(all(not(feature = "defmt"), test))]
    println!("[WARN] ring full, dropped {} oldest records", dropped);
}

/// Recovery found a record whose header commit was lost
pub(crate) fn orphan_adopted(back: u32) {
    #[cfg(feature = "defmt")]
    defmt::info!("adopting orphaned record at ring offset {=u32}", back);
    #[cfg(all(not(feature = "defmt"), test))]
    println!("[INFO] adopting orphaned record at ring offset {}", back);
}

/// Recovery checked the back slot and found it erased
pub(crate) fn back_slot_clean(back: u32) {
    #[cfg(feature = "defmt")]
    defmt::debug!("back slot at {=u32} erased, nothing to recover", back);
    #[cfg(all(not(feature = "defmt"), test))]
    println!("[DEBUG] back slot at {} erased, nothing to recover", back);
}
