//! flashguard-core - Guarded transactions over NOR flash
//!
//! NOR flash only knows how to erase whole sectors (all bits to 1) and
//! program bytes that are already erased (bits to 0). This crate builds a
//! safe "overwrite this byte range" operation on top of those primitives:
//!
//! - addresses are checked against a [`MemoryMap`] so firmware and
//!   system-reserved sectors are never touched,
//! - every transfer is padded to the 4-byte granularity the driver demands,
//! - the covering sectors are erased before programming,
//! - a CRC-8 byte is stored after the payload and checked on every read.
//!
//! The raw driver is supplied by the caller through the [`RawFlash`] trait.
//!
//! # Features
//!
//! - `std` - `std::error::Error` impls and TOML memory map loading
//!
//! # Example
//!
//! ```ignore
//! use flashguard_core::{FlashGuard, GuardConfig, MemoryMap, WordAligned};
//!
//! let mut guard = FlashGuard::new(driver, GuardConfig::new(MemoryMap::ESP8266_4MB));
//!
//! let settings = WordAligned([0x01, 0x02, 0x03]);
//! guard.write(0x20000, &settings.0)?;
//!
//! let restored = guard.read_vec(0x20000, 3)?;
//! assert_eq!(restored, [0x01, 0x02, 0x03]);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod checksum;
pub mod driver;
pub mod error;
pub mod flash;
pub mod map;

pub use checksum::{crc8, Crc8};
pub use driver::{DriverError, RawFlash};
pub use error::{EraseFailure, Error, Result};
pub use flash::{FlashGuard, GuardConfig, WordAligned};
pub use map::{is_word_aligned, FlashAddress, MemoryMap, Rejection, SectorNumber, SECTOR_SIZE};
