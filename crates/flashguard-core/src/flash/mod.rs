//! Guarded flash operations
//!
//! [`FlashGuard`] wraps a [`RawFlash`] driver and only lets through
//! operations that stay inside the user data window of its memory map:
//!
//! - [`erase_sector`](FlashGuard::erase_sector) /
//!   [`erase_range`](FlashGuard::erase_range) erase whole sectors
//! - [`write`](FlashGuard::write) erases and programs a checksummed record
//! - [`read`](FlashGuard::read) / [`read_vec`](FlashGuard::read_vec) fetch a
//!   record and verify its checksum
//!
//! Operations block until the driver returns. The guard holds the driver
//! mutably, so two operations can never interleave on the same instance.

mod config;
mod erase;
mod frame;
#[cfg(test)]
mod mock;
mod transaction;

pub use config::GuardConfig;
pub use frame::WordAligned;

use crate::driver::RawFlash;
use crate::error::{Error, Result};
use crate::map::{FlashAddress, MemoryMap};

/// Guarded access layer over a raw flash driver
///
/// The driver can be owned (`FlashGuard<MyDriver>`) or borrowed
/// (`FlashGuard<&mut MyDriver>`).
#[derive(Debug)]
pub struct FlashGuard<D> {
    driver: D,
    config: GuardConfig,
}

impl<D: RawFlash> FlashGuard<D> {
    /// Wrap `driver` using `config`
    pub fn new(driver: D, config: GuardConfig) -> Self {
        Self { driver, config }
    }

    /// Current configuration
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Memory map operations are checked against
    pub fn map(&self) -> &MemoryMap {
        &self.config.map
    }

    /// Turn diagnostic logging on or off
    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    /// Whether `addr` may be erased, written or read
    pub fn validate(&self, addr: FlashAddress) -> bool {
        self.config.map.validate(addr)
    }

    /// Borrow the underlying driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutably borrow the underlying driver, bypassing every check
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Give the driver back
    pub fn into_inner(self) -> D {
        self.driver
    }

    /// Check a transaction start address against the memory map
    fn check_address(&self, addr: FlashAddress, op: &str) -> Result<()> {
        self.config.map.check(addr).map_err(|reason| {
            if self.config.debug {
                log::debug!("{}: flash address 0x{:06X} invalid ({})", op, addr, reason);
            }
            Error::InvalidAddress { addr, reason }
        })
    }
}
