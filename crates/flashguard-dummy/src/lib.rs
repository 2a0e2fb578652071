//! flashguard-dummy - In-memory NOR flash emulator for testing
//!
//! This crate provides a [`RawFlash`] implementation backed by a byte
//! vector. It behaves like the vendor SPI flash routines a real target
//! would supply: sectors erase to 0xFF, programming can only clear bits,
//! and transfers must be word aligned. Faults can be injected to exercise
//! the error paths of [`FlashGuard`](flashguard_core::FlashGuard).

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use flashguard_core::driver::{DriverError, RawFlash};
use flashguard_core::map::{is_word_aligned, FlashAddress, SectorNumber, SECTOR_SIZE, WORD_SIZE};

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Flash size in bytes
    pub size: usize,
    /// Reject transfers whose address, length or buffer is not word aligned
    pub strict_alignment: bool,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            size: 4 * 1024 * 1024,
            strict_alignment: true,
        }
    }
}

/// A raw driver call, as recorded by [`DummyFlash`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyOp {
    /// `erase_sector(sector)`
    Erase(SectorNumber),
    /// `program(addr, data)` with `data.len()`
    Program(FlashAddress, usize),
    /// `read(addr, buf)` with `buf.len()`
    Read(FlashAddress, usize),
}

/// Dummy flash driver
///
/// Emulates a NOR flash chip in memory for testing purposes.
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    ops: Vec<DummyOp>,
    bad_sectors: Vec<SectorNumber>,
    program_fault: Option<DriverError>,
    read_fault: Option<DriverError>,
}

impl DummyFlash {
    /// Create a new dummy flash with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            ops: Vec::new(),
            bad_sectors: Vec::new(),
            program_fault: None,
            read_fault: None,
        }
    }

    /// Create a new dummy flash with default configuration (4 MiB)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Every driver call made so far, oldest first
    pub fn ops(&self) -> &[DummyOp] {
        &self.ops
    }

    /// Make every erase of `sector` fail
    pub fn fail_erase(&mut self, sector: SectorNumber) {
        if !self.bad_sectors.contains(&sector) {
            self.bad_sectors.push(sector);
        }
    }

    /// Make every program call fail with `err`, or succeed again with `None`
    pub fn fail_program(&mut self, err: Option<DriverError>) {
        self.program_fault = err;
    }

    /// Make every read call fail with `err`, or succeed again with `None`
    pub fn fail_read(&mut self, err: Option<DriverError>) {
        self.read_fault = err;
    }

    /// Flip one bit of the stored data, simulating cell corruption
    ///
    /// Returns `false` if `addr` is outside the emulated chip.
    pub fn corrupt_bit(&mut self, addr: FlashAddress, bit: u8) -> bool {
        match self.data.get_mut(addr as usize) {
            Some(byte) => {
                *byte ^= 1 << (bit & 7);
                log::trace!("dummy: flipped bit {} at 0x{:06X}", bit & 7, addr);
                true
            }
            None => false,
        }
    }

    fn check_transfer(
        &self,
        addr: FlashAddress,
        buf: *const u8,
        len: usize,
    ) -> Result<(), DriverError> {
        let aligned = addr.is_multiple_of(WORD_SIZE)
            && len.is_multiple_of(WORD_SIZE as usize)
            && is_word_aligned(buf);
        if self.config.strict_alignment && !aligned {
            log::debug!("dummy: unaligned transfer at 0x{:06X}, {} bytes", addr, len);
            return Err(DriverError::Failed);
        }
        match (addr as usize).checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => {
                log::debug!("dummy: transfer at 0x{:06X}, {} bytes out of range", addr, len);
                Err(DriverError::Failed)
            }
        }
    }
}

impl RawFlash for DummyFlash {
    fn erase_sector(&mut self, sector: SectorNumber) -> Result<(), DriverError> {
        self.ops.push(DummyOp::Erase(sector));
        if self.bad_sectors.contains(&sector) {
            log::debug!("dummy: injected erase failure on sector {}", sector);
            return Err(DriverError::Failed);
        }

        let start = sector.base_address() as usize;
        let end = start + SECTOR_SIZE as usize;
        if end > self.data.len() {
            return Err(DriverError::Failed);
        }

        // Erase sets all bytes to 0xFF
        self.data[start..end].fill(0xFF);
        log::trace!("dummy: erased sector {}", sector);
        Ok(())
    }

    fn program(&mut self, addr: FlashAddress, data: &[u8]) -> Result<(), DriverError> {
        self.ops.push(DummyOp::Program(addr, data.len()));
        self.check_transfer(addr, data.as_ptr(), data.len())?;
        if let Some(err) = self.program_fault {
            return Err(err);
        }

        // Flash programming: can only change 1 -> 0
        let start = addr as usize;
        for (cell, &byte) in self.data[start..start + data.len()].iter_mut().zip(data) {
            *cell &= byte;
        }
        log::trace!("dummy: programmed {} bytes at 0x{:06X}", data.len(), addr);
        Ok(())
    }

    fn read(&mut self, addr: FlashAddress, buf: &mut [u8]) -> Result<(), DriverError> {
        self.ops.push(DummyOp::Read(addr, buf.len()));
        self.check_transfer(addr, buf.as_ptr(), buf.len())?;
        if let Some(err) = self.read_fault {
            return Err(err);
        }

        let start = addr as usize;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
        Ok(())
    }
}
