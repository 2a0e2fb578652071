//! Recording mock driver shared by the flash module tests

use alloc::vec;
use alloc::vec::Vec;

use crate::driver::{DriverError, RawFlash};
use crate::map::{is_word_aligned, FlashAddress, SectorNumber, SECTOR_SIZE, WORD_SIZE};

/// A driver call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    Erase(SectorNumber),
    Program(FlashAddress, Vec<u8>),
    Read(FlashAddress, usize),
}

/// A mock raw driver that simulates NOR flash for testing
///
/// - Memory starts as all 0xFF (erased state)
/// - Erase resets a whole sector to 0xFF
/// - Program only clears bits (1->0), like real flash
/// - Every call is recorded in `ops`, and the driver contract (word
///   aligned address, length and buffer) is asserted on each transfer
pub(crate) struct MockFlash {
    pub memory: Vec<u8>,
    pub ops: Vec<Op>,
    pub failing_sectors: Vec<SectorNumber>,
    pub program_error: Option<DriverError>,
    pub read_error: Option<DriverError>,
}

impl MockFlash {
    pub fn new(size: usize) -> Self {
        Self {
            memory: vec![0xFF; size],
            ops: Vec::new(),
            failing_sectors: Vec::new(),
            program_error: None,
            read_error: None,
        }
    }

    pub fn erases(&self) -> Vec<SectorNumber> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Erase(sector) => Some(*sector),
                _ => None,
            })
            .collect()
    }

    pub fn programs(&self) -> Vec<(FlashAddress, Vec<u8>)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Program(addr, data) => Some((*addr, data.clone())),
                _ => None,
            })
            .collect()
    }

    fn assert_transfer(addr: FlashAddress, buf: *const u8, len: usize) {
        assert!(addr.is_multiple_of(WORD_SIZE), "unaligned address 0x{:X}", addr);
        assert!(len.is_multiple_of(WORD_SIZE as usize), "unaligned length {}", len);
        assert!(is_word_aligned(buf), "unaligned buffer");
    }
}

impl RawFlash for MockFlash {
    fn erase_sector(&mut self, sector: SectorNumber) -> Result<(), DriverError> {
        self.ops.push(Op::Erase(sector));
        if self.failing_sectors.contains(&sector) {
            return Err(DriverError::Failed);
        }
        let start = sector.base_address() as usize;
        let end = start + SECTOR_SIZE as usize;
        if end > self.memory.len() {
            return Err(DriverError::Failed);
        }
        self.memory[start..end].fill(0xFF);
        Ok(())
    }

    fn program(&mut self, addr: FlashAddress, data: &[u8]) -> Result<(), DriverError> {
        Self::assert_transfer(addr, data.as_ptr(), data.len());
        self.ops.push(Op::Program(addr, data.to_vec()));
        if let Some(err) = self.program_error {
            return Err(err);
        }
        let start = addr as usize;
        for (cell, byte) in self.memory[start..start + data.len()].iter_mut().zip(data) {
            *cell &= byte;
        }
        Ok(())
    }

    fn read(&mut self, addr: FlashAddress, buf: &mut [u8]) -> Result<(), DriverError> {
        Self::assert_transfer(addr, buf.as_ptr(), buf.len());
        self.ops.push(Op::Read(addr, buf.len()));
        if let Some(err) = self.read_error {
            return Err(err);
        }
        let start = addr as usize;
        buf.copy_from_slice(&self.memory[start..start + buf.len()]);
        Ok(())
    }
}
