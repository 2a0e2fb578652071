//! Raw flash driver trait
//!
//! The vendor SDK owns the actual sector erase, program and read routines.
//! [`RawFlash`] is the seam through which a [`FlashGuard`](crate::FlashGuard)
//! reaches them. Implementations do no validation of their own beyond what
//! the hardware requires; the guard has already checked addresses, lengths
//! and buffer alignment before calling in.

use core::fmt;

use crate::map::{FlashAddress, SectorNumber};

/// Failure reported by a raw driver primitive
///
/// Mirrors the result codes of typical vendor SPI flash APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The operation was rejected or failed on the bus
    Failed,
    /// The device did not become ready in time
    Timeout,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => write!(f, "driver operation failed"),
            Self::Timeout => write!(f, "driver operation timed out"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DriverError {}

/// Blocking access to the raw flash primitives
///
/// Every call blocks until the hardware has finished.
pub trait RawFlash {
    /// Erase exactly one sector, setting all its bits to 1
    fn erase_sector(&mut self, sector: SectorNumber) -> Result<(), DriverError>;

    /// Program `data` at `addr`
    ///
    /// Only clears bits; the target cells must have been erased. `addr` and
    /// `data.len()` are multiples of 4 and `data` is word aligned.
    fn program(&mut self, addr: FlashAddress, data: &[u8]) -> Result<(), DriverError>;

    /// Read `buf.len()` bytes starting at `addr`
    ///
    /// `addr` and `buf.len()` are multiples of 4 and `buf` is word aligned.
    fn read(&mut self, addr: FlashAddress, buf: &mut [u8]) -> Result<(), DriverError>;
}

impl<T: RawFlash + ?Sized> RawFlash for &mut T {
    fn erase_sector(&mut self, sector: SectorNumber) -> Result<(), DriverError> {
        (**self).erase_sector(sector)
    }

    fn program(&mut self, addr: FlashAddress, data: &[u8]) -> Result<(), DriverError> {
        (**self).program(addr, data)
    }

    fn read(&mut self, addr: FlashAddress, buf: &mut [u8]) -> Result<(), DriverError> {
        (**self).read(addr, buf)
    }
}
