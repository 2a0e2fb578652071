//! Error types for flashguard-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

use crate::driver::DriverError;
use crate::map::{FlashAddress, Rejection, SectorNumber};

/// Summary of a multi-sector erase that did not fully succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseFailure {
    /// First sector that could not be erased
    pub first_failed: SectorNumber,
    /// Number of sectors that could not be erased
    pub failed: u32,
    /// Number of sectors the erase attempted
    pub attempted: u32,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Validation errors, raised before any hardware access
    /// Flash address refused by the memory map
    InvalidAddress {
        /// The refused address
        addr: FlashAddress,
        /// Every check the address failed
        reason: Rejection,
    },
    /// Caller's source buffer is not 4-byte aligned
    UnalignedSource,
    /// Caller's destination buffer is not 4-byte aligned
    UnalignedDestination,
    /// The framed record would reach past the user data window
    InvalidRange {
        /// Start of the record
        addr: FlashAddress,
        /// Length of the record including checksum and padding
        len: usize,
    },
    /// The framed buffer could not be allocated
    OutOfMemory {
        /// Requested buffer size in bytes
        len: usize,
    },

    // Operation errors
    /// One or more sectors could not be erased
    EraseFailed(EraseFailure),
    /// The raw program call failed after a successful erase
    WriteFailed {
        /// Start address of the failed program call
        addr: FlashAddress,
        /// Driver result
        cause: DriverError,
    },
    /// The raw read call failed
    ReadFailed {
        /// Start address of the failed read
        addr: FlashAddress,
        /// Driver result
        cause: DriverError,
    },
    /// Read back data does not match its stored checksum
    IntegrityMismatch {
        /// Checksum recomputed over the payload
        computed: u8,
        /// Checksum byte found after the payload
        stored: u8,
    },
    /// Post-write read back differs from what was programmed
    VerifyFailed {
        /// Address of the first differing byte
        addr: FlashAddress,
    },
}

impl fmt::Display for EraseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} sectors failed to erase, first failure at sector {}",
            self.failed, self.attempted, self.first_failed
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress { addr, reason } => {
                write!(f, "invalid flash address 0x{:08X}: {}", addr, reason)
            }
            Self::UnalignedSource => write!(f, "source buffer is not word aligned"),
            Self::UnalignedDestination => write!(f, "destination buffer is not word aligned"),
            Self::InvalidRange { addr, len } => write!(
                f,
                "{} bytes at 0x{:08X} extend past the writable region",
                len, addr
            ),
            Self::OutOfMemory { len } => {
                write!(f, "failed to allocate {} byte transfer buffer", len)
            }
            Self::EraseFailed(failure) => write!(f, "erase failed: {}", failure),
            Self::WriteFailed { addr, cause } => {
                write!(f, "write at 0x{:08X} failed: {}", addr, cause)
            }
            Self::ReadFailed { addr, cause } => {
                write!(f, "read at 0x{:08X} failed: {}", addr, cause)
            }
            Self::IntegrityMismatch { computed, stored } => write!(
                f,
                "checksum mismatch: computed 0x{:02X}, stored 0x{:02X}",
                computed, stored
            ),
            Self::VerifyFailed { addr } => {
                write!(f, "verify failed: data mismatch at 0x{:08X}", addr)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display_invalid_address() {
        let err = Error::InvalidAddress {
            addr: 0x3F_C100,
            reason: Rejection::PROTECTED,
        };
        assert_eq!(
            err.to_string(),
            "invalid flash address 0x003FC100: protected region"
        );
    }

    #[test]
    fn test_display_erase_failure() {
        let err = Error::EraseFailed(EraseFailure {
            first_failed: SectorNumber(0x21),
            failed: 1,
            attempted: 3,
        });
        assert_eq!(
            err.to_string(),
            "erase failed: 1 of 3 sectors failed to erase, first failure at sector #33 (0x21)"
        );
    }

    #[test]
    fn test_display_integrity_mismatch() {
        let err = Error::IntegrityMismatch {
            computed: 0x5E,
            stored: 0xBC,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: computed 0x5E, stored 0xBC"
        );
    }
}
