//! Memory map types
//!
//! Core address types that work in no_std environments.

use core::fmt;

/// Byte offset into the flash device's linear address space
pub type FlashAddress = u32;

/// Size of the smallest erasable unit in bytes
pub const SECTOR_SIZE: u32 = 4096;

/// Transfer granularity of the raw driver in bytes
pub const WORD_SIZE: u32 = 4;

/// Index of a [`SECTOR_SIZE`]-byte erase unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectorNumber(pub u32);

impl SectorNumber {
    /// The sector containing `addr`
    pub const fn containing(addr: FlashAddress) -> Self {
        Self(addr / SECTOR_SIZE)
    }

    /// First byte address of this sector
    ///
    /// Saturates at `u32::MAX` for sector numbers past the 32-bit address
    /// space, which every memory map rejects.
    pub const fn base_address(self) -> FlashAddress {
        self.0.saturating_mul(SECTOR_SIZE)
    }

    /// The sector `n` places after this one
    pub const fn offset(self, n: u32) -> Self {
        Self(self.0.saturating_add(n))
    }
}

impl fmt::Display for SectorNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} (0x{:X})", self.0, self.0)
    }
}

/// Layout of the flash device as far as this crate is concerned
///
/// ```text
/// 0x000000            reserved_low_region_end     protected_region_start   max_address
/// +-------------------+---------------------------+------------------------+
/// | firmware image    | user data                 | system reserved        |
/// +-------------------+---------------------------+------------------------+
/// ```
///
/// Only the user data window is ever erased, written or read. The boundary
/// address `reserved_low_region_end` itself belongs to the firmware side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryMap {
    max_address: FlashAddress,
    protected_region_start: FlashAddress,
    reserved_low_region_end: FlashAddress,
}

impl MemoryMap {
    /// 4 MiB ESP8266 module (non-OTA layout)
    ///
    /// The firmware image occupies everything up to `0x10000`; the SDK's
    /// init data lives at `0x3FC000` and the blank sectors at `0x3FE000`.
    pub const ESP8266_4MB: MemoryMap = MemoryMap {
        max_address: 0x40_0000,
        protected_region_start: ESP8266_INIT_DATA_ADDRESS,
        reserved_low_region_end: 0x1_0000,
    };

    /// Create a memory map, checking its ordering invariant
    ///
    /// Requires `reserved_low_region_end < protected_region_start <= max_address`
    /// and a sector-aligned `protected_region_start`, since erases always
    /// cover whole sectors.
    pub const fn new(
        max_address: FlashAddress,
        protected_region_start: FlashAddress,
        reserved_low_region_end: FlashAddress,
    ) -> Result<Self, MapError> {
        if reserved_low_region_end >= protected_region_start {
            return Err(MapError::ReservedOverlapsProtected {
                reserved_low_region_end,
                protected_region_start,
            });
        }
        if !protected_region_start.is_multiple_of(SECTOR_SIZE) {
            return Err(MapError::ProtectedNotSectorAligned {
                protected_region_start,
            });
        }
        if protected_region_start > max_address {
            return Err(MapError::ProtectedBeyondEnd {
                protected_region_start,
                max_address,
            });
        }
        Ok(Self {
            max_address,
            protected_region_start,
            reserved_low_region_end,
        })
    }

    /// Size of the device address space
    pub const fn max_address(&self) -> FlashAddress {
        self.max_address
    }

    /// First address of the system-reserved area
    pub const fn protected_region_start(&self) -> FlashAddress {
        self.protected_region_start
    }

    /// Last address of the firmware image area
    pub const fn reserved_low_region_end(&self) -> FlashAddress {
        self.reserved_low_region_end
    }

    /// Check that `[addr, addr + len)` ends at or before the protected area
    pub fn span_fits(&self, addr: FlashAddress, len: usize) -> bool {
        let end = (addr as u64).saturating_add(len as u64);
        end <= self.protected_region_start as u64
    }
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::ESP8266_4MB
    }
}

/// Start of the ESP8266 SDK init data sectors
pub const ESP8266_INIT_DATA_ADDRESS: FlashAddress = 0x3F_C000;

/// Start of the ESP8266 SDK blank sectors
pub const ESP8266_BLANK_ADDRESS: FlashAddress = 0x3F_E000;

/// Errors from constructing a [`MemoryMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// The firmware area reaches into the protected area
    ReservedOverlapsProtected {
        /// Configured end of the firmware area
        reserved_low_region_end: FlashAddress,
        /// Configured start of the protected area
        protected_region_start: FlashAddress,
    },
    /// The protected area starts past the end of the device
    ProtectedBeyondEnd {
        /// Configured start of the protected area
        protected_region_start: FlashAddress,
        /// Configured device size
        max_address: FlashAddress,
    },
    /// The protected area does not start on a sector boundary
    ProtectedNotSectorAligned {
        /// Configured start of the protected area
        protected_region_start: FlashAddress,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedOverlapsProtected {
                reserved_low_region_end,
                protected_region_start,
            } => write!(
                f,
                "reserved region end 0x{:06X} is not below protected region start 0x{:06X}",
                reserved_low_region_end, protected_region_start
            ),
            Self::ProtectedBeyondEnd {
                protected_region_start,
                max_address,
            } => write!(
                f,
                "protected region start 0x{:06X} is beyond max address 0x{:06X}",
                protected_region_start, max_address
            ),
            Self::ProtectedNotSectorAligned {
                protected_region_start,
            } => write!(
                f,
                "protected region start 0x{:06X} is not a multiple of the sector size",
                protected_region_start
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MapError {}
