//! Address validation against a memory map

use core::fmt;

use bitflags::bitflags;

use super::{FlashAddress, MemoryMap, WORD_SIZE};

bitflags! {
    /// Reasons an address was refused
    ///
    /// Every check runs independently, so a single address may carry
    /// several reasons.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Rejection: u8 {
        /// At or past the end of the device
        const OUT_OF_BOUNDS = 1 << 0;
        /// Inside the system-reserved area
        const PROTECTED     = 1 << 1;
        /// Inside the firmware image area
        const RESERVED_LOW  = 1 << 2;
        /// Not a multiple of the 4-byte word size
        const MISALIGNED    = 1 << 3;
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                write!(f, " | ")?;
            }
            let label = match name {
                "OUT_OF_BOUNDS" => "out of bounds",
                "PROTECTED" => "protected region",
                "RESERVED_LOW" => "firmware region",
                "MISALIGNED" => "not word aligned",
                other => other,
            };
            write!(f, "{}", label)?;
            first = false;
        }
        if first {
            write!(f, "valid")?;
        }
        Ok(())
    }
}

impl MemoryMap {
    /// Check `addr` and report every reason it is unusable
    pub fn check(&self, addr: FlashAddress) -> Result<(), Rejection> {
        let mut reasons = Rejection::empty();
        reasons.set(Rejection::OUT_OF_BOUNDS, addr >= self.max_address());
        reasons.set(Rejection::PROTECTED, addr >= self.protected_region_start());
        reasons.set(Rejection::RESERVED_LOW, addr <= self.reserved_low_region_end());
        reasons.set(Rejection::MISALIGNED, !addr.is_multiple_of(WORD_SIZE));

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }

    /// Whether `addr` may be erased, written or read
    pub fn validate(&self, addr: FlashAddress) -> bool {
        self.check(addr).is_ok()
    }
}

/// Whether a working-memory buffer starts on a 4-byte boundary
///
/// This is about the caller's RAM buffer, not the flash address.
pub fn is_word_aligned<T: ?Sized>(ptr: *const T) -> bool {
    (ptr.cast::<u8>() as usize).is_multiple_of(WORD_SIZE as usize)
}
