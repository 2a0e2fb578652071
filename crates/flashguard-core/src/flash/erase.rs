//! Sector erase

use crate::driver::RawFlash;
use crate::error::{EraseFailure, Error, Result};
use crate::map::SectorNumber;

use super::FlashGuard;

impl<D: RawFlash> FlashGuard<D> {
    /// Erase a single sector
    ///
    /// The sector's base address must pass the memory map; otherwise the
    /// driver is never called and `InvalidAddress` is returned.
    pub fn erase_sector(&mut self, sector: SectorNumber) -> Result<()> {
        let addr = sector.base_address();
        if let Err(reason) = self.config.map.check(addr) {
            if self.config.debug {
                log::debug!("sector {} invalid, not erased ({})", sector, reason);
            }
            return Err(Error::InvalidAddress { addr, reason });
        }

        match self.driver.erase_sector(sector) {
            Ok(()) => {
                if self.config.debug {
                    log::debug!("sector {} erased", sector);
                }
                Ok(())
            }
            Err(cause) => {
                if self.config.debug {
                    log::debug!("sector {} erase failed: {}", sector, cause);
                }
                Err(Error::EraseFailed(EraseFailure {
                    first_failed: sector,
                    failed: 1,
                    attempted: 1,
                }))
            }
        }
    }

    /// Erase `count` consecutive sectors starting at `start`
    ///
    /// A failing sector does not stop the run: every sector is attempted,
    /// and the result is `EraseFailed` if any of them failed.
    pub fn erase_range(&mut self, start: SectorNumber, count: u32) -> Result<()> {
        let failure = (0..count)
            .map(|i| start.offset(i))
            .fold(None, |acc: Option<EraseFailure>, sector| {
                match (self.erase_sector(sector), acc) {
                    (Ok(()), acc) => acc,
                    (Err(_), None) => Some(EraseFailure {
                        first_failed: sector,
                        failed: 1,
                        attempted: count,
                    }),
                    (Err(_), Some(prev)) => Some(EraseFailure {
                        failed: prev.failed + 1,
                        ..prev
                    }),
                }
            });

        if self.config.debug {
            log::debug!(
                "sector chain erase of length {} starting at sector {} done",
                count,
                start
            );
        }

        match failure {
            None => Ok(()),
            Some(failure) => {
                if self.config.debug {
                    log::debug!("{}", failure);
                }
                Err(Error::EraseFailed(failure))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::mock::MockFlash;
    use crate::flash::GuardConfig;
    use crate::map::{MemoryMap, Rejection};

    const FLASH_SIZE: usize = 0x40_0000;

    fn guard() -> FlashGuard<MockFlash> {
        FlashGuard::new(
            MockFlash::new(FLASH_SIZE),
            GuardConfig::new(MemoryMap::ESP8266_4MB).with_debug(true),
        )
    }

    #[test]
    fn test_erase_sector_resets_to_ff() {
        let mut guard = guard();
        guard.driver_mut().memory[0x2_0000..0x2_1000].fill(0x00);

        guard.erase_sector(SectorNumber(0x20)).unwrap();

        assert!(guard.driver().memory[0x2_0000..0x2_1000]
            .iter()
            .all(|&b| b == 0xFF));
        assert_eq!(guard.driver().erases(), [SectorNumber(0x20)]);
    }

    #[test]
    fn test_erase_firmware_sector_never_reaches_driver() {
        let mut guard = guard();
        assert_eq!(
            guard.erase_sector(SectorNumber(0x10)),
            Err(Error::InvalidAddress {
                addr: 0x1_0000,
                reason: Rejection::RESERVED_LOW,
            })
        );
        assert_eq!(
            guard.erase_sector(SectorNumber(0x3FC)),
            Err(Error::InvalidAddress {
                addr: 0x3F_C000,
                reason: Rejection::PROTECTED,
            })
        );
        assert!(guard.driver().ops.is_empty());
    }

    #[test]
    fn test_erase_sector_driver_failure() {
        let mut guard = guard();
        guard.driver_mut().failing_sectors.push(SectorNumber(0x20));
        assert_eq!(
            guard.erase_sector(SectorNumber(0x20)),
            Err(Error::EraseFailed(EraseFailure {
                first_failed: SectorNumber(0x20),
                failed: 1,
                attempted: 1,
            }))
        );
    }

    #[test]
    fn test_erase_range_all_ok() {
        let mut guard = guard();
        guard.erase_range(SectorNumber(0x20), 3).unwrap();
        assert_eq!(
            guard.driver().erases(),
            [SectorNumber(0x20), SectorNumber(0x21), SectorNumber(0x22)]
        );
    }

    #[test]
    fn test_erase_range_continues_past_failure() {
        let mut guard = guard();
        guard.driver_mut().failing_sectors.push(SectorNumber(0x21));
        guard.driver_mut().memory[0x2_2000] = 0x00;

        assert_eq!(
            guard.erase_range(SectorNumber(0x20), 4),
            Err(Error::EraseFailed(EraseFailure {
                first_failed: SectorNumber(0x21),
                failed: 1,
                attempted: 4,
            }))
        );
        // Every sector was attempted, including those after the failure
        assert_eq!(
            guard.driver().erases(),
            [
                SectorNumber(0x20),
                SectorNumber(0x21),
                SectorNumber(0x22),
                SectorNumber(0x23)
            ]
        );
        assert_eq!(guard.driver().memory[0x2_2000], 0xFF);
    }

    #[test]
    fn test_erase_range_counts_invalid_sectors() {
        let mut guard = guard();
        // 0x3FB is the last user sector; 0x3FC and 0x3FD are protected
        let err = guard.erase_range(SectorNumber(0x3FB), 3).unwrap_err();
        assert_eq!(
            err,
            Error::EraseFailed(EraseFailure {
                first_failed: SectorNumber(0x3FC),
                failed: 2,
                attempted: 3,
            })
        );
        assert_eq!(guard.driver().erases(), [SectorNumber(0x3FB)]);
    }

    #[test]
    fn test_erase_range_zero_count() {
        let mut guard = guard();
        guard.erase_range(SectorNumber(0x20), 0).unwrap();
        assert!(guard.driver().ops.is_empty());
    }

    #[test]
    fn test_erase_range_multiple_failures() {
        let mut guard = guard();
        guard.driver_mut().failing_sectors.push(SectorNumber(0x20));
        guard.driver_mut().failing_sectors.push(SectorNumber(0x22));
        let err = guard.erase_range(SectorNumber(0x20), 3).unwrap_err();
        assert!(matches!(
            err,
            Error::EraseFailed(EraseFailure {
                first_failed: SectorNumber(0x20),
                failed: 2,
                attempted: 3,
            })
        ));
    }
}
