//! Checksummed write and read transactions

use alloc::vec::Vec;

use crate::driver::RawFlash;
use crate::error::{Error, Result};
use crate::map::{is_word_aligned, FlashAddress, SectorNumber};

use super::frame::{framed_len, FramedBuffer};
use super::FlashGuard;

impl<D: RawFlash> FlashGuard<D> {
    /// Overwrite the flash at `addr` with `source` plus a checksum byte
    ///
    /// Every sector the framed record touches is erased first, so anything
    /// else stored in those sectors is lost. On `EraseFailed` or
    /// `WriteFailed` the sectors' contents are undefined, not unchanged.
    ///
    /// # Errors
    /// * `InvalidAddress` - `addr` refused by the memory map
    /// * `UnalignedSource` - non-empty `source` does not start on a 4-byte boundary
    /// * `InvalidRange` - the record would leave the user data window
    /// * `OutOfMemory` - the framed buffer could not be allocated
    /// * `EraseFailed` - a covering sector could not be erased
    /// * `WriteFailed` - the driver failed to program the record
    /// * `VerifyFailed` - read back differs (only with `verify_writes`)
    pub fn write(&mut self, addr: FlashAddress, source: &[u8]) -> Result<()> {
        self.check_address(addr, "write")?;

        if !source.is_empty() && !is_word_aligned(source.as_ptr()) {
            if self.config.debug {
                log::debug!("write: source buffer {:p} not word aligned", source.as_ptr());
            }
            return Err(Error::UnalignedSource);
        }

        let len = self.check_span(addr, source.len())?;
        let first = SectorNumber::containing(addr);
        let last = SectorNumber::containing(addr + (len as u32 - 1));

        // Erasing a sector that starts inside the firmware area would be
        // refused, leaving a partially erased record behind
        if !self.config.map.validate(first.base_address()) {
            if self.config.debug {
                log::debug!("write: sector {} holding 0x{:06X} is not erasable", first, addr);
            }
            return Err(Error::InvalidRange { addr, len });
        }

        let frame = FramedBuffer::for_payload(source)?;

        self.erase_range(first, last.0 - first.0 + 1)?;

        if let Err(cause) = self.driver.program(addr, frame.as_bytes()) {
            if self.config.debug {
                log::debug!("write: program of {} bytes at 0x{:06X} failed: {}", len, addr, cause);
            }
            return Err(Error::WriteFailed { addr, cause });
        }

        if self.config.verify_writes {
            self.verify_frame(addr, &frame)?;
        }

        if self.config.debug {
            log::debug!(
                "flash write of {} bytes into address 0x{:06X} done (crc 0x{:02X})",
                source.len(),
                addr,
                frame.stored_checksum()
            );
        }
        Ok(())
    }

    /// Read a record written by [`write`](Self::write) into `destination`
    ///
    /// The record length is `destination.len()`. `destination` is only
    /// filled once the stored checksum matches.
    ///
    /// # Errors
    /// * `InvalidAddress` - `addr` refused by the memory map
    /// * `UnalignedDestination` - non-empty `destination` is not 4-byte aligned
    /// * `InvalidRange` - the record would leave the user data window
    /// * `OutOfMemory` - the framed buffer could not be allocated
    /// * `ReadFailed` - the driver failed to read
    /// * `IntegrityMismatch` - the stored checksum does not match the data
    pub fn read(&mut self, addr: FlashAddress, destination: &mut [u8]) -> Result<()> {
        self.check_address(addr, "read")?;

        if !destination.is_empty() && !is_word_aligned(destination.as_ptr()) {
            if self.config.debug {
                log::debug!(
                    "read: destination buffer {:p} not word aligned",
                    destination.as_ptr()
                );
            }
            return Err(Error::UnalignedDestination);
        }

        let frame = self.read_frame(addr, destination.len())?;
        destination.copy_from_slice(frame.payload());
        Ok(())
    }

    /// Read a `len`-byte record into a newly allocated vector
    ///
    /// Same checks as [`read`](Self::read), minus the destination alignment
    /// check.
    pub fn read_vec(&mut self, addr: FlashAddress, len: usize) -> Result<Vec<u8>> {
        self.check_address(addr, "read")?;

        let frame = self.read_frame(addr, len)?;

        let mut out = Vec::new();
        out.try_reserve_exact(len)
            .map_err(|_| Error::OutOfMemory { len })?;
        out.extend_from_slice(frame.payload());
        Ok(out)
    }

    /// Framed length of a `payload_len`-byte record at `addr`, if it stays
    /// below the protected region
    fn check_span(&self, addr: FlashAddress, payload_len: usize) -> Result<usize> {
        let len = framed_len(payload_len).ok_or(Error::InvalidRange {
            addr,
            len: usize::MAX,
        })?;
        if !self.config.map.span_fits(addr, len) {
            if self.config.debug {
                log::debug!("{} byte record at 0x{:06X} leaves the user data window", len, addr);
            }
            return Err(Error::InvalidRange { addr, len });
        }
        Ok(len)
    }

    fn read_frame(&mut self, addr: FlashAddress, payload_len: usize) -> Result<FramedBuffer> {
        let len = self.check_span(addr, payload_len)?;
        let mut frame = FramedBuffer::for_read(payload_len)?;

        if let Err(cause) = self.driver.read(addr, frame.as_mut_bytes()) {
            if self.config.debug {
                log::debug!("read: {} bytes at 0x{:06X} failed: {}", len, addr, cause);
            }
            return Err(Error::ReadFailed { addr, cause });
        }

        let computed = frame.computed_checksum();
        let stored = frame.stored_checksum();
        if computed != stored {
            if self.config.debug {
                log::debug!(
                    "read: checksum mismatch at 0x{:06X} (computed 0x{:02X}, stored 0x{:02X})",
                    addr,
                    computed,
                    stored
                );
            }
            return Err(Error::IntegrityMismatch { computed, stored });
        }

        if self.config.debug {
            log::debug!("flash read of {} bytes from address 0x{:06X} done", payload_len, addr);
        }
        Ok(frame)
    }

    /// Read the just-programmed record back and compare it byte for byte
    fn verify_frame(&mut self, addr: FlashAddress, frame: &FramedBuffer) -> Result<()> {
        let expected = frame.as_bytes();
        let mut readback = FramedBuffer::for_read(frame.payload().len())?;

        self.driver
            .read(addr, readback.as_mut_bytes())
            .map_err(|cause| Error::ReadFailed { addr, cause })?;

        match readback
            .as_bytes()
            .iter()
            .zip(expected)
            .position(|(have, want)| have != want)
        {
            None => Ok(()),
            Some(offset) => {
                let addr = addr + offset as u32;
                if self.config.debug {
                    log::debug!("write: verify failed at 0x{:06X}", addr);
                }
                Err(Error::VerifyFailed { addr })
            }
        }
    }
}
