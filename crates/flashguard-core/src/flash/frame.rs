//! Framed transfer buffer
//!
//! On flash a record is laid out as
//!
//! ```text
//! | payload (len bytes) | crc8 | 0xFF padding up to a multiple of 4 |
//! ```
//!
//! The checksum always sits at offset `len`, directly after the payload,
//! never at the end of the padded block.

use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use zerocopy::IntoBytes;

use crate::checksum::crc8;
use crate::error::{Error, Result};
use crate::map::WORD_SIZE;

/// Erased cell value; padding programmed with it leaves the cells untouched
const ERASED_WORD: u32 = u32::MAX;

/// Length of the framed record for a `payload_len`-byte payload
///
/// Payload plus one checksum byte, rounded up to the word size. `None` if
/// that does not fit in `usize`.
pub(crate) fn framed_len(payload_len: usize) -> Option<usize> {
    payload_len
        .checked_add(1)?
        .checked_next_multiple_of(WORD_SIZE as usize)
}

/// Word-backed buffer holding one framed record
///
/// Backed by `u32` storage so the bytes handed to the driver are always
/// 4-byte aligned. Lives only for the duration of one transaction.
pub(crate) struct FramedBuffer {
    words: Vec<u32>,
    payload_len: usize,
}

impl FramedBuffer {
    fn alloc(payload_len: usize, fill: u32) -> Result<Self> {
        let len = framed_len(payload_len).ok_or(Error::OutOfMemory { len: usize::MAX })?;
        let word_count = len / WORD_SIZE as usize;

        let mut words = Vec::new();
        words
            .try_reserve_exact(word_count)
            .map_err(|_| Error::OutOfMemory { len })?;
        words.resize(word_count, fill);

        Ok(Self { words, payload_len })
    }

    /// Frame `payload` for programming
    pub(crate) fn for_payload(payload: &[u8]) -> Result<Self> {
        let len = payload.len();
        let mut frame = Self::alloc(len, ERASED_WORD)?;
        let bytes = frame.as_mut_bytes();
        bytes[..len].copy_from_slice(payload);
        bytes[len] = crc8(payload);
        Ok(frame)
    }

    /// Empty frame to be filled by a read of a `payload_len`-byte record
    pub(crate) fn for_read(payload_len: usize) -> Result<Self> {
        Self::alloc(payload_len, 0)
    }

    /// Whole framed record, padding included
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.words.as_slice().as_bytes()
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        self.words.as_mut_slice().as_mut_bytes()
    }

    pub(crate) fn payload(&self) -> &[u8] {
        &self.as_bytes()[..self.payload_len]
    }

    /// Checksum byte found directly after the payload
    pub(crate) fn stored_checksum(&self) -> u8 {
        self.as_bytes()[self.payload_len]
    }

    /// Checksum recomputed over the payload
    pub(crate) fn computed_checksum(&self) -> u8 {
        crc8(self.payload())
    }
}

/// A byte array aligned to a 4-byte boundary
///
/// [`FlashGuard::write`](super::FlashGuard::write) and
/// [`FlashGuard::read`](super::FlashGuard::read) refuse unaligned caller
/// buffers; wrapping a stack array in `WordAligned` satisfies them.
///
/// ```ignore
/// let mut record = WordAligned([0u8; 6]);
/// guard.read(0x20000, &mut record.0)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C, align(4))]
pub struct WordAligned<const N: usize>(pub [u8; N]);

impl<const N: usize> WordAligned<N> {
    /// An all-zero buffer
    pub const fn zeroed() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> Default for WordAligned<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<const N: usize> Deref for WordAligned<N> {
    type Target = [u8; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for WordAligned<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::is_word_aligned;

    #[test]
    fn test_framed_len() {
        assert_eq!(framed_len(0), Some(4));
        assert_eq!(framed_len(3), Some(4));
        assert_eq!(framed_len(4), Some(8));
        assert_eq!(framed_len(7), Some(8));
        assert_eq!(framed_len(8), Some(12));
        assert_eq!(framed_len(4095), Some(4096));
        assert_eq!(framed_len(usize::MAX), None);
    }

    #[test]
    fn test_checksum_directly_after_payload() {
        let frame = FramedBuffer::for_payload(&[0xAA, 0xBB, 0xCC]).unwrap();
        let crc = crc8(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(frame.as_bytes(), &[0xAA, 0xBB, 0xCC, crc]);
        assert_eq!(frame.stored_checksum(), crc);
        assert_eq!(frame.computed_checksum(), crc);
    }

    #[test]
    fn test_padding_is_erased_value() {
        let frame = FramedBuffer::for_payload(&[1, 2, 3, 4, 5]).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[5], crc8(&[1, 2, 3, 4, 5]));
        assert_eq!(&bytes[6..], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_empty_payload_frame() {
        let frame = FramedBuffer::for_payload(&[]).unwrap();
        assert_eq!(frame.as_bytes(), &[0x00, 0xFF, 0xFF, 0xFF]);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_frame_storage_is_word_aligned() {
        let frame = FramedBuffer::for_read(13).unwrap();
        assert!(is_word_aligned(frame.as_bytes().as_ptr()));
        assert_eq!(frame.as_bytes().len(), 16);
    }

    #[test]
    fn test_word_aligned_wrapper() {
        let buf = WordAligned([0u8; 3]);
        assert!(is_word_aligned(buf.as_ptr()));
        assert_eq!(core::mem::align_of::<WordAligned<3>>(), 4);
    }
}
