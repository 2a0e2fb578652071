//! CRC-8 integrity checksum
//!
//! CRC-8/MAXIM-DOW (the Dallas 1-Wire CRC): reflected polynomial `0x8C`,
//! register starting at `0x00`, each byte consumed least-significant bit
//! first.
//!
//! Records written by a [`FlashGuard`](crate::FlashGuard) carry this checksum,
//! so the algorithm must stay bit-exact for existing flash contents to verify.

/// Register value before any byte has been consumed
pub const CRC8_SEED: u8 = 0x00;

static CRC8: crc::Crc<u8> = crc::Crc::<u8>::new(&crc::CRC_8_MAXIM_DOW);

/// Compute the CRC-8 of `bytes`
///
/// `crc8(&[])` returns [`CRC8_SEED`].
pub fn crc8(bytes: &[u8]) -> u8 {
    CRC8.checksum(bytes)
}

/// Streaming CRC-8 state
///
/// Feeding a buffer in several [`update`](Crc8::update) calls yields the same
/// checksum as a single [`crc8`] over the concatenation.
#[derive(Clone)]
pub struct Crc8 {
    digest: crc::Digest<'static, u8>,
}

impl Crc8 {
    /// Start a new checksum
    pub fn new() -> Self {
        Self {
            digest: CRC8.digest(),
        }
    }

    /// Feed more bytes into the checksum
    pub fn update(mut self, bytes: &[u8]) -> Self {
        self.digest.update(bytes);
        self
    }

    /// Current checksum value
    pub fn finish(self) -> u8 {
        self.digest.finalize()
    }
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::new()
    }
}
