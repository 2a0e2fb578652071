//! Guard configuration - fixed at startup, read by every operation

use crate::map::MemoryMap;

/// Configuration held by a [`FlashGuard`](super::FlashGuard)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuardConfig {
    /// Which addresses may be touched
    pub map: MemoryMap,
    /// Emit diagnostic `log` output for every operation
    pub debug: bool,
    /// Read every record back after programming and compare
    pub verify_writes: bool,
}

impl GuardConfig {
    /// Configuration for `map` with diagnostics and verification off
    pub const fn new(map: MemoryMap) -> Self {
        Self {
            map,
            debug: false,
            verify_writes: false,
        }
    }

    /// Turn diagnostic logging on or off
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Turn post-write verification on or off
    pub const fn with_verify_writes(mut self, verify: bool) -> Self {
        self.verify_writes = verify;
        self
    }
}
