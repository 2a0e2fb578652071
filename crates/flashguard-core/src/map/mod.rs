//! Flash memory map
//!
//! A [`MemoryMap`] splits the device into a firmware image area, a user data
//! window and a system-reserved area. Only addresses inside the user data
//! window that are word aligned pass [`MemoryMap::validate`].
//!
//! With the `std` feature a map can also be loaded from TOML:
//!
//! ```ignore
//! let map = MemoryMap::from_toml_file("memory_map.toml")?;
//! ```

mod types;
mod validate;

#[cfg(feature = "std")]
mod toml;

pub use types::*;
pub use validate::*;

#[cfg(feature = "std")]
pub use self::toml::ConfigError;
