//! TOML memory map parsing
//!
//! Parses memory map files in TOML format:
//!
//! ```toml
//! [memory_map]
//! max_address = "4 MiB"
//! protected_region_start = 0x3FC000
//! reserved_low_region_end = "0x10000"
//! ```
//!
//! Every field is optional and falls back to [`MemoryMap::ESP8266_4MB`].

use std::fs;
use std::io;
use std::path::Path;
use std::string::String;
use std::format;

use thiserror::Error;

use super::{MapError, MemoryMap};

/// Errors from loading a memory map file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML or has the wrong shape
    #[error("failed to parse memory map: {0}")]
    Parse(#[from] toml::de::Error),

    /// The addresses violate the memory map ordering
    #[error("invalid memory map: {0}")]
    Invalid(#[from] MapError),
}

/// TOML file structure
#[derive(Debug, serde::Deserialize)]
struct TomlMapFile {
    memory_map: TomlMemoryMap,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlMemoryMap {
    #[serde(default, deserialize_with = "deserialize_opt_size")]
    max_address: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_size")]
    protected_region_start: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_size")]
    reserved_low_region_end: Option<u32>,
}

/// Deserialize an optional u32 given as an integer, hex string or size string
fn deserialize_opt_size<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeOrInt {
        Int(u32),
        Str(String),
    }

    match SizeOrInt::deserialize(deserializer)? {
        SizeOrInt::Int(n) => Ok(Some(n)),
        SizeOrInt::Str(s) => parse_size(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parse a size string like "4 MiB", "0x3FC000" or "4096"
fn parse_size(s: &str) -> Result<u32, String> {
    let s = s.trim();

    if let Ok(n) = s.parse::<u32>() {
        return Ok(n);
    }

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(hex.trim(), 16).map_err(|e| format!("invalid hex: {}", e));
    }

    let s_lower = s.to_lowercase();
    let (num_str, multiplier) = if let Some(n) = s_lower.strip_suffix("mib") {
        (n.trim(), 1024 * 1024)
    } else if let Some(n) = s_lower.strip_suffix("kib") {
        (n.trim(), 1024)
    } else if let Some(n) = s_lower.strip_suffix("b") {
        (n.trim(), 1)
    } else {
        return Err(format!("invalid size: {}", s));
    };

    let num: u32 = num_str.parse().map_err(|_| format!("invalid size: {}", s))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflows 32 bits: {}", s))
}

impl MemoryMap {
    /// Load a memory map from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a memory map from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TomlMapFile = toml::from_str(content)?;
        let defaults = MemoryMap::ESP8266_4MB;
        let map = &file.memory_map;

        let checked = MemoryMap::new(
            map.max_address.unwrap_or(defaults.max_address()),
            map.protected_region_start
                .unwrap_or(defaults.protected_region_start()),
            map.reserved_low_region_end
                .unwrap_or(defaults.reserved_low_region_end()),
        )?;
        Ok(checked)
    }
}
