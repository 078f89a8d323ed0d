// SPDX-License-Identifier: (MIT OR Apache-2.0)

use thiserror::Error;

/// Environment variable overriding the target pointer width.
pub const POINTER_WIDTH_ENV: &str = "TAGSIZE_POINTER_WIDTH";

/// Properties of the machine the layouts are computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetConfig {
    /// Bytes in `usize`, `isize`, `ptr` and `*T`.
    pub pointer_width: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self { pointer_width: 8 }
    }
}

impl TargetConfig {
    pub fn with_pointer_width(pointer_width: u64) -> Result<Self, ConfigError> {
        match pointer_width {
            2 | 4 | 8 => Ok(Self { pointer_width }),
            other => Err(ConfigError::UnsupportedPointerWidth(other)),
        }
    }

    /// Default config, with the pointer width taken from
    /// `TAGSIZE_POINTER_WIDTH` when it is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(POINTER_WIDTH_ENV) {
            Ok(value) => Self::with_pointer_width(parse_pointer_width(&value)?),
            Err(_) => Ok(Self::default()),
        }
    }
}

/// Parse a pointer width given in bytes.
pub fn parse_pointer_width(value: &str) -> Result<u64, ConfigError> {
    let width: u64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(value.to_string()))?;
    TargetConfig::with_pointer_width(width).map(|t| t.pointer_width)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("pointer width must be 2, 4 or 8 bytes, got {0}")]
    UnsupportedPointerWidth(u64),
    #[error("invalid pointer width `{0}`")]
    InvalidValue(String),
}
