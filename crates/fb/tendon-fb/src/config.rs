//! Framebuffer configuration.
//!
//! Usually deserialized from a TOML file such as:
//!
//! ```toml
//! device = "/dev/fb1"
//! preferred_bpp = 32
//! negotiate = true
//! restore_on_release = false
//! access = "read_write"
//! ```
//!
//! Every key is optional; missing keys take the values of [`FbConfig::default`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::device::MapAccess;
use crate::negotiate::FormatRequest;

/// Primary display device node.
pub const DEFAULT_DEVICE: &str = "/dev/fb0";

/// How the pixel memory is mapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Readable and writable; byte slices are available.
    #[default]
    ReadWrite,
    /// Write-only; only raw pointer access is available.
    WriteOnly,
}

impl AccessMode {
    /// Returns the mapping rights for this mode.
    #[must_use]
    pub fn map_access(self) -> MapAccess {
        match self {
            Self::ReadWrite => MapAccess::READ | MapAccess::WRITE,
            Self::WriteOnly => MapAccess::WRITE,
        }
    }
}

/// Settings for [`Framebuffer::initialize_with`](crate::Framebuffer::initialize_with).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FbConfig {
    /// Device node to open.
    pub device: PathBuf,
    /// Bits per pixel to request.
    pub preferred_bpp: u32,
    /// Whether to request `preferred_bpp` at all.
    pub negotiate: bool,
    /// Write the pre-negotiation mode back when the framebuffer is released.
    pub restore_on_release: bool,
    /// Mapping access rights.
    pub access: AccessMode,
}

impl Default for FbConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            preferred_bpp: FormatRequest::default().bits_per_pixel,
            negotiate: true,
            restore_on_release: false,
            access: AccessMode::ReadWrite,
        }
    }
}

impl FbConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Reads and parses the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Returns the format request described by this configuration.
    #[must_use]
    pub fn format_request(&self) -> FormatRequest {
        FormatRequest {
            bits_per_pixel: self.preferred_bpp,
        }
    }
}

/// Errors loading a [`FbConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },
    /// The file is not a valid configuration.
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(e) => write!(f, "invalid framebuffer config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(FbConfig::from_toml_str("").unwrap(), FbConfig::default());
    }

    #[test]
    fn defaults_match_primary_display() {
        let config = FbConfig::default();
        assert_eq!(config.device, Path::new("/dev/fb0"));
        assert_eq!(config.preferred_bpp, 32);
        assert!(config.negotiate);
        assert!(!config.restore_on_release);
        assert_eq!(config.access.map_access(), MapAccess::READ | MapAccess::WRITE);
    }

    #[test]
    fn parse_all_keys() {
        let config = FbConfig::from_toml_str(
            r#"
            device = "/dev/fb1"
            preferred_bpp = 16
            negotiate = false
            restore_on_release = true
            access = "write_only"
            "#,
        )
        .unwrap();
        assert_eq!(config.device, Path::new("/dev/fb1"));
        assert_eq!(config.format_request().bits_per_pixel, 16);
        assert!(!config.negotiate);
        assert!(config.restore_on_release);
        assert_eq!(config.access, AccessMode::WriteOnly);
        assert_eq!(config.access.map_access(), MapAccess::WRITE);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = FbConfig::from_toml_str("depth = 32").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid framebuffer config: "));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FbConfig::load(Path::new("/nonexistent/tendon.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
