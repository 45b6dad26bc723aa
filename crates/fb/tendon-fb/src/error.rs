//! Error types for framebuffer initialization.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while establishing a framebuffer mapping.
///
/// A declined pixel-format request is deliberately absent: it is reported as
/// [`Negotiation::Declined`](crate::negotiate::Negotiation::Declined) and never
/// aborts initialization.
#[derive(Debug)]
pub enum FbError {
    /// The display device could not be opened.
    DeviceUnavailable {
        /// Device node that was opened.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },
    /// A screen configuration query failed after the device was opened.
    QueryFailed {
        /// Name of the failing request (e.g. `FBIOGET_FSCREENINFO`).
        request: &'static str,
        /// Underlying OS error.
        source: io::Error,
    },
    /// The device reported no pixel memory to map.
    EmptyMapping,
    /// The pixel memory could not be mapped.
    MappingFailed {
        /// Requested mapping length in bytes.
        len: usize,
        /// Underlying OS error.
        source: io::Error,
    },
}

/// Payload-free discriminant of [`FbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`FbError::DeviceUnavailable`].
    DeviceUnavailable,
    /// See [`FbError::QueryFailed`].
    QueryFailed,
    /// See [`FbError::EmptyMapping`] and [`FbError::MappingFailed`].
    MappingFailed,
}

impl FbError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DeviceUnavailable { .. } => ErrorKind::DeviceUnavailable,
            Self::QueryFailed { .. } => ErrorKind::QueryFailed,
            Self::EmptyMapping | Self::MappingFailed { .. } => ErrorKind::MappingFailed,
        }
    }
}

impl fmt::Display for FbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceUnavailable { path, source } => {
                write!(f, "cannot open {}: {source}", path.display())
            }
            Self::QueryFailed { request, source } => write!(f, "{request} failed: {source}"),
            Self::EmptyMapping => f.write_str("device reports zero bytes of pixel memory"),
            Self::MappingFailed { len, source } => {
                write!(f, "cannot map {len} bytes of pixel memory: {source}")
            }
        }
    }
}

impl std::error::Error for FbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DeviceUnavailable { source, .. }
            | Self::QueryFailed { source, .. }
            | Self::MappingFailed { source, .. } => Some(source),
            Self::EmptyMapping => None,
        }
    }
}
