//! Pixel format negotiation.
//!
//! One attempt is made to switch the device to the preferred depth in color
//! mode. Whatever the outcome, the configuration returned is the one the
//! device actually holds afterwards.

use serde::Serialize;

use crate::device::DisplayDevice;
use crate::error::FbError;
use crate::sys::FbVarScreeninfo;

/// Outcome of a format request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Negotiation {
    /// The device applied the requested depth.
    Accepted,
    /// The device rejected the request or substituted another depth.
    Declined,
    /// No request was made.
    Skipped,
}

/// Preferred format sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRequest {
    /// Requested bits per pixel.
    pub bits_per_pixel: u32,
}

impl Default for FormatRequest {
    fn default() -> Self {
        Self { bits_per_pixel: 32 }
    }
}

impl FormatRequest {
    /// Builds the configuration to submit: `current` with the requested depth
    /// and grayscale cleared. Resolution, channel layout, and pan offsets are
    /// left untouched.
    #[must_use]
    pub fn apply(&self, current: &FbVarScreeninfo) -> FbVarScreeninfo {
        FbVarScreeninfo {
            bits_per_pixel: self.bits_per_pixel,
            grayscale: 0,
            ..*current
        }
    }
}

/// Submits `request` to `device` and returns the resulting configuration.
///
/// A rejected request is not an error: the configuration is re-read and
/// [`Negotiation::Declined`] is returned. Only a failure of that re-read is
/// reported as [`FbError::QueryFailed`].
pub fn negotiate<D: DisplayDevice>(
    device: &mut D,
    current: &FbVarScreeninfo,
    request: FormatRequest,
) -> Result<(FbVarScreeninfo, Negotiation), FbError> {
    let mut wanted = request.apply(current);
    match device.put_var_info(&mut wanted) {
        Ok(()) if wanted.bits_per_pixel == request.bits_per_pixel => {
            log::debug!("fb: device accepted {}bpp", request.bits_per_pixel);
            Ok((wanted, Negotiation::Accepted))
        }
        Ok(()) => {
            log::warn!(
                "fb: requested {}bpp, device substituted {}bpp",
                request.bits_per_pixel,
                wanted.bits_per_pixel
            );
            Ok((wanted, Negotiation::Declined))
        }
        Err(e) => {
            log::warn!(
                "fb: device declined {}bpp ({e}), keeping current format",
                request.bits_per_pixel
            );
            let var = device.var_info().map_err(|source| FbError::QueryFailed {
                request: "FBIOGET_VSCREENINFO",
                source,
            })?;
            Ok((var, Negotiation::Declined))
        }
    }
}
