//! Geometry and pixel layout of an established mapping.

use serde::Serialize;

use crate::format::{ChannelLayout, PixelFormat};
use crate::sys::{FbFixScreeninfo, FbVarScreeninfo};

/// Description of a mapped framebuffer.
///
/// Only meaningful together with the [`MappedBuffer`](crate::mapping::MappedBuffer)
/// it was produced with. Values are copied from the hardware as-is; in
/// particular `mapping_length` is not checked against the geometry (see
/// [`fits_mapping`](Self::fits_mapping)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FramebufferDescriptor {
    /// Negotiated bits per pixel.
    pub bits_per_pixel: u32,
    /// Pixel storage width in bytes (`bits_per_pixel` rounded up to whole
    /// bytes, zero below 8 bits).
    pub bytes_per_pixel: u32,
    /// Color channel positions within a pixel.
    pub channels: ChannelLayout,
    /// Whether the device is in a grayscale mode.
    pub grayscale: bool,
    /// Horizontal pan offset of the visible area.
    pub x_offset: u32,
    /// Vertical pan offset of the visible area.
    pub y_offset: u32,
    /// Visible width in pixels.
    pub x_resolution: u32,
    /// Visible height in pixels.
    pub y_resolution: u32,
    /// Virtual width in pixels.
    pub x_virtual: u32,
    /// Virtual height in pixels.
    pub y_virtual: u32,
    /// Bytes per scanline as reported by hardware.
    pub stride_bytes: u32,
    /// Pixels per scanline, `stride_bytes / bytes_per_pixel` (zero if the
    /// pixel size is below one byte).
    pub stride_in_pixels: u32,
    /// Length of the mapped region in bytes.
    pub mapping_length: usize,
}

impl FramebufferDescriptor {
    /// Derives a descriptor from the fixed and (negotiated) variable configuration.
    #[must_use]
    pub fn from_screeninfo(fix: &FbFixScreeninfo, var: &FbVarScreeninfo) -> Self {
        // Packed sub-byte formats have no whole-byte storage unit; anything
        // else is stored in whole bytes (15bpp occupies two).
        let bytes_per_pixel = if var.bits_per_pixel < 8 {
            0
        } else {
            var.bits_per_pixel.div_ceil(8)
        };
        Self {
            bits_per_pixel: var.bits_per_pixel,
            bytes_per_pixel,
            channels: ChannelLayout::from_var(var),
            grayscale: var.grayscale != 0,
            x_offset: var.xoffset,
            y_offset: var.yoffset,
            x_resolution: var.xres,
            y_resolution: var.yres,
            x_virtual: var.xres_virtual,
            y_virtual: var.yres_virtual,
            stride_bytes: fix.line_length,
            stride_in_pixels: fix.line_length.checked_div(bytes_per_pixel).unwrap_or(0),
            mapping_length: fix.smem_len as usize,
        }
    }

    /// Bit offset of the red channel.
    #[must_use]
    pub fn red_offset(&self) -> u32 {
        self.channels.red.offset
    }

    /// Bit offset of the green channel.
    #[must_use]
    pub fn green_offset(&self) -> u32 {
        self.channels.green.offset
    }

    /// Bit offset of the blue channel.
    #[must_use]
    pub fn blue_offset(&self) -> u32 {
        self.channels.blue.offset
    }

    /// Classifies the pixel format.
    #[must_use]
    pub fn pixel_format(&self) -> PixelFormat {
        self.channels.pixel_format(self.bits_per_pixel)
    }

    /// Returns the byte offset of visible pixel `(x, y)` within the mapping.
    ///
    /// Pan offsets are applied. Returns `None` if the pixel lies outside the
    /// visible area or its storage would extend past the mapping.
    #[must_use]
    pub fn pixel_offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.x_resolution || y >= self.y_resolution || self.bytes_per_pixel == 0 {
            return None;
        }
        let row = (y as usize).checked_add(self.y_offset as usize)?;
        let col = (x as usize).checked_add(self.x_offset as usize)?;
        let bpp = self.bytes_per_pixel as usize;
        let offset = row
            .checked_mul(self.stride_bytes as usize)?
            .checked_add(col.checked_mul(bpp)?)?;
        (offset.checked_add(bpp)? <= self.mapping_length).then_some(offset)
    }

    /// Minimum mapping length needed to address every visible scanline.
    #[must_use]
    pub fn required_len(&self) -> usize {
        (self.y_offset as usize)
            .saturating_add(self.y_resolution as usize)
            .saturating_mul(self.stride_bytes as usize)
    }

    /// Whether the reported mapping covers the visible area.
    ///
    /// Initialization never rejects a device on this basis; callers that
    /// index the buffer directly should check it.
    #[must_use]
    pub fn fits_mapping(&self) -> bool {
        self.required_len() <= self.mapping_length
    }
}
