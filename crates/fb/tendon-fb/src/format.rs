//! Pixel channel layout and format classification.

use serde::Serialize;

use crate::sys::{FbBitfield, FbVarScreeninfo};

/// Position and width of one color channel within a pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Channel {
    /// Bit offset from the least significant bit.
    pub offset: u32,
    /// Width in bits.
    pub length: u32,
}

impl From<FbBitfield> for Channel {
    fn from(field: FbBitfield) -> Self {
        Self {
            offset: field.offset,
            length: field.length,
        }
    }
}

impl Channel {
    /// Scales an 8-bit intensity to this channel's width and shifts it into place.
    ///
    /// Channels that lie (partly) outside a 32-bit pixel are truncated.
    #[must_use]
    pub fn pack(self, intensity: u8) -> u32 {
        if self.length == 0 || self.offset >= 32 {
            return 0;
        }
        let max = (1u64 << self.length.min(32)) - 1;
        let scaled = u64::from(intensity) * max / 255;
        ((scaled << self.offset) & u64::from(u32::MAX)) as u32
    }
}

/// Red, green, blue, and transparency channel positions as reported by hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelLayout {
    /// Red channel.
    pub red: Channel,
    /// Green channel.
    pub green: Channel,
    /// Blue channel.
    pub blue: Channel,
    /// Transparency channel, zero length if absent.
    pub transp: Channel,
}

impl ChannelLayout {
    /// Extracts the channel layout from a variable screen configuration.
    #[must_use]
    pub fn from_var(var: &FbVarScreeninfo) -> Self {
        Self {
            red: var.red.into(),
            green: var.green.into(),
            blue: var.blue.into(),
            transp: var.transp.into(),
        }
    }

    /// Encodes an 8-bit-per-channel color as a native pixel value.
    ///
    /// The transparency channel, if any, is left at zero.
    #[must_use]
    pub fn encode(&self, red: u8, green: u8, blue: u8) -> u32 {
        self.red.pack(red) | self.green.pack(green) | self.blue.pack(blue)
    }

    /// Classifies this layout for a pixel of `bits_per_pixel` bits.
    #[must_use]
    pub fn pixel_format(&self, bits_per_pixel: u32) -> PixelFormat {
        let byte_channels = self.red.length == 8 && self.green.length == 8 && self.blue.length == 8;
        if bits_per_pixel == 32 && byte_channels && self.green.offset == 8 {
            match (self.red.offset, self.blue.offset) {
                (0, 16) => return PixelFormat::Rgb32,
                (16, 0) => return PixelFormat::Bgr32,
                _ => {}
            }
        }
        PixelFormat::Bitmask {
            red_size: self.red.length,
            red_shift: self.red.offset,
            green_size: self.green.length,
            green_shift: self.green.offset,
            blue_size: self.blue.length,
            blue_shift: self.blue.offset,
        }
    }
}

/// Pixel format of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 32-bit RGB (red at lowest byte offset).
    Rgb32,
    /// 32-bit BGR (blue at lowest byte offset).
    Bgr32,
    /// Arbitrary bitmask layout described by per-channel size and shift.
    Bitmask {
        /// Number of bits in the red channel.
        red_size: u32,
        /// Bit position of the red channel (from LSB).
        red_shift: u32,
        /// Number of bits in the green channel.
        green_size: u32,
        /// Bit position of the green channel (from LSB).
        green_shift: u32,
        /// Number of bits in the blue channel.
        blue_size: u32,
        /// Bit position of the blue channel (from LSB).
        blue_shift: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(red: (u32, u32), green: (u32, u32), blue: (u32, u32)) -> ChannelLayout {
        ChannelLayout {
            red: Channel { offset: red.0, length: red.1 },
            green: Channel { offset: green.0, length: green.1 },
            blue: Channel { offset: blue.0, length: blue.1 },
            transp: Channel::default(),
        }
    }

    #[test]
    fn classify_xrgb8888() {
        let l = layout((16, 8), (8, 8), (0, 8));
        assert_eq!(l.pixel_format(32), PixelFormat::Bgr32);
    }

    #[test]
    fn classify_xbgr8888() {
        let l = layout((0, 8), (8, 8), (16, 8));
        assert_eq!(l.pixel_format(32), PixelFormat::Rgb32);
    }

    #[test]
    fn classify_rgb565_as_bitmask() {
        let l = layout((11, 5), (5, 6), (0, 5));
        assert_eq!(
            l.pixel_format(16),
            PixelFormat::Bitmask {
                red_size: 5,
                red_shift: 11,
                green_size: 6,
                green_shift: 5,
                blue_size: 5,
                blue_shift: 0,
            }
        );
    }

    #[test]
    fn byte_layout_at_24bpp_is_bitmask() {
        let l = layout((16, 8), (8, 8), (0, 8));
        assert!(matches!(l.pixel_format(24), PixelFormat::Bitmask { .. }));
    }

    #[test]
    fn encode_xrgb8888() {
        let l = layout((16, 8), (8, 8), (0, 8));
        assert_eq!(l.encode(0x12, 0x34, 0x56), 0x0012_3456);
    }

    #[test]
    fn encode_rgb565() {
        let l = layout((11, 5), (5, 6), (0, 5));
        assert_eq!(l.encode(0xFF, 0xFF, 0xFF), 0xFFFF);
        assert_eq!(l.encode(0xFF, 0, 0), 0xF800);
        assert_eq!(l.encode(0, 0, 0), 0);
    }

    #[test]
    fn pack_ignores_out_of_range_channels() {
        assert_eq!(Channel { offset: 32, length: 8 }.pack(0xFF), 0);
        assert_eq!(Channel { offset: 0, length: 0 }.pack(0xFF), 0);
        assert_eq!(Channel { offset: 28, length: 8 }.pack(0xFF), 0xF000_0000);
    }
}
