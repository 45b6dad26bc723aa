//! Human and JSON renderings of a mapped framebuffer.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tendon_fb::{DisplayDevice, Framebuffer, FramebufferDescriptor, Negotiation, PixelFormat};

/// Summary of a successful initialization.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    device: &'a Path,
    driver: &'a str,
    negotiation: Negotiation,
    pixel_format: PixelFormat,
    fits_mapping: bool,
    descriptor: &'a FramebufferDescriptor,
}

impl<'a> Report<'a> {
    /// Builds a report for `fb`, opened from `device`.
    pub fn new<D: DisplayDevice>(device: &'a Path, fb: &'a Framebuffer<D>) -> Self {
        let descriptor = fb.descriptor();
        Self {
            device,
            driver: fb.driver(),
            negotiation: fb.negotiation(),
            pixel_format: descriptor.pixel_format(),
            fits_mapping: descriptor.fits_mapping(),
            descriptor,
        }
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.descriptor;
        writeln!(f, "device       {} ({})", self.device.display(), self.driver)?;
        writeln!(f, "negotiation  {:?}", self.negotiation)?;
        writeln!(
            f,
            "resolution   {}x{} (virtual {}x{})",
            d.x_resolution, d.y_resolution, d.x_virtual, d.y_virtual
        )?;
        writeln!(f, "pan offset   {},{}", d.x_offset, d.y_offset)?;
        writeln!(
            f,
            "depth        {} bpp ({} bytes per pixel){}",
            d.bits_per_pixel,
            d.bytes_per_pixel,
            if d.grayscale { ", grayscale" } else { "" }
        )?;
        writeln!(f, "format       {:?}", self.pixel_format)?;
        writeln!(
            f,
            "channels     r={}/{} g={}/{} b={}/{} a={}/{}",
            d.channels.red.offset,
            d.channels.red.length,
            d.channels.green.offset,
            d.channels.green.length,
            d.channels.blue.offset,
            d.channels.blue.length,
            d.channels.transp.offset,
            d.channels.transp.length
        )?;
        writeln!(
            f,
            "stride       {} bytes ({} pixels)",
            d.stride_bytes, d.stride_in_pixels
        )?;
        write!(f, "mapping      {} bytes", d.mapping_length)?;
        if !self.fits_mapping {
            write!(f, " (visible area needs {})", d.required_len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tendon_fb::{Channel, ChannelLayout};

    fn descriptor(mapping_length: usize) -> FramebufferDescriptor {
        FramebufferDescriptor {
            bits_per_pixel: 32,
            bytes_per_pixel: 4,
            channels: ChannelLayout {
                red: Channel { offset: 16, length: 8 },
                green: Channel { offset: 8, length: 8 },
                blue: Channel { offset: 0, length: 8 },
                transp: Channel::default(),
            },
            grayscale: false,
            x_offset: 0,
            y_offset: 0,
            x_resolution: 1920,
            y_resolution: 1080,
            x_virtual: 1920,
            y_virtual: 1080,
            stride_bytes: 7680,
            stride_in_pixels: 1920,
            mapping_length,
        }
    }

    fn report(descriptor: &FramebufferDescriptor) -> Report<'_> {
        Report {
            device: Path::new("/dev/fb0"),
            driver: "simplefb",
            negotiation: Negotiation::Accepted,
            pixel_format: descriptor.pixel_format(),
            fits_mapping: descriptor.fits_mapping(),
            descriptor,
        }
    }

    #[test]
    fn table_lists_geometry() {
        let desc = descriptor(8_294_400);
        let text = report(&desc).to_string();
        assert!(text.starts_with("device       /dev/fb0 (simplefb)\n"));
        assert!(text.contains("resolution   1920x1080 (virtual 1920x1080)\n"));
        assert!(text.contains("format       Bgr32\n"));
        assert!(text.contains("stride       7680 bytes (1920 pixels)\n"));
        assert!(text.ends_with("mapping      8294400 bytes"));
    }

    #[test]
    fn table_flags_short_mapping() {
        let desc = descriptor(4096);
        let text = report(&desc).to_string();
        assert!(text.ends_with("mapping      4096 bytes (visible area needs 8294400)"));
    }

    #[test]
    fn json_fields() {
        let desc = descriptor(8_294_400);
        let json: serde_json::Value =
            serde_json::from_str(&report(&desc).to_json().unwrap()).unwrap();
        assert_eq!(json["negotiation"], "accepted");
        assert_eq!(json["pixel_format"], "bgr32");
        assert_eq!(json["fits_mapping"], true);
        assert_eq!(json["descriptor"]["stride_in_pixels"], 1920);
        assert_eq!(json["descriptor"]["channels"]["red"]["offset"], 16);
    }
}
