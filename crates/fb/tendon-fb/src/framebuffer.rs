//! Framebuffer lifecycle: initialize, use, release.

use crate::config::FbConfig;
use crate::descriptor::FramebufferDescriptor;
use crate::device::{DisplayBackend, DisplayDevice, LinuxBackend, LinuxDevice};
use crate::error::FbError;
use crate::mapping::MappedBuffer;
use crate::negotiate::{Negotiation, negotiate};
use crate::sys::FbVarScreeninfo;

/// A mapped framebuffer together with its descriptor.
///
/// Created by [`initialize`](Self::initialize) or
/// [`initialize_with`](Self::initialize_with), which either fully succeed or
/// leave nothing behind. The mapping is released exactly once, either by
/// [`release`](Self::release) or when the value is dropped.
pub struct Framebuffer<D: DisplayDevice = LinuxDevice> {
    buffer: MappedBuffer<D::Mapping>,
    descriptor: FramebufferDescriptor,
    negotiation: Negotiation,
    previous_mode: FbVarScreeninfo,
    driver: String,
    /// Device kept open to write `previous_mode` back on release.
    restore: Option<D>,
}

impl Framebuffer<LinuxDevice> {
    /// Maps the primary display (`/dev/fb0`) with default settings.
    pub fn initialize() -> Result<Self, FbError> {
        Self::initialize_with(&LinuxBackend, &FbConfig::default())
    }
}

impl<D: DisplayDevice> Framebuffer<D> {
    /// Opens `config.device` through `backend`, negotiates the preferred
    /// format, and maps the device's pixel memory.
    ///
    /// A declined format request does not fail initialization; the descriptor
    /// then reflects the format the device kept. Unless
    /// `config.restore_on_release` is set, the device handle is closed before
    /// returning; it is also closed when negotiation is skipped, since the
    /// mode is then never written.
    pub fn initialize_with<B>(backend: &B, config: &FbConfig) -> Result<Self, FbError>
    where
        B: DisplayBackend<Device = D>,
    {
        let mut device = backend
            .open(&config.device)
            .map_err(|source| FbError::DeviceUnavailable {
                path: config.device.clone(),
                source,
            })?;

        let mut fix = device.fixed_info().map_err(|source| FbError::QueryFailed {
            request: "FBIOGET_FSCREENINFO",
            source,
        })?;
        let previous_mode = device.var_info().map_err(|source| FbError::QueryFailed {
            request: "FBIOGET_VSCREENINFO",
            source,
        })?;
        log::debug!(
            "fb: {} is {}x{} {}bpp, line {} bytes, {} bytes of pixel memory",
            config.device.display(),
            previous_mode.xres,
            previous_mode.yres,
            previous_mode.bits_per_pixel,
            fix.line_length,
            fix.smem_len
        );

        let (var, negotiation) = if config.negotiate {
            negotiate(&mut device, &previous_mode, config.format_request())?
        } else {
            (previous_mode, Negotiation::Skipped)
        };

        // A depth change alters the scanline length.
        if negotiation != Negotiation::Skipped && var.bits_per_pixel != previous_mode.bits_per_pixel {
            fix = device.fixed_info().map_err(|source| FbError::QueryFailed {
                request: "FBIOGET_FSCREENINFO",
                source,
            })?;
        }

        let descriptor = FramebufferDescriptor::from_screeninfo(&fix, &var);
        if descriptor.mapping_length == 0 {
            return Err(FbError::EmptyMapping);
        }

        let access = config.access.map_access();
        let mapping = device
            .map(descriptor.mapping_length, access)
            .map_err(|source| FbError::MappingFailed {
                len: descriptor.mapping_length,
                source,
            })?;

        log::info!(
            "fb: mapped {} ({}x{} {}bpp, stride {} bytes, {} bytes)",
            config.device.display(),
            descriptor.x_resolution,
            descriptor.y_resolution,
            descriptor.bits_per_pixel,
            descriptor.stride_bytes,
            descriptor.mapping_length
        );
        if !descriptor.fits_mapping() {
            log::warn!(
                "fb: mapping is {} bytes but the visible area spans {} bytes",
                descriptor.mapping_length,
                descriptor.required_len()
            );
        }

        Ok(Self {
            buffer: MappedBuffer::new(mapping, access),
            descriptor,
            negotiation,
            previous_mode,
            driver: fix.id_str(),
            // Nothing to restore if the mode was never written.
            restore: (config.restore_on_release && negotiation != Negotiation::Skipped)
                .then_some(device),
        })
    }

    /// Returns the geometry and pixel layout of the mapping.
    #[must_use]
    pub fn descriptor(&self) -> &FramebufferDescriptor {
        &self.descriptor
    }

    /// Returns the mapped pixel memory.
    #[must_use]
    pub fn buffer(&self) -> &MappedBuffer<D::Mapping> {
        &self.buffer
    }

    /// Returns the mapped pixel memory for writing.
    #[must_use]
    pub fn buffer_mut(&mut self) -> &mut MappedBuffer<D::Mapping> {
        &mut self.buffer
    }

    /// Returns the outcome of the format request.
    #[must_use]
    pub fn negotiation(&self) -> Negotiation {
        self.negotiation
    }

    /// Returns the display mode found before negotiation.
    #[must_use]
    pub fn previous_mode(&self) -> &FbVarScreeninfo {
        &self.previous_mode
    }

    /// Returns the driver identification reported by the device.
    #[must_use]
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Gives up the pixel memory.
    ///
    /// Consuming `self` drops the buffer, and dropping the buffer unmaps it;
    /// the work happens in `Drop`, so releasing and dropping are equivalent.
    /// The negotiated display mode stays in effect unless the framebuffer was
    /// initialized with `restore_on_release` and negotiation ran.
    pub fn release(self) {
        log::debug!("fb: releasing {} byte mapping", self.buffer.len());
    }
}

impl<D: DisplayDevice> Drop for Framebuffer<D> {
    fn drop(&mut self) {
        // Runs before the fields drop, so the mode is restored while the
        // mapping is still live and the device is still open.
        if let Some(device) = self.restore.as_mut() {
            let mut mode = self.previous_mode;
            match device.put_var_info(&mut mode) {
                Ok(()) => log::debug!("fb: restored {}bpp mode", mode.bits_per_pixel),
                Err(e) => log::warn!("fb: cannot restore previous mode: {e}"),
            }
        }
    }
}
