//! Linux framebuffer access for software renderers.
//!
//! Opens an fbdev device, asks it once for a preferred pixel format, and maps
//! its pixel memory into the process:
//!
//! - [`Framebuffer`] -- the mapped buffer and its [`FramebufferDescriptor`],
//!   released exactly once by [`Framebuffer::release`] or on drop.
//! - [`FbConfig`] -- device node, preferred depth, and mapping options.
//! - [`DisplayBackend`] / [`DisplayDevice`] -- the kernel boundary, implemented
//!   for Linux by [`LinuxBackend`].
//!
//! Drawing, double buffering, and vsync are left to the caller.

pub mod config;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod format;
pub mod framebuffer;
pub mod mapping;
pub mod negotiate;
pub mod sys;

pub use config::{AccessMode, ConfigError, FbConfig};
pub use descriptor::FramebufferDescriptor;
pub use device::{
    DeviceMapping, DisplayBackend, DisplayDevice, LinuxBackend, LinuxDevice, MapAccess, SharedMapping,
};
pub use error::{ErrorKind, FbError};
pub use format::{Channel, ChannelLayout, PixelFormat};
pub use framebuffer::Framebuffer;
pub use mapping::MappedBuffer;
pub use negotiate::{FormatRequest, Negotiation};
