//! Display device access.
//!
//! [`DisplayBackend`] and [`DisplayDevice`] describe everything the
//! framebuffer core needs from the kernel: opening the device node, the two
//! screen configuration queries, the format update, and a shared mapping of
//! pixel memory. [`LinuxBackend`] implements them over fbdev; tests supply
//! their own implementations.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;
use std::ptr::NonNull;

use bitflags::bitflags;

use crate::sys::{self, FbFixScreeninfo, FbVarScreeninfo};

bitflags! {
    /// Access rights requested for a pixel memory mapping.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MapAccess: u8 {
        /// Mapping may be read.
        const READ = 1 << 0;
        /// Mapping may be written.
        const WRITE = 1 << 1;
    }
}

impl MapAccess {
    /// Converts to `PROT_*` flags for `mmap`.
    #[must_use]
    pub fn prot(self) -> libc::c_int {
        let mut prot = libc::PROT_NONE;
        if self.contains(Self::READ) {
            prot |= libc::PROT_READ;
        }
        if self.contains(Self::WRITE) {
            prot |= libc::PROT_WRITE;
        }
        prot
    }
}

/// A live mapping of device pixel memory.
///
/// Implementors own the mapping exclusively and must unmap it when dropped.
pub trait DeviceMapping {
    /// Returns the start of the mapped region.
    fn as_ptr(&self) -> NonNull<u8>;

    /// Returns the length of the mapped region in bytes.
    fn len(&self) -> usize;

    /// Returns `true` if the mapping covers no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An open display device.
///
/// Closing the device (dropping it) does not invalidate mappings obtained
/// from it.
pub trait DisplayDevice {
    /// Mapping type produced by [`map`](Self::map).
    type Mapping: DeviceMapping;

    /// Reads the immutable per-device characteristics.
    fn fixed_info(&self) -> io::Result<FbFixScreeninfo>;

    /// Reads the current mutable display configuration.
    fn var_info(&self) -> io::Result<FbVarScreeninfo>;

    /// Requests a new display configuration.
    ///
    /// On success `var` holds the configuration the device actually applied.
    fn put_var_info(&mut self, var: &mut FbVarScreeninfo) -> io::Result<()>;

    /// Maps `len` bytes of pixel memory from offset zero, shared with the device.
    fn map(&self, len: usize, access: MapAccess) -> io::Result<Self::Mapping>;
}

/// Opens display devices.
pub trait DisplayBackend {
    /// Device type returned by [`open`](Self::open).
    type Device: DisplayDevice;

    /// Opens the device at `path` for reading and writing.
    fn open(&self, path: &Path) -> io::Result<Self::Device>;
}

// ---------------------------------------------------------------------------
// Linux fbdev
// ---------------------------------------------------------------------------

/// Backend for Linux `/dev/fb*` device nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxBackend;

impl DisplayBackend for LinuxBackend {
    type Device = LinuxDevice;

    fn open(&self, path: &Path) -> io::Result<LinuxDevice> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(LinuxDevice { file })
    }
}

/// An open fbdev device node.
#[derive(Debug)]
pub struct LinuxDevice {
    file: File,
}

impl DisplayDevice for LinuxDevice {
    type Mapping = SharedMapping;

    fn fixed_info(&self) -> io::Result<FbFixScreeninfo> {
        sys::get_fixed(self.file.as_raw_fd())
    }

    fn var_info(&self) -> io::Result<FbVarScreeninfo> {
        sys::get_var(self.file.as_raw_fd())
    }

    fn put_var_info(&mut self, var: &mut FbVarScreeninfo) -> io::Result<()> {
        sys::put_var(self.file.as_raw_fd(), var)
    }

    fn map(&self, len: usize, access: MapAccess) -> io::Result<SharedMapping> {
        let addr = sys::mmap_shared(self.file.as_raw_fd(), len, access.prot())?;
        Ok(SharedMapping { addr, len })
    }
}

/// A `MAP_SHARED` mapping of fbdev pixel memory, unmapped on drop.
#[derive(Debug)]
pub struct SharedMapping {
    addr: NonNull<u8>,
    len: usize,
}

// SAFETY: SharedMapping exclusively owns its region; the raw pointer is never
// shared with another owner.
unsafe impl Send for SharedMapping {}

impl DeviceMapping for SharedMapping {
    fn as_ptr(&self) -> NonNull<u8> {
        self.addr
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl Drop for SharedMapping {
    fn drop(&mut self) {
        // SAFETY: `addr`/`len` came from a successful mmap and are unmapped
        // exactly once, here. Borrows into the region are tied to the owning
        // MappedBuffer and cannot outlive it.
        if let Err(e) = unsafe { sys::munmap(self.addr, self.len) } {
            log::warn!("fb: munmap of {} bytes failed: {e}", self.len);
        }
    }
}
