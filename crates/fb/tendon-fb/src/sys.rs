//! Raw Linux fbdev ABI.
//!
//! Mirrors of the structures in `<linux/fb.h>` and thin wrappers around the
//! ioctls and `mmap`/`munmap` calls used by [`LinuxDevice`](crate::device::LinuxDevice).
//! Nothing here knows about negotiation policy; it only moves bytes across
//! the kernel boundary.

use std::io;
use std::os::fd::RawFd;
use std::ptr::NonNull;

use libc::{c_int, c_ulong, c_void};

// ---------------------------------------------------------------------------
// Ioctl request numbers
// ---------------------------------------------------------------------------

/// Read the variable screen configuration.
pub const FBIOGET_VSCREENINFO: c_ulong = 0x4600;
/// Write the variable screen configuration.
pub const FBIOPUT_VSCREENINFO: c_ulong = 0x4601;
/// Read the fixed screen configuration.
pub const FBIOGET_FSCREENINFO: c_ulong = 0x4602;

/// `fb_fix_screeninfo.visual` value for packed true-color pixels.
pub const FB_VISUAL_TRUECOLOR: u32 = 2;

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

/// Position and width of one color channel inside a pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FbBitfield {
    /// Bit offset from the least significant bit.
    pub offset: u32,
    /// Channel width in bits.
    pub length: u32,
    /// Non-zero if the most significant bit is on the right.
    pub msb_right: u32,
}

/// Immutable per-device characteristics (`struct fb_fix_screeninfo`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FbFixScreeninfo {
    /// Driver identification string, NUL padded.
    pub id: [u8; 16],
    /// Physical start of framebuffer memory.
    pub smem_start: c_ulong,
    /// Length of framebuffer memory in bytes.
    pub smem_len: u32,
    /// `FB_TYPE_*`.
    pub type_: u32,
    /// Interleave for interleaved planes.
    pub type_aux: u32,
    /// `FB_VISUAL_*`.
    pub visual: u32,
    /// Hardware horizontal pan step, zero if unsupported.
    pub xpanstep: u16,
    /// Hardware vertical pan step, zero if unsupported.
    pub ypanstep: u16,
    /// Hardware vertical wrap step, zero if unsupported.
    pub ywrapstep: u16,
    /// Length of one scanline in bytes.
    pub line_length: u32,
    /// Physical start of the MMIO region.
    pub mmio_start: c_ulong,
    /// Length of the MMIO region.
    pub mmio_len: u32,
    /// Acceleration chip identifier.
    pub accel: u32,
    /// `FB_CAP_*`.
    pub capabilities: u16,
    /// Reserved for future use.
    pub reserved: [u16; 2],
}

impl FbFixScreeninfo {
    /// Returns the driver name with NUL padding stripped.
    pub fn id_str(&self) -> String {
        let end = self.id.iter().position(|&b| b == 0).unwrap_or(self.id.len());
        String::from_utf8_lossy(&self.id[..end]).into_owned()
    }
}

/// Mutable per-device characteristics (`struct fb_var_screeninfo`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FbVarScreeninfo {
    /// Visible horizontal resolution.
    pub xres: u32,
    /// Visible vertical resolution.
    pub yres: u32,
    /// Virtual horizontal resolution.
    pub xres_virtual: u32,
    /// Virtual vertical resolution.
    pub yres_virtual: u32,
    /// Horizontal offset from virtual to visible.
    pub xoffset: u32,
    /// Vertical offset from virtual to visible.
    pub yoffset: u32,
    /// Bits per pixel.
    pub bits_per_pixel: u32,
    /// Zero for color, one for grayscale, larger values are a FOURCC.
    pub grayscale: u32,
    /// Red channel layout.
    pub red: FbBitfield,
    /// Green channel layout.
    pub green: FbBitfield,
    /// Blue channel layout.
    pub blue: FbBitfield,
    /// Transparency channel layout.
    pub transp: FbBitfield,
    /// Non-zero for a non-standard pixel format.
    pub nonstd: u32,
    /// `FB_ACTIVATE_*`.
    pub activate: u32,
    /// Height of picture in mm.
    pub height: u32,
    /// Width of picture in mm.
    pub width: u32,
    /// Obsolete.
    pub accel_flags: u32,
    /// Pixel clock in ps.
    pub pixclock: u32,
    /// Time from sync to picture.
    pub left_margin: u32,
    /// Time from picture to sync.
    pub right_margin: u32,
    /// Time from sync to picture.
    pub upper_margin: u32,
    /// Time from picture to sync.
    pub lower_margin: u32,
    /// Length of horizontal sync.
    pub hsync_len: u32,
    /// Length of vertical sync.
    pub vsync_len: u32,
    /// `FB_SYNC_*`.
    pub sync: u32,
    /// `FB_VMODE_*`.
    pub vmode: u32,
    /// Angle of counter-clockwise rotation.
    pub rotate: u32,
    /// Colorspace for FOURCC-based modes.
    pub colorspace: u32,
    /// Reserved for future use.
    pub reserved: [u32; 4],
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// Reads the fixed screen configuration of `fd`.
pub fn get_fixed(fd: RawFd) -> io::Result<FbFixScreeninfo> {
    let mut info = FbFixScreeninfo::default();
    // SAFETY: `info` is a valid, writable `fb_fix_screeninfo` for the
    // duration of the call.
    unsafe { ioctl(fd, FBIOGET_FSCREENINFO, (&raw mut info).cast())? };
    Ok(info)
}

/// Reads the variable screen configuration of `fd`.
pub fn get_var(fd: RawFd) -> io::Result<FbVarScreeninfo> {
    let mut info = FbVarScreeninfo::default();
    // SAFETY: `info` is a valid, writable `fb_var_screeninfo`.
    unsafe { ioctl(fd, FBIOGET_VSCREENINFO, (&raw mut info).cast())? };
    Ok(info)
}

/// Writes the variable screen configuration of `fd`.
///
/// The kernel may round values it cannot honour and writes the result back
/// into `info`.
pub fn put_var(fd: RawFd, info: &mut FbVarScreeninfo) -> io::Result<()> {
    // SAFETY: `info` is a valid `fb_var_screeninfo` the kernel may update.
    unsafe { ioctl(fd, FBIOPUT_VSCREENINFO, (info as *mut FbVarScreeninfo).cast()) }
}

/// Issues `request` on `fd`.
///
/// # Safety
///
/// `arg` must point to the structure `request` expects, valid for reads and
/// writes for the duration of the call.
unsafe fn ioctl(fd: RawFd, request: c_ulong, arg: *mut c_void) -> io::Result<()> {
    // The request parameter is `c_ulong` on glibc and `c_int` on musl.
    let ret: c_int = unsafe { libc::ioctl(fd, request as _, arg) };
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Maps `len` bytes of `fd` from offset zero as a shared mapping.
pub fn mmap_shared(fd: RawFd, len: usize, prot: c_int) -> io::Result<NonNull<u8>> {
    // SAFETY: a null hint with MAP_SHARED over a valid descriptor has no
    // preconditions beyond the arguments themselves; failure is reported
    // through MAP_FAILED.
    let addr = unsafe { libc::mmap(std::ptr::null_mut(), len, prot, libc::MAP_SHARED, fd, 0) };
    if addr == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }
    NonNull::new(addr.cast::<u8>()).ok_or_else(|| io::Error::other("mmap returned a null mapping"))
}

/// Unmaps a region previously returned by [`mmap_shared`].
///
/// # Safety
///
/// `addr` and `len` must describe exactly one live mapping, and no references
/// into it may outlive this call.
pub unsafe fn munmap(addr: NonNull<u8>, len: usize) -> io::Result<()> {
    let ret = unsafe { libc::munmap(addr.as_ptr().cast(), len) };
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
