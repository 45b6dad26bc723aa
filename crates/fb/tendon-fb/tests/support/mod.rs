//! In-memory display device that records every call made through it.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::rc::Rc;

use tendon_fb::sys::{FbBitfield, FbFixScreeninfo, FbVarScreeninfo};
use tendon_fb::{DeviceMapping, DisplayBackend, DisplayDevice, MapAccess};

/// Call counters.
#[derive(Debug, Default)]
pub struct Calls {
    pub opens: Cell<usize>,
    pub closes: Cell<usize>,
    pub fixed_queries: Cell<usize>,
    pub var_queries: Cell<usize>,
    pub puts: Cell<usize>,
    pub maps: Cell<usize>,
    pub unmaps: Cell<usize>,
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

/// Simulated display hardware.
#[derive(Debug)]
pub struct FakeDisplay {
    pub calls: Calls,
    pub fix: Cell<FbFixScreeninfo>,
    pub var: Cell<FbVarScreeninfo>,
    pub opened: RefCell<Vec<PathBuf>>,
    pub written_modes: RefCell<Vec<FbVarScreeninfo>>,
    pub last_access: Cell<Option<MapAccess>>,
    pub fail_open: bool,
    pub fail_fixed: bool,
    pub decline_put: bool,
    pub fail_map: bool,
}

impl FakeDisplay {
    pub fn new(fix: FbFixScreeninfo, var: FbVarScreeninfo) -> Self {
        Self {
            calls: Calls::default(),
            fix: Cell::new(fix),
            var: Cell::new(var),
            opened: RefCell::new(Vec::new()),
            written_modes: RefCell::new(Vec::new()),
            last_access: Cell::new(None),
            fail_open: false,
            fail_fixed: false,
            decline_put: false,
            fail_map: false,
        }
    }

    /// 1920x1080 XRGB8888 with a tightly packed 7680-byte stride.
    pub fn full_hd() -> Self {
        Self::new(
            FbFixScreeninfo {
                line_length: 7680,
                smem_len: 8_294_400,
                ..fix_with_id(b"fakefb")
            },
            var_mode(1920, 1080, 32, (16, 8), (8, 8), (0, 8)),
        )
    }

    /// 1024x768 RGB565.
    pub fn rgb565() -> Self {
        Self::new(
            FbFixScreeninfo {
                line_length: 2048,
                smem_len: 2048 * 768,
                ..fix_with_id(b"fake565")
            },
            var_mode(1024, 768, 16, (11, 5), (5, 6), (0, 5)),
        )
    }

    pub fn backend(self) -> (FakeBackend, Rc<FakeDisplay>) {
        let display = Rc::new(self);
        (FakeBackend(display.clone()), display)
    }
}

pub fn fix_with_id(id: &[u8]) -> FbFixScreeninfo {
    let mut fix = FbFixScreeninfo::default();
    fix.id[..id.len()].copy_from_slice(id);
    fix
}

pub fn var_mode(
    xres: u32,
    yres: u32,
    bpp: u32,
    red: (u32, u32),
    green: (u32, u32),
    blue: (u32, u32),
) -> FbVarScreeninfo {
    let field = |(offset, length)| FbBitfield {
        offset,
        length,
        msb_right: 0,
    };
    FbVarScreeninfo {
        xres,
        yres,
        xres_virtual: xres,
        yres_virtual: yres,
        bits_per_pixel: bpp,
        red: field(red),
        green: field(green),
        blue: field(blue),
        ..Default::default()
    }
}

/// Backend handing out [`FakeDevice`]s for one [`FakeDisplay`].
pub struct FakeBackend(pub Rc<FakeDisplay>);

impl DisplayBackend for FakeBackend {
    type Device = FakeDevice;

    fn open(&self, path: &Path) -> io::Result<FakeDevice> {
        self.0.opened.borrow_mut().push(path.to_path_buf());
        if self.0.fail_open {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        bump(&self.0.calls.opens);
        Ok(FakeDevice(self.0.clone()))
    }
}

/// An open handle; dropping it counts as a close.
pub struct FakeDevice(Rc<FakeDisplay>);

impl DisplayDevice for FakeDevice {
    type Mapping = FakeMapping;

    fn fixed_info(&self) -> io::Result<FbFixScreeninfo> {
        bump(&self.0.calls.fixed_queries);
        if self.0.fail_fixed {
            return Err(io::Error::from_raw_os_error(libc::ENOTTY));
        }
        Ok(self.0.fix.get())
    }

    fn var_info(&self) -> io::Result<FbVarScreeninfo> {
        bump(&self.0.calls.var_queries);
        Ok(self.0.var.get())
    }

    fn put_var_info(&mut self, var: &mut FbVarScreeninfo) -> io::Result<()> {
        bump(&self.0.calls.puts);
        if self.0.decline_put {
            return Err(io::Error::from_raw_os_error(libc::EINVAL));
        }
        self.0.written_modes.borrow_mut().push(*var);
        self.0.var.set(*var);
        let mut fix = self.0.fix.get();
        fix.line_length = var.xres_virtual * var.bits_per_pixel / 8;
        self.0.fix.set(fix);
        Ok(())
    }

    fn map(&self, len: usize, access: MapAccess) -> io::Result<FakeMapping> {
        bump(&self.0.calls.maps);
        self.0.last_access.set(Some(access));
        if self.0.fail_map {
            return Err(io::Error::from_raw_os_error(libc::ENOMEM));
        }
        let mem = NonNull::from(Box::leak(vec![0u8; len].into_boxed_slice()));
        Ok(FakeMapping {
            mem,
            display: self.0.clone(),
        })
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        bump(&self.0.calls.closes);
    }
}

/// Heap memory standing in for device pixel memory.
pub struct FakeMapping {
    mem: NonNull<[u8]>,
    display: Rc<FakeDisplay>,
}

impl DeviceMapping for FakeMapping {
    fn as_ptr(&self) -> NonNull<u8> {
        self.mem.cast()
    }

    fn len(&self) -> usize {
        self.mem.len()
    }
}

impl Drop for FakeMapping {
    fn drop(&mut self) {
        // SAFETY: `mem` came from `Box::leak` and is reclaimed once.
        drop(unsafe { Box::from_raw(self.mem.as_ptr()) });
        bump(&self.display.calls.unmaps);
    }
}
