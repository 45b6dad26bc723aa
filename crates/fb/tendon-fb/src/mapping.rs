//! Exclusive ownership of mapped pixel memory.

use std::fmt;
use std::slice;

use crate::device::{DeviceMapping, MapAccess, SharedMapping};

/// Pixel memory shared with the display hardware.
///
/// Not `Clone`: there is exactly one owner per mapping, and the region is
/// unmapped when that owner is dropped. The hardware may scan the memory out
/// at any time, so writers must tolerate tearing.
pub struct MappedBuffer<M: DeviceMapping = SharedMapping> {
    mapping: M,
    access: MapAccess,
}

impl<M: DeviceMapping> MappedBuffer<M> {
    /// Takes ownership of `mapping`, which was created with `access`.
    pub fn new(mapping: M, access: MapAccess) -> Self {
        Self { mapping, access }
    }

    /// Returns the length of the region in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns `true` if the region is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Returns the access rights the region was mapped with.
    #[must_use]
    pub fn access(&self) -> MapAccess {
        self.access
    }

    /// Returns a raw pointer to the start of the region.
    ///
    /// Always available, including for write-only mappings, where it is the
    /// only way in. Writes through it must stay within [`len`](Self::len)
    /// bytes and must not outlive `self`.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.mapping.as_ptr().as_ptr()
    }

    /// Returns the region as a byte slice, or `None` if it is not readable.
    #[must_use]
    pub fn as_slice(&self) -> Option<&[u8]> {
        if !self.access.contains(MapAccess::READ) {
            return None;
        }
        // SAFETY: the mapping is readable, `len` bytes long, and lives as
        // long as `self`.
        Some(unsafe { slice::from_raw_parts(self.mapping.as_ptr().as_ptr(), self.len()) })
    }

    /// Returns the region as a mutable byte slice, or `None` unless it is
    /// both readable and writable.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        if !self.access.contains(MapAccess::READ | MapAccess::WRITE) {
            return None;
        }
        // SAFETY: the mapping is readable and writable, `len` bytes long,
        // and exclusively borrowed through `self`.
        Some(unsafe { slice::from_raw_parts_mut(self.mapping.as_ptr().as_ptr(), self.len()) })
    }

    /// Gives up the region.
    ///
    /// Consuming `self` drops the underlying mapping, and dropping the
    /// mapping is what unmaps it.
    pub fn release(self) {
        log::debug!("fb: releasing {} byte mapping", self.len());
    }
}

impl<M: DeviceMapping> fmt::Debug for MappedBuffer<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedBuffer")
            .field("addr", &self.mapping.as_ptr())
            .field("len", &self.len())
            .field("access", &self.access)
            .finish()
    }
}
