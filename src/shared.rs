// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Anonymous shared memory for parent/worker state exchange.
// Regions are inherited across fork(); there is no reference counting and
// no Drop, the registrant frees them explicitly once every process that may
// touch them has stopped.

use std::mem;
use std::slice;

use crate::error::{Error, Result};
use crate::platform::posix;

/// Handle to an anonymous `MAP_SHARED` region.
///
/// Copying the handle does not copy the memory. Every copy, in every process
/// forked after [`allocate`], refers to the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedRegion {
    ptr: *mut u8,
    len: usize,
}

// Safety: the mapping is process-shared by design; synchronising access to
// its contents is the caller's responsibility.
unsafe impl Send for SharedRegion {}
unsafe impl Sync for SharedRegion {}

impl SharedRegion {
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// # Safety
    /// The region must not have been freed, and no other process may be
    /// writing to it while the slice is alive.
    pub unsafe fn as_slice(&self) -> &[u8] {
        slice::from_raw_parts(self.ptr, self.len)
    }

    /// # Safety
    /// The region must not have been freed, and the caller must be the only
    /// accessor, in any process, while the slice is alive.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn as_mut_slice(&self) -> &mut [u8] {
        slice::from_raw_parts_mut(self.ptr, self.len)
    }

    /// View the start of the region as a `T`.
    ///
    /// Intended for types that are safe to share between processes, such as
    /// atomics. Panics if `T` does not fit or the region is misaligned for it.
    ///
    /// # Safety
    /// The region must not have been freed, and its bytes must be a valid `T`
    /// (all-zero bytes for a fresh region).
    pub unsafe fn get<T>(&self) -> &T {
        assert!(
            mem::size_of::<T>() <= self.len,
            "shared region of {} bytes cannot hold a {}-byte value",
            self.len,
            mem::size_of::<T>()
        );
        assert_eq!(
            self.ptr as usize % mem::align_of::<T>(),
            0,
            "shared region is misaligned"
        );
        &*(self.ptr as *const T)
    }
}

/// Map `size` zeroed bytes shared with every process forked afterwards.
pub fn allocate(size: usize) -> Result<SharedRegion> {
    let ptr = posix::map_anonymous_shared(size).map_err(|source| Error::SharedMemory {
        op: "allocate",
        source,
    })?;
    tracing::debug!(size, "allocated shared region");
    Ok(SharedRegion { ptr, len: size })
}

/// Map a region large enough for one `T`.
pub fn allocate_for<T>() -> Result<SharedRegion> {
    allocate(mem::size_of::<T>().max(1))
}

/// Release a region.
///
/// # Safety
/// No process may access `region`, or any copy of the handle, afterwards.
/// Freeing a region twice is undefined behaviour.
pub unsafe fn free(region: SharedRegion) -> Result<()> {
    posix::unmap(region.ptr, region.len).map_err(|source| Error::SharedMemory {
        op: "free",
        source,
    })
}
