//! `PageBuffer`: an owned, page-aligned, zero-filled block of off-heap memory.
//!
//! Column memory is assembled from one or more page buffers. A buffer's base
//! address is fixed for its whole lifetime; only [`PageBuffer::grow`] may
//! relocate the contents, and it reports when it does so.

use std::sync::OnceLock;

use crate::mmap;

/// Kind of operating-system pages backing a [`PageBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Regular pages (typically 4 KiB).
    Regular,
    /// Large ("huge") pages (typically 2 MiB).
    Large,
}

impl PageKind {
    /// Allocation granularity and alignment for this page kind.
    pub fn page_size(self) -> usize {
        match self {
            PageKind::Regular => mmap::get_page_size(),
            PageKind::Large => mmap::get_large_page_size(),
        }
    }
}

/// An owned block of zero-initialized memory obtained from the page allocator.
///
/// The logical length (`len`) may be smaller than the mapped capacity, which is
/// always a multiple of the page size of the buffer's [`PageKind`].
pub struct PageBuffer {
    ptr: *mut u8,
    len: usize,
    capacity: usize,
    kind: PageKind,
}

impl PageBuffer {
    /// Regular page size on the current system.
    pub fn regular_page_size() -> usize {
        PageKind::Regular.page_size()
    }

    /// Large page size on the current system.
    pub fn large_page_size() -> usize {
        PageKind::Large.page_size()
    }

    /// Allocates `len` bytes from regular pages.
    pub fn allocate_regular(len: usize) -> std::io::Result<PageBuffer> {
        let (ptr, capacity) = mmap::allocate(len)?;
        log::trace!("allocated {capacity} bytes of regular pages at {ptr:p}");
        Ok(PageBuffer {
            ptr: ptr as *mut u8,
            len,
            capacity,
            kind: PageKind::Regular,
        })
    }

    /// Allocates `len` bytes from large pages.
    ///
    /// Fails when large pages are not configured on the system or the process
    /// lacks the privileges to use them.
    pub fn allocate_large(len: usize) -> std::io::Result<PageBuffer> {
        check_large_page_support()?;
        let (ptr, capacity) = mmap::allocate_large_pages(len)?;
        log::trace!("allocated {capacity} bytes of large pages at {ptr:p}");
        Ok(PageBuffer {
            ptr: ptr as *mut u8,
            len,
            capacity,
            kind: PageKind::Large,
        })
    }

    /// Allocates `len` bytes, trying large pages first when `prefer_large` is set
    /// and falling back to regular pages.
    pub fn allocate(len: usize, prefer_large: bool) -> std::io::Result<PageBuffer> {
        if prefer_large {
            match Self::allocate_large(len) {
                Ok(buf) => return Ok(buf),
                Err(e) => {
                    log::warn!("large page allocation of {len} bytes failed ({e}), using regular pages")
                }
            }
        }
        Self::allocate_regular(len)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mapped capacity in bytes; a multiple of the page size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Base address of the buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    /// Grows the logical length to `new_len`.
    ///
    /// Within capacity the buffer is resized in place and keeps its address.
    /// Beyond capacity a new, larger region is allocated, the current contents
    /// are copied over and the old region is released.
    ///
    /// Returns `true` if the contents were relocated. Shrinking requests are
    /// ignored.
    pub fn grow(&mut self, new_len: usize) -> std::io::Result<bool> {
        if new_len <= self.len {
            return Ok(false);
        }
        if new_len <= self.capacity {
            // Bytes past `len` are still zero: the region is never shrunk.
            self.len = new_len;
            return Ok(false);
        }
        let target = new_len.max(self.capacity.saturating_mul(2));
        let mut next = match self.kind {
            PageKind::Large => Self::allocate(target, true)?,
            PageKind::Regular => Self::allocate_regular(target)?,
        };
        next.as_bytes_mut()[..self.len].copy_from_slice(self.as_bytes());
        next.len = new_len;
        *self = next;
        Ok(true)
    }
}

impl Drop for PageBuffer {
    fn drop(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        log::trace!("releasing {} bytes at {:p}", self.capacity, self.ptr);
        let _ = match self.kind {
            PageKind::Large => unsafe { mmap::free_large_pages(self.ptr as _, self.capacity) },
            PageKind::Regular => unsafe { mmap::free(self.ptr as _, self.capacity) },
        };
    }
}

// SAFETY: the buffer exclusively owns its region; shared access only hands out
// `&[u8]`, mutation requires `&mut self`.
unsafe impl Send for PageBuffer {}
unsafe impl Sync for PageBuffer {}

impl std::fmt::Debug for PageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Checks once per process whether a large page can be mapped.
pub fn check_large_page_support() -> std::io::Result<()> {
    static RESULT: OnceLock<Result<(), (std::io::ErrorKind, String)>> = OnceLock::new();
    let res = RESULT.get_or_init(|| {
        mmap::try_enable_large_pages()
            .and_then(|_| probe_large_page())
            .map_err(|e| (e.kind(), e.to_string()))
    });
    match res {
        Ok(()) => Ok(()),
        Err((kind, message)) => Err(std::io::Error::new(*kind, message.clone())),
    }
}

fn probe_large_page() -> std::io::Result<()> {
    let (ptr, size) = mmap::allocate_large_pages(1)?;
    let _ = unsafe { mmap::free_large_pages(ptr, size) };
    Ok(())
}
