//! Page allocation emulated on top of the global allocator, for targets
//! without a native anonymous-mapping implementation.

use std::alloc::{Layout, alloc_zeroed, dealloc};

/// Allocates zeroed memory aligned to the emulated large page size.
pub fn allocate_large_pages(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    allocate_aligned(size, get_large_page_size())
}

/// Releases memory obtained from [`allocate_large_pages`].
///
/// # Safety
///
/// `ptr` and `size` must be exactly the pair returned by the allocation.
pub unsafe fn free_large_pages(ptr: *mut std::ffi::c_void, size: usize) -> std::io::Result<()> {
    unsafe { free_aligned(ptr, size, get_large_page_size()) }
}

pub fn try_enable_large_pages() -> std::io::Result<()> {
    Ok(())
}

/// Allocates zeroed memory aligned to the emulated page size.
pub fn allocate(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    allocate_aligned(size, get_page_size())
}

/// Releases memory obtained from [`allocate`].
///
/// # Safety
///
/// `ptr` and `size` must be exactly the pair returned by the allocation.
pub unsafe fn free(ptr: *mut std::ffi::c_void, size: usize) -> std::io::Result<()> {
    unsafe { free_aligned(ptr, size, get_page_size()) }
}

pub fn get_large_page_size() -> usize {
    2 * 1024 * 1024
}

pub fn get_page_size() -> usize {
    4 * 1024
}

fn layout(capacity: usize, page_size: usize) -> std::io::Result<Layout> {
    Layout::from_size_align(capacity, page_size)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid page layout"))
}

fn allocate_aligned(
    size: usize,
    page_size: usize,
) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    let capacity = size.max(1).next_multiple_of(page_size);
    let ptr = unsafe { alloc_zeroed(layout(capacity, page_size)?) };
    if ptr.is_null() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::OutOfMemory,
            "failed to allocate pages",
        ));
    }
    Ok((ptr as *mut std::ffi::c_void, capacity))
}

unsafe fn free_aligned(
    ptr: *mut std::ffi::c_void,
    size: usize,
    page_size: usize,
) -> std::io::Result<()> {
    assert!(size.is_multiple_of(page_size));
    let layout = layout(size, page_size)?;
    unsafe { dealloc(ptr as *mut u8, layout) };
    Ok(())
}
