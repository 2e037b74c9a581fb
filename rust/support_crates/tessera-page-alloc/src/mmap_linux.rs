use std::sync::OnceLock;

/// Maps `size` bytes (rounded up to the large page size) of anonymous memory
/// backed by huge pages.
///
/// Succeeds only when the kernel has huge pages available, either reserved via
/// `/proc/sys/vm/nr_hugepages` or allowed through `nr_overcommit_hugepages`.
///
/// Returns the base pointer and the mapped capacity, which must later be passed
/// to [`free_large_pages`].
pub fn allocate_large_pages(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    map_anonymous(size, get_large_page_size(), libc::MAP_HUGETLB)
}

/// Unmaps memory obtained from [`allocate_large_pages`].
///
/// # Safety
///
/// `ptr` and `size` must be exactly the pair returned by the allocation, and the
/// region must not be accessed afterwards.
pub unsafe fn free_large_pages(ptr: *mut std::ffi::c_void, size: usize) -> std::io::Result<()> {
    unsafe { free(ptr, size) }
}

/// Huge pages are configured administratively on Linux; nothing to do per process.
pub fn try_enable_large_pages() -> std::io::Result<()> {
    Ok(())
}

/// Maps `size` bytes (rounded up to the regular page size) of zero-filled
/// anonymous memory.
pub fn allocate(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    map_anonymous(size, get_page_size(), 0)
}

/// Unmaps memory obtained from [`allocate`].
///
/// # Safety
///
/// `ptr` and `size` must be exactly the pair returned by the allocation, and the
/// region must not be accessed afterwards.
pub unsafe fn free(ptr: *mut std::ffi::c_void, size: usize) -> std::io::Result<()> {
    let res = unsafe { libc::munmap(ptr, size) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Regular page size, as reported by `sysconf(_SC_PAGESIZE)` (4 KiB if unavailable).
pub fn get_page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| read_page_size().unwrap_or(4 * 1024))
}

/// Huge page size, as reported by `/proc/meminfo` (2 MiB if unavailable).
pub fn get_large_page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| read_large_page_size().unwrap_or(2 * 1024 * 1024))
}

fn map_anonymous(
    size: usize,
    page_size: usize,
    extra_flags: libc::c_int,
) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    assert!(page_size.is_power_of_two());
    let capacity = size.max(1).next_multiple_of(page_size);
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            capacity,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | extra_flags,
            -1,
            0,
        )
    };
    if ptr.is_null() || ptr == libc::MAP_FAILED {
        return Err(std::io::Error::last_os_error());
    }
    Ok((ptr, capacity))
}

fn read_page_size() -> std::io::Result<usize> {
    let res = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if res <= 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(res as usize)
}

/// Parses the `Hugepagesize:    2048 kB` line of `/proc/meminfo`.
fn read_large_page_size() -> std::io::Result<usize> {
    let meminfo = std::fs::read_to_string("/proc/meminfo")?;
    meminfo
        .lines()
        .find_map(|line| line.strip_prefix("Hugepagesize:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse::<usize>().ok())
        .map(|kb| kb * 1024)
        .ok_or_else(|| std::io::Error::other("Hugepagesize not found in /proc/meminfo"))
}
