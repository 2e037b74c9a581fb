//! Configuration of a paged memory instance.

use tessera_common::{Result, verify_arg};

pub const DEFAULT_PAGE_SIZE: u64 = 1024 * 1024;

/// Smallest page that can hold any fixed-width value, including a 256-bit
/// integer, with room to spare.
pub const MIN_PAGE_SIZE: u64 = 64;

pub const DEFAULT_MAX_PAGES: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemoryConfig {
    /// Size of every page, in bytes. Must be a power of two no smaller than
    /// [`MIN_PAGE_SIZE`].
    pub page_size: u64,
    /// Upper bound on the number of pages; `extend` beyond
    /// `page_size * max_pages` bytes is rejected.
    pub max_pages: usize,
    /// Request pages from the large-page pool, falling back to regular pages
    /// when it is unavailable.
    pub use_large_pages: bool,
}

impl MemoryConfig {
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_large_pages(mut self, use_large_pages: bool) -> Self {
        self.use_large_pages = use_large_pages;
        self
    }

    /// Largest addressable size permitted by this configuration.
    pub fn max_size(&self) -> u64 {
        self.page_size.saturating_mul(self.max_pages as u64)
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(page_size, self.page_size.is_power_of_two());
        verify_arg!(page_size, self.page_size >= MIN_PAGE_SIZE);
        verify_arg!(page_size, usize::try_from(self.page_size).is_ok());
        verify_arg!(max_pages, self.max_pages > 0);
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            use_large_pages: false,
        }
    }
}
