//! Page storage and logical-offset translation for [`PagedMemory`](crate::paged::PagedMemory).

use tessera_common::{Result, error::Error, result::violation, verify_arg};
use tessera_page_alloc::PageBuffer;

/// A growable list of equally sized pages.
///
/// Pages are individually allocated and never moved or resized, so the base
/// address of page `i` is fixed from the moment it is appended until the table
/// is cleared.
pub struct PageTable {
    pages: Vec<PageBuffer>,
    page_size: u64,
    page_bits: u32,
    prefer_large: bool,
}

impl PageTable {
    pub fn new(page_size: u64, prefer_large: bool) -> Result<PageTable> {
        verify_arg!(page_size, page_size.is_power_of_two());
        verify_arg!(page_size, usize::try_from(page_size).is_ok());
        Ok(PageTable {
            pages: Vec::new(),
            page_size,
            page_bits: page_size.trailing_zeros(),
            prefer_large,
        })
    }

    #[inline]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total bytes covered by the allocated pages.
    #[inline]
    pub fn capacity(&self) -> u64 {
        (self.pages.len() as u64) << self.page_bits
    }

    #[inline]
    pub fn page_index(&self, offset: u64) -> usize {
        (offset >> self.page_bits) as usize
    }

    #[inline]
    pub fn offset_in_page(&self, offset: u64) -> u64 {
        offset & (self.page_size - 1)
    }

    /// Returns the full page at `index`.
    ///
    /// # Panics
    ///
    /// Panics with a precondition violation if `index >= page_count()`.
    #[inline]
    pub fn page(&self, index: usize) -> &[u8] {
        match self.pages.get(index) {
            Some(page) => page.as_bytes(),
            None => violation(self.bad_index(index)),
        }
    }

    #[inline]
    pub fn page_mut(&mut self, index: usize) -> &mut [u8] {
        let count = self.pages.len();
        match self.pages.get_mut(index) {
            Some(page) => page.as_bytes_mut(),
            None => violation(Error::invalid_arg(
                "page_index",
                format!("{index} >= page count {count}"),
            )),
        }
    }

    /// Appends pages until at least `size` bytes are covered. Returns the number
    /// of pages added.
    pub fn ensure_capacity(&mut self, size: u64) -> Result<usize> {
        let needed = size.div_ceil(self.page_size) as usize;
        let added = needed.saturating_sub(self.pages.len());
        if added == 0 {
            return Ok(0);
        }
        self.pages.reserve(added);
        while self.pages.len() < needed {
            let page = PageBuffer::allocate(self.page_size as usize, self.prefer_large)
                .map_err(|e| Error::io("allocate page", e))?;
            log::trace!(
                "page {} allocated at {:p} ({:?})",
                self.pages.len(),
                page.as_ptr(),
                page.kind()
            );
            self.pages.push(page);
        }
        Ok(added)
    }

    /// Releases every page.
    pub fn clear(&mut self) {
        if !self.pages.is_empty() {
            log::trace!("releasing {} pages", self.pages.len());
        }
        self.pages.clear();
    }

    #[cold]
    fn bad_index(&self, index: usize) -> Error {
        Error::invalid_arg(
            "page_index",
            format!("{index} >= page count {}", self.pages.len()),
        )
    }
}

impl std::fmt::Debug for PageTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTable")
            .field("page_size", &self.page_size)
            .field("page_count", &self.pages.len())
            .field("prefer_large", &self.prefer_large)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_mapping() {
        let table = PageTable::new(64, false).unwrap();
        assert_eq!(table.page_index(0), 0);
        assert_eq!(table.page_index(63), 0);
        assert_eq!(table.page_index(64), 1);
        assert_eq!(table.offset_in_page(64), 0);
        assert_eq!(table.page_index(200), 3);
        assert_eq!(table.offset_in_page(200), 8);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(PageTable::new(100, false).is_err());
        assert!(PageTable::new(0, false).is_err());
    }

    #[test]
    fn test_ensure_capacity_appends_stable_pages() {
        let mut table = PageTable::new(64, false).unwrap();
        assert_eq!(table.ensure_capacity(1).unwrap(), 1);
        let first = table.page(0).as_ptr();
        assert_eq!(table.ensure_capacity(64).unwrap(), 0);
        assert_eq!(table.ensure_capacity(129).unwrap(), 2);
        assert_eq!(table.page_count(), 3);
        assert_eq!(table.capacity(), 192);
        assert_eq!(table.page(0).as_ptr(), first);
        assert!(table.page(2).iter().all(|&b| b == 0));
        assert_eq!(table.page(2).len(), 64);
    }

    #[test]
    fn test_clear() {
        let mut table = PageTable::new(64, false).unwrap();
        table.ensure_capacity(300).unwrap();
        table.clear();
        assert_eq!(table.page_count(), 0);
        assert_eq!(table.capacity(), 0);
    }

    #[test]
    #[should_panic(expected = "precondition violated")]
    fn test_page_out_of_range() {
        let table = PageTable::new(64, false).unwrap();
        table.page(0);
    }
}
