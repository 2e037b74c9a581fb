//! Column memory made of equally sized, individually allocated pages.

use tessera_common::{Result, error::Error, result::violation};

use crate::{
    config::MemoryConfig,
    memory::{ExtendPolicy, ReadableMemory, SplitViews},
    page_table::PageTable,
    views::SplitUtf8,
    writer::WritableMemory,
};

/// Paged column memory.
///
/// `extend` appends zero-filled pages and never moves existing ones
/// ([`ExtendPolicy::StableAddresses`]). Values may straddle two adjacent pages
/// and are then returned as split views.
pub struct PagedMemory {
    table: PageTable,
    size: u64,
    max_pages: usize,
    closed: bool,
}

impl PagedMemory {
    /// Creates an empty memory; call [`extend`](ReadableMemory::extend) to make
    /// it addressable.
    pub fn new(config: &MemoryConfig) -> Result<PagedMemory> {
        config.validate()?;
        let table = PageTable::new(config.page_size, config.use_large_pages)?;
        log::debug!(
            "paged memory opened: page_size={}, max_pages={}, large_pages={}",
            config.page_size,
            config.max_pages,
            config.use_large_pages
        );
        Ok(PagedMemory {
            table,
            size: 0,
            max_pages: config.max_pages,
            closed: false,
        })
    }

    pub fn with_page_size(page_size: u64) -> Result<PagedMemory> {
        PagedMemory::new(&MemoryConfig::default().with_page_size(page_size))
    }

    /// Creates a memory holding a copy of `data`.
    pub fn from_bytes(config: &MemoryConfig, data: &[u8]) -> Result<PagedMemory> {
        let mut memory = PagedMemory::new(config)?;
        memory.put_bytes(0, data)?;
        Ok(memory)
    }

    pub fn max_size(&self) -> u64 {
        self.table.page_size().saturating_mul(self.max_pages as u64)
    }
}

impl ReadableMemory for PagedMemory {
    #[inline]
    fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    fn page_count(&self) -> usize {
        self.table.page_count()
    }

    #[inline]
    fn page_size(&self) -> u64 {
        self.table.page_size()
    }

    #[inline]
    fn page(&self, index: usize) -> &[u8] {
        self.table.page(index)
    }

    #[inline]
    fn page_index(&self, offset: u64) -> usize {
        self.table.page_index(offset)
    }

    #[inline]
    fn offset_in_page(&self, offset: u64) -> u64 {
        self.table.offset_in_page(offset)
    }

    fn extend(&mut self, size: u64) -> Result<()> {
        if self.closed {
            return Err(Error::closed());
        }
        if size <= self.size {
            return Ok(());
        }
        if size > self.max_size() {
            return Err(Error::invalid_arg(
                "size",
                format!("{size} exceeds the limit of {} bytes", self.max_size()),
            ));
        }
        let added = self.table.ensure_capacity(size)?;
        log::debug!(
            "paged memory extended: {} -> {} bytes, {} pages (+{added})",
            self.size,
            size,
            self.table.page_count()
        );
        self.size = size;
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        log::debug!(
            "paged memory closed: {} bytes, {} pages",
            self.size,
            self.table.page_count()
        );
        self.table.clear();
        self.size = 0;
        self.closed = true;
    }

    #[inline]
    fn is_closed(&self) -> bool {
        self.closed
    }

    fn extend_policy(&self) -> ExtendPolicy {
        ExtendPolicy::StableAddresses
    }

    fn as_split_views(&self) -> Option<&dyn SplitViews> {
        Some(self)
    }
}

impl SplitViews for PagedMemory {
    fn borrow_utf8_split_a(&self, offset: u64, size: i32, ascii: bool) -> SplitUtf8<'_> {
        let Ok(len) = usize::try_from(size) else {
            violation(Error::invalid_arg("size", format!("negative varchar size {size}")));
        };
        SplitUtf8::new(self.read_bytes(offset, len).into_split(), ascii)
    }

    fn borrow_utf8_split_b(&self, offset: u64, size: i32, ascii: bool) -> SplitUtf8<'_> {
        self.borrow_utf8_split_a(offset, size, ascii)
    }
}

impl WritableMemory for PagedMemory {
    #[inline]
    fn page_mut(&mut self, index: usize) -> &mut [u8] {
        self.table.page_mut(index)
    }
}

impl std::fmt::Debug for PagedMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedMemory")
            .field("size", &self.size)
            .field("table", &self.table)
            .field("max_pages", &self.max_pages)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encoding::NULL_VARCHAR_SIZE, memory::require_split_views};
    use tessera_common::error::ErrorKind;

    fn small() -> PagedMemory {
        PagedMemory::with_page_size(64).unwrap()
    }

    #[test]
    fn test_extend_rounds_to_pages() {
        let mut mem = small();
        assert_eq!(mem.size(), 0);
        assert_eq!(mem.page_count(), 0);
        mem.extend(65).unwrap();
        assert_eq!(mem.size(), 65);
        assert_eq!(mem.page_count(), 2);
        mem.extend(10).unwrap();
        assert_eq!(mem.size(), 65);
    }

    #[test]
    fn test_extend_keeps_page_addresses() {
        let mut mem = small();
        mem.extend(64).unwrap();
        let base = mem.page_address(0);
        mem.extend(64 * 10).unwrap();
        assert_eq!(mem.page_address(0), base);
        assert_eq!(mem.extend_policy(), ExtendPolicy::StableAddresses);
    }

    #[test]
    fn test_extend_limit() {
        let config = MemoryConfig::default().with_page_size(64).with_max_pages(2);
        let mut mem = PagedMemory::new(&config).unwrap();
        mem.extend(128).unwrap();
        let err = mem.extend(129).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert_eq!(mem.size(), 128);
    }

    #[test]
    fn test_invalid_config() {
        assert!(PagedMemory::with_page_size(48).is_err());
    }

    #[test]
    fn test_from_bytes_spans_pages() {
        let data: Vec<u8> = (0..200u8).collect();
        let config = MemoryConfig::default().with_page_size(64);
        let mem = PagedMemory::from_bytes(&config, &data).unwrap();
        assert_eq!(mem.size(), 200);
        assert_eq!(mem.page_count(), 4);
        assert_eq!(mem.read_bytes(0, 200), data.as_slice());
        assert_eq!(mem.page(1)[0], 64);
    }

    #[test]
    fn test_split_views_capability() {
        let mut mem = small();
        mem.put_bytes(60, b"abcdefgh").unwrap();
        let views = mem.as_split_views().expect("paged memory splits");
        let split = views.borrow_utf8_split_a(60, 8, true);
        assert_eq!(split.split_point(), 4);
        assert_eq!(split.head(), b"abcd");
        assert_eq!(split.tail(), b"efgh");

        let whole = views.borrow_utf8_split_b(0, 4, true);
        assert!(whole.tail().is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid argument size")]
    fn test_split_view_rejects_null_size() {
        let mut mem = small();
        mem.put_bytes(0, b"abcd").unwrap();
        require_split_views(&mem).borrow_utf8_split_a(0, NULL_VARCHAR_SIZE, true);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut mem = small();
        mem.extend(100).unwrap();
        mem.close();
        mem.close();
        assert!(mem.is_closed());
        assert_eq!(mem.size(), 0);
        assert_eq!(mem.page_count(), 0);
        assert!(matches!(mem.extend(1).unwrap_err().kind(), ErrorKind::Closed));
    }
}
