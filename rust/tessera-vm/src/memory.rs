//! The readable-memory contract.
//!
//! A [`ReadableMemory`] is a logical byte address space of [`size`](ReadableMemory::size)
//! bytes, divided into pages. Implementations provide the page table and the
//! lifecycle hooks; every typed accessor is provided on top of them.
//!
//! Accessors borrow the memory, so a returned view cannot outlive the next call
//! to [`extend`](ReadableMemory::extend) or [`close`](ReadableMemory::close),
//! both of which take `&mut self`. Within that window a view's backing
//! address does not change.
//!
//! Accessors do not return `Result`. Reading outside the addressable range,
//! reading a closed memory, or decoding a malformed length prefix is a
//! precondition violation and panics (see [`tessera_common::result::violation`]).
//! [`check_range`](ReadableMemory::check_range) and
//! [`try_read_bytes`](ReadableMemory::try_read_bytes) expose the same checks
//! as `Result` for callers that need to test a range first.

use std::fmt;
use std::net::Ipv4Addr;

use tessera_common::{
    Result,
    error::Error,
    result::{expect_valid, violation},
};

use crate::{
    encoding::{
        BIN_LEN_SIZE, LONG256_SIZE, NULL_BIN_LEN, NULL_STR_LEN, NULL_VARCHAR_SIZE, STR_LEN_SIZE,
        VarcharHeader,
    },
    long256::{Long256, Long256Acceptor, write_hex_limbs},
    scalar::decode,
    views::{ByteView, SplitBytes, SplitUtf8, Utf16View, Utf8View},
};

/// What happens to previously issued addresses when a memory is extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendPolicy {
    /// Pages are appended; existing page and value addresses stay valid.
    StableAddresses,
    /// Storage may be reallocated; all previously issued addresses are invalid.
    MayRemap,
}

/// Location of a logical offset within the page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePosition {
    pub page_index: usize,
    pub offset_in_page: u64,
    /// Readable bytes from the offset to the end of its page (bounded by `size`).
    pub remaining: u64,
}

pub trait ReadableMemory {
    /// Addressable size in bytes.
    fn size(&self) -> u64;

    fn page_count(&self) -> usize;

    fn page_size(&self) -> u64;

    /// Bytes of page `index`.
    ///
    /// # Panics
    ///
    /// Panics with a precondition violation if `index >= page_count()`.
    fn page(&self, index: usize) -> &[u8];

    /// Page holding the byte at `offset`.
    fn page_index(&self, offset: u64) -> usize;

    fn offset_in_page(&self, offset: u64) -> u64;

    /// Grows the addressable space to at least `size` bytes. New bytes are
    /// zero. Never shrinks.
    fn extend(&mut self, size: u64) -> Result<()>;

    /// Releases all storage. Idempotent.
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    fn extend_policy(&self) -> ExtendPolicy;

    /// Returns the split-view capability, if the memory can produce values
    /// that straddle pages.
    fn as_split_views(&self) -> Option<&dyn SplitViews> {
        None
    }

    fn page_address(&self, index: usize) -> *const u8 {
        self.page(index).as_ptr()
    }

    /// Resolves `offset` to its page.
    ///
    /// # Panics
    ///
    /// Panics with a precondition violation if `offset >= size()` or the
    /// memory is closed.
    fn translate(&self, offset: u64) -> PagePosition {
        expect_valid(self.check_range(offset, 1));
        let page_index = self.page_index(offset);
        let offset_in_page = self.offset_in_page(offset);
        let page_len = self.page(page_index).len() as u64;
        PagePosition {
            page_index,
            offset_in_page,
            remaining: (page_len - offset_in_page).min(self.size() - offset),
        }
    }

    /// Address of the byte at `offset`, valid for reads up to the end of its page.
    fn address_of(&self, offset: u64) -> *const u8 {
        let pos = self.translate(offset);
        self.page_address(pos.page_index)
            .wrapping_add(pos.offset_in_page as usize)
    }

    fn check_range(&self, offset: u64, len: u64) -> Result<()> {
        if self.is_closed() {
            return Err(Error::closed());
        }
        match offset.checked_add(len) {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(Error::out_of_bounds(offset, len, self.size())),
        }
    }

    /// Returns a view of `len` bytes at `offset`, split when the range crosses
    /// a page boundary. Fails if the range is not addressable or spans more
    /// than two pages.
    fn try_read_bytes(&self, offset: u64, len: usize) -> Result<ByteView<'_>> {
        self.check_range(offset, len as u64)?;
        if len == 0 {
            return Ok(ByteView::EMPTY);
        }
        let index = self.page_index(offset);
        let start = self.offset_in_page(offset) as usize;
        let page = self.page(index);
        let available = page.len() - start;
        if len <= available {
            return Ok(ByteView::Contiguous(&page[start..start + len]));
        }
        let rest = len - available;
        let next = self.page(index + 1);
        if rest > next.len() {
            return Err(Error::invalid_operation(format!(
                "read of {len} bytes at offset {offset} spans more than two pages"
            )));
        }
        Ok(ByteView::Split(SplitBytes::new(&page[start..], &next[..rest])))
    }

    /// Infallible form of [`try_read_bytes`](Self::try_read_bytes).
    #[track_caller]
    fn read_bytes(&self, offset: u64, len: usize) -> ByteView<'_> {
        expect_valid(self.try_read_bytes(offset, len))
    }

    fn get_bool(&self, offset: u64) -> bool {
        self.get_byte(offset) != 0
    }

    fn get_byte(&self, offset: u64) -> i8 {
        decode(self.read_bytes(offset, 1))
    }

    fn get_short(&self, offset: u64) -> i16 {
        decode(self.read_bytes(offset, 2))
    }

    /// A UTF-16 code unit.
    fn get_char(&self, offset: u64) -> u16 {
        decode(self.read_bytes(offset, 2))
    }

    fn get_int(&self, offset: u64) -> i32 {
        decode(self.read_bytes(offset, 4))
    }

    fn get_ipv4(&self, offset: u64) -> Ipv4Addr {
        Ipv4Addr::from(decode::<u32>(self.read_bytes(offset, 4)))
    }

    fn get_long(&self, offset: u64) -> i64 {
        decode(self.read_bytes(offset, 8))
    }

    fn get_float(&self, offset: u64) -> f32 {
        decode(self.read_bytes(offset, 4))
    }

    fn get_double(&self, offset: u64) -> f64 {
        decode(self.read_bytes(offset, 8))
    }

    /// Limbs of the 256-bit value stored in the 32 bytes that end at `offset`,
    /// least significant first.
    fn get_long256_limbs(&self, offset: u64) -> [i64; 4] {
        let Some(start) = offset.checked_sub(LONG256_SIZE) else {
            violation(Error::out_of_bounds(
                offset.wrapping_sub(LONG256_SIZE),
                LONG256_SIZE,
                self.size(),
            ))
        };
        decode(self.read_bytes(start, LONG256_SIZE as usize))
    }

    /// The 256-bit value ending at `offset`.
    fn get_long256_a(&self, offset: u64) -> Long256 {
        Long256::from_limbs(self.get_long256_limbs(offset))
    }

    /// Same as [`get_long256_a`](Self::get_long256_a); the value is independent
    /// of any value returned through the A accessor.
    fn get_long256_b(&self, offset: u64) -> Long256 {
        Long256::from_limbs(self.get_long256_limbs(offset))
    }

    /// Pushes the limbs of the 256-bit value ending at `offset` to `acceptor`
    /// in a single call.
    fn accept_long256<A>(&self, offset: u64, acceptor: &mut A) -> A::Output
    where
        A: Long256Acceptor + ?Sized,
        Self: Sized,
    {
        let [l0, l1, l2, l3] = self.get_long256_limbs(offset);
        acceptor.set_all(l0, l1, l2, l3)
    }

    /// Renders the 256-bit value ending at `offset` as hex into `sink`
    /// (see [`Long256::write_hex`]).
    fn write_long256(&self, offset: u64, sink: &mut dyn fmt::Write) -> fmt::Result {
        write_hex_limbs(&self.get_long256_limbs(offset), sink)
    }

    /// Length of the binary value at `offset`, or [`NULL_BIN_LEN`].
    fn get_bin_len(&self, offset: u64) -> i64 {
        let len = self.get_long(offset);
        if len < NULL_BIN_LEN {
            violation(Error::invalid_format(
                "binary length",
                format!("{len} at offset {offset}"),
            ));
        }
        len
    }

    /// The binary value at `offset`, or `None` for null.
    fn get_bin(&self, offset: u64) -> Option<ByteView<'_>> {
        let len = self.get_bin_len(offset);
        if len == NULL_BIN_LEN {
            return None;
        }
        let Ok(len) = usize::try_from(len) else {
            violation(Error::out_of_bounds(offset + BIN_LEN_SIZE, len as u64, self.size()))
        };
        Some(self.read_bytes(offset + BIN_LEN_SIZE, len))
    }

    /// Length in code units of the UTF-16 string at `offset`, or [`NULL_STR_LEN`].
    fn get_str_len(&self, offset: u64) -> i32 {
        let len = self.get_int(offset);
        if len < NULL_STR_LEN {
            violation(Error::invalid_format(
                "string length",
                format!("{len} at offset {offset}"),
            ));
        }
        len
    }

    fn get_str_a(&self, offset: u64) -> Option<Utf16View<'_>> {
        let len = self.get_str_len(offset);
        if len == NULL_STR_LEN {
            return None;
        }
        Some(Utf16View::new(
            self.read_bytes(offset + STR_LEN_SIZE, len as usize * 2),
        ))
    }

    fn get_str_b(&self, offset: u64) -> Option<Utf16View<'_>> {
        self.get_str_a(offset)
    }

    /// A UTF-16 view whose address stays fixed until the memory is extended
    /// or closed.
    fn get_direct_str(&self, offset: u64) -> Option<Utf16View<'_>> {
        self.get_str_a(offset)
    }

    /// Reads and decodes the varchar header at `offset`.
    fn get_varchar_header(&self, offset: u64) -> VarcharHeader {
        expect_valid(VarcharHeader::from_raw(self.get_int(offset)))
    }

    /// Varchar body of `size` bytes starting at `offset`. A `size` of
    /// [`NULL_VARCHAR_SIZE`] yields `None` without touching memory.
    fn get_varchar_a(&self, offset: u64, size: i32, ascii: bool) -> Option<Utf8View<'_>> {
        if size == NULL_VARCHAR_SIZE {
            return None;
        }
        if size < 0 {
            violation(Error::invalid_arg("size", format!("negative varchar size {size}")));
        }
        Some(Utf8View::new(self.read_bytes(offset, size as usize), ascii))
    }

    fn get_varchar_b(&self, offset: u64, size: i32, ascii: bool) -> Option<Utf8View<'_>> {
        self.get_varchar_a(offset, size, ascii)
    }
}

/// Split-form varchar accessors, offered by memories whose values may
/// straddle a page boundary.
pub trait SplitViews {
    /// The varchar body of `size` bytes at `offset` in split form. A body
    /// within one page has an empty tail. `size` is taken from a
    /// [`VarcharHeader`] as for [`ReadableMemory::get_varchar_a`]; a negative
    /// size, including the null size, is a precondition violation.
    fn borrow_utf8_split_a(&self, offset: u64, size: i32, ascii: bool) -> SplitUtf8<'_>;

    fn borrow_utf8_split_b(&self, offset: u64, size: i32, ascii: bool) -> SplitUtf8<'_>;
}

/// Returns the split-view capability of `memory`.
///
/// # Panics
///
/// Panics with a precondition violation if the memory never splits values.
#[track_caller]
pub fn require_split_views<M: ReadableMemory + ?Sized>(memory: &M) -> &dyn SplitViews {
    match memory.as_split_views() {
        Some(views) => views,
        None => violation(Error::unsupported("split varchar views")),
    }
}
