//! Column memory backed by a single buffer.

use tessera_common::{Result, error::Error};
use tessera_page_alloc::PageBuffer;

use crate::{
    memory::{ExtendPolicy, ReadableMemory},
    writer::WritableMemory,
};

/// Column memory that presents its whole address space as one page.
///
/// `page_size()` equals `size()`, so no value ever straddles a page and split
/// views are never produced. `extend` grows the buffer in place while its
/// capacity allows and otherwise moves it ([`ExtendPolicy::MayRemap`]).
pub struct ContiguousMemory {
    buffer: Option<PageBuffer>,
}

impl ContiguousMemory {
    /// Allocates a zero-filled memory of `size` bytes.
    pub fn new(size: u64) -> Result<ContiguousMemory> {
        ContiguousMemory::with_large_pages(size, false)
    }

    pub fn with_large_pages(size: u64, prefer_large: bool) -> Result<ContiguousMemory> {
        let len = to_len(size)?;
        let buffer = PageBuffer::allocate(len, prefer_large)
            .map_err(|e| Error::io("allocate contiguous memory", e))?;
        log::debug!(
            "contiguous memory opened: size={size}, capacity={}, kind={:?}",
            buffer.capacity(),
            buffer.kind()
        );
        Ok(ContiguousMemory {
            buffer: Some(buffer),
        })
    }

    /// Creates a memory holding a copy of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<ContiguousMemory> {
        let mut memory = ContiguousMemory::new(data.len() as u64)?;
        memory.put_bytes(0, data)?;
        Ok(memory)
    }

    /// Bytes that can be reached by `extend` without moving the buffer.
    pub fn capacity(&self) -> u64 {
        self.buffer.as_ref().map_or(0, |b| b.capacity() as u64)
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        match &self.buffer {
            Some(buffer) => buffer.as_bytes(),
            None => &[],
        }
    }
}

fn to_len(size: u64) -> Result<usize> {
    usize::try_from(size)
        .map_err(|_| Error::invalid_arg("size", format!("{size} is not addressable")))
}

impl ReadableMemory for ContiguousMemory {
    #[inline]
    fn size(&self) -> u64 {
        self.bytes().len() as u64
    }

    #[inline]
    fn page_count(&self) -> usize {
        self.buffer.is_some() as usize
    }

    #[inline]
    fn page_size(&self) -> u64 {
        self.size()
    }

    #[inline]
    fn page(&self, index: usize) -> &[u8] {
        if index >= self.page_count() {
            tessera_common::result::violation(Error::invalid_arg(
                "page_index",
                format!("{index} >= page count {}", self.page_count()),
            ));
        }
        self.bytes()
    }

    #[inline]
    fn page_index(&self, _offset: u64) -> usize {
        0
    }

    #[inline]
    fn offset_in_page(&self, offset: u64) -> u64 {
        offset
    }

    fn extend(&mut self, size: u64) -> Result<()> {
        let Some(buffer) = self.buffer.as_mut() else {
            return Err(Error::closed());
        };
        let old_size = buffer.len();
        let moved = buffer
            .grow(to_len(size)?)
            .map_err(|e| Error::io("grow contiguous memory", e))?;
        if buffer.len() != old_size {
            log::debug!(
                "contiguous memory extended: {old_size} -> {} bytes{}",
                buffer.len(),
                if moved { ", remapped" } else { "" }
            );
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            log::debug!("contiguous memory closed: {} bytes", buffer.len());
        }
    }

    #[inline]
    fn is_closed(&self) -> bool {
        self.buffer.is_none()
    }

    fn extend_policy(&self) -> ExtendPolicy {
        ExtendPolicy::MayRemap
    }
}

impl WritableMemory for ContiguousMemory {
    fn page_mut(&mut self, index: usize) -> &mut [u8] {
        match self.buffer.as_mut() {
            Some(buffer) if index == 0 => buffer.as_bytes_mut(),
            _ => tessera_common::result::violation(Error::invalid_arg(
                "page_index",
                format!("{index} is not a page of this memory"),
            )),
        }
    }
}

impl std::fmt::Debug for ContiguousMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContiguousMemory")
            .field("buffer", &self.buffer)
            .finish()
    }
}
