//! Writing column values into memory.
//!
//! Every `put_*` method extends the memory as needed and returns the offset
//! just past the written value, so records can be appended by chaining the
//! returned offsets.

use std::net::Ipv4Addr;

use bytemuck::NoUninit;
use tessera_common::{Result, error::Error};

use crate::{
    encoding::{
        MAX_VARCHAR_SIZE, NULL_BIN_LEN, NULL_STR_LEN, VarcharHeader, bin_storage_size,
        str_storage_size,
    },
    long256::Long256,
    memory::ReadableMemory,
};

pub trait WritableMemory: ReadableMemory {
    /// Mutable bytes of page `index`.
    fn page_mut(&mut self, index: usize) -> &mut [u8];

    /// Copies `bytes` to `offset`, crossing page boundaries as needed. An empty
    /// write leaves the size unchanged.
    fn put_bytes(&mut self, offset: u64, bytes: &[u8]) -> Result<u64> {
        if bytes.is_empty() {
            if self.is_closed() {
                return Err(Error::closed());
            }
            return Ok(offset);
        }
        let end = reserve(self, offset, bytes.len() as u64)?;

        let mut pos = offset;
        let mut rest = bytes;
        while !rest.is_empty() {
            let index = self.page_index(pos);
            let start = self.offset_in_page(pos) as usize;
            let page = self.page_mut(index);
            let n = (page.len() - start).min(rest.len());
            page[start..start + n].copy_from_slice(&rest[..n]);
            rest = &rest[n..];
            pos += n as u64;
        }
        Ok(end)
    }

    fn put_value<T: NoUninit>(&mut self, offset: u64, value: T) -> Result<u64>
    where
        Self: Sized,
    {
        self.put_bytes(offset, bytemuck::bytes_of(&value))
    }

    fn put_bool(&mut self, offset: u64, value: bool) -> Result<u64> {
        self.put_bytes(offset, &[value as u8])
    }

    fn put_byte(&mut self, offset: u64, value: i8) -> Result<u64> {
        self.put_bytes(offset, &value.to_ne_bytes())
    }

    fn put_short(&mut self, offset: u64, value: i16) -> Result<u64> {
        self.put_bytes(offset, &value.to_ne_bytes())
    }

    fn put_char(&mut self, offset: u64, value: u16) -> Result<u64> {
        self.put_bytes(offset, &value.to_ne_bytes())
    }

    fn put_int(&mut self, offset: u64, value: i32) -> Result<u64> {
        self.put_bytes(offset, &value.to_ne_bytes())
    }

    fn put_ipv4(&mut self, offset: u64, value: Ipv4Addr) -> Result<u64> {
        self.put_bytes(offset, &u32::from(value).to_ne_bytes())
    }

    fn put_long(&mut self, offset: u64, value: i64) -> Result<u64> {
        self.put_bytes(offset, &value.to_ne_bytes())
    }

    fn put_float(&mut self, offset: u64, value: f32) -> Result<u64> {
        self.put_bytes(offset, &value.to_ne_bytes())
    }

    fn put_double(&mut self, offset: u64, value: f64) -> Result<u64> {
        self.put_bytes(offset, &value.to_ne_bytes())
    }

    /// Writes the limbs to `offset..offset + 32`. The returned end offset is
    /// the one to pass to [`get_long256_a`](ReadableMemory::get_long256_a).
    fn put_long256(&mut self, offset: u64, value: &Long256) -> Result<u64> {
        let limbs = value.limbs();
        self.put_bytes(offset, bytemuck::bytes_of(&limbs))
    }

    /// Writes a length-prefixed UTF-16 string, or the null sentinel for `None`.
    ///
    /// The whole record is reserved before anything is written, so a failed
    /// write leaves no prefix behind.
    fn put_str(&mut self, offset: u64, value: Option<&str>) -> Result<u64> {
        let Some(s) = value else {
            return self.put_int(offset, NULL_STR_LEN);
        };
        let units: Vec<u16> = s.encode_utf16().collect();
        let len = i32::try_from(units.len())
            .map_err(|_| Error::invalid_arg("value", "string too long"))?;
        reserve(self, offset, str_storage_size(units.len()))?;
        let body = self.put_int(offset, len)?;
        self.put_bytes(body, bytemuck::cast_slice(&units))
    }

    /// Writes a length-prefixed binary value, or the null sentinel for `None`.
    fn put_bin(&mut self, offset: u64, value: Option<&[u8]>) -> Result<u64> {
        let Some(bytes) = value else {
            return self.put_long(offset, NULL_BIN_LEN);
        };
        reserve(self, offset, bin_storage_size(bytes.len()))?;
        let body = self.put_long(offset, bytes.len() as i64)?;
        self.put_bytes(body, bytes)
    }

    /// Writes a varchar header followed by the UTF-8 body, or a null header for
    /// `None`.
    fn put_varchar(&mut self, offset: u64, value: Option<&str>) -> Result<u64> {
        let Some(s) = value else {
            return self.put_int(offset, VarcharHeader::NULL.raw());
        };
        let size = u32::try_from(s.len())
            .ok()
            .filter(|&size| size <= MAX_VARCHAR_SIZE)
            .ok_or_else(|| Error::invalid_arg("value", "varchar too long"))?;
        let header = VarcharHeader::new(size, s.is_ascii());
        reserve(self, offset, header.storage_size())?;
        let body = self.put_int(offset, header.raw())?;
        self.put_bytes(body, s.as_bytes())
    }
}

/// Makes `offset..offset + len` addressable, extending the memory once if
/// needed. Returns the end offset.
fn reserve<M: WritableMemory + ?Sized>(memory: &mut M, offset: u64, len: u64) -> Result<u64> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| Error::out_of_bounds(offset, len, memory.size()))?;
    if end > memory.size() {
        memory.extend(end)?;
    }
    memory.check_range(offset, len)?;
    Ok(end)
}
