//! Length prefixes, null sentinels and the varchar header of the column
//! encodings read by this crate. All values are in native byte order.

use tessera_common::{Result, error::Error};

/// Length prefix of a UTF-16 string, in code units.
pub const STR_LEN_SIZE: u64 = 4;

/// Length prefix of a binary value, in bytes.
pub const BIN_LEN_SIZE: u64 = 8;

pub const VARCHAR_HEADER_SIZE: u64 = 4;

pub const LONG256_SIZE: u64 = 32;

pub const NULL_STR_LEN: i32 = -1;

pub const NULL_BIN_LEN: i64 = -1;

/// Varchar size that stands for a null value, both in the header and in the
/// `size` argument of the varchar accessors.
pub const NULL_VARCHAR_SIZE: i32 = -1;

/// Largest body size a varchar header can describe.
pub const MAX_VARCHAR_SIZE: u32 = (i32::MAX >> 1) as u32;

/// Bytes occupied by a UTF-16 string of `len` code units, prefix included.
#[inline]
pub fn str_storage_size(len: usize) -> u64 {
    STR_LEN_SIZE + 2 * len as u64
}

/// Bytes occupied by a binary value of `len` bytes, prefix included.
#[inline]
pub fn bin_storage_size(len: usize) -> u64 {
    BIN_LEN_SIZE + len as u64
}

/// The 32-bit varchar header: `-1` for null, otherwise `(size << 1) | ascii`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarcharHeader(i32);

impl VarcharHeader {
    pub const NULL: VarcharHeader = VarcharHeader(NULL_VARCHAR_SIZE);

    /// # Panics
    ///
    /// Panics if `size` exceeds [`MAX_VARCHAR_SIZE`].
    pub fn new(size: u32, ascii: bool) -> VarcharHeader {
        assert!(size <= MAX_VARCHAR_SIZE, "varchar size {size} too large");
        VarcharHeader(((size << 1) | ascii as u32) as i32)
    }

    pub fn from_raw(raw: i32) -> Result<VarcharHeader> {
        if raw < NULL_VARCHAR_SIZE {
            return Err(Error::invalid_format(
                "varchar header",
                format!("negative header {raw}"),
            ));
        }
        Ok(VarcharHeader(raw))
    }

    #[inline]
    pub fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == NULL_VARCHAR_SIZE
    }

    /// Body size in bytes, or [`NULL_VARCHAR_SIZE`] for null. This is the value
    /// the varchar accessors take as their `size` argument.
    #[inline]
    pub fn size(self) -> i32 {
        if self.is_null() { NULL_VARCHAR_SIZE } else { self.0 >> 1 }
    }

    #[inline]
    pub fn is_ascii(self) -> bool {
        !self.is_null() && self.0 & 1 == 1
    }

    /// Bytes occupied by the record, header included.
    #[inline]
    pub fn storage_size(self) -> u64 {
        VARCHAR_HEADER_SIZE + self.size().max(0) as u64
    }
}
