//! Zero-copy views over page memory.
//!
//! Every view borrows the memory instance that produced it. A value that lies
//! within one page is a plain slice; a value that straddles a page boundary is
//! a pair of slices (the tail of one page and the head of the next) plus the
//! split point. Neither form copies the value's bytes.

pub mod bytes;
pub mod utf16;
pub mod utf8;

pub use bytes::{ByteIter, ByteView, SplitBytes};
pub use utf16::Utf16View;
pub use utf8::{SplitUtf8, Utf8View};
