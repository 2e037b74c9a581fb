//! Readable paged column memory.
//!
//! Query execution reads typed column values (scalars, 256-bit integers,
//! length-prefixed binary, UTF-16 strings and UTF-8 varchars) directly out of
//! page memory through the [`ReadableMemory`] trait. Variable-length values are
//! returned as zero-copy views borrowed from the memory; a value that straddles
//! a page boundary is returned as a split view over both pages.
//!
//! Two implementations are provided:
//! - [`PagedMemory`]: equally sized pages, stable addresses across `extend`,
//!   split views supported.
//! - [`ContiguousMemory`]: a single page spanning the whole memory; `extend`
//!   may move it.
//!
//! Both implement [`WritableMemory`] for loading data.

pub mod config;
pub mod contiguous;
pub mod encoding;
pub mod long256;
pub mod memory;
pub mod page_table;
pub mod paged;
mod scalar;
pub mod views;
pub mod writer;

pub use config::MemoryConfig;
pub use contiguous::ContiguousMemory;
pub use encoding::VarcharHeader;
pub use long256::{Long256, Long256Acceptor};
pub use memory::{ExtendPolicy, PagePosition, ReadableMemory, SplitViews, require_split_views};
pub use paged::PagedMemory;
pub use views::{ByteView, SplitBytes, SplitUtf8, Utf16View, Utf8View};
pub use writer::WritableMemory;
