//! Off-heap page acquisition for column memory.
//!
//! [`PageBuffer`] is a zero-filled, page-aligned block obtained directly from the
//! operating system (anonymous `mmap` on Linux, the global allocator elsewhere).
//! Its base address never moves while the buffer is alive, which is what the
//! memory layer relies on to hand out zero-copy views.

pub mod page_buffer;

#[cfg_attr(target_os = "linux", path = "mmap_linux.rs")]
#[cfg_attr(not(target_os = "linux"), path = "mmap_fallback.rs")]
pub mod mmap;

pub use page_buffer::{PageBuffer, PageKind};
