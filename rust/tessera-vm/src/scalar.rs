//! Fixed-width value decoding from page views.

use bytemuck::AnyBitPattern;

use crate::views::ByteView;

/// Widest fixed-width value read through [`decode`].
const MAX_SCALAR_SIZE: usize = 32;

/// Decodes a native-order `T` from a view of exactly `size_of::<T>()` bytes.
///
/// A value that straddles a page boundary is assembled in a stack buffer.
#[inline]
pub(crate) fn decode<T: AnyBitPattern>(view: ByteView<'_>) -> T {
    match view {
        ByteView::Contiguous(bytes) => bytemuck::pod_read_unaligned(bytes),
        ByteView::Split(split) => {
            let size = std::mem::size_of::<T>();
            debug_assert!(size <= MAX_SCALAR_SIZE);
            let mut buf = [0u8; MAX_SCALAR_SIZE];
            split.copy_range(0, &mut buf[..size]);
            bytemuck::pod_read_unaligned(&buf[..size])
        }
    }
}
