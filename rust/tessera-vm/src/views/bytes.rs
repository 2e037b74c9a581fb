use std::borrow::Cow;

/// Iterator over the bytes of a [`ByteView`] or [`SplitBytes`].
pub type ByteIter<'a> =
    std::iter::Copied<std::iter::Chain<std::slice::Iter<'a, u8>, std::slice::Iter<'a, u8>>>;

/// Bytes of a value that straddles a page boundary.
///
/// `head` is the end of one page and `tail` is the start of the next one.
/// Logical index `i` resolves to `head[i]` below the split point and to
/// `tail[i - split_point]` at or above it.
#[derive(Clone, Copy)]
pub struct SplitBytes<'a> {
    head: &'a [u8],
    tail: &'a [u8],
}

impl<'a> SplitBytes<'a> {
    pub fn new(head: &'a [u8], tail: &'a [u8]) -> SplitBytes<'a> {
        SplitBytes { head, tail }
    }

    /// Segment before the page boundary.
    #[inline]
    pub fn head(&self) -> &'a [u8] {
        self.head
    }

    /// Segment after the page boundary.
    #[inline]
    pub fn tail(&self) -> &'a [u8] {
        self.tail
    }

    /// Logical index of the first byte of `tail`.
    #[inline]
    pub fn split_point(&self) -> usize {
        self.head.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        match self.head.get(index) {
            Some(&b) => Some(b),
            None => self.tail.get(index - self.head.len()).copied(),
        }
    }

    #[inline]
    pub fn iter(&self) -> ByteIter<'a> {
        self.head.iter().chain(self.tail.iter()).copied()
    }

    /// Copies `dst.len()` bytes starting at logical index `start` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if the requested range exceeds the view.
    pub fn copy_range(&self, start: usize, dst: &mut [u8]) {
        let end = start + dst.len();
        assert!(end <= self.len(), "range {start}..{end} exceeds {}", self.len());
        let split = self.split_point();
        if end <= split {
            dst.copy_from_slice(&self.head[start..end]);
        } else if start >= split {
            dst.copy_from_slice(&self.tail[start - split..end - split]);
        } else {
            let (a, b) = dst.split_at_mut(split - start);
            a.copy_from_slice(&self.head[start..]);
            b.copy_from_slice(&self.tail[..end - split]);
        }
    }

    fn eq_slice(&self, other: &[u8]) -> bool {
        other.len() == self.len()
            && self.head == &other[..self.split_point()]
            && self.tail == &other[self.split_point()..]
    }
}

/// A borrowed, random-access byte sequence backed directly by page memory.
#[derive(Clone, Copy)]
pub enum ByteView<'a> {
    Contiguous(&'a [u8]),
    Split(SplitBytes<'a>),
}

impl<'a> ByteView<'a> {
    pub const EMPTY: ByteView<'static> = ByteView::Contiguous(&[]);

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            ByteView::Contiguous(b) => b.len(),
            ByteView::Split(s) => s.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_split(&self) -> bool {
        matches!(self, ByteView::Split(_))
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        match self {
            ByteView::Contiguous(b) => b.get(index).copied(),
            ByteView::Split(s) => s.get(index),
        }
    }

    /// Returns the byte at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn byte_at(&self, index: usize) -> u8 {
        match self.get(index) {
            Some(b) => b,
            None => panic!("index {index} out of range for view of {} bytes", self.len()),
        }
    }

    #[inline]
    pub fn iter(&self) -> ByteIter<'a> {
        let (head, tail) = self.segments();
        head.iter().chain(tail.iter()).copied()
    }

    /// The backing segments; the second one is empty for a contiguous view.
    #[inline]
    pub fn segments(&self) -> (&'a [u8], &'a [u8]) {
        match *self {
            ByteView::Contiguous(b) => (b, &[]),
            ByteView::Split(s) => (s.head, s.tail),
        }
    }

    #[inline]
    pub fn as_contiguous(&self) -> Option<&'a [u8]> {
        match *self {
            ByteView::Contiguous(b) => Some(b),
            ByteView::Split(_) => None,
        }
    }

    #[inline]
    pub fn as_split(&self) -> Option<SplitBytes<'a>> {
        match *self {
            ByteView::Contiguous(_) => None,
            ByteView::Split(s) => Some(s),
        }
    }

    /// Presents the view in split form; a contiguous view gets an empty tail.
    #[inline]
    pub fn into_split(self) -> SplitBytes<'a> {
        let (head, tail) = self.segments();
        SplitBytes::new(head, tail)
    }

    /// Address of the first byte.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.segments().0.as_ptr()
    }

    /// Copies `dst.len()` bytes starting at `start` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if the requested range exceeds the view.
    #[inline]
    pub fn copy_range(&self, start: usize, dst: &mut [u8]) {
        match self {
            ByteView::Contiguous(b) => dst.copy_from_slice(&b[start..start + dst.len()]),
            ByteView::Split(s) => s.copy_range(start, dst),
        }
    }

    /// Copies the whole view into `dst`, which must have the same length.
    #[inline]
    pub fn copy_to_slice(&self, dst: &mut [u8]) {
        assert_eq!(dst.len(), self.len());
        self.copy_range(0, dst);
    }

    /// Returns the bytes, borrowing when contiguous and copying when split.
    pub fn to_bytes(&self) -> Cow<'a, [u8]> {
        match *self {
            ByteView::Contiguous(b) => Cow::Borrowed(b),
            ByteView::Split(s) => {
                let mut v = Vec::with_capacity(s.len());
                v.extend_from_slice(s.head);
                v.extend_from_slice(s.tail);
                Cow::Owned(v)
            }
        }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.to_bytes().into_owned()
    }
}

impl PartialEq for ByteView<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ByteView::Contiguous(a), ByteView::Contiguous(b)) => a == b,
            (ByteView::Contiguous(a), ByteView::Split(s))
            | (ByteView::Split(s), ByteView::Contiguous(a)) => s.eq_slice(a),
            _ => self.len() == other.len() && self.iter().eq(other.iter()),
        }
    }
}

impl Eq for ByteView<'_> {}

impl PartialEq<[u8]> for ByteView<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        match self {
            ByteView::Contiguous(b) => *b == other,
            ByteView::Split(s) => s.eq_slice(other),
        }
    }
}

impl PartialEq<&[u8]> for ByteView<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        *self == **other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for ByteView<'_> {
    fn eq(&self, other: &&[u8; N]) -> bool {
        *self == other.as_slice()
    }
}

impl std::fmt::Debug for ByteView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.len())
            .field("split", &self.as_split().map(|s| s.split_point()))
            .field("bytes", &self.to_bytes())
            .finish()
    }
}

impl std::fmt::Debug for SplitBytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitBytes")
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}
