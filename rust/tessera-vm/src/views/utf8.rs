use std::borrow::Cow;
use std::fmt;

use super::bytes::{ByteView, SplitBytes};

/// UTF-8 varchar body stored directly in page memory.
///
/// `ascii` is the flag recorded in the varchar header; it is trusted, not
/// re-validated.
#[derive(Clone, Copy)]
pub struct Utf8View<'a> {
    bytes: ByteView<'a>,
    ascii: bool,
}

impl<'a> Utf8View<'a> {
    pub fn new(bytes: ByteView<'a>, ascii: bool) -> Utf8View<'a> {
        Utf8View { bytes, ascii }
    }

    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn is_ascii(&self) -> bool {
        self.ascii
    }

    #[inline]
    pub fn bytes(&self) -> ByteView<'a> {
        self.bytes
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    #[inline]
    pub fn byte_at(&self, index: usize) -> u8 {
        self.bytes.byte_at(index)
    }

    /// Returns the split form if the body straddles a page boundary.
    #[inline]
    pub fn as_split(&self) -> Option<SplitUtf8<'a>> {
        self.bytes.as_split().map(|bytes| SplitUtf8 {
            bytes,
            ascii: self.ascii,
        })
    }

    /// Borrows the body as `&str` when it is contiguous and valid UTF-8.
    pub fn as_str(&self) -> Option<&'a str> {
        self.bytes
            .as_contiguous()
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Returns the text, borrowing when contiguous and valid, copying otherwise.
    pub fn to_str_lossy(&self) -> Cow<'a, str> {
        match self.bytes.to_bytes() {
            Cow::Borrowed(b) => String::from_utf8_lossy(b),
            Cow::Owned(v) => match String::from_utf8(v) {
                Ok(s) => Cow::Owned(s),
                Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            },
        }
    }
}

impl fmt::Display for Utf8View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl fmt::Debug for Utf8View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utf8View")
            .field("text", &self.to_str_lossy())
            .field("ascii", &self.ascii)
            .field("split", &self.bytes.is_split())
            .finish()
    }
}

impl PartialEq for Utf8View<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Utf8View<'_> {}

impl PartialEq<[u8]> for Utf8View<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == *other
    }
}

impl PartialEq<&[u8]> for Utf8View<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes == **other
    }
}

impl PartialEq<str> for Utf8View<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == *other.as_bytes()
    }
}

impl PartialEq<&str> for Utf8View<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == *other.as_bytes()
    }
}

/// A varchar body in split form: two page segments and the split point.
///
/// A body that fits within one page is presented with an empty tail.
#[derive(Clone, Copy, Debug)]
pub struct SplitUtf8<'a> {
    bytes: SplitBytes<'a>,
    ascii: bool,
}

impl<'a> SplitUtf8<'a> {
    pub fn new(bytes: SplitBytes<'a>, ascii: bool) -> SplitUtf8<'a> {
        SplitUtf8 { bytes, ascii }
    }

    #[inline]
    pub fn head(&self) -> &'a [u8] {
        self.bytes.head()
    }

    #[inline]
    pub fn tail(&self) -> &'a [u8] {
        self.bytes.tail()
    }

    #[inline]
    pub fn split_point(&self) -> usize {
        self.bytes.split_point()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn is_ascii(&self) -> bool {
        self.ascii
    }

    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    #[inline]
    pub fn byte_at(&self, index: usize) -> u8 {
        match self.bytes.get(index) {
            Some(b) => b,
            None => panic!("index {index} out of range for {} bytes", self.size()),
        }
    }

    pub fn as_view(&self) -> Utf8View<'a> {
        let bytes = if self.bytes.tail().is_empty() {
            ByteView::Contiguous(self.bytes.head())
        } else {
            ByteView::Split(self.bytes)
        };
        Utf8View::new(bytes, self.ascii)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_borrows() {
        let view = Utf8View::new(ByteView::Contiguous("köln".as_bytes()), false);
        assert_eq!(view.size(), 5);
        assert!(!view.is_ascii());
        assert_eq!(view.as_str(), Some("köln"));
        assert!(matches!(view.to_str_lossy(), Cow::Borrowed("köln")));
        assert_eq!(view, "köln");
        assert!(view.as_split().is_none());
    }

    #[test]
    fn test_split_body() {
        let body = "abcdef".as_bytes();
        let view = Utf8View::new(ByteView::Split(SplitBytes::new(&body[..4], &body[4..])), true);
        assert_eq!(view.as_str(), None);
        assert_eq!(view.to_str_lossy(), "abcdef");
        assert_eq!(view.byte_at(5), b'f');
        assert_eq!(view, "abcdef");
        assert_eq!(view, body);

        let split = view.as_split().expect("split");
        assert_eq!(split.split_point(), 4);
        assert_eq!(split.head(), b"abcd");
        assert_eq!(split.tail(), b"ef");
        assert!(split.is_ascii());
        assert_eq!(split.as_view(), view);
    }

    #[test]
    fn test_split_multibyte_char_across_boundary() {
        let body = "aé".as_bytes();
        let view = Utf8View::new(ByteView::Split(SplitBytes::new(&body[..2], &body[2..])), false);
        assert_eq!(view.to_string(), "aé");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let view = Utf8View::new(ByteView::Contiguous(&[b'a', 0xFF]), false);
        assert_eq!(view.as_str(), None);
        assert_eq!(view.to_str_lossy(), "a\u{FFFD}");
    }

    #[test]
    fn test_empty_tail_presents_as_contiguous() {
        let split = SplitUtf8::new(SplitBytes::new(b"xyz", b""), true);
        let view = split.as_view();
        assert!(!view.bytes().is_split());
        assert_eq!(view, "xyz");
    }
}
