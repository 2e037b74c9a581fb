use std::fmt::{self, Write};

use super::bytes::ByteView;

/// UTF-16 text stored as native-order code units directly in page memory.
#[derive(Clone, Copy)]
pub struct Utf16View<'a> {
    bytes: ByteView<'a>,
}

impl<'a> Utf16View<'a> {
    /// Wraps the body bytes of a UTF-16 value. `bytes` must hold a whole number
    /// of code units.
    pub fn new(bytes: ByteView<'a>) -> Utf16View<'a> {
        debug_assert!(bytes.len().is_multiple_of(2));
        Utf16View { bytes }
    }

    /// Length in code units.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn bytes(&self) -> ByteView<'a> {
        self.bytes
    }

    #[inline]
    pub fn is_split(&self) -> bool {
        self.bytes.is_split()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Returns the code unit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn char_at(&self, index: usize) -> u16 {
        assert!(index < self.len(), "index {index} out of range for {} chars", self.len());
        let mut unit = [0u8; 2];
        self.bytes.copy_range(index * 2, &mut unit);
        u16::from_ne_bytes(unit)
    }

    pub fn code_units(&self) -> impl Iterator<Item = u16> + 'a {
        let view = *self;
        (0..view.len()).map(move |i| view.char_at(i))
    }

    /// Decodes the text, replacing unpaired surrogates with U+FFFD.
    pub fn chars(&self) -> impl Iterator<Item = char> + 'a {
        char::decode_utf16(self.code_units())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    pub fn eq_str(&self, s: &str) -> bool {
        self.code_units().eq(s.encode_utf16())
    }
}

impl fmt::Display for Utf16View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars() {
            f.write_char(c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Utf16View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string(), f)
    }
}

impl PartialEq for Utf16View<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Utf16View<'_> {}

impl PartialEq<str> for Utf16View<'_> {
    fn eq(&self, other: &str) -> bool {
        self.eq_str(other)
    }
}

impl PartialEq<&str> for Utf16View<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.eq_str(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::bytes::SplitBytes;

    fn encode(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_ne_bytes()).collect()
    }

    #[test]
    fn test_contiguous_text() {
        let data = encode("héllo");
        let view = Utf16View::new(ByteView::Contiguous(&data));
        assert_eq!(view.len(), 5);
        assert_eq!(view.char_at(1), 'é' as u16);
        assert_eq!(view, "héllo");
        assert_eq!(view.to_string(), "héllo");
        assert_eq!(format!("{view:?}"), "\"héllo\"");
    }

    #[test]
    fn test_split_inside_code_unit() {
        let data = encode("split");
        // Boundary falls in the middle of the third code unit.
        let view = Utf16View::new(ByteView::Split(SplitBytes::new(&data[..5], &data[5..])));
        assert!(view.is_split());
        assert_eq!(view.char_at(2), 'l' as u16);
        assert_eq!(view, "split");
        assert_eq!(view, Utf16View::new(ByteView::Contiguous(&data)));
    }

    #[test]
    fn test_surrogate_pairs_and_lossy_decoding() {
        let data = encode("a😀b");
        let view = Utf16View::new(ByteView::Contiguous(&data));
        assert_eq!(view.len(), 4);
        assert_eq!(view.to_string(), "a😀b");

        let lone: Vec<u8> = [0xD800u16, 'x' as u16]
            .iter()
            .flat_map(|u| u.to_ne_bytes())
            .collect();
        let view = Utf16View::new(ByteView::Contiguous(&lone));
        assert_eq!(view.to_string(), "\u{FFFD}x");
    }

    #[test]
    fn test_empty() {
        let view = Utf16View::new(ByteView::EMPTY);
        assert!(view.is_empty());
        assert_eq!(view, "");
        assert_ne!(view, "a");
    }

    #[test]
    #[should_panic]
    fn test_char_at_out_of_range() {
        let data = encode("ab");
        Utf16View::new(ByteView::Contiguous(&data)).char_at(2);
    }
}
