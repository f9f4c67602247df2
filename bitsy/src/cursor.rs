//! Character scanner.
use std::str::Chars;

/// Forward-only cursor over source text, one character at a time.
///
/// The cursor never moves backwards. Once it has stepped past the last
/// character, [`current`](CharCursor::current) returns `None` and
/// [`advance`](CharCursor::advance) does nothing.
///
/// Offsets are `u32`, so sources must be shorter than 4 GiB. The lexer
/// rejects anything longer before scanning.
#[derive(Debug, Clone)]
pub struct CharCursor<'a> {
    /// Keep reference to the source so the lexer can
    /// slice fragments from it.
    original: &'a str,
    chars: Chars<'a>,
    /// Byte offset and value of the character under the cursor.
    current: Option<(u32, char)>,
}

impl<'a> CharCursor<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let mut chars = source_code.chars();

        // The cursor starts on the first character, so a
        // freshly built cursor can be peeked immediately.
        let current = chars.next().map(|c| (0, c));

        Self {
            original: source_code,
            chars,
            current,
        }
    }

    /// Original source code that was passed in during construction.
    #[inline]
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Peek the character under the cursor.
    ///
    /// Returns `None` when the cursor is at the end of the source.
    #[inline]
    pub fn current(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    /// Indicates whether there are characters left to consume,
    /// including the current one.
    #[inline]
    pub fn has_more(&self) -> bool {
        self.current.is_some()
    }

    /// Step to the next character.
    pub fn advance(&mut self) {
        if let Some((offset, c)) = self.current {
            let next_offset = offset + c.len_utf8() as u32;
            self.current = self.chars.next().map(|c| (next_offset, c));
        }
    }

    /// Byte position of the current character.
    ///
    /// Once the cursor is exhausted this is the length of the source.
    #[inline]
    pub fn offset(&self) -> u32 {
        match self.current {
            Some((offset, _)) => offset,
            None => self.original.len() as u32,
        }
    }

    /// Slice the source from the given byte position up to,
    /// but not including, the current character.
    #[inline]
    pub fn fragment_from(&self, start: u32) -> &'a str {
        &self.original[start as usize..self.offset() as usize]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cursor_walk() {
        let mut cursor = CharCursor::new("ab");

        assert!(cursor.has_more());
        assert_eq!(cursor.current(), Some('a'));
        assert_eq!(cursor.offset(), 0);

        cursor.advance();
        assert_eq!(cursor.current(), Some('b'));
        assert_eq!(cursor.offset(), 1);

        cursor.advance();
        assert!(!cursor.has_more());
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn test_cursor_advance_past_end() {
        let mut cursor = CharCursor::new("");
        assert!(!cursor.has_more());

        cursor.advance();
        cursor.advance();
        assert!(!cursor.has_more());
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_cursor_multibyte_offset() {
        let mut cursor = CharCursor::new("é{");
        cursor.advance();
        assert_eq!(cursor.current(), Some('{'));
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.fragment_from(0), "é");
    }
}
