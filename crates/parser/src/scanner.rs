//! Read-only access to the input text.
//!
//! A [`Cursor`] is an immutable position in the input. Advancing produces a new
//! cursor, so backtracking is just keeping the old one around.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    /// A cursor at `offset`, which must lie on a character boundary.
    pub(crate) fn at(text: &'a str, offset: usize) -> Self {
        debug_assert!(text.is_char_boundary(offset));
        Self { text, offset }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.offset >= self.text.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The next character and the cursor after it.
    #[inline]
    pub fn bump(&self) -> Option<(char, Cursor<'a>)> {
        let c = self.peek()?;
        Some((c, Cursor::at(self.text, self.offset + c.len_utf8())))
    }

    /// Consume one character satisfying `pred`.
    #[inline]
    pub fn eat_if(&self, pred: impl Fn(char) -> bool) -> Option<Cursor<'a>> {
        match self.bump() {
            Some((c, next)) if pred(c) => Some(next),
            _ => None,
        }
    }

    pub fn eat_char(&self, expected: char) -> Option<Cursor<'a>> {
        self.eat_if(|c| c == expected)
    }

    /// Consume characters while `pred` holds. Never fails.
    pub fn eat_while(&self, pred: impl Fn(char) -> bool) -> Cursor<'a> {
        let len: usize = self.rest().chars().take_while(|&c| pred(c)).map(char::len_utf8).sum();
        Cursor::at(self.text, self.offset + len)
    }

    /// Consume `literal` exactly, or ignoring case.
    pub fn eat_literal(&self, literal: &str, case_sensitive: bool) -> Option<Cursor<'a>> {
        let rest = self.rest();
        if case_sensitive {
            return rest.starts_with(literal).then(|| Cursor::at(self.text, self.offset + literal.len()));
        }
        let mut consumed = 0;
        let mut input = rest.chars();
        for expected in literal.chars() {
            let c = input.next()?;
            if c != expected && !c.to_lowercase().eq(expected.to_lowercase()) {
                return None;
            }
            consumed += c.len_utf8();
        }
        Some(Cursor::at(self.text, self.offset + consumed))
    }

    /// Text between this cursor and a later one.
    pub fn slice_to(&self, end: Cursor<'a>) -> &'a str {
        &self.text[self.offset..end.offset.max(self.offset)]
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({})", self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_and_eof() {
        let cur = Cursor::new("hé");
        let (c, next) = cur.bump().unwrap();
        assert_eq!(c, 'h');
        let (c, next) = next.bump().unwrap();
        assert_eq!(c, 'é');
        assert_eq!(next.offset(), 3);
        assert!(next.is_eof());
        assert!(next.bump().is_none());
        // The original cursor is untouched.
        assert_eq!(cur.offset(), 0);
    }

    #[test]
    fn test_eat_literal() {
        let cur = Cursor::new("Hello world");
        assert!(cur.eat_literal("hello", true).is_none());
        assert_eq!(cur.eat_literal("Hello", true).unwrap().offset(), 5);
        assert_eq!(cur.eat_literal("HELLO", false).unwrap().offset(), 5);
        assert!(cur.eat_literal("Hello world!", false).is_none());
    }

    #[test]
    fn test_eat_while_and_slice() {
        let cur = Cursor::new("123abc");
        let end = cur.eat_while(|c| c.is_ascii_digit());
        assert_eq!(cur.slice_to(end), "123");
        assert_eq!(end.rest(), "abc");
        assert_eq!(end.eat_while(|c| c.is_ascii_digit()), end);
    }
}
