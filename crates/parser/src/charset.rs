//! Character sets used by single-character terminals.

use std::fmt;

/// Named character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Digit,
    HexDigit,
    Letter,
    LetterOrDigit,
    /// Any whitespace, including line breaks.
    WhiteSpace,
    /// Whitespace other than `\r` and `\n`.
    SingleLineWhiteSpace,
    Punctuation,
    Control,
}

impl CharClass {
    pub fn contains(self, c: char) -> bool {
        match self {
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::HexDigit => c.is_ascii_hexdigit(),
            CharClass::Letter => c.is_alphabetic(),
            CharClass::LetterOrDigit => c.is_alphanumeric(),
            CharClass::WhiteSpace => c.is_whitespace(),
            CharClass::SingleLineWhiteSpace => c.is_whitespace() && c != '\n' && c != '\r',
            CharClass::Punctuation => c.is_ascii_punctuation(),
            CharClass::Control => c.is_control(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CharClass::Digit => "digit",
            CharClass::HexDigit => "hex digit",
            CharClass::Letter => "letter",
            CharClass::LetterOrDigit => "letter or digit",
            CharClass::WhiteSpace => "whitespace",
            CharClass::SingleLineWhiteSpace => "single-line whitespace",
            CharClass::Punctuation => "punctuation",
            CharClass::Control => "control character",
        }
    }
}

/// A set of characters made of ranges and classes, optionally negated.
///
/// Membership of characters below 256 that fall in a range is answered from a
/// bitmap; everything else scans the ranges and classes.
#[derive(Clone, PartialEq, Eq)]
pub struct CharSet {
    bitmap: [u64; 4],
    ranges: Vec<(char, char)>,
    classes: Vec<CharClass>,
    negated: bool,
}

impl CharSet {
    pub fn new(ranges: &[(char, char)], negated: bool) -> Self {
        let mut set = Self { bitmap: [0; 4], ranges: Vec::new(), classes: Vec::new(), negated };
        for &(lo, hi) in ranges {
            set.add_range(lo, hi);
        }
        set
    }

    /// The set of exactly the characters in `chars`.
    pub fn of(chars: &str) -> Self {
        let mut set = Self::new(&[], false);
        for c in chars.chars() {
            set.add_range(c, c);
        }
        set
    }

    pub fn class(class: CharClass) -> Self {
        Self::new(&[], false).with_class(class)
    }

    /// Every character. Built as the negation of the empty set.
    pub fn any() -> Self {
        Self::new(&[], true)
    }

    pub fn with_class(mut self, class: CharClass) -> Self {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn with_range(mut self, lo: char, hi: char) -> Self {
        self.add_range(lo, hi);
        self
    }

    fn add_range(&mut self, lo: char, hi: char) {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        for code in (lo as u32)..=(hi as u32).min(255) {
            self.bitmap[(code / 64) as usize] |= 1u64 << (code % 64);
        }
        self.ranges.push((lo, hi));
    }

    /// The complement of this set.
    pub fn inverse(&self) -> Self {
        Self { negated: !self.negated, ..self.clone() }
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    #[inline]
    pub fn contains(&self, c: char) -> bool {
        let code = c as u32;
        let in_ranges = if code < 256 {
            self.bitmap[(code / 64) as usize] & (1u64 << (code % 64)) != 0
        } else {
            self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi)
        };
        let in_set = in_ranges || self.classes.iter().any(|class| class.contains(c));
        in_set != self.negated
    }
}

impl fmt::Debug for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ranges.is_empty() && self.classes.len() == 1 && !self.negated {
            return f.write_str(self.classes[0].name());
        }
        if self.ranges.is_empty() && self.classes.is_empty() && self.negated {
            return f.write_str("any character");
        }
        f.write_str(if self.negated { "[^" } else { "[" })?;
        for &(lo, hi) in &self.ranges {
            if lo == hi {
                write!(f, "{}", lo.escape_debug())?;
            } else {
                write!(f, "{}-{}", lo.escape_debug(), hi.escape_debug())?;
            }
        }
        for class in &self.classes {
            write!(f, "<{}>", class.name())?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        let set = CharSet::new(&[('a', 'f'), ('0', '9')], false);
        assert!(set.contains('a'));
        assert!(set.contains('5'));
        assert!(!set.contains('g'));
    }

    #[test]
    fn test_reversed_range_is_normalized() {
        let set = CharSet::new(&[('z', 'x')], false);
        assert!(set.contains('y'));
    }

    #[test]
    fn test_non_ascii_ranges() {
        let set = CharSet::new(&[('α', 'ω')], false);
        assert!(set.contains('λ'));
        assert!(!set.contains('a'));
        assert!(set.inverse().contains('a'));
        assert!(!set.inverse().contains('λ'));
    }

    #[test]
    fn test_classes() {
        let ws = CharSet::class(CharClass::SingleLineWhiteSpace);
        assert!(ws.contains(' '));
        assert!(ws.contains('\t'));
        assert!(!ws.contains('\n'));
        assert!(CharSet::class(CharClass::WhiteSpace).contains('\n'));
        assert!(CharSet::class(CharClass::LetterOrDigit).contains('é'));
        assert!(!CharSet::class(CharClass::Digit).contains('x'));
    }

    #[test]
    fn test_any() {
        let any = CharSet::any();
        assert!(any.contains('x'));
        assert!(any.contains('\u{1F600}'));
        assert_eq!(any.to_string(), "any character");
    }

    #[test]
    fn test_display() {
        assert_eq!(CharSet::of(")").inverse().to_string(), "[^)]");
        assert_eq!(CharSet::class(CharClass::Digit).to_string(), "digit");
        assert_eq!(CharSet::new(&[('a', 'z')], false).to_string(), "[a-z]");
    }
}
