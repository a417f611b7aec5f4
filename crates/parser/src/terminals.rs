//! Ready-made terminal parsers and the scanning behind them.

use crate::charset::{CharClass, CharSet};
use crate::number::NumberOptions;
use crate::parser::{Parser, ParserKind};
use crate::scanner::Cursor;

pub fn literal(value: impl Into<String>) -> Parser {
    Parser::literal(value)
}

/// Any one of the characters in `chars`.
pub fn set(chars: &str) -> Parser {
    Parser::set(CharSet::of(chars))
}

/// Any character from `lo` to `hi` inclusive.
pub fn range(lo: char, hi: char) -> Parser {
    Parser::set(CharSet::new(&[(lo, hi)], false))
}

pub fn digit() -> Parser {
    Parser::set(CharSet::class(CharClass::Digit))
}

pub fn hex_digit() -> Parser {
    Parser::set(CharSet::class(CharClass::HexDigit))
}

pub fn letter() -> Parser {
    Parser::set(CharSet::class(CharClass::Letter))
}

pub fn letter_or_digit() -> Parser {
    Parser::set(CharSet::class(CharClass::LetterOrDigit))
}

/// One whitespace character, line breaks included.
pub fn whitespace() -> Parser {
    Parser::set(CharSet::class(CharClass::WhiteSpace))
}

/// One whitespace character other than a line break.
pub fn single_line_whitespace() -> Parser {
    Parser::set(CharSet::class(CharClass::SingleLineWhiteSpace))
}

pub fn punctuation() -> Parser {
    Parser::set(CharSet::class(CharClass::Punctuation))
}

pub fn control() -> Parser {
    Parser::set(CharSet::class(CharClass::Control))
}

pub fn any_char() -> Parser {
    Parser::set(CharSet::any())
}

/// `\r\n`, `\n` or `\r`.
pub fn eol() -> Parser {
    Parser::from_kind(ParserKind::Eol)
}

/// Succeeds, consuming nothing, only at the end of the input.
pub fn end() -> Parser {
    Parser::from_kind(ParserKind::End)
}

/// A delimited group such as a comment: a block running from `start` to the
/// next `end`, or, when `line` is given, `line` up to the end of the line.
/// The block form is tried first.
pub fn group(start: impl Into<Parser>, end: impl Into<Parser>, line: Option<Parser>) -> Parser {
    let end = end.into();
    let block = start.into() & any_char().repeat(0).until(end.clone()) & end;
    match line {
        Some(line) => block | (line & any_char().except(eol()).repeat(0)),
        None => block,
    }
}

pub fn number() -> Parser {
    Parser::number(NumberOptions::default())
}

pub fn string() -> Parser {
    Parser::string(StringOptions::default())
}

pub fn boolean() -> Parser {
    Parser::boolean(BoolOptions::default())
}

pub(crate) fn scan_eol(cur: Cursor<'_>) -> Option<Cursor<'_>> {
    cur.eat_literal("\r\n", true).or_else(|| cur.eat_char('\n')).or_else(|| cur.eat_char('\r'))
}

// =============================================================================
// Quoted strings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringOptions {
    /// Characters that open a string; the same character closes it.
    pub quote_characters: Vec<char>,
    /// Backslash escapes (`\n`, `\t`, `\"`, `\u00e9`, ...).
    pub allow_escape_characters: bool,
    /// A doubled quote inside the string stands for one quote.
    pub allow_double_quote: bool,
    /// Also accept a bare run of letters and digits.
    pub allow_non_quoted: bool,
}

impl Default for StringOptions {
    fn default() -> Self {
        Self {
            quote_characters: vec!['"', '\''],
            allow_escape_characters: false,
            allow_double_quote: false,
            allow_non_quoted: false,
        }
    }
}

pub(crate) fn scan_string<'a>(cur: Cursor<'a>, opts: &StringOptions) -> Option<Cursor<'a>> {
    if let Some((quote, mut at)) = cur.bump().filter(|(c, _)| opts.quote_characters.contains(c)) {
        loop {
            let (c, next) = at.bump()?;
            if c == '\\' && opts.allow_escape_characters {
                at = next.bump()?.1;
                continue;
            }
            if c == quote {
                match next.eat_char(quote) {
                    Some(after) if opts.allow_double_quote => at = after,
                    _ => return Some(next),
                }
                continue;
            }
            at = next;
        }
    }
    if opts.allow_non_quoted {
        let end = cur.eat_while(char::is_alphanumeric);
        if end.offset() > cur.offset() {
            return Some(end);
        }
    }
    None
}

/// The content of a matched string: quotes removed, escapes and doubled
/// quotes resolved.
pub(crate) fn string_value(text: &str, opts: &StringOptions) -> String {
    let quote = match text.chars().next() {
        Some(q) if opts.quote_characters.contains(&q) && text.len() >= 2 * q.len_utf8() && text.ends_with(q) => q,
        _ => return text.to_string(),
    };
    let inner = &text[quote.len_utf8()..text.len() - quote.len_utf8()];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && opts.allow_escape_characters {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('b') => out.push('\u{8}'),
                Some('f') => out.push('\u{c}'),
                Some('0') => out.push('\0'),
                Some('u') => {
                    let hex: String = chars.clone().take(4).collect();
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(decoded) if hex.len() == 4 => {
                            out.push(decoded);
                            for _ in 0..4 {
                                chars.next();
                            }
                        }
                        _ => out.push('u'),
                    }
                }
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else if c == quote && opts.allow_double_quote && chars.peek() == Some(&quote) {
            chars.next();
            out.push(quote);
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// Booleans
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolOptions {
    pub true_values: Vec<String>,
    pub false_values: Vec<String>,
    pub case_sensitive: bool,
}

impl Default for BoolOptions {
    fn default() -> Self {
        Self {
            true_values: vec!["true".to_string()],
            false_values: vec!["false".to_string()],
            case_sensitive: false,
        }
    }
}

/// First spelling (true spellings before false ones) that matches at `cur`.
pub(crate) fn scan_bool<'a>(cur: Cursor<'a>, opts: &BoolOptions) -> Option<Cursor<'a>> {
    opts.true_values
        .iter()
        .chain(&opts.false_values)
        .find_map(|spelling| cur.eat_literal(spelling, opts.case_sensitive))
}

pub(crate) fn bool_value(text: &str, opts: &BoolOptions) -> bool {
    opts.true_values.iter().any(|spelling| {
        if opts.case_sensitive { spelling == text } else { spelling.eq_ignore_ascii_case(text) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned<'a>(text: &'a str, opts: &StringOptions) -> Option<&'a str> {
        let cur = Cursor::new(text);
        scan_string(cur, opts).map(|end| cur.slice_to(end))
    }

    fn group_match(input: &str) -> Option<&str> {
        let comment = group("/*", "*/", Some(Parser::literal("//"))).named("comment");
        let grammar = crate::Grammar::build(
            comment,
            &[],
            crate::GrammarOptions { allow_partial_match: true, ..Default::default() },
        )
        .unwrap();
        let arena = bumpalo::Bump::new();
        let m = grammar.parse(&arena, input);
        m.success().then(|| &input[m.index()..m.end()])
    }

    #[test]
    fn test_group() {
        assert_eq!(group_match("/* a\n b */ x"), Some("/* a\n b */"));
        assert_eq!(group_match("/**/"), Some("/**/"));
        assert_eq!(group_match("// note\nnext"), Some("// note"));
        assert_eq!(group_match("//"), Some("//"));
        assert_eq!(group_match("/* open"), None);
        assert_eq!(group_match("x"), None);
    }

    #[test]
    fn test_eol() {
        assert_eq!(scan_eol(Cursor::new("\r\nx")).map(|c| c.offset()), Some(2));
        assert_eq!(scan_eol(Cursor::new("\nx")).map(|c| c.offset()), Some(1));
        assert_eq!(scan_eol(Cursor::new("\rx")).map(|c| c.offset()), Some(1));
        assert!(scan_eol(Cursor::new("x")).is_none());
    }

    #[test]
    fn test_quoted_string() {
        let opts = StringOptions::default();
        assert_eq!(scanned("'abc' rest", &opts), Some("'abc'"));
        assert_eq!(scanned("\"a'b\"", &opts), Some("\"a'b\""));
        assert_eq!(scanned("'unterminated", &opts), None);
        assert_eq!(scanned("bare", &opts), None);
    }

    #[test]
    fn test_escapes() {
        let opts = StringOptions { allow_escape_characters: true, ..Default::default() };
        assert_eq!(scanned(r#""a\"b" x"#, &opts), Some(r#""a\"b""#));
        assert_eq!(string_value(r#""a\"b\né""#, &opts), "a\"b\né");
        assert_eq!(string_value(r#""\uzz""#, &opts), "uzz");
    }

    #[test]
    fn test_double_quote() {
        let opts = StringOptions { allow_double_quote: true, ..Default::default() };
        assert_eq!(scanned("'it''s' x", &opts), Some("'it''s'"));
        assert_eq!(string_value("'it''s'", &opts), "it's");
    }

    #[test]
    fn test_non_quoted() {
        let opts = StringOptions { allow_non_quoted: true, ..Default::default() };
        assert_eq!(scanned("word rest", &opts), Some("word"));
        assert_eq!(string_value("word", &opts), "word");
        assert_eq!(scanned(" ", &opts), None);
    }

    #[test]
    fn test_bool() {
        let opts = BoolOptions::default();
        let cur = Cursor::new("TRUE");
        assert_eq!(scan_bool(cur, &opts).map(|c| c.offset()), Some(4));
        assert!(bool_value("TRUE", &opts));
        assert!(!bool_value("false", &opts));

        let strict = BoolOptions { case_sensitive: true, ..Default::default() };
        assert!(scan_bool(cur, &strict).is_none());
    }
}
