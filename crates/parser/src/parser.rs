//! Authored parser combinators.
//!
//! A [`Parser`] is an immutable, cheaply cloned handle describing how to match
//! some text. Handles compose with methods and operators:
//!
//! | Operator | Method | Meaning |
//! |---|---|---|
//! | `a & b` | [`Parser::then`] | `a` followed by `b` |
//! | `a \| b` | [`Parser::or`] | `a`, or else `b` |
//! | `-a` | `a.repeat(0)` | zero or more `a` |
//! | `!a` | [`Parser::inverse`] | complement of a set, otherwise "not followed by `a`" |
//!
//! Nothing is matched until the tree is handed to a [`Grammar`](crate::Grammar),
//! which lowers it into an arena graph.

use std::fmt;
use std::ops::{BitAnd, BitOr, Neg, Not};
use std::rc::Rc;

use crate::charset::CharSet;
use crate::number::NumberOptions;
use crate::terminals::{BoolOptions, StringOptions};

#[derive(Clone)]
pub struct Parser(pub(crate) Rc<ParserDef>);

#[derive(Clone)]
pub(crate) struct ParserDef {
    pub(crate) name: Option<String>,
    /// `None` means "register errors if named".
    pub(crate) add_error: Option<bool>,
    pub(crate) kind: ParserKind,
}

#[derive(Clone)]
pub(crate) enum ParserKind {
    /// `case_sensitive: None` inherits the grammar's default.
    Literal { value: String, case_sensitive: Option<bool> },
    Set(CharSet),
    Number(NumberOptions),
    Str(StringOptions),
    Bool(BoolOptions),
    Eol,
    End,
    Empty,
    Sequence { items: Vec<Parser>, separator: Option<Parser> },
    Alternative(Vec<Parser>),
    Repeat(RepeatDef),
    Optional(Parser),
    Except { inner: Parser, except: Parser },
    LookAhead { inner: Parser, negate: bool },
    Rule(Parser),
    Reference(String),
}

#[derive(Clone)]
pub(crate) struct RepeatDef {
    pub(crate) inner: Parser,
    pub(crate) min: usize,
    pub(crate) max: usize,
    pub(crate) until: Option<Parser>,
    pub(crate) capture_until: bool,
    pub(crate) separator: Option<Parser>,
}

impl ParserKind {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            ParserKind::Literal { .. } => "literal",
            ParserKind::Set(_) => "set",
            ParserKind::Number(_) => "number",
            ParserKind::Str(_) => "string",
            ParserKind::Bool(_) => "boolean",
            ParserKind::Eol => "eol",
            ParserKind::End => "end",
            ParserKind::Empty => "empty",
            ParserKind::Sequence { .. } => "sequence",
            ParserKind::Alternative(_) => "alternative",
            ParserKind::Repeat(_) => "repeat",
            ParserKind::Optional(_) => "optional",
            ParserKind::Except { .. } => "except",
            ParserKind::LookAhead { .. } => "lookahead",
            ParserKind::Rule(_) => "rule",
            ParserKind::Reference(_) => "reference",
        }
    }
}

impl Parser {
    pub(crate) fn from_kind(kind: ParserKind) -> Self {
        Parser(Rc::new(ParserDef { name: None, add_error: None, kind }))
    }

    pub(crate) fn def(&self) -> &ParserDef {
        &self.0
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn literal(value: impl Into<String>) -> Self {
        Self::from_kind(ParserKind::Literal { value: value.into(), case_sensitive: None })
    }

    pub fn set(set: CharSet) -> Self {
        Self::from_kind(ParserKind::Set(set))
    }

    pub fn number(options: NumberOptions) -> Self {
        Self::from_kind(ParserKind::Number(options))
    }

    pub fn string(options: StringOptions) -> Self {
        Self::from_kind(ParserKind::Str(options))
    }

    pub fn boolean(options: BoolOptions) -> Self {
        Self::from_kind(ParserKind::Bool(options))
    }

    /// Matches nothing, successfully.
    pub fn empty() -> Self {
        Self::from_kind(ParserKind::Empty)
    }

    pub fn sequence(items: impl IntoIterator<Item = Parser>) -> Self {
        Self::from_kind(ParserKind::Sequence { items: items.into_iter().collect(), separator: None })
    }

    pub fn alternative(items: impl IntoIterator<Item = Parser>) -> Self {
        Self::from_kind(ParserKind::Alternative(items.into_iter().collect()))
    }

    /// A named rule. References to `name` resolve to it.
    pub fn rule(name: impl Into<String>, body: Parser) -> Self {
        Self::from_kind(ParserKind::Rule(body)).named(name)
    }

    /// A reference to a rule or named parser, resolved when the grammar is built.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::from_kind(ParserKind::Reference(name.into()))
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// Label this parser. Matches of named parsers appear in the capture tree,
    /// and their failures are reported as errors.
    ///
    /// Naming a shared handle names a copy: other holders keep the unnamed parser.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        Rc::make_mut(&mut self.0).name = Some(name.into());
        self
    }

    /// Force error registration on or off regardless of naming.
    pub fn with_error(mut self, add_error: bool) -> Self {
        Rc::make_mut(&mut self.0).add_error = Some(add_error);
        self
    }

    /// Compare a literal ignoring case. Other parsers are returned unchanged.
    pub fn case_insensitive(mut self) -> Self {
        if matches!(self.0.kind, ParserKind::Literal { .. }) {
            if let ParserKind::Literal { case_sensitive, .. } = &mut Rc::make_mut(&mut self.0).kind {
                *case_sensitive = Some(false);
            }
        }
        self
    }

    fn is_plain(&self) -> bool {
        self.0.name.is_none() && self.0.add_error.is_none()
    }

    // =========================================================================
    // Combinators
    // =========================================================================

    /// `self` followed by `next`. Unnamed, unseparated sequences on the left
    /// are extended instead of nested.
    pub fn then(self, next: impl Into<Parser>) -> Self {
        let mut items = match &self.0.kind {
            ParserKind::Sequence { items, separator: None } if self.is_plain() => items.clone(),
            _ => vec![self],
        };
        items.push(next.into());
        Self::sequence(items)
    }

    /// `self`, or else `other`. Unnamed choices on the left are extended.
    pub fn or(self, other: impl Into<Parser>) -> Self {
        let mut items = match &self.0.kind {
            ParserKind::Alternative(items) if self.is_plain() => items.clone(),
            _ => vec![self],
        };
        items.push(other.into());
        Self::alternative(items)
    }

    /// At least `min` matches, as many as possible.
    pub fn repeat(self, min: usize) -> Self {
        self.repeat_range(min, usize::MAX)
    }

    /// Between `min` and `max` matches.
    pub fn repeat_range(self, min: usize, max: usize) -> Self {
        Self::from_kind(ParserKind::Repeat(RepeatDef {
            inner: self,
            min,
            max,
            until: None,
            capture_until: false,
            separator: None,
        }))
    }

    pub fn one_or_more(self) -> Self {
        self.repeat(1)
    }

    pub fn optional(self) -> Self {
        Self::from_kind(ParserKind::Optional(self))
    }

    /// Stop repeating where `terminator` matches, leaving it unconsumed.
    ///
    /// A parser that is not a repetition is first made one.
    pub fn until(self, terminator: impl Into<Parser>) -> Self {
        self.with_until(terminator.into(), false)
    }

    /// Like [`Parser::until`], but the terminator is consumed and becomes part
    /// of the repetition's match.
    pub fn capture_until(self, terminator: impl Into<Parser>) -> Self {
        self.with_until(terminator.into(), true)
    }

    fn with_until(self, terminator: Parser, capture: bool) -> Self {
        let mut repeat = if matches!(self.0.kind, ParserKind::Repeat(_)) { self } else { self.repeat(1) };
        if let ParserKind::Repeat(def) = &mut Rc::make_mut(&mut repeat.0).kind {
            def.until = Some(terminator);
            def.capture_until = capture;
        }
        repeat
    }

    /// Consume `separator` between the items of a sequence or the iterations
    /// of a repetition. Other parsers are returned unchanged.
    pub fn separated_by(mut self, separator: impl Into<Parser>) -> Self {
        if !matches!(self.0.kind, ParserKind::Sequence { .. } | ParserKind::Repeat(_)) {
            return self;
        }
        let separator = separator.into();
        match &mut Rc::make_mut(&mut self.0).kind {
            ParserKind::Sequence { separator: slot, .. } => *slot = Some(separator),
            ParserKind::Repeat(def) => def.separator = Some(separator),
            _ => {}
        }
        self
    }

    /// Match `self` only where `except` does not match.
    pub fn except(self, except: impl Into<Parser>) -> Self {
        Self::from_kind(ParserKind::Except { inner: self, except: except.into() })
    }

    /// Succeed without consuming anything if `self` matches here.
    pub fn lookahead(self) -> Self {
        Self::from_kind(ParserKind::LookAhead { inner: self, negate: false })
    }

    /// The complement of a character set; for any other parser, a zero-width
    /// match that succeeds only where `self` does not.
    pub fn inverse(self) -> Self {
        match &self.0.kind {
            ParserKind::Set(set) => Self::set(set.inverse()),
            _ => Self::from_kind(ParserKind::LookAhead { inner: self, negate: true }),
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.name {
            Some(name) => write!(f, "Parser({} {:?})", self.0.kind.label(), name),
            None => write!(f, "Parser({})", self.0.kind.label()),
        }
    }
}

// =============================================================================
// Conversions and operators
// =============================================================================

impl From<&str> for Parser {
    fn from(value: &str) -> Self {
        Parser::literal(value)
    }
}

impl From<String> for Parser {
    fn from(value: String) -> Self {
        Parser::literal(value)
    }
}

impl From<char> for Parser {
    fn from(value: char) -> Self {
        Parser::set(CharSet::new(&[(value, value)], false))
    }
}

impl From<CharSet> for Parser {
    fn from(set: CharSet) -> Self {
        Parser::set(set)
    }
}

impl From<&Parser> for Parser {
    fn from(parser: &Parser) -> Self {
        parser.clone()
    }
}

impl<T: Into<Parser>> BitAnd<T> for Parser {
    type Output = Parser;

    fn bitand(self, rhs: T) -> Parser {
        self.then(rhs)
    }
}

impl BitAnd<Parser> for &str {
    type Output = Parser;

    fn bitand(self, rhs: Parser) -> Parser {
        Parser::literal(self).then(rhs)
    }
}

impl<T: Into<Parser>> BitOr<T> for Parser {
    type Output = Parser;

    fn bitor(self, rhs: T) -> Parser {
        self.or(rhs)
    }
}

impl BitOr<Parser> for &str {
    type Output = Parser;

    fn bitor(self, rhs: Parser) -> Parser {
        Parser::literal(self).or(rhs)
    }
}

impl Neg for Parser {
    type Output = Parser;

    fn neg(self) -> Parser {
        self.repeat(0)
    }
}

impl Not for Parser {
    type Output = Parser;

    fn not(self) -> Parser {
        self.inverse()
    }
}
