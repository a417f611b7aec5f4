//! Weft Parser
//!
//! Composable text parsers: build a grammar from combinators (or from BNF
//! text), match input against it, and query the named captures.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use weft_parser::terminals::{digit, letter};
//! use weft_parser::Grammar;
//!
//! let word = letter().repeat(1).named("word");
//! let num = digit().repeat(1).named("num");
//! let grammar = Grammar::new(word & " " & num).unwrap();
//!
//! let arena = Bump::new();
//! let m = grammar.parse(&arena, "abc 123");
//! assert!(m.success());
//! assert_eq!(m["num"].text(), "123");
//! ```
//!
//! # Stages
//!
//! - [`Parser`] - authored combinator trees, cheap to clone and share
//! - [`Grammar`] - lowers a tree into a [`ParserGraph`], resolving references
//!   and rewriting left recursion; immutable afterwards and shareable
//!   between threads
//! - [`GrammarMatch`] - the outcome of one match: a capture tree of named
//!   [`Match`]es allocated in the caller's arena, plus the furthest-failure
//!   errors used for messages and autocompletion
//! - [`BnfGrammar`] - builds a grammar from BNF text
//!
//! Debug logging is enabled per module with `WEFT_LOG` (`match`, `init`,
//! `bnf`), see [`debug`].

mod autocomplete;
mod bnf;
mod charset;
pub mod constants;
mod engine;
mod error;
pub mod format;
mod grammar;
mod graph;
mod matches;
mod node;
mod number;
mod parser;
mod scanner;
pub mod terminals;
mod tracker;

// Re-export from weft-common
pub use common::debug;
pub use common::{create_logger, Logger, SourceLoc};

// Re-export public types
pub use autocomplete::find_possibilities;
pub use bnf::BnfGrammar;
pub use charset::{CharClass, CharSet};
pub use error::{BnfError, ConversionError, GrammarError, ParseError};
pub use format::{format_errors, format_match, match_to_string};
pub use grammar::{Grammar, GrammarOptions};
pub use graph::ParserGraph;
pub use matches::{ErrorEntry, GrammarMatch, Match, Value};
pub use node::{Node, NodeKind, ParserId};
pub use number::{Decimal, NumberOptions, NumberType};
pub use parser::Parser;
pub use scanner::Cursor;
pub use terminals::{BoolOptions, StringOptions};
