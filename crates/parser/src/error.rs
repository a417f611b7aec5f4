//! Error types.
//!
//! A failed match is not an error: it is a [`GrammarMatch`](crate::GrammarMatch)
//! whose `success()` is false. The types here cover grammar construction,
//! value extraction and owned summaries of failed matches.

use common::SourceLoc;
use thiserror::Error;

use crate::number::NumberType;

/// Grammar construction failed. Nothing was built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("reference to undefined rule `{name}`")]
    UndefinedReference { name: String },
    #[error("grammar has no rule named `{name}`")]
    UnknownRule { name: String },
    #[error("repetition needs at least {min} but allows at most {max} matches")]
    InvalidRepeat { min: usize, max: usize },
}

/// A matched span could not be converted to the requested value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("`{text}` is not a number")]
    Malformed { text: String },
    #[error("`{text}` does not fit in {target}")]
    Overflow { text: String, target: NumberType },
    #[error("`{text}` has a fractional part and cannot become {target}")]
    Fractional { text: String, target: NumberType },
}

/// Owned description of a failed match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct ParseError {
    pub msg: String,
    pub loc: SourceLoc,
    pub source_line: String,
    /// Furthest offset at which an error-registering node failed.
    pub index: usize,
    /// Furthest offset at which any node failed.
    pub child_index: usize,
    /// Descriptions of the nodes that failed at `index`.
    pub expected: Vec<String>,
}

/// Building a grammar from BNF text failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BnfError {
    #[error("malformed BNF at {}:{}: {}", .0.loc.line, .0.loc.col, .0.msg)]
    Syntax(ParseError),
    #[error("rule `{name}` is defined more than once")]
    DuplicateRule { name: String },
    #[error("BNF text declares no rules")]
    Empty,
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}
