//! Nodes of an initialized parser graph.

use std::fmt;

use crate::charset::CharSet;
use crate::number::NumberOptions;
use crate::terminals::{BoolOptions, StringOptions};

/// Handle of a node inside a [`ParserGraph`](crate::ParserGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParserId(u32);

impl ParserId {
    pub(crate) fn new(index: usize) -> Self {
        ParserId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: Option<String>,
    pub(crate) add_error: bool,
    pub(crate) kind: NodeKind,
}

/// Every kind of parser node. Children are referenced by [`ParserId`].
#[derive(Debug, Clone)]
pub enum NodeKind {
    Literal { value: String, case_sensitive: bool },
    Set(CharSet),
    Number(NumberOptions),
    Str(StringOptions),
    Bool(BoolOptions),
    Eol,
    End,
    Empty,
    Sequence { items: Vec<ParserId>, separator: Option<ParserId> },
    /// Ordered choice. `seeds` and `recursive` partition `items` (minus any
    /// item that is only a reference back to this choice): `recursive` holds
    /// the sequences that start with such a reference.
    Alternative { items: Vec<ParserId>, seeds: Vec<ParserId>, recursive: Vec<ParserId> },
    Repeat {
        inner: ParserId,
        min: usize,
        max: usize,
        until: Option<ParserId>,
        capture_until: bool,
        separator: Option<ParserId>,
    },
    Optional(ParserId),
    Except { inner: ParserId, except: ParserId },
    LookAhead { inner: ParserId, negate: bool },
    Rule(ParserId),
    /// `target` is filled in during initialization.
    Reference { name: String, target: Option<ParserId> },
}

impl Node {
    pub(crate) fn placeholder() -> Self {
        Node { name: None, add_error: false, kind: NodeKind::Empty }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether a failure of this node is reported in the match errors.
    pub fn add_error(&self) -> bool {
        self.add_error
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Short human description used in error messages.
    pub fn describe(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match &self.kind {
            NodeKind::Literal { value, .. } => format!("{:?}", value),
            NodeKind::Set(set) => set.to_string(),
            NodeKind::Reference { name, .. } => name.clone(),
            kind => kind.label().to_string(),
        }
    }
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Literal { .. } => "literal",
            NodeKind::Set(_) => "character",
            NodeKind::Number(_) => "number",
            NodeKind::Str(_) => "string",
            NodeKind::Bool(_) => "boolean",
            NodeKind::Eol => "end of line",
            NodeKind::End => "end of input",
            NodeKind::Empty => "nothing",
            NodeKind::Sequence { .. } => "sequence",
            NodeKind::Alternative { .. } => "alternative",
            NodeKind::Repeat { .. } => "repetition",
            NodeKind::Optional(_) => "optional",
            NodeKind::Except { .. } => "exception",
            NodeKind::LookAhead { .. } => "lookahead",
            NodeKind::Rule(_) => "rule",
            NodeKind::Reference { .. } => "reference",
        }
    }

    /// Leaf kinds that match characters directly.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NodeKind::Literal { .. }
                | NodeKind::Set(_)
                | NodeKind::Number(_)
                | NodeKind::Str(_)
                | NodeKind::Bool(_)
                | NodeKind::Eol
                | NodeKind::End
                | NodeKind::Empty
        )
    }

    /// Every outgoing edge, in matching order.
    pub fn children(&self) -> Vec<ParserId> {
        let mut out = Vec::new();
        match self {
            NodeKind::Sequence { items, separator } => {
                out.extend(items);
                out.extend(separator);
            }
            NodeKind::Alternative { items, .. } => out.extend(items),
            NodeKind::Repeat { inner, until, separator, .. } => {
                out.push(*inner);
                out.extend(until);
                out.extend(separator);
            }
            NodeKind::Optional(inner) | NodeKind::Rule(inner) | NodeKind::LookAhead { inner, .. } => {
                out.push(*inner)
            }
            NodeKind::Except { inner, except } => out.extend([*inner, *except]),
            NodeKind::Reference { target, .. } => out.extend(target),
            _ => {}
        }
        out
    }

    /// The same kind with every child handle passed through `f`.
    pub(crate) fn map_ids(&self, f: &mut dyn FnMut(ParserId) -> ParserId) -> NodeKind {
        fn map_all(ids: &[ParserId], f: &mut dyn FnMut(ParserId) -> ParserId) -> Vec<ParserId> {
            ids.iter().map(|&id| f(id)).collect()
        }
        match self {
            NodeKind::Sequence { items, separator } => NodeKind::Sequence {
                items: map_all(items, f),
                separator: separator.map(&mut *f),
            },
            NodeKind::Alternative { items, seeds, recursive } => NodeKind::Alternative {
                items: map_all(items, f),
                seeds: map_all(seeds, f),
                recursive: map_all(recursive, f),
            },
            NodeKind::Repeat { inner, min, max, until, capture_until, separator } => NodeKind::Repeat {
                inner: f(*inner),
                min: *min,
                max: *max,
                until: until.map(&mut *f),
                capture_until: *capture_until,
                separator: separator.map(&mut *f),
            },
            NodeKind::Optional(inner) => NodeKind::Optional(f(*inner)),
            NodeKind::Rule(inner) => NodeKind::Rule(f(*inner)),
            NodeKind::Except { inner, except } => NodeKind::Except { inner: f(*inner), except: f(*except) },
            NodeKind::LookAhead { inner, negate } => NodeKind::LookAhead { inner: f(*inner), negate: *negate },
            NodeKind::Reference { name, target } => NodeKind::Reference { name: name.clone(), target: target.map(&mut *f) },
            terminal => terminal.clone(),
        }
    }
}
