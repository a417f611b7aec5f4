//! Match trees and the result of matching a grammar.

use std::fmt;
use std::ops::{Deref, Index};

use common::LineIndex;

use crate::autocomplete::find_possibilities;
use crate::error::{ConversionError, ParseError};
use crate::graph::ParserGraph;
use crate::node::{Node, NodeKind, ParserId};
use crate::number::{self, Decimal};
use crate::terminals::{bool_value, string_value};
use crate::tracker::ErrorTracker;

/// A named capture: the span a named node matched and the named captures
/// found inside it.
///
/// Matches live in the arena passed to [`Grammar::parse`](crate::Grammar::parse)
/// and are cheap to copy.
#[derive(Clone, Copy)]
pub struct Match<'a> {
    name: &'a str,
    node: Option<&'a Node>,
    parser: Option<ParserId>,
    input: &'a str,
    index: usize,
    length: usize,
    success: bool,
    children: &'a [Match<'a>],
}

static EMPTY: Match<'static> = Match {
    name: "",
    node: None,
    parser: None,
    input: "",
    index: 0,
    length: 0,
    success: false,
    children: &[],
};

impl<'a> Match<'a> {
    pub(crate) fn new(
        node: &'a Node,
        parser: ParserId,
        input: &'a str,
        index: usize,
        length: usize,
        children: &'a [Match<'a>],
    ) -> Self {
        Match {
            name: node.name().unwrap_or(""),
            node: Some(node),
            parser: Some(parser),
            input,
            index,
            length,
            success: true,
            children,
        }
    }

    /// Unnamed match spanning `index..index + length` over top-level captures.
    pub(crate) fn root(input: &'a str, index: usize, length: usize, children: &'a [Match<'a>]) -> Self {
        Match { input, index, length, success: true, children, ..EMPTY }
    }

    /// Stand-in for the root of a failed match.
    pub(crate) fn failed(input: &'a str, node: &'a Node, parser: ParserId) -> Self {
        Match { name: node.name().unwrap_or(""), node: Some(node), parser: Some(parser), input, ..EMPTY }
    }

    /// Capture name; empty for the unnamed root.
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn end(&self) -> usize {
        self.index + self.length
    }

    pub fn text(&self) -> &'a str {
        self.input.get(self.index..self.end()).unwrap_or("")
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn children(&self) -> &'a [Match<'a>] {
        self.children
    }

    /// First direct child called `name`.
    pub fn get(&self, name: &str) -> Option<&'a Match<'a>> {
        self.children.iter().find(|m| m.name == name)
    }

    /// First capture called `name`: among direct children, or anywhere below
    /// this match (depth first, in input order) when `recursive` is set.
    pub fn find(&self, name: &str, recursive: bool) -> Option<&'a Match<'a>> {
        if !recursive {
            return self.get(name);
        }
        let children = self.children;
        for child in children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name, true) {
                return Some(found);
            }
        }
        None
    }

    /// Every capture called `name` anywhere below this match, in input order.
    pub fn find_all(&self, name: &str) -> Vec<&'a Match<'a>> {
        let mut found = Vec::new();
        let mut stack: Vec<&'a Match<'a>> = self.children.iter().rev().collect();
        while let Some(m) = stack.pop() {
            if m.name == name {
                found.push(m);
            }
            stack.extend(m.children.iter().rev());
        }
        found
    }

    pub fn parser(&self) -> Option<ParserId> {
        self.parser
    }

    pub fn node(&self) -> Option<&'a Node> {
        self.node
    }

    /// Typed value of the matched text, according to the node that matched it.
    pub fn value(&self) -> Result<Value<'a>, ConversionError> {
        let text = self.text();
        Ok(match self.node.map(Node::kind) {
            Some(NodeKind::Number(opts)) => number::convert(text, opts)?,
            Some(NodeKind::Str(opts)) => Value::String(string_value(text, opts)),
            Some(NodeKind::Bool(opts)) => Value::Bool(bool_value(text, opts)),
            _ => Value::Text(text),
        })
    }
}

impl<'a> Index<&str> for Match<'a> {
    type Output = Match<'a>;

    /// Direct child called `name`, or an empty unsuccessful match.
    fn index(&self, name: &str) -> &Match<'a> {
        self.get(name).unwrap_or(&EMPTY)
    }
}

impl fmt::Debug for Match<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Match");
        s.field("name", &self.name).field("span", &(self.index..self.end()));
        if !self.success {
            s.field("success", &false);
        }
        if !self.children.is_empty() {
            s.field("children", &self.children);
        }
        s.finish()
    }
}

/// Converted value of a match.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Text(&'a str),
    String(String),
    Decimal(Decimal),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Bool(bool),
}

impl Value<'_> {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(*text),
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match *self {
            Value::Decimal(d) => Some(d),
            Value::Int32(n) => Some(Decimal::from(n as i64)),
            Value::Int64(n) => Some(Decimal::from(n)),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int32(n) => Some(n as i64),
            Value::Int64(n) => Some(n),
            Value::Decimal(d) if d.is_integer() => i64::try_from(d.mantissa()).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Double(x) => Some(x),
            Value::Decimal(d) => Some(d.to_f64()),
            Value::Int32(n) => Some(n as f64),
            Value::Int64(n) => Some(n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

/// A node that failed at the error index.
#[derive(Debug, Clone, Copy)]
pub struct ErrorEntry<'a> {
    pub parser: ParserId,
    pub node: &'a Node,
    pub index: usize,
}

impl ErrorEntry<'_> {
    pub fn name(&self) -> Option<&str> {
        self.node.name()
    }

    pub fn describe(&self) -> String {
        self.node.describe()
    }
}

/// Result of [`Grammar::parse`](crate::Grammar::parse).
///
/// Dereferences to the root [`Match`]. Failure details are kept even when
/// the match succeeds, since they describe where a longer input could go.
pub struct GrammarMatch<'a> {
    root: Match<'a>,
    error_index: usize,
    child_error_index: usize,
    errors: Vec<ErrorEntry<'a>>,
    graph: &'a ParserGraph,
    input: &'a str,
}

impl<'a> GrammarMatch<'a> {
    pub(crate) fn new(root: Match<'a>, tracker: ErrorTracker, graph: &'a ParserGraph, input: &'a str) -> Self {
        let error_index = tracker.error_index();
        let child_error_index = tracker.child_error_index();
        let errors = tracker
            .into_errors()
            .into_iter()
            .map(|parser| ErrorEntry { parser, node: graph.node(parser), index: error_index })
            .collect();
        Self { root, error_index, child_error_index, errors, graph, input }
    }

    pub fn success(&self) -> bool {
        self.root.success
    }

    pub fn root(&self) -> &Match<'a> {
        &self.root
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Furthest offset at which an error-registering node failed.
    pub fn error_index(&self) -> usize {
        self.error_index
    }

    /// Furthest offset at which any node failed.
    pub fn child_error_index(&self) -> usize {
        self.child_error_index
    }

    pub fn errors(&self) -> &[ErrorEntry<'a>] {
        &self.errors
    }

    /// `expected a or b, found 'c'`.
    pub fn error_message(&self) -> String {
        let expected = self.expected();
        let found = match self.input.get(self.error_index..).and_then(|rest| rest.chars().next()) {
            Some(c) => format!("{:?}", c),
            None => "end of input".to_string(),
        };
        match expected.split_last() {
            None => format!("unexpected {}", found),
            Some((last, [])) => format!("expected {}, found {}", last, found),
            Some((last, rest)) => format!("expected {} or {}, found {}", rest.join(", "), last, found),
        }
    }

    /// Owned summary of the failure, located in the input.
    pub fn error(&self) -> ParseError {
        let lines = LineIndex::new(self.input);
        ParseError {
            msg: self.error_message(),
            loc: lines.locate(self.error_index),
            source_line: lines.line_text(self.error_index).to_string(),
            index: self.error_index,
            child_index: self.child_error_index,
            expected: self.expected(),
        }
    }

    /// Error descriptions, first occurrence of each.
    fn expected(&self) -> Vec<String> {
        let mut expected = Vec::new();
        for entry in &self.errors {
            let desc = entry.describe();
            if !expected.contains(&desc) {
                expected.push(desc);
            }
        }
        expected
    }

    /// Literals that would have let the match continue at the error index,
    /// sorted and deduplicated.
    pub fn possibilities(&self) -> Vec<String> {
        find_possibilities(self.graph, self.errors.iter().map(|e| e.parser))
    }
}

impl<'a> Deref for GrammarMatch<'a> {
    type Target = Match<'a>;

    fn deref(&self) -> &Match<'a> {
        &self.root
    }
}

impl fmt::Debug for GrammarMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarMatch")
            .field("success", &self.success())
            .field("root", &self.root)
            .field("error_index", &self.error_index)
            .field("child_error_index", &self.child_error_index)
            .field("errors", &self.errors.iter().map(ErrorEntry::describe).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> Node {
        Node { name: Some(name.to_string()), add_error: true, kind: NodeKind::Empty }
    }

    #[test]
    fn test_lookup() {
        let input = "ab";
        let a = node("a");
        let b = node("b");
        let id = ParserId::new(0);
        let inner = [Match::new(&b, id, input, 1, 1, &[])];
        let children = [Match::new(&a, id, input, 0, 2, &inner)];
        let root = Match::root(input, 0, 2, &children);

        assert_eq!(root["a"].text(), "ab");
        assert!(root.get("b").is_none());
        assert!(!root["b"].is_success());
        assert_eq!(root["b"].text(), "");
        assert_eq!(root.find("b", true).map(|m| m.text()), Some("b"));
        assert_eq!(root.find_all("b").len(), 1);
    }

    #[test]
    fn test_value_of_plain_match_is_text() {
        let n = node("x");
        let m = Match::new(&n, ParserId::new(0), "hello", 1, 3, &[]);
        assert_eq!(m.value(), Ok(Value::Text("ell")));
        assert_eq!(m.value().unwrap().as_str(), Some("ell"));
    }
}
