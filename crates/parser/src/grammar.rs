//! Grammars: an initialized parser graph with a root and match options.

use bumpalo::Bump;
use common::debug::create_logger;
use common::log;
use hashbrown::HashMap;

use crate::engine::Matcher;
use crate::error::GrammarError;
use crate::graph::{Lowering, ParserGraph};
use crate::matches::{GrammarMatch, Match};
use crate::node::{Node, NodeKind, ParserId};
use crate::parser::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarOptions {
    /// Succeed even when the root stops before the end of the input.
    pub allow_partial_match: bool,
    /// Default case sensitivity of literals that do not set their own.
    pub case_sensitive: bool,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self { allow_partial_match: false, case_sensitive: true }
    }
}

/// An initialized grammar, ready to match input.
///
/// The graph is immutable once built, so one grammar can be matched from
/// many threads at once; every call gets its own matcher state.
#[derive(Debug, Clone)]
pub struct Grammar {
    graph: ParserGraph,
    root: ParserId,
    end: ParserId,
    options: GrammarOptions,
}

impl Grammar {
    pub fn new(root: impl Into<Parser>) -> Result<Self, GrammarError> {
        Self::build(root.into(), &[], GrammarOptions::default())
    }

    /// A grammar whose references may resolve to any of `rules`.
    pub fn with_rules(root: impl Into<Parser>, rules: &[Parser]) -> Result<Self, GrammarError> {
        Self::build(root.into(), rules, GrammarOptions::default())
    }

    /// A grammar rooted at the rule called `start`.
    pub fn from_rules(rules: &[Parser], start: &str) -> Result<Self, GrammarError> {
        Self::from_rules_with(rules, start, GrammarOptions::default())
    }

    pub fn from_rules_with(rules: &[Parser], start: &str, options: GrammarOptions) -> Result<Self, GrammarError> {
        let mut lowering = Lowering::new(ParserGraph::default(), rules, options.case_sensitive);
        let root = lowering.lower_rule(start)?;
        Ok(Self::finish(lowering.finish()?, root, options))
    }

    pub fn build(root: Parser, rules: &[Parser], options: GrammarOptions) -> Result<Self, GrammarError> {
        let mut lowering = Lowering::new(ParserGraph::default(), rules, options.case_sensitive);
        let root = lowering.lower(&root)?;
        Ok(Self::finish(lowering.finish()?, root, options))
    }

    fn finish(mut graph: ParserGraph, root: ParserId, options: GrammarOptions) -> Self {
        let end = graph.push(Node { name: None, add_error: true, kind: NodeKind::End });
        log!(create_logger("init"), "grammar rooted at {} ({} nodes)", graph.node(root).describe(), graph.len());
        Self { graph, root, end, options }
    }

    pub fn options(&self) -> GrammarOptions {
        self.options
    }

    pub fn allow_partial_match(&self) -> bool {
        self.options.allow_partial_match
    }

    pub fn set_allow_partial_match(&mut self, allow: bool) {
        self.options.allow_partial_match = allow;
    }

    pub fn root(&self) -> ParserId {
        self.root
    }

    pub fn graph(&self) -> &ParserGraph {
        &self.graph
    }

    /// The node registered under `name`, if it made it into the graph.
    pub fn find_rule(&self, name: &str) -> Option<ParserId> {
        self.graph.find(name)
    }

    /// Skip `separator` between the items of every sequence, and between the
    /// iterations of every non-terminal repetition, that has none yet.
    ///
    /// Returns how many nodes were changed.
    pub fn separate_children_by(&mut self, separator: impl Into<Parser>) -> Result<usize, GrammarError> {
        let mut lowering = Lowering::new(self.graph.clone(), &[], self.options.case_sensitive);
        let sep = lowering.lower(&separator.into())?;
        let mut graph = lowering.finish()?;
        let changed = graph.separate_children_by(self.root, sep);
        self.graph = graph;
        Ok(changed)
    }

    /// An independent grammar rooted at the node called `rule`, with copies of
    /// everything reachable from it.
    pub fn extract(&self, rule: &str) -> Result<Grammar, GrammarError> {
        let source = self.graph.find(rule).ok_or_else(|| GrammarError::UnknownRule { name: rule.to_string() })?;
        let mut graph = ParserGraph::default();
        let mut map = HashMap::new();
        let root = self.graph.clone_subgraph(source, &mut graph, &mut map);
        Ok(Self::finish(graph, root, self.options))
    }

    /// Match `input` from its start. Every capture is allocated in `arena`.
    pub fn parse<'a>(&'a self, arena: &'a Bump, input: &'a str) -> GrammarMatch<'a> {
        let mut matcher = Matcher::new(&self.graph, arena, input);
        let result = matcher.match_root(self.root, self.end, self.options.allow_partial_match);
        let root_node = self.graph.node(self.root);
        let root = match result {
            Some((stop, captures)) => match (root_node.name(), captures) {
                (Some(_), [own]) => *own,
                _ => Match::root(input, 0, stop.offset(), captures),
            },
            None => Match::failed(input, root_node, self.root),
        };
        GrammarMatch::new(root, matcher.into_tracker(), &self.graph, input)
    }
}
