//! Parser graph: lowering authored parsers into an arena, resolving
//! references, rewriting left recursion, and cloning sub-graphs.

use std::ops::Index;

use common::debug::{create_logger, Logger};
use common::{log, log_detail};
use hashbrown::{HashMap, HashSet};

use crate::error::GrammarError;
use crate::node::{Node, NodeKind, ParserId};
use crate::parser::{Parser, ParserDef, ParserKind};

/// Initialized parser nodes addressed by [`ParserId`].
///
/// Once a graph belongs to a [`Grammar`](crate::Grammar) it is never mutated
/// during matching.
#[derive(Debug, Clone, Default)]
pub struct ParserGraph {
    nodes: Vec<Node>,
    names: HashMap<String, ParserId>,
}

impl ParserGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ParserId) -> &Node {
        &self.nodes[id.index()]
    }

    /// The first node registered under `name`.
    pub fn find(&self, name: &str) -> Option<ParserId> {
        self.names.get(name).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = ParserId> + '_ {
        (0..self.nodes.len()).map(ParserId::new)
    }

    pub(crate) fn push(&mut self, node: Node) -> ParserId {
        let id = ParserId::new(self.nodes.len());
        if let Some(name) = &node.name {
            self.names.entry(name.clone()).or_insert(id);
        }
        self.nodes.push(node);
        id
    }

    fn set(&mut self, id: ParserId, node: Node) {
        if let Some(name) = &node.name {
            self.names.entry(name.clone()).or_insert(id);
        }
        self.nodes[id.index()] = node;
    }

    /// Nodes reachable from `root`, depth first, each listed once.
    pub fn reachable(&self, root: ParserId) -> Vec<ParserId> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            stack.extend(self.node(id).kind.children().into_iter().rev());
        }
        order
    }

    /// Copy the sub-graph reachable from `root` into `target`.
    ///
    /// `map` records the copies made so far; a node already in it is not copied
    /// again, so shared nodes stay shared and cycles are reproduced.
    pub fn clone_subgraph(
        &self,
        root: ParserId,
        target: &mut ParserGraph,
        map: &mut HashMap<ParserId, ParserId>,
    ) -> ParserId {
        if let Some(&copy) = map.get(&root) {
            return copy;
        }
        let node = self.node(root);
        let slot = target.push(Node { kind: NodeKind::Empty, ..node.clone() });
        map.insert(root, slot);
        let kind = node.kind.map_ids(&mut |child| self.clone_subgraph(child, target, map));
        target.nodes[slot.index()].kind = kind;
        slot
    }

    /// Whether following references and rule wrappers from `from` arrives at `to`.
    fn leads_to(&self, from: ParserId, to: ParserId) -> bool {
        let mut id = from;
        for _ in 0..=self.nodes.len() {
            if id == to {
                return true;
            }
            id = match &self.node(id).kind {
                NodeKind::Reference { target: Some(target), .. } => *target,
                NodeKind::Rule(inner) => *inner,
                _ => return false,
            };
        }
        false
    }

    /// Split every choice into seeds and left-recursive continuations.
    fn split_left_recursion(&mut self, log: &Logger) {
        let mut updates = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            let NodeKind::Alternative { items, .. } = &node.kind else { continue };
            let alt = ParserId::new(index);
            let mut seeds = Vec::new();
            let mut recursive = Vec::new();
            for &item in items {
                if self.leads_to(item, alt) {
                    continue;
                }
                match &self.node(item).kind {
                    NodeKind::Sequence { items: parts, .. }
                        if parts.first().is_some_and(|&first| self.leads_to(first, alt)) =>
                    {
                        recursive.push(item)
                    }
                    _ => seeds.push(item),
                }
            }
            if !recursive.is_empty() || seeds.len() != items.len() {
                log_detail!(log, "left recursion in {}: {} seeds, {} recursive", alt, seeds.len(), recursive.len());
            }
            updates.push((index, seeds, recursive));
        }
        for (index, new_seeds, new_recursive) in updates {
            if let NodeKind::Alternative { seeds, recursive, .. } = &mut self.nodes[index].kind {
                *seeds = new_seeds;
                *recursive = new_recursive;
            }
        }
    }

    /// Give every sequence, and every repetition of a non-terminal, reachable
    /// from `root` the separator `sep` unless it already has one. Nodes of the
    /// separator itself are left alone.
    pub(crate) fn separate_children_by(&mut self, root: ParserId, sep: ParserId) -> usize {
        let skip: HashSet<ParserId> = self.reachable(sep).into_iter().collect();
        let targets: Vec<ParserId> = self
            .reachable(root)
            .into_iter()
            .filter(|id| !skip.contains(id))
            .filter(|&id| match &self.node(id).kind {
                NodeKind::Sequence { separator: None, .. } => true,
                NodeKind::Repeat { inner, separator: None, .. } => !self.node(*inner).kind.is_terminal(),
                _ => false,
            })
            .collect();
        for &id in &targets {
            match &mut self.nodes[id.index()].kind {
                NodeKind::Sequence { separator, .. } | NodeKind::Repeat { separator, .. } => *separator = Some(sep),
                _ => {}
            }
        }
        targets.len()
    }
}

impl Index<ParserId> for ParserGraph {
    type Output = Node;

    fn index(&self, id: ParserId) -> &Node {
        self.node(id)
    }
}

// =============================================================================
// Lowering
// =============================================================================

/// Turns authored [`Parser`] trees into graph nodes.
///
/// Handles that point at the same authored parser lower to the same node.
/// Rule definitions are only lowered once something references them.
pub(crate) struct Lowering<'p> {
    graph: ParserGraph,
    seen: HashMap<*const ParserDef, ParserId>,
    rules: HashMap<&'p str, &'p Parser>,
    pending: Vec<ParserId>,
    case_sensitive: bool,
    log: Logger,
}

impl<'p> Lowering<'p> {
    pub(crate) fn new(graph: ParserGraph, rules: &'p [Parser], case_sensitive: bool) -> Self {
        let mut by_name = HashMap::new();
        for rule in rules {
            if let Some(name) = rule.name() {
                by_name.entry(name).or_insert(rule);
            }
        }
        Self {
            graph,
            seen: HashMap::new(),
            rules: by_name,
            pending: Vec::new(),
            case_sensitive,
            log: create_logger("init"),
        }
    }

    /// Lower the rule definition called `name`.
    pub(crate) fn lower_rule(&mut self, name: &str) -> Result<ParserId, GrammarError> {
        match self.rules.get(name).copied() {
            Some(rule) => self.lower(rule),
            None => Err(GrammarError::UnknownRule { name: name.to_string() }),
        }
    }

    pub(crate) fn lower(&mut self, parser: &Parser) -> Result<ParserId, GrammarError> {
        let def = parser.def();
        let key = def as *const ParserDef;
        if let Some(&id) = self.seen.get(&key) {
            return Ok(id);
        }
        // Reserve the slot first so the node is findable while its children lower.
        let id = self.graph.push(Node::placeholder());
        self.seen.insert(key, id);

        let kind = match &def.kind {
            ParserKind::Literal { value, case_sensitive } => NodeKind::Literal {
                value: value.clone(),
                case_sensitive: case_sensitive.unwrap_or(self.case_sensitive),
            },
            ParserKind::Set(set) => NodeKind::Set(set.clone()),
            ParserKind::Number(opts) => NodeKind::Number(opts.clone()),
            ParserKind::Str(opts) => NodeKind::Str(opts.clone()),
            ParserKind::Bool(opts) => NodeKind::Bool(opts.clone()),
            ParserKind::Eol => NodeKind::Eol,
            ParserKind::End => NodeKind::End,
            ParserKind::Empty => NodeKind::Empty,
            ParserKind::Sequence { items, separator } => NodeKind::Sequence {
                items: self.lower_all(items)?,
                separator: self.lower_opt(separator.as_ref())?,
            },
            ParserKind::Alternative(items) => {
                let items = self.lower_all(items)?;
                NodeKind::Alternative { seeds: items.clone(), items, recursive: Vec::new() }
            }
            ParserKind::Repeat(repeat) => {
                if repeat.min > repeat.max {
                    return Err(GrammarError::InvalidRepeat { min: repeat.min, max: repeat.max });
                }
                NodeKind::Repeat {
                    inner: self.lower(&repeat.inner)?,
                    min: repeat.min,
                    max: repeat.max,
                    until: self.lower_opt(repeat.until.as_ref())?,
                    capture_until: repeat.capture_until,
                    separator: self.lower_opt(repeat.separator.as_ref())?,
                }
            }
            ParserKind::Optional(inner) => NodeKind::Optional(self.lower(inner)?),
            ParserKind::Except { inner, except } => NodeKind::Except {
                inner: self.lower(inner)?,
                except: self.lower(except)?,
            },
            ParserKind::LookAhead { inner, negate } => NodeKind::LookAhead { inner: self.lower(inner)?, negate: *negate },
            ParserKind::Rule(body) => NodeKind::Rule(self.lower(body)?),
            ParserKind::Reference(name) => {
                self.pending.push(id);
                NodeKind::Reference { name: name.clone(), target: None }
            }
        };
        let add_error = def.add_error.unwrap_or(def.name.is_some());
        self.graph.set(id, Node { name: def.name.clone(), add_error, kind });
        log_detail!(self.log, "lowered {} {} as {}", def.kind.label(), def.name.as_deref().unwrap_or("_"), id);
        Ok(id)
    }

    fn lower_all(&mut self, parsers: &[Parser]) -> Result<Vec<ParserId>, GrammarError> {
        parsers.iter().map(|p| self.lower(p)).collect()
    }

    fn lower_opt(&mut self, parser: Option<&Parser>) -> Result<Option<ParserId>, GrammarError> {
        parser.map(|p| self.lower(p)).transpose()
    }

    /// Resolve every reference, pulling in rule definitions as needed, then
    /// split left-recursive choices.
    pub(crate) fn finish(mut self) -> Result<ParserGraph, GrammarError> {
        while let Some(id) = self.pending.pop() {
            let name = match &self.graph.node(id).kind {
                NodeKind::Reference { name, target: None } => name.clone(),
                _ => continue,
            };
            let target = match self.rules.get(name.as_str()).copied() {
                Some(rule) => self.lower(rule)?,
                None => self
                    .graph
                    .find(&name)
                    .ok_or_else(|| GrammarError::UndefinedReference { name: name.clone() })?,
            };
            log_detail!(self.log, "reference {} -> {}", name, target);
            if let NodeKind::Reference { target: slot, .. } = &mut self.graph.nodes[id.index()].kind {
                *slot = Some(target);
            }
        }
        self.graph.split_left_recursion(&self.log);
        log!(self.log, "initialized {} nodes", self.graph.len());
        Ok(self.graph)
    }
}
