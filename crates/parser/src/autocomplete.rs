//! Literal suggestions for what could continue a failed match.

use std::collections::BTreeSet;

use hashbrown::HashSet;

use crate::graph::ParserGraph;
use crate::node::{NodeKind, ParserId};

/// Literals that can start any of `roots`.
///
/// A sequence contributes only its first item; a choice contributes every
/// item. Negative look-aheads and exclusions contribute nothing of their own.
pub fn find_possibilities(graph: &ParserGraph, roots: impl IntoIterator<Item = ParserId>) -> Vec<String> {
    let mut found = BTreeSet::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<ParserId> = roots.into_iter().collect();
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        match graph.node(id).kind() {
            NodeKind::Literal { value, .. } => {
                found.insert(value.clone());
            }
            NodeKind::Sequence { items, .. } => stack.extend(items.first()),
            NodeKind::Alternative { items, .. } => stack.extend(items),
            NodeKind::Repeat { inner, .. }
            | NodeKind::Optional(inner)
            | NodeKind::Rule(inner)
            | NodeKind::Except { inner, .. }
            | NodeKind::LookAhead { inner, negate: false } => stack.push(*inner),
            NodeKind::Reference { target: Some(target), .. } => stack.push(*target),
            _ => {}
        }
    }
    found.into_iter().collect()
}
