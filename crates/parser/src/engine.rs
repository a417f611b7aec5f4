//! The match engine: drives graph nodes over a cursor.
//!
//! Positions are immutable [`Cursor`]s, so backtracking is keeping the old
//! cursor. Captures of a failed branch are truncated away before the failure
//! is reported upward.

use bumpalo::{collections::Vec as BumpVec, Bump};
use common::debug::{create_logger, Logger};
use common::{log_detail, log_fail, log_success, log_trace};
use hashbrown::HashSet;

use crate::graph::ParserGraph;
use crate::matches::Match;
use crate::node::{Node, NodeKind, ParserId};
use crate::number;
use crate::scanner::Cursor;
use crate::terminals::{scan_bool, scan_eol, scan_string};
use crate::tracker::ErrorTracker;

type Captures<'a> = BumpVec<'a, Match<'a>>;

/// State of one match call. Never shared between calls.
pub(crate) struct Matcher<'a> {
    graph: &'a ParserGraph,
    arena: &'a Bump,
    input: &'a str,
    tracker: ErrorTracker,
    /// Named nodes currently being matched, with their start offsets.
    active: HashSet<(ParserId, usize)>,
    /// Nesting depth of look-ahead and exclusion checks. Failures inside them
    /// are not reported.
    quiet: usize,
    log: Logger,
}

impl<'a> Matcher<'a> {
    pub(crate) fn new(graph: &'a ParserGraph, arena: &'a Bump, input: &'a str) -> Self {
        Self {
            graph,
            arena,
            input,
            tracker: ErrorTracker::default(),
            active: HashSet::new(),
            quiet: 0,
            log: create_logger("match"),
        }
    }

    /// Match `root` from the start of the input.
    ///
    /// Unless `allow_partial` is set, stopping before the end of the input is
    /// a failure reported through the `end` node.
    pub(crate) fn match_root(
        &mut self,
        root: ParserId,
        end: ParserId,
        allow_partial: bool,
    ) -> Option<(Cursor<'a>, &'a [Match<'a>])> {
        let mut captures = BumpVec::new_in(self.arena);
        let stop = self.parse(root, Cursor::new(self.input), &mut captures)?;
        if !allow_partial && !stop.is_eof() {
            log_fail!(self.log, "input continues at {}", stop.offset());
            let attempt = self.tracker.begin_attempt();
            self.tracker.add_error(end, stop.offset(), attempt);
            return None;
        }
        Some((stop, captures.into_bump_slice()))
    }

    pub(crate) fn into_tracker(self) -> ErrorTracker {
        self.tracker
    }

    /// Match node `id` at `cur`, appending named captures to `out`.
    pub(crate) fn parse(&mut self, id: ParserId, cur: Cursor<'a>, out: &mut Captures<'a>) -> Option<Cursor<'a>> {
        let graph = self.graph;
        let node = graph.node(id);
        let reporting = self.quiet == 0;
        let attempt = (reporting && node.add_error()).then(|| self.tracker.begin_attempt());

        let result = match node.name() {
            Some(name) => self.parse_named(id, node, name, cur, out),
            None => {
                let mark = out.len();
                let result = self.parse_kind(node.kind(), cur, out);
                if result.is_none() {
                    out.truncate(mark);
                }
                result
            }
        };

        if result.is_none() && reporting {
            self.tracker.node_failed(cur.offset());
            if let Some(attempt) = attempt {
                self.tracker.add_error(id, cur.offset(), attempt);
            }
        }
        result
    }

    fn parse_named(
        &mut self,
        id: ParserId,
        node: &'a Node,
        name: &str,
        cur: Cursor<'a>,
        out: &mut Captures<'a>,
    ) -> Option<Cursor<'a>> {
        let key = (id, cur.offset());
        if !self.active.insert(key) {
            log_trace!(self.log, "{} re-entered at {}", name, cur.offset());
            return None;
        }
        log_detail!(self.log, "{} at {}", name, cur.offset());
        self.log.push_indent();

        let mut children = BumpVec::new_in(self.arena);
        let result = self.parse_kind(node.kind(), cur, &mut children);

        self.log.pop_indent();
        self.active.remove(&key);

        match result {
            Some(end) => {
                log_success!(self.log, "{} {}..{}", name, cur.offset(), end.offset());
                let length = end.offset() - cur.offset();
                out.push(Match::new(node, id, self.input, cur.offset(), length, children.into_bump_slice()));
            }
            None => log_fail!(self.log, "{} at {}", name, cur.offset()),
        }
        result
    }

    fn parse_kind(&mut self, kind: &'a NodeKind, cur: Cursor<'a>, out: &mut Captures<'a>) -> Option<Cursor<'a>> {
        match kind {
            NodeKind::Literal { value, case_sensitive } => cur.eat_literal(value, *case_sensitive),
            NodeKind::Set(set) => cur.eat_if(|c| set.contains(c)),
            NodeKind::Number(opts) => number::scan(cur, opts),
            NodeKind::Str(opts) => scan_string(cur, opts),
            NodeKind::Bool(opts) => scan_bool(cur, opts),
            NodeKind::Eol => scan_eol(cur),
            NodeKind::End => cur.is_eof().then_some(cur),
            NodeKind::Empty => Some(cur),
            NodeKind::Sequence { items, separator } => self.parse_items(items, *separator, cur, out),
            NodeKind::Alternative { seeds, recursive, .. } => self.parse_alternative(seeds, recursive, cur, out),
            NodeKind::Repeat { inner, min, max, until, capture_until, separator } => {
                let repeat = Repeat {
                    inner: *inner,
                    min: *min,
                    max: *max,
                    until: *until,
                    capture_until: *capture_until,
                    separator: *separator,
                };
                self.parse_repeat(&repeat, cur, out)
            }
            NodeKind::Optional(inner) => Some(self.parse(*inner, cur, out).unwrap_or(cur)),
            NodeKind::Except { inner, except } => {
                if self.probe(*except, cur).is_some() {
                    return None;
                }
                self.parse(*inner, cur, out)
            }
            NodeKind::LookAhead { inner, negate } => (self.probe(*inner, cur).is_some() != *negate).then_some(cur),
            NodeKind::Rule(inner) => self.parse(*inner, cur, out),
            NodeKind::Reference { target, .. } => self.parse((*target)?, cur, out),
        }
    }

    /// Match `items` in order with `separator` skipped between them.
    fn parse_items(
        &mut self,
        items: &[ParserId],
        separator: Option<ParserId>,
        cur: Cursor<'a>,
        out: &mut Captures<'a>,
    ) -> Option<Cursor<'a>> {
        let mut at = cur;
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                at = self.skip(separator, at)?;
            }
            at = self.parse(item, at, out)?;
        }
        Some(at)
    }

    fn parse_alternative(
        &mut self,
        seeds: &[ParserId],
        recursive: &[ParserId],
        cur: Cursor<'a>,
        out: &mut Captures<'a>,
    ) -> Option<Cursor<'a>> {
        let base = out.len();
        let mut end = match seeds.iter().find_map(|&seed| self.parse(seed, cur, out)) {
            Some(end) => end,
            None if seeds.is_empty() && !recursive.is_empty() => cur,
            None => return None,
        };
        if recursive.is_empty() {
            return Some(end);
        }

        // Grow the seed with the tail of a left-recursive item until none fits.
        let graph = self.graph;
        'grow: loop {
            for &item in recursive {
                let node = graph.node(item);
                let NodeKind::Sequence { items, separator } = node.kind() else { continue };
                let attempt = (self.quiet == 0 && node.add_error()).then(|| self.tracker.begin_attempt());
                let mark = out.len();
                if let Some(start) = self.skip(*separator, end) {
                    match self.parse_items(&items[1..], *separator, start, out) {
                        Some(next) if next.offset() > start.offset() => {
                            log_trace!(self.log, "left recursion grew {}..{}", cur.offset(), next.offset());
                            if node.name().is_some() {
                                // The grown item spans everything matched so far.
                                let children = self.arena.alloc_slice_copy(&out[base..]);
                                out.truncate(base);
                                let length = next.offset() - cur.offset();
                                out.push(Match::new(node, item, self.input, cur.offset(), length, children));
                            }
                            end = next;
                            continue 'grow;
                        }
                        _ => {}
                    }
                }
                out.truncate(mark);
                if let Some(attempt) = attempt {
                    self.tracker.add_error(item, cur.offset(), attempt);
                }
            }
            break;
        }
        Some(end)
    }

    fn parse_repeat(&mut self, repeat: &Repeat, cur: Cursor<'a>, out: &mut Captures<'a>) -> Option<Cursor<'a>> {
        let mut at = cur;
        let mut count = 0;
        while count < repeat.max {
            if count >= repeat.min {
                if let Some(until) = repeat.until {
                    let mark = out.len();
                    if let Some(after) = self.parse(until, at, out) {
                        if repeat.capture_until {
                            return Some(after);
                        }
                        out.truncate(mark);
                        return Some(at);
                    }
                }
            }

            let mark = out.len();
            let start = if count > 0 {
                match self.skip(repeat.separator, at) {
                    Some(start) => start,
                    None => break,
                }
            } else {
                at
            };
            match self.parse(repeat.inner, start, out) {
                Some(next) if next.offset() > start.offset() => {
                    at = next;
                    count += 1;
                }
                Some(_) => {
                    out.truncate(mark);
                    break;
                }
                None => break,
            }
        }
        (count >= repeat.min).then_some(at)
    }

    /// Consume `separator` at `cur`, dropping its captures.
    fn skip(&mut self, separator: Option<ParserId>, cur: Cursor<'a>) -> Option<Cursor<'a>> {
        match separator {
            Some(sep) => {
                let mut scratch = BumpVec::new_in(self.arena);
                self.parse(sep, cur, &mut scratch)
            }
            None => Some(cur),
        }
    }

    /// Match without keeping captures or reporting failures.
    fn probe(&mut self, id: ParserId, cur: Cursor<'a>) -> Option<Cursor<'a>> {
        let mut scratch = BumpVec::new_in(self.arena);
        self.quiet += 1;
        let result = self.parse(id, cur, &mut scratch);
        self.quiet -= 1;
        result
    }
}

struct Repeat {
    inner: ParserId,
    min: usize,
    max: usize,
    until: Option<ParserId>,
    capture_until: bool,
    separator: Option<ParserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Lowering;
    use crate::node::Node;
    use crate::parser::Parser;
    use crate::terminals::{digit, end, letter};

    struct Setup {
        graph: ParserGraph,
        root: ParserId,
        end: ParserId,
    }

    fn setup(root: &Parser) -> Setup {
        let mut lowering = Lowering::new(ParserGraph::default(), &[], true);
        let root = lowering.lower(root).unwrap();
        let mut graph = lowering.finish().unwrap();
        let end = graph.push(Node { name: None, add_error: true, kind: NodeKind::End });
        Setup { graph, root, end }
    }

    fn run(setup: &Setup, input: &str, partial: bool) -> Option<(usize, Vec<String>)> {
        let arena = Bump::new();
        let mut matcher = Matcher::new(&setup.graph, &arena, input);
        let (stop, captures) = matcher.match_root(setup.root, setup.end, partial)?;
        Some((stop.offset(), captures.iter().map(|m| format!("{}={}", m.name(), m.text())).collect()))
    }

    #[test]
    fn test_sequence_with_separator() {
        let s = setup(&(digit().named("a") & digit().named("b")).separated_by(","));
        assert_eq!(run(&s, "1,2", false), Some((3, vec!["a=1".into(), "b=2".into()])));
        assert_eq!(run(&s, "12", false), None);
    }

    #[test]
    fn test_failed_branch_leaves_no_captures() {
        let first = digit().named("d") & "x";
        let s = setup(&(first | digit().named("e")));
        assert_eq!(run(&s, "1", false), Some((1, vec!["e=1".into()])));
    }

    #[test]
    fn test_repeat_bounds_and_separator() {
        let s = setup(&digit().named("d").repeat_range(2, 3).separated_by(","));
        assert_eq!(run(&s, "1", false), None);
        assert_eq!(run(&s, "1,2,3,4", true).map(|r| r.0), Some(5));
        // A trailing separator is not consumed.
        assert_eq!(run(&s, "1,2,", true).map(|r| r.0), Some(3));
    }

    #[test]
    fn test_zero_width_repeat_terminates() {
        let s = setup(&Parser::empty().repeat(0));
        assert_eq!(run(&s, "", false), Some((0, vec![])));
        let s = setup(&Parser::empty().repeat(1));
        assert_eq!(run(&s, "", false), None);
    }

    #[test]
    fn test_until_not_consumed_unless_captured() {
        let s = setup(&(letter().repeat(1).until("!").named("w") & "!"));
        assert_eq!(run(&s, "ab!", false), Some((3, vec!["w=ab".into()])));
        let s = setup(&letter().repeat(1).capture_until("!").named("w"));
        assert_eq!(run(&s, "ab!", false), Some((3, vec!["w=ab!".into()])));
    }

    #[test]
    fn test_lookahead_and_except() {
        let s = setup(&(digit().lookahead() & digit().named("d")));
        assert_eq!(run(&s, "5", false), Some((1, vec!["d=5".into()])));
        let s = setup(&(!Parser::literal("x") & letter()));
        assert_eq!(run(&s, "a", false).map(|r| r.0), Some(1));
        assert_eq!(run(&s, "x", false), None);
        let s = setup(&(letter().except("x").named("l") & end()));
        assert_eq!(run(&s, "x", false), None);
    }

    #[test]
    fn test_left_recursion_grows() {
        // sum ::= sum "+" digit | digit
        let body = (Parser::reference("sum") & "+" & digit().named("d")) | digit().named("d");
        let s = setup(&body.named("sum"));
        let (stop, captures) = run(&s, "1+2+3", false).unwrap();
        assert_eq!(stop, 5);
        assert_eq!(captures, vec!["sum=1+2+3".to_string()]);
    }

    #[test]
    fn test_named_left_recursive_item_is_captured() {
        let add = (Parser::reference("sum") & "+" & digit().named("d")).named("add");
        let s = setup(&(add | digit().named("d")).named("sum"));
        let arena = Bump::new();
        let mut matcher = Matcher::new(&s.graph, &arena, "1+2+3");
        let (_, captures) = matcher.match_root(s.root, s.end, false).unwrap();
        let sum = &captures[0];
        assert_eq!(sum.children().len(), 1);
        let outer = &sum.children()[0];
        assert_eq!((outer.name(), outer.text()), ("add", "1+2+3"));
        let inner = &outer.children()[0];
        assert_eq!((inner.name(), inner.text()), ("add", "1+2"));
        assert_eq!(inner.children()[0].text(), "1");
        assert_eq!(outer.children()[1].text(), "3");
    }

    #[test]
    fn test_excluded_parser_is_not_reported() {
        let keyword = Parser::literal("end").named("keyword");
        let s = setup(&letter().except(keyword).named("ident").optional());
        let arena = Bump::new();
        let mut matcher = Matcher::new(&s.graph, &arena, "");
        assert!(matcher.match_root(s.root, s.end, false).is_some());
        let errors = matcher.into_tracker().into_errors();
        let names: Vec<_> = errors.iter().map(|&id| s.graph.node(id).name()).collect();
        assert_eq!(names, vec![Some("ident")]);
    }

    #[test]
    fn test_stopping_short_registers_end() {
        let s = setup(&digit());
        let arena = Bump::new();
        let mut matcher = Matcher::new(&s.graph, &arena, "12");
        assert!(matcher.match_root(s.root, s.end, false).is_none());
        let tracker = matcher.into_tracker();
        assert_eq!(tracker.error_index(), 1);
        assert_eq!(tracker.into_errors(), vec![s.end]);
    }
}
