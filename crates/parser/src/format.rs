//! Output formatting utilities for match trees and errors.

use crate::error::ParseError;
use crate::matches::Match;

/// Format a match tree for display (debug format), one capture per line.
pub fn format_match(m: &Match<'_>, indent: usize) -> String {
    let mut result = String::new();
    let prefix = "  ".repeat(indent);
    let name = if m.name().is_empty() { "<root>" } else { m.name() };

    if m.children().is_empty() {
        result.push_str(&format!("{}{} {}..{} {:?}\n", prefix, name, m.index(), m.end(), m.text()));
    } else {
        result.push_str(&format!("{}{} {}..{}\n", prefix, name, m.index(), m.end()));
        for child in m.children() {
            result.push_str(&format_match(child, indent + 1));
        }
    }

    result
}

/// Format parse errors for display with source context.
pub fn format_errors(errors: &[ParseError], filename: &str) -> String {
    let mut result = String::new();
    for err in errors {
        result.push_str(&format!("{}:{}:{}: {}\n", filename, err.loc.line, err.loc.col, err.msg));
        result.push_str(&format!("  {}\n", err.source_line));
        let spaces = err.loc.col.saturating_sub(1) as usize;
        result.push_str(&format!("  {}^\n", " ".repeat(spaces)));
    }
    result
}

/// Format a match tree in s-expression format.
///
/// - Leaf captures: `[name text]`
/// - Branch captures: `(name child1 child2 ...)`
/// - The unnamed root of a grammar is not shown; its children are listed
///   separated by spaces
pub fn match_to_string(m: &Match<'_>) -> String {
    if m.name().is_empty() {
        return m.children().iter().map(format_capture).collect::<Vec<_>>().join(" ");
    }
    format_capture(m)
}

fn format_capture(m: &Match<'_>) -> String {
    if m.children().is_empty() {
        if m.text().is_empty() {
            format!("[{} ]", m.name())
        } else {
            format!("[{} {}]", m.name(), m.text())
        }
    } else {
        let children: Vec<String> = m.children().iter().map(format_capture).collect();
        format!("({} {})", m.name(), children.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use common::SourceLoc;

    use crate::terminals::{digit, letter};
    use crate::Grammar;

    #[test]
    fn test_match_to_string() {
        let arena = Bump::new();
        let grammar = Grammar::new((letter().repeat(1).named("word") & digit().repeat(1).named("num")).named("pair"))
            .unwrap();
        let m = grammar.parse(&arena, "ab12");
        assert_eq!(match_to_string(&m), "(pair [word ab] [num 12])");
        assert_eq!(format_match(&m, 0), "pair 0..4\n  word 0..2 \"ab\"\n  num 2..4 \"12\"\n");
    }

    #[test]
    fn test_unnamed_root_lists_captures() {
        let grammar = Grammar::new(letter().named("a") & letter().named("b")).unwrap();
        let arena = Bump::new();
        let m = grammar.parse(&arena, "xy");
        assert_eq!(match_to_string(&m), "[a x] [b y]");
    }

    #[test]
    fn test_format_errors() {
        let err = ParseError {
            msg: "expected digit, found 'x'".into(),
            loc: SourceLoc::new(6, 2, 3),
            source_line: "12x4".into(),
            index: 6,
            child_index: 6,
            expected: vec!["digit".into()],
        };
        assert_eq!(
            format_errors(&[err], "input.txt"),
            "input.txt:2:3: expected digit, found 'x'\n  12x4\n    ^\n"
        );
    }
}
