//! Capture tree tests: every `tests/parse_tree/*.bnf` grammar is built, matched
//! against its `.input` sibling, and the rendered result is compared with the
//! `.expected` sibling.

use bumpalo::Bump;
use datatest_stable::harness;
use std::path::Path;
use weft_parser::{format_errors, format_match, match_to_string, BnfGrammar};

fn run_test(path: &Path) -> datatest_stable::Result<()> {
    let bnf = std::fs::read_to_string(path)?;
    let input_path = format!("{}.input", path.display());
    let input = std::fs::read_to_string(&input_path)?;
    let input = input.trim_end_matches(['\n', '\r']);
    let expected_path = format!("{}.expected", path.display());
    let expected = std::fs::read_to_string(&expected_path)?.trim().to_string();
    let test_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("input");

    let grammar = BnfGrammar::new()
        .build_from_first(&bnf)
        .map_err(|err| format!("{:?} does not build: {}", path, err))?;

    let arena = Bump::new();
    let m = grammar.parse(&arena, input);

    // Exercise debug formatting for coverage
    let _ = format_match(&m, 0);

    let actual = if m.success() {
        match_to_string(&m)
    } else {
        format_errors(&[m.error()], test_name).trim().to_string()
    };

    if actual != expected {
        return Err(format!("mismatch for {:?}\n\nExpected:\n{}\n\nActual:\n{}", path, expected, actual).into());
    }
    Ok(())
}

harness!(run_test, "tests/parse_tree", r"\.bnf$");
