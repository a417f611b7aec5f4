//! Furthest-failure errors and autocompletion over a small command language.

use bumpalo::Bump;
use weft_parser::terminals::{eol, single_line_whitespace};
use weft_parser::{Grammar, GrammarMatch, NumberOptions, Parser};

/// Rows of `set <telemetry> at <value> [%]` or `until <telemetry> <op> [unit]`.
fn car_grammar() -> Grammar {
    let ws = single_line_whitespace().repeat(1);
    let writables = (Parser::literal("[brake]") | "[throttle]").named("telemetry");
    let readables = (writables.clone() | "[velocity]").named("telemetry");
    let number = Parser::number(NumberOptions {
        allow_sign: false,
        allow_decimal: true,
        allow_exponent: true,
        ..Default::default()
    });

    let writer = Parser::literal("set").named("action")
        & ws.clone()
        & writables
        & ws.clone()
        & "at"
        & ws.clone()
        & number.named("value")
        & ws.clone().optional()
        & Parser::literal("%").optional();

    let op = (Parser::literal("<") | ">" | "=").named("operator");
    let unit = (Parser::literal("m/s") | "kph" | "mph").named("unit");
    let reader = Parser::literal("until").named("action")
        & ws.clone()
        & readables
        & ws.clone()
        & op
        & ws.optional()
        & unit.optional();

    let row = ((reader | writer).optional() & eol()).named("row");
    Grammar::new(row.clone().repeat(1) & row.optional()).unwrap()
}

fn error_names(m: &GrammarMatch<'_>) -> Vec<String> {
    m.errors().iter().map(|e| e.name().unwrap_or("").to_string()).collect()
}

#[test]
fn test_successful_match_keeps_errors() {
    let grammar = car_grammar();
    let arena = Bump::new();
    let m = grammar.parse(&arena, "set [throttle] at 15 %\r\n");
    assert!(m.success(), "{}", m.error_message());
    assert_eq!(error_names(&m), ["row", "action", "action"]);
    assert_eq!(m.error_index(), 24);
    assert_eq!(m.possibilities(), ["set", "until"]);

    let row = &m["row"];
    assert_eq!(row["telemetry"].text(), "[throttle]");
    assert_eq!(row["value"].value().unwrap().as_i64(), Some(15));
}

#[test]
fn test_empty_input() {
    let grammar = car_grammar();
    let arena = Bump::new();
    let m = grammar.parse(&arena, "");
    assert!(!m.success());
    assert_eq!(error_names(&m), ["row", "action", "action"]);
    assert_eq!(m.error_index(), 0);
    assert_eq!(m.possibilities(), ["set", "until"]);
}

#[test]
fn test_suggests_telemetry() {
    let grammar = car_grammar();
    let arena = Bump::new();
    let m = grammar.parse(&arena, "set ");
    assert!(!m.success());
    assert_eq!(error_names(&m), ["telemetry"]);
    assert_eq!(m.error_index(), 4);
    assert_eq!(m.possibilities(), ["[brake]", "[throttle]"]);
    assert_eq!(m.error_message(), "expected telemetry, found end of input");
}

#[test]
fn test_child_error_index_reaches_further() {
    let grammar = car_grammar();
    let arena = Bump::new();
    let m = grammar.parse(&arena, "set [throttle] ");
    assert!(!m.success());
    assert_eq!(error_names(&m), ["row", "action"]);
    assert_eq!(m.error_index(), 0);
    assert_eq!(m.child_error_index(), 15);
}

#[test]
fn test_reader_row() {
    let grammar = car_grammar();
    let arena = Bump::new();
    let m = grammar.parse(&arena, "until [velocity] > kph\nset [brake] at 2.5e1\n");
    assert!(m.success(), "{}", m.error_message());
    let rows = m.find_all("row");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["operator"].text(), ">");
    assert_eq!(rows[0]["unit"].text(), "kph");
    assert_eq!(rows[1]["value"].value().unwrap().as_i64(), Some(25));
}
