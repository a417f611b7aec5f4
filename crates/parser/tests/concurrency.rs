//! One grammar matched from several threads at once.

use std::thread;

use bumpalo::Bump;
use weft_parser::{BnfGrammar, Grammar};

const EXPR: &str = "
<expr>   ::= <expr> '+' <term> | <term>
<term>   ::= <term> '*' <factor> | <factor>
<factor> ::= '(' <expr> ')' | <number>
<number> ::= <Digit> | <number> <Digit>
";

#[test]
fn test_grammar_is_shareable() {
    fn check<T: Send + Sync>() {}
    check::<Grammar>();
}

#[test]
fn test_parallel_matches() {
    let grammar = BnfGrammar::new().build_from_first(EXPR).unwrap();
    let inputs = ["1+2", "3*(4+5)", "(6)", "7*", "12 * 34 + 5"];

    let results: Vec<(bool, usize)> = thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|&input| {
                let grammar = &grammar;
                s.spawn(move || {
                    let arena = Bump::new();
                    let mut last = (false, 0);
                    for _ in 0..50 {
                        let m = grammar.parse(&arena, input);
                        last = (m.success(), m.find_all("number").len());
                    }
                    last
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, [(true, 2), (true, 3), (true, 1), (false, 0), (true, 3)]);
}
