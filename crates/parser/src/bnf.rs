//! Building grammars from BNF text.
//!
//! The BNF notation is itself read by a grammar made of ordinary parsers
//! (the meta-grammar). Its match tree is then walked to author one
//! [`Parser::rule`] per declaration, and the rules become a [`Grammar`].
//!
//! ```text
//! <greeting>   ::= <salutation> <name> ['!']
//! <salutation> ::= 'hello' | 'hi'
//! <name>       ::= <Letter> | <name> <Letter>
//! ```

use bumpalo::Bump;
use common::debug::{create_logger, Logger};
use common::{log, log_detail};
use hashbrown::HashSet;

use crate::constants::{
    BNF_DOCUMENT, EXPRESSION, GROUP, LIST, LITERAL, NAME, OPTIONAL, REPEAT, RULE, RULE_NAME, RULE_REF,
};
use crate::error::BnfError;
use crate::grammar::Grammar;
use crate::matches::Match;
use crate::parser::Parser;
use crate::terminals::{
    any_char, digit, end, eol, hex_digit, letter, letter_or_digit, punctuation, set, single_line_whitespace,
    whitespace, StringOptions,
};

/// Reads BNF documents into grammars.
pub struct BnfGrammar {
    grammar: Grammar,
    separator: Option<Parser>,
    definitions: Vec<(String, Parser)>,
    log: Logger,
}

impl Default for BnfGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl BnfGrammar {
    pub fn new() -> Self {
        Self {
            grammar: meta_grammar(),
            separator: Some(single_line_whitespace().repeat(0)),
            definitions: Vec::new(),
            log: create_logger("bnf"),
        }
    }

    /// Parser skipped between the items of built sequences and repetitions.
    /// `None` makes items adjacent.
    pub fn with_separator(mut self, separator: Option<Parser>) -> Self {
        self.separator = separator;
        self
    }

    /// Definition for a rule name that documents may use without declaring.
    /// A declaration in the document takes precedence.
    pub fn define(mut self, name: impl Into<String>, parser: impl Into<Parser>) -> Self {
        let name = name.into();
        let parser = parser.into();
        match self.definitions.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = parser,
            None => self.definitions.push((name, parser)),
        }
        self
    }

    /// The meta-grammar that reads BNF text.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Build a grammar rooted at the rule called `start`.
    pub fn build(&self, text: &str, start: &str) -> Result<Grammar, BnfError> {
        let (rules, _) = self.rules(text)?;
        Ok(Grammar::from_rules(&rules, start)?)
    }

    /// Build a grammar rooted at the first rule the document declares.
    pub fn build_from_first(&self, text: &str) -> Result<Grammar, BnfError> {
        let (rules, first) = self.rules(text)?;
        Ok(Grammar::from_rules(&rules, &first)?)
    }

    /// Author one rule per declaration plus the definitions the document does
    /// not override. Also returns the first declared name.
    fn rules(&self, text: &str) -> Result<(Vec<Parser>, String), BnfError> {
        let arena = Bump::new();
        let m = self.grammar.parse(&arena, text);
        if !m.success() {
            return Err(BnfError::Syntax(m.error()));
        }

        let declarations: Vec<(&str, &Match<'_>)> = m
            .children()
            .iter()
            .filter(|c| c.name() == RULE)
            .map(|rule| (rule[RULE_NAME][NAME].text().trim(), rule))
            .collect();
        let mut declared = HashSet::new();
        for &(name, _) in &declarations {
            if !declared.insert(name) {
                return Err(BnfError::DuplicateRule { name: name.to_string() });
            }
        }
        let first = match declarations.first() {
            Some((name, _)) => name.to_string(),
            None => return Err(BnfError::Empty),
        };

        let builder = Builder { separator: self.separator.as_ref(), declared: &declared, definitions: &self.definitions };
        let mut rules = Vec::with_capacity(declarations.len() + self.definitions.len());
        for (name, rule) in declarations {
            let body = builder.expression(&rule[EXPRESSION]);
            log_detail!(self.log, "<{}> ::= {:?}", name, body);
            rules.push(Parser::rule(name, body));
        }
        for (name, parser) in &self.definitions {
            if !declared.contains(name.as_str()) {
                rules.push(Parser::rule(name.clone(), parser.clone()));
            }
        }
        log!(self.log, "built {} rules, first <{}>", rules.len(), first);
        Ok((rules, first))
    }
}

/// Turns meta-grammar captures into authored parsers.
struct Builder<'b> {
    separator: Option<&'b Parser>,
    declared: &'b HashSet<&'b str>,
    definitions: &'b [(String, Parser)],
}

impl Builder<'_> {
    fn expression(&self, m: &Match<'_>) -> Parser {
        let mut alternatives: Vec<Parser> =
            m.children().iter().filter(|c| c.name() == LIST).map(|list| self.list(list)).collect();
        match alternatives.len() {
            1 => alternatives.remove(0),
            _ => Parser::alternative(alternatives),
        }
    }

    fn list(&self, m: &Match<'_>) -> Parser {
        let mut items: Vec<Parser> = m.children().iter().map(|term| self.term(term)).collect();
        match items.len() {
            0 => Parser::empty(),
            1 => items.remove(0),
            _ => self.separated(Parser::sequence(items)),
        }
    }

    fn term(&self, m: &Match<'_>) -> Parser {
        match m.name() {
            RULE_REF => self.reference(m[NAME].text().trim()),
            LITERAL => Parser::literal(literal_text(m.text())),
            OPTIONAL => self.expression(&m[EXPRESSION]).optional(),
            REPEAT => self.separated(self.expression(&m[EXPRESSION]).repeat(0)),
            GROUP => self.expression(&m[EXPRESSION]),
            other => unreachable!("meta-grammar has no `{}` term", other),
        }
    }

    fn separated(&self, parser: Parser) -> Parser {
        match self.separator {
            Some(sep) => parser.separated_by(sep.clone()),
            None => parser,
        }
    }

    /// Declared and defined names resolve by reference; otherwise a built-in
    /// terminal of that name, if any. Unknown names are left to fail when the
    /// grammar is built.
    fn reference(&self, name: &str) -> Parser {
        if self.declared.contains(name) || self.definitions.iter().any(|(n, _)| n == name) {
            return Parser::reference(name);
        }
        builtin(name).unwrap_or_else(|| Parser::reference(name))
    }
}

/// Content of a quoted BNF literal. A backslash only escapes the quote that
/// encloses the literal; any other backslash is kept as written.
fn literal_text(quoted: &str) -> String {
    let mut chars = quoted.chars();
    let (Some(quote), Some(_)) = (chars.next(), chars.next_back()) else {
        return quoted.to_string();
    };
    chars.as_str().replace(&format!("\\{}", quote), &quote.to_string())
}

fn builtin(name: &str) -> Option<Parser> {
    let parser = match name.to_ascii_lowercase().as_str() {
        "digit" => digit(),
        "letter" => letter(),
        "letterordigit" => letter_or_digit(),
        "whitespace" => whitespace(),
        "singlelinewhitespace" => single_line_whitespace(),
        "eol" => eol(),
        "anychar" => any_char(),
        "end" => end(),
        "punctuation" => punctuation(),
        "hexdigit" => hex_digit(),
        _ => return None,
    };
    Some(parser)
}

// =============================================================================
// Meta-grammar
// =============================================================================

fn meta_grammar() -> Grammar {
    let ws = whitespace().repeat(0);

    let name = set(">\r\n").inverse().repeat(1).named(NAME);
    let rule_name = "<" & name & ">";
    let rule_ref = (rule_name.clone() & !(ws.clone() & "::=")).named(RULE_REF);

    let quotes = StringOptions { quote_characters: vec!['\'', '"'], allow_escape_characters: true, ..Default::default() };
    let literal = Parser::string(quotes).named(LITERAL);

    let expression = Parser::reference(EXPRESSION);
    let enclosed = |open: &str, close: &str, label: &str| {
        (open & ws.clone() & expression.clone() & ws.clone() & close).named(label)
    };
    let term = rule_ref | literal | enclosed("[", "]", OPTIONAL) | enclosed("{", "}", REPEAT) | enclosed("(", ")", GROUP);

    let list = term.repeat(0).separated_by(ws.clone()).named(LIST);
    let expression = (list.clone() & (ws.clone() & "|" & ws.clone() & list).repeat(0)).named(EXPRESSION);
    let rule = (rule_name.named(RULE_NAME) & ws.clone() & "::=" & ws.clone() & expression).named(RULE);
    let document = (ws.clone() & rule.repeat(0).separated_by(ws.clone()) & ws & end()).named(BNF_DOCUMENT);

    Grammar::new(document).expect("BNF meta-grammar is well-formed")
}
