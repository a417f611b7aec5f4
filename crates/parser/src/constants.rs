//! Capture names of the BNF meta-grammar.
//!
//! Shared by the grammar that reads BNF text and the builder that walks its
//! match tree.

// =============================================================================
// Structure
// =============================================================================

/// The whole BNF document.
pub const BNF_DOCUMENT: &str = "bnf";

/// One `<name> ::= expression` declaration.
pub const RULE: &str = "rule";

/// The `<name>` on the left of `::=`.
pub const RULE_NAME: &str = "rule-name";

/// Text between `<` and `>`.
pub const NAME: &str = "name";

/// Alternatives separated by `|`.
pub const EXPRESSION: &str = "expression";

/// One alternative: a run of terms.
pub const LIST: &str = "list";

// =============================================================================
// Terms
// =============================================================================

pub const RULE_REF: &str = "rule-ref";
pub const LITERAL: &str = "literal";
pub const OPTIONAL: &str = "optional";
pub const REPEAT: &str = "repeat";
pub const GROUP: &str = "group";
