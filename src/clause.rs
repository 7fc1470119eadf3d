//! AST leaves and groups
//!
//! A `Clause` is one unit of a parsed query: either a leaf
//! (`field op value`, with the quote character and phrase proximity the user
//! typed) or a group whose value is a whole subtree. The pseudo-operator
//! `"()"` marks groups, which keeps tree walks uniform.

use serde::Serialize;

use crate::tree::QueryTree;

/// Operator string marking a group clause
pub const GROUP_OP: &str = "()";

/// The three roles a clause can play inside a tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BucketKey {
    /// Must match (`+`, AND-joined)
    Must,
    /// Should match (`""`, OR-joined)
    Should,
    /// Must not match (`-`)
    MustNot,
}

impl BucketKey {
    /// Buckets in their fixed serialization order
    pub const ALL: [BucketKey; 3] = [BucketKey::Must, BucketKey::Should, BucketKey::MustNot];

    /// The sign prefix this bucket renders with
    pub fn prefix(&self) -> &'static str {
        match self {
            BucketKey::Must => "+",
            BucketKey::Should => "",
            BucketKey::MustNot => "-",
        }
    }
}

/// Value carried by a clause
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClauseValue {
    /// A scalar term or phrase
    Term(String),
    /// A `lo..hi` range; endpoints stay strings, dialects decide
    /// numeric-ness at render time
    Range(String, String),
    /// A parenthesized subtree (group clause)
    Tree(QueryTree),
}

impl ClauseValue {
    /// The scalar term, if this is a term value
    pub fn as_term(&self) -> Option<&str> {
        match self {
            ClauseValue::Term(t) => Some(t),
            _ => None,
        }
    }

    /// The subtree, if this is a group value
    pub fn as_tree(&self) -> Option<&QueryTree> {
        match self {
            ClauseValue::Tree(t) => Some(t),
            _ => None,
        }
    }
}

/// One leaf or group of the query AST
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Clause {
    /// Field identifier; `None` means "default field" at render time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Operator glyphs (`:`, `=`, `!=`, `..`, `()` for groups, ...)
    pub op: String,
    pub value: ClauseValue,
    /// Delimiter the user typed around the value, kept for re-emission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<char>,
    /// Phrase proximity (`"a b"~N`); only meaningful for `"`-quoted values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proximity: Option<u32>,
}

impl Clause {
    /// Create a clause with an explicit value
    pub fn new(field: Option<String>, op: impl Into<String>, value: ClauseValue) -> Self {
        Self {
            field,
            op: op.into(),
            value,
            quote: None,
            proximity: None,
        }
    }

    /// Create a term leaf
    pub fn term(field: Option<String>, op: impl Into<String>, term: impl Into<String>) -> Self {
        Self::new(field, op, ClauseValue::Term(term.into()))
    }

    /// Create a range leaf (`op` should be `..` or `!..`)
    pub fn range(
        field: Option<String>,
        op: impl Into<String>,
        lo: impl Into<String>,
        hi: impl Into<String>,
    ) -> Self {
        Self::new(field, op, ClauseValue::Range(lo.into(), hi.into()))
    }

    /// Wrap a subtree as a group clause
    pub fn group(tree: QueryTree) -> Self {
        Self::new(None, GROUP_OP, ClauseValue::Tree(tree))
    }

    /// Record the quote delimiter the user typed
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = Some(quote);
        self
    }

    /// Set phrase proximity
    pub fn with_proximity(mut self, proximity: u32) -> Self {
        self.proximity = Some(proximity);
        self
    }

    /// Whether this clause is a group
    pub fn is_group(&self) -> bool {
        self.op == GROUP_OP
    }
}
