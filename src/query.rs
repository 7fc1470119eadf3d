//! Query handle - a parsed tree bound to a dialect and its context
//!
//! `Query` is what `QueryParser::parse` returns: the AST, the target
//! dialect, and a shared handle on the parser's field registry and options.
//! Translation between dialects is a structural copy that rebinds only the
//! serializer.

use std::fmt;
use std::sync::Arc;

use crate::clause::{BucketKey, Clause};
use crate::context::QueryContext;
use crate::dialect::DialectKind;
use crate::error::Result;
use crate::tree::QueryTree;

/// A parsed query bound to an output dialect
#[derive(Clone, Debug)]
pub struct Query {
    tree: QueryTree,
    dialect: DialectKind,
    ctx: Arc<QueryContext>,
}

impl Query {
    /// Bind a tree to a dialect and context
    pub fn new(tree: QueryTree, dialect: DialectKind, ctx: Arc<QueryContext>) -> Self {
        Self { tree, dialect, ctx }
    }

    /// The dialect this query renders in
    pub fn dialect(&self) -> DialectKind {
        self.dialect
    }

    /// Borrow the underlying tree
    pub fn as_tree(&self) -> &QueryTree {
        &self.tree
    }

    /// Plain structural copy of the tree, free of any context references.
    /// Two queries with equal `tree()` values are structurally identical
    /// regardless of dialect.
    pub fn tree(&self) -> QueryTree {
        self.tree.clone()
    }

    /// Render the query in its dialect
    pub fn render(&self) -> Result<String> {
        self.dialect.stringify(&self.tree, &self.ctx)
    }

    /// Structural clone bound to a different dialect
    pub fn translate_to(&self, dialect: DialectKind) -> Query {
        Query {
            tree: self.tree.clone(),
            dialect,
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Depth-first visit of every clause; see `QueryTree::walk`
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&Clause, BucketKey),
    {
        self.tree.walk(f);
    }

    /// Append a clause that must match; the result is parse-equivalent to
    /// `(orig) AND (clause)`
    pub fn add_and_clause(&mut self, clause: Clause) {
        self.tree.push(BucketKey::Must, clause);
    }

    /// Append a clause that should match; the result is parse-equivalent to
    /// `(orig) OR (clause)`
    pub fn add_or_clause(&mut self, clause: Clause) {
        self.tree.push(BucketKey::Should, clause);
    }

    /// Append a clause that must not match
    pub fn add_not_clause(&mut self, clause: Clause) {
        self.tree.push(BucketKey::MustNot, clause);
    }

    /// Merge another query's tree into this one, preserving each clause's
    /// bucket
    pub fn add_sub_clause(&mut self, other: &Query) {
        self.tree.merge(other.tree.clone());
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.render().map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
