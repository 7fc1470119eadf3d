//! Query tree - the boolean AST container
//!
//! A `QueryTree` holds ordered clause lists for the three buckets:
//! - `must`: clauses that must match (the `+` bucket, AND-joined)
//! - `should`: clauses that should match (the `""` bucket, OR-joined)
//! - `must_not`: clauses that must not match (the `-` bucket)
//!
//! Order within each bucket preserves user-authored order; serialization
//! renders a map keyed by the bucket prefixes, omitting empty buckets.

use serde::Serialize;

use crate::clause::{BucketKey, Clause, ClauseValue};

/// Boolean AST root or subtree
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QueryTree {
    /// Clauses that must match (`+`)
    #[serde(rename = "+", skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Clause>,
    /// Clauses that should match (`""`)
    #[serde(rename = "", skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Clause>,
    /// Clauses that must not match (`-`)
    #[serde(rename = "-", skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Clause>,
}

impl QueryTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a bucket by key
    pub fn bucket(&self, key: BucketKey) -> &[Clause] {
        match key {
            BucketKey::Must => &self.must,
            BucketKey::Should => &self.should,
            BucketKey::MustNot => &self.must_not,
        }
    }

    /// Mutably borrow a bucket by key
    pub fn bucket_mut(&mut self, key: BucketKey) -> &mut Vec<Clause> {
        match key {
            BucketKey::Must => &mut self.must,
            BucketKey::Should => &mut self.should,
            BucketKey::MustNot => &mut self.must_not,
        }
    }

    /// Append a clause to a bucket
    pub fn push(&mut self, key: BucketKey, clause: Clause) {
        self.bucket_mut(key).push(clause);
    }

    /// Whether all three buckets are empty
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    /// Number of clauses directly in this tree (groups count as one)
    pub fn clause_count(&self) -> usize {
        self.must.len() + self.should.len() + self.must_not.len()
    }

    /// Whether the tree has at least one positive anchor (`+` or `""`)
    pub fn has_positive(&self) -> bool {
        !self.must.is_empty() || !self.should.is_empty()
    }

    /// Extract the single positive clause, if the tree holds exactly one
    /// clause overall. Used to collapse one-clause parenthesized subqueries
    /// in place of a group wrapper.
    pub fn into_single_clause(mut self) -> std::result::Result<Clause, QueryTree> {
        if self.must_not.is_empty() && self.must.len() + self.should.len() == 1 {
            if let Some(clause) = self.must.pop() {
                return Ok(clause);
            }
            if let Some(clause) = self.should.pop() {
                return Ok(clause);
            }
        }
        Err(self)
    }

    /// Depth-first visit of every clause, buckets in the fixed order
    /// `+`, `""`, `-`. Group subtrees are entered before the group clause
    /// itself is visited (post-order).
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&Clause, BucketKey),
    {
        for key in BucketKey::ALL {
            for clause in self.bucket(key) {
                if let ClauseValue::Tree(sub) = &clause.value {
                    sub.walk(f);
                }
                f(clause, key);
            }
        }
    }

    /// Merge another tree into this one, bucket by bucket
    pub fn merge(&mut self, other: QueryTree) {
        self.must.extend(other.must);
        self.should.extend(other.should);
        self.must_not.extend(other.must_not);
    }
}
