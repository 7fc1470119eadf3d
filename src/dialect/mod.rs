//! Output dialects
//!
//! Every dialect renders the same AST under its own rules for wildcards,
//! quoting, negation placement, and boolean keywords. The dialect is a
//! tagged variant over a shared tree; only the serializer differs.

pub mod native;
pub mod sql;
pub mod swish;

pub use swish::SWISH_DEFAULT_FIELD;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clause::{BucketKey, Clause};
use crate::context::QueryContext;
use crate::error::{ParlanceError, Result};
use crate::tree::QueryTree;

/// Identifier of an output dialect
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// Normalized `+field:value` debug form
    #[default]
    Native,
    /// SQL `WHERE`-clause fragments
    Sql,
    /// Swish-e style `field="value"` form
    Swish,
}

impl DialectKind {
    /// Render a tree in this dialect
    pub fn stringify(&self, tree: &QueryTree, ctx: &QueryContext) -> Result<String> {
        match self {
            DialectKind::Native => native::stringify(tree, ctx),
            DialectKind::Sql => sql::stringify(tree, ctx),
            DialectKind::Swish => swish::stringify(tree, ctx),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DialectKind::Native => "native",
            DialectKind::Sql => "sql",
            DialectKind::Swish => "swish",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = ParlanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(DialectKind::Native),
            "sql" => Ok(DialectKind::Sql),
            "swish" => Ok(DialectKind::Swish),
            other => Err(ParlanceError::Config(format!("unknown dialect: {other}"))),
        }
    }
}

/// Shared stringify skeleton for the boolean dialects (SQL, SWISH): clauses
/// join with AND inside the `+` and `-` buckets and with OR inside the `""`
/// bucket; bucket strings join with AND. A multi-clause OR bucket is
/// parenthesized when it has AND-joined neighbors.
pub(crate) fn join_boolean_buckets<F>(tree: &QueryTree, mut render: F) -> Result<String>
where
    F: FnMut(&Clause, BucketKey) -> Result<String>,
{
    let populated = BucketKey::ALL
        .iter()
        .filter(|key| !tree.bucket(**key).is_empty())
        .count();
    let mut buckets = Vec::new();
    for key in BucketKey::ALL {
        let clauses = tree.bucket(key);
        if clauses.is_empty() {
            continue;
        }
        let joiner = if key == BucketKey::Should { " OR " } else { " AND " };
        let parts = clauses
            .iter()
            .map(|clause| render(clause, key))
            .collect::<Result<Vec<_>>>()?;
        let mut joined = parts.join(joiner);
        if key == BucketKey::Should && clauses.len() > 1 && populated > 1 {
            joined = format!("({joined})");
        }
        buckets.push(joined);
    }
    Ok(buckets.join(" AND "))
}
