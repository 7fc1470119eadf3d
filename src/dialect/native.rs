//! Native dialect - the normalized `+field:value` debug form
//!
//! Prefixes are kept literally, quotes and proximity re-emit as typed, and
//! groups render as `(...)`. Clause strings across all buckets join with a
//! single space, buckets in the fixed order `+`, `""`, `-`.

use crate::clause::{BucketKey, Clause, ClauseValue};
use crate::context::QueryContext;
use crate::error::Result;
use crate::tree::QueryTree;

pub fn stringify(tree: &QueryTree, ctx: &QueryContext) -> Result<String> {
    let mut parts = Vec::new();
    for key in BucketKey::ALL {
        for clause in tree.bucket(key) {
            parts.push(stringify_clause(clause, key.prefix(), ctx)?);
        }
    }
    Ok(parts.join(" "))
}

fn stringify_clause(clause: &Clause, prefix: &str, ctx: &QueryContext) -> Result<String> {
    match &clause.value {
        ClauseValue::Tree(sub) => Ok(format!("{prefix}({})", stringify(sub, ctx)?)),
        ClauseValue::Range(lo, hi) => {
            let field = clause.field.as_deref().unwrap_or("");
            let op = if clause.op.contains('!') { "!=" } else { "=" };
            let body = match (lo.parse::<i64>(), hi.parse::<i64>()) {
                (Ok(l), Ok(h)) => (l..=h)
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => format!("{lo}..{hi}"),
            };
            if field.is_empty() {
                Ok(format!("{prefix}({body})"))
            } else {
                Ok(format!("{prefix}{field}{op}({body})"))
            }
        }
        ClauseValue::Term(value) => {
            let quote = clause.quote.map(String::from).unwrap_or_default();
            let proximity = clause
                .proximity
                .map(|n| format!("~{n}"))
                .unwrap_or_default();
            match clause.field.as_deref() {
                Some(field) if !field.is_empty() => Ok(format!(
                    "{prefix}{field}{}{quote}{value}{quote}{proximity}",
                    clause.op
                )),
                _ => {
                    // fieldless clauses drop the default operator
                    let op = if clause.op == ":" { "" } else { clause.op.as_str() };
                    Ok(format!("{prefix}{op}{quote}{value}{quote}{proximity}"))
                }
            }
        }
    }
}
