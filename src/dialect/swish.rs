//! SWISH dialect - Swish-e style `field="value"` form
//!
//! Rendering rules:
//! - every operator renders as `=`; values are always double-quoted and
//!   field names never are
//! - the wildcard glyph is `*`, kept inside the quotes; numeric fields
//!   never accept wildcards
//! - a negated leaf renders `field=(NOT "value")`; a negated group renders
//!   `NOT (...)`; a single-child group collapses its parentheses
//! - `~` / `!~` leaves ensure a trailing wildcard
//! - integer ranges expand to `field=(v1 OR v2 OR ...)`; any other range is
//!   an error
//! - fieldless clauses fall back to the default field or the implicit
//!   `swishdefault` field
//! - phrase proximity has no rendering here and is dropped

use crate::clause::{BucketKey, Clause, ClauseValue};
use crate::context::QueryContext;
use crate::error::{ParlanceError, Result};
use crate::tree::QueryTree;

/// Implicit catch-all field registered for SWISH parsers
pub const SWISH_DEFAULT_FIELD: &str = "swishdefault";

const WILDCARD: char = '*';

pub fn stringify(tree: &QueryTree, ctx: &QueryContext) -> Result<String> {
    super::join_boolean_buckets(tree, |clause, key| stringify_clause(clause, key, ctx))
}

fn stringify_clause(clause: &Clause, key: BucketKey, ctx: &QueryContext) -> Result<String> {
    let negated = key == BucketKey::MustNot;
    if let ClauseValue::Tree(sub) = &clause.value {
        let inner = stringify(sub, ctx)?;
        return Ok(if negated {
            format!("NOT ({inner})")
        } else if sub.clause_count() == 1 {
            inner
        } else {
            format!("({inner})")
        });
    }

    let name = clause
        .field
        .clone()
        .or_else(|| ctx.default_field.clone())
        .unwrap_or_else(|| SWISH_DEFAULT_FIELD.to_string());
    render_leaf(clause, &name, negated, ctx)
}

fn render_leaf(clause: &Clause, name: &str, negated: bool, ctx: &QueryContext) -> Result<String> {
    let descriptor = ctx.fields.get(name);

    if let Some(callback) = descriptor.and_then(|d| d.callback.as_ref()) {
        let value = match &clause.value {
            ClauseValue::Term(v) => v.clone(),
            ClauseValue::Range(lo, hi) => format!("{lo}..{hi}"),
            ClauseValue::Tree(_) => String::new(),
        };
        return Ok(callback(name, &clause.op, &value));
    }

    let numeric = descriptor.is_some_and(|d| d.field_type.is_numeric());

    match &clause.value {
        ClauseValue::Range(lo, hi) => {
            let (l, h) = match (lo.parse::<i64>(), hi.parse::<i64>()) {
                (Ok(l), Ok(h)) => (l, h),
                _ => {
                    return Err(ParlanceError::Dialect(format!(
                        "range for field '{name}' must be numeric: {lo}..{hi}"
                    )));
                }
            };
            let body = (l..=h)
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" OR ");
            let rendered = format!("{name}=({body})");
            Ok(if negated || clause.op.contains('!') {
                format!("NOT {rendered}")
            } else {
                rendered
            })
        }
        ClauseValue::Term(raw) => {
            let mut value = raw.clone();
            if numeric {
                value.retain(|c| c != WILDCARD && c != '?');
            }
            let fuzzy = clause.op.contains('~') && clause.proximity.is_none();
            if fuzzy && !numeric && !value.ends_with(WILDCARD) {
                value.push(WILDCARD);
            }
            let quoted = if numeric {
                value
            } else {
                format!("\"{value}\"")
            };
            let op_negated = clause.op.starts_with('!');
            if fuzzy && (negated || op_negated) {
                Ok(format!("NOT {name}={quoted}"))
            } else if negated || op_negated {
                Ok(format!("{name}=(NOT {quoted})"))
            } else {
                Ok(format!("{name}={quoted}"))
            }
        }
        ClauseValue::Tree(_) => Err(ParlanceError::Dialect(
            "group clause cannot carry a field".to_string(),
        )),
    }
}
