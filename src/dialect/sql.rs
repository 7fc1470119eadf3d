//! SQL dialect - `WHERE`-clause fragments
//!
//! Rendering rules:
//! - `:` normalizes to `=`; a clause in the `-` bucket negates its operator
//! - `*` in a value normalizes to the configured wildcard (default `%`);
//!   a value containing the wildcard switches to the field's fuzzy operator
//!   (default `ILIKE`, negated `NOT ILIKE`; `>=` / `! >=` for numeric
//!   fields)
//! - `fuzzify` appends the wildcard when absent; `fuzzify2` wraps both ends
//! - numeric fields strip wildcards and render unquoted; text values quote
//!   with `'` (embedded quotes doubled)
//! - ranges render as `BETWEEN lo AND hi`
//! - a fieldless clause expands across the default field or, failing that,
//!   every registered field, OR-joined
//! - a field callback's return value replaces the rendered clause verbatim

use crate::clause::{BucketKey, Clause, ClauseValue};
use crate::context::QueryContext;
use crate::error::{ParlanceError, Result};
use crate::field::Field;
use crate::tree::QueryTree;

const DEFAULT_WILDCARD: char = '%';

pub fn stringify(tree: &QueryTree, ctx: &QueryContext) -> Result<String> {
    super::join_boolean_buckets(tree, |clause, key| stringify_clause(clause, key, ctx))
}

fn stringify_clause(clause: &Clause, key: BucketKey, ctx: &QueryContext) -> Result<String> {
    let negated = key == BucketKey::MustNot;
    if let ClauseValue::Tree(sub) = &clause.value {
        let inner = stringify(sub, ctx)?;
        return Ok(if negated {
            format!("NOT ({inner})")
        } else {
            format!("({inner})")
        });
    }

    match clause.field.as_deref() {
        Some(name) => render_leaf(clause, name, negated, ctx),
        None => {
            let names = ctx.expansion_fields();
            if names.is_empty() {
                return Err(ParlanceError::Dialect(
                    "clause has no field and no fields are configured".to_string(),
                ));
            }
            let mut parts = names
                .iter()
                .map(|name| render_leaf(clause, name, negated, ctx))
                .collect::<Result<Vec<_>>>()?;
            if parts.len() == 1 {
                Ok(parts.remove(0))
            } else {
                Ok(format!("({})", parts.join(" OR ")))
            }
        }
    }
}

fn render_leaf(clause: &Clause, name: &str, negated: bool, ctx: &QueryContext) -> Result<String> {
    let descriptor = ctx.fields.get(name);

    if let Some(callback) = descriptor.and_then(|d| d.callback.as_ref()) {
        let value = callback_value(clause);
        return Ok(callback(name, &clause.op, &value));
    }

    let numeric = descriptor.is_some_and(|d| d.field_type.is_numeric());
    let wildcard = ctx.opts.wildcard.unwrap_or(DEFAULT_WILDCARD);
    let quoted_field = quote_field(name, ctx);

    match &clause.value {
        ClauseValue::Range(lo, hi) => {
            let keyword = if negated || clause.op.contains('!') {
                "NOT BETWEEN"
            } else {
                "BETWEEN"
            };
            Ok(format!(
                "{quoted_field} {keyword} {} AND {}",
                quote_value(lo, numeric),
                quote_value(hi, numeric)
            ))
        }
        ClauseValue::Term(raw) => {
            let mut value = raw.replace('*', &wildcard.to_string());
            let wants_fuzzy = value.contains(wildcard) || ctx.opts.fuzzify || ctx.opts.fuzzify2;
            if numeric {
                value.retain(|c| c != wildcard && c != '?');
            } else if ctx.opts.fuzzify2 {
                if !value.starts_with(wildcard) {
                    value.insert(0, wildcard);
                }
                if !value.ends_with(wildcard) {
                    value.push(wildcard);
                }
            } else if ctx.opts.fuzzify && !value.contains(wildcard) {
                value.push(wildcard);
            }

            let mut op = normalize_op(&clause.op);
            let mut wrap_not = false;
            if negated && !op.starts_with('!') {
                match op.as_str() {
                    "=" => op = "!=".to_string(),
                    "~" => op = "!~".to_string(),
                    "<" | "<=" | ">" | ">=" => wrap_not = true,
                    _ => op = format!("!{op}"),
                }
            }

            let fuzzy = op.contains('~')
                || (if numeric {
                    wants_fuzzy
                } else {
                    value.contains(wildcard)
                });
            if fuzzy {
                op = if op.starts_with('!') {
                    fuzzy_not_op(descriptor, numeric, ctx)
                } else {
                    fuzzy_op(descriptor, numeric, ctx)
                };
            }

            let comparison = format!("{quoted_field} {op} {}", quote_value(&value, numeric));
            Ok(if wrap_not {
                format!("NOT ({comparison})")
            } else {
                comparison
            })
        }
        ClauseValue::Tree(_) => Err(ParlanceError::Dialect(
            "group clause cannot carry a field".to_string(),
        )),
    }
}

fn callback_value(clause: &Clause) -> String {
    match &clause.value {
        ClauseValue::Term(v) => v.clone(),
        ClauseValue::Range(lo, hi) => format!("{lo}..{hi}"),
        ClauseValue::Tree(_) => String::new(),
    }
}

fn normalize_op(op: &str) -> String {
    match op {
        ":" | "==" | "#" => "=".to_string(),
        "=~" => "~".to_string(),
        other => other.to_string(),
    }
}

fn quote_field(name: &str, ctx: &QueryContext) -> String {
    let quote = &ctx.opts.quote_fields;
    format!("{quote}{name}{quote}")
}

fn quote_value(value: &str, numeric: bool) -> String {
    if numeric {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

fn fuzzy_op(descriptor: Option<&Field>, numeric: bool, ctx: &QueryContext) -> String {
    descriptor
        .and_then(|d| d.fuzzy_op.clone())
        .unwrap_or_else(|| {
            if numeric {
                ">=".to_string()
            } else {
                ctx.opts.like.clone()
            }
        })
}

fn fuzzy_not_op(descriptor: Option<&Field>, numeric: bool, ctx: &QueryContext) -> String {
    descriptor
        .and_then(|d| d.fuzzy_not_op.clone())
        .unwrap_or_else(|| {
            if numeric {
                "! >=".to_string()
            } else {
                format!("NOT {}", ctx.opts.like)
            }
        })
}
