//! Post-parse tree rewrites: default-field injection, alias expansion, and
//! value validation
//!
//! Runs only when the parser is configured with a field registry. The walk
//! is idempotent - expanding an already expanded tree changes nothing -
//! which keeps hand-built and translated trees safe to re-validate.

use tracing::trace;

use crate::clause::{BucketKey, Clause, ClauseValue};
use crate::context::QueryContext;
use crate::error::{ParlanceError, Result};
use crate::field::{Field, FieldType};
use crate::tree::QueryTree;

/// Expand and validate every leaf of the tree against the registry
pub fn expand_tree(tree: &mut QueryTree, ctx: &QueryContext, sloppy: bool) -> Result<()> {
    for key in BucketKey::ALL {
        for clause in tree.bucket_mut(key) {
            expand_clause(clause, ctx, sloppy)?;
        }
    }
    Ok(())
}

fn expand_clause(clause: &mut Clause, ctx: &QueryContext, sloppy: bool) -> Result<()> {
    if let ClauseValue::Tree(sub) = &mut clause.value {
        return expand_tree(sub, ctx, sloppy);
    }

    // fieldless leaves pick up the configured default
    if clause.field.is_none() {
        let Some(default_field) = &ctx.default_field else {
            return Ok(());
        };
        clause.field = Some(default_field.clone());
        if clause.op == ":" {
            clause.op = ctx.default_op.clone();
        }
    }
    let name = match &clause.field {
        Some(name) => name.clone(),
        None => return Ok(()),
    };

    let Some(descriptor) = ctx.fields.get(&name) else {
        if sloppy {
            return Ok(());
        }
        return Err(ParlanceError::UnknownField(name));
    };

    match descriptor.alias_for.as_slice() {
        [] => validate_leaf(descriptor, clause),
        [target] => {
            trace!(alias = %name, target = %target, "alias rename");
            clause.field = Some(target.clone());
            match ctx.fields.get(target) {
                Some(d) => validate_leaf(d, clause),
                None => Ok(()),
            }
        }
        targets => {
            // multi-target alias fans the leaf out into an OR group
            let mut sub = QueryTree::new();
            for target in targets {
                let mut leaf = clause.clone();
                leaf.field = Some(target.clone());
                if let Some(d) = ctx.fields.get(target) {
                    validate_leaf(d, &leaf)?;
                }
                sub.push(BucketKey::Should, leaf);
            }
            trace!(alias = %name, targets = targets.len(), "alias fan-out");
            *clause = Clause::group(sub);
            Ok(())
        }
    }
}

fn validate_leaf(field: &Field, clause: &Clause) -> Result<()> {
    match &clause.value {
        ClauseValue::Term(value) => check_value(field, value),
        ClauseValue::Range(lo, hi) => {
            check_endpoint(field, lo)?;
            check_endpoint(field, hi)
        }
        ClauseValue::Tree(_) => Ok(()),
    }
}

fn check_value(field: &Field, value: &str) -> Result<()> {
    field
        .validate(value)
        .map_err(|detail| ParlanceError::InvalidFieldValue {
            field: field.name.clone(),
            value: value.to_string(),
            detail,
        })
}

fn check_endpoint(field: &Field, endpoint: &str) -> Result<()> {
    let reject = |detail: &str| ParlanceError::InvalidFieldValue {
        field: field.name.clone(),
        value: endpoint.to_string(),
        detail: detail.to_string(),
    };
    if field.field_type.is_numeric() && endpoint.contains(['*', '%', '?']) {
        return Err(reject("wildcard not allowed in numeric range"));
    }
    match field.field_type {
        FieldType::Int if endpoint.parse::<i64>().is_err() => Err(reject("not an integer")),
        FieldType::Float if endpoint.parse::<f64>().is_err() => Err(reject("not a number")),
        _ => check_value(field, endpoint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DialectOpts;
    use crate::field::FieldRegistry;
    use std::sync::Arc;

    fn ctx_with(fields: Vec<Field>, default_field: Option<&str>) -> QueryContext {
        let mut registry = FieldRegistry::new();
        for field in fields {
            registry.insert(field);
        }
        QueryContext {
            fields: registry,
            default_field: default_field.map(str::to_string),
            default_op: ":".to_string(),
            opts: DialectOpts::default(),
        }
    }

    fn leaf(field: Option<&str>, op: &str, term: &str) -> Clause {
        Clause::term(field.map(str::to_string), op, term)
    }

    #[test]
    fn test_default_field_injection() {
        let ctx = ctx_with(vec![Field::new("content")], Some("content"));
        let mut tree = QueryTree::new();
        tree.push(BucketKey::Must, leaf(None, ":", "rust"));
        expand_tree(&mut tree, &ctx, false).unwrap();
        assert_eq!(tree.must[0].field.as_deref(), Some("content"));
    }

    #[test]
    fn test_explicit_op_survives_injection() {
        let ctx = ctx_with(vec![Field::new("content")], Some("content"));
        let mut tree = QueryTree::new();
        tree.push(BucketKey::Must, leaf(None, "~", "rust"));
        expand_tree(&mut tree, &ctx, false).unwrap();
        assert_eq!(tree.must[0].op, "~");
    }

    #[test]
    fn test_single_alias_renames() {
        let ctx = ctx_with(
            vec![Field::new("body"), Field::new("text").with_alias_for("body")],
            None,
        );
        let mut tree = QueryTree::new();
        tree.push(BucketKey::Must, leaf(Some("text"), ":", "rust"));
        expand_tree(&mut tree, &ctx, false).unwrap();
        assert_eq!(tree.must[0].field.as_deref(), Some("body"));
    }

    #[test]
    fn test_multi_alias_fans_out() {
        let ctx = ctx_with(
            vec![
                Field::new("field2"),
                Field::new("mydefault"),
                Field::new("field1").with_alias_targets(["field2", "mydefault"]),
            ],
            None,
        );
        let mut tree = QueryTree::new();
        tree.push(BucketKey::Must, leaf(Some("field1"), "=", "green"));
        expand_tree(&mut tree, &ctx, false).unwrap();

        let group = &tree.must[0];
        assert!(group.is_group());
        let sub = group.value.as_tree().unwrap();
        let fields: Vec<&str> = sub
            .should
            .iter()
            .filter_map(|c| c.field.as_deref())
            .collect();
        assert_eq!(fields, vec!["field2", "mydefault"]);
        for alias_leaf in &sub.should {
            assert_eq!(alias_leaf.op, "=");
            assert_eq!(alias_leaf.value.as_term(), Some("green"));
        }
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let ctx = ctx_with(
            vec![
                Field::new("a"),
                Field::new("b"),
                Field::new("both").with_alias_targets(["a", "b"]),
            ],
            None,
        );
        let mut tree = QueryTree::new();
        tree.push(BucketKey::Must, leaf(Some("both"), ":", "x"));
        expand_tree(&mut tree, &ctx, false).unwrap();
        let once = tree.clone();
        expand_tree(&mut tree, &ctx, false).unwrap();
        assert_eq!(tree, once);
    }

    #[test]
    fn test_unknown_field_strict_vs_sloppy() {
        let ctx = ctx_with(vec![Field::new("color")], None);
        let mut tree = QueryTree::new();
        tree.push(BucketKey::Must, leaf(Some("shape"), ":", "round"));
        let err = expand_tree(&mut tree.clone(), &ctx, false).unwrap_err();
        assert_eq!(err.to_string(), "Unknown field: shape");
        expand_tree(&mut tree, &ctx, true).unwrap();
        assert_eq!(tree.must[0].field.as_deref(), Some("shape"));
    }

    #[test]
    fn test_validator_rejection_message() {
        let age = Field::new("age").with_validator(Arc::new(|v: &str| {
            v.parse::<u32>()
                .map(|_| ())
                .map_err(|_| "not an integer".to_string())
        }));
        let ctx = ctx_with(vec![age], None);
        let mut tree = QueryTree::new();
        tree.push(BucketKey::Must, leaf(Some("age"), ":", "abc"));
        let err = expand_tree(&mut tree, &ctx, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid field value for age: abc (not an integer)"
        );
    }

    #[test]
    fn test_validator_not_masked_by_sloppy() {
        let age = Field::new("age")
            .with_validator(Arc::new(|_: &str| Err("rejected".to_string())));
        let ctx = ctx_with(vec![age], None);
        let mut tree = QueryTree::new();
        tree.push(BucketKey::Must, leaf(Some("age"), ":", "1"));
        assert!(expand_tree(&mut tree, &ctx, true).is_err());
    }

    #[test]
    fn test_numeric_range_checks() {
        let ctx = ctx_with(vec![Field::new("year").with_type(FieldType::Int)], None);

        let mut ok = QueryTree::new();
        ok.push(
            BucketKey::Must,
            Clause::range(Some("year".to_string()), "..", "2020", "2024"),
        );
        expand_tree(&mut ok, &ctx, false).unwrap();

        let mut wild = QueryTree::new();
        wild.push(
            BucketKey::Must,
            Clause::range(Some("year".to_string()), "..", "20*", "2024"),
        );
        let err = expand_tree(&mut wild, &ctx, false).unwrap_err();
        assert!(err.to_string().contains("wildcard not allowed"));

        let mut bad = QueryTree::new();
        bad.push(
            BucketKey::Must,
            Clause::range(Some("year".to_string()), "..", "abc", "2024"),
        );
        let err = expand_tree(&mut bad, &ctx, false).unwrap_err();
        assert!(err.to_string().contains("not an integer"));
    }

    #[test]
    fn test_groups_are_entered() {
        let ctx = ctx_with(vec![Field::new("real")], Some("real"));
        let mut sub = QueryTree::new();
        sub.push(BucketKey::Should, leaf(None, ":", "inner"));
        let mut tree = QueryTree::new();
        tree.push(BucketKey::Must, Clause::group(sub));
        expand_tree(&mut tree, &ctx, false).unwrap();
        let group = tree.must[0].value.as_tree().unwrap();
        assert_eq!(group.should[0].field.as_deref(), Some("real"));
    }
}
