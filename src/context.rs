//! Shared query context
//!
//! The `QueryContext` carries everything a tree needs after parsing: the
//! field registry, the default field/operator, and the dialect options. It
//! is built once by `QueryParser::new`, never mutated afterwards, and shared
//! behind an `Arc` by the parser and every `Query` it returns - trees may
//! therefore outlive their parser without back-references.

use crate::config::DialectOpts;
use crate::field::{Field, FieldRegistry};

/// Immutable context shared by a parser and its queries
#[derive(Clone, Debug, Default)]
pub struct QueryContext {
    /// Field registry; empty when the parser was configured without fields
    pub fields: FieldRegistry,
    /// Field injected into fieldless clauses at expansion time
    pub default_field: Option<String>,
    /// Operator injected together with the default field
    pub default_op: String,
    /// Dialect rendering options
    pub opts: DialectOpts,
}

impl QueryContext {
    /// Look up a field descriptor
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Field names a fieldless clause expands across: the default field if
    /// set, otherwise every registered field in deterministic order.
    pub fn expansion_fields(&self) -> Vec<&str> {
        match &self.default_field {
            Some(field) => vec![field.as_str()],
            None => self.fields.names().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expansion_fields_prefers_default() {
        let ctx = QueryContext {
            fields: FieldRegistry::from_names(["a", "b"]),
            default_field: Some("b".to_string()),
            default_op: ":".to_string(),
            opts: DialectOpts::default(),
        };
        assert_eq!(ctx.expansion_fields(), vec!["b"]);
    }

    #[test]
    fn test_expansion_fields_falls_back_to_registry() {
        let ctx = QueryContext {
            fields: FieldRegistry::from_names(["b", "a"]),
            default_field: None,
            default_op: ":".to_string(),
            opts: DialectOpts::default(),
        };
        assert_eq!(ctx.expansion_fields(), vec!["a", "b"]);
    }
}
