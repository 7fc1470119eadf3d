//! Field descriptors and the field registry
//!
//! A `Field` describes one searchable attribute: its canonical name, the
//! aliases that resolve to it, its value type, and optional per-field hooks
//! (a serialization callback and a value validator). The `FieldRegistry` is
//! the immutable name-to-descriptor map a parser is configured with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ParlanceError, Result};

/// Value type of a field
///
/// Numeric families disable value quoting at serialization time and forbid
/// wildcards inside range endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text (the default)
    #[default]
    Char,
    /// Integer
    Int,
    /// Floating point
    Float,
    /// Boolean
    Bool,
    /// Date
    Date,
    /// Time
    Time,
}

impl FieldType {
    /// Whether values of this type are numeric-family (unquoted, no
    /// wildcards in ranges).
    pub fn is_numeric(&self) -> bool {
        !matches!(self, FieldType::Char)
    }
}

/// Per-field rewrite hook invoked at serialization time with
/// `(field, op, value)`; its return value replaces the rendered clause
/// verbatim.
pub type FieldCallback = Arc<dyn Fn(&str, &str, &str) -> String + Send + Sync>;

/// Per-field value validator. Returns `Err(detail)` to reject a value.
pub type FieldValidator = Arc<dyn Fn(&str) -> std::result::Result<(), String> + Send + Sync>;

/// Descriptor for a single searchable field
#[derive(Clone, Default)]
pub struct Field {
    /// Canonical identifier
    pub name: String,
    /// Zero, one, or many alias targets. A multi-target alias fans a leaf
    /// out into an OR group at expansion time.
    pub alias_for: Vec<String>,
    /// Value type
    pub field_type: FieldType,
    /// Serialization-time rewrite hook
    pub callback: Option<FieldCallback>,
    /// Value validator; `None` accepts everything
    pub validator: Option<FieldValidator>,
    /// Override for the fuzzy operator (SQL); defaults per type
    pub fuzzy_op: Option<String>,
    /// Override for the negated fuzzy operator (SQL); defaults per type
    pub fuzzy_not_op: Option<String>,
}

impl Field {
    /// Create a text field with the given canonical name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the value type
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Make this field an alias for a single target field
    pub fn with_alias_for(mut self, target: impl Into<String>) -> Self {
        self.alias_for = vec![target.into()];
        self
    }

    /// Make this field an alias for several target fields (OR fan-out)
    pub fn with_alias_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias_for = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a serialization callback
    pub fn with_callback(mut self, callback: FieldCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Attach a value validator
    pub fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Override the fuzzy operator used by the SQL dialect
    pub fn with_fuzzy_op(mut self, op: impl Into<String>) -> Self {
        self.fuzzy_op = Some(op.into());
        self
    }

    /// Override the negated fuzzy operator used by the SQL dialect
    pub fn with_fuzzy_not_op(mut self, op: impl Into<String>) -> Self {
        self.fuzzy_not_op = Some(op.into());
        self
    }

    /// Whether this field is an alias (single- or multi-target)
    pub fn is_alias(&self) -> bool {
        !self.alias_for.is_empty()
    }

    /// Run the validator against a value, if one is attached
    pub fn validate(&self, value: &str) -> std::result::Result<(), String> {
        match &self.validator {
            Some(v) => v(value),
            None => Ok(()),
        }
    }
}

/// Declarative field description, deserializable from configuration data
/// such as `{"type": "int", "alias_for": ["field2", "mydefault"]}`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub alias_for: Option<AliasSpec>,
    #[serde(default)]
    pub fuzzy_op: Option<String>,
    #[serde(default)]
    pub fuzzy_not_op: Option<String>,
}

/// Alias target(s) in a field spec: a single name or a list
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum AliasSpec {
    One(String),
    Many(Vec<String>),
}

impl Field {
    /// Build a descriptor from a declarative spec
    pub fn from_spec(name: impl Into<String>, spec: FieldSpec) -> Self {
        let alias_for = match spec.alias_for {
            None => Vec::new(),
            Some(AliasSpec::One(target)) => vec![target],
            Some(AliasSpec::Many(targets)) => targets,
        };
        Self {
            name: name.into(),
            alias_for,
            field_type: spec.field_type,
            callback: None,
            validator: None,
            fuzzy_op: spec.fuzzy_op,
            fuzzy_not_op: spec.fuzzy_not_op,
        }
    }
}

/// Normalize the configuration forms of a field registry: a JSON array of
/// names, or a map of name to spec. Anything else is a configuration error.
pub fn fields_from_json(value: &serde_json::Value) -> Result<Vec<Field>> {
    match value {
        serde_json::Value::Array(names) => names
            .iter()
            .map(|entry| {
                entry.as_str().map(Field::new).ok_or_else(|| {
                    ParlanceError::Config(format!("field name must be a string: {entry}"))
                })
            })
            .collect(),
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(name, spec)| {
                let spec: FieldSpec = serde_json::from_value(spec.clone()).map_err(|e| {
                    ParlanceError::Config(format!("bad spec for field '{name}': {e}"))
                })?;
                Ok(Field::from_spec(name, spec))
            })
            .collect(),
        other => Err(ParlanceError::Config(format!(
            "field registry must be a list of names or a map of specs, got {other}"
        ))),
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("alias_for", &self.alias_for)
            .field("field_type", &self.field_type)
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("fuzzy_op", &self.fuzzy_op)
            .field("fuzzy_not_op", &self.fuzzy_not_op)
            .finish()
    }
}

/// Immutable name-to-descriptor map
///
/// Backed by a `BTreeMap` so that iteration order (used when a fieldless SQL
/// clause fans out across all fields) is deterministic.
#[derive(Clone, Debug, Default)]
pub struct FieldRegistry {
    fields: BTreeMap<String, Field>,
}

impl FieldRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry of plain text fields from a list of names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.insert(Field::new(name));
        }
        registry
    }

    /// Insert a descriptor, replacing any previous one with the same name
    pub fn insert(&mut self, field: Field) {
        self.fields.insert(field.name.clone(), field);
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Field names in deterministic (sorted) order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
