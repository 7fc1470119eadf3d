//! Parser configuration
//!
//! All knobs recognized by `QueryParser::new`: the grammar regex families,
//! the default field/operator/boolean, the field registry input, the target
//! dialect and its rendering options, sloppy mode, and the term expander
//! hook.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::dialect::DialectKind;
use crate::field::Field;

/// Implicit boolean joining adjacent clauses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolOp {
    /// Adjacent clauses must all match (`+` bucket)
    #[default]
    And,
    /// Adjacent clauses may match (`""` bucket)
    Or,
}

/// Term rewrite hook fired for each bareword term at parse time.
///
/// Returning an empty list leaves the term unchanged; one replacement
/// substitutes the value in place; two or more rewrite the leaf into an OR
/// group with one leaf per returned term.
pub type TermExpander = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Grammar token classes, as regex fragments
///
/// Fragments are compiled (anchored at the cursor) once at parser
/// construction; an invalid override is a configuration error. Keyword
/// classes match case-insensitively and only at word boundaries.
#[derive(Clone, Debug)]
pub struct GrammarConfig {
    /// Bareword terms
    pub term_regex: String,
    /// Field identifiers
    pub field_regex: String,
    /// Operators following a field; alternatives are tried in order, so
    /// longer glyphs must precede their prefixes (`==` before `=`)
    pub op_regex: String,
    /// Operators allowed without a field
    pub op_nofield_regex: String,
    /// AND connector keywords
    pub and_regex: String,
    /// OR connector keywords
    pub or_regex: String,
    /// NOT sign keyword
    pub not_regex: String,
    /// Proximity keyword (`NEAR5`)
    pub near_regex: String,
    /// Range separator inside a term (`lo..hi`)
    pub range_regex: String,
    /// Tokens salvaged from unparseable input in sloppy mode
    pub sloppy_term_regex: String,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            term_regex: r"[^\s()]+".to_string(),
            field_regex: r"[.\w]+".to_string(),
            op_regex: r"~\d+|==|<=|>=|!=|=~|!~|[:=<>~#]".to_string(),
            op_nofield_regex: r"=~|!~|[~:#]".to_string(),
            and_regex: r"AND|&&?".to_string(),
            or_regex: r"OR|\|\|?".to_string(),
            not_regex: r"NOT".to_string(),
            near_regex: r"NEAR\d+".to_string(),
            range_regex: r"\.\.".to_string(),
            sloppy_term_regex: r"[.\w]+".to_string(),
        }
    }
}

/// Dialect rendering options (`query_class_opts`)
#[derive(Clone, Debug)]
pub struct DialectOpts {
    /// SQL keyword for fuzzy text matching
    pub like: String,
    /// String wrapped around SQL field names (empty disables quoting)
    pub quote_fields: String,
    /// Wildcard glyph; `None` uses the dialect default (`%` for SQL,
    /// `*` for SWISH)
    pub wildcard: Option<char>,
    /// Append a trailing wildcard to every value
    pub fuzzify: bool,
    /// Surround every value with wildcards
    pub fuzzify2: bool,
}

impl Default for DialectOpts {
    fn default() -> Self {
        Self {
            like: "ILIKE".to_string(),
            quote_fields: String::new(),
            wildcard: None,
            fuzzify: false,
            fuzzify2: false,
        }
    }
}

impl DialectOpts {
    pub fn with_like(mut self, like: impl Into<String>) -> Self {
        self.like = like.into();
        self
    }

    pub fn with_quote_fields(mut self, quote: impl Into<String>) -> Self {
        self.quote_fields = quote.into();
        self
    }

    pub fn with_wildcard(mut self, wildcard: char) -> Self {
        self.wildcard = Some(wildcard);
        self
    }

    pub fn with_fuzzify(mut self, fuzzify: bool) -> Self {
        self.fuzzify = fuzzify;
        self
    }

    pub fn with_fuzzify2(mut self, fuzzify2: bool) -> Self {
        self.fuzzify2 = fuzzify2;
        self
    }
}

/// Full parser configuration
#[derive(Clone)]
pub struct ParserConfig {
    /// Implicit boolean for clauses without a sign or connector
    pub default_boolop: BoolOp,
    /// Field injected into fieldless clauses during expansion
    pub default_field: Option<String>,
    /// Operator injected together with the default field
    pub default_op: String,
    /// Field registry input; empty disables expansion and validation
    pub fields: Vec<Field>,
    /// Target dialect for rendered queries
    pub dialect: DialectKind,
    /// Dialect rendering options
    pub dialect_opts: DialectOpts,
    /// Lenient recovery mode; see the parser docs
    pub sloppy: bool,
    /// Term rewrite hook
    pub term_expander: Option<TermExpander>,
    /// Grammar token classes
    pub grammar: GrammarConfig,
    /// Phrase delimiter carrying proximity suffixes
    pub phrase_delim: char,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_boolop: BoolOp::And,
            default_field: None,
            default_op: ":".to_string(),
            fields: Vec::new(),
            dialect: DialectKind::Native,
            dialect_opts: DialectOpts::default(),
            sloppy: false,
            term_expander: None,
            grammar: GrammarConfig::default(),
            phrase_delim: '"',
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_boolop(mut self, boolop: BoolOp) -> Self {
        self.default_boolop = boolop;
        self
    }

    pub fn with_default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = Some(field.into());
        self
    }

    pub fn with_default_op(mut self, op: impl Into<String>) -> Self {
        self.default_op = op.into();
        self
    }

    /// Register full field descriptors
    pub fn with_fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        self.fields = fields.into_iter().collect();
        self
    }

    /// Register plain text fields from a list of names
    pub fn with_field_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = names.into_iter().map(Field::new).collect();
        self
    }

    /// Register fields from configuration data: a JSON array of names or a
    /// map of name to spec
    pub fn with_fields_json(mut self, value: &serde_json::Value) -> crate::error::Result<Self> {
        self.fields = crate::field::fields_from_json(value)?;
        Ok(self)
    }

    pub fn with_dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_dialect_opts(mut self, opts: DialectOpts) -> Self {
        self.dialect_opts = opts;
        self
    }

    pub fn with_sloppy(mut self, sloppy: bool) -> Self {
        self.sloppy = sloppy;
        self
    }

    pub fn with_term_expander(mut self, expander: TermExpander) -> Self {
        self.term_expander = Some(expander);
        self
    }

    pub fn with_grammar(mut self, grammar: GrammarConfig) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn with_phrase_delim(mut self, delim: char) -> Self {
        self.phrase_delim = delim;
        self
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("default_boolop", &self.default_boolop)
            .field("default_field", &self.default_field)
            .field("default_op", &self.default_op)
            .field("fields", &self.fields)
            .field("dialect", &self.dialect)
            .field("dialect_opts", &self.dialect_opts)
            .field("sloppy", &self.sloppy)
            .field(
                "term_expander",
                &self.term_expander.as_ref().map(|_| "<fn>"),
            )
            .field("grammar", &self.grammar)
            .field("phrase_delim", &self.phrase_delim)
            .finish()
    }
}
