//! # parlance
//!
//! Polyglot search-query library: parses a compact, human-oriented query
//! language into a boolean AST, expands and validates it against a field
//! schema, and serializes it into one of several backend dialects (a
//! normalized native form, SQL `WHERE` fragments, and a Swish-e style form).
//!
//! Queries are built from clauses - `field op value` leaves, quoted phrases
//! with proximity, parenthesized groups - that land in one of three buckets:
//! must match (`+`), should match, and must not match (`-`).
//!
//! ```rust
//! use parlance::{ParserConfig, QueryParser};
//!
//! let parser = QueryParser::new(ParserConfig::default()).unwrap();
//! let query = parser.parse("+hello -world now").unwrap();
//! assert_eq!(query.render().unwrap(), "+hello +now -world");
//! ```
//!
//! With a field registry and a dialect, the same input becomes a backend
//! query:
//!
//! ```rust
//! use parlance::{DialectKind, DialectOpts, ParserConfig, QueryParser};
//!
//! let parser = QueryParser::new(
//!     ParserConfig::new()
//!         .with_field_names(["title", "body"])
//!         .with_dialect(DialectKind::Sql)
//!         .with_dialect_opts(DialectOpts::default().with_fuzzify(true)),
//! )
//! .unwrap();
//! let query = parser.parse("title:rust").unwrap();
//! assert_eq!(query.render().unwrap(), "title ILIKE 'rust%'");
//! ```

pub mod clause;
pub mod config;
pub mod context;
pub mod dialect;
pub mod error;
pub mod expand;
pub mod field;
pub mod parser;
pub mod query;
pub mod tree;

pub use clause::{BucketKey, Clause, ClauseValue};
pub use config::{BoolOp, DialectOpts, GrammarConfig, ParserConfig, TermExpander};
pub use context::QueryContext;
pub use dialect::DialectKind;
pub use error::{ParlanceError, Result};
pub use field::{fields_from_json, AliasSpec, Field, FieldRegistry, FieldSpec, FieldType};
pub use parser::QueryParser;
pub use query::Query;
pub use tree::QueryTree;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
