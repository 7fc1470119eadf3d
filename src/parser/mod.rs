//! Recursive descent parser for the search-query language
//!
//! Supports syntax like:
//! - `title:rust and tags:tutorial`
//! - `+hello -world now`
//! - `color=(red or green)`
//! - `"exact phrase"~2`
//! - `foo NEAR5 bar`
//! - `date=(1..10)`
//!
//! # Grammar
//!
//! ```text
//! query      := ws? clause (bool_sep clause)* ws?
//! clause     := sign? (field op)? value
//! sign       := '+' | '-' | NOT | '!' (not followed by ':' '=' '~')
//! field      := quoted | bareword matching field_regex
//! op         := op_regex after a field; op_nofield_regex without one
//! value      := phrase | '(' query ')' | term
//! phrase     := '"' chars '"' ('~' digits)?
//! term       := term_regex; may contain a 'lo..hi' range
//! bool_sep   := AND | OR | (nothing)
//! ```
//!
//! Every token class is a configurable regex (see `GrammarConfig`). Clauses
//! land in one of three buckets - must (`+`), should (`""`), must_not (`-`) -
//! selected from the default boolean, the sign prefix, and any pending
//! AND/OR connector.
//!
//! # Sloppy mode
//!
//! With `sloppy` set the parser never fails: it salvages word-like tokens
//! from the input, drops boolean keywords and stray punctuation, and returns
//! a flat OR of the survivors. Field/operator structure is not recovered.

pub mod grammar;

use std::sync::Arc;
use tracing::{debug, trace};

use crate::clause::{BucketKey, Clause, ClauseValue};
use crate::config::{BoolOp, ParserConfig, TermExpander};
use crate::context::QueryContext;
use crate::dialect::{DialectKind, SWISH_DEFAULT_FIELD};
use crate::error::{ParlanceError, Result};
use crate::expand;
use crate::field::{Field, FieldRegistry};
use crate::query::Query;
use crate::tree::QueryTree;

use grammar::{Cursor, Grammar};

/// Boolean connector pending between two clauses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Connector {
    And,
    Or,
}

/// Parser for the search-query language
///
/// A parser is immutable after construction and can be shared freely; every
/// `Query` it returns keeps the field registry alive through a shared
/// context, so queries may outlive the parser.
pub struct QueryParser {
    grammar: Grammar,
    ctx: Arc<QueryContext>,
    dialect: DialectKind,
    default_boolop: BoolOp,
    sloppy: bool,
    term_expander: Option<TermExpander>,
    phrase_delim: char,
}

impl std::fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryParser")
            .field("grammar", &self.grammar)
            .field("ctx", &self.ctx)
            .field("dialect", &self.dialect)
            .field("default_boolop", &self.default_boolop)
            .field("sloppy", &self.sloppy)
            .field("term_expander", &self.term_expander.is_some())
            .field("phrase_delim", &self.phrase_delim)
            .finish()
    }
}

impl QueryParser {
    /// Build a parser from configuration
    ///
    /// Compiles the grammar regexes and normalizes the field registry;
    /// either failing is a `Config` error.
    pub fn new(config: ParserConfig) -> Result<Self> {
        let grammar = Grammar::compile(&config.grammar)?;

        let mut registry = FieldRegistry::new();
        for field in &config.fields {
            if field.name.is_empty() {
                return Err(ParlanceError::Config("field with empty name".to_string()));
            }
            if registry.contains(&field.name) {
                return Err(ParlanceError::Config(format!(
                    "duplicate field: {}",
                    field.name
                )));
            }
            registry.insert(field.clone());
        }
        // SWISH carries an implicit catch-all field
        if config.dialect == DialectKind::Swish
            && !registry.is_empty()
            && !registry.contains(SWISH_DEFAULT_FIELD)
        {
            registry.insert(Field::new(SWISH_DEFAULT_FIELD));
        }

        let ctx = Arc::new(QueryContext {
            fields: registry,
            default_field: config.default_field,
            default_op: config.default_op,
            opts: config.dialect_opts,
        });

        Ok(Self {
            grammar,
            ctx,
            dialect: config.dialect,
            default_boolop: config.default_boolop,
            sloppy: config.sloppy,
            term_expander: config.term_expander,
            phrase_delim: config.phrase_delim,
        })
    }

    /// The context shared with queries produced by this parser
    pub fn context(&self) -> &Arc<QueryContext> {
        &self.ctx
    }

    /// Parse a query string into a `Query` bound to the configured dialect
    pub fn parse(&self, input: &str) -> Result<Query> {
        debug!(query = input, sloppy = self.sloppy, "parsing query");
        let mut tree = if self.sloppy {
            self.sloppify(input)
        } else {
            self.parse_strict(input)?
        };
        if !self.ctx.fields.is_empty() {
            expand::expand_tree(&mut tree, &self.ctx, self.sloppy)?;
        }
        Ok(Query::new(tree, self.dialect, Arc::clone(&self.ctx)))
    }

    fn parse_strict(&self, input: &str) -> Result<QueryTree> {
        let mut cur = Cursor::new(input);
        let tree = self.parse_tree(&mut cur, None, None, 0)?;
        cur.skip_ws();
        if !cur.at_end() {
            return Err(ParlanceError::parse(
                input,
                format!("unexpected string in query: '{}'", cur.rest()),
            ));
        }
        if !tree.has_positive() {
            let msg = if tree.must_not.is_empty() {
                "query is empty"
            } else {
                "query contains only negated clauses"
            };
            return Err(ParlanceError::parse(input, msg));
        }
        Ok(tree)
    }

    /// One recursion level of the parse. `parent_field`/`parent_op` are bound
    /// inside a parenthesized value so that `color=(red or green)`
    /// distributes the field over the subclauses; `depth` distinguishes the
    /// top level from subqueries for `)` handling.
    fn parse_tree(
        &self,
        cur: &mut Cursor<'_>,
        parent_field: Option<&str>,
        parent_op: Option<&str>,
        depth: usize,
    ) -> Result<QueryTree> {
        let input = cur.input();
        let g = &self.grammar;
        let mut tree = QueryTree::new();
        let mut pre_bool: Option<Connector> = None;

        loop {
            cur.skip_ws();
            if cur.at_end() {
                if depth > 0 {
                    return Err(ParlanceError::parse(input, "no matching ) in query"));
                }
                break;
            }
            if cur.peek_char() == Some(')') {
                if depth > 0 {
                    cur.eat_char(')');
                    if pre_bool.is_some() {
                        return Err(ParlanceError::parse(
                            input,
                            "missing clause after boolean operator",
                        ));
                    }
                    return Ok(tree);
                }
                // stray ')' at top level surfaces as trailing input
                break;
            }

            // sign prefix
            let mut bucket = match self.default_boolop {
                BoolOp::And => BucketKey::Must,
                BoolOp::Or => BucketKey::Should,
            };
            if cur.eat_char('+') {
                bucket = BucketKey::Must;
            } else if cur.eat_char('-') {
                bucket = BucketKey::MustNot;
            } else if cur.eat_keyword(&g.not_kw).is_some() {
                bucket = BucketKey::MustNot;
            } else if self.eat_bare_negation(cur) {
                bucket = BucketKey::MustNot;
            }
            cur.skip_ws();

            // field and operator
            let mut field: Option<String> = parent_field.map(str::to_string);
            let mut op: String = parent_op.unwrap_or(":").to_string();
            let mut matched_field_op = false;
            if let Some((explicit_field, matched_op)) = self.eat_field_op(cur) {
                matched_field_op = true;
                if let Some(name) = explicit_field {
                    if let Some(parent) = parent_field {
                        return Err(ParlanceError::parse(
                            input,
                            format!("field '{name}' inside '{parent}' (nested fields are not allowed)"),
                        ));
                    }
                    field = Some(name);
                }
                op = matched_op;
            }

            // value
            let mut clause = self.eat_value(cur, input, &field, &op, depth)?;

            // NEAR keyword folds the following term into a phrase
            if let Some(c) = clause.as_mut() {
                loop {
                    cur.skip_ws();
                    let Some(near_tok) = cur.eat_keyword(&g.near) else {
                        break;
                    };
                    let distance = near_distance(near_tok);
                    cur.skip_ws();
                    let Some(next_term) = cur.eat_regex(&g.term) else {
                        return Err(ParlanceError::parse(
                            input,
                            format!("missing term after '{near_tok}'"),
                        ));
                    };
                    match &mut c.value {
                        ClauseValue::Term(v) => {
                            v.push(' ');
                            v.push_str(next_term);
                            c.proximity = Some(distance);
                            c.quote = Some(self.phrase_delim);
                        }
                        _ => {
                            return Err(ParlanceError::parse(
                                input,
                                "proximity keyword must follow a bareword term",
                            ));
                        }
                    }
                }
            }

            // boolean connector
            cur.skip_ws();
            let mut post_bool: Option<Connector> = None;
            if cur.eat_keyword(&g.and_kw).is_some() {
                post_bool = Some(Connector::And);
            } else if cur.eat_keyword(&g.or_kw).is_some() {
                post_bool = Some(Connector::Or);
            }

            if let (Some(pre), Some(post)) = (pre_bool, post_bool) {
                if pre != post {
                    return Err(ParlanceError::parse(
                        input,
                        "cannot mix AND/OR in the same expression; use parentheses",
                    ));
                }
            }
            let connector = pre_bool.or(post_bool);
            pre_bool = post_bool;

            let Some(clause) = clause else {
                if matched_field_op {
                    let shown = field.as_deref().unwrap_or("");
                    return Err(ParlanceError::parse(
                        input,
                        format!("missing value after '{shown}{op}'"),
                    ));
                }
                if cur.at_end() {
                    return Err(ParlanceError::parse(input, "unexpected end of query"));
                }
                return Err(ParlanceError::parse(
                    input,
                    format!("unexpected string in query: '{}'", cur.rest()),
                ));
            };

            // the connector can upgrade or downgrade the sign
            match connector {
                Some(Connector::Or) => {
                    if bucket == BucketKey::Must {
                        bucket = BucketKey::Should;
                    } else if bucket == BucketKey::MustNot {
                        return Err(ParlanceError::parse(
                            input,
                            "operands of OR cannot be negated",
                        ));
                    }
                }
                Some(Connector::And) => {
                    if bucket == BucketKey::Should {
                        bucket = BucketKey::Must;
                    }
                }
                None => {}
            }

            trace!(bucket = bucket.prefix(), op = %clause.op, "accepted clause");
            tree.push(bucket, clause);
        }

        if pre_bool.is_some() {
            return Err(ParlanceError::parse(
                input,
                "missing clause after boolean operator",
            ));
        }
        Ok(tree)
    }

    /// A bare `!` acts as a negation sign unless it starts an operator
    /// (`!=`, `!~`, `!:`)
    fn eat_bare_negation(&self, cur: &mut Cursor<'_>) -> bool {
        if let Some(after) = cur.rest().strip_prefix('!') {
            if !matches!(after.chars().next(), Some(':') | Some('=') | Some('~')) {
                cur.advance(1);
                return true;
            }
        }
        false
    }

    /// Try `"field" op`, `'field' op`, `field op`, then a fieldless
    /// operator. Rolls the cursor back on a partial match.
    fn eat_field_op(&self, cur: &mut Cursor<'_>) -> Option<(Option<String>, String)> {
        let g = &self.grammar;
        let start = cur.pos();
        for delim in ['"', '\''] {
            if cur.eat_char(delim) {
                if let Some(name) = cur.eat_regex(&g.field) {
                    if cur.eat_char(delim) {
                        cur.skip_ws();
                        if let Some(op) = cur.eat_regex(&g.op) {
                            cur.skip_ws();
                            return Some((Some(name.to_string()), op.to_string()));
                        }
                    }
                }
                cur.set_pos(start);
            }
        }
        if let Some(name) = cur.eat_regex(&g.field) {
            cur.skip_ws();
            if let Some(op) = cur.eat_regex(&g.op) {
                cur.skip_ws();
                return Some((Some(name.to_string()), op.to_string()));
            }
            cur.set_pos(start);
        }
        if let Some(op) = cur.eat_regex(&g.op_nofield) {
            cur.skip_ws();
            return Some((None, op.to_string()));
        }
        None
    }

    /// Consume one value: a quoted phrase, a parenthesized subquery, or a
    /// bareword term (possibly a range, possibly rewritten by the term
    /// expander). Returns `Ok(None)` when nothing value-like is present.
    fn eat_value(
        &self,
        cur: &mut Cursor<'_>,
        input: &str,
        field: &Option<String>,
        op: &str,
        depth: usize,
    ) -> Result<Option<Clause>> {
        let g = &self.grammar;

        if let Some((delim, text, proximity)) = self.eat_phrase(cur) {
            let mut clause = Clause::term(field.clone(), op, text).with_quote(delim);
            clause.proximity = proximity;
            return Ok(Some(clause));
        }

        if cur.eat_char('(') {
            let sub = self.parse_tree(cur, field.as_deref(), Some(op), depth + 1)?;
            if sub.is_empty() {
                return Err(ParlanceError::parse(
                    input,
                    "empty expression inside parentheses",
                ));
            }
            // a one-clause subquery collapses in place of a group
            let clause = match sub.into_single_clause() {
                Ok(single) => single,
                Err(sub) => Clause::group(sub),
            };
            return Ok(Some(clause));
        }

        if let Some(term) = cur.eat_regex(&g.term) {
            if let Some(m) = g.range.find(term) {
                let (lo, hi) = (&term[..m.start()], &term[m.end()..]);
                if !lo.is_empty() && !hi.is_empty() && !g.range.is_match(lo) && !g.range.is_match(hi)
                {
                    let range_op = if op.contains('!') { "!.." } else { ".." };
                    return Ok(Some(Clause::range(field.clone(), range_op, lo, hi)));
                }
            }
            if let Some(expander) = &self.term_expander {
                let replacements = expander(term);
                if replacements.len() >= 2 {
                    trace!(original = term, count = replacements.len(), "term expander fan-out");
                    let mut sub = QueryTree::new();
                    for replacement in replacements {
                        sub.push(
                            BucketKey::Should,
                            Clause::term(field.clone(), op, replacement),
                        );
                    }
                    return Ok(Some(Clause::group(sub)));
                }
                if let Some(single) = replacements.into_iter().next() {
                    return Ok(Some(Clause::term(field.clone(), op, single)));
                }
            }
            return Ok(Some(Clause::term(field.clone(), op, term)));
        }

        Ok(None)
    }

    /// Consume a quoted phrase; the proximity suffix is honored only after
    /// the configured phrase delimiter. An unterminated quote falls through
    /// to term parsing.
    fn eat_phrase(&self, cur: &mut Cursor<'_>) -> Option<(char, String, Option<u32>)> {
        let delim = cur.peek_char()?;
        if delim != self.phrase_delim && delim != '"' && delim != '\'' {
            return None;
        }
        let body = &cur.rest()[delim.len_utf8()..];
        let end = body.find(delim)?;
        let text = body[..end].to_string();
        cur.advance(delim.len_utf8() * 2 + end);

        let mut proximity = None;
        if delim == self.phrase_delim {
            if let Some(after) = cur.rest().strip_prefix('~') {
                let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
                if let Ok(n) = digits.parse::<u32>() {
                    cur.advance(1 + digits.len());
                    proximity = Some(n);
                }
            }
        }
        Some((delim, text, proximity))
    }

    /// Lenient recovery: keep every word-like token that is not a
    /// boolean/proximity keyword, OR-joined; keep the whole input as a
    /// single term when nothing survives.
    fn sloppify(&self, input: &str) -> QueryTree {
        let g = &self.grammar;
        let mut tree = QueryTree::new();
        for m in g.sloppy_term.find_iter(input) {
            let token = m.as_str();
            if g.is_keyword(token) {
                continue;
            }
            tree.push(BucketKey::Should, Clause::term(None, ":", token));
        }
        if tree.is_empty() && !input.trim().is_empty() {
            debug!("sloppy recovery kept the whole input as one term");
            tree.push(BucketKey::Should, Clause::term(None, ":", input.trim()));
        }
        tree
    }
}

fn near_distance(token: &str) -> u32 {
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(1)
}
