//! Grammar compilation and the input cursor
//!
//! Every token class of the query grammar is a configurable regex fragment
//! (see `GrammarConfig`); this module compiles the fragments once per parser
//! and provides the byte cursor the parse loop advances over the input.

use regex::Regex;

use crate::config::GrammarConfig;
use crate::error::{ParlanceError, Result};

/// Compiled grammar token classes
#[derive(Debug)]
pub struct Grammar {
    /// Bareword terms, anchored
    pub term: Regex,
    /// Field identifiers, anchored
    pub field: Regex,
    /// Field operators, anchored, alternatives tried in order
    pub op: Regex,
    /// Fieldless operators, anchored
    pub op_nofield: Regex,
    /// AND keyword, anchored, case-insensitive
    pub and_kw: Regex,
    /// OR keyword, anchored, case-insensitive
    pub or_kw: Regex,
    /// NOT keyword, anchored, case-insensitive
    pub not_kw: Regex,
    /// Proximity keyword, anchored, case-insensitive
    pub near: Regex,
    /// Range separator, unanchored (searched inside a term)
    pub range: Regex,
    /// Sloppy-mode token class, unanchored
    pub sloppy_term: Regex,
}

impl Grammar {
    /// Compile a grammar from configuration fragments
    pub fn compile(config: &GrammarConfig) -> Result<Self> {
        Ok(Self {
            term: anchored("term_regex", &config.term_regex)?,
            field: anchored("field_regex", &config.field_regex)?,
            op: anchored("op_regex", &config.op_regex)?,
            op_nofield: anchored("op_nofield_regex", &config.op_nofield_regex)?,
            and_kw: keyword("and_regex", &config.and_regex)?,
            or_kw: keyword("or_regex", &config.or_regex)?,
            not_kw: keyword("not_regex", &config.not_regex)?,
            near: keyword("near_regex", &config.near_regex)?,
            range: unanchored("range_regex", &config.range_regex)?,
            sloppy_term: unanchored("sloppy_term_regex", &config.sloppy_term_regex)?,
        })
    }

    /// Whether a token is exactly one of the boolean/proximity keywords.
    /// Used by sloppy mode to discard structure words.
    pub fn is_keyword(&self, token: &str) -> bool {
        for re in [&self.and_kw, &self.or_kw, &self.not_kw, &self.near] {
            if let Some(m) = re.find(token) {
                if m.end() == token.len() {
                    return true;
                }
            }
        }
        false
    }
}

fn compile(name: &str, pattern: String) -> Result<Regex> {
    Regex::new(&pattern)
        .map_err(|e| ParlanceError::Config(format!("bad {name}: {e}")))
}

fn anchored(name: &str, fragment: &str) -> Result<Regex> {
    compile(name, format!(r"\A(?:{fragment})"))
}

fn keyword(name: &str, fragment: &str) -> Result<Regex> {
    compile(name, format!(r"\A(?i:{fragment})"))
}

fn unanchored(name: &str, fragment: &str) -> Result<Regex> {
    compile(name, format!(r"(?:{fragment})"))
}

/// Byte cursor over the query input
///
/// All token regexes are anchored, so matching always happens at the front
/// of `rest()`; consuming a match advances the position.
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// The full original input
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Unconsumed remainder of the input
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Current byte position, for save/restore around speculative matches
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Restore a previously saved position
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn advance(&mut self, bytes: usize) {
        self.pos += bytes;
    }

    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn skip_ws(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    /// Consume a single expected character
    pub fn eat_char(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume an anchored regex match at the front of the remainder.
    /// Zero-width matches are rejected; an empty token cannot advance the
    /// parse.
    pub fn eat_regex(&mut self, re: &Regex) -> Option<&'a str> {
        let m = re.find(self.rest())?;
        if m.end() == 0 {
            return None;
        }
        let text = &self.rest()[..m.end()];
        self.pos += m.end();
        Some(text)
    }

    /// Consume a keyword match, requiring a word boundary after it so that
    /// `android` is never read as `AND` + `roid`
    pub fn eat_keyword(&mut self, re: &Regex) -> Option<&'a str> {
        let m = re.find(self.rest())?;
        if m.end() == 0 {
            return None;
        }
        let matched = &self.rest()[..m.end()];
        if matched.chars().last().is_some_and(is_word_char) {
            let next = self.rest()[m.end()..].chars().next();
            if next.is_some_and(is_word_char) {
                return None;
            }
        }
        self.pos += m.end();
        Some(matched)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
