//! Sequential, rewindable view over the raw input tokens.
//!
//! One cursor is created per top-level invocation and passed `&mut` down
//! through nested command dispatch; it is never cloned, since a copy would
//! split the consumption history. The trace of consumed tokens backs error
//! context and contextual usage lines.

use crate::error::Error;

/// Cursor over an ordered sequence of raw tokens.
///
/// `next_token` and `rewind` are exact inverses: no token is ever lost or
/// duplicated. In normal operation at most one token is pending rewind at
/// a time (a non-matching token handed back for positional fallback).
#[derive(Debug)]
pub struct TokenCursor {
    tokens: Vec<String>,
    pos: usize,
}

impl TokenCursor {
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            pos: 0,
        }
    }

    /// Consume and return the next token, appending it to the trace.
    pub fn next_token(&mut self) -> Result<String, Error> {
        let token = self.tokens.get(self.pos).ok_or(Error::TokenExhausted)?;
        self.pos += 1;
        Ok(token.clone())
    }

    /// Un-consume the most recently consumed token, making it next again
    /// and dropping it from the trace.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been consumed. That is a programming error in
    /// the dispatch loop, not a parse error.
    pub fn rewind(&mut self) {
        assert!(self.pos > 0, "rewind called with nothing consumed");
        self.pos -= 1;
    }

    /// Whether at least one token remains. Never consumes.
    pub fn has_next(&self) -> bool {
        self.pos < self.tokens.len()
    }

    /// The next token without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    /// Tokens consumed so far on this path, in consumption order.
    pub fn trace(&self) -> &[String] {
        &self.tokens[..self.pos]
    }
}
