//! Positional specifications: single typed value slots.
//!
//! A [`Positional`] consumes one token through its converter, or all
//! remaining tokens if marked `remaining`, or nothing at all for the switch
//! variant (a stored constant, which is how zero-operand flags and counted
//! flags are expressed). Positionals appear in two places: chained as an
//! option's operand list, and listed at the top level of a command node.

use crate::convert::{Convert, Converter};
use crate::cursor::TokenCursor;
use crate::error::Error;
use crate::value::Value;

use std::fmt;
use std::sync::Arc;

/// Where a positional is being parsed from. A `remaining` slot inside an
/// option's operand list stops at option-looking tokens so the next option
/// can still match; at the top level it slurps everything left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    OptionOperand,
    TopLevel,
}

/// Outcome of parsing one slot of an operand chain.
#[derive(Debug)]
pub(crate) enum Slot {
    /// A value was produced (converted token, default, or switch constant).
    Filled(Value),
    /// Optional slot with no default and no token available: the chain
    /// ends here without error, later members are omitted.
    End,
}

enum Kind {
    /// Consume token text and convert it.
    Consume(Converter),
    /// Consume nothing; store a constant when the owning option occurs.
    Switch(Value),
}

// Converters are trait objects; their expectation text stands in for them.
impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Consume(converter) => {
                f.debug_tuple("Consume").field(&converter.expected()).finish()
            }
            Kind::Switch(value) => f.debug_tuple("Switch").field(value).finish(),
        }
    }
}

/// One expected value: metavar label, optionality, variadic flag, help
/// text and converter.
#[derive(Debug)]
pub struct Positional {
    metavar: String,
    optional: bool,
    remaining: bool,
    help: Option<String>,
    default: Option<Value>,
    kind: Kind,
}

impl Positional {
    /// A slot that consumes exactly one token through `converter`.
    pub fn new(metavar: impl Into<String>, converter: impl Convert + 'static) -> Self {
        Self::shared(metavar, Arc::new(converter))
    }

    /// Like [`Positional::new`] but reusing an already shared converter.
    pub fn shared(metavar: impl Into<String>, converter: Converter) -> Self {
        Self {
            metavar: metavar.into(),
            optional: false,
            remaining: false,
            help: None,
            default: None,
            kind: Kind::Consume(converter),
        }
    }

    /// A slot that consumes no tokens and stores `value` on occurrence.
    pub fn switch(value: impl Into<Value>) -> Self {
        Self {
            metavar: String::new(),
            optional: false,
            remaining: false,
            help: None,
            default: None,
            kind: Kind::Switch(value.into()),
        }
    }

    /// Mark the slot optional: when no token is available (or the next
    /// token looks like an option) it contributes nothing instead of
    /// failing.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Set a default, implying optional: a missing value yields `default`
    /// instead of being omitted.
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self.optional = true;
        self
    }

    /// Slurp all remaining tokens into a list instead of consuming one.
    pub fn remaining(mut self) -> Self {
        self.remaining = true;
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    pub fn metavar(&self) -> &str {
        &self.metavar
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_remaining(&self) -> bool {
        self.remaining
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Usage fragment: `FOO`, `[FOO]` or `[FOO ...]`. Switches render
    /// nothing; their option spelling is the whole usage.
    pub fn usage(&self) -> String {
        match self.kind {
            Kind::Switch(_) => String::new(),
            Kind::Consume(_) => {
                if self.remaining {
                    format!("[{} ...]", self.metavar)
                } else if self.optional {
                    format!("[{}]", self.metavar)
                } else {
                    self.metavar.clone()
                }
            }
        }
    }

    /// Optionality is a suffix property of a chain; the chain constructor
    /// promotes members after the first optional one.
    pub(crate) fn promote_optional(&mut self) {
        self.optional = true;
    }

    pub(crate) fn parse(
        &self,
        cursor: &mut TokenCursor,
        looks_like_option: &dyn Fn(&str) -> bool,
        scope: Scope,
    ) -> Result<Slot, Error> {
        let converter = match &self.kind {
            Kind::Switch(value) => return Ok(Slot::Filled(value.clone())),
            Kind::Consume(converter) => converter,
        };

        if self.remaining {
            let mut items = Vec::new();
            while let Some(next) = cursor.peek() {
                if scope == Scope::OptionOperand && looks_like_option(next) {
                    break;
                }
                let raw = cursor.next_token()?;
                items.push(converter.convert(&raw)?);
            }
            return Ok(Slot::Filled(Value::List(items)));
        }

        // A token that looks like an option is "value missing", never
        // "value is that token".
        let available = matches!(cursor.peek(), Some(next) if !looks_like_option(next));
        if !available {
            return if let Some(default) = &self.default {
                Ok(Slot::Filled(default.clone()))
            } else if self.optional {
                Ok(Slot::End)
            } else {
                Err(Error::PositionalMissing {
                    metavar: self.metavar.clone(),
                })
            };
        }

        let raw = cursor.next_token()?;
        Ok(Slot::Filled(converter.convert(&raw)?))
    }
}
