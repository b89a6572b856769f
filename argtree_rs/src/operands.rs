//! Operand chains: what one occurrence of an option consumes, and how
//! repeated occurrences combine.
//!
//! A chain is an ordered, non-empty list of [`Positional`] slots parsed as
//! a unit each time the owning option matches. The chain enforces its
//! shape at construction: the first slot must yield a value on every
//! occurrence, optionality is a suffix property, and a `remaining` slot
//! can only be last.

use tracing::debug;

use crate::cursor::TokenCursor;
use crate::error::{Error, RegistrationError};
use crate::positional::{Positional, Scope, Slot};
use crate::value::Value;

/// How values from repeated occurrences of one option combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accumulate {
    /// Last occurrence wins.
    #[default]
    Replace,
    /// Occurrences collect into a list, insertion order preserved.
    Append,
    /// Occurrences collect into a set, duplicates collapse.
    Add,
    /// Occurrences sum arithmetically from an implicit zero.
    Sum,
    /// Occurrences subtract arithmetically from an implicit zero.
    Difference,
}

/// An option's operand list plus its accumulation policy.
#[derive(Debug)]
pub struct OperandChain {
    chain: Vec<Positional>,
    policy: Accumulate,
}

impl OperandChain {
    /// Build a chain, normalizing optionality into a suffix and rejecting
    /// shapes that could never parse deterministically.
    pub fn new(chain: Vec<Positional>) -> Result<Self, RegistrationError> {
        if chain.is_empty() {
            return Err(RegistrationError::EmptyChain);
        }
        // Every occurrence must produce a value for the first slot; a
        // default satisfies that, bare optionality does not.
        if chain[0].is_optional() && chain[0].default().is_none() {
            return Err(RegistrationError::OptionalFirstOperand {
                metavar: chain[0].metavar().to_string(),
            });
        }
        let mut chain = chain;
        let mut seen_optional = false;
        let mut seen_remaining = false;
        for spec in chain.iter_mut() {
            if seen_remaining {
                return Err(RegistrationError::AfterRemaining {
                    metavar: spec.metavar().to_string(),
                });
            }
            if seen_optional {
                spec.promote_optional();
            }
            seen_optional |= spec.is_optional();
            seen_remaining |= spec.is_remaining();
        }
        Ok(Self {
            chain,
            policy: Accumulate::default(),
        })
    }

    /// Single-slot chain, the common case.
    ///
    /// # Panics
    ///
    /// Panics if `spec` is optional without a default; a chain's first
    /// slot must produce a value on every occurrence. Build multi-shape
    /// chains through [`OperandChain::new`].
    pub fn single(spec: Positional) -> Self {
        match Self::new(vec![spec]) {
            Ok(chain) => chain,
            Err(err) => panic!("invalid operand chain: {err}"),
        }
    }

    pub fn policy(mut self, policy: Accumulate) -> Self {
        self.policy = policy;
        self
    }

    pub fn accumulation(&self) -> Accumulate {
        self.policy
    }

    pub fn specs(&self) -> &[Positional] {
        &self.chain
    }

    /// Default contributed to the result mapping when the owning option
    /// never occurs. Only single-slot chains carry one.
    pub(crate) fn default(&self) -> Option<Value> {
        if self.chain.len() == 1 {
            self.chain[0].default().cloned()
        } else {
            None
        }
    }

    /// Usage fragments of the chain members, e.g. `"foo [bar]"`.
    pub fn usage(&self) -> String {
        let parts: Vec<String> = self
            .chain
            .iter()
            .map(Positional::usage)
            .filter(|part| !part.is_empty())
            .collect();
        parts.join(" ")
    }

    /// Parse one occurrence's operands off the cursor.
    ///
    /// Walks the chain in order; an optional tail that finds no token (or
    /// an option-looking one) ends the occurrence early without error:
    /// already-parsed slots are returned, later ones omitted. One-slot
    /// chains yield the bare value, longer chains the list of values.
    pub(crate) fn parse_occurrence(
        &self,
        cursor: &mut TokenCursor,
        looks_like_option: &dyn Fn(&str) -> bool,
    ) -> Result<Value, Error> {
        let mut values = Vec::with_capacity(self.chain.len());
        for spec in &self.chain {
            match spec.parse(cursor, looks_like_option, Scope::OptionOperand)? {
                Slot::Filled(value) => values.push(value),
                Slot::End => {
                    debug!(after = values.len(), "operand chain ended early");
                    break;
                }
            }
        }
        if self.chain.len() == 1 {
            match values.into_iter().next() {
                Some(value) => Ok(value),
                // First slot is mandatory; it either fills or errors.
                None => Err(Error::PositionalMissing {
                    metavar: self.chain[0].metavar().to_string(),
                }),
            }
        } else {
            Ok(Value::List(values))
        }
    }

    /// Fold this occurrence's value into the accumulated one.
    pub(crate) fn apply(&self, previous: Option<Value>, current: Value) -> Result<Value, Error> {
        match self.policy {
            Accumulate::Replace => Ok(current),
            Accumulate::Append => {
                let mut items = match previous {
                    Some(Value::List(items)) => items,
                    Some(other) => vec![other],
                    None => Vec::new(),
                };
                items.push(current);
                Ok(Value::List(items))
            }
            Accumulate::Add => {
                let mut items = match previous {
                    Some(Value::Set(items)) => items,
                    Some(other) => vec![other],
                    None => Vec::new(),
                };
                if !items.contains(&current) {
                    items.push(current);
                }
                Ok(Value::Set(items))
            }
            Accumulate::Sum => numeric_fold("sum", previous, current, false),
            Accumulate::Difference => numeric_fold("subtract", previous, current, true),
        }
    }
}

/// Left fold from an implicit zero; Int stays Int, any Float widens.
fn numeric_fold(
    policy: &'static str,
    previous: Option<Value>,
    current: Value,
    negate: bool,
) -> Result<Value, Error> {
    if !current.is_numeric() {
        return Err(Error::Accumulation {
            policy,
            value: format!("{current:?}"),
        });
    }
    let previous = previous.unwrap_or(Value::Int(0));
    match (previous, current) {
        (Value::Int(a), Value::Int(b)) => {
            let folded = if negate {
                a.checked_sub(b)
            } else {
                a.checked_add(b)
            };
            folded.map(Value::Int).ok_or(Error::Accumulation {
                policy,
                value: format!("{b} (integer overflow)"),
            })
        }
        (a, b) => {
            let (a, b) = match (a.as_float(), b.as_float()) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(Error::Accumulation {
                        policy,
                        value: format!("{a:?}"),
                    });
                }
            };
            Ok(Value::Float(if negate { a - b } else { a + b }))
        }
    }
}
