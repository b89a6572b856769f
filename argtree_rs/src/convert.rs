//! Scalar conversion: token text in, typed [`Value`] out.
//!
//! The engine itself only depends on the [`Convert`] contract; the concrete
//! converters below are the baseline set most command trees need. Anything
//! fancier (durations, paths with existence checks, ...) plugs in by
//! implementing the trait.

use std::sync::Arc;

use crate::error::ConvertError;
use crate::value::Value;

/// Pluggable string-to-value conversion with a uniform failure signal.
///
/// Implementations must be cheap to call repeatedly; a `remaining`
/// positional invokes its converter once per leftover token.
pub trait Convert: Send + Sync {
    /// Convert raw token text, or reject it with the offending text and a
    /// description of what was expected.
    fn convert(&self, raw: &str) -> Result<Value, ConvertError>;

    /// Short description of the accepted input, used in error messages of
    /// combinators wrapping this converter.
    fn expected(&self) -> String;
}

/// Shared handle to a converter. Chains and options hold converters behind
/// this alias so one converter instance can back many slots.
pub type Converter = Arc<dyn Convert>;

/// Accepts any token verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Str;

impl Convert for Str {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        Ok(Value::Str(raw.to_string()))
    }

    fn expected(&self) -> String {
        "a string".to_string()
    }
}

/// Accepts signed decimal integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Int;

impl Convert for Int {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        raw.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ConvertError::new(raw, self.expected()))
    }

    fn expected(&self) -> String {
        "an integer".to_string()
    }
}

/// Accepts floating point numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Float;

impl Convert for Float {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        raw.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ConvertError::new(raw, self.expected()))
    }

    fn expected(&self) -> String {
        "a float".to_string()
    }
}

/// Restricts an inner converter to an allow-list of results.
pub struct Choice {
    inner: Converter,
    allowed: Vec<Value>,
}

impl Choice {
    pub fn new(inner: Converter, allowed: Vec<Value>) -> Self {
        Self { inner, allowed }
    }
}

impl Convert for Choice {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        let value = self.inner.convert(raw)?;
        if self.allowed.contains(&value) {
            Ok(value)
        } else {
            Err(ConvertError::new(raw, self.expected()))
        }
    }

    fn expected(&self) -> String {
        let choices: Vec<String> = self.allowed.iter().map(|v| format!("{v:?}")).collect();
        format!("one of {}", choices.join(", "))
    }
}

/// Maps exact token spellings to values, e.g. `"auto" -> Int(0)`.
pub struct Map {
    entries: Vec<(String, Value)>,
}

impl Map {
    pub fn new<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        }
    }
}

impl Convert for Map {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        self.entries
            .iter()
            .find(|(key, _)| key == raw)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ConvertError::new(raw, self.expected()))
    }

    fn expected(&self) -> String {
        let keys: Vec<&str> = self.entries.iter().map(|(k, _)| k.as_str()).collect();
        format!("one of {}", keys.join(", "))
    }
}

/// First converter that accepts the token wins.
pub struct AnyOf {
    alternatives: Vec<Converter>,
}

impl AnyOf {
    pub fn new(alternatives: Vec<Converter>) -> Self {
        Self { alternatives }
    }
}

impl Convert for AnyOf {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        for alternative in &self.alternatives {
            if let Ok(value) = alternative.convert(raw) {
                return Ok(value);
            }
        }
        Err(ConvertError::new(raw, self.expected()))
    }

    fn expected(&self) -> String {
        let parts: Vec<String> = self.alternatives.iter().map(|a| a.expected()).collect();
        parts.join(" or ")
    }
}
