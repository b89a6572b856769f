//! Named options and the matching algorithm, bundling included.
//!
//! An option is identified by a short form (single character behind an
//! abbreviation prefix, `-v`) and/or a long form (name behind a name
//! prefix, `--verbose`). Matching a token against a short form may leave a
//! residual: `-abc` matched against `-a` leaves `-bc`, which the owning
//! command feeds back through its matcher until nothing is left. That
//! re-entrancy is the whole trick behind bundled short options.

use crate::error::RegistrationError;
use crate::operands::{Accumulate, OperandChain};
use crate::positional::Positional;
use crate::value::Value;

const ABBREVIATION_PREFIX: &str = "-";
const NAME_PREFIX: &str = "--";

/// Result of matching one token against one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptMatch {
    /// The token is consumed entirely by this option.
    Full,
    /// Short-form match with stacked characters left over; the residual
    /// (prefix re-attached) goes back through the command's matcher.
    Partial(String),
    /// No match; the token is unchanged for the caller to try elsewhere.
    No,
}

/// A named option owning one operand chain.
#[derive(Debug)]
pub struct Opt {
    short: Option<char>,
    long: Option<String>,
    abbreviation_prefix: String,
    name_prefix: String,
    operands: OperandChain,
    help: Option<String>,
}

impl Opt {
    /// Option with both a short and a long form.
    pub fn new(short: char, long: impl Into<String>, operands: OperandChain) -> Self {
        Self::build(Some(short), Some(long.into()), operands)
    }

    /// Option with only a short form.
    pub fn short(short: char, operands: OperandChain) -> Self {
        Self::build(Some(short), None, operands)
    }

    /// Option with only a long form.
    pub fn long(long: impl Into<String>, operands: OperandChain) -> Self {
        Self::build(None, Some(long.into()), operands)
    }

    /// Fallible constructor for forms decided at runtime.
    pub fn with_forms(
        short: Option<char>,
        long: Option<String>,
        operands: OperandChain,
    ) -> Result<Self, RegistrationError> {
        if short.is_none() && long.is_none() {
            return Err(RegistrationError::UnnamedOption);
        }
        Ok(Self::build(short, long, operands))
    }

    /// Zero-operand switch storing `true`, e.g. `-q`/`--quiet`.
    pub fn flag(short: char, long: impl Into<String>) -> Self {
        Self::new(
            short,
            long,
            OperandChain::single(Positional::switch(true)),
        )
    }

    /// Switch storing `value` instead of `true`.
    pub fn flag_with(short: char, long: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(
            short,
            long,
            OperandChain::single(Positional::switch(value.into())),
        )
    }

    /// Occurrence counter: each match adds one, so `-vvv` resolves to 3.
    pub fn counter(short: char, long: impl Into<String>) -> Self {
        Self::new(
            short,
            long,
            OperandChain::single(Positional::switch(1i64)).policy(Accumulate::Sum),
        )
    }

    fn build(short: Option<char>, long: Option<String>, operands: OperandChain) -> Self {
        if let Some(c) = short {
            assert!(
                !ABBREVIATION_PREFIX.starts_with(c),
                "short form {c:?} collides with the abbreviation prefix"
            );
        }
        Self {
            short,
            long,
            abbreviation_prefix: ABBREVIATION_PREFIX.to_string(),
            name_prefix: NAME_PREFIX.to_string(),
            operands,
            help: None,
        }
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    /// Override the short-form prefix (default `-`), e.g. `+` for
    /// toggle-style options.
    pub fn abbreviation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.abbreviation_prefix = prefix.into();
        self
    }

    /// Override the long-form prefix (default `--`).
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Set the accumulation policy for repeated occurrences.
    pub fn policy(mut self, policy: Accumulate) -> Self {
        self.operands = self.operands.policy(policy);
        self
    }

    pub fn short_form(&self) -> Option<char> {
        self.short
    }

    pub fn long_form(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn operands(&self) -> &OperandChain {
        &self.operands
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Prefixes this option recognizes; the command node unions them to
    /// decide what "looks like an option".
    pub(crate) fn prefixes(&self) -> (Option<&str>, Option<&str>) {
        (
            self.short.map(|_| self.abbreviation_prefix.as_str()),
            self.long.as_ref().map(|_| self.name_prefix.as_str()),
        )
    }

    /// Match a token. Long form wins over short; a short match strips
    /// exactly one occurrence of the character and re-attaches the prefix
    /// to whatever is left.
    pub fn matches(&self, token: &str) -> OptMatch {
        if let Some(long) = &self.long
            && let Some(rest) = token.strip_prefix(self.name_prefix.as_str())
            && rest == long
        {
            return OptMatch::Full;
        }
        if let Some(short) = self.short
            && let Some(rest) = token.strip_prefix(self.abbreviation_prefix.as_str())
            && let Some(tail) = rest.strip_prefix(short)
        {
            return if tail.is_empty() {
                OptMatch::Full
            } else {
                OptMatch::Partial(format!("{}{}", self.abbreviation_prefix, tail))
            };
        }
        OptMatch::No
    }

    /// Preferred spelling: short form if present, long form otherwise.
    pub fn spelling(&self) -> String {
        match (self.short, &self.long) {
            (Some(short), _) => format!("{}{}", self.abbreviation_prefix, short),
            (None, Some(long)) => format!("{}{}", self.name_prefix, long),
            (None, None) => String::new(),
        }
    }

    /// Long spelling with its prefix, if the option has one.
    pub fn spelling_long(&self) -> Option<String> {
        self.long
            .as_ref()
            .map(|long| format!("{}{}", self.name_prefix, long))
    }

    /// Both spellings for help listings, e.g. `-o, --output`.
    pub fn spellings(&self) -> String {
        match (self.short, &self.long) {
            (Some(short), Some(long)) => format!(
                "{}{}, {}{}",
                self.abbreviation_prefix, short, self.name_prefix, long
            ),
            (Some(short), None) => format!("{}{}", self.abbreviation_prefix, short),
            (None, Some(long)) => format!("{}{}", self.name_prefix, long),
            (None, None) => String::new(),
        }
    }

    /// One-line usage fragment, e.g. `-o file` or `--level n`.
    pub fn usage(&self) -> String {
        let operands = self.operands.usage();
        if operands.is_empty() {
            self.spelling()
        } else {
            format!("{} {}", self.spelling(), operands)
        }
    }
}
