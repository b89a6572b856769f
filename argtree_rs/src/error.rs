//! Error types for registration and dispatch.
//!
//! Two worlds, two enums:
//!
//! - [`RegistrationError`] - conflicts detected while *building* a command
//!   tree (duplicate identifiers, colliding short/long forms, a positional
//!   after a `remaining` one). These never reach parse time.
//! - [`Error`] - everything that can go wrong while *resolving* tokens.
//!   All variants except [`Error::TokenExhausted`] are user-facing; the
//!   boundary in [`crate::cli`] turns them into an error line plus help and
//!   a usage-error exit status.

use thiserror::Error;

/// A scalar conversion rejected the token text.
///
/// Produced by [`Convert`](crate::convert::Convert) implementations and
/// wrapped into [`Error::Conversion`] by the chain-walking code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {text:?}: expected {expected}")]
pub struct ConvertError {
    /// The offending token text, verbatim.
    pub text: String,
    /// What the converter would have accepted, e.g. "an integer".
    pub expected: String,
}

impl ConvertError {
    pub fn new(text: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expected: expected.into(),
        }
    }
}

/// Parse-time errors, in rough order of how deep in the engine they arise.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The cursor ran out of tokens while one was required.
    ///
    /// Recovered into `PositionalMissing` by the operand-chain walker; only
    /// surfaces directly on cursor misuse and is not shown to end users.
    #[error("no tokens remaining")]
    TokenExhausted,

    /// A value converter rejected the token text.
    #[error(transparent)]
    Conversion(#[from] ConvertError),

    /// A mandatory positional specification never received a token.
    #[error("missing value for {metavar}")]
    PositionalMissing {
        /// Display name of the slot that went unfilled.
        metavar: String,
    },

    /// A token matched no option, no child command and no unsatisfied
    /// positional.
    #[error("unexpected token {token:?}")]
    UnexpectedToken {
        token: String,
        /// Closest registered command name, if one is within editing
        /// distance. Rendered as a "did you mean" hint at the boundary.
        suggestion: Option<String>,
    },

    /// A command node with children reached end of input without
    /// delegating and has no default action.
    #[error("missing command")]
    CommandMissing {
        /// Child command names, in registration order, for the hint line.
        available: Vec<String>,
    },

    /// A sum/difference accumulation met a non-numeric occurrence value,
    /// or the integer fold overflowed.
    #[error("cannot {policy} value {value}")]
    Accumulation {
        policy: &'static str,
        value: String,
    },
}

/// Build-time conflicts. Fatal at construction, never seen during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// An option with this identifier is already registered on the node.
    #[error("option {id:?} is already registered")]
    DuplicateOption { id: String },

    /// The short form collides with an option already on the node.
    #[error("short form {short:?} is already taken by option {existing:?}")]
    ShortConflict { short: char, existing: String },

    /// The long form collides with an option already on the node.
    #[error("long form {long:?} is already taken by option {existing:?}")]
    LongConflict { long: String, existing: String },

    /// A child command with this name is already registered.
    #[error("command {name:?} is already registered")]
    CommandConflict { name: String },

    /// A positional with this identifier is already registered.
    #[error("positional {id:?} is already registered")]
    DuplicatePositional { id: String },

    /// Nothing can follow a `remaining` positional; it consumes the rest
    /// of the input.
    #[error("positional {metavar:?} follows a remaining positional")]
    AfterRemaining { metavar: String },

    /// An operand chain must demand at least one value per occurrence.
    #[error("first operand {metavar:?} of a chain must not be optional")]
    OptionalFirstOperand { metavar: String },

    /// An operand chain with no members would match without consuming
    /// anything.
    #[error("operand chain is empty")]
    EmptyChain,

    /// An option needs at least one of a short or a long form to be
    /// matchable.
    #[error("option has neither a short nor a long form")]
    UnnamedOption,
}
