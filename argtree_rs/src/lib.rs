//! # argtree
//!
//! **Declarative command-line resolution** - Build a tree of commands,
//! options and positionals once, then hand it raw tokens and get back
//! typed values or a precise error.
//!
//! argtree resolves instead of pattern-matching: every token flows through
//! one priority order (child command, option, positional), short options
//! bundle (`-abc` resolves `-a`, `-b`, `-c` in registration order), and
//! repeated options fold through an accumulation policy instead of silently
//! overwriting.
//!
//! ## Features
//!
//! - **Command Trees** - Nested subcommands with terminal delegation and
//!   value inheritance from parent to child
//! - **Bundled Shorts** - `-vvv`, `-abc foo bar baz`, custom prefixes
//! - **Operand Chains** - Options taking several typed values, optional
//!   suffixes included
//! - **Accumulation Policies** - Replace, append, set-add, sum, difference
//! - **Typed Converters** - Int, float, string, choice, mapping, fallback
//!   chains; or implement [`Convert`] yourself
//! - **Builtin Help** - `-h`/`--help` on every node, layout swappable via
//!   [`HelpRenderer`]
//! - **Did You Mean** - Levenshtein suggestions for near-miss tokens
//!
//! ## Quick Start
//!
//! ```rust
//! use argtree::{Cli, Command, OperandChain, Opt, Outcome, Positional, converters};
//!
//! let cli = Cli::new("greet")
//!     .about("Say hello")
//!     .option("loud", Opt::flag('l', "loud").help("Shout it"))
//!     .option(
//!         "times",
//!         Opt::long(
//!             "times",
//!             OperandChain::single(Positional::new("n", converters::Int).default_value(1i64)),
//!         ),
//!     )
//!     .positional("name", Positional::new("name", converters::Str));
//!
//! match cli.try_run(["--times", "3", "world"]).unwrap() {
//!     Outcome::Invocation(invocation) => {
//!         assert_eq!(invocation.get("times").unwrap().as_int(), Some(3));
//!         assert_eq!(invocation.get("name").unwrap().as_str(), Some("world"));
//!     }
//!     Outcome::Help(page) => println!("{page}"),
//! }
//! ```
//!
//! For binaries, [`Cli::run`] additionally prints help pages and error
//! lines and exits with the conventional statuses (0 for help, 2 for usage
//! errors).

// ============================================================================
// Core Modules
// ============================================================================

/// Embedder entry points: [`Cli`], [`ColorMode`](cli::ColorMode) and the
/// run/try_run boundary.
pub mod cli;

/// Command nodes: registration of options, children and positionals, plus
/// conflict detection and suggestion lookup.
pub mod command;

/// Token-text converters producing [`Value`]s.
///
/// # Key Types
///
/// - [`Convert`](convert::Convert) - the conversion trait
/// - [`Str`](convert::Str), [`Int`](convert::Int), [`Float`](convert::Float) - scalars
/// - [`Choice`](convert::Choice) - restrict another converter to a whitelist
/// - [`Map`](convert::Map) - literal token to value mapping
/// - [`AnyOf`](convert::AnyOf) - first converter that accepts wins
pub mod convert;

/// The token cursor: sequential consumption, one-token rewind, full trace.
pub mod cursor;

/// The resolution loop and its results ([`Invocation`], [`Outcome`]).
pub mod dispatch;

/// Dispatch and registration error types.
pub mod error;

/// Help page rendering behind the [`HelpRenderer`](help::HelpRenderer) trait.
pub mod help;

/// Option chains: how many values an option takes per occurrence and how
/// repeated occurrences fold together.
pub mod operands;

/// Named options, their forms and the bundling-aware matcher.
pub mod opt;

/// Positional value slots: typed, optional, variadic or switch.
pub mod positional;

/// The closed [`Value`] model all resolution produces.
pub mod value;

// ============================================================================
// Re-exports for convenience
// ============================================================================

/// Program wrapper and run boundary.
pub use cli::{Cli, ColorMode};

/// A node in the command tree.
pub use command::Command;

/// The conversion trait, for custom token parsers.
pub use convert::Convert;

/// Scalar and combinator converters, under one name for call sites.
pub use convert as converters;

/// Resolved result mapping and outcome types.
pub use dispatch::{Invocation, Outcome, ValueMap};

/// Dispatch-time error.
pub use error::Error;

/// Build-time registration conflict.
pub use error::RegistrationError;

/// Help layout trait and the default sectioned renderer.
pub use help::{DefaultHelp, HelpRenderer};

/// Accumulation policy for repeated option occurrences.
pub use operands::Accumulate;

/// An option's per-occurrence value chain.
pub use operands::OperandChain;

/// A named option.
pub use opt::Opt;

/// A typed value slot.
pub use positional::Positional;

/// Resolved value.
pub use value::Value;
