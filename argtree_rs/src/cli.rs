//! The embedder-facing surface: a program name, a root command tree and
//! two ways to run it.
//!
//! [`Cli::try_run`] resolves tokens and hands back the plain
//! [`Outcome`]/[`Error`] for embedders that manage their own exit. [`Cli::run`]
//! is the batteries variant: it prints help pages to stdout, error reports
//! (error line, hint, usage page, colored per [`ColorMode`]) to stderr, and
//! terminates the process with 0 for help and 2 for usage errors.

use std::ops::{Deref, DerefMut};

use colored::Colorize;
use tracing::debug;

use crate::command::Command;
use crate::cursor::TokenCursor;
use crate::dispatch::{DispatchCtx, Invocation, Outcome, ValueMap};
use crate::error::Error;
use crate::help::{DefaultHelp, HelpRenderer};
use crate::opt::Opt;
use crate::positional::Positional;

/// Exit status for usage errors, following the sysexits convention.
const USAGE_EXIT: i32 = 2;

/// When to emit ANSI colors on the error boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color when stderr is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

/// A program: name, root [`Command`] and presentation knobs.
///
/// Derefs to its root command for inspection, and mirrors the root's
/// registration builders for fluent setup:
///
/// ```
/// use argtree::{Cli, Command, Opt};
///
/// let cli = Cli::new("greet")
///     .color(argtree::ColorMode::Never)
///     .option("loud", Opt::flag('l', "loud"))
///     .command("wave", Command::new());
/// ```
pub struct Cli {
    program: String,
    root: Command,
    renderer: Box<dyn HelpRenderer>,
    color: ColorMode,
}

impl Cli {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_root(program, Command::new())
    }

    /// Wrap an already built command tree.
    pub fn with_root(program: impl Into<String>, root: Command) -> Self {
        Self {
            program: program.into(),
            root,
            renderer: Box::new(DefaultHelp),
            color: ColorMode::Auto,
        }
    }

    pub fn color(mut self, mode: ColorMode) -> Self {
        self.color = mode;
        self
    }

    /// Swap the help layout.
    pub fn renderer(mut self, renderer: impl HelpRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Resolve `tokens` against the tree. No output, no exit: the caller
    /// owns the boundary.
    pub fn try_run<I, T>(&self, tokens: I) -> Result<Outcome, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut cursor = TokenCursor::new(tokens);
        let ctx = DispatchCtx {
            program: &self.program,
            renderer: self.renderer.as_ref(),
        };
        let result = self
            .root
            .dispatch(&mut cursor, &ctx, Vec::new(), ValueMap::new());
        debug!(consumed = cursor.trace().len(), ok = result.is_ok(), "dispatch finished");
        result
    }

    /// Resolve `tokens`, printing and exiting on anything that is not an
    /// invocation. Help goes to stdout and exits 0; errors go to stderr
    /// with a hint line and the usage page, then exit 2.
    pub fn run<I, T>(&self, tokens: I) -> Invocation
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        match self.color {
            ColorMode::Auto => {}
            ColorMode::Always => colored::control::set_override(true),
            ColorMode::Never => colored::control::set_override(false),
        }

        match self.try_run(tokens) {
            Ok(Outcome::Invocation(invocation)) => invocation,
            Ok(Outcome::Help(page)) => {
                println!("{page}");
                std::process::exit(0);
            }
            Err(err) => {
                eprint!("{}", self.error_report(&err));
                std::process::exit(USAGE_EXIT);
            }
        }
    }

    /// Full stderr report for a usage error: error line, optional hint,
    /// then the root usage/help page.
    fn error_report(&self, err: &Error) -> String {
        let mut report = format!("{} {err}\n", "error:".red().bold());
        if let Some(hint) = hint_for(err) {
            report.push_str(&format!("{}\n", hint.dimmed()));
        }
        report.push('\n');
        report.push_str(&self.renderer.render(&self.program, &[], &self.root));
        report
    }
}

/// Extra context line under the error message, when the error carries any.
fn hint_for(err: &Error) -> Option<String> {
    match err {
        Error::UnexpectedToken {
            suggestion: Some(suggestion),
            ..
        } => Some(format!("Did you mean '{suggestion}'?")),
        Error::CommandMissing { available } if !available.is_empty() => {
            Some(format!("Expected one of: {}", available.join(", ")))
        }
        _ => None,
    }
}

impl Deref for Cli {
    type Target = Command;

    fn deref(&self) -> &Command {
        &self.root
    }
}

impl DerefMut for Cli {
    fn deref_mut(&mut self) -> &mut Command {
        &mut self.root
    }
}

// Registration builders come back as Command through Deref, so mirror
// them here to keep the fluent style going on Cli itself.
impl Cli {
    pub fn about(mut self, text: impl Into<String>) -> Self {
        self.root = self.root.about(text);
        self
    }

    pub fn option(mut self, id: impl Into<String>, opt: Opt) -> Self {
        self.root = self.root.option(id, opt);
        self
    }

    pub fn command(mut self, name: impl Into<String>, child: Command) -> Self {
        self.root = self.root.command(name, child);
        self
    }

    pub fn positional(mut self, id: impl Into<String>, spec: Positional) -> Self {
        self.root = self.root.positional(id, spec);
        self
    }

    pub fn default_action(mut self, yes: bool) -> Self {
        self.root = self.root.default_action(yes);
        self
    }
}
