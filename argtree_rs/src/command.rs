//! Command nodes: registration of options, children and positionals.
//!
//! A command tree is built once during a registration phase that rejects
//! conflicts immediately; the structure is immutable while dispatching.
//! Matching is strictly local: a node only ever consults its own options
//! and children, never an ancestor's. The dispatch loop itself lives in
//! [`crate::dispatch`].

use indexmap::IndexMap;
use strsim::levenshtein;

use crate::error::RegistrationError;
use crate::operands::OperandChain;
use crate::opt::Opt;
use crate::positional::Positional;

/// Identifier of the builtin help option.
pub(crate) const HELP_ID: &str = "help";

/// Maximum editing distance for "did you mean" suggestions.
const SUGGESTION_DISTANCE: usize = 2;

/// A named (or, for the root, anonymous) node in the command tree.
pub struct Command {
    pub(crate) options: IndexMap<String, Opt>,
    pub(crate) commands: IndexMap<String, Command>,
    pub(crate) positionals: Vec<(String, Positional)>,
    pub(crate) about: Option<String>,
    /// Whether reaching end of input without delegating is acceptable for
    /// a node that has children.
    pub(crate) default_action: bool,
    /// Identifier of the builtin help option, `None` once disabled.
    pub(crate) help_id: Option<String>,
}

impl Command {
    /// A fresh node with the builtin `-h`/`--help` option registered
    /// first. The help option short-circuits dispatch; it never
    /// contributes to the result mapping.
    pub fn new() -> Self {
        let mut options = IndexMap::new();
        options.insert(
            HELP_ID.to_string(),
            Opt::new(
                'h',
                "help",
                OperandChain::single(Positional::switch(true)),
            )
            .help("Show this help and exit"),
        );
        Self {
            options,
            commands: IndexMap::new(),
            positionals: Vec::new(),
            about: None,
            default_action: false,
            help_id: Some(HELP_ID.to_string()),
        }
    }

    /// Drop the builtin help option.
    pub fn without_help(mut self) -> Self {
        if let Some(id) = self.help_id.take() {
            self.options.shift_remove(&id);
        }
        self
    }

    /// One-line description shown in help output.
    pub fn about(mut self, text: impl Into<String>) -> Self {
        self.about = Some(text.into());
        self
    }

    /// Allow a node with children to finish without delegating; its own
    /// result mapping is produced instead of `CommandMissing`.
    pub fn default_action(mut self, enabled: bool) -> Self {
        self.default_action = enabled;
        self
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register an option under `id`, rejecting identifier and short/long
    /// form collisions.
    pub fn add_option(&mut self, id: impl Into<String>, opt: Opt) -> Result<(), RegistrationError> {
        let id = id.into();
        if self.options.contains_key(&id) {
            return Err(RegistrationError::DuplicateOption { id });
        }
        if self.positionals.iter().any(|(pid, _)| *pid == id) {
            return Err(RegistrationError::DuplicateOption { id });
        }
        self.check_form_conflicts(&opt)?;
        self.options.insert(id, opt);
        Ok(())
    }

    /// Forcing variant: an option already registered under `id` is
    /// replaced. Form collisions with *other* options are still rejected.
    pub fn replace_option(
        &mut self,
        id: impl Into<String>,
        opt: Opt,
    ) -> Result<(), RegistrationError> {
        let id = id.into();
        self.options.shift_remove(&id);
        self.check_form_conflicts(&opt)?;
        self.options.insert(id, opt);
        Ok(())
    }

    fn check_form_conflicts(&self, opt: &Opt) -> Result<(), RegistrationError> {
        for (existing_id, existing) in &self.options {
            if let (Some(a), Some(b)) = (opt.short_form(), existing.short_form())
                && a == b
            {
                return Err(RegistrationError::ShortConflict {
                    short: a,
                    existing: existing_id.clone(),
                });
            }
            if let (Some(a), Some(b)) = (opt.long_form(), existing.long_form())
                && a == b
            {
                return Err(RegistrationError::LongConflict {
                    long: a.to_string(),
                    existing: existing_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Register a child command under `name`.
    pub fn add_command(
        &mut self,
        name: impl Into<String>,
        command: Command,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if self.commands.contains_key(&name) {
            return Err(RegistrationError::CommandConflict { name });
        }
        self.commands.insert(name, command);
        Ok(())
    }

    /// Forcing variant: replaces an existing child of the same name.
    pub fn replace_command(&mut self, name: impl Into<String>, command: Command) {
        self.commands.insert(name.into(), command);
    }

    /// Register a top-level positional under `id`.
    ///
    /// Nothing may follow a `remaining` positional, and once one
    /// positional is optional every later one is promoted to optional.
    pub fn add_positional(
        &mut self,
        id: impl Into<String>,
        spec: Positional,
    ) -> Result<(), RegistrationError> {
        let id = id.into();
        if self.positionals.iter().any(|(pid, _)| *pid == id) {
            return Err(RegistrationError::DuplicatePositional { id });
        }
        if self.options.contains_key(&id) {
            return Err(RegistrationError::DuplicatePositional { id });
        }
        if let Some((_, last)) = self.positionals.last()
            && last.is_remaining()
        {
            return Err(RegistrationError::AfterRemaining {
                metavar: spec.metavar().to_string(),
            });
        }
        let mut spec = spec;
        if self.positionals.iter().any(|(_, p)| p.is_optional()) {
            spec.promote_optional();
        }
        self.positionals.push((id, spec));
        Ok(())
    }

    // Panicking conveniences for literate tree construction. Conflicts in
    // a hand-written tree are bugs, not runtime conditions.

    /// Like [`Command::add_option`], panicking on conflict.
    pub fn option(mut self, id: impl Into<String>, opt: Opt) -> Self {
        if let Err(err) = self.add_option(id, opt) {
            panic!("registration conflict: {err}");
        }
        self
    }

    /// Like [`Command::add_command`], panicking on conflict.
    pub fn command(mut self, name: impl Into<String>, command: Command) -> Self {
        if let Err(err) = self.add_command(name, command) {
            panic!("registration conflict: {err}");
        }
        self
    }

    /// Like [`Command::add_positional`], panicking on conflict.
    pub fn positional(mut self, id: impl Into<String>, spec: Positional) -> Self {
        if let Err(err) = self.add_positional(id, spec) {
            panic!("registration conflict: {err}");
        }
        self
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn options(&self) -> impl Iterator<Item = (&str, &Opt)> {
        self.options.iter().map(|(id, opt)| (id.as_str(), opt))
    }

    pub fn commands(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.commands.iter().map(|(name, cmd)| (name.as_str(), cmd))
    }

    pub fn positionals(&self) -> impl Iterator<Item = (&str, &Positional)> {
        self.positionals
            .iter()
            .map(|(id, spec)| (id.as_str(), spec))
    }

    pub fn about_text(&self) -> Option<&str> {
        self.about.as_deref()
    }

    /// Whether a token starts with any option prefix this node knows
    /// about. A bare prefix (`-` on its own, the conventional stdin
    /// spelling) is a value, not an option.
    pub(crate) fn looks_like_option(&self, token: &str) -> bool {
        self.options.values().any(|opt| {
            let (abbrev, name) = opt.prefixes();
            let hit = |prefix: &str| token.starts_with(prefix) && token.len() > prefix.len();
            abbrev.is_some_and(hit) || name.is_some_and(hit)
        })
    }

    /// Closest child-command name or long-form spelling within editing
    /// distance, for "did you mean" hints.
    pub(crate) fn suggest(&self, token: &str) -> Option<String> {
        let mut best: Option<(String, usize)> = None;
        let mut consider = |candidate: String| {
            let distance = levenshtein(token, &candidate);
            if distance <= SUGGESTION_DISTANCE
                && best.as_ref().is_none_or(|(_, d)| distance < *d)
            {
                best = Some((candidate, distance));
            }
        };
        for name in self.commands.keys() {
            consider(name.clone());
        }
        for opt in self.options.values() {
            if let Some(spelling) = opt.spelling_long() {
                consider(spelling);
            }
        }
        best.map(|(candidate, _)| candidate)
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Str;
    use crate::operands::OperandChain;

    fn takes_one(metavar: &str) -> OperandChain {
        OperandChain::single(Positional::new(metavar, Str))
    }

    #[test]
    fn builtin_help_is_registered_first() {
        let command = Command::new();
        let ids: Vec<&str> = command.options().map(|(id, _)| id).collect();
        assert_eq!(ids, ["help"]);
    }

    #[test]
    fn without_help_removes_it() {
        let command = Command::new().without_help();
        assert_eq!(command.options().count(), 0);
    }

    #[test]
    fn duplicate_option_id_is_rejected() {
        let mut command = Command::new();
        command
            .add_option("foo", Opt::short('a', takes_one("x")))
            .unwrap();
        let err = command
            .add_option("foo", Opt::short('b', takes_one("x")))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateOption { .. }));
    }

    #[test]
    fn short_form_collision_is_rejected() {
        let mut command = Command::new();
        command
            .add_option("foo", Opt::short('a', takes_one("x")))
            .unwrap();
        let err = command
            .add_option("bar", Opt::short('a', takes_one("x")))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::ShortConflict {
                short: 'a',
                existing: "foo".to_string()
            }
        );
    }

    #[test]
    fn long_form_collision_is_rejected() {
        let mut command = Command::new();
        command
            .add_option("foo", Opt::long("foobar", takes_one("x")))
            .unwrap();
        let err = command
            .add_option("baz", Opt::long("foobar", takes_one("x")))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::LongConflict { .. }));
    }

    #[test]
    fn builtin_help_forms_are_reserved() {
        let mut command = Command::new();
        let err = command
            .add_option("host", Opt::short('h', takes_one("x")))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::ShortConflict { .. }));
    }

    #[test]
    fn replace_option_forces_by_identifier() {
        let mut command = Command::new();
        command
            .add_option("foo", Opt::short('a', takes_one("x")))
            .unwrap();
        command
            .replace_option("foo", Opt::short('s', takes_one("x")))
            .unwrap();
        let (_, opt) = command.options().find(|(id, _)| *id == "foo").unwrap();
        assert_eq!(opt.short_form(), Some('s'));
    }

    #[test]
    fn duplicate_command_name_is_rejected() {
        let mut command = Command::new();
        command.add_command("foobar", Command::new()).unwrap();
        let err = command.add_command("foobar", Command::new()).unwrap_err();
        assert!(matches!(err, RegistrationError::CommandConflict { .. }));
        // Forcing replacement is fine.
        command.replace_command("foobar", Command::new());
    }

    #[test]
    fn positional_after_remaining_is_rejected() {
        let mut command = Command::new();
        command
            .add_positional("rest", Positional::new("rest", Str).remaining())
            .unwrap();
        let err = command
            .add_positional("more", Positional::new("more", Str))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::AfterRemaining { .. }));
    }

    #[test]
    fn later_positionals_inherit_optionality() {
        let mut command = Command::new();
        command
            .add_positional("a", Positional::new("a", Str).optional())
            .unwrap();
        command
            .add_positional("b", Positional::new("b", Str))
            .unwrap();
        let optional: Vec<bool> = command
            .positionals()
            .map(|(_, spec)| spec.is_optional())
            .collect();
        assert_eq!(optional, [true, true]);
    }

    #[test]
    fn looks_like_option_respects_prefixes() {
        let mut command = Command::new();
        command
            .add_option("foo", Opt::short('a', takes_one("x")))
            .unwrap();
        assert!(command.looks_like_option("-a"));
        assert!(command.looks_like_option("-z"));
        assert!(command.looks_like_option("--anything"));
        assert!(!command.looks_like_option("-"));
        assert!(!command.looks_like_option("plain"));
    }

    #[test]
    fn suggests_close_command_names() {
        let mut command = Command::new();
        command.add_command("status", Command::new()).unwrap();
        command.add_command("stash", Command::new()).unwrap();
        assert_eq!(command.suggest("stauts"), Some("status".to_string()));
        assert_eq!(command.suggest("zzz"), None);
    }
}
