//! The recursive dispatch loop: tokens in, invocation out.
//!
//! Per token, in priority order: exact child-command delegation (terminal
//! for the parent), option matching with residual feeding for bundled
//! shorts, then positional fallback through a one-token rewind. Anything
//! left unclaimed is an unexpected token.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::command::Command;
use crate::cursor::TokenCursor;
use crate::error::Error;
use crate::help::HelpRenderer;
use crate::opt::OptMatch;
use crate::positional::{Scope, Slot};
use crate::value::Value;

/// Result mapping: option/positional identifier to resolved value, in
/// resolution order.
pub type ValueMap = IndexMap<String, Value>;

/// A fully resolved invocation, handed to application logic.
#[derive(Debug)]
pub struct Invocation {
    /// Command names delegated through, root first. Empty when the root
    /// itself produced the result.
    pub path: Vec<String>,
    /// Resolved option and positional values, defaults merged in.
    pub values: ValueMap,
}

impl Invocation {
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    /// Name of the command that produced the result, `None` for the root.
    pub fn command(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }
}

/// What a dispatch produced: a value mapping for application logic, or a
/// rendered help text from the builtin help option.
#[derive(Debug)]
pub enum Outcome {
    Invocation(Invocation),
    Help(String),
}

/// Context threaded through nested dispatch calls: no ambient globals.
pub(crate) struct DispatchCtx<'a> {
    pub program: &'a str,
    pub renderer: &'a dyn HelpRenderer,
}

impl Command {
    /// Consume tokens until this node either delegates to exactly one
    /// child (terminal: the parent never resumes) or reaches end of
    /// input and produces its result mapping.
    ///
    /// `values` carries what ancestors already resolved; a child resolving
    /// the same identifier overrides it.
    pub(crate) fn dispatch(
        &self,
        cursor: &mut TokenCursor,
        ctx: &DispatchCtx<'_>,
        mut path: Vec<String>,
        mut values: ValueMap,
    ) -> Result<Outcome, Error> {
        let mut next_positional = 0usize;

        while cursor.has_next() {
            let token = cursor.next_token()?;

            // 1. Exact child name: delegate and stop.
            if let Some(child) = self.commands.get(&token) {
                debug!(command = %token, "delegating to child command");
                path.push(token);
                return child.dispatch(cursor, ctx, path, values);
            }

            // 2. Option matching, feeding residuals back through the
            //    matcher until the token is fully resolved.
            let mut current = token.clone();
            let mut matched = false;
            loop {
                let hit = self.options.iter().find_map(|(id, opt)| {
                    match opt.matches(&current) {
                        OptMatch::No => None,
                        m => Some((id.clone(), m)),
                    }
                });
                let Some((id, m)) = hit else {
                    if matched {
                        // A bundle like "-ab" where "-a" matched but "-b"
                        // is unknown cannot fall back to positionals; the
                        // matched part is already consumed.
                        return Err(Error::UnexpectedToken {
                            suggestion: self.suggest(&current),
                            token: current,
                        });
                    }
                    break;
                };
                matched = true;
                trace!(option = %id, token = %current, "token matched option");

                if self.help_id.as_deref() == Some(id.as_str()) {
                    debug!("help requested, short-circuiting dispatch");
                    return Ok(Outcome::Help(ctx.renderer.render(ctx.program, &path, self)));
                }

                let opt = &self.options[&id];
                let occurrence = opt
                    .operands()
                    .parse_occurrence(cursor, &|t| self.looks_like_option(t))?;
                let previous = values.shift_remove(&id);
                let folded = opt.operands().apply(previous, occurrence)?;
                debug!(option = %id, value = ?folded, "option occurrence applied");
                values.insert(id, folded);

                match m {
                    OptMatch::Partial(rest) => current = rest,
                    _ => break,
                }
            }
            if matched {
                continue;
            }

            // 3. Positional fallback: hand the token back and let the next
            //    unsatisfied positional consume on its own terms.
            if next_positional < self.positionals.len() {
                let (id, spec) = &self.positionals[next_positional];
                next_positional += 1;
                debug!(positional = %id, "falling back to positional");
                cursor.rewind();
                match spec.parse(cursor, &|t| self.looks_like_option(t), Scope::TopLevel)? {
                    Slot::Filled(value) => {
                        values.insert(id.clone(), value);
                    }
                    // An optional positional declined an option-looking
                    // token; it stays on the cursor for the next round.
                    Slot::End => {}
                }
            } else {
                return Err(Error::UnexpectedToken {
                    suggestion: self.suggest(&token),
                    token,
                });
            }
        }

        // End of input: every mandatory positional must be satisfied. A
        // remaining positional is satisfied by zero tokens.
        for (_, spec) in self.positionals.iter().skip(next_positional) {
            if !spec.is_optional() && !spec.is_remaining() {
                return Err(Error::PositionalMissing {
                    metavar: spec.metavar().to_string(),
                });
            }
        }

        if !self.commands.is_empty() && !self.default_action {
            return Err(Error::CommandMissing {
                available: self.commands.keys().cloned().collect(),
            });
        }

        // Merge defaults for options and positionals that never occurred.
        for (id, opt) in &self.options {
            if self.help_id.as_deref() == Some(id.as_str()) {
                continue;
            }
            if !values.contains_key(id)
                && let Some(default) = opt.operands().default()
            {
                values.insert(id.clone(), default);
            }
        }
        for (id, spec) in &self.positionals {
            if !values.contains_key(id)
                && let Some(default) = spec.default()
            {
                values.insert(id.clone(), default.clone());
            }
        }

        Ok(Outcome::Invocation(Invocation { path, values }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{Int, Str};
    use crate::help::DefaultHelp;
    use crate::operands::{Accumulate, OperandChain};
    use crate::opt::Opt;
    use crate::positional::Positional;

    fn run(command: &Command, tokens: &[&str]) -> Result<Outcome, Error> {
        let mut cursor = TokenCursor::new(tokens.iter().copied());
        let ctx = DispatchCtx {
            program: "test",
            renderer: &DefaultHelp,
        };
        command.dispatch(&mut cursor, &ctx, Vec::new(), ValueMap::new())
    }

    fn values(command: &Command, tokens: &[&str]) -> ValueMap {
        match run(command, tokens).unwrap() {
            Outcome::Invocation(invocation) => invocation.values,
            Outcome::Help(_) => panic!("unexpected help outcome"),
        }
    }

    fn takes_one(metavar: &str) -> OperandChain {
        OperandChain::single(Positional::new(metavar, Str))
    }

    #[test]
    fn single_option_resolves() {
        let command = Command::new().option("foo", Opt::short('a', takes_one("x")));
        let resolved = values(&command, &["-a", "foo"]);
        assert_eq!(resolved["foo"], Value::Str("foo".to_string()));
    }

    #[test]
    fn replace_policy_keeps_last_occurrence() {
        let command = Command::new().option("n", Opt::short('a', OperandChain::single(Positional::new("n", Int))));
        let resolved = values(&command, &["-a", "1", "-a", "2"]);
        assert_eq!(resolved["n"], Value::Int(2));
    }

    #[test]
    fn append_policy_collects_in_order() {
        let command = Command::new().option(
            "n",
            Opt::short(
                'a',
                OperandChain::single(Positional::new("n", Int)).policy(Accumulate::Append),
            ),
        );
        let resolved = values(&command, &["-a", "1", "-a", "2"]);
        assert_eq!(
            resolved["n"],
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn bundled_shorts_resolve_in_registration_order() {
        let command = Command::new()
            .option("a", Opt::short('a', takes_one("a")))
            .option("b", Opt::short('b', takes_one("b")))
            .option("c", Opt::short('c', takes_one("c")));
        let resolved = values(&command, &["-abc", "foo", "bar", "baz"]);
        assert_eq!(resolved["a"], Value::Str("foo".to_string()));
        assert_eq!(resolved["b"], Value::Str("bar".to_string()));
        assert_eq!(resolved["c"], Value::Str("baz".to_string()));
    }

    #[test]
    fn bundled_flags_consume_nothing() {
        let command = Command::new()
            .option("x", Opt::flag('x', "ex"))
            .option("y", Opt::flag('y', "why"));
        let resolved = values(&command, &["-xy"]);
        assert_eq!(resolved["x"], Value::Bool(true));
        assert_eq!(resolved["y"], Value::Bool(true));
    }

    #[test]
    fn unknown_residual_in_bundle_fails() {
        let command = Command::new().option("x", Opt::flag('x', "ex"));
        let err = run(&command, &["-xz"]).unwrap_err();
        match err {
            Error::UnexpectedToken { token, suggestion } => {
                assert_eq!(token, "-z");
                assert_eq!(suggestion, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn counter_counts_occurrences() {
        let command = Command::new().option("verbose", Opt::counter('v', "verbose"));
        let resolved = values(&command, &["-vvv"]);
        assert_eq!(resolved["verbose"], Value::Int(3));
        let resolved = values(&command, &["-v", "-v"]);
        assert_eq!(resolved["verbose"], Value::Int(2));
    }

    #[test]
    fn optional_operand_tail() {
        let command = Command::new().option(
            "c",
            Opt::short(
                'c',
                OperandChain::new(vec![
                    Positional::new("first", Str),
                    Positional::new("second", Str).optional(),
                ])
                .unwrap(),
            ),
        );
        let resolved = values(&command, &["-c", "foo"]);
        assert_eq!(
            resolved["c"],
            Value::List(vec![Value::Str("foo".to_string())])
        );
        let resolved = values(&command, &["-c", "foo", "bar"]);
        assert_eq!(
            resolved["c"],
            Value::List(vec![
                Value::Str("foo".to_string()),
                Value::Str("bar".to_string())
            ])
        );
    }

    #[test]
    fn operand_list_stops_at_next_option() {
        let command = Command::new()
            .option(
                "c",
                Opt::short(
                    'c',
                    OperandChain::new(vec![
                        Positional::new("first", Str),
                        Positional::new("second", Str).optional(),
                    ])
                    .unwrap(),
                ),
            )
            .option("d", Opt::flag('d', "dee"));
        let resolved = values(&command, &["-c", "foo", "-d"]);
        assert_eq!(
            resolved["c"],
            Value::List(vec![Value::Str("foo".to_string())])
        );
        assert_eq!(resolved["d"], Value::Bool(true));
    }

    #[test]
    fn positionals_fill_in_declared_order() {
        let command = Command::new()
            .positional("src", Positional::new("src", Str))
            .positional("dst", Positional::new("dst", Str));
        let resolved = values(&command, &["a", "b"]);
        assert_eq!(resolved["src"], Value::Str("a".to_string()));
        assert_eq!(resolved["dst"], Value::Str("b".to_string()));
    }

    #[test]
    fn remaining_positional_collects_everything() {
        let command =
            Command::new().positional("rest", Positional::new("rest", Str).remaining());
        let resolved = values(&command, &["a", "b", "c"]);
        assert_eq!(
            resolved["rest"],
            Value::List(vec![
                Value::Str("a".to_string()),
                Value::Str("b".to_string()),
                Value::Str("c".to_string())
            ])
        );
    }

    #[test]
    fn missing_mandatory_positional_fails() {
        let command = Command::new()
            .positional("src", Positional::new("src", Str))
            .positional("dst", Positional::new("dst", Str));
        let err = run(&command, &["only"]).unwrap_err();
        assert_eq!(
            err,
            Error::PositionalMissing {
                metavar: "dst".to_string()
            }
        );
    }

    #[test]
    fn unexpected_token_fails() {
        let err = run(&Command::new(), &["unexpected"]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
        let err = run(&Command::new(), &["-u"]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn child_with_no_tokens_is_command_missing() {
        let command = Command::new().command("child", Command::new());
        let err = run(&command, &[]).unwrap_err();
        assert_eq!(
            err,
            Error::CommandMissing {
                available: vec!["child".to_string()]
            }
        );
    }

    #[test]
    fn default_action_suppresses_command_missing() {
        let command = Command::new()
            .command("child", Command::new())
            .default_action(true);
        let outcome = run(&command, &[]).unwrap();
        assert!(matches!(outcome, Outcome::Invocation(_)));
    }

    #[test]
    fn delegation_is_terminal_and_merges_values() {
        let child = Command::new().option("bar", Opt::short('b', takes_one("x")));
        let command = Command::new()
            .option("foo", Opt::short('a', takes_one("x")))
            .command("sub", child);
        match run(&command, &["-a", "one", "sub", "-b", "two"]).unwrap() {
            Outcome::Invocation(invocation) => {
                assert_eq!(invocation.path, ["sub"]);
                assert_eq!(invocation.command(), Some("sub"));
                assert_eq!(invocation.values["foo"], Value::Str("one".to_string()));
                assert_eq!(invocation.values["bar"], Value::Str("two".to_string()));
            }
            Outcome::Help(_) => panic!("unexpected help outcome"),
        }
    }

    #[test]
    fn child_overrides_inherited_value() {
        let child = Command::new().option("level", Opt::short('l', OperandChain::single(Positional::new("n", Int))));
        let command = Command::new()
            .option("level", Opt::short('l', OperandChain::single(Positional::new("n", Int))))
            .command("sub", child);
        match run(&command, &["-l", "1", "sub", "-l", "2"]).unwrap() {
            Outcome::Invocation(invocation) => {
                assert_eq!(invocation.values["level"], Value::Int(2));
            }
            Outcome::Help(_) => panic!("unexpected help outcome"),
        }
    }

    #[test]
    fn defaults_merge_into_result() {
        let command = Command::new()
            .option(
                "n",
                Opt::short('n', OperandChain::single(Positional::new("n", Int).default_value(9i64))),
            )
            .option("plain", Opt::short('p', takes_one("x")));
        let resolved = values(&command, &[]);
        assert_eq!(resolved["n"], Value::Int(9));
        // No default, never occurred: absent, no placeholder entry.
        assert!(!resolved.contains_key("plain"));
    }

    #[test]
    fn help_short_circuits() {
        let command = Command::new().option("foo", Opt::short('a', takes_one("x")));
        match run(&command, &["--help"]).unwrap() {
            Outcome::Help(text) => assert!(text.contains("USAGE")),
            Outcome::Invocation(_) => panic!("expected help outcome"),
        }
        // Help wins even mid-input; nothing after it is consumed.
        match run(&command, &["-h", "-a"]).unwrap() {
            Outcome::Help(_) => {}
            Outcome::Invocation(_) => panic!("expected help outcome"),
        }
    }

    #[test]
    fn unknown_command_gets_a_suggestion() {
        let command = Command::new().command("status", Command::new());
        let err = run(&command, &["stauts"]).unwrap_err();
        match err {
            Error::UnexpectedToken { suggestion, .. } => {
                assert_eq!(suggestion, Some("status".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn trace_reflects_consumed_tokens() {
        let command = Command::new().option("foo", Opt::short('a', takes_one("x")));
        let mut cursor = TokenCursor::new(["-a", "foo"]);
        let ctx = DispatchCtx {
            program: "test",
            renderer: &DefaultHelp,
        };
        command
            .dispatch(&mut cursor, &ctx, Vec::new(), ValueMap::new())
            .unwrap();
        assert_eq!(cursor.trace(), ["-a", "foo"]);
    }
}
