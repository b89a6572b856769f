//! Help rendering for command nodes.
//!
//! The dispatch loop only decides *when* help is shown; *what* it looks
//! like is behind the [`HelpRenderer`] trait so embedders can swap the
//! layout without touching resolution. [`DefaultHelp`] produces the usual
//! sectioned plain-text page.

use crate::command::Command;

/// Renders the help page for one command node.
///
/// `path` is the chain of command names delegated through to reach
/// `command`, root first; it is empty when help was requested on the root
/// itself.
pub trait HelpRenderer: Send + Sync {
    fn render(&self, program: &str, path: &[String], command: &Command) -> String;
}

/// Sectioned plain-text help: about line, `USAGE:`, then `COMMANDS:`,
/// `ARGUMENTS:` and `OPTIONS:` as applicable, columns aligned.
pub struct DefaultHelp;

const COLUMN: usize = 18;

fn push_row(out: &mut String, left: &str, help: Option<&str>) {
    out.push_str("    ");
    out.push_str(left);
    if let Some(help) = help {
        if left.len() < COLUMN {
            for _ in left.len()..COLUMN {
                out.push(' ');
            }
        } else {
            out.push_str("\n    ");
            for _ in 0..COLUMN {
                out.push(' ');
            }
        }
        out.push_str(help);
    }
    out.push('\n');
}

impl HelpRenderer for DefaultHelp {
    fn render(&self, program: &str, path: &[String], command: &Command) -> String {
        let mut out = String::new();

        if let Some(about) = command.about_text() {
            out.push_str(about);
            out.push_str("\n\n");
        }

        let mut usage = String::from(program);
        for part in path {
            usage.push(' ');
            usage.push_str(part);
        }
        for (_, opt) in command.options() {
            usage.push_str(" [");
            usage.push_str(&opt.usage());
            usage.push(']');
        }
        let children: Vec<&str> = command.commands().map(|(name, _)| name).collect();
        if !children.is_empty() {
            usage.push_str(" {");
            usage.push_str(&children.join("|"));
            usage.push('}');
        }
        for (_, spec) in command.positionals() {
            let fragment = spec.usage();
            if !fragment.is_empty() {
                usage.push(' ');
                usage.push_str(&fragment);
            }
        }
        out.push_str("USAGE:\n    ");
        out.push_str(&usage);
        out.push('\n');

        if !children.is_empty() {
            out.push_str("\nCOMMANDS:\n");
            for (name, child) in command.commands() {
                push_row(&mut out, name, child.about_text());
            }
        }

        if command.positionals().next().is_some() {
            out.push_str("\nARGUMENTS:\n");
            for (_, spec) in command.positionals() {
                push_row(&mut out, &spec.usage(), spec.help_text());
            }
        }

        out.push_str("\nOPTIONS:\n");
        for (_, opt) in command.options() {
            let operands = opt.operands().usage();
            let left = if operands.is_empty() {
                opt.spellings()
            } else {
                format!("{} {}", opt.spellings(), operands)
            };
            push_row(&mut out, &left, opt.help_text());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Str;
    use crate::operands::OperandChain;
    use crate::opt::Opt;
    use crate::positional::Positional;

    #[test]
    fn renders_all_sections() {
        let command = Command::new()
            .about("Copy things around")
            .option(
                "output",
                Opt::new(
                    'o',
                    "output",
                    OperandChain::single(Positional::new("file", Str)),
                )
                .help("Write results to file"),
            )
            .command("sync", Command::new().about("Mirror a tree"))
            .default_action(true)
            .positional("src", Positional::new("src", Str).help("Source path"));
        let page = DefaultHelp.render("cp", &[], &command);

        assert!(page.starts_with("Copy things around\n"));
        assert!(page.contains("USAGE:\n    cp [-h] [-o file] {sync} src\n"));
        assert!(page.contains("COMMANDS:\n    sync              Mirror a tree\n"));
        assert!(page.contains("ARGUMENTS:\n    src               Source path\n"));
        assert!(page.contains("-o, --output file Write results to file"));
        assert!(page.contains("-h, --help"));
    }

    #[test]
    fn path_is_spliced_into_usage() {
        let command = Command::new();
        let page = DefaultHelp.render("cp", &["remote".to_string(), "sync".to_string()], &command);
        assert!(page.contains("USAGE:\n    cp remote sync [-h]\n"));
    }

    #[test]
    fn long_left_column_wraps_to_its_own_line() {
        let command = Command::new().option(
            "deliberately-long",
            Opt::long(
                "deliberately-long-name",
                OperandChain::single(Positional::new("value", Str)),
            )
            .help("Help on the next line"),
        );
        let page = DefaultHelp.render("cp", &[], &command);
        assert!(page.contains("--deliberately-long-name value\n"));
        assert!(page.contains("Help on the next line"));
    }
}
