//! Completions command - print a shell completion script for `chorus`.

use std::io::{self, Write};

use clap::Command;
use clap_complete::{generate, Shell};

/// Arguments for the completions command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    chorus completions bash > ~/.local/share/bash-completion/completions/chorus\n    \
    chorus completions zsh > ~/.zfunc/_chorus\n    \
    chorus completions fish > ~/.config/fish/completions/chorus.fish")]
pub struct Args {
    /// Shell to generate the script for
    #[arg(value_name = "SHELL", value_enum)]
    pub shell: Shell,
}

/// Writes the completion script for `cmd` to stdout.
///
/// Takes the assembled top-level command because subcommand definitions
/// live in the binary's `Cli` parser.
pub fn run(args: Args, mut cmd: Command) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    write_completions(args.shell, &mut cmd, &mut stdout);
    stdout.flush()?;
    Ok(())
}

fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_command() -> Command {
        Command::new("chorus")
            .subcommand(Command::new("list"))
            .subcommand(Command::new("classify"))
    }

    fn script_for(shell: Shell) -> String {
        let mut out = Vec::new();
        write_completions(shell, &mut sample_command(), &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bash_script_names_binary_and_subcommands() {
        let script = script_for(Shell::Bash);
        assert!(script.contains("chorus"));
        assert!(script.contains("list"));
        assert!(script.contains("classify"));
    }

    #[test]
    fn test_fish_script_uses_command_name() {
        let script = script_for(Shell::Fish);
        assert!(script.contains("complete -c chorus"));
    }
}
