use std::io::Write;

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;

pub fn generate_completions(shell: Shell) {
    write_completions(shell, &mut std::io::stdout());
}

/// Completion script for `shell`, written under the binary's own name.
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_cover_approval_commands() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        for command in ["submit", "pending", "approve", "reject", "sweep", "compact"] {
            assert!(script.contains(command), "missing {command}");
        }
    }

    #[test]
    fn test_zsh_completions_use_binary_name() {
        let mut out = Vec::new();
        write_completions(Shell::Zsh, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.starts_with("#compdef pausegate"));
    }
}
