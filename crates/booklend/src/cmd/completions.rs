//! Shell completion generation shared by every tool.

use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;

/// Shells completions can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShellType {
    /// Bash
    Bash,
    /// Zsh
    Zsh,
    /// Fish
    Fish,
    /// `PowerShell`
    Powershell,
    /// Elvish
    Elvish,
}

impl From<ShellType> for Shell {
    fn from(shell: ShellType) -> Self {
        match shell {
            ShellType::Bash => Self::Bash,
            ShellType::Zsh => Self::Zsh,
            ShellType::Fish => Self::Fish,
            ShellType::Powershell => Self::PowerShell,
            ShellType::Elvish => Self::Elvish,
        }
    }
}

/// Write completions for `T` to stdout.
pub fn generate_completions<T: CommandFactory>(shell: ShellType, bin_name: &str) {
    let mut cmd = T::command();
    generate(Shell::from(shell), &mut cmd, bin_name, &mut io::stdout());
}
