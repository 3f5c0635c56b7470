pub mod dump;

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(name = "ansinv")]
#[command(about = "Resolve an Ansible INI inventory and dump the result.")]
#[command(version)]
pub struct CommandLine {
    /// Path to the inventory file
    pub inventory: PathBuf,

    /// Host pattern expression, e.g. 'web:&staging:!atlanta'
    pub patterns: Option<String>,

    /// Keep host and group names as written
    #[arg(long)]
    pub keep_case: bool,

    /// Skip group_vars/ and host_vars/ next to the inventory
    #[arg(long)]
    pub no_vars: bool,

    /// Print a coloured tree instead of JSON
    #[arg(long)]
    pub pretty: bool,

    /// Reduce log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    /// Increase log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let cmd = CommandLine::parse_from(["ansinv", "-vv", "--keep-case", "hosts", "web:!db"]);
        assert_eq!(cmd.verbose, 2);
        assert!(cmd.keep_case);
        assert!(!cmd.no_vars);
        assert_eq!(cmd.inventory, PathBuf::from("hosts"));
        assert_eq!(cmd.patterns.as_deref(), Some("web:!db"));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(CommandLine::try_parse_from(["ansinv", "-q", "-v", "hosts"]).is_err());
    }
}
