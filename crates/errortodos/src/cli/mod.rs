//! Command-line interface for errortodos.
//!
//! This module provides the CLI structure for the `errtodo` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, ListCommand, OutputFormat, ShowCommand, SignInCommand,
    SignUpCommand, StatusArg, StatusCommand, UpdateCommand,
};

/// errtodo - Track the errors you hit and how you fixed them
///
/// Keeps a private list of error todos per account: what went wrong, how to
/// reproduce it, how it was fixed, plus optional code and a screenshot.
#[derive(Debug, Parser)]
#[command(name = "errtodo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute (defaults to `list`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Commands that work on the tracker database
    #[command(flatten)]
    Tracker(TrackerCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Commands that open the database and act on the session.
#[derive(Debug, Subcommand)]
pub enum TrackerCommand {
    /// Create an account and sign in
    Signup(SignUpCommand),

    /// Sign in to an existing account
    Signin(SignInCommand),

    /// Sign out
    Logout,

    /// Show the signed-in account
    Whoami,

    /// List your error todos
    List(ListCommand),

    /// Add an error todo
    Add(AddCommand),

    /// Change fields of an error todo
    Update(UpdateCommand),

    /// Flip an error todo between in-progress and complete
    Toggle {
        /// Id of the record
        id: String,
    },

    /// Delete an error todo
    Delete {
        /// Id of the record
        id: String,
    },

    /// Show every field of an error todo
    Show(ShowCommand),

    /// List the categories in use
    Categories,

    /// Show account and storage status
    Status(StatusCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }

    /// The command to run, falling back to the record list.
    #[must_use]
    pub fn into_command(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Tracker(TrackerCommand::List(ListCommand::default())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "errtodo");
    }

    #[test]
    fn test_no_command_falls_back_to_list() {
        let cli = parse(&["errtodo"]);
        assert!(matches!(
            cli.into_command(),
            Command::Tracker(TrackerCommand::List(_))
        ));
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(
            parse(&["errtodo", "-q"]).verbosity(),
            crate::logging::Verbosity::Quiet
        );
        assert_eq!(
            parse(&["errtodo"]).verbosity(),
            crate::logging::Verbosity::Normal
        );
        assert_eq!(
            parse(&["errtodo", "-v"]).verbosity(),
            crate::logging::Verbosity::Verbose
        );
        assert_eq!(
            parse(&["errtodo", "-vv"]).verbosity(),
            crate::logging::Verbosity::Trace
        );
    }

    #[test]
    fn test_parse_signup() {
        let cli = parse(&[
            "errtodo",
            "signup",
            "--name",
            "Alice",
            "--email",
            "alice@x.com",
            "--password",
            "secret1",
            "--confirm",
            "secret1",
        ]);
        let Some(Command::Tracker(TrackerCommand::Signup(cmd))) = cli.command else {
            panic!("expected signup");
        };
        assert_eq!(cmd.email, "alice@x.com");
    }

    #[test]
    fn test_parse_add() {
        let cli = parse(&[
            "errtodo",
            "add",
            "-t",
            "NullPointer",
            "-d",
            "Crash on null",
            "--status",
            "complete",
        ]);
        let Some(Command::Tracker(TrackerCommand::Add(cmd))) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(cmd.title, "NullPointer");
        assert_eq!(cmd.status, StatusArg::Complete);
        assert!(cmd.category.is_none());
    }

    #[test]
    fn test_parse_add_requires_title() {
        assert!(Cli::try_parse_from(["errtodo", "add", "-d", "x"]).is_err());
    }

    #[test]
    fn test_code_and_code_file_conflict() {
        let result = Cli::try_parse_from([
            "errtodo",
            "add",
            "-t",
            "T",
            "-d",
            "D",
            "--code",
            "x",
            "--code-file",
            "a.rs",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = parse(&[
            "errtodo", "list", "-s", "null", "--status", "in-progress", "-f", "json",
        ]);
        let Some(Command::Tracker(TrackerCommand::List(cmd))) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(cmd.search.as_deref(), Some("null"));
        assert_eq!(cmd.status, Some(StatusArg::InProgress));
        assert_eq!(cmd.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_config_subcommand() {
        let cli = parse(&["errtodo", "config", "show", "--json"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand::Show { json: true }))
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["errtodo", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_toggle_and_delete() {
        assert!(matches!(
            parse(&["errtodo", "toggle", "abc"]).command,
            Some(Command::Tracker(TrackerCommand::Toggle { .. }))
        ));
        assert!(matches!(
            parse(&["errtodo", "delete", "abc"]).command,
            Some(Command::Tracker(TrackerCommand::Delete { .. }))
        ));
    }
}
