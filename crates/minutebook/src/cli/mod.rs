//! Command-line interface for minutebook.
//!
//! This module provides the CLI structure for the `minutebook` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ApproveCommand, AssistCommand, ConfigCommand, CreateCommand, ExportCommand, ListCommand,
    RenderCommand, RoleArg, ShowCommand, UpdateCommand,
};

/// minutebook - Meeting minutes, approved and on paper
///
/// Records meeting minutes, carries them from the secretary's draft to the
/// chairman's approval, and renders them as paginated PDF documents.
#[derive(Debug, Parser)]
#[command(name = "minutebook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a minutes body straight to PDF without storing it
    Render(RenderCommand),

    /// Review agenda items and decisions and list outstanding issues
    Assist(AssistCommand),

    /// Store a new minutes record
    Create(CreateCommand),

    /// Change a stored record or attach the secretary signature
    Update(UpdateCommand),

    /// Approve a record with the chairman signature
    Approve(ApproveCommand),

    /// List stored records, newest first
    List(ListCommand),

    /// Show one stored record
    Show(ShowCommand),

    /// Render a stored record to PDF
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::List(ListCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "minutebook");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli(0, true).verbosity(), crate::logging::Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), crate::logging::Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), crate::logging::Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render() {
        let args = vec!["minutebook", "render", "minutes.json", "-o", "out.pdf", "--assist"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Render(cmd) => {
                assert_eq!(cmd.input, PathBuf::from("minutes.json"));
                assert_eq!(cmd.output, Some(PathBuf::from("out.pdf")));
                assert!(cmd.assist);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_with_role() {
        let args = vec!["minutebook", "create", "m.json", "--as", "chairman", "--user", "admin"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Create(cmd) => {
                assert_eq!(cmd.role, RoleArg::Chairman);
                assert_eq!(cmd.user, "admin");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_defaults_to_secretary() {
        let args = vec!["minutebook", "create", "m.json", "-u", "user"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Create(CreateCommand {
                role: RoleArg::Secretary,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_approve() {
        let args = vec!["minutebook", "approve", "3", "--signature", "sig.png", "--user", "admin"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Approve(ApproveCommand { id: 3, .. })));
    }

    #[test]
    fn test_parse_approve_requires_signature() {
        let args = vec!["minutebook", "approve", "3", "--user", "admin"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_config_validate() {
        let args = vec!["minutebook", "config", "validate", "--file", "/tmp/c.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Validate { .. })));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["minutebook", "-c", "/custom/config.toml", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(vec!["minutebook", "-v", "list"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let cli = Cli::try_parse_from(vec!["minutebook", "-q", "list"]).unwrap();
        assert!(cli.quiet);
    }
}
