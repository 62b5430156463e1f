//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::auth::Role;

/// Render command arguments.
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// JSON file with the minutes body
    pub input: PathBuf,

    /// Where to write the PDF (defaults to `<prefix>_<date>.pdf`)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Use the external text-improvement service when configured
    #[arg(long)]
    pub assist: bool,
}

/// Assist command arguments.
#[derive(Debug, Args)]
pub struct AssistCommand {
    /// JSON file with agenda items, decisions and optional meeting fields
    pub input: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Create command arguments.
#[derive(Debug, Args)]
pub struct CreateCommand {
    /// JSON file with the minutes body
    pub input: PathBuf,

    /// Role of the caller
    #[arg(long = "as", value_enum, default_value = "secretary")]
    pub role: RoleArg,

    /// Identity of the caller
    #[arg(short, long)]
    pub user: String,
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Record id
    pub id: i64,

    /// JSON file with the fields to change
    pub input: PathBuf,

    /// Role of the caller
    #[arg(long = "as", value_enum, default_value = "secretary")]
    pub role: RoleArg,

    /// Identity of the caller
    #[arg(short, long)]
    pub user: String,
}

/// Approve command arguments.
#[derive(Debug, Args)]
pub struct ApproveCommand {
    /// Record id
    pub id: i64,

    /// PNG or JPEG file with the chairman's signature
    #[arg(short, long, value_name = "FILE")]
    pub signature: PathBuf,

    /// Identity of the chairman
    #[arg(short, long)]
    pub user: String,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Record id
    pub id: i64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Record id
    pub id: i64,

    /// Where to write the PDF (defaults to `<prefix>_<date>.pdf`)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Use the external text-improvement service when configured
    #[arg(long)]
    pub assist: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Workflow role argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Countersigns and approves
    Chairman,
    /// Drafts and signs
    Secretary,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Chairman => Self::Chairman,
            RoleArg::Secretary => Self::Secretary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_arg_conversion() {
        assert_eq!(Role::from(RoleArg::Chairman), Role::Chairman);
        assert_eq!(Role::from(RoleArg::Secretary), Role::Secretary);
    }

    #[test]
    fn test_render_command_debug() {
        let cmd = RenderCommand {
            input: PathBuf::from("minutes.json"),
            output: None,
            assist: true,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("minutes.json"));
        assert!(debug_str.contains("assist"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }

    #[test]
    fn test_role_arg_debug() {
        assert_eq!(format!("{:?}", RoleArg::Secretary), "Secretary");
    }
}
