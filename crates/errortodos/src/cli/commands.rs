//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::Status;

/// Sign-up command arguments.
#[derive(Debug, Args)]
pub struct SignUpCommand {
    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Email address
    #[arg(short, long)]
    pub email: String,

    /// Password
    #[arg(short, long)]
    pub password: String,

    /// Password again, to confirm
    #[arg(long)]
    pub confirm: String,
}

/// Sign-in command arguments.
#[derive(Debug, Args)]
pub struct SignInCommand {
    /// Email address
    #[arg(short, long)]
    pub email: String,

    /// Password
    #[arg(short, long)]
    pub password: String,
}

/// List command arguments.
#[derive(Debug, Default, Args)]
pub struct ListCommand {
    /// Only show records whose title, description or category contains this
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only show records with this status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Only show records in this category (`all` for every category)
    #[arg(long)]
    pub category: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Brief error title
    #[arg(short, long)]
    pub title: String,

    /// Describe the error in detail
    #[arg(short, long)]
    pub description: String,

    /// Steps to reproduce the error
    #[arg(long)]
    pub steps: Option<String>,

    /// How to fix this error
    #[arg(long)]
    pub fix: Option<String>,

    /// Code snippet
    #[arg(long, conflicts_with = "code_file")]
    pub code: Option<String>,

    /// Read the code snippet from a file
    #[arg(long, value_name = "FILE")]
    pub code_file: Option<PathBuf>,

    /// Initial status
    #[arg(long, value_enum, default_value = "in-progress")]
    pub status: StatusArg,

    /// Category (e.g. development, database, api)
    #[arg(long)]
    pub category: Option<String>,

    /// Screenshot to attach (PNG, JPG, GIF up to 5MB)
    #[arg(short, long, value_name = "FILE")]
    pub image: Option<PathBuf>,
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Id of the record to update
    pub id: String,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,

    /// New reproduction steps
    #[arg(long)]
    pub steps: Option<String>,

    /// New fix notes
    #[arg(long)]
    pub fix: Option<String>,

    /// New code snippet
    #[arg(long, conflicts_with = "code_file")]
    pub code: Option<String>,

    /// Read the new code snippet from a file
    #[arg(long, value_name = "FILE")]
    pub code_file: Option<PathBuf>,

    /// New status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// New category
    #[arg(long)]
    pub category: Option<String>,

    /// Replace the screenshot
    #[arg(short, long, value_name = "FILE", conflicts_with = "remove_image")]
    pub image: Option<PathBuf>,

    /// Remove the screenshot
    #[arg(long)]
    pub remove_image: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Id of the record to show
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Write the screenshot to this file (image extension added if missing)
    #[arg(long, value_name = "FILE")]
    pub image_out: Option<PathBuf>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
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

/// Record status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Still being worked on
    InProgress,
    /// Fixed
    Complete,
}

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Complete => Self::Complete,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
