//! Command-line definition, error categories and exit codes.

use crate::deploy::DeployError;
use crate::logging::LogLevel;
use clap::Parser;
use gobundle_core::SkipList;
use miette::{Diagnostic, Report};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Bundling or deploy failure exit code
pub const EXIT_FAILURE: i32 = 1;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(gobundle::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Dependency resolution or workspace error (exit code 1)
    #[error("Bundle error: {message}")]
    #[diagnostic(code(gobundle::cli::bundle))]
    Bundle {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Deploy command error (exit code 1)
    #[error("Deploy error: {message}")]
    #[diagnostic(code(gobundle::cli::deploy))]
    Deploy {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new bundle error
    #[must_use]
    pub fn bundle(message: impl Into<String>) -> Self {
        Self::Bundle {
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to an existing error, returning a new error with the help text set.
    #[must_use]
    pub fn with_help(self, help_text: Option<String>) -> Self {
        let help = help_text;
        match self {
            Self::Config { message, .. } => Self::Config { message, help },
            Self::Bundle { message, .. } => Self::Bundle { message, help },
            Self::Deploy { message, .. } => Self::Deploy { message, help },
        }
    }

    /// Append a line to the help text, keeping whatever help is already there.
    #[must_use]
    pub fn with_note(self, note: &str) -> Self {
        let help = match self.help_text() {
            Some(help) => format!("{help}\n{note}"),
            None => note.to_string(),
        };
        self.with_help(Some(help))
    }

    fn help_text(&self) -> Option<&str> {
        match self {
            Self::Config { help, .. } | Self::Bundle { help, .. } | Self::Deploy { help, .. } => {
                help.as_deref()
            }
        }
    }
}

fn help_of(diagnostic: &dyn Diagnostic) -> Option<String> {
    diagnostic.help().map(|help| help.to_string())
}

/// Convert `gobundle_core::Error` to the bundle category (exit code 1).
impl From<gobundle_core::Error> for CliError {
    fn from(err: gobundle_core::Error) -> Self {
        let help = help_of(&err);
        Self::bundle(err.to_string()).with_help(help)
    }
}

/// Build context discovery problems are configuration errors (exit code 2).
impl From<gobundle_gobuild::Error> for CliError {
    fn from(err: gobundle_gobuild::Error) -> Self {
        let help = help_of(&err);
        Self::config(err.to_string()).with_help(help)
    }
}

impl From<DeployError> for CliError {
    fn from(err: DeployError) -> Self {
        let help = help_of(&err);
        Self::Deploy {
            message: err.to_string(),
            help,
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Bundle { .. } | CliError::Deploy { .. } => EXIT_FAILURE,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let envelope = serde_json::json!({
            "status": "error",
            "error": {
                "code": match err {
                    CliError::Config { .. } => "config",
                    CliError::Bundle { .. } => "bundle",
                    CliError::Deploy { .. } => "deploy",
                },
                "message": err.to_string(),
            }
        });
        eprintln!("{envelope}");
    } else {
        // Use miette for human-friendly error display
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
    }
    // Ensure output is flushed before potential process exit
    let _ = io::stderr().flush();
}

/// Bundle a Go program with its dependencies and run a deploy command on the bundle.
#[derive(Parser, Debug)]
#[command(
    name = "gobundle",
    version,
    about = "Bundle a Go program's dependencies into a vendor directory and deploy it",
    long_about = "Copies the program in --root and every package it transitively imports \
                  (outside the standard library) into a temporary directory, with \
                  dependencies under vendor/<import path>, then runs COMMAND from \
                  inside that directory. The directory is removed afterwards.",
    after_help = "For example:\n  gobundle tar zcvf $PWD/app.tar.gz ."
)]
pub struct Cli {
    /// Verbose logging (same as --level debug).
    #[arg(short = 'v', long, help = "Verbose logging")]
    pub verbose: bool,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Emit logs and errors as JSON.
    #[arg(long, help = "Emit logs and errors as JSON")]
    pub json: bool,

    /// Root directory of the program to bundle.
    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Program directory to bundle"
    )]
    pub root: PathBuf,

    /// Go distribution root.
    #[arg(long, env = "GOROOT", value_name = "DIR", help = "Go distribution root")]
    pub goroot: Option<OsString>,

    /// GOPATH search list.
    #[arg(long, env = "GOPATH", value_name = "DIRS", help = "GOPATH search list")]
    pub gopath: Option<OsString>,

    /// Entry names never copied (replaces the default .git and .hg).
    #[arg(
        long = "skip",
        value_name = "NAME",
        help = "Entry name to leave out of the bundle (repeatable, default: .git .hg)"
    )]
    pub skip: Vec<String>,

    /// Fail instead of warning when two import paths compete for a vendored location.
    #[arg(long, help = "Treat ambiguous vendoring as an error")]
    pub strict: bool,

    /// Keep the workspace after the command finishes.
    #[arg(long, help = "Do not delete the bundle directory")]
    pub keep: bool,

    /// Print the dependency closure as JSON instead of bundling.
    #[arg(long, conflicts_with = "command", help = "Print the dependency closure as JSON and exit")]
    pub list: bool,

    /// Deploy command, run from inside the bundle.
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required_unless_present = "list",
        help = "Command (and arguments) to run inside the bundle"
    )]
    pub command: Vec<OsString>,
}

impl Cli {
    /// Level after applying `--verbose`.
    #[must_use]
    pub fn effective_level(&self) -> LogLevel {
        if self.verbose && matches!(self.level, LogLevel::Info | LogLevel::Warn | LogLevel::Error)
        {
            LogLevel::Debug
        } else {
            self.level
        }
    }

    /// Skip list from `--skip`, or the default one.
    #[must_use]
    pub fn skip_list(&self) -> SkipList {
        if self.skip.is_empty() {
            SkipList::default()
        } else {
            SkipList::new(self.skip.iter().cloned())
        }
    }
}

/// Parse command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
