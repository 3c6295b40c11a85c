//! Runs the deploy command inside the bundled workspace.

use miette::Diagnostic;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Errors from the deploy step.
#[derive(Error, Debug, Diagnostic)]
pub enum DeployError {
    /// No command was supplied.
    #[error("No deploy command given")]
    #[diagnostic(
        code(gobundle::deploy::missing_command),
        help("For example: gobundle tar zcvf $PWD/app.tar.gz .")
    )]
    MissingCommand,

    /// The command could not be started.
    #[error("Unable to run {command:?}: {source}")]
    #[diagnostic(
        code(gobundle::deploy::spawn),
        help("Check that the command exists and is on PATH")
    )]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The command ran and reported failure.
    #[error("Unable to run {command:?}: {status}")]
    #[diagnostic(code(gobundle::deploy::failed))]
    Failed {
        /// The command line that was attempted.
        command: String,
        /// Exit status of the command.
        status: ExitStatus,
    },
}

/// Joins a command line for display.
fn display_command(command: &[OsString]) -> String {
    command
        .iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs `command` with `workspace` as its working directory and the current
/// process's stdio.
///
/// # Errors
///
/// Returns [`DeployError`] if the command is empty, cannot be spawned, or exits
/// unsuccessfully.
pub fn run(command: &[OsString], workspace: &Path) -> Result<(), DeployError> {
    let Some((program, args)) = command.split_first() else {
        return Err(DeployError::MissingCommand);
    };
    let command_line = display_command(command);
    tracing::debug!("Running command {:?} in {}", command_line, workspace.display());

    let status = Command::new(program)
        .args(args)
        .current_dir(workspace)
        .status()
        .map_err(|source| DeployError::Spawn {
            command: command_line.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(DeployError::Failed {
            command: command_line,
            status,
        })
    }
}
