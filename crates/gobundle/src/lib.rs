//! gobundle: bundle a Go program's dependencies into a vendor directory.
//!
//! The CLI resolves the program's dependency closure with
//! [`gobundle_gobuild::GoBuildContext`], copies everything into a temporary
//! workspace with [`gobundle_core::Materializer`], and runs the user's deploy
//! command from inside that workspace. The workspace is deleted on every exit
//! path unless `--keep` is given.

pub mod cli;
pub mod deploy;
pub mod logging;

use cli::{Cli, CliError};
use gobundle_core::{ClosureMap, Materializer, Resolver, Workspace};
use gobundle_gobuild::GoBuildContext;
use std::path::PathBuf;

/// What a successful run produced.
#[derive(Debug)]
pub enum Outcome {
    /// `--list`: the closure was resolved and nothing else happened.
    Listed(ClosureMap),
    /// The deploy command succeeded.
    Deployed {
        /// Workspace location when `--keep` was given.
        kept: Option<PathBuf>,
    },
}

/// Resolves the program's dependency closure using the CLI's build settings.
///
/// # Errors
///
/// Fails if the build context cannot be configured, resolution hits a fatal
/// path error, or `--strict` finds ambiguous vendoring.
pub fn analyze(cli: &Cli) -> Result<ClosureMap, CliError> {
    let context = GoBuildContext::from_parts(cli.goroot.clone(), cli.gopath.clone())?;
    let closure = Resolver::new(&context).resolve(&cli.root)?;
    if cli.strict {
        closure.ensure_unambiguous()?;
    }
    Ok(closure)
}

/// Runs the whole pipeline: resolve, materialize, deploy.
///
/// # Errors
///
/// Returns the first failure. The workspace is removed before returning
/// unless `--keep` was given, in which case the error's help names it.
pub fn run(cli: &Cli) -> Result<Outcome, CliError> {
    let closure = analyze(cli)?;
    if cli.list {
        return Ok(Outcome::Listed(closure));
    }

    let workspace = Workspace::create()?;
    let (_guard, path) = if cli.keep {
        let path = workspace.keep();
        tracing::warn!("Keeping workspace at {}", path.display());
        (None, path)
    } else {
        let path = workspace.path().to_path_buf();
        (Some(workspace), path)
    };

    let bundled = Materializer::new(cli.skip_list())
        .materialize(&closure, &cli.root, &path)
        .map_err(CliError::from)
        .and_then(|()| deploy::run(&cli.command, &path).map_err(CliError::from));
    if let Err(err) = bundled {
        return Err(if cli.keep {
            err.with_note(&format!("Bundle directory kept at {}", path.display()))
        } else {
            err
        });
    }

    Ok(Outcome::Deployed {
        kept: cli.keep.then_some(path),
    })
}
