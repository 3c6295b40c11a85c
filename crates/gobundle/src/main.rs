//! gobundle CLI entry point.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use gobundle::Outcome;
use gobundle::cli::{self, EXIT_FAILURE, EXIT_OK, exit_code_for, render_error};
use gobundle::logging::{self, TracingConfig, TracingFormat};

fn main() {
    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            TracingFormat::Compact
        },
        level: cli.effective_level().into(),
    };
    // Ignore error if tracing already initialized (e.g., in tests)
    let _ = logging::init_tracing(&tracing_config);

    let exit_code = match gobundle::run(&cli) {
        Ok(Outcome::Listed(closure)) => match serde_json::to_string_pretty(&closure) {
            Ok(json) => {
                println!("{json}");
                EXIT_OK
            }
            Err(e) => {
                eprintln!("gobundle: unable to encode closure: {e}");
                EXIT_FAILURE
            }
        },
        Ok(Outcome::Deployed { kept }) => {
            if let Some(path) = kept {
                eprintln!("{}", path.display());
            }
            EXIT_OK
        }
        Err(err) => {
            render_error(&err, cli.json);
            exit_code_for(&err)
        }
    };
    std::process::exit(exit_code);
}
