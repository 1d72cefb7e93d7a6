// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, configure tracing once, build the
//   session, and hand off to the dispatcher.
// - Every error is printed as a single line; the process exits nonzero on
//   failure.

use clap::Parser;
use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

use moltbook_cli::api::ApiClient;
use moltbook_cli::cli::Cli;
use moltbook_cli::commands::{dispatch, Session};
use moltbook_cli::{config, output};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let session = Session {
        api: ApiClient::from_config()?,
        stdin_is_tty: std::io::stdin().is_tty(),
        credentials_path: config::credentials_file(),
    };
    dispatch(&session, cli.command)?;
    Ok(())
}

/// Configure tracing once, before the client exists. `--verbose` selects
/// debug-level request/response tracing; otherwise `RUST_LOG` applies.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("moltbook_cli=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
