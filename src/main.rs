use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io::{self, Write};
use std::process::ExitCode;

mod cmd;
mod config;
mod qdrant;
mod utils;

use cmd::format::{Role, StyleOptions, color, emoji};
use cmd::{ActionFlags, UsageError};
use config::ConnectionFlags;

/// qdrant-manage - administrative CLI for Qdrant vector collections.
///
/// Exactly one action per invocation:
///   --list                                   list collections
///   --view --collection C [--batch-size N]   summarize chunks per document
///   --inspect --collection C [--limit N]     show raw payloads
///   --delete-all --collection C [--yes]      delete every point
///   --delete-chunk --collection C --chunk-field F --value V [--yes]
///                                            delete points where F == V
///
/// Connection settings: flags > QDRANT_URL / QDRANT_HOST / QDRANT_PORT /
/// QDRANT_API_KEY > --config file > defaults (localhost:6333, http).
///
/// Examples:
///   qdrant-manage --list
///   qdrant-manage --view --collection docs --batch-size 200
///   qdrant-manage --delete-chunk --collection docs --chunk-field doc_id --value report.pdf
///   qdrant-manage --url https://xyz.cloud.qdrant.io --api-key $KEY --inspect --collection docs
///
/// Exit codes: 0 success / cancelled, 1 request failed, 2 usage error.
#[derive(Parser, Debug)]
#[command(
    name = "qdrant-manage",
    version,
    about = "Qdrant vector database management tool",
    long_about = None
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,

    /// Machine-readable JSON output
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    connection: ConnectionFlags,

    #[command(flatten)]
    actions: ActionFlags,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let json = cli.json;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let style = StyleOptions::detect();
            let _ = if json {
                report_error(&mut io::stdout().lock(), json, &err, &style)
            } else {
                report_error(&mut io::stderr().lock(), json, &err, &style)
            };
            ExitCode::from(exit_status(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let action = cli.actions.into_action()?;
    let connection = config::resolve(&cli.connection, |key| std::env::var(key).ok())
        .map_err(|e| UsageError::Config(format!("{e:#}")))?;
    cmd::execute(action, connection, cli.json)
}

/// JSON mode writes `{"status":"error","error":msg}`; otherwise a styled
/// message, preceded by usage help when no action was given.
fn report_error(
    out: &mut dyn Write,
    json: bool,
    err: &anyhow::Error,
    style: &StyleOptions,
) -> io::Result<()> {
    let msg = format!("{err:#}");
    if json {
        return writeln!(out, "{}", serde_json::json!({"status": "error", "error": msg}));
    }
    if matches!(err.downcast_ref::<UsageError>(), Some(UsageError::NoAction)) {
        // Bare invocation: show usage rather than a terse error.
        writeln!(out, "{}", Cli::command().render_help())?;
    }
    writeln!(out, "{}{}", emoji("error", style), color(Role::Error, msg, style))
}

/// 2 for usage errors, 1 for everything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    if err.chain().any(|cause| cause.is::<UsageError>()) {
        2
    } else {
        1
    }
}
