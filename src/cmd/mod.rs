/*!
Command dispatcher.

One invocation runs exactly one `Action`. Each action lives in its own
module and exposes an async `run`-style entry point taking a `RunContext`
(client, confirmation capability, output sink, style). `execute` owns the
Tokio runtime and drives the selected action to completion, so callers see
plain blocking behavior.

  src/cmd/
    mod.rs       (this file: RunContext + dispatch)
    action.rs    (Action sum type, flag validation, UsageError)
    confirm.rs   (Confirm trait + stdin implementation)
    format.rs    (color / emoji / sample helpers)
    list.rs      (--list)
    view.rs      (--view)
    inspect.rs   (--inspect)
    delete.rs    (--delete-all, --delete-chunk)

Conventions:
  - Human output goes to `RunContext::out`; with `--json` every action
    prints exactly one JSON document there instead.
  - Failures are returned as `anyhow::Error` with a short context
    ("Failed to list collections", "Delete failed", ...) wrapping the
    client error, which carries the raw response body.
*/

use anyhow::{Context, Result};
use std::io::{self, Write};

use crate::qdrant::{ConnectionConfig, QdrantClient};

pub mod action;
pub mod confirm;
pub mod delete;
pub mod format;
pub mod inspect;
pub mod list;
pub mod view;

pub use action::{Action, ActionFlags, UsageError};
pub use confirm::{Confirm, StdinConfirm};
pub use format::StyleOptions;

/// Everything an action needs besides its own arguments.
pub struct RunContext<'a> {
    pub client: &'a QdrantClient,
    pub confirm: &'a mut dyn Confirm,
    pub out: &'a mut dyn Write,
    pub style: StyleOptions,
    pub json: bool,
}

impl RunContext<'_> {
    pub(crate) fn emit_json(&mut self, value: &serde_json::Value) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

/// Run one action against the configured service.
pub fn execute(action: Action, config: ConnectionConfig, json: bool) -> Result<()> {
    let client = QdrantClient::new(config).context("Failed to build HTTP client")?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut confirm = StdinConfirm;
    let mut ctx = RunContext {
        client: &client,
        confirm: &mut confirm,
        out: &mut out,
        style: StyleOptions::detect(),
        json,
    };

    rt.block_on(dispatch(&action, &mut ctx))?;
    out.flush()?;
    Ok(())
}

pub async fn dispatch(action: &Action, ctx: &mut RunContext<'_>) -> Result<()> {
    tracing::debug!(?action, "dispatch");
    match action {
        Action::List => list::run(ctx).await,
        Action::View {
            collection,
            batch_size,
        } => view::run(ctx, collection, *batch_size).await,
        Action::Inspect { collection, limit } => inspect::run(ctx, collection, *limit).await,
        Action::DeleteAll {
            collection,
            skip_confirm,
        } => delete::delete_all(ctx, collection, *skip_confirm).await,
        Action::DeleteChunk {
            collection,
            field,
            value,
            skip_confirm,
        } => delete::delete_chunk(ctx, collection, field, value, *skip_confirm).await,
    }
}
