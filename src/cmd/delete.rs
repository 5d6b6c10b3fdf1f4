/*!
`delete.rs`

Destructive actions. Both ask the `Confirm` capability first unless
`--yes` was given; a refusal prints `Cancelled.` and sends nothing.

  --delete-all    POST points/delete {"filter": {}}
  --delete-chunk  scroll ids matching {key: field, match: {value}}, then
                  POST points/delete {"points": [ids...]}

Discovery for `--delete-chunk` walks the scroll cursor
(`next_page_offset`) in pages of `DISCOVERY_PAGE_SIZE`, so matches past
the first page are deleted too. If the delete request fails after a
successful discovery nothing is rolled back.

JSON output:
  {"status":"ok","action":"delete-all","collection":"docs"}
  {"status":"ok","action":"delete-chunk","collection":"docs","field":"doc_id",
   "value":"A","matched":3,"deleted":3}
  {"status":"cancelled","action":"delete-all","collection":"docs"}
*/

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;

use crate::cmd::RunContext;
use crate::cmd::format::{Role, color, emoji};
use crate::qdrant::model::value_text;
use crate::qdrant::{DeleteSelector, Filter, PointId, QdrantClient, ScrollRequest};

/// Ids requested per discovery scroll page.
pub const DISCOVERY_PAGE_SIZE: usize = 1000;

pub async fn delete_all(
    ctx: &mut RunContext<'_>,
    collection: &str,
    skip_confirm: bool,
) -> Result<()> {
    let style = ctx.style;
    if !skip_confirm {
        let prompt = format!(
            "{}Confirm delete ALL vectors in '{collection}'? (y/N): ",
            emoji("warn", &style)
        );
        if !ctx.confirm.confirm(&prompt)? {
            return cancelled(ctx, "delete-all", collection);
        }
    }

    let selector = DeleteSelector::Filter {
        filter: Filter::all(),
    };
    ctx.client
        .delete_points(collection, &selector)
        .await
        .context("Delete failed")?;
    tracing::info!(collection, "deleted all points");

    if ctx.json {
        return ctx.emit_json(&serde_json::json!({
            "status": "ok",
            "action": "delete-all",
            "collection": collection,
        }));
    }
    writeln!(
        ctx.out,
        "{}{}",
        emoji("delete", &style),
        color(
            Role::Success,
            format!("All vectors deleted from collection '{collection}'."),
            &style
        )
    )?;
    Ok(())
}

pub async fn delete_chunk(
    ctx: &mut RunContext<'_>,
    collection: &str,
    field: &str,
    value: &Value,
    skip_confirm: bool,
) -> Result<()> {
    let style = ctx.style;
    let shown = value_text(value);

    let filter = Filter::field_equals(field, value.clone());
    let ids = discover_matching(ctx.client, collection, &filter)
        .await
        .context("Query failed")?;

    if ids.is_empty() {
        if ctx.json {
            return ctx.emit_json(&chunk_report(collection, field, value, 0, 0));
        }
        writeln!(
            ctx.out,
            "{}{}",
            emoji("warn", &style),
            color(
                Role::Warning,
                format!("No matching vectors found for {field} = {shown}"),
                &style
            )
        )?;
        return Ok(());
    }

    let count = ids.len();
    if !ctx.json {
        writeln!(ctx.out, "Found {count} vectors for {field} = {shown}")?;
    }

    if !skip_confirm {
        let prompt = format!(
            "{}Confirm delete {count} vectors? (y/N): ",
            emoji("warn", &style)
        );
        if !ctx.confirm.confirm(&prompt)? {
            return cancelled(ctx, "delete-chunk", collection);
        }
    }

    ctx.client
        .delete_points(collection, &DeleteSelector::Points { points: ids })
        .await
        .context("Delete failed")?;
    tracing::info!(collection, field, value = %shown, count, "deleted matching points");

    if ctx.json {
        return ctx.emit_json(&chunk_report(collection, field, value, count, count));
    }
    writeln!(
        ctx.out,
        "{}{}",
        emoji("delete", &style),
        color(
            Role::Success,
            format!("Successfully deleted {count} vectors."),
            &style
        )
    )?;
    Ok(())
}

/// Collect the id of every point matching `filter`, following the scroll cursor.
///
/// Stops when the cursor runs out, a page comes back empty, or the server
/// hands back an offset that was already requested. Ids are unique and keep
/// first-seen order.
pub async fn discover_matching(
    client: &QdrantClient,
    collection: &str,
    filter: &Filter,
) -> crate::qdrant::Result<Vec<PointId>> {
    let mut ids = Vec::new();
    let mut seen_ids: HashSet<PointId> = HashSet::new();
    let mut sent_offsets: HashSet<PointId> = HashSet::new();
    let mut offset: Option<PointId> = None;

    loop {
        let request = ScrollRequest::ids_matching(filter.clone(), DISCOVERY_PAGE_SIZE)
            .starting_at(offset.clone());
        let page = client.scroll(collection, &request).await?;
        let fetched = page.points.len();
        for point in page.points {
            if seen_ids.insert(point.id.clone()) {
                ids.push(point.id);
            }
        }
        tracing::debug!(fetched, total = ids.len(), next = ?page.next_page_offset, "discovery page");

        let Some(next) = page.next_page_offset else {
            break;
        };
        if fetched == 0 {
            break;
        }
        if let Some(sent) = offset.take() {
            sent_offsets.insert(sent);
        }
        if sent_offsets.contains(&next) {
            tracing::warn!(%next, "scroll cursor repeated an earlier offset; stopping discovery");
            break;
        }
        offset = Some(next);
    }
    Ok(ids)
}

fn chunk_report(
    collection: &str,
    field: &str,
    value: &Value,
    matched: usize,
    deleted: usize,
) -> Value {
    serde_json::json!({
        "status": "ok",
        "action": "delete-chunk",
        "collection": collection,
        "field": field,
        "value": value,
        "matched": matched,
        "deleted": deleted,
    })
}

fn cancelled(ctx: &mut RunContext<'_>, action: &str, collection: &str) -> Result<()> {
    tracing::debug!(action, collection, "confirmation refused");
    if ctx.json {
        return ctx.emit_json(&serde_json::json!({
            "status": "cancelled",
            "action": action,
            "collection": collection,
        }));
    }
    writeln!(ctx.out, "Cancelled.")?;
    Ok(())
}
