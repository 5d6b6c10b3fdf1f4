/*!
`inspect.rs`

`--inspect`: show up to `--limit` points with their full payloads.

Human output lists each payload entry in stored order; string values
longer than 150 characters are clipped. JSON output carries payloads
unmodified:
{
  "status": "ok",
  "action": "inspect",
  "collection": "docs",
  "count": 1,
  "points": [ { "id": 7, "payload": { ... } } ]
}
*/

use anyhow::{Context, Result};

use crate::cmd::RunContext;
use crate::cmd::format::{Role, color, emoji};
use crate::qdrant::{Payload, ScrollRequest};

/// Longest string value printed before clipping.
pub const VALUE_CHARS: usize = 150;

pub async fn run(ctx: &mut RunContext<'_>, collection: &str, limit: usize) -> Result<()> {
    let page = ctx
        .client
        .scroll(collection, &ScrollRequest::payloads(limit))
        .await
        .context("Failed to inspect")?;

    if ctx.json {
        let points: Vec<serde_json::Value> = page
            .points
            .iter()
            .map(|p| serde_json::json!({"id": p.id, "payload": p.payload}))
            .collect();
        return ctx.emit_json(&serde_json::json!({
            "status": "ok",
            "action": "inspect",
            "collection": collection,
            "count": points.len(),
            "points": points,
        }));
    }

    let style = ctx.style;
    writeln!(
        ctx.out,
        "\n{}{}\n",
        emoji("inspect", &style),
        color(
            Role::Bold,
            format!("Inspecting collection: {collection} (showing up to {limit})"),
            &style
        )
    )?;
    if page.points.is_empty() {
        writeln!(ctx.out, "{}", color(Role::Dim, "No vectors found.", &style))?;
        return Ok(());
    }

    for (i, point) in page.points.iter().enumerate() {
        writeln!(
            ctx.out,
            "{}Vector #{} — id: {}",
            emoji("vector", &style),
            i + 1,
            color(Role::Primary, point.id.to_string(), &style)
        )?;
        for (key, value) in point.payload.iter() {
            writeln!(
                ctx.out,
                "   {key}: {}",
                Payload::display_value(value, VALUE_CHARS)
            )?;
        }
        writeln!(ctx.out)?;
    }
    Ok(())
}
