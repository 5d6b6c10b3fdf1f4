/*!
`list.rs`

`--list`: print the name of every collection (`GET /collections`).

JSON output:
{
  "status": "ok",
  "action": "list",
  "count": 2,
  "collections": ["docs", "faq"]
}

An empty collection list is not an error: the header prints with no entries.
*/

use anyhow::{Context, Result};

use crate::cmd::RunContext;
use crate::cmd::format::{Role, color, emoji};

pub async fn run(ctx: &mut RunContext<'_>) -> Result<()> {
    let collections = ctx
        .client
        .list_collections()
        .await
        .context("Failed to list collections")?;

    if ctx.json {
        let names: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
        return ctx.emit_json(&serde_json::json!({
            "status": "ok",
            "action": "list",
            "count": names.len(),
            "collections": names,
        }));
    }

    let style = ctx.style;
    writeln!(
        ctx.out,
        "\n{}{}",
        emoji("collections", &style),
        color(Role::Bold, "Collections found:", &style)
    )?;
    for c in &collections {
        writeln!(ctx.out, " - {}", c.name)?;
    }
    Ok(())
}
