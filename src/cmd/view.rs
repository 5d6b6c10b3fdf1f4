/*!
`view.rs`

`--view`: fetch one scroll page (`--batch-size` points, payloads only) and
summarize it per source document.

A chunk's document is resolved from its payload (`doc_id`, then `source`,
then `filename`, else `UNKNOWN`). Documents are listed in first-seen order
with their chunk count and a preview of their first chunk. Later pages are
not fetched.

JSON output:
{
  "status": "ok",
  "action": "view",
  "collection": "docs",
  "points": 2,
  "documents": [ { "doc_id": "A", "chunks": 2, "sample": "hello..." } ]
}
*/

use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::cmd::RunContext;
use crate::cmd::format::{Role, color, emoji, sample};
use crate::qdrant::{Point, ScrollRequest};

/// Characters of the first chunk shown as a preview.
pub const SAMPLE_CHARS: usize = 100;

/// Chunks sharing a resolved document id, in scroll order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocGroup {
    pub doc_id: String,
    pub chunks: Vec<String>,
}

impl DocGroup {
    pub fn sample(&self) -> String {
        sample(self.chunks.first().map_or("", String::as_str), SAMPLE_CHARS)
    }
}

/// Group chunk texts by document, keeping first-seen document order.
pub fn group_by_document(points: &[Point]) -> Vec<DocGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DocGroup> = Vec::new();

    for point in points {
        let key = point.payload.document_key();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(DocGroup {
                doc_id: key,
                chunks: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].chunks.push(point.payload.text());
    }
    groups
}

pub async fn run(ctx: &mut RunContext<'_>, collection: &str, batch_size: usize) -> Result<()> {
    let page = ctx
        .client
        .scroll(collection, &ScrollRequest::payloads(batch_size))
        .await
        .context("Failed to fetch data")?;
    let groups = group_by_document(&page.points);

    if ctx.json {
        let documents: Vec<serde_json::Value> = groups
            .iter()
            .map(|g| {
                serde_json::json!({
                    "doc_id": g.doc_id,
                    "chunks": g.chunks.len(),
                    "sample": g.sample(),
                })
            })
            .collect();
        return ctx.emit_json(&serde_json::json!({
            "status": "ok",
            "action": "view",
            "collection": collection,
            "points": page.points.len(),
            "documents": documents,
        }));
    }

    let style = ctx.style;
    writeln!(
        ctx.out,
        "\n{}{}",
        emoji("view", &style),
        color(
            Role::Bold,
            format!("Previewing collection: {collection}"),
            &style
        )
    )?;
    if groups.is_empty() {
        writeln!(ctx.out, "{}", color(Role::Dim, "No points found.", &style))?;
        return Ok(());
    }

    writeln!(ctx.out, "\nFound {} document(s):\n", groups.len())?;
    for g in &groups {
        writeln!(
            ctx.out,
            "{}doc_id: {}\n   chunks: {}\n   sample: {}\n",
            emoji("document", &style),
            color(Role::Primary, &g.doc_id, &style),
            g.chunks.len(),
            g.sample()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::testing::{Captured, client_for};
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn points(payloads: Value) -> Vec<Point> {
        let list: Vec<Value> = payloads
            .as_array()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, p)| json!({"id": i, "payload": p}))
            .collect();
        serde_json::from_value(Value::Array(list)).unwrap()
    }

    #[test]
    fn groups_by_doc_id_in_first_seen_order() {
        let pts = points(json!([
            {"doc_id":"B","text":"b1"},
            {"doc_id":"A","text":"a1"},
            {"doc_id":"B","text":"b2"},
        ]));
        let groups = group_by_document(&pts);
        assert_eq!(
            groups,
            vec![
                DocGroup {
                    doc_id: "B".into(),
                    chunks: vec!["b1".into(), "b2".into()]
                },
                DocGroup {
                    doc_id: "A".into(),
                    chunks: vec!["a1".into()]
                },
            ]
        );
    }

    #[test]
    fn grouping_falls_back_through_fields() {
        let pts = points(json!([
            {"source":"s.pdf","text":"x"},
            {"filename":"f.txt","text":"y"},
            {"text":"z"},
            {},
        ]));
        let ids: Vec<String> = group_by_document(&pts)
            .into_iter()
            .map(|g| g.doc_id)
            .collect();
        assert_eq!(ids, ["s.pdf", "f.txt", "UNKNOWN"]);
    }

    #[test]
    fn sample_rules() {
        let long = DocGroup {
            doc_id: "A".into(),
            chunks: vec!["x".repeat(120)],
        };
        assert_eq!(long.sample(), format!("{}...", "x".repeat(100)));

        let empty = DocGroup {
            doc_id: "A".into(),
            chunks: vec![String::new(), "later".into()],
        };
        assert_eq!(empty.sample(), "(no text)");
    }

    #[tokio::test]
    async fn summarizes_one_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/docs/points/scroll"))
            .and(body_json(
                json!({"limit":2,"with_payload":true,"with_vector":false}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "points": [
                        {"id": 1, "payload": {"doc_id":"A","text":"hello"}},
                        {"id": 2, "payload": {"doc_id":"A","text":"world"}}
                    ],
                    "next_page_offset": 3
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut cap = Captured::new([]);
        run(&mut cap.ctx(&client), "docs", 2).await.unwrap();

        let text = cap.text();
        assert!(text.contains("Previewing collection: docs"));
        assert!(text.contains("Found 1 document(s):"));
        assert!(text.contains("doc_id: A\n   chunks: 2\n   sample: hello..."));
        assert!(!text.contains("world"));
    }

    #[tokio::test]
    async fn empty_collection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/docs/points/scroll"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result":{"points":[]}})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut cap = Captured::new([]);
        run(&mut cap.ctx(&client), "docs", 100).await.unwrap();
        assert!(cap.text().contains("No points found."));
    }

    #[tokio::test]
    async fn failure_reports_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such collection"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut cap = Captured::new([]);
        let err = run(&mut cap.ctx(&client), "nope", 100).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.starts_with("Failed to fetch data"));
        assert!(msg.contains("no such collection"));
    }

    #[tokio::test]
    async fn json_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/docs/points/scroll"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"points": [
                    {"id": 1, "payload": {"source":"s","text":""}},
                    {"id": 2, "payload": {"source":"s","text":"t"}}
                ]}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut cap = Captured::json();
        run(&mut cap.ctx(&client), "docs", 100).await.unwrap();

        let v = cap.json_value();
        assert_eq!(v["points"], 2);
        assert_eq!(
            v["documents"],
            json!([{"doc_id":"s","chunks":2,"sample":"(no text)"}])
        );
    }
}
