//! Turns the engine's block sequence into the Notion block JSON wire format.
//!
//! This is the output boundary: failed uploads become a visible callout
//! placeholder here rather than disappearing.

use serde_json::{Map, Value, json};
use vaultport_engine::{Block, TextRun, Upload};

/// Maximum characters Notion accepts in one rich-text element.
const MAX_TEXT_LEN: usize = 2000;

pub fn render_blocks(blocks: &[Block]) -> Vec<Value> {
    blocks.iter().map(render_block).collect()
}

fn render_block(block: &Block) -> Value {
    match block {
        Block::Heading { level, runs } => wrapped(&format!("heading_{level}"), runs),
        Block::Paragraph { runs } => wrapped("paragraph", runs),
        Block::Bullet { runs } => wrapped("bulleted_list_item", runs),
        Block::Numbered { runs } => wrapped("numbered_list_item", runs),
        Block::Quote { runs } => wrapped("quote", runs),
        Block::Todo { checked, runs } => json!({
            "object": "block",
            "type": "to_do",
            "to_do": { "rich_text": rich_text(runs), "checked": checked },
        }),
        Block::Divider => json!({
            "object": "block",
            "type": "divider",
            "divider": {},
        }),
        Block::Code { language, content } => json!({
            "object": "block",
            "type": "code",
            "code": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": truncate(content) },
                }],
                "language": normalize_language(language),
            },
        }),
        Block::Attachment { kind, name, upload } => match upload {
            Upload::Uploaded(file_ref) => tagged(
                kind.as_str(),
                json!({
                    "type": "file_upload",
                    "file_upload": { "id": file_ref.as_str() },
                }),
            ),
            Upload::Failed(_) => callout(&format!("📎 Attachment: {name} (upload failed)")),
        },
    }
}

fn wrapped(key: &str, runs: &[TextRun]) -> Value {
    tagged(key, json!({ "rich_text": rich_text(runs) }))
}

/// A `{"object": "block", "type": key, key: payload}` envelope. The payload
/// key mirrors the type tag, hence the map-building detour.
fn tagged(key: &str, payload: Value) -> Value {
    let mut out = Map::new();
    out.insert("object".into(), Value::String("block".into()));
    out.insert("type".into(), Value::String(key.to_string()));
    out.insert(key.to_string(), payload);
    Value::Object(out)
}

fn callout(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "callout",
        "callout": {
            "rich_text": [{ "type": "text", "text": { "content": text } }],
            "icon": { "type": "emoji", "emoji": "📎" },
            "color": "gray_background",
        },
    })
}

fn rich_text(runs: &[TextRun]) -> Vec<Value> {
    runs.iter().map(render_run).collect()
}

fn render_run(run: &TextRun) -> Value {
    let mut text = Map::new();
    text.insert("content".into(), Value::String(run.content.clone()));
    if let Some(link) = &run.link {
        text.insert("link".into(), json!({ "url": link }));
    }

    let mut out = Map::new();
    out.insert("type".into(), Value::String("text".into()));
    out.insert("text".into(), Value::Object(text));

    // only set annotations actually in effect, as the API defaults the rest
    let mut annotations = Map::new();
    if run.bold {
        annotations.insert("bold".into(), Value::Bool(true));
    }
    if run.italic {
        annotations.insert("italic".into(), Value::Bool(true));
    }
    if run.code {
        annotations.insert("code".into(), Value::Bool(true));
    }
    if !annotations.is_empty() {
        out.insert("annotations".into(), Value::Object(annotations));
    }

    Value::Object(out)
}

/// Maps common fence aliases onto Notion's language names.
fn normalize_language(language: &str) -> String {
    let lower = language.to_lowercase();
    match lower.as_str() {
        "js" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "rb" => "ruby",
        "yml" => "yaml",
        "sh" | "bash" | "zsh" => "shell",
        "" => "plain text",
        other => other,
    }
    .to_string()
}

fn truncate(content: &str) -> String {
    content.chars().take(MAX_TEXT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vaultport_engine::{AttachmentKind, FileRef};

    #[test]
    fn paragraph_with_annotations_and_link() {
        let runs = vec![
            TextRun {
                content: "bold".into(),
                bold: true,
                ..TextRun::default()
            },
            TextRun::linked("site", "https://example.com"),
        ];
        let v = render_block(&Block::Paragraph { runs });
        assert_eq!(v["type"], "paragraph");
        let rt = v["paragraph"]["rich_text"].as_array().unwrap();
        assert_eq!(rt[0]["annotations"]["bold"], true);
        assert!(rt[0]["annotations"].get("italic").is_none());
        assert_eq!(rt[1]["text"]["link"]["url"], "https://example.com");
        assert!(rt[1].get("annotations").is_none());
    }

    #[test]
    fn heading_uses_level_suffixed_type() {
        let v = render_block(&Block::Heading {
            level: 2,
            runs: vec![TextRun::plain("t")],
        });
        assert_eq!(v["type"], "heading_2");
        assert_eq!(v["heading_2"]["rich_text"][0]["text"]["content"], "t");
    }

    #[test]
    fn code_language_is_normalized() {
        let v = render_block(&Block::Code {
            language: "py".into(),
            content: "x = 1".into(),
        });
        assert_eq!(v["code"]["language"], "python");
        assert_eq!(v["code"]["rich_text"][0]["text"]["content"], "x = 1");
    }

    #[test]
    fn uploaded_attachment_renders_typed_file_block() {
        let v = render_block(&Block::Attachment {
            kind: AttachmentKind::Pdf,
            name: "paper.pdf".into(),
            upload: Upload::Uploaded(FileRef::new("fid")),
        });
        assert_eq!(v["type"], "pdf");
        assert_eq!(v["pdf"]["file_upload"]["id"], "fid");
    }

    #[test]
    fn failed_attachment_renders_visible_placeholder() {
        let v = render_block(&Block::Attachment {
            kind: AttachmentKind::File,
            name: "notes.docx".into(),
            upload: Upload::Failed("api error".into()),
        });
        assert_eq!(v["type"], "callout");
        assert_eq!(
            v["callout"]["rich_text"][0]["text"]["content"],
            "📎 Attachment: notes.docx (upload failed)"
        );
    }

    #[test]
    fn todo_carries_checked_flag() {
        let v = render_block(&Block::Todo {
            checked: true,
            runs: vec![TextRun::plain("done")],
        });
        assert_eq!(v["to_do"]["checked"], true);
    }
}
