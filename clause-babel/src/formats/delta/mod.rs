//! Editor operation-log import
//!
//! Some stored bodies are operation logs from a line-oriented editor rather than trees:
//!
//! ```text
//! {"ops": [
//!   {"insert": "Terms"},
//!   {"insert": "\n", "attributes": {"header": 2}},
//!   {"insert": "Dear "},
//!   {"insert": "{{client_name}}", "attributes": {"bold": true}},
//!   {"insert": "\n", "attributes": {"align": "center"}}
//! ]}
//! ```
//!
//! Every `\n` ends a line, and the attributes of the op carrying it format the whole line.
//! Inline attributes on other inserts become marks. Embeds (non-string inserts) are skipped.
//!
//! | Line attribute       | Document                                   |
//! |----------------------|--------------------------------------------|
//! | `header: n`          | heading level n                            |
//! | `list: bullet`       | listItem in a bulletList                   |
//! | `list: ordered`      | listItem in an orderedList                 |
//! | `blockquote: true`   | paragraph in a blockquote                  |
//! | `align: x`           | `style: "text-align: x;"`                  |
//! | `direction: rtl`     | `dir: "rtl"`                               |
//!
//! Consecutive lines of the same list type or quote share one container.

use crate::error::FormatError;
use crate::format::Format;
use clause_core::{Attrs, Block, BlockKind, Document, Mark, MarkKind, Marks, Node, Text};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    None,
    BulletList,
    OrderedList,
    Blockquote,
}

struct Line {
    container: Container,
    block: Block,
}

/// The operations of a log, from an `{"ops": [...]}`/`{"delta": ...}` wrapper or a bare array.
pub fn operations(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(ops) if ops.iter().all(|op| op.get("insert").is_some()) => Some(ops),
        Value::Object(obj) => obj
            .get("ops")
            .and_then(Value::as_array)
            .or_else(|| obj.get("delta").and_then(operations)),
        _ => None,
    }
}

/// Convert operations to a document. Returns `None` when the log carries no text at all.
pub fn document_from_ops(ops: &[Value]) -> Option<Document> {
    let mut lines = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    let mut saw_text = false;

    for op in ops {
        let Some(insert) = op.get("insert").and_then(Value::as_str) else {
            continue;
        };
        let attributes = op.get("attributes").and_then(Value::as_object);
        let marks = attributes.map(inline_marks).unwrap_or_default();

        for (i, segment) in insert.split('\n').enumerate() {
            if i > 0 {
                let content = std::mem::take(&mut current);
                lines.push(line(content, attributes));
            }
            if !segment.is_empty() {
                saw_text |= !segment.trim().is_empty();
                push_text(&mut current, segment, &marks);
            }
        }
    }
    if !current.is_empty() {
        lines.push(line(current, None));
    }

    if !saw_text {
        return None;
    }
    Some(Document::with_content(group(lines)))
}

fn inline_marks(attributes: &Map<String, Value>) -> Marks {
    let mut marks = Marks::new();
    for (name, kind) in [
        ("bold", MarkKind::Bold),
        ("italic", MarkKind::Italic),
        ("underline", MarkKind::Underline),
        ("strike", MarkKind::Strike),
    ] {
        if attributes.get(name).and_then(Value::as_bool) == Some(true) {
            marks.insert(Mark::new(kind));
        }
    }
    marks
}

fn push_text(current: &mut Vec<Node>, segment: &str, marks: &Marks) {
    if let Some(Node::Text(last)) = current.last_mut() {
        if &last.marks == marks {
            last.text.push_str(segment);
            return;
        }
    }
    current.push(Node::Text(Text::with_marks(segment, marks.clone())));
}

fn line(content: Vec<Node>, attributes: Option<&Map<String, Value>>) -> Line {
    let Some(attributes) = attributes else {
        return Line {
            container: Container::None,
            block: Block::paragraph(content),
        };
    };

    let mut block = match attributes.get("header").and_then(Value::as_u64) {
        Some(level) if (1..=6).contains(&level) => Block::heading(level as u8, content),
        _ => Block::paragraph(content),
    };
    block.attrs = line_attrs(attributes);

    let container = match attributes.get("list").and_then(Value::as_str) {
        Some("ordered") => Container::OrderedList,
        Some(_) => Container::BulletList,
        None if attributes.get("blockquote").and_then(Value::as_bool) == Some(true) => {
            Container::Blockquote
        }
        None => Container::None,
    };
    Line { container, block }
}

fn line_attrs(attributes: &Map<String, Value>) -> Attrs {
    let mut attrs = Attrs::new();
    if let Some(align) = attributes.get("align").and_then(Value::as_str) {
        attrs.insert(
            "style".to_string(),
            Value::from(format!("text-align: {};", align)),
        );
    }
    if attributes.get("direction").and_then(Value::as_str) == Some("rtl") {
        attrs.insert("dir".to_string(), Value::from("rtl"));
    }
    attrs
}

fn group(lines: Vec<Line>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    let mut open: Option<(Container, Vec<Node>)> = None;

    for Line { container, block } in lines {
        if let Some((kind, _)) = &open {
            if *kind != container {
                if let Some((kind, children)) = open.take() {
                    out.push(close(kind, children));
                }
            }
        }
        match container {
            Container::None => out.push(Node::Block(block)),
            Container::BulletList | Container::OrderedList => {
                let item = Node::Block(Block::new(BlockKind::ListItem, vec![Node::Block(block)]));
                open.get_or_insert_with(|| (container, Vec::new())).1.push(item);
            }
            Container::Blockquote => {
                open.get_or_insert_with(|| (container, Vec::new()))
                    .1
                    .push(Node::Block(block));
            }
        }
    }
    if let Some((kind, children)) = open {
        out.push(close(kind, children));
    }
    out
}

fn close(container: Container, children: Vec<Node>) -> Node {
    let kind = match container {
        Container::OrderedList => BlockKind::OrderedList,
        Container::Blockquote => BlockKind::Blockquote,
        Container::BulletList | Container::None => BlockKind::BulletList,
    };
    Node::Block(Block::new(kind, children))
}

/// Format implementation for operation logs
pub struct DeltaFormat;

impl Format for DeltaFormat {
    fn name(&self) -> &str {
        "delta"
    }

    fn description(&self) -> &str {
        "Line-oriented editor operation log (import only)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["delta"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        let value: Value = serde_json::from_str(source)?;
        let ops = operations(&value).ok_or_else(|| {
            FormatError::ParseError("Expected an operation list under 'ops'".to_string())
        })?;
        Ok(document_from_ops(ops).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lines_and_inline_marks() {
        let ops = json!([
            {"insert": "Terms"},
            {"insert": "\n", "attributes": {"header": 2}},
            {"insert": "Dear "},
            {"insert": "{{client_name}}", "attributes": {"bold": true, "italic": true}},
            {"insert": "\n", "attributes": {"align": "center", "direction": "rtl"}}
        ]);
        let doc = document_from_ops(operations(&ops).unwrap()).unwrap();
        assert_eq!(
            doc.to_value(),
            json!({"type": "doc", "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Terms"}]},
                {"type": "paragraph", "attrs": {"style": "text-align: center;", "dir": "rtl"}, "content": [
                    {"type": "text", "text": "Dear "},
                    {"type": "text", "text": "{{client_name}}", "marks": [{"type": "bold"}, {"type": "italic"}]}
                ]}
            ]})
        );
    }

    #[test]
    fn test_list_lines_are_grouped() {
        let ops = json!({"ops": [
            {"insert": "One"},
            {"insert": "\n", "attributes": {"list": "ordered"}},
            {"insert": "Two"},
            {"insert": "\n", "attributes": {"list": "ordered"}},
            {"insert": "Bullet"},
            {"insert": "\n", "attributes": {"list": "bullet"}},
            {"insert": "After\n"}
        ]});
        let doc = document_from_ops(operations(&ops).unwrap()).unwrap();
        let kinds: Vec<&str> = doc
            .content
            .iter()
            .filter_map(|n| n.as_block())
            .map(|b| b.kind.type_name())
            .collect();
        assert_eq!(kinds, vec!["orderedList", "bulletList", "paragraph"]);
        assert_eq!(doc.content[0].as_block().unwrap().children().len(), 2);
    }

    #[test]
    fn test_multi_line_insert_and_trailing_text() {
        let ops = json!([{"insert": "a\n\nb"}]);
        let doc = document_from_ops(operations(&ops).unwrap()).unwrap();
        assert_eq!(doc.content.len(), 3);
        assert_eq!(doc.plain_text(), "a\n\nb");
    }

    #[test]
    fn test_embeds_only_yield_nothing() {
        let ops = json!([{"insert": {"image": "x.png"}}, {"insert": "\n"}]);
        assert!(document_from_ops(operations(&ops).unwrap()).is_none());
    }

    #[test]
    fn test_nested_delta_wrapper() {
        let value = json!({"delta": {"ops": [{"insert": "x\n"}]}, "html": "<p>x</p>"});
        assert_eq!(operations(&value).map(Vec::len), Some(1));
    }

    #[test]
    fn test_format_parse() {
        let doc = DeltaFormat.parse(r#"{"ops":[{"insert":"Hello\n"}]}"#).unwrap();
        assert_eq!(doc.plain_text(), "Hello");
        assert!(DeltaFormat.parse(r#"{"type":"doc"}"#).is_err());
    }
}
