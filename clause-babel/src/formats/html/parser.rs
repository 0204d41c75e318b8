//! HTML import (markup → document)
//!
//! Pipeline: markup → html5ever → RcDom → document tree. The DOM walk keeps what the document
//! model can express and flattens everything else into its text.
//!
//! Element mapping:
//!
//! | HTML                          | Document                                  |
//! |-------------------------------|-------------------------------------------|
//! | `p`, `div` (inline content)   | paragraph                                 |
//! | `div`, `section`, ... (blocks)| children spliced into the parent          |
//! | `h1`-`h6`                     | heading with level                        |
//! | `ul` / `ol` / `li`            | bulletList / orderedList / listItem       |
//! | `blockquote`                  | blockquote                                |
//! | `pre`                         | paragraph, newlines become hard breaks    |
//! | `hr` / `br`                   | horizontalRule / hardBreak                |
//! | `strong` `b` `em` `i` `u` `s` `strike` `del` | bold, italic, underline, strike marks |
//!
//! `style`, `dir` and `class` attributes of block elements are kept as opaque attrs. Runs of
//! whitespace collapse to one space, and whitespace at block edges is trimmed.

use crate::error::FormatError;
use clause_core::{Attrs, Block, BlockKind, Document, Mark, MarkKind, Marks, Node, Text};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const KEPT_ATTRIBUTES: [&str; 3] = ["style", "dir", "class"];

/// Elements that start a block; anything else is inline
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figure", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Elements whose content is never document text
const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "title", "template", "img", "iframe"];

/// Parse an HTML fragment into a document.
///
/// Returns an error only when the markup has no body to walk, which html5ever never produces
/// for string input in practice.
pub fn parse_html(markup: &str) -> Result<Document, FormatError> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(markup);
    let body = find_element(&dom.document, "body")
        .ok_or_else(|| FormatError::ParseError("HTML has no body".to_string()))?;
    Ok(Document::with_content(block_children(&body)))
}

fn element_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if element_name(handle).as_deref() == Some(tag) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

fn contains_block(handle: &Handle) -> bool {
    handle.children.borrow().iter().any(|child| {
        element_name(child).is_some_and(|tag| is_block(&tag) || contains_block(child))
    })
}

fn block_attrs(handle: &Handle) -> Attrs {
    let mut out = Attrs::new();
    if let NodeData::Element { attrs, .. } = &handle.data {
        for attr in attrs.borrow().iter() {
            let name = attr.name.local.to_string();
            let value = attr.value.trim();
            if KEPT_ATTRIBUTES.contains(&name.as_str()) && !value.is_empty() {
                out.insert(name, value.into());
            }
        }
    }
    out
}

/// Walk the children of a container that holds blocks. Inline runs between blocks become
/// paragraphs.
fn block_children(handle: &Handle) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut run = Vec::new();
    for child in handle.children.borrow().iter() {
        match element_name(child) {
            Some(tag) if is_block(&tag) => {
                flush_run(&mut run, &mut blocks);
                blocks.extend(block_element(child, &tag));
            }
            _ => inline(child, &Marks::new(), &mut run),
        }
    }
    flush_run(&mut run, &mut blocks);
    blocks
}

fn flush_run(run: &mut Vec<Node>, blocks: &mut Vec<Node>) {
    let content = trim_inline(std::mem::take(run));
    if !content.is_empty() {
        blocks.push(Node::Block(Block::paragraph(content)));
    }
}

fn block_element(handle: &Handle, tag: &str) -> Vec<Node> {
    let attrs = block_attrs(handle);
    let with_attrs = |mut block: Block| {
        block.attrs = attrs.clone();
        Node::Block(block)
    };

    match tag {
        "p" => vec![with_attrs(Block::paragraph(inline_children(handle)))],
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<u8>().unwrap_or(1);
            vec![with_attrs(Block::heading(level, inline_children(handle)))]
        }
        "ul" | "ol" => {
            let kind = if tag == "ol" {
                BlockKind::OrderedList
            } else {
                BlockKind::BulletList
            };
            let items = list_items(handle);
            if items.is_empty() {
                Vec::new()
            } else {
                vec![with_attrs(Block::new(kind, items))]
            }
        }
        "blockquote" => {
            let content = block_children(handle);
            if content.is_empty() {
                Vec::new()
            } else {
                vec![with_attrs(Block::new(BlockKind::Blockquote, content))]
            }
        }
        "pre" => vec![with_attrs(Block::paragraph(preformatted(handle)))],
        "hr" => vec![Node::Block(Block::horizontal_rule())],
        _ if contains_block(handle) => block_children(handle),
        _ => {
            let content = inline_children(handle);
            if content.is_empty() {
                Vec::new()
            } else {
                vec![with_attrs(Block::paragraph(content))]
            }
        }
    }
}

fn list_items(handle: &Handle) -> Vec<Node> {
    let mut items = Vec::new();
    let mut stray = Vec::new();
    for child in handle.children.borrow().iter() {
        match element_name(child).as_deref() {
            Some("li") => {
                flush_item(&mut stray, &mut items);
                let mut content = block_children(child);
                if content.is_empty() {
                    content.push(Node::Block(Block::paragraph(Vec::new())));
                }
                let mut item = Block::new(BlockKind::ListItem, content);
                item.attrs = block_attrs(child);
                items.push(Node::Block(item));
            }
            Some(tag) if is_block(tag) => {
                flush_item(&mut stray, &mut items);
                let content = block_element(child, tag);
                if !content.is_empty() {
                    items.push(Node::Block(Block::new(BlockKind::ListItem, content)));
                }
            }
            _ => inline(child, &Marks::new(), &mut stray),
        }
    }
    flush_item(&mut stray, &mut items);
    items
}

fn flush_item(run: &mut Vec<Node>, items: &mut Vec<Node>) {
    let content = trim_inline(std::mem::take(run));
    if !content.is_empty() {
        items.push(Node::Block(Block::new(
            BlockKind::ListItem,
            vec![Node::Block(Block::paragraph(content))],
        )));
    }
}

fn inline_children(handle: &Handle) -> Vec<Node> {
    let mut run = Vec::new();
    for child in handle.children.borrow().iter() {
        inline(child, &Marks::new(), &mut run);
    }
    trim_inline(run)
}

fn mark_for(tag: &str) -> Option<MarkKind> {
    match tag {
        "strong" | "b" => Some(MarkKind::Bold),
        "em" | "i" => Some(MarkKind::Italic),
        "u" | "ins" => Some(MarkKind::Underline),
        "s" | "strike" | "del" => Some(MarkKind::Strike),
        _ => None,
    }
}

fn inline(handle: &Handle, marks: &Marks, run: &mut Vec<Node>) {
    match &handle.data {
        NodeData::Text { contents } => {
            let text = WHITESPACE.replace_all(&contents.borrow(), " ").into_owned();
            push_text(run, text, marks);
        }
        NodeData::Element { .. } => {
            let Some(tag) = element_name(handle) else {
                return;
            };
            if SKIPPED_TAGS.contains(&tag.as_str()) {
                return;
            }
            match tag.as_str() {
                "br" => run.push(Node::Block(Block::hard_break())),
                _ => {
                    let mut marks = marks.clone();
                    if let Some(kind) = mark_for(&tag) {
                        marks.insert(Mark::new(kind));
                    }
                    for child in handle.children.borrow().iter() {
                        inline(child, &marks, run);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Append text, merging with the previous text leaf when the marks match.
fn push_text(run: &mut Vec<Node>, text: String, marks: &Marks) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = run.last_mut() {
        if &last.marks == marks {
            if last.text.ends_with(' ') && text.starts_with(' ') {
                last.text.push_str(&text[1..]);
            } else {
                last.text.push_str(&text);
            }
            return;
        }
    }
    run.push(Node::Text(Text::with_marks(text, marks.clone())));
}

/// Trim whitespace at the edges of an inline run and around hard breaks. A run holding nothing
/// but hard breaks is blank.
fn trim_inline(mut run: Vec<Node>) -> Vec<Node> {
    for i in 0..run.len() {
        let after_break = i == 0 || run[i - 1].as_block().is_some();
        let before_break = i + 1 == run.len() || run[i + 1].as_block().is_some();
        if let Node::Text(text) = &mut run[i] {
            if after_break {
                text.text = text.text.trim_start().to_string();
            }
            if before_break {
                text.text = text.text.trim_end().to_string();
            }
        }
    }
    run.retain(|node| !matches!(node, Node::Text(text) if text.text.is_empty()));
    if run.iter().all(|node| node.as_text().is_none()) {
        run.clear();
    }
    run
}

/// Text of a `pre` element with newlines turned into hard breaks and spacing preserved.
fn preformatted(handle: &Handle) -> Vec<Node> {
    let mut raw = String::new();
    collect_text(handle, &mut raw);
    let raw = raw.strip_suffix('\n').unwrap_or(&raw);
    let mut content = Vec::new();
    for (i, line) in raw.split('\n').enumerate() {
        if i > 0 {
            content.push(Node::Block(Block::hard_break()));
        }
        if !line.is_empty() {
            content.push(Node::Text(Text::new(line)));
        }
    }
    content
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { .. } => {
            if element_name(handle).as_deref() == Some("br") {
                out.push('\n');
            }
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(markup: &str) -> Document {
        parse_html(markup).expect("body")
    }

    #[test]
    fn test_inline_marks() {
        let doc = parse("<p>Dear <strong>{{client_name}}</strong>, <em><u>welcome</u></em></p>");
        assert_eq!(
            doc.to_value(),
            json!({"type": "doc", "content": [{"type": "paragraph", "content": [
                {"type": "text", "text": "Dear "},
                {"type": "text", "text": "{{client_name}}", "marks": [{"type": "bold"}]},
                {"type": "text", "text": ", "},
                {"type": "text", "text": "welcome", "marks": [{"type": "italic"}, {"type": "underline"}]}
            ]}]})
        );
    }

    #[test]
    fn test_headings_and_lists() {
        let doc = parse("<h2>Terms</h2><ol><li>One</li><li><p>Two</p></li></ol>");
        assert_eq!(
            doc.to_value(),
            json!({"type": "doc", "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Terms"}]},
                {"type": "orderedList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "One"}]}]},
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Two"}]}]}
                ]}
            ]})
        );
    }

    #[test]
    fn test_block_attributes_are_kept() {
        let doc = parse(r#"<p style="text-align: center;" dir="rtl" data-x="1">Hello</p>"#);
        let block = doc.content[0].as_block().expect("paragraph");
        assert_eq!(block.attrs.get("style"), Some(&json!("text-align: center;")));
        assert_eq!(block.attrs.get("dir"), Some(&json!("rtl")));
        assert_eq!(block.attrs.get("data-x"), None);
    }

    #[test]
    fn test_breaks_rules_and_whitespace() {
        let doc = parse("<p>  Line   one<br>\n  line two </p><hr><p><br></p>");
        assert_eq!(
            doc.to_value(),
            json!({"type": "doc", "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Line one"},
                    {"type": "hardBreak"},
                    {"type": "text", "text": "line two"}
                ]},
                {"type": "horizontalRule"},
                {"type": "paragraph", "content": []}
            ]})
        );
    }

    #[test]
    fn test_wrapper_div_with_blocks_is_flattened() {
        let doc = parse("<div><p>A</p>loose <b>text</b><blockquote>Q</blockquote></div>");
        let kinds: Vec<&str> = doc
            .content
            .iter()
            .filter_map(|n| n.as_block())
            .map(|b| b.kind.type_name())
            .collect();
        assert_eq!(kinds, vec!["paragraph", "paragraph", "blockquote"]);
        assert_eq!(doc.plain_text(), "A\nloose text\nQ");
    }

    #[test]
    fn test_bare_text_becomes_paragraph() {
        assert_eq!(parse("Hello &amp; welcome").plain_text(), "Hello & welcome");
    }

    #[test]
    fn test_preformatted_keeps_lines() {
        let doc = parse("<pre>a  b\nc</pre>");
        let block = doc.content[0].as_block().expect("paragraph");
        assert_eq!(block.children().len(), 3);
        assert_eq!(block.children()[0].as_text().map(|t| t.text.as_str()), Some("a  b"));
    }

    #[test]
    fn test_scripts_are_dropped() {
        let doc = parse("<p>Visible<script>alert(1)</script></p>");
        assert_eq!(doc.plain_text(), "Visible");
    }

    #[test]
    fn test_empty_markup_is_empty_document() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
    }
}
