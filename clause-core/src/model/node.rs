//! Document, block and text nodes

use super::marks::Marks;
use serde::Serialize;
use serde_json::{Map, Value};

/// Opaque node attributes, passed through unchanged
pub type Attrs = Map<String, Value>;

/// Root of a template body.
///
/// An empty `content` is a blank template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub content: Vec<Node>,
    pub attrs: Attrs,
    /// Top-level keys other than `type`, `content` and `attrs`
    pub extra: Attrs,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: Vec<Node>) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// A document holding one paragraph with one unmarked text leaf.
    pub fn from_plain_text(text: impl Into<String>) -> Self {
        Self::with_content(vec![Node::Block(Block::paragraph(vec![Node::Text(
            Text::new(text),
        )]))])
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Text of every leaf in document order, one line per top-level block.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(Node::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Visit every text leaf in document order.
    pub fn for_each_text<F: FnMut(&Text)>(&self, mut f: F) {
        fn walk<F: FnMut(&Text)>(nodes: &[Node], f: &mut F) {
            for node in nodes {
                match node {
                    Node::Text(text) => f(text),
                    Node::Block(block) => walk(block.children(), f),
                }
            }
        }
        walk(&self.content, &mut f);
    }
}

/// One unit of document structure below the root
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Block(Block),
    Text(Text),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Text(_) => None,
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            Node::Text(text) => text.text.clone(),
            Node::Block(block) => match block.kind {
                BlockKind::HardBreak => "\n".to_string(),
                _ => {
                    let separator = if block.kind.holds_blocks() { "\n" } else { "" };
                    block
                        .children()
                        .iter()
                        .map(Node::plain_text)
                        .collect::<Vec<_>>()
                        .join(separator)
                }
            },
        }
    }
}

/// Block node types.
///
/// `Other` keeps types this crate does not know about so they survive serialization; they render
/// as their children, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Paragraph,
    /// Heading level, 1..=6
    Heading(u8),
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    HorizontalRule,
    HardBreak,
    Other(String),
}

impl BlockKind {
    /// Maps a stored `type` string. Headings start at level 1; the level attribute is read by
    /// the JSON layer.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "paragraph" => BlockKind::Paragraph,
            "heading" => BlockKind::Heading(1),
            "bulletList" => BlockKind::BulletList,
            "orderedList" => BlockKind::OrderedList,
            "listItem" => BlockKind::ListItem,
            "blockquote" => BlockKind::Blockquote,
            "horizontalRule" => BlockKind::HorizontalRule,
            "hardBreak" => BlockKind::HardBreak,
            other => BlockKind::Other(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading(_) => "heading",
            BlockKind::BulletList => "bulletList",
            BlockKind::OrderedList => "orderedList",
            BlockKind::ListItem => "listItem",
            BlockKind::Blockquote => "blockquote",
            BlockKind::HorizontalRule => "horizontalRule",
            BlockKind::HardBreak => "hardBreak",
            BlockKind::Other(name) => name,
        }
    }

    /// Leaves never carry a content sequence.
    pub fn is_leaf(&self) -> bool {
        matches!(self, BlockKind::HorizontalRule | BlockKind::HardBreak)
    }

    /// Known container kinds must carry a content sequence. `Other` may or may not.
    pub fn requires_content(&self) -> bool {
        !self.is_leaf() && !matches!(self, BlockKind::Other(_))
    }

    /// Kinds whose children are blocks rather than inline content.
    pub fn holds_blocks(&self) -> bool {
        matches!(
            self,
            BlockKind::BulletList
                | BlockKind::OrderedList
                | BlockKind::ListItem
                | BlockKind::Blockquote
        )
    }
}

/// A structural node: paragraph, heading, list, etc.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub attrs: Attrs,
    /// `None` for leaves and for unknown types stored without content
    pub content: Option<Vec<Node>>,
    pub extra: Attrs,
}

impl Block {
    pub fn new(kind: BlockKind, content: Vec<Node>) -> Self {
        let content = if kind.is_leaf() { None } else { Some(content) };
        Self {
            kind,
            attrs: Attrs::new(),
            content,
            extra: Attrs::new(),
        }
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Self::new(BlockKind::Paragraph, content)
    }

    pub fn heading(level: u8, content: Vec<Node>) -> Self {
        Self::new(BlockKind::Heading(level.clamp(1, 6)), content)
    }

    pub fn hard_break() -> Self {
        Self::new(BlockKind::HardBreak, Vec::new())
    }

    pub fn horizontal_rule() -> Self {
        Self::new(BlockKind::HorizontalRule, Vec::new())
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn children(&self) -> &[Node] {
        self.content.as_deref().unwrap_or(&[])
    }

    /// Mutable children; creates the sequence for container kinds that lack one.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        if self.kind.is_leaf() {
            return None;
        }
        Some(self.content.get_or_insert_with(Vec::new))
    }
}

/// A text leaf. The payload is opaque to the model and may embed placeholder tokens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub text: String,
    pub marks: Marks,
    pub extra: Attrs,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::new(),
            extra: Attrs::new(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
            extra: Attrs::new(),
        }
    }
}
