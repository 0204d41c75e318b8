//! Rendered output tree

use super::capture::CaptureKey;
use crate::model::{Attrs, BlockKind, MarkKind};
use serde::Serialize;

/// A node of the renderable surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum RenderNode {
    Block {
        kind: BlockKind,
        #[serde(skip_serializing_if = "Attrs::is_empty")]
        attrs: Attrs,
        children: Vec<RenderNode>,
    },
    Text {
        text: String,
    },
    /// A mark wrapping its children; nested marks appear outer-to-inner
    Marked {
        mark: MarkKind,
        children: Vec<RenderNode>,
    },
    /// An interactive input stand-in bound to a capture slot
    Field {
        key: CaptureKey,
    },
    LineBreak,
    Rule,
}

impl RenderNode {
    pub fn text(text: impl Into<String>) -> Self {
        RenderNode::Text { text: text.into() }
    }

    fn write_plain(&self, out: &mut String) {
        match self {
            RenderNode::Text { text } => out.push_str(text),
            RenderNode::Field { key } => {
                out.push('[');
                out.push_str(&key.to_string());
                out.push(']');
            }
            RenderNode::LineBreak => out.push('\n'),
            RenderNode::Rule => out.push_str("---"),
            RenderNode::Marked { children, .. } => {
                for child in children {
                    child.write_plain(out);
                }
            }
            RenderNode::Block { kind, children, .. } => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 && kind.holds_blocks() {
                        out.push('\n');
                    }
                    child.write_plain(out);
                }
            }
        }
    }
}

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub nodes: Vec<RenderNode>,
    /// Keys bound during the pass, in document order
    pub capture_keys: Vec<CaptureKey>,
}

impl RenderOutput {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text rendering for logs and tests: top-level blocks on separate lines, fields as
    /// `[text_0]`, rules as `---`.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            node.write_plain(&mut out);
        }
        out
    }
}
