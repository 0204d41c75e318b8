//! In-place edits issued by the editor: text/token insertion and mark toggling.
//!
//! Token insertion is a plain text insertion. Tags are never checked against the grammar here;
//! an unknown tag is legal content that simply renders verbatim.

use super::marks::MarkKind;
use super::node::{Block, BlockKind, Document, Node, Text};
use crate::error::EditError;
use crate::grammar;

/// Caret position: child indices from the document root down to a node, plus a character
/// offset inside that node.
///
/// When the path ends at a text leaf the offset counts chars in its payload (clamped to its
/// length). When it ends at a block, the offset is the child index to insert a new leaf at
/// (clamped to the child count).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditPosition {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl EditPosition {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }
}

impl Document {
    /// Insert `text` at `position`.
    pub fn insert_text(&mut self, position: &EditPosition, text: &str) -> Result<(), EditError> {
        let path = &position.path;
        let node = self
            .node_mut(path)
            .ok_or_else(|| EditError::InvalidPath(path.clone()))?;
        match node {
            Node::Text(leaf) => {
                let byte = leaf
                    .text
                    .char_indices()
                    .nth(position.offset)
                    .map(|(i, _)| i)
                    .unwrap_or(leaf.text.len());
                leaf.text.insert_str(byte, text);
                Ok(())
            }
            Node::Block(block) => {
                let children = block
                    .children_mut()
                    .ok_or_else(|| EditError::NotEditable(path.clone()))?;
                let at = position.offset.min(children.len());
                children.insert(at, Node::text(text));
                Ok(())
            }
        }
    }

    /// Insert the placeholder `{{tag}}` at `position`.
    pub fn insert_token(&mut self, position: &EditPosition, tag: &str) -> Result<(), EditError> {
        self.insert_text(position, &grammar::token(tag))
    }

    /// Append `text` at the end of the last top-level paragraph, creating one when the document
    /// is empty or ends with another block type.
    pub fn append_text(&mut self, text: &str) {
        let ends_with_paragraph = matches!(
            self.content.last(),
            Some(Node::Block(Block {
                kind: BlockKind::Paragraph,
                ..
            }))
        );
        if !ends_with_paragraph {
            self.content.push(Node::Block(Block::paragraph(Vec::new())));
        }
        let Some(Node::Block(paragraph)) = self.content.last_mut() else {
            return;
        };
        let Some(children) = paragraph.children_mut() else {
            return;
        };
        match children.last_mut() {
            Some(Node::Text(leaf)) if leaf.marks.is_empty() => leaf.text.push_str(text),
            _ => children.push(Node::text(text)),
        }
    }

    /// Append the placeholder `{{tag}}`; see [`Document::append_text`].
    pub fn append_token(&mut self, tag: &str) {
        self.append_text(&grammar::token(tag));
    }

    /// Flip `kind` on the text leaf at `path`. Returns whether the mark is now present.
    pub fn toggle_mark(&mut self, path: &[usize], kind: MarkKind) -> Result<bool, EditError> {
        match self.node_mut(path) {
            Some(Node::Text(Text { marks, .. })) => Ok(marks.toggle(kind)),
            Some(Node::Block(_)) => Err(EditError::NotEditable(path.to_vec())),
            None => Err(EditError::InvalidPath(path.to_vec())),
        }
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.content.get(*first)?;
        for index in rest {
            node = match node {
                Node::Block(block) => block.children().get(*index)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.content.get_mut(*first)?;
        for index in rest {
            node = match node {
                Node::Block(block) => block.content.as_mut()?.get_mut(*index)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::with_content(vec![Node::Block(Block::paragraph(vec![Node::text(
            "Dear , welcome",
        )]))])
    }

    #[test]
    fn test_insert_token_at_char_offset() {
        let mut doc = doc();
        doc.insert_token(&EditPosition::new(vec![0, 0], 5), "client_name")
            .expect("insert");
        assert_eq!(doc.plain_text(), "Dear {{client_name}}, welcome");
    }

    #[test]
    fn test_offset_is_clamped() {
        let mut doc = doc();
        doc.insert_text(&EditPosition::new(vec![0, 0], 999), "!")
            .expect("insert");
        assert_eq!(doc.plain_text(), "Dear , welcome!");
    }

    #[test]
    fn test_insert_into_block_adds_leaf() {
        let mut doc = Document::with_content(vec![Node::Block(Block::paragraph(vec![]))]);
        doc.insert_token(&EditPosition::new(vec![0], 0), "date")
            .expect("insert");
        assert_eq!(doc.plain_text(), "{{date}}");
    }

    #[test]
    fn test_unknown_tags_are_legal() {
        let mut doc = Document::new();
        doc.append_token("not_a_real_field");
        assert_eq!(doc.plain_text(), "{{not_a_real_field}}");
    }

    #[test]
    fn test_append_creates_paragraph_after_rule() {
        let mut doc = Document::with_content(vec![Node::Block(Block::horizontal_rule())]);
        doc.append_text("Signed: ");
        doc.append_token("signature");
        assert_eq!(doc.content.len(), 2);
        assert_eq!(doc.content[1].plain_text(), "Signed: {{signature}}");
    }

    #[test]
    fn test_invalid_paths() {
        let mut doc = Document::with_content(vec![Node::Block(Block::hard_break())]);
        assert_eq!(
            doc.insert_text(&EditPosition::new(vec![3], 0), "x"),
            Err(EditError::InvalidPath(vec![3]))
        );
        assert_eq!(
            doc.insert_text(&EditPosition::new(vec![0], 0), "x"),
            Err(EditError::NotEditable(vec![0]))
        );
    }

    #[test]
    fn test_toggle_mark() {
        let mut doc = doc();
        assert_eq!(doc.toggle_mark(&[0, 0], MarkKind::Bold), Ok(true));
        assert_eq!(doc.toggle_mark(&[0, 0], MarkKind::Bold), Ok(false));
        assert_eq!(
            doc.toggle_mark(&[0], MarkKind::Bold),
            Err(EditError::NotEditable(vec![0]))
        );
    }
}
