//! Document model
//!
//!     A template body is a tree: a [`Document`] root holding block [`Node`]s, blocks holding
//!     blocks or [`Text`] leaves, and text leaves carrying an ordered set of [`Mark`]s. Placeholder
//!     tokens are not nodes; they live inside text payloads and are only interpreted at render
//!     time.
//!
//!     The stored form is TipTap/ProseMirror-style JSON:
//!
//!         {"type": "doc", "content": [
//!             {"type": "paragraph", "attrs": {"dir": "rtl"}, "content": [
//!                 {"type": "text", "text": "Dear {{client_name}}", "marks": [{"type": "bold"}]}
//!             ]}
//!         ]}
//!
//!     Attributes and keys this crate does not interpret are kept verbatim, so content written by
//!     a newer editor survives a load/save cycle here.

mod edit;
mod json;
mod marks;
mod node;

pub use edit::EditPosition;
pub use json::validate;
pub use marks::{Mark, MarkKind, Marks};
pub use node::{Attrs, Block, BlockKind, Document, Node, Text};
