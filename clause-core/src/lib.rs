//! # clause-core
//!
//! The contract template engine: a rich-text document model, the `{{identifier}}` placeholder
//! language, the tiered pricing calculator and the render engine that turns a document plus a
//! preview context into either an editable surface or a client preview.
//!
//! File Layout
//!
//!     src
//!     ├── model       Document tree, marks, JSON conversion, structural validation, editing
//!     ├── grammar.rs  Token syntax and the closed token families
//!     ├── pricing.rs  Bracket selection, quote arithmetic, legacy price labels
//!     ├── render      Render modes, preview context, capture slots, output tree
//!     └── error.rs    Error types shared by the modules above
//!
//! This crate is pure: no I/O, no global mutable state. Every render pass owns its counters, so two
//! previews of the same document never interfere. Reading stored content in older formats is the
//! job of `clause-babel`, which builds on the types defined here.

pub mod error;
pub mod grammar;
pub mod model;
pub mod pricing;
pub mod render;

pub use error::{CaptureError, EditError, PricingError, StructureError};
pub use grammar::{list_families, tag_for, Family, Token};
pub use model::{
    validate, Attrs, Block, BlockKind, Document, EditPosition, Mark, MarkKind, Marks, Node, Text,
};
pub use pricing::{bracket_key_for, PricingTierTable, Quote, TierKey};
pub use render::{
    CaptureKey, CaptureSlotMap, CapturedValue, DemoIdentity, FieldType, Installment,
    PreviewContext, RenderMode, RenderNode, RenderOutput, Renderer,
};
