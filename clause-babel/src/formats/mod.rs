//! Format implementations
//!
//! Each submodule converts between [`clause_core::Document`] and one external representation.

pub mod delta;
pub mod html;
pub mod json;
pub mod tag;

pub use delta::DeltaFormat;
pub use html::HtmlFormat;
pub use json::JsonFormat;
pub use tag::TagFormat;
