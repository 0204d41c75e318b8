//! Error types for the template engine
//!
//! Only explicit validation, editing and capture write-back can fail. Rendering and
//! normalization degrade instead of erroring.

use std::fmt;

/// Violations found by [`validate`](crate::model::validate).
///
/// Paths are written the way the tree is addressed in JSON, e.g. `content[0].content[2]`. The
/// root is the empty path.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureError {
    /// A node (or the root) is not a JSON object
    NotAnObject { path: String },
    /// A node has no string `type` discriminant
    MissingType { path: String },
    /// The root `type` is not `doc`
    NotADocument { found: Option<String> },
    /// `content` exists but is not an array
    ContentNotSequence { path: String },
    /// A container block has no `content` array
    MissingContent { path: String, kind: String },
    /// A text node whose `text` is absent or not a string
    TextNotString { path: String },
    /// A text node that carries its own `content`
    TextHasContent { path: String },
    /// `marks` is not an array of objects with a string `type`
    MalformedMarks { path: String },
    /// A heading whose level is outside 1..=6
    InvalidHeadingLevel { path: String, level: String },
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::NotAnObject { path } => {
                write!(f, "Node at '{}' is not an object", display_path(path))
            }
            StructureError::MissingType { path } => {
                write!(f, "Node at '{}' has no string 'type'", display_path(path))
            }
            StructureError::NotADocument { found } => match found {
                Some(kind) => write!(f, "Root type is '{}', expected 'doc'", kind),
                None => write!(f, "Root has no type, expected 'doc'"),
            },
            StructureError::ContentNotSequence { path } => {
                write!(f, "'content' at '{}' is not a sequence", display_path(path))
            }
            StructureError::MissingContent { path, kind } => write!(
                f,
                "Block '{}' at '{}' has no content sequence",
                kind,
                display_path(path)
            ),
            StructureError::TextNotString { path } => {
                write!(f, "Text node at '{}' has a non-string payload", display_path(path))
            }
            StructureError::TextHasContent { path } => {
                write!(f, "Text node at '{}' carries a content sequence", display_path(path))
            }
            StructureError::MalformedMarks { path } => {
                write!(f, "Marks at '{}' are malformed", display_path(path))
            }
            StructureError::InvalidHeadingLevel { path, level } => write!(
                f,
                "Heading at '{}' has level {}, expected 1 to 6",
                display_path(path),
                level
            ),
        }
    }
}

impl std::error::Error for StructureError {}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Errors raised while building a pricing tier table
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Unit prices must be finite and non-negative
    InvalidPrice { key: String, price: f64 },
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidPrice { key, price } => write!(
                f,
                "Invalid unit price {} for bracket '{}': prices must be finite and non-negative",
                price, key
            ),
        }
    }
}

impl std::error::Error for PricingError {}

/// Errors raised by in-place document edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The path does not address a node in the document
    InvalidPath(Vec<usize>),
    /// The addressed node cannot hold the edit (e.g. text inside a horizontal rule)
    NotEditable(Vec<usize>),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::InvalidPath(path) => write!(f, "No node at path {:?}", path),
            EditError::NotEditable(path) => write!(f, "Node at path {:?} cannot be edited", path),
        }
    }
}

impl std::error::Error for EditError {}

/// Errors raised when writing values into a capture slot map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The key string is not of the form `<field>_<index>`
    MalformedKey(String),
    /// A text value was written to a signature slot or vice versa
    KindMismatch { key: String },
    /// The key was not bound by the latest render pass
    UnboundKey(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::MalformedKey(key) => write!(f, "Malformed capture key '{}'", key),
            CaptureError::KindMismatch { key } => {
                write!(f, "Value kind does not match the field type of '{}'", key)
            }
            CaptureError::UnboundKey(key) => {
                write!(f, "No field is bound to '{}' in the current preview", key)
            }
        }
    }
}

impl std::error::Error for CaptureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_named() {
        let err = StructureError::NotAnObject {
            path: String::new(),
        };
        assert_eq!(err.to_string(), "Node at '<root>' is not an object");
    }

    #[test]
    fn test_missing_content_names_kind_and_path() {
        let err = StructureError::MissingContent {
            path: "content[1]".to_string(),
            kind: "bulletList".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Block 'bulletList' at 'content[1]' has no content sequence"
        );
    }
}
