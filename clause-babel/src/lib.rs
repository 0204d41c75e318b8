//! Format interoperability and storage adapters for clause templates
//!
//!     This crate sits between stored template records and the engine in `clause-core`. It reads
//!     template bodies in every shape they were ever persisted in, converts documents to and from
//!     external formats, and wraps an editing session around a record.
//!
//!     Like the core crate it is a pure lib: no code here assumes a shell, prints, or reads the
//!     environment. The CLI in `clause-cli` is the only consumer that does.
//!
//! Architecture
//!
//!     - Format trait: uniform interface for all formats (parsing and/or serialization)
//!     - FormatRegistry: discovery and selection of formats by name
//!     - LegacyNormalizer: total conversion of stored content into a canonical document
//!     - TemplateRecord / RecordStore: the persisted template row and where it lives
//!     - EditorSession: one open template with its preview context and captured values
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── normalize.rs            # Legacy content cascade
//!     ├── record.rs               # Template records and stores
//!     ├── session.rs              # Editor session
//!     ├── formats
//!     │   ├── json                # Canonical document JSON
//!     │   ├── html                # Markup import (vendor class cleanup, DOM walk) and export
//!     │   ├── delta               # Editor operation-log import
//!     │   └── tag                 # XML-like debug tree
//!     └── lib.rs
//!
//! Testing
//!
//!     tests
//!     ├── normalize.rs
//!     ├── session.rs
//!     └── fixtures
//!         └── <name>.<json|html>
//!
//! Stored Content
//!
//!     Template bodies were saved by several generations of editors: canonical document trees,
//!     JSON strings holding those trees, operation logs with and without an HTML rendering, and
//!     bare HTML carrying editor-specific class names. Normalization never fails. When nothing
//!     better can be recovered the raw content is shown as one paragraph, so a template is always
//!     openable and the author can repair it by hand.

pub mod error;
pub mod format;
pub mod formats;
pub mod normalize;
pub mod record;
pub mod registry;
pub mod session;

pub use error::{FormatError, StoreError};
pub use format::Format;
pub use normalize::{normalize, LegacyNormalizer, Normalized, NormalizationPath};
pub use record::{MemoryStore, RecordStore, TemplateRecord};
pub use registry::FormatRegistry;
pub use session::EditorSession;
