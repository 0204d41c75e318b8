//! Render engine
//!
//!     Rendering walks a [`Document`](crate::model::Document) depth-first in document order and
//!     produces a [`RenderOutput`]: a tree of [`RenderNode`]s plus the capture keys bound during
//!     the pass.
//!
//!     Two modes:
//!
//!     - Author: placeholders stay literal, marks are applied, nothing is substituted. The output
//!       is an editing surface.
//!     - Preview: every Identity, Pricing, PaymentSchedule and TierPricing token is substituted
//!       from a [`PreviewContext`]; then each `{{text}}` and `{{signature}}` occurrence becomes a
//!       [`RenderNode::Field`] bound to `<type>_<n>`, numbered per type in document order.
//!
//!     Per text leaf in preview mode:
//!
//!         payload ─► legacy tier labels ─► token substitution ─► field binding ─► mark wrapping
//!
//!     The engine never reads captured values. Callers create a [`CaptureSlotMap`] from the
//!     output, write into it as the user fills fields, and carry entered values over to the next
//!     pass with [`CaptureSlotMap::carry_over`].

mod capture;
mod context;
mod engine;
mod output;

pub use capture::{CaptureKey, CaptureSlotMap, CapturedValue, FieldType};
pub use context::{DemoIdentity, Installment, PreviewContext};
pub use engine::{RenderMode, Renderer};
pub use output::{RenderNode, RenderOutput};
