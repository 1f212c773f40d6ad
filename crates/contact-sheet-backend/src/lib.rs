//! Contact Sheet Backend
//!
//! The authoritative side of deferred selection:
//! - [`SelectionRegistry`]: per-node active/pending selections and preview cache
//! - [`handle_selection_update`]: validation of selection uploads from the widget
//! - [`ContactSheetNode`]: a pipeline run that forwards the selected images and
//!   emits the payload the widget renders
//!
//! # Example
//!
//! ```rust,ignore
//! use contact_sheet_backend::{ContactSheetNode, ImageBatch, SelectionRegistry};
//!
//! let registry = Arc::new(SelectionRegistry::new());
//! let node = ContactSheetNode::new(registry.clone(), previews, &SheetConfig::new());
//!
//! let output = node.execute(Some("12"), &batch, 0);
//! // later, from the HTTP route
//! let (status, body) = selection_update_reply(&registry, request_body);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod handler;
pub mod node;
pub mod registry;

pub use error::{BackendError, RequestError};
pub use handler::{handle_selection_update, selection_update_reply};
pub use node::{ContactSheetNode, ImageBatch, NodeOutput, PreviewSource, FALLBACK_NODE_ID};
pub use registry::{sanitize_selection, CachedPreview, NodeSelectionState, SelectionRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
