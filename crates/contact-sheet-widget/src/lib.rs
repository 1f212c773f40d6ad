//! Contact Sheet Widget
//!
//! Host-facing widget around [`contact_sheet_core`]: owns the selection
//! state for one node, loads thumbnails and persists selection edits in the
//! background, and keeps the node's property mirror in sync.
//!
//! # Example
//!
//! ```rust,ignore
//! use contact_sheet_widget::{Collaborators, ContactSheetWidget, HttpSelectionBackend};
//!
//! let config = SheetConfig::new();
//! let backend = HttpSelectionBackend::new("http://127.0.0.1:8188", &config)?;
//! let widget = ContactSheetWidget::new(
//!     TargetId::new("12"),
//!     config,
//!     Collaborators { loader, backend: Arc::new(backend), signals, store },
//!     tokio::runtime::Handle::current(),
//! )?;
//!
//! widget.on_batch_update(update);
//! let outcome = widget.on_pointer_event(&PointerEvent::press(x, y), &ctx);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod http;
pub mod widget;

pub use http::HttpSelectionBackend;
pub use widget::{Collaborators, ContactSheetWidget, TaskHandle};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
