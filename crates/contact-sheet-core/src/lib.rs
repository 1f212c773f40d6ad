//! Contact Sheet Core
//!
//! The deferred-selection model behind a contact sheet widget:
//! - [`SelectionState`]: active (last run) and pending (next run) selections
//! - [`TileLayout`]: square-tile grid geometry
//! - [`PointerResolver`]: picks the right coordinate space for a pointer
//!   event and hit-tests it against the grid
//! - [`render`]: draw calls for the host canvas
//!
//! Asynchronous work (thumbnails, persistence) lives behind the traits in
//! [`collaborators`]; host integration behind the traits in [`host`].
//!
//! # Example
//!
//! ```rust,ignore
//! use contact_sheet_core::prelude::*;
//!
//! let config = SheetConfig::new();
//! let mut state = SelectionState::new(TargetId::new("12"));
//! state.on_batch_update(BatchUpdate::new(images).with_columns(2));
//!
//! let layout = TileLayout::compute(state.len(), state.columns(), 256.0, &config);
//! let resolver = PointerResolver::new(config.tolerance());
//! let outcome = resolver.handle(&PointerEvent::press(20.0, 20.0), &ctx, &layout);
//! if let PointerAction::Toggle(index) = outcome.action {
//!     let request = state.toggle(index)?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod collaborators;
pub mod config;
pub mod error;
pub mod host;
pub mod layout;
pub mod logging;
pub mod pointer;
pub mod render;
pub mod selection;
pub mod types;

pub use collaborators::{ImageLoader, SelectionBackend};
pub use config::SheetConfig;
pub use error::{ConfigError, HostError, PersistError, SheetError, ThumbnailError};
pub use host::{mirror_selection, Color, HostSignals, Painter, PropertyStore};
pub use layout::{column_count, Tile, TileLayout};
pub use pointer::{
    CandidateSource, DragSurface, HostContext, PointerAction, PointerCandidate, PointerEvent,
    PointerKind, PointerOutcome, PointerResolver, ResolvedPointer, Resolution, TransformProvider,
};
pub use render::{render, ThumbnailSet, ThumbnailStatus};
pub use selection::{sanitize, SelectionState, SheetPhase};
pub use types::{
    BatchGeneration, BatchUpdate, ImageRef, Point, Raster, Rect, SelectionUpdateRequest,
    SelectionUpdateResponse, TargetId,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with contact sheets
    pub use crate::{
        BatchUpdate, HostContext, ImageRef, PointerAction, PointerEvent, PointerResolver,
        SelectionState, SheetConfig, SheetError, TargetId, TileLayout,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
