//! Error types for contact sheets
//!
//! Nothing here is fatal to the host. Every variant describes a degradation:
//! - Thumbnails that could not be loaded fall back to placeholders
//! - Persistence failures keep the optimistic local selection
//! - Host hook failures are logged and the mutation still happens
//! - Out-of-range indices are rejected without touching state

/// Main contact sheet error type
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// Index does not address an image of the current batch
    #[error("index {index} out of range for batch of {len}")]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Current batch length
        len: usize,
    },

    /// Thumbnail could not be loaded
    #[error("thumbnail load failed: {0}")]
    ThumbnailLoadFailure(#[from] ThumbnailError),

    /// Selection could not be persisted
    #[error("persistence failed: {0}")]
    PersistenceTransportFailure(#[from] PersistError),

    /// Host collaborator failed
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The owning widget was disposed before the operation finished
    #[error("widget disposed")]
    Disposed,
}

impl SheetError {
    /// Whether the failure leaves the sheet unusable (never, for this crate)
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        false
    }

    /// Check if retrying the same operation may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::PersistenceTransportFailure(e) => e.is_retryable(),
            Self::ThumbnailLoadFailure(ThumbnailError::Fetch { .. }) => true,
            _ => false,
        }
    }
}

/// Thumbnail loading errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThumbnailError {
    /// Image bytes could not be fetched
    #[error("fetch failed for {image}: {reason}")]
    Fetch {
        /// Image reference
        image: String,
        /// Loader message
        reason: String,
    },

    /// Image bytes could not be decoded
    #[error("decode failed for {image}: {reason}")]
    Decode {
        /// Image reference
        image: String,
        /// Decoder message
        reason: String,
    },
}

/// Persistence transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    /// Request never reached the backend or the connection dropped
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("backend returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Response body was not understood
    #[error("malformed response: {0}")]
    Decode(String),
}

impl PersistError {
    /// Check if the error is transient
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

/// Host collaborator errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// A before/after change hook failed
    #[error("{hook} hook failed: {reason}")]
    HookFailed {
        /// Hook name
        hook: &'static str,
        /// Host message
        reason: String,
    },
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A numeric field is negative or not finite
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f64,
    },
}
