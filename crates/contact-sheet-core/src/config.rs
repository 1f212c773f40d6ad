//! Contact sheet configuration
//!
//! Passed explicitly at construction; there are no global flags.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Default persistence route
pub const DEFAULT_ENDPOINT: &str = "/contact-sheet-selector/selection";

/// Default host property key for the mirrored selection
pub const DEFAULT_PROPERTY_KEY: &str = "contact_sheet_selection";

/// Contact sheet configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Enable debug-level logging
    pub verbose_logging: bool,
    /// Widget height reported when the batch is empty
    pub min_height: f64,
    /// Inner padding of the grid area
    pub padding: f64,
    /// Spacing between tiles
    pub gap: f64,
    /// Floor of the plausibility envelope margin
    pub min_tolerance: f64,
    /// Width assumed before the host reports one
    pub default_width: f64,
    /// Persistence route
    pub endpoint: String,
    /// Host property key for the mirrored selection
    pub property_key: String,
    /// Upper bound for configured columns
    pub max_columns: u32,
}

impl SheetConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With verbose logging
    #[inline]
    #[must_use]
    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    /// With grid padding and gap
    #[inline]
    #[must_use]
    pub fn with_spacing(mut self, padding: f64, gap: f64) -> Self {
        self.padding = padding;
        self.gap = gap;
        self
    }

    /// With minimum height
    #[inline]
    #[must_use]
    pub fn with_min_height(mut self, min_height: f64) -> Self {
        self.min_height = min_height;
        self
    }

    /// With persistence endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Margin used to expand the tile bounding box when judging pointer candidates
    #[inline]
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.min_tolerance.max(self.padding + self.gap)
    }

    /// Validate geometry fields
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` for the first negative or non-finite field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("min_height", self.min_height),
            ("padding", self.padding),
            ("gap", self.gap),
            ("min_tolerance", self.min_tolerance),
            ("default_width", self.default_width),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            verbose_logging: false,
            min_height: 80.0,
            padding: 8.0,
            gap: 6.0,
            min_tolerance: 24.0,
            default_width: 256.0,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            property_key: DEFAULT_PROPERTY_KEY.to_string(),
            max_columns: 12,
        }
    }
}
