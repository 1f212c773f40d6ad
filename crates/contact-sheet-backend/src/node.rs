//! Node execution
//!
//! A run forwards the selected images downstream and emits the UI payload
//! the widget consumes as a [`BatchUpdate`]. Encoded previews are cached per
//! node and reused while the batch signature stays the same.

use crate::error::BackendError;
use crate::registry::SelectionRegistry;
use contact_sheet_core::{BatchUpdate, ImageRef, SheetConfig};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Node id used when a run has no execution context
pub const FALLBACK_NODE_ID: &str = "ContactSheetSelector";

/// Samples hashed into the preview signature
const SIGNATURE_SAMPLES: usize = 4096;

/// Batch of images as `[batch, height, width, channels]` samples in `0.0..=1.0`
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    shape: [usize; 4],
    samples: Arc<[f32]>,
}

impl ImageBatch {
    /// Create a batch
    ///
    /// # Errors
    /// `BackendError::ShapeMismatch` when `samples` does not fill `shape`
    pub fn new(shape: [usize; 4], samples: impl Into<Arc<[f32]>>) -> Result<Self, BackendError> {
        let samples = samples.into();
        let expected = shape.iter().product::<usize>();
        if samples.len() != expected {
            return Err(BackendError::ShapeMismatch {
                shape,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self { shape, samples })
    }

    /// Number of images
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape[0]
    }

    /// Whether the batch holds no image
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `[batch, height, width, channels]`
    #[inline]
    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    /// Samples of one image
    #[must_use]
    pub fn image(&self, index: usize) -> Option<&[f32]> {
        if index >= self.len() {
            return None;
        }
        let stride = self.stride();
        self.samples.get(index * stride..(index + 1) * stride)
    }

    /// Batch holding only `indices`, in the given order
    ///
    /// Indices outside the batch are skipped.
    #[must_use]
    pub fn gather(&self, indices: &[usize]) -> Self {
        let picked: Vec<f32> = indices
            .iter()
            .filter_map(|&i| self.image(i))
            .flatten()
            .copied()
            .collect();
        let stride = self.stride();
        let count = if stride == 0 {
            indices.iter().filter(|&&i| i < self.len()).count()
        } else {
            picked.len() / stride
        };
        Self {
            shape: [count, self.shape[1], self.shape[2], self.shape[3]],
            samples: picked.into(),
        }
    }

    /// Signature used to decide whether cached previews still apply
    ///
    /// SHA-256 over the little-endian bytes of the first 4096 samples,
    /// prefixed by the shape and sample count.
    #[must_use]
    pub fn preview_signature(&self) -> String {
        let shape = self.shape;
        let sample_size = self.samples.len().min(SIGNATURE_SAMPLES);
        if sample_size == 0 {
            return format!("{shape:?}|empty");
        }
        let mut hasher = Sha256::new();
        for sample in &self.samples[..sample_size] {
            hasher.update(sample.to_le_bytes());
        }
        format!("{shape:?}|{sample_size}|{}", hex::encode(hasher.finalize()))
    }

    fn stride(&self) -> usize {
        self.shape[1] * self.shape[2] * self.shape[3]
    }
}

/// Encodes one image of a batch into a displayable reference (e.g. a data URL)
pub trait PreviewSource: Send + Sync {
    /// Encode image `index` of `batch`
    ///
    /// # Errors
    /// `BackendError::PreviewEncoding` when the image cannot be encoded
    fn encode(&self, batch: &ImageBatch, index: usize) -> Result<String, BackendError>;
}

/// Result of one run
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutput {
    /// Images forwarded downstream
    pub selected: ImageBatch,
    /// Payload for the widget
    pub ui: BatchUpdate,
}

impl NodeOutput {
    /// UI payload as the host emits it: `{ "contact_sheet": [payload] }`
    #[must_use]
    pub fn ui_payload(&self) -> Value {
        json!({ "contact_sheet": [self.ui] })
    }
}

/// The contact sheet pipeline node
pub struct ContactSheetNode {
    registry: Arc<SelectionRegistry>,
    previews: Arc<dyn PreviewSource>,
    max_columns: u32,
}

impl std::fmt::Debug for ContactSheetNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactSheetNode")
            .field("nodes", &self.registry.len())
            .field("max_columns", &self.max_columns)
            .finish_non_exhaustive()
    }
}

impl ContactSheetNode {
    /// Create a node backed by `registry`
    #[must_use]
    pub fn new(
        registry: Arc<SelectionRegistry>,
        previews: Arc<dyn PreviewSource>,
        config: &SheetConfig,
    ) -> Self {
        Self {
            registry,
            previews,
            max_columns: config.max_columns,
        }
    }

    /// Registry this node reads and writes
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<SelectionRegistry> {
        &self.registry
    }

    /// Run the node
    ///
    /// `node_id` comes from the execution context; without one every run
    /// shares [`FALLBACK_NODE_ID`].
    pub fn execute(&self, node_id: Option<&str>, images: &ImageBatch, columns: i64) -> NodeOutput {
        let batch_size = images.len();
        let columns = self.clamp_columns(columns);
        let node_id = resolve_node_id(node_id);

        let (output, next) = self.registry.resolve_selection_for_execution(node_id, batch_size);
        tracing::info!(
            node_id,
            batch_size,
            columns,
            output_selection = ?output,
            next_selection = ?next,
            "contact sheet execute"
        );
        if batch_size > 0 && output.is_empty() {
            tracing::warn!(node_id, "empty selection for non-empty batch");
        }

        let selected = images.gather(&output);
        let previews = self.previews_for(node_id, images);

        NodeOutput {
            selected,
            ui: BatchUpdate {
                images: previews.into_iter().map(ImageRef::new).collect(),
                selected_active: widen(&output),
                selected_next: Some(widen(&next)),
                columns,
                batch_size: Some(batch_size),
            },
        }
    }

    /// Cache key input for the host's execution cache
    ///
    /// `pending-or-active ++ [batch_size, columns]`, or `None` for a node
    /// that has never run or received a selection.
    #[must_use]
    pub fn fingerprint_inputs(
        &self,
        node_id: Option<&str>,
        columns: Option<i64>,
    ) -> Option<Vec<i64>> {
        let snapshot = self.registry.inspect_state(resolve_node_id(node_id))?;
        let selection = snapshot.pending.as_ref().unwrap_or(&snapshot.active);

        let mut fingerprint = widen(selection);
        fingerprint.push(i64::try_from(snapshot.last_batch_size).unwrap_or(i64::MAX));
        fingerprint.push(i64::from(columns.map_or(0, |c| self.clamp_columns(c))));
        Some(fingerprint)
    }

    fn previews_for(&self, node_id: &str, images: &ImageBatch) -> Vec<String> {
        let signature = images.preview_signature();
        if let Some(cached) = self.registry.preview_cache(node_id) {
            if cached.token.as_deref() == Some(signature.as_str()) {
                tracing::debug!(node_id, "reusing cached previews");
                return cached.data;
            }
        }

        let encoded: Result<Vec<String>, BackendError> = (0..images.len())
            .map(|index| self.previews.encode(images, index))
            .collect();
        match encoded {
            Ok(data) => {
                self.registry
                    .update_preview_cache(node_id, signature, data.clone());
                data
            }
            Err(e) => {
                tracing::error!(node_id, error = %e, "failed to encode preview images");
                Vec::new()
            }
        }
    }

    fn clamp_columns(&self, columns: i64) -> u32 {
        u32::try_from(columns.max(0))
            .unwrap_or(u32::MAX)
            .min(self.max_columns)
    }
}

fn resolve_node_id(node_id: Option<&str>) -> &str {
    node_id.unwrap_or_else(|| {
        tracing::warn!("executing without execution context; selections will be shared");
        FALLBACK_NODE_ID
    })
}

fn widen(indices: &[usize]) -> Vec<i64> {
    indices.iter().filter_map(|&i| i64::try_from(i).ok()).collect()
}
