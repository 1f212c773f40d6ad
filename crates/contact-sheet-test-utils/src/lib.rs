//! Testing utilities for the contact sheet workspace
//!
//! In-memory stand-ins for every collaborator, each recording what it saw.

#![allow(missing_docs)]

use async_trait::async_trait;
use contact_sheet_core::{
    BatchUpdate, Color, HostError, HostSignals, ImageLoader, ImageRef, PersistError, Painter,
    Point, PropertyStore, Raster, Rect, SelectionBackend, SelectionUpdateRequest,
    SelectionUpdateResponse, ThumbnailError,
};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn images(n: usize) -> Vec<ImageRef> {
    (0..n).map(|i| ImageRef::new(format!("img-{i}"))).collect()
}

pub fn batch(n: usize) -> BatchUpdate {
    BatchUpdate::new(images(n))
}

pub fn pixel() -> Raster {
    Raster::new(1, 1, vec![0, 0, 0, 255])
}

/// Loader that succeeds except for the configured images
#[derive(Debug, Default)]
pub struct StaticLoader {
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(images: &[&str]) -> Self {
        Self {
            failing: images.iter().map(|s| (*s).to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageLoader for StaticLoader {
    async fn load(&self, image: &ImageRef) -> Result<Raster, ThumbnailError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(image.as_str()) {
            return Err(ThumbnailError::Fetch {
                image: image.as_str().to_string(),
                reason: "not found".into(),
            });
        }
        Ok(pixel())
    }
}

/// How a [`RecordingBackend`] answers
#[derive(Debug, Clone)]
pub enum Reply {
    /// Echo the request back
    Echo,
    /// Answer without a selection
    Empty,
    /// Answer with this selection
    Sanitized(Vec<usize>),
    /// Fail with this error
    Fail(PersistError),
}

/// Backend that records requests and answers from a script
///
/// Scripted replies are consumed in order; once exhausted it falls back to
/// the default reply.
#[derive(Debug)]
pub struct RecordingBackend {
    requests: Mutex<Vec<SelectionUpdateRequest>>,
    script: Mutex<VecDeque<Reply>>,
    default: Reply,
}

impl RecordingBackend {
    pub fn echo() -> Self {
        Self::with_default(Reply::Echo)
    }

    pub fn with_default(default: Reply) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            default,
        }
    }

    pub fn then(self, reply: Reply) -> Self {
        self.script.lock().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<SelectionUpdateRequest> {
        self.requests.lock().clone()
    }

    pub fn last_selection(&self) -> Option<Vec<usize>> {
        self.requests.lock().last().map(|r| r.selection.clone())
    }
}

#[async_trait]
impl SelectionBackend for RecordingBackend {
    async fn update_selection(
        &self,
        request: SelectionUpdateRequest,
    ) -> Result<SelectionUpdateResponse, PersistError> {
        self.requests.lock().push(request.clone());
        let reply = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        match reply {
            Reply::Echo => Ok(SelectionUpdateResponse::sanitized(request.selection)),
            Reply::Empty => Ok(SelectionUpdateResponse::default()),
            Reply::Sanitized(selection) => Ok(SelectionUpdateResponse::sanitized(selection)),
            Reply::Fail(e) => Err(e),
        }
    }
}

/// Property bag that logs every hook and write
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    log: Arc<Mutex<Vec<String>>>,
    value: Arc<Mutex<Option<Vec<usize>>>>,
    fail_hooks: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose hooks always fail
    pub fn with_failing_hooks() -> Self {
        Self {
            fail_hooks: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn value(&self) -> Option<Vec<usize>> {
        self.value.lock().clone()
    }

    fn hook(&self, name: &'static str, key: &str) -> Result<(), HostError> {
        self.log.lock().push(format!("{name}:{key}"));
        if self.fail_hooks {
            return Err(HostError::HookFailed {
                hook: name,
                reason: "rejected".into(),
            });
        }
        Ok(())
    }
}

impl PropertyStore for MemoryStore {
    fn before_change(&mut self, key: &str) -> Result<(), HostError> {
        self.hook("before", key)
    }

    fn set_selection(&mut self, key: &str, selection: &[usize]) {
        self.log.lock().push(format!("set:{key}:{selection:?}"));
        *self.value.lock() = Some(selection.to_vec());
    }

    fn selection(&self, _key: &str) -> Option<Vec<usize>> {
        self.value()
    }

    fn after_change(&mut self, key: &str) -> Result<(), HostError> {
        self.hook("after", key)
    }
}

/// Counts redraw requests and remembers the last resize
#[derive(Debug, Default)]
pub struct CountingSignals {
    dirty: AtomicUsize,
    last_height: Mutex<Option<f64>>,
}

impl CountingSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn last_height(&self) -> Option<f64> {
        *self.last_height.lock()
    }
}

impl HostSignals for CountingSignals {
    fn mark_dirty(&self) {
        self.dirty.fetch_add(1, Ordering::SeqCst);
    }

    fn request_resize(&self, height: f64) {
        *self.last_height.lock() = Some(height);
    }
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Fill(Rect, Color),
    Stroke(Rect, Color),
    Text(Point, String),
    Blit(Rect),
}

/// Painter that records draw calls
#[derive(Debug, Default)]
pub struct RecordingPainter {
    pub calls: Vec<DrawCall>,
}

impl RecordingPainter {
    pub fn blits(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Blit(_)))
            .count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text(_, text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Painter for RecordingPainter {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::Fill(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, _line_width: f64) {
        self.calls.push(DrawCall::Stroke(rect, color));
    }

    fn text(&mut self, at: Point, text: &str, _color: Color) {
        self.calls.push(DrawCall::Text(at, text.to_string()));
    }

    fn blit(&mut self, rect: Rect, _raster: &Raster) {
        self.calls.push(DrawCall::Blit(rect));
    }
}
