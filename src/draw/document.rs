//! Ordered shape storage.

use super::shape::Shape;
use crate::geometry::MonitorId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-unique shape identifier. Ids are handed out in increasing order and
/// never reused, even after the shape is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A committed shape together with its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: ShapeId,
    pub shape: Shape,
}

/// All committed shapes in paint order (first = bottom layer, last = top layer).
///
/// The document is mutated only through [`super::history::Command`]s so every
/// change can be undone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.shape)
    }

    pub fn position(&self, id: ShapeId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Shapes drawn on `monitor`, bottom to top.
    pub fn shapes_on<'a>(&'a self, monitor: &'a MonitorId) -> impl Iterator<Item = &'a Shape> + 'a {
        self.entries
            .iter()
            .map(|e| &e.shape)
            .filter(move |shape| &shape.monitor == monitor)
    }

    /// Topmost shape on `monitor` touched by the monitor-local point.
    pub fn topmost_at(&self, monitor: &MonitorId, x: i32, y: i32, tolerance: f64) -> Option<ShapeId> {
        self.entries
            .iter()
            .rev()
            .find(|e| &e.shape.monitor == monitor && e.shape.hit_test(x, y, tolerance))
            .map(|e| e.id)
    }

    pub(crate) fn allocate_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, index: usize, entry: Entry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<Entry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub(crate) fn set_shape(&mut self, index: usize, shape: Shape) -> Option<Shape> {
        let entry = self.entries.get_mut(index)?;
        Some(std::mem::replace(&mut entry.shape, shape))
    }

    pub(crate) fn take_all(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn restore_all(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
    }
}
