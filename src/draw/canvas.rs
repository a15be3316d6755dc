//! Document plus undo history.

use super::document::{Document, Entry, ShapeId};
use super::history::{Command, CommandStack};
use super::shape::Shape;
use log::debug;

/// The annotation canvas shared by every monitor.
///
/// All mutations go through here so each one lands on the undo stack. Empty
/// undo/redo stacks, unknown ids and clearing an empty canvas are quiet
/// no-ops that report `false`.
#[derive(Debug, Default)]
pub struct Canvas {
    document: Document,
    history: CommandStack,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    /// Adds a shape on top of the paint order.
    pub fn append(&mut self, shape: Shape) -> ShapeId {
        let id = self.document.allocate_id();
        debug!("Appending {} {} on {}", shape.kind.name(), id, shape.monitor);
        self.history
            .execute(Command::Append { id, shape }, &mut self.document);
        id
    }

    pub fn remove(&mut self, id: ShapeId) -> bool {
        let Some(index) = self.document.position(id) else {
            return false;
        };
        let Entry { shape, .. } = self.document.entries()[index].clone();
        self.history
            .execute(Command::Remove { index, id, shape }, &mut self.document);
        true
    }

    /// Swaps the shape with `id` for `shape`, keeping its id and position.
    pub fn replace(&mut self, id: ShapeId, shape: Shape) -> bool {
        let Some(index) = self.document.position(id) else {
            return false;
        };
        let before = self.document.entries()[index].shape.clone();
        if before == shape {
            return false;
        }
        self.history.execute(
            Command::Replace {
                index,
                id,
                before,
                after: shape,
            },
            &mut self.document,
        );
        true
    }

    /// Removes every shape as a single undoable step.
    pub fn clear(&mut self) -> bool {
        if self.document.is_empty() {
            return false;
        }
        self.history.execute(
            Command::Clear {
                entries: Vec::new(),
            },
            &mut self.document,
        );
        true
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.document)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.document)
    }
}
