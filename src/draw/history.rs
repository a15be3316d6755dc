//! Reversible document mutations and the undo/redo stacks.

use super::document::{Document, Entry, ShapeId};
use super::shape::Shape;
use log::debug;

/// One reversible change to a [`Document`].
///
/// Each variant holds enough state to apply itself again after being reverted.
/// Commands move between the undo and redo stacks; they are never cloned.
#[derive(Debug)]
pub enum Command {
    /// A shape appended on top of the paint order
    Append { id: ShapeId, shape: Shape },
    /// A shape removed from `index`
    Remove {
        index: usize,
        id: ShapeId,
        shape: Shape,
    },
    /// A shape swapped for a restyled copy, keeping id and position
    Replace {
        index: usize,
        id: ShapeId,
        before: Shape,
        after: Shape,
    },
    /// Every shape removed at once; holds them while applied
    Clear { entries: Vec<Entry> },
}

impl Command {
    pub fn apply(&mut self, doc: &mut Document) {
        match self {
            Command::Append { id, shape } => doc.push(Entry {
                id: *id,
                shape: shape.clone(),
            }),
            Command::Remove { index, .. } => {
                doc.remove_at(*index);
            }
            Command::Replace { index, after, .. } => {
                doc.set_shape(*index, after.clone());
            }
            Command::Clear { entries } => {
                *entries = doc.take_all();
            }
        }
    }

    pub fn revert(&mut self, doc: &mut Document) {
        match self {
            Command::Append { id, .. } => {
                if let Some(index) = doc.position(*id) {
                    doc.remove_at(index);
                }
            }
            Command::Remove { index, id, shape } => doc.insert(
                *index,
                Entry {
                    id: *id,
                    shape: shape.clone(),
                },
            ),
            Command::Replace { index, before, .. } => {
                doc.set_shape(*index, before.clone());
            }
            Command::Clear { entries } => doc.restore_all(std::mem::take(entries)),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Command::Append { .. } => "append",
            Command::Remove { .. } => "remove",
            Command::Replace { .. } => "replace",
            Command::Clear { .. } => "clear",
        }
    }
}

/// Undo and redo stacks.
#[derive(Debug, Default)]
pub struct CommandStack {
    undoable: Vec<Command>,
    redoable: Vec<Command>,
}

impl CommandStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `command` and records it. Any redo history is dropped.
    pub fn execute(&mut self, mut command: Command, doc: &mut Document) {
        command.apply(doc);
        debug!("Applied {} command", command.label());
        self.undoable.push(command);
        self.redoable.clear();
    }

    /// Reverts the most recent command. Returns false when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        let Some(mut command) = self.undoable.pop() else {
            return false;
        };
        command.revert(doc);
        debug!("Undid {} command", command.label());
        self.redoable.push(command);
        true
    }

    /// Re-applies the most recently undone command. Returns false when there is nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        let Some(mut command) = self.redoable.pop() else {
            return false;
        };
        command.apply(doc);
        debug!("Redid {} command", command.label());
        self.undoable.push(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undoable.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redoable.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undoable.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redoable.len()
    }
}
