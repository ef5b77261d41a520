//! Linear undo/redo over full scene snapshots.
//!
//! Full-tree snapshots are a deliberate simplicity/correctness trade-off
//! for a single-user, bounded-size document; depth is capped to keep memory
//! predictable.

use crate::scene::Scene;

/// Maximum number of undo snapshots to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// Snapshot-based history manager owning the committed scene.
#[derive(Debug, Clone, Default)]
pub struct History {
    current: Scene,
    undo_stack: Vec<Scene>,
    redo_stack: Vec<Scene>,
}

impl History {
    pub fn new(scene: Scene) -> Self {
        Self {
            current: scene,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// The committed scene.
    pub fn current(&self) -> &Scene {
        &self.current
    }

    /// Adopt `next` as the committed scene, pushing the previous one onto
    /// the undo stack and discarding any redo states.
    pub fn commit(&mut self, next: Scene) {
        let previous = std::mem::replace(&mut self.current, next);
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Restore the most recent snapshot. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, snapshot);
        self.redo_stack.push(current);
        true
    }

    /// Reapply the most recently undone state. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, snapshot);
        self.undo_stack.push(current);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
