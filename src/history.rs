use std::collections::VecDeque;

use tiny_skia::Pixmap;

use crate::drawable::DrawableType;
use crate::effects::Effects;

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 15;

/// A full point-in-time capture of the session for undo/redo.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Deep copies; never contains the crop overlay.
    pub drawables: Vec<DrawableType>,
    /// Canvas pixels, which also carry the canvas dimensions.
    pub pixels: Pixmap,
    pub effects: Effects,
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Bounded undo/redo stacks of [`Snapshot`]s.
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, limit: usize) {
    stack.push_back(snapshot);
    while stack.len() > limit {
        stack.pop_front();
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(limit + 1),
            redo_stack: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Records the state before a mutation. Evicts the oldest entry past the
    /// limit and invalidates redo.
    pub fn push(&mut self, snapshot: Snapshot) {
        push_bounded(&mut self.undo_stack, snapshot, self.limit);
        self.redo_stack.clear();
        log::debug!(
            "History push: {} undo, {} redo",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
    }

    /// Pops the most recent snapshot, parking `current` on the redo stack.
    /// `current` is only evaluated when there is something to undo.
    pub fn undo(&mut self, current: impl FnOnce() -> Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        push_bounded(&mut self.redo_stack, current(), self.limit);
        Some(previous)
    }

    /// Mirror of [`History::undo`].
    pub fn redo(&mut self, current: impl FnOnce() -> Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop_back()?;
        push_bounded(&mut self.undo_stack, current(), self.limit);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
