//! Undo/redo history for the editable surface
//!
//! Bounded undo and redo stacks keyed on surface snapshots. A history is
//! created fresh every time the editable surface is (re)populated from
//! canonical Markdown and discarded when the surface leaves edit mode —
//! history never survives a preview/edit boundary or a regeneration.
//!
//! Recording happens at input granularity: once before every discrete
//! formatting command and once after every raw-input event. Snapshots are
//! compared by string equality; an unchanged snapshot records nothing.

use std::collections::VecDeque;

/// Default capacity of each stack; the oldest entry is silently evicted
/// when a push would exceed it.
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded undo/redo stacks over editable-surface snapshots.
#[derive(Debug, Clone)]
pub struct EditHistory {
    undo: VecDeque<String>,
    redo: VecDeque<String>,
    last_committed: String,
    capacity: usize,
}

impl EditHistory {
    /// Create a history whose baseline is the snapshot the surface was
    /// populated with.
    pub fn new(initial_snapshot: &str) -> Self {
        Self::with_capacity(initial_snapshot, DEFAULT_CAPACITY)
    }

    /// Create a history with an explicit stack capacity (minimum 1).
    pub fn with_capacity(initial_snapshot: &str, capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            last_committed: initial_snapshot.to_string(),
            capacity: capacity.max(1),
        }
    }

    /// Record a mutation if the snapshot differs from the last committed
    /// one: the previous snapshot moves onto the undo stack and the redo
    /// stack is invalidated. Returns whether anything was recorded.
    pub fn record_if_changed(&mut self, current_snapshot: &str) -> bool {
        if current_snapshot == self.last_committed {
            return false;
        }
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        let previous = std::mem::replace(&mut self.last_committed, current_snapshot.to_string());
        self.undo.push_back(previous);
        self.redo.clear();
        true
    }

    /// Undo one step. Takes the current live snapshot (which moves onto the
    /// redo stack) and returns the snapshot to restore, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self, live_snapshot: &str) -> Option<String> {
        let restored = self.undo.pop_back()?;
        if self.redo.len() == self.capacity {
            self.redo.pop_front();
        }
        self.redo.push_back(live_snapshot.to_string());
        self.last_committed = restored.clone();
        Some(restored)
    }

    /// Redo one step, symmetric to [`EditHistory::undo`].
    pub fn redo(&mut self, live_snapshot: &str) -> Option<String> {
        let restored = self.redo.pop_back()?;
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(live_snapshot.to_string());
        self.last_committed = restored.clone();
        Some(restored)
    }

    /// Whether an undo step is available (for toolbar state reflection).
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo entries currently held.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo entries currently held.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
