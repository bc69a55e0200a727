use super::enums::ActionKind;
use super::forest::TaskForest;
use super::timeline::TimelineLog;
use std::collections::VecDeque;

/// Default number of undo steps kept
pub const DEFAULT_UNDO_DEPTH: usize = 50;

/// Snapshot of both stores taken right before an action
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub action: ActionKind,
    pub previous_tasks: TaskForest,
    pub previous_timeline: TimelineLog,
}

/// Bounded LIFO of snapshots; the oldest entry is evicted when full
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<UndoEntry>,
    depth: usize,
}

impl UndoStack {
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            entries: VecDeque::with_capacity(depth),
            depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot the stores. Call before mutating them.
    ///
    /// Returns the oldest entry when the push pushed it out, so a caller
    /// that rolls back can hand it to `restore_oldest`.
    pub fn push(
        &mut self,
        action: ActionKind,
        tasks: &TaskForest,
        timeline: &TimelineLog,
    ) -> Option<UndoEntry> {
        self.entries.push_back(UndoEntry {
            action,
            previous_tasks: tasks.clone(),
            previous_timeline: timeline.clone(),
        });
        if self.entries.len() <= self.depth {
            return None;
        }
        let evicted = self.entries.pop_front()?;
        tracing::debug!("undo stack full, dropped oldest {}", evicted.action.name());
        Some(evicted)
    }

    /// Put an evicted entry back at the bottom of the stack
    pub fn restore_oldest(&mut self, entry: UndoEntry) {
        if self.entries.len() < self.depth {
            self.entries.push_front(entry);
        }
    }

    /// Most recent snapshot, removed from the stack
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    /// Snapshot the next `pop` would return
    pub fn last(&self) -> Option<&UndoEntry> {
        self.entries.back()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}
