// Bounded LIFO of undo batches
use crate::domain::undo::{UndoAction, UndoBatch};
use serde_json::Value;
use std::collections::VecDeque;

pub const DEFAULT_UNDO_STACK_SIZE: usize = 8;

#[derive(Debug)]
pub struct UndoStack {
    batches: VecDeque<UndoBatch>,
    capacity: usize,
}

impl UndoStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            batches: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes a batch, evicting the oldest once the bound is exceeded.
    pub fn push(&mut self, batch: UndoBatch) {
        self.batches.push_back(batch);
        while self.batches.len() > self.capacity {
            self.batches.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<UndoBatch> {
        self.batches.pop_back()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_STACK_SIZE)
    }
}

/// Flattens the `undoActions` of one response (or an array of responses) into a batch.
pub fn collect_undo_actions(response: &Value) -> UndoBatch {
    let rows: Vec<&Value> = match response {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![response],
        _ => Vec::new(),
    };

    let mut actions = Vec::new();
    for row in rows {
        tracing::trace!("checkForUndoActions(): {}", row);
        let Some(list) = row.get("undoActions").and_then(Value::as_array) else {
            continue;
        };
        for entry in list {
            match serde_json::from_value::<UndoAction>(entry.clone()) {
                Ok(action) => actions.push(action),
                Err(e) => tracing::warn!("Ignoring malformed undo action {}: {}", entry, e),
            }
        }
    }
    UndoBatch::new(actions)
}
