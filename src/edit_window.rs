use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::records::{OrderId, UnixTimeMs};
use crate::EDIT_WINDOW_MS;

// Per-order edit windows, persisted through the local store so a page
// reload keeps a running countdown. This is an advisory UI affordance,
// not a lock: a cleared client silently loses edit rights and the
// backend never checks the window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditWindows {
    starts: HashMap<OrderId, UnixTimeMs>,
}

impl EditWindows {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Last write wins: starting again resets the window.
    pub fn start(&mut self, order_id: OrderId, now_ms: u64) {
        self.starts.insert(order_id, UnixTimeMs(now_ms));
    }

    #[must_use]
    pub fn is_editable(&self, order_id: &OrderId, now_ms: u64) -> bool {
        match self.starts.get(order_id) {
            Some(started) => now_ms.saturating_sub(started.as_millis()) < EDIT_WINDOW_MS,
            None => false,
        }
    }

    #[must_use]
    pub fn remaining_seconds(&self, order_id: &OrderId, now_ms: u64) -> u64 {
        let Some(started) = self.starts.get(order_id) else {
            return 0;
        };
        let elapsed = now_ms.saturating_sub(started.as_millis());
        EDIT_WINDOW_MS.saturating_sub(elapsed) / 1000
    }

    pub fn clear(&mut self, order_id: &OrderId) {
        self.starts.remove(order_id);
    }

    #[must_use]
    pub fn started_at(&self, order_id: &OrderId) -> Option<UnixTimeMs> {
        self.starts.get(order_id).copied()
    }

    // Drops windows that can never become editable again. Called after
    // hydration so the persisted map does not grow without bound.
    pub fn prune_expired(&mut self, now_ms: u64) {
        self.starts
            .retain(|_, started| now_ms.saturating_sub(started.as_millis()) < EDIT_WINDOW_MS);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

#[must_use]
pub fn format_remaining(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{mins:02}:{secs:02}")
}
