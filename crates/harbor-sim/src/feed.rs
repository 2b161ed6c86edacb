//! Bounded, newest-first notification feed.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use harbor_core::types::NotificationItem;
use tracing::debug;

/// Notification feed holding at most `capacity` items, newest first.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    items: VecDeque<NotificationItem>,
    capacity: usize,
}

impl NotificationFeed {
    /// Create an empty feed. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Prepend a batch, keeping the batch's internal order, then drop the
    /// oldest items beyond capacity. An empty batch leaves the feed as is.
    pub fn publish(&mut self, batch: Vec<NotificationItem>) {
        if batch.is_empty() {
            return;
        }
        for item in batch.into_iter().rev() {
            self.items.push_front(item);
        }
        if self.items.len() > self.capacity {
            let dropped = self.items.len() - self.capacity;
            self.items.truncate(self.capacity);
            debug!(dropped, "notification feed truncated");
        }
    }

    /// Remove an item by id. Returns false when no such item exists.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Remove items created more than `ttl` before `now`. Returns the number removed.
    pub fn expire(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return 0;
        };
        let before = self.items.len();
        self.items.retain(|item| now - item.created_at < ttl);
        before - self.items.len()
    }

    /// Items, newest first.
    pub fn items(&self) -> Vec<NotificationItem> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationItem> {
        self.items.iter()
    }
}
