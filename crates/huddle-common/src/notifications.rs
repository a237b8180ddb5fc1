use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A transient message for the UI, e.g. a rejected join.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    /// Info notification, visible for 5 seconds.
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Info, message, Duration::from_secs(5))
    }

    /// Warning notification, visible for 8 seconds.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Warning, message, Duration::from_secs(8))
    }

    /// Error notification, visible for 10 seconds.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Error, message, Duration::from_secs(10))
    }

    fn with_level(level: NotificationLevel, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Bounded queue of notifications that drops expired entries on access.
#[derive(Debug)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes a notification. When full after eviction, the oldest entry goes.
    pub fn push(&mut self, notification: Notification) {
        self.evict_expired();
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(notification);
    }

    /// Non-expired notifications, oldest first.
    pub fn visible(&mut self) -> Vec<Notification> {
        self.evict_expired();
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn evict_expired(&mut self) {
        self.items.retain(|n| !n.is_expired());
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(16)
    }
}
