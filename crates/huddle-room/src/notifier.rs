//! User-visible notifications plus the UI event bus, shared by every component.

use std::sync::{Arc, Mutex};

use huddle_common::{Event, EventBus, Notification, NotificationQueue};

#[derive(Clone)]
pub struct Notifier {
    bus: EventBus,
    queue: Arc<Mutex<NotificationQueue>>,
}

impl Notifier {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            queue: Arc::new(Mutex::new(NotificationQueue::default())),
        }
    }

    pub fn notify(&self, notification: Notification) {
        let message = notification.message.clone();
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
        self.bus.publish(Event::Notification(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notification::error(message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(Notification::warning(message));
    }

    pub fn publish(&self, event: Event) {
        self.bus.publish(event);
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .visible()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_common::NotificationLevel;

    #[tokio::test]
    async fn error_is_queued_and_published() {
        let notifier = Notifier::default();
        let mut rx = notifier.bus().subscribe();

        notifier.error("room is full");

        let visible = notifier.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].level, NotificationLevel::Error);
        assert!(matches!(rx.recv().await.unwrap(), Event::Notification(ref m) if m == "room is full"));
    }

    #[test]
    fn clones_share_the_queue() {
        let notifier = Notifier::default();
        notifier.clone().warning("presence connection lost");
        assert_eq!(notifier.visible().len(), 1);
    }
}
