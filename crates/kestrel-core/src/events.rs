//! Shell event bus
//!
//! Views subscribe when they are created and drop their subscription on
//! teardown; the shell publishes an event for every persisted mutation so
//! open dialogs can refresh without polling the store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

/// A change the shell persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ShellEvent {
    SettingChanged { item: String, value: String },
    SearchEnginesChanged,
    PermissionRuleChanged { permission: String },
    HistoryCleared { table: String },
}

/// Handle returned by `subscribe`; pass it back to `unsubscribe` when the
/// observing view goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Callback = Arc<dyn Fn(&ShellEvent) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<u64, Callback>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ShellEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().insert(id, Arc::new(callback));
        Subscription(id)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.subscribers.write().remove(&subscription.0);
    }

    /// Dispatch `event` to every current subscriber. The subscriber list is
    /// snapshotted before dispatch so a callback may subscribe or
    /// unsubscribe (itself included) without holding the lock re-entrantly;
    /// such changes take effect from the next publish.
    pub fn publish(&self, event: ShellEvent) {
        let callbacks: Vec<Callback> = {
            let subscribers = self.subscribers.read();
            subscribers.values().map(Arc::clone).collect()
        };
        tracing::debug!(?event, count = callbacks.len(), "publishing event");
        for callback in callbacks {
            callback(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_subscribers_receive_events() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_a = Arc::clone(&seen);
        let _a = bus.subscribe(move |_| {
            seen_a.fetch_add(1, Ordering::SeqCst);
        });
        let seen_b = Arc::clone(&seen);
        let _b = bus.subscribe(move |_| {
            seen_b.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(ShellEvent::SearchEnginesChanged);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribed_callbacks_stop_firing() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_cb = Arc::clone(&seen);
        let subscription = bus.subscribe(move |_| {
            seen_cb.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(ShellEvent::HistoryCleared {
            table: "visits".to_string(),
        });
        bus.unsubscribe(subscription);
        bus.publish(ShellEvent::HistoryCleared {
            table: "visits".to_string(),
        });

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_from_inside_callback() {
        // A view tearing itself down in reaction to an event must not
        // deadlock the dispatching thread.
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let slot: Arc<RwLock<Option<Subscription>>> = Arc::new(RwLock::new(None));

        let bus_cb = Arc::clone(&bus);
        let seen_cb = Arc::clone(&seen);
        let slot_cb = Arc::clone(&slot);
        let subscription = bus.subscribe(move |_| {
            seen_cb.fetch_add(1, Ordering::SeqCst);
            if let Some(subscription) = slot_cb.read().as_ref() {
                bus_cb.unsubscribe(*subscription);
            }
        });
        *slot.write() = Some(subscription);

        bus.publish(ShellEvent::SearchEnginesChanged);
        bus.publish(ShellEvent::SearchEnginesChanged);

        // Fired once, then removed itself.
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_from_inside_callback_takes_effect_next_publish() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let bus_cb = Arc::clone(&bus);
        let seen_cb = Arc::clone(&seen);
        let _sub = bus.subscribe(move |_| {
            let seen_inner = Arc::clone(&seen_cb);
            bus_cb.subscribe(move |_| {
                seen_inner.fetch_add(1, Ordering::SeqCst);
            });
        });

        bus.publish(ShellEvent::SearchEnginesChanged);
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        bus.publish(ShellEvent::SearchEnginesChanged);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_events_carry_payload() {
        let bus = EventBus::new();
        let last: Arc<RwLock<Option<ShellEvent>>> = Arc::new(RwLock::new(None));

        let last_cb = Arc::clone(&last);
        let _sub = bus.subscribe(move |event| {
            *last_cb.write() = Some(event.clone());
        });

        bus.publish(ShellEvent::SettingChanged {
            item: "https_mode".to_string(),
            value: "0".to_string(),
        });

        assert_eq!(
            last.read().clone(),
            Some(ShellEvent::SettingChanged {
                item: "https_mode".to_string(),
                value: "0".to_string(),
            })
        );
    }
}
