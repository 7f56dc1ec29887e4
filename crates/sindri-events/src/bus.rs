//! Event Bus (spec §4.5): synchronous, in-process fan-out from `Event` kind
//! to subscribers. Grounded on the teacher's `TaskStore` broadcast-channel
//! subscribe/emit shape, collapsed from async `tokio::sync::broadcast` to
//! plain synchronous dispatch on the publisher's own thread, since the spec
//! requires delivery order to match publish order within a subscriber and
//! pushes any cross-thread fan-out (e.g. to a WebSocket) onto the
//! subscriber itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use sindri_domain::model::Event;

/// Wildcard key: subscribers registered under `subscribe_all` receive
/// every event regardless of kind.
const ALL: &str = "*";

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

struct Subscription {
    id: u64,
    handler: Handler,
}

/// A token returned by `subscribe`/`subscribe_all`; pass it to
/// `unsubscribe` to stop delivery.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    id: u64,
    key: String,
}

#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<String, Vec<Subscription>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one event kind (`Event::kind()`'s string form, e.g.
    /// `"task_complete"`).
    pub fn subscribe(
        &self,
        kind: impl Into<String>,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.register(kind.into(), handler)
    }

    /// Subscribe to every event kind.
    pub fn subscribe_all(
        &self,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.register(ALL.to_string(), handler)
    }

    fn register(
        &self,
        key: String,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .entry(key.clone())
            .or_default()
            .push(Subscription {
                id,
                handler: Arc::new(handler),
            });
        SubscriptionHandle { id, key }
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        if let Some(list) = self.subscribers.lock().get_mut(&handle.key) {
            list.retain(|s| s.id != handle.id);
        }
    }

    /// Invoke every subscriber registered for `event`'s kind, then every
    /// wildcard subscriber, in registration order within each group.
    pub fn publish(&self, event: Event) {
        let kind = event.kind();
        let subscribers = self.subscribers.lock();

        if let Some(list) = subscribers.get(kind) {
            for sub in list {
                (sub.handler)(&event);
            }
        }
        if kind != ALL {
            if let Some(list) = subscribers.get(ALL) {
                for sub in list {
                    (sub.handler)(&event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use uuid::Uuid;

    fn sample_event() -> Event {
        Event::TaskComplete {
            task_id: Uuid::nil(),
            result: "done".into(),
        }
    }

    #[test]
    fn subscriber_receives_matching_kind() {
        let bus = EventBus::new();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let r = received.clone();
        bus.subscribe("task_complete", move |e| {
            r.lock().unwrap().push(e.kind().to_string());
        });

        bus.publish(sample_event());
        assert_eq!(*received.lock().unwrap(), vec!["task_complete"]);
    }

    #[test]
    fn subscriber_does_not_receive_other_kinds() {
        let bus = EventBus::new();
        let received = Arc::new(StdMutex::new(0));
        let r = received.clone();
        bus.subscribe("task_failed", move |_| {
            *r.lock().unwrap() += 1;
        });

        bus.publish(sample_event());
        assert_eq!(*received.lock().unwrap(), 0);
    }

    #[test]
    fn wildcard_subscriber_receives_every_kind() {
        let bus = EventBus::new();
        let count = Arc::new(StdMutex::new(0));
        let c = count.clone();
        bus.subscribe_all(move |_| {
            *c.lock().unwrap() += 1;
        });

        bus.publish(sample_event());
        bus.publish(Event::TaskFailed {
            task_id: Uuid::nil(),
            reason: "oops".into(),
        });
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn delivery_order_matches_publish_order() {
        let bus = EventBus::new();
        let order = Arc::new(StdMutex::new(Vec::new()));
        let o1 = order.clone();
        bus.subscribe_all(move |e| {
            o1.lock().unwrap().push(e.kind().to_string());
        });

        bus.publish(Event::TaskCreated {
            task_id: Uuid::nil(),
            agent: "huginn".into(),
            parent_id: None,
        });
        bus.publish(sample_event());

        assert_eq!(*order.lock().unwrap(), vec!["task_created", "task_complete"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let count = Arc::new(StdMutex::new(0));
        let c = count.clone();
        let handle = bus.subscribe("task_complete", move |_| {
            *c.lock().unwrap() += 1;
        });

        bus.publish(sample_event());
        bus.unsubscribe(handle);
        bus.publish(sample_event());

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn multiple_subscribers_same_kind_all_invoked_in_order() {
        let bus = EventBus::new();
        let order = Arc::new(StdMutex::new(Vec::new()));
        let o1 = order.clone();
        let o2 = order.clone();
        bus.subscribe("task_complete", move |_| o1.lock().unwrap().push(1));
        bus.subscribe("task_complete", move |_| o2.lock().unwrap().push(2));

        bus.publish(sample_event());
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }
}
