//! Pushed Message Dispatch
//!
//! Routes `data`, `snapshot` and `notify` items to the handlers registered
//! for their service and to the broadcast feed.
//!
//! # Delivery
//!
//! ```text
//! item {service, command, timestamp, content: [e1, e2]}
//!   │  service lookup (bare heartbeats become HEARTBEAT)
//!   ▼
//! relabel e1 ──► handler A(copy), handler B(copy), feed
//! relabel e2 ──► handler A(copy), handler B(copy), feed
//! ```
//!
//! Entries are delivered in frame order and handlers run in registration
//! order. Each handler receives its own copy, so one handler's mutation is
//! never seen by another. Relabeling is skipped entirely when nothing would
//! consume the result.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tokio::sync::broadcast;

use super::messages::{StreamMessage, is_heartbeat};
use crate::domain::service::Service;
use crate::infrastructure::metrics::{self, DropReason};

// =============================================================================
// Handlers
// =============================================================================

/// Boxed future returned by asynchronous handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A message callback.
///
/// Asynchronous handlers are awaited before the next delivery starts.
pub enum Handler {
    /// Runs to completion inline.
    Sync(Box<dyn FnMut(StreamMessage) + Send>),
    /// Returns a future that is awaited.
    Async(Box<dyn FnMut(StreamMessage) -> HandlerFuture + Send>),
}

impl Handler {
    /// Wrap a synchronous callback.
    pub fn sync<F>(f: F) -> Self
    where
        F: FnMut(StreamMessage) + Send + 'static,
    {
        Self::Sync(Box::new(f))
    }

    /// Wrap an asynchronous callback.
    pub fn asynchronous<F, Fut>(mut f: F) -> Self
    where
        F: FnMut(StreamMessage) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Async(Box::new(move |msg| Box::pin(f(msg))))
    }

    async fn call(&mut self, msg: StreamMessage) {
        match self {
            Self::Sync(f) => f(msg),
            Self::Async(f) => f(msg).await,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Handler::Sync"),
            Self::Async(_) => f.write_str("Handler::Async"),
        }
    }
}

/// Identifies a registered handler for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Handlers per service, in registration order.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    next_id: u64,
    handlers: HashMap<Service, Vec<(HandlerId, Handler)>>,
}

impl HandlerRegistry {
    /// Register `handler` for `service`.
    pub fn add(&mut self, service: Service, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(service).or_default().push((id, handler));
        id
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn remove(&mut self, id: HandlerId) -> bool {
        for handlers in self.handlers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(h, _)| *h == id) {
                handlers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Number of handlers registered for `service`.
    #[must_use]
    pub fn count(&self, service: Service) -> usize {
        self.handlers.get(&service).map_or(0, Vec::len)
    }

    async fn deliver(&mut self, msg: &StreamMessage) -> usize {
        let Some(handlers) = self.handlers.get_mut(&msg.service) else {
            return 0;
        };
        for (_, handler) in handlers.iter_mut() {
            handler.call(msg.clone()).await;
        }
        handlers.len()
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Delivers pushed items to handlers and the broadcast feed.
#[derive(Debug)]
pub struct Dispatcher {
    handlers: HandlerRegistry,
    feed: broadcast::Sender<StreamMessage>,
}

impl Dispatcher {
    /// Create a dispatcher whose feed buffers `capacity` messages per receiver.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (feed, _) = broadcast::channel(capacity.max(1));
        Self {
            handlers: HandlerRegistry::default(),
            feed,
        }
    }

    /// Registered handlers.
    pub const fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    /// New receiver on the broadcast feed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StreamMessage> {
        self.feed.subscribe()
    }

    /// Dispatch one pushed item. Returns the number of handler invocations.
    pub async fn dispatch(&mut self, mut item: Value) -> usize {
        let service = if is_heartbeat(&item) {
            Service::Heartbeat
        } else {
            match item.get("service").and_then(Value::as_str) {
                Some(name) => match name.parse::<Service>() {
                    Ok(service) => service,
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping item for unknown service");
                        metrics::record_item_dropped(DropReason::UnknownService);
                        return 0;
                    }
                },
                None => {
                    tracing::warn!(item = %item, "Skipping item without a service");
                    metrics::record_item_dropped(DropReason::MissingService);
                    return 0;
                }
            }
        };

        let descriptor = service.descriptor();
        if !descriptor.dispatchable {
            tracing::trace!(service = %service, "Ignoring non-dispatchable item");
            metrics::record_item_dropped(DropReason::NotDispatchable);
            return 0;
        }

        let has_receivers = self.feed.receiver_count() > 0;
        if self.handlers.count(service) == 0 && !has_receivers {
            tracing::debug!(service = %service, "No handlers registered, dropping item");
            metrics::record_item_dropped(DropReason::NoConsumers);
            return 0;
        }

        let command = item
            .get("command")
            .and_then(Value::as_str)
            .map(str::to_string);
        let timestamp = item.get("timestamp").and_then(Value::as_i64);

        let entries = if let Some(Value::Array(entries)) = item.get_mut("content") {
            std::mem::take(entries)
        } else {
            vec![item]
        };

        let mut invocations = 0;
        for mut entry in entries {
            descriptor.relabel(&mut entry);
            let msg = StreamMessage {
                service,
                command: command.clone(),
                timestamp,
                content: entry,
            };

            let delivered = self.handlers.deliver(&msg).await;
            metrics::record_deliveries(service, delivered as u64);
            invocations += delivered;

            if has_receivers {
                // Receivers may have gone away since the check above.
                let _ = self.feed.send(msg);
            }
        }

        invocations
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use serde_json::json;

    fn recorder(log: &Arc<Mutex<Vec<StreamMessage>>>) -> Handler {
        let log = Arc::clone(log);
        Handler::sync(move |msg| log.lock().unwrap().push(msg))
    }

    fn quote_item() -> Value {
        json!({
            "service": "QUOTE",
            "timestamp": 1_590_186_642_440_i64,
            "command": "SUBS",
            "content": [
                {"key": "GOOG", "1": 100.5, "2": 100.7},
                {"key": "MSFT", "1": 180.1, "2": 180.2}
            ]
        })
    }

    #[tokio::test]
    async fn two_handlers_two_entries_four_invocations() {
        let mut dispatcher = Dispatcher::new(16);
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        dispatcher.handlers_mut().add(Service::Quote, recorder(&first));
        dispatcher.handlers_mut().add(Service::Quote, recorder(&second));

        assert_eq!(dispatcher.dispatch(quote_item()).await, 4);

        for log in [&first, &second] {
            let log = log.lock().unwrap();
            let keys: Vec<_> = log.iter().filter_map(StreamMessage::key).collect();
            assert_eq!(keys, vec!["GOOG", "MSFT"]);
            assert_eq!(log[0].field("BID_PRICE"), Some(&json!(100.5)));
            assert_eq!(log[0].command.as_deref(), Some("SUBS"));
        }
    }

    #[tokio::test]
    async fn handler_mutation_is_not_shared() {
        let mut dispatcher = Dispatcher::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));
        dispatcher.handlers_mut().add(
            Service::Quote,
            Handler::sync(|mut msg| {
                msg.content["BID_PRICE"] = json!("mutated");
            }),
        );
        dispatcher.handlers_mut().add(Service::Quote, recorder(&seen));

        dispatcher.dispatch(quote_item()).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].field("BID_PRICE"), Some(&json!(100.5)));
    }

    #[tokio::test]
    async fn handlers_run_in_registration_order() {
        let mut dispatcher = Dispatcher::new(16);
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let order = Arc::clone(&order);
            dispatcher
                .handlers_mut()
                .add(Service::Quote, Handler::sync(move |_| order.lock().unwrap().push(tag)));
        }

        dispatcher.dispatch(quote_item()).await;

        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c", "a", "b", "c"]);
    }

    #[tokio::test]
    async fn async_handlers_are_awaited() {
        let mut dispatcher = Dispatcher::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.handlers_mut().add(
            Service::Quote,
            Handler::asynchronous(move |msg| {
                let sink = Arc::clone(&sink);
                async move {
                    tokio::task::yield_now().await;
                    sink.lock().unwrap().push(msg);
                }
            }),
        );

        assert_eq!(dispatcher.dispatch(quote_item()).await, 2);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn heartbeat_reaches_no_handler() {
        let mut dispatcher = Dispatcher::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));
        dispatcher.handlers_mut().add(Service::Quote, recorder(&seen));
        let mut feed = dispatcher.subscribe();

        assert_eq!(dispatcher.dispatch(json!({"heartbeat": "1591499624412"})).await, 0);
        assert!(seen.lock().unwrap().is_empty());
        assert!(feed.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_service_is_skipped() {
        let mut dispatcher = Dispatcher::new(16);
        let mut feed = dispatcher.subscribe();
        let item = json!({"service": "NOT_A_SERVICE", "content": [{"key": "X"}]});
        assert_eq!(dispatcher.dispatch(item).await, 0);
        assert!(feed.try_recv().is_err());
    }

    #[tokio::test]
    async fn removed_handler_is_not_called() {
        let mut dispatcher = Dispatcher::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let id = dispatcher.handlers_mut().add(Service::Quote, recorder(&seen));

        assert!(dispatcher.handlers_mut().remove(id));
        assert!(!dispatcher.handlers_mut().remove(id));
        assert_eq!(dispatcher.dispatch(quote_item()).await, 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn feed_receives_relabeled_entries() {
        let mut dispatcher = Dispatcher::new(16);
        let mut feed = dispatcher.subscribe();

        assert_eq!(dispatcher.dispatch(quote_item()).await, 0);

        let first = feed.try_recv().unwrap();
        assert_eq!(first.service, Service::Quote);
        assert_eq!(first.field("ASK_PRICE"), Some(&json!(100.7)));
        assert_eq!(feed.try_recv().unwrap().key(), Some("MSFT"));
    }

    #[tokio::test]
    async fn item_without_content_list_is_delivered_whole() {
        let mut dispatcher = Dispatcher::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));
        dispatcher.handlers_mut().add(Service::Admin, recorder(&seen));

        let item = json!({
            "service": "ADMIN",
            "command": "LOGOUT",
            "content": {"code": 30, "msg": "Stop streaming"}
        });
        assert_eq!(dispatcher.dispatch(item).await, 1);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].content["content"]["code"], 30);
    }
}
