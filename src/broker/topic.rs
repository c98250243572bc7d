//! Generic in-process topic broker
//!
//! Each subscriber owns an unbounded queue, so a slow consumer never blocks
//! the publisher or its sibling subscribers. Messages published to a topic
//! without subscribers are dropped: there is no buffering and no replay.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use dashmap::DashMap;
use futures::Stream;
use tokio::sync::mpsc;

/// Identifier of a single subscriber within a broker
pub type SubscriberId = u64;

struct BrokerInner<T> {
    topics: DashMap<String, HashMap<SubscriberId, mpsc::UnboundedSender<T>>>,
    next_id: AtomicU64,
}

impl<T> BrokerInner<T> {
    fn remove(&self, topic: &str, id: SubscriberId) -> bool {
        let removed = match self.topics.get_mut(topic) {
            Some(mut subscribers) => subscribers.remove(&id).is_some(),
            None => return false,
        };
        // guard released above; remove_if re-locks the shard
        self.topics.remove_if(topic, |_, subscribers| subscribers.is_empty());
        if removed {
            tracing::trace!(topic, subscriber = id, "Subscriber removed");
        }
        removed
    }
}

/// Topic-keyed publish/subscribe hub. Cloning yields another handle to the
/// same registry.
pub struct TopicBroker<T> {
    inner: Arc<BrokerInner<T>>,
}

impl<T> Clone for TopicBroker<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for TopicBroker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TopicBroker<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                topics: DashMap::new(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a new consumer for `topic`. The returned stream yields every
    /// message published to the topic from now on and unsubscribes when dropped.
    pub fn subscribe(&self, topic: &str) -> Subscription<T> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .topics
            .entry(topic.to_string())
            .or_default()
            .insert(id, tx);
        tracing::trace!(topic, subscriber = id, "Subscriber added");

        Subscription {
            topic: topic.to_string(),
            id,
            rx,
            broker: Arc::downgrade(&self.inner),
        }
    }

    /// Detach a subscriber. Returns false if it was not attached.
    pub fn unsubscribe(&self, topic: &str, id: SubscriberId) -> bool {
        self.inner.remove(topic, id)
    }

    /// Number of subscribers currently attached to `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .topics
            .get(topic)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.inner.topics.len()
    }
}

impl<T: Clone> TopicBroker<T> {
    /// Deliver `message` to every subscriber of `topic` and return how many
    /// received it. Publishing to a topic nobody listens on is a no-op.
    pub fn publish(&self, topic: &str, message: T) -> usize {
        let delivered = {
            let Some(mut subscribers) = self.inner.topics.get_mut(topic) else {
                tracing::trace!(topic, "No subscribers, message dropped");
                return 0;
            };
            // receivers dropped without unsubscribing are pruned here
            subscribers.retain(|_, tx| tx.send(message.clone()).is_ok());
            subscribers.len()
        };

        if delivered == 0 {
            self.inner
                .topics
                .remove_if(topic, |_, subscribers| subscribers.is_empty());
        }
        tracing::trace!(topic, delivered, "Message published");
        delivered
    }
}

/// Lazy, infinite sequence of messages for one subscriber of one topic
pub struct Subscription<T> {
    topic: String,
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<T>,
    broker: Weak<BrokerInner<T>>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next published message. Returns `None` only once the
    /// broker itself is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Take an already-delivered message without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(broker) = self.broker.upgrade() {
            broker.remove(&self.topic, self.id);
        }
    }
}
