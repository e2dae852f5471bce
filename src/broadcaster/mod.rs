//! # Last-value broadcaster with bounded per-subscriber delivery.
//!
//! [`Broadcaster<T>`] remembers the most recently published value and hands
//! every published value to each current subscriber through its own
//! `mpsc` slot of capacity 1.
//!
//! ## Architecture
//! ```text
//! next(value)
//!     │  (consumers lock held for the whole fan-out)
//!     ├──► last = value
//!     ├──► [slot 0] ──► Receiver 0
//!     ├──► [slot 1] ──► Receiver 1
//!     └──► [slot N] ──► Receiver N
//! ```
//!
//! ## Rules
//! - **Blocking fan-out**: `next` awaits `send` on every slot while holding the
//!   lock. A subscriber that does not drain its slot stalls `next`, every other
//!   subscriber's delivery, and every `subscribe`/`unsubscribe` until it does.
//! - **No loss**: each subscriber sees every value published after it
//!   subscribed, in publication order.
//! - **No cross-subscriber ordering**: iteration order over subscribers is unspecified.
//! - **Last value**: [`value`](Broadcaster::value) never waits on the fan-out lock.
//! - **Dropped receivers** are pruned on the next publish instead of blocking it.

mod subscription;

pub use subscription::{SubscriberId, Subscription};

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{Mutex, mpsc};

/// Subscriber table guarded by the fan-out lock.
struct Consumers<T> {
    next_id: u64,
    slots: HashMap<SubscriberId, mpsc::Sender<T>>,
}

pub(crate) struct Inner<T> {
    consumers: Mutex<Consumers<T>>,
    last: RwLock<T>,
}

impl<T> Inner<T> {
    pub(crate) async fn remove(&self, id: SubscriberId) {
        let mut consumers = self.consumers.lock().await;
        if consumers.slots.remove(&id).is_some() {
            tracing::debug!(subscriber = %id, "broadcaster subscriber removed");
        }
    }
}

/// Generic single-writer/multi-reader value distribution.
///
/// Cheap to clone; clones share the same subscribers and last value.
///
/// # Example
/// ```
/// use runvisor::Broadcaster;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let b = Broadcaster::new(0u32);
/// let (mut rx, sub) = b.subscribe().await;
///
/// b.next(7).await;
/// assert_eq!(rx.recv().await, Some(7));
/// assert_eq!(b.value(), 7);
///
/// sub.unsubscribe().await;
/// # }
/// ```
pub struct Broadcaster<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Broadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster").finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Broadcaster<T> {
    /// Creates a broadcaster whose [`value`](Self::value) starts as `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                consumers: Mutex::new(Consumers {
                    next_id: 0,
                    slots: HashMap::new(),
                }),
                last: RwLock::new(initial),
            }),
        }
    }

    /// Returns the most recently published value (or the initial one).
    pub fn value(&self) -> T {
        self.inner
            .last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers a new subscriber.
    ///
    /// Returns the receiving end of its capacity-1 slot and a [`Subscription`]
    /// used to detach it. The receiver only observes values published after
    /// this call; read [`value`](Self::value) for the current one.
    pub async fn subscribe(&self) -> (mpsc::Receiver<T>, Subscription<T>) {
        let mut consumers = self.inner.consumers.lock().await;

        let id = SubscriberId(consumers.next_id);
        consumers.next_id += 1;

        let (tx, rx) = mpsc::channel(1);
        consumers.slots.insert(id, tx);
        drop(consumers);

        tracing::debug!(subscriber = %id, "broadcaster subscriber added");
        (rx, Subscription::new(id, Arc::downgrade(&self.inner)))
    }

    /// Detaches a subscriber. No-op if it is already gone.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        self.inner.remove(id).await;
    }

    /// Publishes `value`: records it as the last value, then delivers it to
    /// every current subscriber, waiting for room in each slot.
    pub async fn next(&self, value: T) {
        let mut consumers = self.inner.consumers.lock().await;

        *self.inner.last.write().unwrap_or_else(PoisonError::into_inner) = value.clone();

        let mut closed = Vec::new();
        for (id, slot) in &consumers.slots {
            if slot.send(value.clone()).await.is_err() {
                closed.push(*id);
            }
        }

        for id in closed {
            consumers.slots.remove(&id);
            tracing::debug!(subscriber = %id, "broadcaster receiver dropped; subscriber pruned");
        }
    }

    /// Number of currently attached subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.inner.consumers.lock().await.slots.len()
    }

    #[cfg(test)]
    fn downgrade(&self) -> std::sync::Weak<Inner<T>> {
        Arc::downgrade(&self.inner)
    }
}
