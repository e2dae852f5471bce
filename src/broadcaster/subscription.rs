use std::fmt;
use std::sync::Weak;

use super::Inner;

/// Identifier of one broadcaster subscriber.
///
/// Assigned from a per-broadcaster counter under the fan-out lock; never
/// reused for the lifetime of the broadcaster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

impl SubscriberId {
    /// Returns the raw counter value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle for detaching a subscriber from its [`Broadcaster`](super::Broadcaster).
///
/// Holds only a weak reference: it does not keep the broadcaster alive and
/// does not own the receiver. Dropping it does **not** unsubscribe.
pub struct Subscription<T> {
    id: SubscriberId,
    owner: Weak<Inner<T>>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(id: SubscriberId, owner: Weak<Inner<T>>) -> Self {
        Self { id, owner }
    }

    /// Returns the subscriber id.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Removes the subscriber. Safe to call repeatedly or after the
    /// broadcaster itself is gone.
    pub async fn unsubscribe(&self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.remove(self.id).await;
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
