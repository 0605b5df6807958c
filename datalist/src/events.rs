use alloc::sync::Arc;
use alloc::vec::Vec;

/// A property of a collection whose value changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangedProperty {
    /// The number of items.
    Count,
    /// One or more item values.
    Items,
    /// A property defined by a wrapper type (e.g. a loading flag).
    Named(&'static str),
}

/// A structural change to a collection.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionChange<T> {
    /// The collection changed too much to describe; observers should re-read everything.
    Reset,
    /// The value at `index` was replaced.
    Replace { index: usize, old: T, new: T },
}

/// A single queued or dispatched change notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification<T> {
    Property(ChangedProperty),
    Collection(CollectionChange<T>),
}

/// A callback fired when a property changes.
pub type PropertyChangedCallback = Arc<dyn Fn(&ChangedProperty) + Send + Sync>;

/// A callback fired when the collection changes.
pub type CollectionChangedCallback<T> = Arc<dyn Fn(&CollectionChange<T>) + Send + Sync>;

/// Handle returned by the `on_*` registration methods, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Registered observers, grouped by event kind.
///
/// Callbacks run synchronously, in registration order, at the point the change is dispatched.
pub struct Observers<T> {
    next_id: u64,
    property_changed: Vec<(SubscriptionId, PropertyChangedCallback)>,
    collection_changed: Vec<(SubscriptionId, CollectionChangedCallback<T>)>,
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            property_changed: Vec::new(),
            collection_changed: Vec::new(),
        }
    }

    fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn on_property_changed(
        &mut self,
        f: impl Fn(&ChangedProperty) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.property_changed.push((id, Arc::new(f)));
        id
    }

    pub fn on_collection_changed(
        &mut self,
        f: impl Fn(&CollectionChange<T>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.collection_changed.push((id, Arc::new(f)));
        id
    }

    /// Removes a subscription. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.len();
        self.property_changed.retain(|(sub, _)| *sub != id);
        self.collection_changed.retain(|(sub, _)| *sub != id);
        self.len() != before
    }

    pub fn len(&self) -> usize {
        self.property_changed.len() + self.collection_changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dispatch(&self, notification: &Notification<T>) {
        match notification {
            Notification::Property(property) => {
                for (_, cb) in &self.property_changed {
                    cb(property);
                }
            }
            Notification::Collection(change) => {
                for (_, cb) in &self.collection_changed {
                    cb(change);
                }
            }
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Self {
            next_id: self.next_id,
            property_changed: self.property_changed.clone(),
            collection_changed: self.collection_changed.clone(),
        }
    }
}

impl<T> core::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observers")
            .field("property_changed", &self.property_changed.len())
            .field("collection_changed", &self.collection_changed.len())
            .finish()
    }
}

/// Notifications collected while dispatch was deferred, bound to the observers that were
/// registered at the time.
///
/// Call [`PendingNotifications::dispatch`] once it is safe to run observer callbacks (e.g. after
/// releasing a lock that the callbacks may want to take).
#[must_use = "pending notifications are lost unless dispatched"]
pub struct PendingNotifications<T> {
    observers: Observers<T>,
    queue: Vec<Notification<T>>,
}

impl<T> PendingNotifications<T> {
    pub(crate) fn new(observers: Observers<T>, queue: Vec<Notification<T>>) -> Self {
        Self { observers, queue }
    }

    pub(crate) fn empty() -> Self {
        Self::new(Observers::new(), Vec::new())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn notifications(&self) -> &[Notification<T>] {
        &self.queue
    }

    pub fn dispatch(self) {
        for notification in &self.queue {
            self.observers.dispatch(notification);
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for PendingNotifications<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingNotifications")
            .field("observers", &self.observers)
            .field("queue", &self.queue)
            .finish()
    }
}
