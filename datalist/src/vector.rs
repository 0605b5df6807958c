use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::task::Poll;

use crate::{
    ChangedProperty, CollectionChange, Error, Notification, Observers, PendingNotifications,
    Slot, SubscriptionId, VirtualizingList, list::Slots,
};

/// Fetch triggers for a [`VirtualizingVector`].
///
/// The vector never fetches anything itself. It calls these hooks when a consumer first reads
/// the count, or reads an item that has not been fetched yet. A hook either answers on the spot
/// with `Poll::Ready`, which the vector applies immediately, or returns `Poll::Pending` after
/// starting the work and later reports back through [`VirtualizingVector::update_count`] /
/// [`VirtualizingVector::update_item`].
///
/// Hooks receive the vector that triggered them so they can raise their own notifications
/// (see [`VirtualizingVector::notify_property_changed`]).
pub trait FetchHooks<T>: Sized {
    fn fetch_count(&self, vector: &VirtualizingVector<T, Self>) -> Poll<usize>;
    fn fetch_item(&self, vector: &VirtualizingVector<T, Self>, index: usize) -> Poll<T>;
}

/// A read-only, lazily populated, change-notifying collection.
///
/// - The first read of [`count`](Self::count) calls [`FetchHooks::fetch_count`] exactly once;
///   until the hook reports back the count is `0`.
/// - Reading an unfetched index calls [`FetchHooks::fetch_item`] and returns the placeholder
///   immediately. Consumers are expected to re-read once notified.
/// - All consumer-facing mutators fail with [`Error::ReadOnly`]; only the `update_*` methods
///   used by hook implementations change the contents.
pub struct VirtualizingVector<T, H> {
    hooks: H,
    list: VirtualizingList<T>,
    placeholder: T,
    count_requested: bool,
    observers: Observers<T>,

    notify_depth: Cell<usize>,
    pending: RefCell<Vec<Notification<T>>>,
}

impl<T: Default, H: FetchHooks<T>> VirtualizingVector<T, H> {
    /// Creates an empty vector whose unfetched items read as `T::default()`.
    pub fn new(hooks: H) -> Self {
        Self::with_placeholder(hooks, T::default())
    }
}

impl<T, H: FetchHooks<T>> VirtualizingVector<T, H> {
    pub fn with_placeholder(hooks: H, placeholder: T) -> Self {
        Self {
            hooks,
            list: VirtualizingList::new(),
            placeholder,
            count_requested: false,
            observers: Observers::new(),
            notify_depth: Cell::new(0),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn placeholder(&self) -> &T {
        &self.placeholder
    }

    /// Returns the current number of items, triggering the count fetch on first use.
    pub fn count(&mut self) -> usize {
        if !self.count_requested {
            self.count_requested = true;
            ddebug!("VirtualizingVector: fetching count");
            if let Poll::Ready(count) = self.hooks.fetch_count(self) {
                self.update_count(count);
            }
        }
        self.list.len()
    }

    /// Returns the current number of items without triggering the count fetch.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` once [`count`](Self::count) has been read at least once.
    pub fn count_requested(&self) -> bool {
        self.count_requested
    }

    /// Returns the item at `index`, or the placeholder if it has not been fetched yet.
    ///
    /// Reading an unfetched item calls [`FetchHooks::fetch_item`] every time.
    pub fn get(&mut self, index: usize) -> Result<&T, Error>
    where
        T: Clone,
    {
        if !self.list.is_fetched(index)? {
            dtrace!(index, "VirtualizingVector: fetching item");
            if let Poll::Ready(value) = self.hooks.fetch_item(self, index) {
                self.update_item(index, value)?;
            }
        }
        Ok(self.list.slot(index)?.value_or(&self.placeholder))
    }

    /// Returns the slot at `index` without triggering a fetch.
    pub fn slot(&self, index: usize) -> Result<&Slot<T>, Error> {
        self.list.slot(index)
    }

    pub fn is_read_only(&self) -> bool {
        true
    }

    /// Returns `true` if a fetched item equals `item`. Does not trigger fetches.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.list.contains(item)
    }

    /// Returns the index of the first fetched item equal to `item`. Does not trigger fetches.
    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.list.index_of(item)
    }

    /// Copies the current values (placeholders included) into `dest` starting at `offset`.
    pub fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<(), Error>
    where
        T: Clone,
    {
        self.list.copy_to(dest, offset, &self.placeholder)
    }

    /// Iterates over a snapshot of the current values, placeholders included.
    ///
    /// Iteration never triggers fetches and can be restarted by calling `iter` again.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.list.iter(),
            placeholder: &self.placeholder,
        }
    }

    pub fn push(&mut self, _item: T) -> Result<(), Error> {
        Err(Error::ReadOnly)
    }

    pub fn insert(&mut self, _index: usize, _item: T) -> Result<(), Error> {
        Err(Error::ReadOnly)
    }

    pub fn set(&mut self, _index: usize, _item: T) -> Result<(), Error> {
        Err(Error::ReadOnly)
    }

    pub fn remove(&mut self, _item: &T) -> Result<bool, Error> {
        Err(Error::ReadOnly)
    }

    pub fn remove_at(&mut self, _index: usize) -> Result<T, Error> {
        Err(Error::ReadOnly)
    }

    pub fn clear(&mut self) -> Result<(), Error> {
        Err(Error::ReadOnly)
    }

    /// Sets the number of items.
    ///
    /// Emits `Count` + `Reset` when the count actually changes; otherwise does nothing.
    pub fn update_count(&mut self, count: usize) {
        if self.list.len() == count {
            return;
        }
        ddebug!(from = self.list.len(), to = count, "VirtualizingVector::update_count");
        self.list.update_count(count);
        self.notify(Notification::Property(ChangedProperty::Count));
        self.notify(Notification::Collection(CollectionChange::Reset));
    }

    /// Stores a fetched value at `index` and emits `Items` + `Replace`.
    pub fn update_item(&mut self, index: usize, value: T) -> Result<(), Error>
    where
        T: Clone,
    {
        let old = self.list.replace(index, Slot::Fetched(value.clone()))?;
        let old = old
            .into_value()
            .unwrap_or_else(|| self.placeholder.clone());
        dtrace!(index, "VirtualizingVector::update_item");
        self.notify(Notification::Property(ChangedProperty::Items));
        self.notify(Notification::Collection(CollectionChange::Replace {
            index,
            old,
            new: value,
        }));
        Ok(())
    }

    pub fn on_property_changed(
        &mut self,
        f: impl Fn(&ChangedProperty) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.observers.on_property_changed(f)
    }

    pub fn on_collection_changed(
        &mut self,
        f: impl Fn(&CollectionChange<T>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.observers.on_collection_changed(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Raises a property notification on behalf of a wrapper or hook implementation.
    pub fn notify_property_changed(&self, property: ChangedProperty) {
        self.notify(Notification::Property(property));
    }

    fn notify(&self, notification: Notification<T>) {
        if self.notify_depth.get() > 0 {
            self.pending.borrow_mut().push(notification);
            return;
        }
        self.observers.dispatch(&notification);
    }

    fn begin_deferred(&self) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));
    }

    fn end_deferred(&self) -> PendingNotifications<T> {
        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next > 0 {
            return PendingNotifications::empty();
        }
        let queue = self.pending.take();
        PendingNotifications::new(self.observers.clone(), queue)
    }

    /// Runs `f` with notification dispatch deferred, returning its result together with the
    /// notifications raised meanwhile (by `f` itself or by hooks it triggered).
    ///
    /// This is meant for wrappers that keep the vector behind a lock: collect the notifications
    /// while holding the lock, then dispatch them after releasing it so observers can read the
    /// collection again.
    pub fn with_deferred<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> R,
    ) -> (R, PendingNotifications<T>) {
        self.begin_deferred();
        let out = f(self);
        (out, self.end_deferred())
    }

    /// Batches multiple updates and dispatches their notifications once `f` returns.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let ((), pending) = self.with_deferred(f);
        pending.dispatch();
    }
}

impl<T: core::fmt::Debug, H> core::fmt::Debug for VirtualizingVector<T, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualizingVector")
            .field("list", &self.list)
            .field("placeholder", &self.placeholder)
            .field("count_requested", &self.count_requested)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

/// Snapshot iterator over the values of a [`VirtualizingVector`].
#[derive(Clone, Debug)]
pub struct Iter<'a, T> {
    slots: Slots<'a, T>,
    placeholder: &'a T,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let placeholder = self.placeholder;
        self.slots.next().map(|slot| slot.value_or(placeholder))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T, H: FetchHooks<T>> IntoIterator for &'a VirtualizingVector<T, H> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
