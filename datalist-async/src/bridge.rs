use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::task::Poll;

use datalist::{
    ChangedProperty, CollectionChange, FetchHooks, PendingNotifications, Slot, SubscriptionId,
    VirtualizingVector,
};
use parking_lot::{Mutex, ReentrantMutex};
use tokio::runtime::Handle;

use crate::{DataListSource, Result};

/// Property raised when [`VirtualizingDataList::is_loading`] flips.
pub const IS_LOADING: ChangedProperty = ChangedProperty::Named("is_loading");

type Vector<S> = VirtualizingVector<<S as DataListSource>::Item, DataListHooks<S>>;

/// A [`VirtualizingVector`] backed by a [`DataListSource`].
///
/// Reads never block on the source. The first [`count`](Self::count) returns `0` and spawns the
/// count fetch on the tokio runtime; reading an unfetched item returns the placeholder and spawns
/// the item fetch. Results are applied when they arrive and announced through the usual
/// notifications, so consumers re-read once notified.
///
/// Observer callbacks always run without the internal lock held and may read the list again.
/// Fetch failures are logged and leave the affected slot (or the count) untouched.
pub struct VirtualizingDataList<S: DataListSource> {
    shared: Arc<Shared<S>>,
}

struct Shared<S: DataListSource> {
    vector: Mutex<Vector<S>>,
    // Held while a batch of notifications is dispatched so batches from spawned fetches cannot
    // overtake the one raised by the read that started them.
    dispatch: ReentrantMutex<()>,
    is_loading: AtomicBool,
    in_flight: Mutex<HashSet<usize>>,
}

struct DataListHooks<S: DataListSource> {
    source: Arc<S>,
    shared: Weak<Shared<S>>,
    runtime: Handle,
}

impl<S> VirtualizingDataList<S>
where
    S: DataListSource + 'static,
    S::Item: Clone + Default,
{
    /// Creates a list that spawns its fetches on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside the context of a tokio runtime.
    pub fn new(source: S) -> Self {
        Self::with_runtime(source, Handle::current())
    }

    pub fn with_runtime(source: S, runtime: Handle) -> Self {
        Self::with_placeholder(source, S::Item::default(), runtime)
    }
}

impl<S> VirtualizingDataList<S>
where
    S: DataListSource + 'static,
    S::Item: Clone,
{
    /// Creates a list whose unfetched items read as `placeholder`.
    pub fn with_placeholder(source: S, placeholder: S::Item, runtime: Handle) -> Self {
        let source = Arc::new(source);
        let shared = Arc::new_cyclic(|weak| Shared {
            vector: Mutex::new(VirtualizingVector::with_placeholder(
                DataListHooks {
                    source,
                    shared: weak.clone(),
                    runtime,
                },
                placeholder,
            )),
            dispatch: ReentrantMutex::new(()),
            is_loading: AtomicBool::new(false),
            in_flight: Mutex::new(HashSet::new()),
        });
        Self { shared }
    }

    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.shared.vector.lock().hooks().source)
    }

    /// `true` while the count fetch is running.
    pub fn is_loading(&self) -> bool {
        self.shared.is_loading.load(Ordering::Acquire)
    }

    /// Returns the current number of items, starting the count fetch on first use.
    pub fn count(&self) -> usize {
        self.shared.update(|vector| vector.count())
    }

    /// Returns the current number of items without starting the count fetch.
    pub fn len(&self) -> usize {
        self.shared.vector.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the item at `index`, or the placeholder while it is being fetched.
    pub fn get(&self, index: usize) -> Result<S::Item> {
        let item = self.shared.update(|vector| vector.get(index).cloned())?;
        Ok(item)
    }

    /// Returns the slot at `index` without starting a fetch.
    pub fn slot(&self, index: usize) -> Result<Slot<S::Item>> {
        let slot = self.shared.vector.lock().slot(index)?.clone();
        Ok(slot)
    }

    pub fn is_read_only(&self) -> bool {
        true
    }

    pub fn contains(&self, item: &S::Item) -> bool
    where
        S::Item: PartialEq,
    {
        self.shared.vector.lock().contains(item)
    }

    pub fn index_of(&self, item: &S::Item) -> Option<usize>
    where
        S::Item: PartialEq,
    {
        self.shared.vector.lock().index_of(item)
    }

    /// Copies the current values (placeholders included) into `dest` starting at `offset`.
    pub fn copy_to(&self, dest: &mut [S::Item], offset: usize) -> Result<()> {
        self.shared.vector.lock().copy_to(dest, offset)?;
        Ok(())
    }

    /// Returns the current values, placeholders included. Does not start any fetch.
    pub fn snapshot(&self) -> Vec<S::Item> {
        self.shared.vector.lock().iter().cloned().collect()
    }

    pub fn push(&self, item: S::Item) -> Result<()> {
        self.shared.vector.lock().push(item)?;
        Ok(())
    }

    pub fn insert(&self, index: usize, item: S::Item) -> Result<()> {
        self.shared.vector.lock().insert(index, item)?;
        Ok(())
    }

    pub fn set(&self, index: usize, item: S::Item) -> Result<()> {
        self.shared.vector.lock().set(index, item)?;
        Ok(())
    }

    pub fn remove(&self, item: &S::Item) -> Result<bool> {
        Ok(self.shared.vector.lock().remove(item)?)
    }

    pub fn remove_at(&self, index: usize) -> Result<S::Item> {
        Ok(self.shared.vector.lock().remove_at(index)?)
    }

    pub fn clear(&self) -> Result<()> {
        self.shared.vector.lock().clear()?;
        Ok(())
    }

    pub fn on_property_changed(
        &self,
        f: impl Fn(&ChangedProperty) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.shared.vector.lock().on_property_changed(f)
    }

    pub fn on_collection_changed(
        &self,
        f: impl Fn(&CollectionChange<S::Item>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.shared.vector.lock().on_collection_changed(f)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.vector.lock().unsubscribe(id)
    }
}

impl<S> Shared<S>
where
    S: DataListSource + 'static,
    S::Item: Clone,
{
    /// Runs `f` under the vector lock and dispatches what it raised after the lock is released.
    fn update<R>(&self, f: impl FnOnce(&mut Vector<S>) -> R) -> R {
        let _order = self.dispatch.lock();
        let (out, pending): (R, PendingNotifications<S::Item>) = {
            let mut vector = self.vector.lock();
            vector.with_deferred(f)
        };
        pending.dispatch();
        out
    }

    fn set_loading(&self, vector: &Vector<S>, loading: bool) {
        if self.is_loading.swap(loading, Ordering::AcqRel) != loading {
            vector.notify_property_changed(IS_LOADING);
        }
    }
}

impl<S> FetchHooks<S::Item> for DataListHooks<S>
where
    S: DataListSource + 'static,
    S::Item: Clone,
{
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn fetch_count(&self, vector: &Vector<S>) -> Poll<usize> {
        let Some(shared) = self.shared.upgrade() else {
            return Poll::Pending;
        };
        shared.set_loading(vector, true);

        let source = Arc::clone(&self.source);
        let weak = self.shared.clone();
        self.runtime.spawn(async move {
            let result = source.count().await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            shared.update(|vector| {
                match result {
                    Ok(count) => vector.update_count(count),
                    Err(err) => {
                        dwarn!(error = %err, "VirtualizingDataList: count fetch failed");
                    }
                }
                shared.set_loading(vector, false);
            });
        });
        Poll::Pending
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn fetch_item(&self, _vector: &Vector<S>, index: usize) -> Poll<S::Item> {
        let Some(shared) = self.shared.upgrade() else {
            return Poll::Pending;
        };
        if !shared.in_flight.lock().insert(index) {
            dtrace!(index, "VirtualizingDataList: item fetch already in flight");
            return Poll::Pending;
        }

        let source = Arc::clone(&self.source);
        let weak = self.shared.clone();
        self.runtime.spawn(async move {
            let result = source.item(index).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            shared.update(|vector| {
                shared.in_flight.lock().remove(&index);
                match result {
                    Ok(item) => {
                        if let Err(err) = vector.update_item(index, item) {
                            dwarn!(index, error = %err, "VirtualizingDataList: dropping fetched item");
                        }
                    }
                    Err(err) => {
                        dwarn!(index, error = %err, "VirtualizingDataList: item fetch failed");
                    }
                }
            });
        });
        Poll::Pending
    }
}

impl<S> fmt::Debug for VirtualizingDataList<S>
where
    S: DataListSource,
    S::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualizingDataList")
            .field("vector", &*self.shared.vector.lock())
            .field("is_loading", &self.shared.is_loading.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
