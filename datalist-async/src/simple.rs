use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::memo::{OnceFetch, SharedFetch};
use crate::{DataListError, DataListSource, Result};

/// The remote side of a [`SimpleDataListSource`]: one call that returns every item.
#[async_trait]
pub trait ItemsFetcher: Send + Sync + 'static {
    type Item: Clone + Send + 'static;

    async fn fetch_items(&self) -> Result<Vec<Self::Item>>;
}

/// A [`DataListSource`] for lists that can only be fetched whole.
///
/// The first `count` or `item` call starts the fetch; every other caller, concurrent or later,
/// shares it. The result (or the failure) is kept for the lifetime of the source.
pub struct SimpleDataListSource<F: ItemsFetcher> {
    inner: Arc<Inner<F>>,
}

struct Inner<F: ItemsFetcher> {
    fetcher: F,
    state: Mutex<State<F::Item>>,
}

struct State<T> {
    items: Option<Vec<T>>,
    fetch: OnceFetch,
}

impl<F: ItemsFetcher> SimpleDataListSource<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                state: Mutex::new(State {
                    items: None,
                    fetch: OnceFetch::default(),
                }),
            }),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    pub fn known_count(&self) -> Option<usize> {
        self.inner.state.lock().items.as_ref().map(Vec::len)
    }

    fn operation(&self) -> SharedFetch {
        let inner = Arc::clone(&self.inner);
        self.inner
            .state
            .lock()
            .fetch
            .get_or_start(move || async move { inner.run().await })
    }

    async fn resolve(&self) -> Result<()> {
        if self.known_count().is_none() {
            self.operation().await?;
        }
        Ok(())
    }
}

impl<F: ItemsFetcher> Inner<F> {
    async fn run(&self) -> Result<()> {
        ddebug!("SimpleDataListSource: fetch_items");
        let items = self.fetcher.fetch_items().await?;
        dtrace!(len = items.len(), "SimpleDataListSource: fetched");
        self.state.lock().items = Some(items);
        Ok(())
    }
}

#[async_trait]
impl<F: ItemsFetcher> DataListSource for SimpleDataListSource<F> {
    type Item = F::Item;

    async fn count(&self) -> Result<usize> {
        self.resolve().await?;
        self.known_count()
            .ok_or(DataListError::IncompleteResult("the fetched items"))
    }

    async fn item(&self, index: usize) -> Result<Self::Item> {
        self.resolve().await?;
        let state = self.inner.state.lock();
        let items = state
            .items
            .as_ref()
            .ok_or(DataListError::IncompleteResult("the fetched items"))?;
        items
            .get(index)
            .cloned()
            .ok_or(DataListError::IndexOutOfRange {
                index,
                count: items.len(),
            })
    }
}

impl<F: ItemsFetcher> fmt::Debug for SimpleDataListSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SimpleDataListSource")
            .field("count", &state.items.as_ref().map(Vec::len))
            .field("started", &state.fetch.is_started())
            .finish_non_exhaustive()
    }
}
