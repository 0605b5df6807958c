use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use datalist::VirtualizingList;
use parking_lot::Mutex;

use crate::memo::{FetchKey, FetchMemo, SharedFetch};
use crate::{DataListError, DataListSource, PageResult, Result};

/// The remote side of a [`PagedDataListSource`].
///
/// Each hook is invoked at most once per key for the lifetime of the source that owns it. A hook
/// may answer more than it was asked: returning page 1 with the total and the page size from
/// `fetch_count` lets one request satisfy all three, which is what the default implementations
/// do for APIs that have no cheaper way to ask for the count.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    type Item: Clone + Send + 'static;

    async fn fetch_count(&self) -> Result<PageResult<Self::Item>> {
        self.fetch_page(1).await
    }

    async fn fetch_page_size(&self) -> Result<PageResult<Self::Item>> {
        self.fetch_page(1).await
    }

    /// Fetches one page. `page_number` is 1-based.
    async fn fetch_page(&self, page_number: usize) -> Result<PageResult<Self::Item>>;
}

/// A [`DataListSource`] over a paginated remote API.
///
/// Reading the count fetches only what is needed to learn the count; reading an item fetches
/// only the page containing it. Concurrent callers asking for the same count, page size, or page
/// share one in-flight request, and every [`PageResult`] is merged so that whatever a response
/// happens to carry (total, page size, items) is never requested again.
///
/// Fetches are memoized for the lifetime of the source. There is no refresh: a total count that
/// changes on the server after it was first learned is ignored, and a fetch that failed keeps
/// failing for every later caller of that key.
pub struct PagedDataListSource<F: PageFetcher> {
    inner: Arc<Inner<F>>,
}

struct Inner<F: PageFetcher> {
    fetcher: F,
    state: Mutex<State<F::Item>>,
}

struct State<T> {
    /// `None` until a total item count has been merged.
    list: Option<VirtualizingList<T>>,
    items_per_page: Option<usize>,
    memo: FetchMemo,
}

impl<F: PageFetcher> PagedDataListSource<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                state: Mutex::new(State {
                    list: None,
                    items_per_page: None,
                    memo: FetchMemo::default(),
                }),
            }),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    /// The total item count, if it has been learned already.
    pub fn known_count(&self) -> Option<usize> {
        self.inner.state.lock().list.as_ref().map(VirtualizingList::len)
    }

    /// The page size, if it has been learned already.
    pub fn known_items_per_page(&self) -> Option<usize> {
        self.inner.state.lock().items_per_page
    }

    fn operation(&self, key: FetchKey) -> Result<SharedFetch> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .state
            .lock()
            .memo
            .get_or_start(key, move || async move { inner.run(key).await })
    }

    async fn resolve_count(&self) -> Result<usize> {
        if let Some(count) = self.known_count() {
            return Ok(count);
        }
        self.operation(FetchKey::Count)?.await?;
        self.known_count()
            .ok_or(DataListError::IncompleteResult("a total item count"))
    }

    async fn resolve_items_per_page(&self) -> Result<usize> {
        if let Some(per_page) = self.known_items_per_page() {
            return Ok(per_page);
        }
        self.operation(FetchKey::PageSize)?.await?;
        self.known_items_per_page()
            .ok_or(DataListError::IncompleteResult("a page size"))
    }
}

impl<F: PageFetcher> Inner<F> {
    async fn run(&self, key: FetchKey) -> Result<()> {
        let result = match key {
            FetchKey::Count => {
                ddebug!("PagedDataListSource: fetch_count");
                self.fetcher.fetch_count().await?
            }
            FetchKey::PageSize => {
                ddebug!("PagedDataListSource: fetch_page_size");
                self.fetcher.fetch_page_size().await?
            }
            FetchKey::Page(page_number) => {
                ddebug!(page_number, "PagedDataListSource: fetch_page");
                self.fetcher.fetch_page(page_number).await?
            }
        };
        self.merge(result)
    }

    /// Folds one response into the known state: total first, then page size, then the page
    /// table, then the items themselves.
    fn merge(&self, result: PageResult<F::Item>) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(total) = result.total_item_count {
            match state.list.as_ref().map(VirtualizingList::len) {
                None => state.list = Some(VirtualizingList::with_count(total)),
                Some(known) if known != total => {
                    dwarn!(
                        known,
                        reported = total,
                        "PagedDataListSource: ignoring changed total item count"
                    );
                }
                Some(_) => {}
            }
        }

        if let Some(per_page) = result.items_per_page {
            if per_page == 0 {
                return Err(DataListError::IncompleteResult("a non-zero page size"));
            }
            state.items_per_page = Some(per_page);
        }

        if let (Some(list), Some(per_page)) = (&state.list, state.items_per_page) {
            state.memo.grow_pages(list.len().div_ceil(per_page));
        }

        if let (Some(page_number), Some(items)) = (result.page_number, result.page) {
            if page_number == 0 {
                return Err(DataListError::InvalidPage(0));
            }
            let per_page = state
                .items_per_page
                .ok_or(DataListError::IncompleteResult("a page size to place the page"))?;
            let list = state.list.as_mut().ok_or(DataListError::IncompleteResult(
                "a total item count to place the page",
            ))?;
            let start = per_page.saturating_mul(page_number - 1);
            let room = list.len().saturating_sub(start);
            dtrace!(page_number, start, len = items.len(), "PagedDataListSource: merge page");
            if items.len() > room {
                dwarn!(
                    page_number,
                    count = list.len(),
                    surplus = items.len() - room,
                    "PagedDataListSource: dropping page items past the total item count"
                );
            }
            for (offset, item) in items.into_iter().take(room).enumerate() {
                list.set(start + offset, item)?;
            }
        }

        Ok(())
    }

    fn fetched(&self, index: usize) -> Option<F::Item> {
        let state = self.state.lock();
        state.list.as_ref()?.get(index).ok().flatten().cloned()
    }
}

#[async_trait]
impl<F: PageFetcher> DataListSource for PagedDataListSource<F> {
    type Item = F::Item;

    async fn count(&self) -> Result<usize> {
        self.resolve_count().await
    }

    async fn item(&self, index: usize) -> Result<Self::Item> {
        // Bounds are checked before the page size is resolved, so an out-of-range read never
        // costs a page-size request.
        let count = self.resolve_count().await?;
        if index >= count {
            return Err(DataListError::IndexOutOfRange { index, count });
        }
        let per_page = self.resolve_items_per_page().await?;

        if let Some(item) = self.inner.fetched(index) {
            return Ok(item);
        }
        let page_number = index / per_page + 1;
        self.operation(FetchKey::Page(page_number))?.await?;
        self.inner
            .fetched(index)
            .ok_or(DataListError::IncompleteResult("the requested item in its page"))
    }
}

impl<F: PageFetcher> fmt::Debug for PagedDataListSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PagedDataListSource")
            .field("count", &state.list.as_ref().map(VirtualizingList::len))
            .field("items_per_page", &state.items_per_page)
            .field("memo", &state.memo)
            .finish_non_exhaustive()
    }
}
