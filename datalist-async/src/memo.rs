use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::{DataListError, Result};

/// A fetch-and-merge operation shared by every caller interested in the same key.
pub(crate) type SharedFetch = Shared<BoxFuture<'static, Result<()>>>;

/// A single-assignment slot for a [`SharedFetch`].
///
/// The first caller creates the operation; everyone after that (including callers arriving
/// after it finished) gets a clone of the same one and observes the same outcome. Nothing is
/// ever evicted, so a failed operation keeps failing.
#[derive(Default)]
pub(crate) struct OnceFetch {
    op: Option<SharedFetch>,
}

impl OnceFetch {
    pub(crate) fn get_or_start<F>(&mut self, start: impl FnOnce() -> F) -> SharedFetch
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        self.op
            .get_or_insert_with(|| start().boxed().shared())
            .clone()
    }

    pub(crate) fn is_started(&self) -> bool {
        self.op.is_some()
    }
}

/// The logical resources a paged source can fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum FetchKey {
    Count,
    PageSize,
    /// 1-based page number.
    Page(usize),
}

/// Per-key memo table of a paged source.
#[derive(Default)]
pub(crate) struct FetchMemo {
    count: OnceFetch,
    page_size: OnceFetch,
    pages: Vec<OnceFetch>,
}

impl FetchMemo {
    /// Makes room for `page_count` page operations. Never shrinks.
    pub(crate) fn grow_pages(&mut self, page_count: usize) {
        if self.pages.len() < page_count {
            dtrace!(from = self.pages.len(), to = page_count, "FetchMemo::grow_pages");
            self.pages.resize_with(page_count, OnceFetch::default);
        }
    }

    /// Returns the operation for `key`, creating it with `start` if this is the first request.
    pub(crate) fn get_or_start<F>(
        &mut self,
        key: FetchKey,
        start: impl FnOnce() -> F,
    ) -> Result<SharedFetch>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let slot = match key {
            FetchKey::Count => &mut self.count,
            FetchKey::PageSize => &mut self.page_size,
            FetchKey::Page(0) => return Err(DataListError::InvalidPage(0)),
            FetchKey::Page(page_number) => {
                self.grow_pages(page_number);
                &mut self.pages[page_number - 1]
            }
        };
        Ok(slot.get_or_start(start))
    }
}

impl fmt::Debug for FetchMemo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pages_started = self.pages.iter().filter(|p| p.is_started()).count();
        f.debug_struct("FetchMemo")
            .field("count", &self.count.is_started())
            .field("page_size", &self.page_size.is_started())
            .field("pages", &self.pages.len())
            .field("pages_started", &pages_started)
            .finish()
    }
}
