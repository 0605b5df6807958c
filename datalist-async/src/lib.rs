//! Async data sources for the `datalist` crate.
//!
//! A [`DataListSource`] is an indexable list whose contents are fetched on demand. This crate
//! provides:
//!
//! - [`PagedDataListSource`]: a source over a paginated API that fetches the count, the page size
//!   and each page at most once, sharing in-flight requests between concurrent callers
//! - [`SimpleDataListSource`]: a source for lists that can only be fetched whole
//! - [`Skip`] / [`Take`]: index-remapping views (see [`DataListSourceExt`])
//! - [`VirtualizingDataList`]: a non-blocking, change-notifying list that drives a
//!   [`datalist::VirtualizingVector`] from a source on a tokio runtime
//!
//! Fetches are memoized for the lifetime of a source. A failed fetch is not retried.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod bridge;
mod combinators;
mod error;
mod memo;
mod page;
mod paged;
mod simple;
mod source;


pub use bridge::{IS_LOADING, VirtualizingDataList};
pub use combinators::{Skip, Take};
pub use error::{DataListError, Result};
pub use page::PageResult;
pub use paged::{PageFetcher, PagedDataListSource};
pub use simple::{ItemsFetcher, SimpleDataListSource};
pub use source::{DataListSource, DataListSourceExt};
