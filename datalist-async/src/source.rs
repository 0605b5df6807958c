use std::sync::Arc;

use async_trait::async_trait;

use crate::{Result, Skip, Take};

/// An asynchronous, indexable list whose contents live somewhere else (a paged web API, a
/// file, a database query).
///
/// `item` fails with [`crate::DataListError::IndexOutOfRange`] when `index >= count`, resolving
/// the count first if it is not known yet. Both calls may be issued concurrently, any number of
/// times, with the same arguments.
#[async_trait]
pub trait DataListSource: Send + Sync {
    type Item: Send + 'static;

    async fn count(&self) -> Result<usize>;

    async fn item(&self, index: usize) -> Result<Self::Item>;
}

#[async_trait]
impl<S: DataListSource + ?Sized> DataListSource for Arc<S> {
    type Item = S::Item;

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }

    async fn item(&self, index: usize) -> Result<Self::Item> {
        (**self).item(index).await
    }
}

#[async_trait]
impl<S: DataListSource + ?Sized> DataListSource for Box<S> {
    type Item = S::Item;

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }

    async fn item(&self, index: usize) -> Result<Self::Item> {
        (**self).item(index).await
    }
}

/// Index-remapping combinators available on every [`DataListSource`].
pub trait DataListSourceExt: DataListSource + Sized {
    /// Drops the first `count` items.
    fn skip(self, count: usize) -> Skip<Self> {
        Skip::new(self, count)
    }

    /// Keeps at most the first `count` items.
    fn take(self, count: usize) -> Take<Self> {
        Take::new(self, count)
    }
}

impl<S: DataListSource> DataListSourceExt for S {}
