use async_trait::async_trait;

use crate::{DataListError, DataListSource, Result};

/// A view of a source without its first `count` items. See [`crate::DataListSourceExt::skip`].
#[derive(Clone, Debug)]
pub struct Skip<S> {
    source: S,
    count: usize,
}

impl<S: DataListSource> Skip<S> {
    pub fn new(source: S, count: usize) -> Self {
        Self { source, count }
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

#[async_trait]
impl<S: DataListSource> DataListSource for Skip<S> {
    type Item = S::Item;

    async fn count(&self) -> Result<usize> {
        let source_count = self.source.count().await?;
        Ok(source_count.saturating_sub(self.count))
    }

    async fn item(&self, index: usize) -> Result<Self::Item> {
        // The source enforces the upper bound.
        self.source.item(index.saturating_add(self.count)).await
    }
}

/// A view of at most the first `count` items of a source. See [`crate::DataListSourceExt::take`].
#[derive(Clone, Debug)]
pub struct Take<S> {
    source: S,
    count: usize,
}

impl<S: DataListSource> Take<S> {
    pub fn new(source: S, count: usize) -> Self {
        Self { source, count }
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

#[async_trait]
impl<S: DataListSource> DataListSource for Take<S> {
    type Item = S::Item;

    async fn count(&self) -> Result<usize> {
        let source_count = self.source.count().await?;
        Ok(source_count.min(self.count))
    }

    async fn item(&self, index: usize) -> Result<Self::Item> {
        // A source shorter than `count` rejects the index itself.
        if index >= self.count {
            return Err(DataListError::IndexOutOfRange {
                index,
                count: self.count,
            });
        }
        self.source.item(index).await
    }
}
